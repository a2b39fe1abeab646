mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use promptmock_core::Temperature;
use promptmock_fixtures::{FixtureError, ProcessorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "promptmock",
    version,
    about = "Check, inspect and replay prompt fixture directories"
)]
struct Cli {
    #[command(flatten)]
    params: ParamArgs,

    /// Raise log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Generation parameters stamped onto every fixture request.
#[derive(Args, Debug, Default)]
pub(crate) struct ParamArgs {
    /// JSON file holding processor parameters
    #[arg(long, global = true, env = "PROMPTMOCK_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, env = "PROMPTMOCK_MAX_TOKENS")]
    max_tokens: Option<u32>,

    #[arg(long, global = true, env = "PROMPTMOCK_TOP_P")]
    top_p: Option<u32>,

    #[arg(short = 'n', long = "n", global = true, env = "PROMPTMOCK_N")]
    n: Option<u32>,

    #[arg(long, global = true, env = "PROMPTMOCK_STREAM")]
    stream: Option<bool>,

    #[arg(long, global = true, env = "PROMPTMOCK_STOP")]
    stop: Option<String>,
}

impl ParamArgs {
    /// Flags and env vars win over the config file, which wins over defaults.
    pub(crate) fn resolve(&self) -> Result<ProcessorConfig, FixtureError> {
        let mut config = match &self.config {
            Some(path) => ProcessorConfig::from_json_file(path)?,
            None => ProcessorConfig::default(),
        };
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if self.top_p.is_some() {
            config.top_p = self.top_p;
        }
        if self.n.is_some() {
            config.n = self.n;
        }
        if self.stream.is_some() {
            config.stream = self.stream;
        }
        if self.stop.is_some() {
            config.stop = self.stop.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether DIR is a fixture directory (exit status 1 if not)
    Check { dir: PathBuf },
    /// Load every fixture directory under ROOT and summarise it
    Inspect {
        root: PathBuf,
        /// Print the fixtures as JSON
        #[arg(long)]
        json: bool,
    },
    /// Answer a completion request from the fixtures under ROOT
    Replay {
        root: PathBuf,
        #[arg(long, required_unless_present = "prompt_file", conflicts_with = "prompt_file")]
        prompt: Option<String>,
        /// Read the prompt from a file, dropping one trailing newline
        #[arg(long)]
        prompt_file: Option<PathBuf>,
        #[arg(long)]
        temperature: Temperature,
        /// Number of successive calls to make
        #[arg(long, default_value_t = 1)]
        times: usize,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli.command, &cli.params).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
