use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use promptmock_core::{CompletionRequest, Runnable, Temperature};
use promptmock_fixtures::{FileProcessor, FixtureLoader, FixtureSet, PromptDirectoryProcessor};
use promptmock_llm::MockCompletionLlm;
use tracing::info;

use crate::{Command, ParamArgs};

pub(crate) async fn run(command: Command, params: &ParamArgs) -> Result<ExitCode> {
    let config = params.resolve().context("resolving processor parameters")?;
    info!(?config, "processor parameters");
    let processor = PromptDirectoryProcessor::new(config)?;

    match command {
        Command::Check { dir } => Ok(check(&processor, &dir)),
        Command::Inspect { root, json } => {
            let fixtures = FixtureLoader::new(&processor)
                .load(&root)
                .with_context(|| format!("loading fixtures from {}", root.display()))?;
            inspect(&fixtures, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay {
            root,
            prompt,
            prompt_file,
            temperature,
            times,
        } => {
            let prompt = match (prompt, prompt_file) {
                (Some(prompt), _) => prompt,
                (None, Some(path)) => read_prompt(&path)?,
                (None, None) => anyhow::bail!("either --prompt or --prompt-file is required"),
            };
            replay(&processor, &root, prompt, temperature, times).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(processor: &PromptDirectoryProcessor, dir: &Path) -> ExitCode {
    if processor.is_supported(dir) {
        println!("supported");
        ExitCode::SUCCESS
    } else {
        println!("unsupported");
        ExitCode::from(1)
    }
}

fn inspect(fixtures: &FixtureSet, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(fixtures)?);
        return Ok(());
    }

    for (request, outputs) in fixtures.sorted() {
        println!(
            "{}\t{}\t{}",
            request.temperature,
            outputs.len(),
            summarize_prompt(&request.prompt)
        );
    }
    println!(
        "{} requests, {} outputs",
        fixtures.len(),
        fixtures.total_outputs()
    );
    Ok(())
}

async fn replay(
    processor: &PromptDirectoryProcessor,
    root: &Path,
    prompt: String,
    temperature: Temperature,
    times: usize,
) -> Result<()> {
    let config = processor.config();
    let llm = MockCompletionLlm::from_fixture_dir(root, processor)?;
    let request = CompletionRequest::new(prompt, temperature, config.max_tokens)
        .with_n(config.n)
        .with_top_p(config.top_p)
        .with_stop(config.stop.clone())
        .with_stream(config.stream);

    for _ in 0..times {
        let response = llm.invoke(request.clone()).await?;
        for choice in response.choices {
            println!("{}", choice.text);
        }
    }
    Ok(())
}

fn read_prompt(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading prompt file {}", path.display()))?;
    Ok(raw.strip_suffix('\n').map(str::to_string).unwrap_or(raw))
}

fn summarize_prompt(prompt: &str) -> String {
    const MAX_CHARS: usize = 60;
    let first_line = prompt.lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_CHARS || first_line.len() < prompt.len() {
        let cut: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_single_line_prompts_are_shown_whole() {
        assert_eq!(summarize_prompt("Translate: hello"), "Translate: hello");
    }

    #[test]
    fn multi_line_prompts_are_cut_at_first_line() {
        assert_eq!(summarize_prompt("Q: one\nA:"), "Q: one...");
    }

    #[test]
    fn long_prompts_are_truncated() {
        let prompt = "x".repeat(80);
        assert_eq!(summarize_prompt(&prompt), format!("{}...", "x".repeat(60)));
    }

    #[test]
    fn flags_override_defaults() {
        let params = ParamArgs {
            max_tokens: Some(32),
            n: Some(2),
            ..ParamArgs::default()
        };

        let config = params.resolve().expect("resolve");

        assert_eq!(config.max_tokens, 32);
        assert_eq!(config.n, Some(2));
        assert_eq!(config.top_p, None);
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("promptmock.json");
        fs::write(&path, r#"{ "max_tokens": 16, "top_p": 1 }"#).expect("write config");
        let params = ParamArgs {
            config: Some(path),
            max_tokens: Some(48),
            ..ParamArgs::default()
        };

        let config = params.resolve().expect("resolve");

        assert_eq!(config.max_tokens, 48);
        assert_eq!(config.top_p, Some(1));
    }

    #[test]
    fn zero_max_tokens_flag_is_rejected() {
        let params = ParamArgs {
            max_tokens: Some(0),
            ..ParamArgs::default()
        };
        assert!(params.resolve().is_err());
    }
}
