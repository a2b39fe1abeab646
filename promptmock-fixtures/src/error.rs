use std::path::PathBuf;

use promptmock_core::PromptMockError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("expected exactly one prompt.txt in {}, found {found}", .dir.display())]
    PromptFileCount { dir: PathBuf, found: usize },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no temperature in output file name {}", .path.display())]
    MissingTemperature { path: PathBuf },
    #[error("invalid temperature '{value}' in output file name {}", .path.display())]
    InvalidTemperature { path: PathBuf, value: String },
    #[error("failed to walk fixture tree: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid processor config in {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid processor config: {0}")]
    InvalidConfig(String),
}

impl From<FixtureError> for PromptMockError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::InvalidConfig(reason) => PromptMockError::InvalidConfig(reason),
            other => PromptMockError::Fixture(other.to_string()),
        }
    }
}
