mod config;
mod error;
mod filename;
mod loader;
mod processor;

use std::path::Path;

pub use config::ProcessorConfig;
pub use error::FixtureError;
pub use loader::{FixtureLoader, FixtureSet};
pub use processor::{FileProcessor, OutputsByRequest, PromptDirectoryProcessor};

/// Loads every fixture directory under `root` with a [`PromptDirectoryProcessor`].
pub fn load_fixtures(
    root: impl AsRef<Path>,
    config: ProcessorConfig,
) -> Result<FixtureSet, FixtureError> {
    let processor = PromptDirectoryProcessor::new(config)?;
    FixtureLoader::new(processor).load(root)
}
