use std::fs;
use std::path::Path;

use promptmock_core::{CompletionRequest, Temperature};
use serde::{Deserialize, Serialize};

use crate::FixtureError;

/// Generation parameters stamped onto every request a processor produces.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ProcessorConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

fn default_max_tokens() -> u32 {
    ProcessorConfig::DEFAULT_MAX_TOKENS
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_TOKENS)
    }
}

impl ProcessorConfig {
    pub const DEFAULT_MAX_TOKENS: u32 = 256;

    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            top_p: None,
            n: None,
            stream: None,
            stop: None,
        }
    }

    pub fn with_top_p(mut self, value: u32) -> Self {
        self.top_p = Some(value);
        self
    }

    pub fn with_n(mut self, value: u32) -> Self {
        self.n = Some(value);
        self
    }

    pub fn with_stream(mut self, value: bool) -> Self {
        self.stream = Some(value);
        self
    }

    pub fn with_stop(mut self, value: impl Into<String>) -> Self {
        self.stop = Some(value.into());
        self
    }

    /// Reads a JSON config file such as `{"max_tokens": 64, "stop": "\n"}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| FixtureError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity checks for user-supplied files and flags. Processors accept
    /// any values.
    pub fn validate(&self) -> Result<(), FixtureError> {
        if self.max_tokens == 0 {
            return Err(FixtureError::InvalidConfig(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        if self.stop.as_deref().is_some_and(str::is_empty) {
            return Err(FixtureError::InvalidConfig(
                "stop must not be empty when set".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn request(&self, prompt: &str, temperature: Temperature) -> CompletionRequest {
        CompletionRequest::new(prompt, temperature, self.max_tokens)
            .with_n(self.n)
            .with_top_p(self.top_p)
            .with_stop(self.stop.clone())
            .with_stream(self.stream)
    }
}
