use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptMockError {
    #[error("No mock response registered for prompt '{prompt}'")]
    NoMockResponse { prompt: String },
    #[error("Mock for prompt '{prompt}' has no outputs")]
    EmptyMock { prompt: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Fixture loading failed: {0}")]
    Fixture(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}
