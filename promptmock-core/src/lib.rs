mod error;
mod request;
mod response;
mod runnable;

pub use error::PromptMockError;
pub use request::{CompletionRequest, Temperature, TemperatureParseError};
pub use response::{Choice, CompletionResponse};
pub use runnable::{Runnable, StreamEvent};
