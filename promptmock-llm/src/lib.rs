mod mock;

pub use mock::{MockCompletionLlm, MAX_CHOICES};
pub use promptmock_core::{Choice, CompletionRequest, CompletionResponse, Temperature};

use promptmock_core::Runnable;

pub trait Llm: Runnable<CompletionRequest, CompletionResponse> {}

impl<T> Llm for T where T: Runnable<CompletionRequest, CompletionResponse> {}
