use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use promptmock_core::{
    CompletionRequest, CompletionResponse, PromptMockError, Runnable, StreamEvent,
};
use promptmock_fixtures::{FileProcessor, FixtureLoader, FixtureSet, OutputsByRequest};
use tracing::debug;

/// Upper bound on `n`, matching the completion API limit.
pub const MAX_CHOICES: u32 = 128;

#[derive(Debug, Default)]
struct MockEntry {
    outputs: Vec<String>,
    cursor: AtomicUsize,
}

/// Completion LLM that answers only the requests registered with it.
///
/// Requests are matched on every field. Each call hands out `n` choices
/// (one when `n` is unset), continuing where the previous call for the same
/// request stopped and wrapping around the registered outputs.
#[derive(Debug, Default)]
pub struct MockCompletionLlm {
    entries: HashMap<CompletionRequest, MockEntry>,
}

impl MockCompletionLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: FixtureSet) -> Self {
        let mut llm = Self::new();
        llm.register_all(fixtures.into_inner());
        llm
    }

    /// Loads every fixture directory under `root` that `processor` supports.
    pub fn from_fixture_dir<P: FileProcessor>(
        root: impl AsRef<Path>,
        processor: P,
    ) -> Result<Self, PromptMockError> {
        let fixtures = FixtureLoader::new(processor).load(root)?;
        Ok(Self::from_fixtures(fixtures))
    }

    pub fn register(&mut self, request: CompletionRequest, output: impl Into<String>) -> &mut Self {
        self.entries
            .entry(request)
            .or_default()
            .outputs
            .push(output.into());
        self
    }

    pub fn register_all(&mut self, outputs: OutputsByRequest) -> &mut Self {
        for (request, texts) in outputs {
            self.entries.entry(request).or_default().outputs.extend(texts);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, request: &CompletionRequest) -> bool {
        self.entries.contains_key(request)
    }

    pub fn outputs(&self, request: &CompletionRequest) -> Option<&[String]> {
        self.entries
            .get(request)
            .map(|entry| entry.outputs.as_slice())
    }

    fn respond(&self, request: &CompletionRequest) -> Result<CompletionResponse, PromptMockError> {
        let entry = self
            .entries
            .get(request)
            .ok_or_else(|| PromptMockError::NoMockResponse {
                prompt: request.prompt.clone(),
            })?;
        if entry.outputs.is_empty() {
            return Err(PromptMockError::EmptyMock {
                prompt: request.prompt.clone(),
            });
        }

        let n = request.n.unwrap_or(1).max(1);
        if n > MAX_CHOICES {
            return Err(PromptMockError::InvalidConfig(format!(
                "n = {n} exceeds the limit of {MAX_CHOICES} choices"
            )));
        }
        let count = n as usize;
        let start = entry.cursor.fetch_add(count, Ordering::Relaxed);
        let total = entry.outputs.len();
        let texts = (0..count).map(|i| entry.outputs[start.wrapping_add(i) % total].clone());

        debug!(
            temperature = %request.temperature,
            choices = count,
            start = start % total,
            "serving mocked completion"
        );
        Ok(CompletionResponse::from_texts(texts))
    }
}

#[async_trait]
impl Runnable<CompletionRequest, CompletionResponse> for MockCompletionLlm {
    async fn invoke(&self, input: CompletionRequest) -> Result<CompletionResponse, PromptMockError> {
        self.respond(&input)
    }

    fn stream(
        &self,
        input: CompletionRequest,
    ) -> BoxStream<'_, Result<StreamEvent, PromptMockError>> {
        let events: Vec<Result<StreamEvent, PromptMockError>> = match self.respond(&input) {
            Ok(response) => {
                let answer = response.content().to_string();
                response
                    .choices
                    .into_iter()
                    .map(|choice| Ok(StreamEvent::ContentChunk(choice.text)))
                    .chain(std::iter::once(Ok(StreamEvent::FinalAnswer(answer))))
                    .collect()
            }
            Err(err) => vec![Err(err)],
        };
        futures::stream::iter(events).boxed()
    }
}
