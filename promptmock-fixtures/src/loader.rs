use std::path::Path;

use promptmock_core::CompletionRequest;
use serde::{Serialize, Serializer};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{FileProcessor, FixtureError, OutputsByRequest};

/// Every mocked request found under a fixture root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    outputs: OutputsByRequest,
}

impl FixtureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn get(&self, request: &CompletionRequest) -> Option<&[String]> {
        self.outputs.get(request).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompletionRequest, &[String])> {
        self.outputs
            .iter()
            .map(|(request, outputs)| (request, outputs.as_slice()))
    }

    pub fn total_outputs(&self) -> usize {
        self.outputs.values().map(Vec::len).sum()
    }

    /// Appends `other`'s outputs after any already held for the same request.
    pub fn merge(&mut self, other: OutputsByRequest) {
        for (request, outputs) in other {
            self.outputs.entry(request).or_default().extend(outputs);
        }
    }

    pub fn into_inner(self) -> OutputsByRequest {
        self.outputs
    }

    /// Entries ordered by prompt, then temperature, then max tokens.
    pub fn sorted(&self) -> Vec<(&CompletionRequest, &[String])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            a.prompt
                .cmp(&b.prompt)
                .then(a.temperature.cmp(&b.temperature))
                .then(a.max_tokens.cmp(&b.max_tokens))
        });
        entries
    }
}

impl From<OutputsByRequest> for FixtureSet {
    fn from(outputs: OutputsByRequest) -> Self {
        Self { outputs }
    }
}

#[derive(Serialize)]
struct FixtureEntry<'a> {
    request: &'a CompletionRequest,
    outputs: &'a [String],
}

impl Serialize for FixtureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.sorted()
                .into_iter()
                .map(|(request, outputs)| FixtureEntry { request, outputs }),
        )
    }
}

/// Walks a fixture tree and runs a [`FileProcessor`] over every directory it
/// supports, the root included.
#[derive(Debug, Clone)]
pub struct FixtureLoader<P> {
    processor: P,
}

impl<P: FileProcessor> FixtureLoader<P> {
    pub fn new(processor: P) -> Self {
        Self { processor }
    }

    pub fn load(&self, root: impl AsRef<Path>) -> Result<FixtureSet, FixtureError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(FixtureError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut fixtures = FixtureSet::new();
        let mut directories = 0usize;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_dir() || !self.processor.is_supported(entry.path()) {
                continue;
            }

            let outputs = self.processor.process_example(entry.path())?;
            debug!(
                dir = %entry.path().display(),
                requests = outputs.len(),
                "loaded fixture directory"
            );
            fixtures.merge(outputs);
            directories += 1;
        }

        info!(
            root = %root.display(),
            directories,
            requests = fixtures.len(),
            outputs = fixtures.total_outputs(),
            "loaded fixtures"
        );
        Ok(fixtures)
    }
}
