use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use promptmock_core::{CompletionRequest, Temperature};
use tracing::{debug, warn};

use crate::filename::{entry_name, TemperatureGrammar};
use crate::{FixtureError, ProcessorConfig};

/// Outputs grouped by the request that should produce them, in file then
/// split order.
pub type OutputsByRequest = HashMap<CompletionRequest, Vec<String>>;

const PROMPT_SUFFIX: &str = "prompt.txt";
const OUTPUT_MARKER: &str = "output_";
const PART_DELIMITER: &str = "---";
const MARKDOWN_BOLD: &str = "**";

/// Turns a path on disk into mocked request/response pairs.
pub trait FileProcessor {
    fn is_supported(&self, path: &Path) -> bool;

    /// Callers must check [`FileProcessor::is_supported`] first.
    fn process_example(&self, path: &Path) -> Result<OutputsByRequest, FixtureError>;
}

impl<T: FileProcessor + ?Sized> FileProcessor for &T {
    fn is_supported(&self, path: &Path) -> bool {
        (**self).is_supported(path)
    }

    fn process_example(&self, path: &Path) -> Result<OutputsByRequest, FixtureError> {
        (**self).process_example(path)
    }
}

/// Reads a directory holding one `prompt.txt` and any number of
/// `output_<D>_<D>` files.
///
/// Each output file may contain several completions separated by `---`.
/// Every completion is written out as the prompt followed by the generated
/// text, so a prompt-length prefix (in UTF-16 code units) is dropped from
/// each part.
/// Files ending in `.md` have `**` bold markers removed before splitting.
#[derive(Debug, Clone)]
pub struct PromptDirectoryProcessor {
    config: ProcessorConfig,
    grammar: TemperatureGrammar,
}

impl PromptDirectoryProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self, FixtureError> {
        Ok(Self {
            config,
            grammar: TemperatureGrammar::new()?,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    fn request(&self, prompt: &str, temperature: Temperature) -> CompletionRequest {
        self.config.request(prompt, temperature)
    }
}

impl FileProcessor for PromptDirectoryProcessor {
    fn is_supported(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        match list_entries(path) {
            Ok(entries) => {
                entries.iter().filter(|p| is_prompt_entry(p)).count() == 1
                    && entries.iter().any(|p| is_output_entry(p))
            }
            Err(err) => {
                debug!(error = %err, "treating unreadable directory as unsupported");
                false
            }
        }
    }

    fn process_example(&self, dir: &Path) -> Result<OutputsByRequest, FixtureError> {
        let entries = list_entries(dir)?;

        let prompts: Vec<&PathBuf> = entries.iter().filter(|p| is_prompt_entry(p)).collect();
        let prompt_path = match prompts.as_slice() {
            [single] => *single,
            _ => {
                return Err(FixtureError::PromptFileCount {
                    dir: dir.to_path_buf(),
                    found: prompts.len(),
                })
            }
        };

        let prompt_text = read_text(prompt_path)?;
        let prompt = strip_trailing_newline(&prompt_text);
        let prompt_units = utf16_len(prompt);

        let mut outputs_by_request = OutputsByRequest::new();
        for path in entries.iter().filter(|p| is_output_entry(p)) {
            let temperature = self.grammar.temperature(path)?;

            let mut contents = read_text(path)?;
            if entry_name(path).ends_with(".md") {
                contents = contents.replace(MARKDOWN_BOLD, "");
            }

            let mut kept = 0usize;
            for part in contents.split(PART_DELIMITER) {
                let Some(output) = output_from_part(part, prompt_units) else {
                    debug!(path = %path.display(), len = part.len(), "discarding short part");
                    continue;
                };
                if !part.starts_with(prompt) {
                    warn!(
                        path = %path.display(),
                        "output part does not begin with the prompt text"
                    );
                }
                outputs_by_request
                    .entry(self.request(prompt, temperature))
                    .or_default()
                    .push(output.to_string());
                kept += 1;
            }

            debug!(path = %path.display(), %temperature, outputs = kept, "processed output file");
        }

        Ok(outputs_by_request)
    }
}

fn list_entries(dir: &Path) -> Result<Vec<PathBuf>, FixtureError> {
    let read_error = |source| FixtureError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort();
    Ok(entries)
}

fn is_prompt_entry(path: &Path) -> bool {
    entry_name(path).ends_with(PROMPT_SUFFIX)
}

fn is_output_entry(path: &Path) -> bool {
    entry_name(path).contains(OUTPUT_MARKER)
}

/// Invalid UTF-8 is replaced with U+FFFD rather than failing the read.
fn read_text(path: &Path) -> Result<String, FixtureError> {
    let bytes = fs::read(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            debug!(path = %path.display(), "decoding non-UTF-8 file lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    })
}

fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Length in UTF-16 code units.
fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Parts no more than one unit longer than the prompt are separator
/// leftovers. A prefix ending inside a surrogate pair drops the whole
/// character.
fn output_from_part(part: &str, prompt_units: usize) -> Option<&str> {
    if utf16_len(part) <= prompt_units + 1 {
        return None;
    }
    let mut units = 0;
    let offset = part
        .char_indices()
        .find_map(|(offset, c)| {
            if units >= prompt_units {
                return Some(offset);
            }
            units += c.len_utf16();
            None
        })
        .unwrap_or(part.len());
    Some(strip_trailing_newline(&part[offset..]))
}
