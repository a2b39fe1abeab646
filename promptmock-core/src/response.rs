use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub index: u32,
    pub text: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl CompletionResponse {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = texts
            .into_iter()
            .zip(0u32..)
            .map(|(text, index)| Choice {
                index,
                text: text.into(),
            })
            .collect();
        Self { choices }
    }

    /// Text of the first choice, or an empty string when there are none.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map(|choice| choice.text.as_str())
            .unwrap_or_default()
    }
}
