/// Where the prompt text was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// A JSON object carrying `prompt` or `user_prompt`.
    Json,
    /// A JSON object without a usable prompt field.
    JsonWithoutPrompt,
    /// Anything else, taken literally.
    Raw,
}

/// Result of normalizing one incoming utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    /// The original unmodified input.
    pub raw_text: String,
    pub source: InputSource,
    /// Prompt after collapsing whitespace and lower-casing.
    pub normalized_text: String,
}

impl NormalizedInput {
    pub fn is_empty(&self) -> bool {
        self.normalized_text.is_empty()
    }
}
