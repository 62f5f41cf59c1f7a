use serde_json::Value;

use super::types::{InputSource, NormalizedInput};

/// Fields checked for prompt text, in order of preference.
const PROMPT_FIELDS: [&str; 2] = ["prompt", "user_prompt"];

/// Normalize raw hook input into lower-cased prompt text.
///
/// Never fails: input that is not a JSON object is treated as literal text.
pub fn normalize(input: &str) -> NormalizedInput {
    let (prompt, source) = extract_prompt(input);

    NormalizedInput {
        raw_text: input.to_string(),
        source,
        normalized_text: collapse_whitespace(&prompt).to_lowercase(),
    }
}

fn extract_prompt(input: &str) -> (String, InputSource) {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') {
        return (trimmed.to_string(), InputSource::Raw);
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => PROMPT_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(|prompt| (prompt.to_string(), InputSource::Json))
            .unwrap_or_else(|| (String::new(), InputSource::JsonWithoutPrompt)),
        Ok(_) => (trimmed.to_string(), InputSource::Raw),
        Err(error) => {
            tracing::debug!("input is not valid JSON, using raw text: {error}");
            (trimmed.to_string(), InputSource::Raw)
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
