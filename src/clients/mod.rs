//! HTTP clients for the inference services behind `/chat`.

pub mod ollama;
pub mod openai;

use lazy_static::lazy_static;
use regex::Regex;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

// Removes <think>...</think> tags and their content from a model reply.
lazy_static! {
    static ref RE_THINK_TAGS: Regex = Regex::new(r"(?s)<think>.*?</think>").unwrap();
}

pub fn clean_ai_output(text: &str) -> String {
    RE_THINK_TAGS.replace_all(text, "").trim().to_string()
}

/// First `max` characters of a response body, for logs.
pub(crate) fn preview(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
