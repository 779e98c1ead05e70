use crate::schema::Message;

/// Rough chars-per-token ratio
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate prompt tokens: floor(chars / 4) per message, summed.
/// Not tied to any real tokenizer.
pub fn estimate_tokens(messages: &[Message]) -> usize {
    messages
        .iter()
        .map(|m| m.content.chars().count() / CHARS_PER_TOKEN)
        .sum()
}
