//! Request validation for generation submissions.

use crate::error::CoreError;

/// Shortest video the worker will produce.
pub const MIN_DURATION_SECS: u32 = 3;
/// Longest video the worker will produce.
pub const MAX_DURATION_SECS: u32 = 120;
/// Duration used when the caller does not supply one.
pub const DEFAULT_DURATION_SECS: u32 = 10;

/// Validate a user prompt and return it trimmed.
///
/// Rejects prompts that are empty after trimming whitespace.
pub fn validate_prompt(prompt: &str) -> Result<&str, CoreError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Prompt cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Validate a requested duration against the supported range.
pub fn validate_duration(duration_seconds: u32) -> Result<(), CoreError> {
    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration_seconds) {
        return Err(CoreError::Validation(format!(
            "Duration must be between {MIN_DURATION_SECS} and {MAX_DURATION_SECS} seconds, got {duration_seconds}"
        )));
    }
    Ok(())
}
