use itertools::{EitherOrBoth, Itertools};

use crate::error::ScoreError;

/// Outcome of scoring one submission against its prompt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreResult {
    pub wpm: f64,
    /// Fraction of submitted words matching the prompt at the same position.
    /// Not clamped.
    pub accuracy: f64,
    pub net_wpm: f64,
    pub word_count: usize,
    pub error_count: usize,
}

/// Score `submitted` against `prompt`, typed over `elapsed_secs` seconds.
///
/// Both texts are split on whitespace with no case or punctuation
/// normalisation. Words are compared by position; a submitted word past the
/// end of the prompt counts as a mismatch.
pub fn score(prompt: &str, submitted: &str, elapsed_secs: f64) -> Result<ScoreResult, ScoreError> {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return Err(ScoreError::InvalidDuration { elapsed_secs });
    }

    let prompt_words = prompt.split_whitespace().collect::<Vec<&str>>();
    let submitted_words = submitted.split_whitespace().collect::<Vec<&str>>();

    let word_count = submitted_words.len();
    if word_count == 0 {
        return Err(ScoreError::EmptySubmission);
    }

    let error_count = count_errors(&prompt_words, &submitted_words);

    let wpm = word_count as f64 / (elapsed_secs / 60.0);
    let accuracy = 1.0 - (error_count as f64 / word_count as f64);

    Ok(ScoreResult {
        wpm,
        accuracy,
        net_wpm: wpm * accuracy,
        word_count,
        error_count,
    })
}

/// Positional mismatches. Prompt words beyond the submission are not errors.
pub fn count_errors(prompt_words: &[&str], submitted_words: &[&str]) -> usize {
    submitted_words
        .iter()
        .zip_longest(prompt_words.iter())
        .filter(|pair| match pair {
            EitherOrBoth::Both(typed, expected) => typed != expected,
            EitherOrBoth::Left(_) => true,
            EitherOrBoth::Right(_) => false,
        })
        .count()
}
