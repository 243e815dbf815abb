//! Error types shared by the scorer, the session state machine, the corpus
//! loader and the leaderboard store.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::Phase;

/// Errors from [`crate::scorer::score`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("elapsed time must be positive, got {elapsed_secs} seconds")]
    InvalidDuration { elapsed_secs: f64 },

    #[error("submission contains no words")]
    EmptySubmission,
}

/// Errors from leaderboard persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create leaderboard directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("leaderboard database error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid timestamp {value:?} in leaderboard row {id}")]
    Timestamp {
        id: i64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("leaderboard connection lock was poisoned")]
    Poisoned,
}

/// Errors raised by session transitions
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("nothing was typed, the test is still running")]
    EmptySubmission,

    #[error("elapsed time must be positive, got {elapsed_secs} seconds")]
    InvalidDuration { elapsed_secs: f64 },

    #[error("a name is required to save a score")]
    EmptyName,

    #[error("failed to save score")]
    Store(#[from] StoreError),

    #[error("cannot {action} while the session is {phase}")]
    InvalidAction { action: &'static str, phase: Phase },
}

impl From<ScoreError> for SessionError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::InvalidDuration { elapsed_secs } => {
                SessionError::InvalidDuration { elapsed_secs }
            }
            ScoreError::EmptySubmission => SessionError::EmptySubmission,
        }
    }
}

/// Errors while loading the passage corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedded corpus {name} is missing or not valid UTF-8")]
    MissingEmbedded { name: &'static str },

    #[error("corpus contains no passages")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_errors_map_to_session_errors() {
        let err: SessionError = ScoreError::InvalidDuration { elapsed_secs: 0.0 }.into();
        assert!(matches!(
            err,
            SessionError::InvalidDuration { elapsed_secs } if elapsed_secs == 0.0
        ));

        let err: SessionError = ScoreError::EmptySubmission.into();
        assert!(matches!(err, SessionError::EmptySubmission));
    }

    #[test]
    fn invalid_action_message_names_phase() {
        let err = SessionError::InvalidAction {
            action: "submit",
            phase: Phase::Idle,
        };
        assert_eq!(err.to_string(), "cannot submit while the session is idle");
    }

    #[test]
    fn store_error_keeps_sqlite_source() {
        use std::error::Error as _;

        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.source().is_some());
    }
}
