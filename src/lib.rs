// Library surface for the binary and integration tests.
// Terminal rendering lives in the binary only.
pub mod app_dirs;
pub mod config;
pub mod corpus;
pub mod error;
pub mod leaderboard;
pub mod logging;
pub mod runtime;
pub mod scorer;
pub mod session;

pub use error::{CorpusError, ScoreError, SessionError, StoreError};
pub use session::{Action, Effect, Phase, Session, SessionContext};
