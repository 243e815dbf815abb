//! The typing-test lifecycle.
//!
//! ```text
//! Idle --start--> Running --submit--> Submitted --score--> Scored --save--> Saved --> Idle
//!                  |  ^                                       |
//!                  +--+ blank submit                          +-- retry (any phase) --> Idle
//! ```
//!
//! A [`Session`] is a plain owned value. Either drive it through the `&mut`
//! methods, which leave it untouched when they fail, or hand it to
//! [`Session::apply`] and keep the session that comes back.

use chrono::{DateTime, Local};
use log::{debug, warn};
use rand::RngCore;

use crate::corpus::{choose_random_prompt, Corpus};
use crate::error::SessionError;
use crate::leaderboard::{LeaderboardStore, NewScore, ScoreRecord};
use crate::runtime::Clock;
use crate::scorer::{self, ScoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Submitted,
    Scored,
    /// Passed through inside [`Session::save`] between the append and the
    /// reset; a session is never left in this phase.
    Saved,
}

/// One typing-test attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    phase: Phase,
    prompt: Option<String>,
    started_at: Option<DateTime<Local>>,
    ended_at: Option<DateTime<Local>>,
    submitted: Option<String>,
    last_result: Option<ScoreResult>,
}

/// User-driven events
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Submit(String),
    Save(String),
    Retry,
}

/// What a successful action did
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Started,
    Scored(ScoreResult),
    Saved(ScoreRecord),
    Reset,
}

/// Collaborators a transition may need
pub struct SessionContext<'a> {
    pub corpus: &'a Corpus,
    pub store: &'a dyn LeaderboardStore,
    pub clock: &'a dyn Clock,
    pub rng: &'a mut dyn RngCore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    pub fn submitted(&self) -> Option<&str> {
        self.submitted.as_deref()
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last_result.as_ref()
    }

    /// Input is accepted only while the test is running
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Seconds between start and submission, or start and `now` while running
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> Option<f64> {
        let start = self.started_at?;
        let end = self.ended_at.unwrap_or(now);
        let elapsed = end - start;
        Some(match elapsed.num_microseconds() {
            Some(micros) => micros as f64 / 1_000_000.0,
            None => elapsed.num_milliseconds() as f64 / 1000.0,
        })
    }

    /// Idle → Running with a fresh random prompt
    pub fn start<R: RngCore + ?Sized>(
        &mut self,
        corpus: &Corpus,
        rng: &mut R,
        now: DateTime<Local>,
    ) -> Result<(), SessionError> {
        self.expect_phase("start", Phase::Idle)?;

        *self = Session {
            phase: Phase::Running,
            prompt: Some(choose_random_prompt(corpus, rng)),
            started_at: Some(now),
            ..Session::default()
        };
        debug!("session started at {now}");
        Ok(())
    }

    /// Running → Submitted → Scored.
    ///
    /// A blank submission is rejected without touching the session. If the
    /// elapsed time is not positive the session stays `Submitted` with no
    /// result and no end time, and only [`Session::retry`] leaves it.
    pub fn submit(&mut self, text: &str, now: DateTime<Local>) -> Result<ScoreResult, SessionError> {
        self.expect_phase("submit", Phase::Running)?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("rejected empty submission");
            return Err(SessionError::EmptySubmission);
        }

        let prompt = self.prompt.as_deref().unwrap_or_default();
        let elapsed_secs = self.elapsed_secs(now).unwrap_or_default();
        let scored = scorer::score(prompt, trimmed, elapsed_secs);

        self.phase = Phase::Submitted;
        self.submitted = Some(trimmed.to_string());

        match scored {
            Ok(result) => {
                self.ended_at = Some(now);
                debug!(
                    "scored {} words in {elapsed_secs:.2}s: {:.2} wpm, {} errors",
                    result.word_count, result.wpm, result.error_count
                );
                self.last_result = Some(result);
                self.phase = Phase::Scored;
                Ok(result)
            }
            Err(err) => {
                warn!("could not score submission: {err}");
                Err(err.into())
            }
        }
    }

    /// Scored → Saved → Idle. On failure the session stays `Scored` so the
    /// save can be retried.
    pub fn save(
        &mut self,
        name: &str,
        store: &dyn LeaderboardStore,
    ) -> Result<ScoreRecord, SessionError> {
        self.expect_phase("save", Phase::Scored)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let Some(result) = self.last_result else {
            return Err(SessionError::InvalidAction {
                action: "save",
                phase: self.phase,
            });
        };

        let record = store
            .append(&NewScore {
                name: name.to_string(),
                wpm: result.wpm,
                accuracy: result.accuracy,
                net_wpm: result.net_wpm,
            })
            .map_err(|err| {
                warn!("saving score failed: {err}");
                SessionError::from(err)
            })?;

        self.phase = Phase::Saved;
        self.reset();
        Ok(record)
    }

    /// Back to Idle from anywhere. The next prompt is chosen on start.
    pub fn retry(&mut self) {
        debug!("session reset from {}", self.phase);
        self.reset();
    }

    /// Explicit event handler: consume this session and return the next one
    /// together with what happened.
    pub fn apply(
        mut self,
        action: Action,
        ctx: &mut SessionContext<'_>,
    ) -> (Session, Result<Effect, SessionError>) {
        let outcome = match action {
            Action::Start => self
                .start(ctx.corpus, &mut *ctx.rng, ctx.clock.now())
                .map(|()| Effect::Started),
            Action::Submit(text) => self.submit(&text, ctx.clock.now()).map(Effect::Scored),
            Action::Save(name) => self.save(&name, ctx.store).map(Effect::Saved),
            Action::Retry => {
                self.retry();
                Ok(Effect::Reset)
            }
        };
        (self, outcome)
    }

    fn reset(&mut self) {
        *self = Session::default();
    }

    fn expect_phase(&self, action: &'static str, phase: Phase) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidAction {
                action,
                phase: self.phase,
            })
        }
    }
}
