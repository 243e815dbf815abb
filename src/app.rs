use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, warn};
use rand::rngs::StdRng;
use std::error::Error;
use std::sync::Arc;

use typesprint::{
    corpus::Corpus,
    leaderboard::{LeaderboardStore, ScoreRecord},
    runtime::Clock,
    Action, Effect, Phase, Session, SessionContext, SessionError,
};

/// One-line message under the test area
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Terminal front end state: the session plus what the user is typing
pub struct App {
    pub session: Session,
    pub corpus: Corpus,
    pub store: Arc<dyn LeaderboardStore>,
    pub clock: Arc<dyn Clock>,
    rng: StdRng,
    /// Answer being typed while the test runs
    pub input: String,
    /// Name being typed once the result is in
    pub name: String,
    pub notice: Option<Notice>,
    pub leaderboard: Vec<ScoreRecord>,
    pub leaderboard_size: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        corpus: Corpus,
        store: Arc<dyn LeaderboardStore>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
        leaderboard_size: usize,
    ) -> Self {
        let mut app = Self {
            session: Session::new(),
            corpus,
            store,
            clock,
            rng,
            input: String::new(),
            name: String::new(),
            notice: None,
            leaderboard: Vec::new(),
            leaderboard_size,
            should_quit: false,
        };
        app.refresh_leaderboard();
        app
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.dispatch(Action::Retry),
            KeyCode::Enter => match self.session.phase() {
                Phase::Idle => self.dispatch(Action::Start),
                Phase::Running => self.dispatch(Action::Submit(self.input.clone())),
                Phase::Scored => self.dispatch(Action::Save(self.name.clone())),
                _ => {}
            },
            KeyCode::Backspace => {
                if let Some(buf) = self.active_buffer() {
                    buf.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buf) = self.active_buffer() {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }

    /// Run one action through the session and update the view state
    pub fn dispatch(&mut self, action: Action) {
        let mut ctx = SessionContext {
            corpus: &self.corpus,
            store: self.store.as_ref(),
            clock: self.clock.as_ref(),
            rng: &mut self.rng,
        };
        let (next, outcome) = std::mem::take(&mut self.session).apply(action, &mut ctx);
        self.session = next;

        match outcome {
            Ok(Effect::Started) | Ok(Effect::Reset) => {
                self.input.clear();
                self.name.clear();
                self.notice = None;
            }
            Ok(Effect::Scored(_)) => self.notice = None,
            Ok(Effect::Saved(record)) => {
                self.input.clear();
                self.name.clear();
                self.notice = Some(Notice::Info(format!(
                    "Saved {} with {:.2} net wpm.",
                    record.name, record.net_wpm
                )));
                self.refresh_leaderboard();
            }
            Err(err) => self.on_error(err),
        }
    }

    pub fn refresh_leaderboard(&mut self) {
        match self.store.top_n(self.leaderboard_size) {
            Ok(records) => self.leaderboard = records,
            Err(err) => {
                warn!("could not load leaderboard: {err}");
                self.notice = Some(Notice::Error(format!(
                    "Could not load leaderboard: {}",
                    describe(&err)
                )));
            }
        }
    }

    fn on_error(&mut self, err: SessionError) {
        let message = match &err {
            SessionError::EmptySubmission => "Type the passage before submitting.".to_string(),
            SessionError::EmptyName => "Enter a name to save your score.".to_string(),
            SessionError::InvalidDuration { .. } => {
                format!("Could not score this attempt: {err}. Press Tab to retry.")
            }
            SessionError::Store(store_err) => {
                format!(
                    "Could not save score: {}. Press Enter to try again.",
                    describe(store_err)
                )
            }
            SessionError::InvalidAction { .. } => {
                debug!("ignored: {err}");
                return;
            }
        };
        self.notice = Some(Notice::Error(message));
    }

    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.session.phase() {
            Phase::Running => Some(&mut self.input),
            Phase::Scored => Some(&mut self.name),
            _ => None,
        }
    }
}

/// Error message followed by its innermost cause
fn describe(err: &dyn Error) -> String {
    match std::iter::successors(err.source(), |&e| e.source()).last() {
        Some(root) => format!("{err} ({root})"),
        None => err.to_string(),
    }
}
