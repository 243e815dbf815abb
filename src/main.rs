mod app;
mod ui;

use crate::app::App;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use typesprint::{
    app_dirs::AppDirs,
    config::{Config, FileConfigStore},
    corpus::Corpus,
    leaderboard::{SqliteLeaderboard, MAX_LEADERBOARD_SIZE},
    logging,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, SystemClock, Ticker},
    CorpusError, Phase,
};

const TICK_RATE_MS: u64 = 100;

/// typing speed test with a local high-score leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a randomly chosen passage as fast and as accurately as you can. Results are scored in words per minute, scaled by word accuracy, and can be saved to a local leaderboard."
)]
pub struct Cli {
    /// passage file, one passage per block separated by lines containing only %%
    #[clap(short = 'c', long)]
    corpus: Option<PathBuf>,

    /// leaderboard database file
    #[clap(short = 'd', long)]
    db: Option<PathBuf>,

    /// number of leaderboard rows to show
    #[clap(short = 't', long, value_parser = clap::value_parser!(u16).range(1..=MAX_LEADERBOARD_SIZE as i64))]
    top: Option<u16>,

    /// practice on this text instead of a random passage
    #[clap(short = 'p', long)]
    prompt: Option<String>,
}

impl Cli {
    /// CLI flags win over the config file
    fn merge(&self, cfg: Config) -> Config {
        Config {
            corpus_path: self.corpus.clone().or(cfg.corpus_path),
            db_path: self.db.clone().or(cfg.db_path),
            leaderboard_size: self
                .top
                .map(usize::from)
                .unwrap_or(cfg.leaderboard_size)
                .clamp(1, MAX_LEADERBOARD_SIZE),
        }
    }

    fn load_corpus(&self, cfg: &Config) -> Result<Corpus, CorpusError> {
        match (&self.prompt, &cfg.corpus_path) {
            (Some(prompt), _) => Corpus::from_passages([prompt.as_str()]),
            (None, Some(path)) => Corpus::from_file(path),
            (None, None) => Corpus::embedded(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        if let Err(err) = logging::init(&log_path) {
            eprintln!("logging disabled: {err}");
        }
    }

    let cfg = cli.merge(FileConfigStore::new().load_or_create());
    let corpus = cli.load_corpus(&cfg)?;
    let store = match &cfg.db_path {
        Some(path) => SqliteLeaderboard::open(path)?,
        None => SqliteLeaderboard::open_default()?,
    };
    info!(
        "starting with {} passages, leaderboard at {:?}",
        corpus.len(),
        store.path()
    );

    let mut app = App::new(
        corpus,
        Arc::new(store),
        Arc::new(SystemClock),
        StdRng::from_entropy(),
        cfg.leaderboard_size,
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Draw, wait for the next event, apply it; until the user quits
fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        match runner.step() {
            AppEvent::Key(key) => app.on_key(key),
            AppEvent::Resize => {}
            // only the running timer changes between events
            AppEvent::Tick if app.session.phase() != Phase::Running => continue,
            AppEvent::Tick => {}
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
