use chrono::{DateTime, Local};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

/// Number of rows shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 5;

/// Largest leaderboard the idle screen will lay out
pub const MAX_LEADERBOARD_SIZE: usize = 50;

/// A result about to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub name: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub net_wpm: f64,
}

/// A persisted leaderboard entry
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub id: i64,
    pub name: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub net_wpm: f64,
    pub saved_at: DateTime<Local>,
}

/// Persists saved results and ranks them by net WPM
pub trait LeaderboardStore: Send + Sync {
    /// Insert one record; the store assigns id and timestamp.
    fn append(&self, score: &NewScore) -> Result<ScoreRecord, StoreError>;

    /// Up to `n` records by net WPM descending, ties in insertion order.
    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError>;
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS scores (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        wpm REAL NOT NULL,
        accuracy REAL NOT NULL,
        netwpm REAL NOT NULL,
        date TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_scores_netwpm ON scores(netwpm DESC);
"#;

/// SQLite-backed leaderboard
#[derive(Debug)]
pub struct SqliteLeaderboard {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteLeaderboard {
    /// Open the leaderboard at the default state location
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("typesprint_scores.db"));
        Self::open(path)
    }

    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        debug!("opened leaderboard at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        // Several sessions may write the same file
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Database file backing this store, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Total number of saved scores
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl LeaderboardStore for SqliteLeaderboard {
    fn append(&self, score: &NewScore) -> Result<ScoreRecord, StoreError> {
        let saved_at = Local::now();
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO scores (name, wpm, accuracy, netwpm, date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                score.name,
                score.wpm,
                score.accuracy,
                score.net_wpm,
                saved_at.to_rfc3339(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!(
            "saved score #{id} for {:?}: {:.2} net wpm",
            score.name, score.net_wpm
        );

        Ok(ScoreRecord {
            id,
            name: score.name.clone(),
            wpm: score.wpm,
            accuracy: score.accuracy,
            net_wpm: score.net_wpm,
            saved_at,
        })
    }

    fn top_n(&self, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, wpm, accuracy, netwpm, date
            FROM scores
            ORDER BY netwpm DESC, id ASC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], raw_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }

        Ok(records)
    }
}

/// Row as stored, before the timestamp is parsed
struct RawRow {
    id: i64,
    name: String,
    wpm: f64,
    accuracy: f64,
    net_wpm: f64,
    date: String,
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        name: row.get(1)?,
        wpm: row.get(2)?,
        accuracy: row.get(3)?,
        net_wpm: row.get(4)?,
        date: row.get(5)?,
    })
}

impl RawRow {
    fn into_record(self) -> Result<ScoreRecord, StoreError> {
        let saved_at = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|source| StoreError::Timestamp {
                id: self.id,
                value: self.date.clone(),
                source,
            })?
            .with_timezone(&Local);

        Ok(ScoreRecord {
            id: self.id,
            name: self.name,
            wpm: self.wpm,
            accuracy: self.accuracy,
            net_wpm: self.net_wpm,
            saved_at,
        })
    }
}
