use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::leaderboard::LEADERBOARD_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Passage file; the embedded corpus is used when unset
    pub corpus_path: Option<PathBuf>,
    /// Leaderboard database; the state directory is used when unset
    pub db_path: Option<PathBuf>,
    pub leaderboard_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: None,
            db_path: None,
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typesprint_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, writing the defaults out on first run so there is a
    /// file to edit.
    pub fn load_or_create(&self) -> Config {
        if self.path.exists() {
            return self.load();
        }

        let cfg = Config::default();
        match self.save(&cfg) {
            Ok(()) => info!("wrote default config to {}", self.path.display()),
            Err(err) => warn!("could not write config {}: {err}", self.path.display()),
        }
        cfg
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing file means defaults; an unreadable one is logged and ignored.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("ignoring invalid config {}: {err}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
