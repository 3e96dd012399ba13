use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;

pub const DEFAULT_HISTORY_LIMIT: usize = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub history_file: Option<PathBuf>,
    pub history_limit: usize,
    pub command_timeout: Option<Duration>,
    pub natural_language: bool,
    pub confirm_destructive: bool,
}

/// On-disk shape of `config.json`; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    history_file: Option<PathBuf>,
    history_limit: Option<usize>,
    timeout_secs: Option<u64>,
    natural_language: Option<bool>,
    confirm_destructive: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let data_dir = home.join(".rterm");
        Self {
            history_file: Some(data_dir.join("history.json")),
            data_dir,
            history_limit: DEFAULT_HISTORY_LIMIT,
            command_timeout: None,
            natural_language: true,
            confirm_destructive: true,
        }
    }
}

impl Config {
    /// Defaults, then `config.json` in the data directory, then the
    /// `RTERM_*` environment variables.
    pub fn load() -> Self {
        let mut config = Config::default();
        let path = config.data_dir.join("config.json");
        if path.exists() {
            if let Err(e) = config.apply_file(&path) {
                warn!("{}", e);
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))?;
        debug!("loaded config from {}", path.display());

        if let Some(history_file) = file.history_file {
            self.history_file = Some(expand_home(&history_file));
        }
        if let Some(limit) = file.history_limit {
            self.history_limit = limit;
        }
        if let Some(secs) = file.timeout_secs {
            self.command_timeout = timeout_from_secs(secs);
        }
        if let Some(enabled) = file.natural_language {
            self.natural_language = enabled;
        }
        if let Some(confirm) = file.confirm_destructive {
            self.confirm_destructive = confirm;
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RTERM_HISTORY_FILE") {
            self.history_file = Some(expand_home(Path::new(&path)));
        }
        if let Some(size) = lookup("RTERM_HISTORY_SIZE") {
            match size.trim().parse() {
                Ok(limit) => self.history_limit = limit,
                Err(_) => warn!("ignoring RTERM_HISTORY_SIZE={}: not a number", size),
            }
        }
        if let Some(secs) = lookup("RTERM_TIMEOUT") {
            match secs.trim().parse() {
                Ok(secs) => self.command_timeout = timeout_from_secs(secs),
                Err(_) => warn!("ignoring RTERM_TIMEOUT={}: not a number of seconds", secs),
            }
        }
        if let Some(flag) = lookup("RTERM_NL") {
            self.natural_language = !matches!(flag.trim(), "0" | "off" | "false" | "no");
        }
    }
}

// Zero means no limit
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn expand_home(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}
