use dirs::{data_dir, home_dir};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const APP_DIR_NAME: &str = "budget_ledger";
const HOME_OVERRIDE_ENV: &str = "BUDGET_LEDGER_HOME";
const BOOK_DIR: &str = "books";
const BACKUP_DIR: &str = "backups";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";

/// Resolves every on-disk location used by the application from a single base directory.
pub struct PathResolver;

impl PathResolver {
    /// Application base directory: `BUDGET_LEDGER_HOME`, else the platform data dir, else `~`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_OVERRIDE_ENV) {
            return PathBuf::from(custom);
        }
        data_dir()
            .or_else(home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn book_dir_in(base: &Path) -> PathBuf {
        base.join(BOOK_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn config_backup_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_BACKUP_DIR)
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
