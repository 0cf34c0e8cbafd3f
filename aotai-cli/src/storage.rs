//! JSON-file backed death ledger
use aotai_game::{DeathLedger, LedgerError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LEDGER_FILE: &str = "deaths.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    deaths: u32,
}

/// Platform data directory for aotai.
///
/// Follows platform conventions:
/// - macOS: `~/Library/Application Support/aotai`
/// - Linux: `~/.local/share/aotai` (or `$XDG_DATA_HOME/aotai`)
/// - Windows: `%APPDATA%\aotai`
/// - Fallback: `./save_data`
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "aotai")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

#[derive(Debug, Clone)]
pub struct FileDeathLedger {
    path: PathBuf,
}

impl FileDeathLedger {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(LEDGER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<LedgerFile, LedgerError> {
        if !self.path.exists() {
            return Ok(LedgerFile::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl DeathLedger for FileDeathLedger {
    fn load(&self) -> Result<u32, LedgerError> {
        self.read().map(|file| file.deaths)
    }

    fn record_death(&mut self) -> Result<u32, LedgerError> {
        let mut file = self.read()?;
        file.deaths = file.deaths.saturating_add(1);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        log::debug!("death ledger at {} now {}", self.path.display(), file.deaths);
        Ok(file.deaths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileDeathLedger::in_dir(&dir.path().join("nested"));
        assert_eq!(ledger.load().unwrap(), 0);
    }

    #[test]
    fn deaths_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = FileDeathLedger::in_dir(&dir.path().join("nested"));
        assert_eq!(ledger.record_death().unwrap(), 1);
        assert_eq!(ledger.record_death().unwrap(), 2);
        let reopened = FileDeathLedger::in_dir(&dir.path().join("nested"));
        assert_eq!(reopened.load().unwrap(), 2);
    }

    #[test]
    fn corrupt_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileDeathLedger::in_dir(dir.path());
        fs::write(ledger.path(), "not json").unwrap();
        assert!(matches!(ledger.load(), Err(LedgerError::Parse(_))));
    }
}
