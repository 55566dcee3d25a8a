// src/settings.rs
use dirs::data_dir;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key under which the last typed query is remembered.
pub const LAST_QUERY: &str = "lastQ";

const SETTINGS_FILE: &str = "settings.bin";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings encoding error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("no data directory available")]
    NoDataDir,
}

/// Small persistent key-value store.
#[derive(Debug)]
pub struct Settings {
    file: PathBuf,
    values: HashMap<String, String>,
}

/// Get the directory where settings are stored
fn get_settings_dir() -> Option<PathBuf> {
    Some(data_dir()?.join("browserSweep"))
}

impl Settings {
    /// Open the settings in the user's data directory.
    pub fn open() -> Result<Self, SettingsError> {
        let dir = get_settings_dir().ok_or(SettingsError::NoDataDir)?;
        Self::open_in(&dir)
    }

    /// Open (or start) the settings stored in `dir`.
    pub fn open_in(dir: &Path) -> Result<Self, SettingsError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let file = dir.join(SETTINGS_FILE);

        let values = if file.exists() {
            let mut buffer = Vec::new();
            File::open(&file)?.read_to_end(&mut buffer)?;
            match bincode::deserialize(&buffer) {
                Ok(values) => values,
                Err(e) => {
                    log::error!("Discarding unreadable settings file: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Settings { file, values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set a value and persist immediately.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        let encoded = bincode::serialize(&self.values)?;
        let mut file = File::create(&self.file)?;
        file.write_all(&encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::open_in(dir.path()).unwrap();
        assert_eq!(settings.get(LAST_QUERY), None);

        settings.set(LAST_QUERY, "host:*.example.com").unwrap();
        settings.set(LAST_QUERY, "rust").unwrap();

        let reopened = Settings::open_in(dir.path()).unwrap();
        assert_eq!(reopened.get(LAST_QUERY), Some("rust"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();
        let settings = Settings::open_in(dir.path()).unwrap();
        assert_eq!(settings.get(LAST_QUERY), None);
    }

    #[test]
    fn missing_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut settings = Settings::open_in(&nested).unwrap();
        settings.set("k", "v").unwrap();
        assert!(nested.join(SETTINGS_FILE).exists());
    }
}
