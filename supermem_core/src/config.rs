use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "supermem.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub users_file: PathBuf,
    pub dictionaries_dir: PathBuf,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("data/users/users.txt"),
            dictionaries_dir: PathBuf::from("data/dictionaries"),
            log_level: "warn".to_string(),
        }
    }
}

pub fn load_config_from_file(file_path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(file_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::MissingFile(file_path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    Ok(toml::from_str::<Config>(&contents)?)
}

/// Load `explicit` if given (it must exist), otherwise `supermem.toml` from the
/// working directory when present, otherwise the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => load_config_from_file(path),
        None => match load_config_from_file(Path::new(DEFAULT_CONFIG_FILE)) {
            Err(Error::MissingFile(_)) => Ok(Config::default()),
            other => other,
        },
    }
}
