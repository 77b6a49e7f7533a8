//! Application data - dictionaries and the user roster loaded together

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::dictionaries::DictionaryStore;
use crate::error::Result;
use crate::users::UserStore;

/// Everything the application keeps in memory between startup and shutdown
#[derive(Debug)]
pub struct Database {
    pub dictionaries: DictionaryStore,
    pub users: UserStore,
    users_file: PathBuf,
}

impl Database {
    /// Load the dictionaries first, then the users linked against them.
    ///
    /// `dictionary_files` overrides the configured dictionaries directory.
    pub fn open(config: &Config, dictionary_files: Option<&[PathBuf]>, diag: &mut Diagnostics) -> Result<Self> {
        let dictionaries = DictionaryStore::load(dictionary_files, &config.dictionaries_dir, diag)?;
        let users = UserStore::load(&config.users_file, &dictionaries, diag)?;
        log::info!(
            "Opened database: {} dictionaries, {} users",
            dictionaries.len(),
            users.len()
        );
        Ok(Self {
            dictionaries,
            users,
            users_file: config.users_file.clone(),
        })
    }

    pub fn users_file(&self) -> &Path {
        &self.users_file
    }

    /// Write the roster back to disk.
    ///
    /// Dictionaries are left untouched: nothing edits them, and rewriting
    /// would drop the lines the loader skipped.
    pub fn save(&self) -> Result<()> {
        self.users.export(&self.users_file)
    }
}
