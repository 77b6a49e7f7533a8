//! User store - the learner roster and its file
//!
//! The whole roster is read at startup and written back at shutdown, one user
//! per line (see [`crate::codec`]).

use std::path::Path;

use crate::codec::{deserialize_user, serialize_user, UserRecord};
use crate::credentials::Credentials;
use crate::diagnostics::Diagnostics;
use crate::dictionaries::DictionaryStore;
use crate::error::{Error, Result};
use crate::models::{LearningTrack, User};
use crate::persistence::{read_text, write_atomically};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub const VALID_USERNAME_MSG: &str =
    "Username should be at least 3 characters and contain only letters A-Z, a-z and numbers.";
pub const VALID_PASSWORD_MSG: &str =
    "Password should be at least 6 characters and contain only letters A-Z, a-z and numbers.";

pub fn is_username_valid(username: &str) -> bool {
    username.len() >= MIN_USERNAME_LEN && username.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_password_valid(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN && password.chars().all(|c| c.is_ascii_alphanumeric())
}

/// All registered users, in registration order
#[derive(Debug, Default)]
pub struct UserStore {
    users: Vec<User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the roster from `path`. A missing file is an empty roster.
    pub fn load(path: &Path, dictionaries: &DictionaryStore, diag: &mut Diagnostics) -> Result<Self> {
        match read_text(path, diag) {
            Ok(text) => Ok(Self::parse(&text, &path.display().to_string(), dictionaries, diag)),
            Err(Error::MissingFile(_)) => {
                log::info!("No user file at {}, starting with an empty roster", path.display());
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Build a roster from file contents; `source` names the file in diagnostics.
    pub fn parse(text: &str, source: &str, dictionaries: &DictionaryStore, diag: &mut Diagnostics) -> Self {
        let mut store = Self::new();
        for (line_idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let record = match deserialize_user(line) {
                Ok(record) => record,
                Err(e) => {
                    diag.error(format!(
                        "Invalid user on line {} of {} will be skipped: {}",
                        line_idx + 1,
                        source,
                        e
                    ));
                    continue;
                }
            };
            if store.find(&record.username).is_some() {
                diag.warn(format!(
                    "Duplicate user {} on line {} of {} will be skipped",
                    record.username,
                    line_idx + 1,
                    source
                ));
                continue;
            }

            let mut user = assemble_user(record, diag);
            link_dictionaries(&mut user, dictionaries, diag);
            reconcile_confidences(&mut user);
            store.users.push(user);
        }
        log::info!("Loaded {} users from {}", store.users.len(), source);
        store
    }

    /// One line per user. A user that cannot be serialized is logged and left
    /// out so the rest of the roster is still written.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for user in &self.users {
            match serialize_user(user) {
                Ok(line) => {
                    text.push_str(&line);
                    text.push('\n');
                }
                Err(e) => log::error!("User {} cannot be saved and is left out: {}", user.username, e),
            }
        }
        text
    }

    /// Overwrite `path` with the current roster.
    pub fn export(&self, path: &Path) -> Result<()> {
        write_atomically(path, &self.to_text())?;
        log::info!("Saved {} users to {}", self.users.len(), path.display());
        Ok(())
    }

    /// Create a user after checking the username and password rules.
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        main_language: &str,
        credentials: &dyn Credentials,
    ) -> Result<&mut User> {
        if !is_username_valid(username) {
            return Err(Error::Validation(VALID_USERNAME_MSG.to_string()));
        }
        if self.find(username).is_some() {
            return Err(Error::Validation(format!(
                "Username {} is already taken.",
                username
            )));
        }
        if !is_password_valid(password) {
            return Err(Error::Validation(VALID_PASSWORD_MSG.to_string()));
        }

        let hash = credentials.hash(password)?;
        self.users.push(User::new(username, &hash, main_language));
        log::info!("Registered user {}", username);
        let last = self.users.len() - 1;
        Ok(&mut self.users[last])
    }

    /// Position of the user matching both `username` and `password`.
    pub fn authenticate(&self, username: &str, password: &str, credentials: &dyn Credentials) -> Result<usize> {
        let position = self
            .users
            .iter()
            .position(|u| u.username == username)
            .ok_or(Error::InvalidCredentials)?;
        if credentials.verify(password, &self.users[position].password_hash) {
            Ok(position)
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    pub fn find(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn get(&self, position: usize) -> Option<&User> {
        self.users.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut User> {
        self.users.get_mut(position)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Turn a stored record into a user with one track per active language.
///
/// Missing word counts default to 0 and extra ones are dropped. Entries naming
/// the main language, or repeating a language, are dropped.
pub fn assemble_user(mut record: UserRecord, diag: &mut Diagnostics) -> User {
    let languages = record.active_languages.len();
    if record.active_words.len() != languages {
        diag.warn(format!(
            "User {} has {} word counts for {} languages",
            record.username,
            record.active_words.len(),
            languages
        ));
        record.active_words.resize(languages, 0);
    }
    record.reconcile();

    let mut user = User::new(&record.username, &record.password_hash, &record.main_language);
    let entries = record
        .active_languages
        .into_iter()
        .zip(record.active_words)
        .zip(record.confidences);
    for ((language, unlocked), confidences) in entries {
        if language == user.main_language || user.is_learning(&language) {
            diag.warn(format!(
                "User {} lists {} more than once or as both main and learned language, entry dropped",
                user.username, language
            ));
            continue;
        }
        user.tracks.push(LearningTrack {
            language,
            unlocked,
            confidences,
            dictionary: None,
        });
    }
    user
}

/// Attach each track to the first dictionary pairing it with the main language.
pub fn link_dictionaries(user: &mut User, dictionaries: &DictionaryStore, diag: &mut Diagnostics) {
    for track in &mut user.tracks {
        track.dictionary = dictionaries.find_pair(&user.main_language, &track.language);
        match &track.dictionary {
            Some(dictionary) if track.unlocked > dictionary.len() => {
                diag.warn(format!(
                    "User {} unlocked {} {} words but the dictionary has {}",
                    user.username,
                    track.unlocked,
                    track.language,
                    dictionary.len()
                ));
                track.unlocked = dictionary.len();
            }
            Some(_) => {}
            None => diag.error(
                Error::Link {
                    main: user.main_language.clone(),
                    language: track.language.clone(),
                }
                .to_string(),
            ),
        }
    }
}

/// Resize every track's confidences to its unlocked count. Idempotent.
pub fn reconcile_confidences(user: &mut User) {
    user.reconcile_confidences();
}
