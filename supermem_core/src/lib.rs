//! SuperMem Core - vocabulary trainer library
//!
//! Text-file storage for bilingual dictionaries and the learner roster, plus
//! the confidence-driven quiz engine used by the `supermem` binary.

pub mod codec;
pub mod config;
pub mod credentials;
pub mod db;
pub mod diagnostics;
pub mod dictionaries;
pub mod error;
pub mod fuzzy;
pub mod models;
pub mod persistence;
pub mod progress;
pub mod questions;
pub mod users;

pub use codec::{
    deserialize_dictionary, deserialize_user, deserialize_word, serialize_dictionary, serialize_user,
    serialize_word, UserRecord,
};
pub use config::{load_config, Config};
pub use credentials::{Argon2Credentials, Credentials};
pub use db::Database;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use dictionaries::DictionaryStore;
pub use error::{Error, Result};
pub use fuzzy::{check_answer, MatchResult};
pub use models::{Dictionary, LearningTrack, User, Word, WordType};
pub use progress::{answer_question, track_stats, unlock_next_word, AnswerOutcome, SessionStats, TrackStats};
pub use questions::{generate_quiz, order_positions, Direction, OrderingMode, Question};
pub use users::{link_dictionaries, reconcile_confidences, UserStore};
