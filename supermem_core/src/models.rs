//! Words, dictionaries and learners

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dictionaries::DictionaryStore;
use crate::error::{Error, Result};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 100;
pub const MAX_CONFIDENCE: u8 = 100;

/// Grammatical category of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordType {
    Noun,
    Verb,
    Adjective,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Expression,
    Unknown,
}

impl WordType {
    pub const ALL: [WordType; 9] = [
        WordType::Noun,
        WordType::Verb,
        WordType::Adjective,
        WordType::Pronoun,
        WordType::Preposition,
        WordType::Conjunction,
        WordType::Interjection,
        WordType::Expression,
        WordType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WordType::Noun => "noun",
            WordType::Verb => "verb",
            WordType::Adjective => "adjective",
            WordType::Pronoun => "pronoun",
            WordType::Preposition => "preposition",
            WordType::Conjunction => "conjunction",
            WordType::Interjection => "interjection",
            WordType::Expression => "expression",
            WordType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordType {
    type Err = String;

    fn from_str(tag: &str) -> std::result::Result<Self, Self::Err> {
        // Older dictionary files spell it "conjuction"
        if tag == "conjuction" {
            return Ok(WordType::Conjunction);
        }
        WordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| format!("Unknown word type: {}", tag))
    }
}

/// A translation pair with its difficulty level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub term_a: String,
    pub term_b: String,
    pub level: u8,
    pub word_type: WordType,
    /// Position among the successfully parsed words of its dictionary.
    pub index: usize,
}

impl Word {
    pub fn new(term_a: &str, term_b: &str, level: u8, word_type: WordType) -> Self {
        Self {
            term_a: term_a.to_string(),
            term_b: term_b.to_string(),
            level,
            word_type,
            index: 0,
        }
    }
}

/// Ordered word list between two languages.
///
/// The order of `words` is the learning order: a learner who has unlocked
/// `n` words knows exactly `words[..n]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dictionary {
    pub language_a: String,
    pub language_b: String,
    pub words: Vec<Word>,
}

impl Dictionary {
    pub fn new(language_a: &str, language_b: &str, mut words: Vec<Word>) -> Self {
        for (i, word) in words.iter_mut().enumerate() {
            word.index = i;
        }
        Self {
            language_a: language_a.to_string(),
            language_b: language_b.to_string(),
            words,
        }
    }

    /// True if this dictionary translates between `first` and `second`, in either order.
    pub fn pairs(&self, first: &str, second: &str) -> bool {
        (self.language_a == first && self.language_b == second)
            || (self.language_a == second && self.language_b == first)
    }

    pub fn other_language(&self, language: &str) -> Option<&str> {
        if self.language_a == language {
            Some(&self.language_b)
        } else if self.language_b == language {
            Some(&self.language_a)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// A learner's progress in one language
#[derive(Debug, Clone, PartialEq)]
pub struct LearningTrack {
    pub language: String,
    /// Number of dictionary words unlocked so far.
    pub unlocked: usize,
    /// One score per unlocked word, aligned with dictionary positions.
    pub confidences: Vec<u8>,
    /// Derived on load, never persisted. `None` when no dictionary pairs this
    /// language with the learner's main language.
    pub dictionary: Option<Rc<Dictionary>>,
}

impl LearningTrack {
    pub fn new(language: &str, dictionary: Option<Rc<Dictionary>>) -> Self {
        Self {
            language: language.to_string(),
            unlocked: 0,
            confidences: Vec::new(),
            dictionary,
        }
    }

    /// Resize the confidence list to exactly `unlocked`, padding with zeros.
    pub fn reconcile(&mut self) {
        self.confidences.resize(self.unlocked, 0);
    }

    pub fn dictionary(&self) -> Result<&Dictionary> {
        self.dictionary
            .as_deref()
            .ok_or_else(|| Error::TrackUnavailable(self.language.clone()))
    }

    /// The unlocked prefix of the dictionary.
    pub fn learned_words(&self) -> Result<&[Word]> {
        let dictionary = self.dictionary()?;
        let end = self.unlocked.min(dictionary.len());
        Ok(&dictionary.words[..end])
    }

    pub fn is_usable(&self) -> bool {
        self.dictionary.is_some()
    }
}

/// A registered learner
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    /// Opaque output of [`crate::credentials::Credentials::hash`].
    pub password_hash: String,
    pub main_language: String,
    pub tracks: Vec<LearningTrack>,
}

impl User {
    pub fn new(username: &str, password_hash: &str, main_language: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            main_language: main_language.to_string(),
            tracks: Vec::new(),
        }
    }

    pub fn track(&self, language: &str) -> Option<&LearningTrack> {
        self.tracks.iter().find(|t| t.language == language)
    }

    pub fn track_mut(&mut self, language: &str) -> Option<&mut LearningTrack> {
        self.tracks.iter_mut().find(|t| t.language == language)
    }

    pub fn is_learning(&self, language: &str) -> bool {
        self.track(language).is_some()
    }

    pub fn active_languages(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.language.as_str()).collect()
    }

    pub fn reconcile_confidences(&mut self) {
        for track in &mut self.tracks {
            track.reconcile();
        }
    }

    /// Start learning `language` with nothing unlocked yet.
    pub fn start_learning(
        &mut self,
        language: &str,
        dictionaries: &DictionaryStore,
    ) -> Result<&mut LearningTrack> {
        if language == self.main_language {
            return Err(Error::Validation(format!(
                "{} is already your main language.",
                language
            )));
        }
        if self.is_learning(language) {
            return Err(Error::Validation(format!(
                "You are already learning {}.",
                language
            )));
        }
        let dictionary = dictionaries
            .find_pair(&self.main_language, language)
            .ok_or_else(|| Error::Link {
                main: self.main_language.clone(),
                language: language.to_string(),
            })?;

        log::info!("{} started learning {}", self.username, language);
        self.tracks
            .push(LearningTrack::new(language, Some(dictionary)));
        let last = self.tracks.len() - 1;
        Ok(&mut self.tracks[last])
    }
}
