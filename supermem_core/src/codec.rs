//! Line-oriented text codec for users, words and dictionaries
//!
//! User line: `username, hash, main, lang & lang, 2 & 0, 5-3 & .`
//! Word line: `cat, chat, 1, noun`
//! Dictionary file: `__language_a=` / `__language_b=` headers followed by word lines.

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::models::{Dictionary, User, Word, WordType, MAX_CONFIDENCE, MAX_LEVEL, MIN_LEVEL};

pub const FIELD_SEPARATOR: &str = ", ";
pub const LIST_SEPARATOR: &str = " & ";
pub const EMPTY_LIST: &str = "_";
pub const INNER_SEPARATOR: &str = "-";
pub const EMPTY_INNER_LIST: &str = ".";
pub const LANGUAGE_A_PREFIX: &str = "__language_a=";
pub const LANGUAGE_B_PREFIX: &str = "__language_b=";

const USER_FIELDS: usize = 6;
const WORD_FIELDS: usize = 4;

/// A user exactly as stored on disk: the per-language data as parallel lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub main_language: String,
    pub active_languages: Vec<String>,
    pub active_words: Vec<usize>,
    pub confidences: Vec<Vec<u8>>,
}

impl UserRecord {
    /// Make `confidences` line up with the other lists.
    ///
    /// The outer list gets one entry per active language (new entries are
    /// zero-filled to the matching `active_words` count), and every inner list
    /// is resized to its `active_words` count.
    pub fn reconcile(&mut self) {
        let languages = self.active_languages.len();
        self.confidences.truncate(languages);
        for (i, scores) in self.confidences.iter_mut().enumerate() {
            scores.resize(self.active_words.get(i).copied().unwrap_or(0), 0);
        }
        while self.confidences.len() < languages {
            let size = self
                .active_words
                .get(self.confidences.len())
                .copied()
                .unwrap_or(0);
            self.confidences.push(vec![0; size]);
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            main_language: user.main_language.clone(),
            active_languages: user.tracks.iter().map(|t| t.language.clone()).collect(),
            active_words: user.tracks.iter().map(|t| t.unlocked).collect(),
            confidences: user.tracks.iter().map(|t| t.confidences.clone()).collect(),
        }
    }
}

// ============= Users =============

pub fn serialize_user(user: &User) -> Result<String> {
    serialize_user_record(&UserRecord::from(user))
}

pub fn serialize_user_record(record: &UserRecord) -> Result<String> {
    let line = [
        record.username.clone(),
        record.password_hash.clone(),
        record.main_language.clone(),
        encode_list(&record.active_languages),
        encode_list(&record.active_words),
        encode_nested(&record.confidences),
    ]
    .join(FIELD_SEPARATOR);

    check_single_line("user", &line)?;
    let fields = line.split(FIELD_SEPARATOR).count();
    if fields != USER_FIELDS {
        return Err(Error::format(
            "user",
            format!(
                "{} would be written with {} fields instead of {}",
                record.username, fields, USER_FIELDS
            ),
        ));
    }
    // A language name containing a list separator would still split into six
    // fields but come back as different lists.
    if deserialize_user(&line)? != *record {
        return Err(Error::format(
            "user",
            format!("{} contains a reserved separator", record.username),
        ));
    }
    Ok(line)
}

pub fn deserialize_user(line: &str) -> Result<UserRecord> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() != USER_FIELDS {
        return Err(Error::format(
            "user",
            format!(
                "expected {} fields, found {}",
                USER_FIELDS,
                parts.len()
            ),
        ));
    }

    let active_languages = decode_list(parts[3])
        .into_iter()
        .map(str::to_string)
        .collect();
    let active_words = decode_list(parts[4])
        .into_iter()
        .map(|item| {
            item.parse::<usize>().map_err(|_| {
                Error::format("user", format!("word count '{}' is not an integer", item))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let confidences = decode_nested(parts[5])?;

    Ok(UserRecord {
        username: parts[0].to_string(),
        password_hash: parts[1].to_string(),
        main_language: parts[2].to_string(),
        active_languages,
        active_words,
        confidences,
    })
}

fn encode_list<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return EMPTY_LIST.to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn decode_list(field: &str) -> Vec<&str> {
    if field == EMPTY_LIST {
        return Vec::new();
    }
    field.split(LIST_SEPARATOR).collect()
}

fn encode_nested(lists: &[Vec<u8>]) -> String {
    if lists.is_empty() {
        return EMPTY_LIST.to_string();
    }
    lists
        .iter()
        .map(|inner| {
            if inner.is_empty() {
                EMPTY_INNER_LIST.to_string()
            } else {
                inner
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join(INNER_SEPARATOR)
            }
        })
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn decode_nested(field: &str) -> Result<Vec<Vec<u8>>> {
    decode_list(field)
        .into_iter()
        .map(|inner| {
            // A lone outer sentinel inside a non-empty list also means "empty"
            if inner == EMPTY_INNER_LIST || inner == EMPTY_LIST {
                return Ok(Vec::new());
            }
            inner.split(INNER_SEPARATOR).map(parse_confidence).collect()
        })
        .collect()
}

fn parse_confidence(item: &str) -> Result<u8> {
    match item.parse::<u8>() {
        Ok(value) if value <= MAX_CONFIDENCE => Ok(value),
        _ => Err(Error::format(
            "user",
            format!(
                "confidence '{}' is not an integer in 0..={}",
                item, MAX_CONFIDENCE
            ),
        )),
    }
}

// ============= Words =============

pub fn serialize_word(word: &Word) -> Result<String> {
    let level = word.level.to_string();
    let line = [
        word.term_a.as_str(),
        word.term_b.as_str(),
        level.as_str(),
        word.word_type.as_str(),
    ]
    .join(FIELD_SEPARATOR);

    check_single_line("word", &line)?;
    if line.split(FIELD_SEPARATOR).count() != WORD_FIELDS {
        return Err(Error::format(
            "word",
            format!("'{}' / '{}' contains the field separator", word.term_a, word.term_b),
        ));
    }
    Ok(line)
}

/// Parse a word line. The returned word has index 0; loaders assign the real one.
///
/// An unknown type tag is not an error: the word becomes a noun and a warning
/// is recorded.
pub fn deserialize_word(line: &str, diag: &mut Diagnostics) -> Result<Word> {
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if parts.len() != WORD_FIELDS {
        return Err(Error::format(
            "word",
            format!("expected {} fields, found {}", WORD_FIELDS, parts.len()),
        ));
    }

    let level: i64 = parts[2]
        .parse()
        .map_err(|_| Error::format("word", format!("level '{}' is not an integer", parts[2])))?;
    if level < i64::from(MIN_LEVEL) || level > i64::from(MAX_LEVEL) {
        return Err(Error::format(
            "word",
            format!("level {} is outside {}..={}", level, MIN_LEVEL, MAX_LEVEL),
        ));
    }

    let word_type = match parts[3].parse::<WordType>() {
        Ok(word_type) => word_type,
        Err(_) => {
            diag.warn(format!(
                "Word '{}' has unknown type '{}', using noun",
                parts[0], parts[3]
            ));
            WordType::Noun
        }
    };

    Ok(Word::new(parts[0], parts[1], level as u8, word_type))
}

// ============= Dictionaries =============

pub fn serialize_dictionary(dictionary: &Dictionary) -> Result<String> {
    let mut text = format!(
        "{}{}\n{}{}\n",
        LANGUAGE_A_PREFIX, dictionary.language_a, LANGUAGE_B_PREFIX, dictionary.language_b
    );
    for word in &dictionary.words {
        text.push_str(&serialize_word(word)?);
        text.push('\n');
    }
    Ok(text)
}

/// Parse a dictionary file. `source` names the file in diagnostics.
///
/// Malformed word lines are recorded and skipped; only a missing language
/// header fails the whole file.
pub fn deserialize_dictionary(text: &str, source: &str, diag: &mut Diagnostics) -> Result<Dictionary> {
    let mut language_a: Option<String> = None;
    let mut language_b: Option<String> = None;
    let mut words: Vec<Word> = Vec::new();

    for (line_idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        // Blank lines are reserved as page breaks
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix(LANGUAGE_A_PREFIX) {
            set_header(&mut language_a, name, LANGUAGE_A_PREFIX, source, diag);
            continue;
        }
        if let Some(name) = line.strip_prefix(LANGUAGE_B_PREFIX) {
            set_header(&mut language_b, name, LANGUAGE_B_PREFIX, source, diag);
            continue;
        }

        match deserialize_word(line, diag) {
            Ok(mut word) => {
                word.index = words.len();
                words.push(word);
            }
            Err(e) => diag.error(format!(
                "Invalid word on line {} of {} will be skipped: {}",
                line_idx + 1,
                source,
                e
            )),
        }
    }

    let missing = |prefix: &str| Error::format("dictionary", format!("{} has no {} line", source, prefix));
    let language_a = language_a.ok_or_else(|| missing(LANGUAGE_A_PREFIX))?;
    let language_b = language_b.ok_or_else(|| missing(LANGUAGE_B_PREFIX))?;
    check_language_name(&language_a, source)?;
    check_language_name(&language_b, source)?;

    Ok(Dictionary {
        language_a,
        language_b,
        words,
    })
}

fn set_header(slot: &mut Option<String>, name: &str, prefix: &str, source: &str, diag: &mut Diagnostics) {
    if slot.is_some() {
        diag.warn(format!("Repeated {} line in {} is ignored", prefix, source));
    } else {
        *slot = Some(name.trim().to_string());
    }
}

/// Language names end up inside user lines, so they may not contain the
/// separator characters or be the empty-list sentinel.
fn check_language_name(name: &str, source: &str) -> Result<()> {
    if name.is_empty() || name == EMPTY_LIST || name.contains([',', '&']) {
        return Err(Error::format(
            "dictionary",
            format!("{} names the language '{}', which cannot be stored", source, name),
        ));
    }
    Ok(())
}

fn check_single_line(record: &'static str, line: &str) -> Result<()> {
    if line.contains(['\n', '\r']) {
        return Err(Error::format(record, "contains a line break"));
    }
    Ok(())
}
