//! Dictionary store - loads the bundled bilingual dictionaries
//!
//! Every `*.txt` file of the dictionaries directory holds one language pair.
//! Files are read once at startup and shared read-only afterwards.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::codec::{deserialize_dictionary, serialize_dictionary};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::models::Dictionary;
use crate::persistence::{read_text, write_atomically};

pub const DICTIONARY_EXTENSION: &str = "txt";

#[derive(Debug, Clone)]
struct DictionaryEntry {
    path: PathBuf,
    dictionary: Rc<Dictionary>,
}

/// Loaded dictionaries together with the files they came from
#[derive(Debug, Clone, Default)]
pub struct DictionaryStore {
    entries: Vec<DictionaryEntry>,
}

impl DictionaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the explicit `paths` if given, otherwise every dictionary file in `dir`.
    pub fn load(paths: Option<&[PathBuf]>, dir: &Path, diag: &mut Diagnostics) -> Result<Self> {
        match paths {
            Some(paths) => Ok(Self::load_files(paths, diag)),
            None => Self::load_dir(dir, diag),
        }
    }

    pub fn load_dir(dir: &Path, diag: &mut Diagnostics) -> Result<Self> {
        if !dir.is_dir() {
            diag.warn(format!(
                "Dictionaries directory {} does not exist, no languages available",
                dir.display()
            ));
            return Ok(Self::new());
        }
        let paths = list_dictionary_files(dir, diag)?;
        Ok(Self::load_files(&paths, diag))
    }

    /// Load each file in order. A file that cannot be read or parsed is
    /// reported and left out; the others still load.
    pub fn load_files(paths: &[PathBuf], diag: &mut Diagnostics) -> Self {
        let mut store = Self::new();
        for path in paths {
            match read_dictionary(path, diag) {
                Ok(dictionary) => {
                    log::info!(
                        "Loaded {}-{} dictionary with {} words from {}",
                        dictionary.language_a,
                        dictionary.language_b,
                        dictionary.len(),
                        path.display()
                    );
                    store.insert(path.clone(), dictionary);
                }
                Err(e) => diag.error(format!(
                    "Dictionary {} will be skipped: {}",
                    path.display(),
                    e
                )),
            }
        }
        store
    }

    pub fn insert(&mut self, path: PathBuf, dictionary: Dictionary) -> Rc<Dictionary> {
        let dictionary = Rc::new(dictionary);
        self.entries.push(DictionaryEntry {
            path,
            dictionary: Rc::clone(&dictionary),
        });
        dictionary
    }

    /// Write every dictionary back to the file it was loaded from.
    ///
    /// Nothing mutates loaded dictionaries yet, so this rewrites identical content.
    pub fn export(&self) -> Result<usize> {
        for entry in &self.entries {
            write_atomically(&entry.path, &serialize_dictionary(&entry.dictionary)?)?;
        }
        Ok(self.entries.len())
    }

    /// Every language named by any dictionary, in first-seen order.
    pub fn all_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for entry in &self.entries {
            for language in [&entry.dictionary.language_a, &entry.dictionary.language_b] {
                if !languages.contains(language) {
                    languages.push(language.clone());
                }
            }
        }
        languages
    }

    /// Languages that can be learned from `main_language`, in first-seen order.
    pub fn languages_paired_with(&self, main_language: &str) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for entry in &self.entries {
            if let Some(other) = entry.dictionary.other_language(main_language) {
                if other != main_language && !languages.iter().any(|l| l == other) {
                    languages.push(other.to_string());
                }
            }
        }
        languages
    }

    /// First dictionary (in load order) between `first` and `second`.
    pub fn find_pair(&self, first: &str, second: &str) -> Option<Rc<Dictionary>> {
        self.entries
            .iter()
            .find(|entry| entry.dictionary.pairs(first, second))
            .map(|entry| Rc::clone(&entry.dictionary))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Dictionary)> {
        self.entries
            .iter()
            .map(|entry| (entry.path.as_path(), entry.dictionary.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn read_dictionary(path: &Path, diag: &mut Diagnostics) -> Result<Dictionary> {
    let text = read_text(path, diag)?;
    deserialize_dictionary(&text, &path.display().to_string(), diag)
}

/// Dictionary files directly inside `dir`, sorted by path.
pub fn list_dictionary_files(dir: &Path, diag: &mut Diagnostics) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        DICTIONARY_EXTENSION
    );
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => diag.warn(format!("Cannot read {}: {}", e.path().display(), e)),
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Word, WordType};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn store_with(pairs: &[(&str, &str)]) -> DictionaryStore {
        let mut store = DictionaryStore::new();
        for (i, (a, b)) in pairs.iter().enumerate() {
            store.insert(
                PathBuf::from(format!("{}.txt", i)),
                Dictionary::new(a, b, vec![Word::new("x", "y", 1, WordType::Noun)]),
            );
        }
        store
    }

    #[test]
    fn test_load_dir_sorted_and_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b_en_de.txt", "__language_a=English\n__language_b=German\ncat, Katze, 1, noun\n");
        write(dir.path(), "a_en_fr.txt", "__language_a=English\n__language_b=French\ncat, chat, 1, noun\ndog, chien, 2, noun\n");
        write(dir.path(), "c_broken.txt", "cat, chat, 1, noun\n");
        write(dir.path(), "notes.md", "__language_a=X\n__language_b=Y\n");

        let mut diag = Diagnostics::new();
        let store = DictionaryStore::load(None, dir.path(), &mut diag).unwrap();

        let loaded: Vec<(String, usize)> = store
            .iter()
            .map(|(_, d)| (d.language_b.clone(), d.len()))
            .collect();
        assert_eq!(loaded, vec![("French".to_string(), 2), ("German".to_string(), 1)]);
        assert_eq!(diag.errors().count(), 1);
    }

    #[test]
    fn test_missing_explicit_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let good = write(dir.path(), "en_fr.txt", "__language_a=English\n__language_b=French\n");
        let missing = dir.path().join("absent.txt");

        let mut diag = Diagnostics::new();
        let store = DictionaryStore::load(Some(&[missing, good][..]), Path::new("unused"), &mut diag).unwrap();
        assert_eq!(store.len(), 1);
        assert!(diag.errors().next().unwrap().message.contains("absent.txt"));
    }

    #[test]
    fn test_missing_dir_gives_empty_store() {
        let mut diag = Diagnostics::new();
        let store = DictionaryStore::load_dir(Path::new("/definitely/not/here"), &mut diag).unwrap();
        assert!(store.is_empty());
        assert_eq!(diag.warnings().count(), 1);
    }

    #[test]
    fn test_language_queries() {
        let store = store_with(&[("English", "French"), ("German", "English"), ("French", "Spanish"), ("French", "English")]);
        assert_eq!(store.all_languages(), vec!["English", "French", "German", "Spanish"]);
        assert_eq!(store.languages_paired_with("English"), vec!["French", "German"]);
        assert_eq!(store.languages_paired_with("Spanish"), vec!["French"]);

        let found = store.find_pair("French", "English").unwrap();
        assert_eq!(found.language_a, "English");
        assert!(store.find_pair("German", "Spanish").is_none());
    }

    #[test]
    fn test_export_rewrites_source_files() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "en_fr.txt", "\n__language_b=French\n__language_a=English\n\ncat, chat, 1, noun\n");

        let mut diag = Diagnostics::new();
        let store = DictionaryStore::load_dir(dir.path(), &mut diag).unwrap();
        assert_eq!(store.export().unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "__language_a=English\n__language_b=French\ncat, chat, 1, noun\n"
        );
    }
}
