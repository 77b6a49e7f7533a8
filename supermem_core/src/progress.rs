//! Progress tracking - unlocking words, scoring answers and statistics

use serde::Serialize;

use crate::error::{Error, Result};
use crate::fuzzy::check_answer;
use crate::models::{LearningTrack, Word, MAX_CONFIDENCE};
use crate::questions::Question;

/// Confidence from which a word counts as mastered in the statistics
pub const MASTERED_CONFIDENCE: u8 = 10;

/// Unlock the next dictionary word of `track` and return it.
///
/// Fails without touching the track when every word is already unlocked.
pub fn unlock_next_word(track: &mut LearningTrack) -> Result<Word> {
    let dictionary = track.dictionary()?;
    let word = dictionary
        .words
        .get(track.unlocked)
        .cloned()
        .ok_or_else(|| Error::OutOfRange {
            language: track.language.clone(),
            unlocked: track.unlocked,
            available: dictionary.len(),
        })?;

    track.unlocked += 1;
    track.reconcile();
    log::debug!("Unlocked {} word #{}: {}", track.language, word.index, word.term_a);
    Ok(word)
}

/// Confidence after one answer, kept within 0..=100.
pub fn adjust_confidence(confidence: u8, correct: bool) -> u8 {
    if correct {
        confidence.saturating_add(1).min(MAX_CONFIDENCE)
    } else {
        confidence.saturating_sub(1)
    }
}

/// Outcome of answering one quiz question
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub confidence: u8,
    pub feedback: String,
}

/// Grade `answer` and move the word's confidence one step up or down.
pub fn answer_question(track: &mut LearningTrack, question: &Question, answer: &str) -> Result<AnswerOutcome> {
    let language = track.language.clone();
    let slot = track
        .confidences
        .get_mut(question.position)
        .ok_or_else(|| {
            Error::Validation(format!(
                "Word #{} of {} has not been unlocked yet.",
                question.position, language
            ))
        })?;

    let result = check_answer(answer, &question.expected);
    *slot = adjust_confidence(*slot, result.is_correct);

    Ok(AnswerOutcome {
        correct: result.is_correct,
        confidence: *slot,
        feedback: result.feedback,
    })
}

/// Summary of one learning track
#[derive(Debug, Clone, Serialize)]
pub struct TrackStats {
    pub language: String,
    pub unlocked: usize,
    /// Words in the dictionary, `None` when the track has no dictionary.
    pub available: Option<usize>,
    pub mastered: usize,
    pub average_confidence: f64,
}

pub fn track_stats(track: &LearningTrack) -> TrackStats {
    let mastered = track
        .confidences
        .iter()
        .filter(|&&c| c >= MASTERED_CONFIDENCE)
        .count();
    let average_confidence = if track.confidences.is_empty() {
        0.0
    } else {
        track.confidences.iter().map(|&c| f64::from(c)).sum::<f64>() / track.confidences.len() as f64
    };

    TrackStats {
        language: track.language.clone(),
        unlocked: track.unlocked,
        available: track.dictionary.as_ref().map(|d| d.len()),
        mastered,
        average_confidence,
    }
}

/// Running tally for one quiz session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub asked: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionStats {
    pub fn record(&mut self, outcome: &AnswerOutcome) {
        self.asked += 1;
        if outcome.correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    pub fn accuracy_percent(&self) -> f64 {
        if self.asked > 0 {
            (f64::from(self.correct) / f64::from(self.asked)) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dictionary, WordType};
    use crate::questions::{build_question, Direction};
    use std::rc::Rc;

    fn french_track(unlocked: usize) -> LearningTrack {
        let dict = Dictionary::new(
            "English",
            "French",
            vec![
                Word::new("cat", "chat", 1, WordType::Noun),
                Word::new("dog", "chien", 2, WordType::Noun),
            ],
        );
        let mut track = LearningTrack::new("French", Some(Rc::new(dict)));
        track.unlocked = unlocked;
        track.reconcile();
        track
    }

    fn question(track: &LearningTrack, position: usize) -> Question {
        let dict = track.dictionary().unwrap();
        build_question("English", dict, &dict.words[position], Direction::FromMain)
    }

    #[test]
    fn test_unlock_in_dictionary_order() {
        let mut track = french_track(0);
        assert_eq!(unlock_next_word(&mut track).unwrap().term_b, "chat");
        assert_eq!(unlock_next_word(&mut track).unwrap().term_b, "chien");
        assert_eq!(track.unlocked, 2);
        assert_eq!(track.confidences, vec![0, 0]);
    }

    #[test]
    fn test_unlock_past_end_fails_without_mutation() {
        let mut track = french_track(2);
        track.confidences = vec![4, 9];
        let before = track.clone();

        let err = unlock_next_word(&mut track).unwrap_err();
        assert!(matches!(err, Error::OutOfRange { unlocked: 2, available: 2, .. }));
        assert_eq!(track, before);
    }

    #[test]
    fn test_unlock_without_dictionary() {
        let mut track = LearningTrack::new("German", None);
        assert!(matches!(unlock_next_word(&mut track), Err(Error::TrackUnavailable(_))));
        assert_eq!(track.unlocked, 0);
    }

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(adjust_confidence(100, true), 100);
        assert_eq!(adjust_confidence(0, false), 0);
        assert_eq!(adjust_confidence(41, true), 42);
        assert_eq!(adjust_confidence(41, false), 40);
    }

    #[test]
    fn test_answer_updates_only_that_word() {
        let mut track = french_track(2);
        track.confidences = vec![100, 0];

        let q = question(&track, 0);
        let outcome = answer_question(&mut track, &q, "chat").unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.confidence, 100);

        let q = question(&track, 1);
        let outcome = answer_question(&mut track, &q, "chat").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.confidence, 0);

        let outcome = answer_question(&mut track, &q, "chien").unwrap();
        assert_eq!(outcome.confidence, 1);
        assert_eq!(track.confidences, vec![100, 1]);
    }

    #[test]
    fn test_answer_for_locked_word_is_rejected() {
        let mut track = french_track(1);
        let q = question(&track, 1);
        assert!(matches!(answer_question(&mut track, &q, "chien"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_stats() {
        let mut track = french_track(2);
        track.confidences = vec![12, 3];
        let stats = track_stats(&track);
        assert_eq!(stats.available, Some(2));
        assert_eq!(stats.mastered, 1);
        assert!((stats.average_confidence - 7.5).abs() < f64::EPSILON);

        let mut session = SessionStats::default();
        assert_eq!(session.accuracy_percent(), 0.0);
        for correct in [true, false, true, true] {
            session.record(&AnswerOutcome { correct, confidence: 0, feedback: String::new() });
        }
        assert_eq!((session.asked, session.correct, session.incorrect), (4, 3, 1));
        assert!((session.accuracy_percent() - 75.0).abs() < 1e-9);
    }
}
