//! Quiz question ordering and generation

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Dictionary, User, Word, MAX_CONFIDENCE};

/// Multiplier applied to confidence-based weights in the weighted walks
pub const WEIGHT_SCALE: u32 = 30;

/// Order in which the learned words are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    LevelAscending,
    LevelDescending,
    ConfidenceAscending,
    ConfidenceDescending,
    Shuffled,
    /// Random, low-confidence words tend to come first.
    WeakestFirst,
    /// Random, high-confidence words tend to come first.
    StrongestFirst,
}

impl OrderingMode {
    pub const ALL: [OrderingMode; 7] = [
        OrderingMode::LevelAscending,
        OrderingMode::LevelDescending,
        OrderingMode::ConfidenceAscending,
        OrderingMode::ConfidenceDescending,
        OrderingMode::Shuffled,
        OrderingMode::WeakestFirst,
        OrderingMode::StrongestFirst,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderingMode::LevelAscending => "Easiest words first",
            OrderingMode::LevelDescending => "Hardest words first",
            OrderingMode::ConfidenceAscending => "Least confident first",
            OrderingMode::ConfidenceDescending => "Most confident first",
            OrderingMode::Shuffled => "Random order",
            OrderingMode::WeakestFirst => "Random, favouring weak words",
            OrderingMode::StrongestFirst => "Random, favouring strong words",
        }
    }
}

/// Which side of the translation is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Show the main-language term, expect the learned-language term.
    FromMain,
    /// Show the learned-language term, expect the main-language term.
    FromLearning,
}

/// A single quiz question for one learned word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Position of the word in the dictionary (and in the track's confidences).
    pub position: usize,
    pub asked: String,
    pub asked_language: String,
    pub expected: String,
    pub expected_language: String,
}

impl Question {
    pub fn prompt(&self) -> String {
        format!("'{}' in {}: ", self.asked, self.expected_language)
    }
}

/// Order the positions `0..words.len()` according to `mode`.
///
/// `confidences` is aligned with `words`; missing scores count as 0.
pub fn order_positions<R: Rng + ?Sized>(
    words: &[Word],
    confidences: &[u8],
    mode: OrderingMode,
    rng: &mut R,
) -> Vec<usize> {
    let confidence = |position: usize| confidences.get(position).copied().unwrap_or(0);
    let mut positions: Vec<usize> = (0..words.len()).collect();

    // sort_by_key is stable, so ties keep dictionary order
    match mode {
        OrderingMode::LevelAscending => positions.sort_by_key(|&p| words[p].level),
        OrderingMode::LevelDescending => positions.sort_by_key(|&p| Reverse(words[p].level)),
        OrderingMode::ConfidenceAscending => positions.sort_by_key(|&p| confidence(p)),
        OrderingMode::ConfidenceDescending => positions.sort_by_key(|&p| Reverse(confidence(p))),
        OrderingMode::Shuffled => positions.shuffle(rng),
        OrderingMode::WeakestFirst => {
            let weights: Vec<u32> = positions
                .iter()
                .map(|&p| u32::from(MAX_CONFIDENCE - confidence(p).min(MAX_CONFIDENCE)) * WEIGHT_SCALE)
                .collect();
            positions = weighted_walk(&weights, rng);
        }
        OrderingMode::StrongestFirst => {
            let weights: Vec<u32> = positions
                .iter()
                .map(|&p| u32::from(confidence(p)) * WEIGHT_SCALE)
                .collect();
            positions = weighted_walk(&weights, rng);
        }
    }
    positions
}

/// Sample every index exactly once, each draw proportional to the remaining weights.
///
/// Once only zero-weight indices remain they follow in index order.
pub fn weighted_walk<R: Rng + ?Sized>(weights: &[u32], rng: &mut R) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..weights.len()).collect();
    let mut order = Vec::with_capacity(weights.len());

    while !remaining.is_empty() {
        let total: u64 = remaining.iter().map(|&i| u64::from(weights[i])).sum();
        if total == 0 {
            order.append(&mut remaining);
            break;
        }

        let mut target = rng.gen_range(0..total);
        let slot = remaining
            .iter()
            .position(|&i| {
                let weight = u64::from(weights[i]);
                if target < weight {
                    true
                } else {
                    target -= weight;
                    false
                }
            })
            .unwrap_or(remaining.len() - 1);
        order.push(remaining.remove(slot));
    }
    order
}

/// Build the question for `word`, always framed as main language <-> learned language.
pub fn build_question(main_language: &str, dictionary: &Dictionary, word: &Word, direction: Direction) -> Question {
    let main_is_a = dictionary.language_a == main_language;
    let (main_term, learning_term) = if main_is_a {
        (&word.term_a, &word.term_b)
    } else {
        (&word.term_b, &word.term_a)
    };
    let learning_language = if main_is_a {
        &dictionary.language_b
    } else {
        &dictionary.language_a
    };

    let (asked, asked_language, expected, expected_language) = match direction {
        Direction::FromMain => (main_term, main_language, learning_term, learning_language.as_str()),
        Direction::FromLearning => (learning_term, learning_language.as_str(), main_term, main_language),
    };

    Question {
        position: word.index,
        asked: asked.clone(),
        asked_language: asked_language.to_string(),
        expected: expected.clone(),
        expected_language: expected_language.to_string(),
    }
}

/// Questions over every word `user` has unlocked in `language`, in quiz order.
pub fn generate_quiz<R: Rng + ?Sized>(
    user: &User,
    language: &str,
    mode: OrderingMode,
    direction: Direction,
    rng: &mut R,
) -> Result<Vec<Question>> {
    let track = user
        .track(language)
        .ok_or_else(|| Error::Validation(format!("You are not learning {}.", language)))?;
    let dictionary = track.dictionary()?;
    let words = track.learned_words()?;

    Ok(order_positions(words, &track.confidences, mode, rng)
        .into_iter()
        .map(|position| build_question(&user.main_language, dictionary, &words[position], direction))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LearningTrack, WordType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::rc::Rc;

    fn words(levels: &[u8]) -> Vec<Word> {
        let words = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| Word::new(&format!("a{}", i), &format!("b{}", i), level, WordType::Noun))
            .collect();
        Dictionary::new("A", "B", words).words
    }

    fn is_permutation(order: &[usize], n: usize) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_level_orderings_are_stable() {
        let words = words(&[3, 1, 3, 2]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(order_positions(&words, &[], OrderingMode::LevelAscending, &mut rng), vec![1, 3, 0, 2]);
        assert_eq!(order_positions(&words, &[], OrderingMode::LevelDescending, &mut rng), vec![0, 2, 3, 1]);
    }

    #[test]
    fn test_confidence_orderings() {
        let words = words(&[1, 1, 1, 1]);
        let confidences = [5, 1, 5, 0];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            order_positions(&words, &confidences, OrderingMode::ConfidenceAscending, &mut rng),
            vec![3, 1, 0, 2]
        );
        assert_eq!(
            order_positions(&words, &confidences, OrderingMode::ConfidenceDescending, &mut rng),
            vec![0, 2, 1, 3]
        );
    }

    #[test]
    fn test_random_orderings_are_permutations() {
        let words = words(&[1; 12]);
        let confidences: Vec<u8> = (0..12).map(|i| (i * 9) as u8).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for mode in [OrderingMode::Shuffled, OrderingMode::WeakestFirst, OrderingMode::StrongestFirst] {
            let order = order_positions(&words, &confidences, mode, &mut rng);
            assert!(is_permutation(&order, 12), "{:?} gave {:?}", mode, order);
        }
        assert!(order_positions(&[], &[], OrderingMode::WeakestFirst, &mut rng).is_empty());
    }

    #[test]
    fn test_weighted_walk_zero_weights_terminate_in_order() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(weighted_walk(&[0, 0, 0], &mut rng), vec![0, 1, 2]);

        let order = weighted_walk(&[0, 5, 0, 0], &mut rng);
        assert_eq!(order, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_weighted_walk_prefers_heavy_items() {
        let mut rng = StdRng::seed_from_u64(42);
        let weights = [1, 1000];
        let heavy_first = (0..200)
            .filter(|_| weighted_walk(&weights, &mut rng)[0] == 1)
            .count();
        assert!(heavy_first > 180, "heavy item first only {} times", heavy_first);
    }

    #[test]
    fn test_weakest_first_starts_with_low_confidence() {
        let words = words(&[1; 3]);
        let confidences = [100, 0, 100];
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let order = order_positions(&words, &confidences, OrderingMode::WeakestFirst, &mut rng);
            assert_eq!(order, vec![1, 0, 2]);
        }
        let order = order_positions(&words, &confidences, OrderingMode::StrongestFirst, &mut rng);
        assert_eq!(order[2], 1);
    }

    #[test]
    fn test_build_question_swaps_to_main_language() {
        let dict = Dictionary::new("French", "English", vec![Word::new("chat", "cat", 1, WordType::Noun)]);
        let word = &dict.words[0];

        let q = build_question("English", &dict, word, Direction::FromMain);
        assert_eq!((q.asked.as_str(), q.expected.as_str()), ("cat", "chat"));
        assert_eq!(q.expected_language, "French");
        assert_eq!(q.prompt(), "'cat' in French: ");

        let q = build_question("English", &dict, word, Direction::FromLearning);
        assert_eq!((q.asked.as_str(), q.expected.as_str()), ("chat", "cat"));
        assert_eq!(q.asked_language, "French");
    }

    #[test]
    fn test_generate_quiz_covers_learned_prefix() {
        let dict = Rc::new(Dictionary::new(
            "English",
            "French",
            vec![
                Word::new("cat", "chat", 2, WordType::Noun),
                Word::new("dog", "chien", 1, WordType::Noun),
                Word::new("bird", "oiseau", 1, WordType::Noun),
            ],
        ));
        let mut user = User::new("alice", "hash", "English");
        let mut track = LearningTrack::new("French", Some(dict));
        track.unlocked = 2;
        track.reconcile();
        user.tracks.push(track);
        user.tracks.push(LearningTrack::new("German", None));

        let mut rng = StdRng::seed_from_u64(0);
        let quiz = generate_quiz(&user, "French", OrderingMode::LevelAscending, Direction::FromMain, &mut rng).unwrap();
        let asked: Vec<&str> = quiz.iter().map(|q| q.asked.as_str()).collect();
        assert_eq!(asked, vec!["dog", "cat"]);
        assert_eq!(quiz[0].position, 1);

        assert!(matches!(
            generate_quiz(&user, "German", OrderingMode::Shuffled, Direction::FromMain, &mut rng),
            Err(Error::TrackUnavailable(_))
        ));
        assert!(matches!(
            generate_quiz(&user, "Spanish", OrderingMode::Shuffled, Direction::FromMain, &mut rng),
            Err(Error::Validation(_))
        ));
    }
}
