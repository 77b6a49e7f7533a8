//! Answer checking with similarity hints for wrong answers
//!
//! Correctness is exact string equality. Similarity only shapes the feedback
//! text shown after a miss.

use serde::Serialize;
use strsim::{jaro_winkler, levenshtein, normalized_levenshtein};

/// Similarity above which a wrong answer is reported as a near miss
pub const NEAR_MISS_THRESHOLD: f64 = 0.5;

/// Result of comparing an answer with the expected term
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub is_correct: bool,
    pub similarity_score: f64,
    pub feedback: String,
}

/// Compare `answer` with `expected`. Case and whitespace matter; trim at the input layer.
pub fn check_answer(answer: &str, expected: &str) -> MatchResult {
    if answer == expected {
        return MatchResult {
            is_correct: true,
            similarity_score: 1.0,
            feedback: "Correct!".to_string(),
        };
    }

    let answer_lower = answer.to_lowercase();
    let expected_lower = expected.to_lowercase();
    if answer_lower == expected_lower {
        return MatchResult {
            is_correct: false,
            similarity_score: 1.0,
            feedback: format!("Almost! Mind the capitals. Expected: '{}'", expected),
        };
    }

    // Jaro-Winkler weighs typos at the end of a word lightly
    let similarity = normalized_levenshtein(&answer_lower, &expected_lower) * 0.4
        + jaro_winkler(&answer_lower, &expected_lower) * 0.6;

    let feedback = if similarity >= NEAR_MISS_THRESHOLD && !answer.is_empty() {
        let distance = levenshtein(&answer_lower, &expected_lower);
        format!("Almost! {} characters off. Expected: '{}'", distance, expected)
    } else {
        format!("Incorrect. Expected: '{}'", expected)
    };

    MatchResult {
        is_correct: false,
        similarity_score: similarity,
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        assert!(check_answer("chien", "chien").is_correct);
        assert!(!check_answer("Chien", "chien").is_correct);
        assert!(!check_answer("chien ", "chien").is_correct);
    }

    #[test]
    fn test_feedback_kinds() {
        assert!(check_answer("Chien", "chien").feedback.contains("capitals"));

        let near = check_answer("chein", "chien");
        assert!(!near.is_correct);
        assert!(near.feedback.starts_with("Almost! 2 characters off"));

        let far = check_answer("xyz", "chien");
        assert!(far.feedback.starts_with("Incorrect"));
        assert!(far.similarity_score < NEAR_MISS_THRESHOLD);

        assert!(check_answer("", "chien").feedback.starts_with("Incorrect"));
    }
}
