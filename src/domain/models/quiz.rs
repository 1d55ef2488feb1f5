use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::StructuredOutput;
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer_index: usize,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, option_index: usize) -> bool {
        self.correct_answer_index == option_index
    }

    /// `None` when the answer index points past the options.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer_index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuizData {
    pub questions: Vec<QuizQuestion>,
}

impl QuizData {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl StructuredOutput for QuizData {
    fn normalize(self) -> Result<Self, DomainError> {
        if self.questions.is_empty() {
            return Err(DomainError::malformed("quiz has no questions"));
        }

        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() < 2 {
                return Err(DomainError::malformed(format!(
                    "question {} has {} options",
                    i + 1,
                    q.options.len()
                )));
            }
            if q.correct_answer_index >= q.options.len() {
                return Err(DomainError::malformed(format!(
                    "question {} answer index {} is out of range",
                    i + 1,
                    q.correct_answer_index
                )));
            }
        }

        Ok(self)
    }
}

/// Letter shown next to an option: A, B, C, ...
pub fn option_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Parse a letter (`b`) or 1-based number (`2`) into an option index.
pub fn parse_option(input: &str, option_count: usize) -> Option<usize> {
    let input = input.trim();
    let index = if let Ok(n) = input.parse::<usize>() {
        n.checked_sub(1)?
    } else {
        let mut chars = input.chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        (c as u8 - b'A') as usize
    };
    (index < option_count).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], correct: usize) -> QuizQuestion {
        QuizQuestion {
            question: "¿Cómo estás?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answer_index: correct,
            explanation: "Greeting".to_string(),
        }
    }

    #[test]
    fn normalize_accepts_well_formed_quiz() {
        let quiz = QuizData {
            questions: vec![question(&["bien", "mal"], 0)],
        };
        assert_eq!(quiz.normalize().unwrap().len(), 1);
    }

    #[test]
    fn normalize_rejects_out_of_range_answer() {
        let quiz = QuizData {
            questions: vec![question(&["bien", "mal"], 2)],
        };
        assert!(quiz.normalize().unwrap_err().is_malformed());
    }

    #[test]
    fn correct_option_tolerates_unchecked_index() {
        assert_eq!(question(&["bien", "mal"], 1).correct_option(), Some("mal"));
        assert_eq!(question(&["bien", "mal"], 7).correct_option(), None);
    }

    #[test]
    fn normalize_rejects_empty_quiz() {
        let quiz = QuizData { questions: vec![] };
        assert!(quiz.normalize().is_err());
    }

    #[test]
    fn parses_wire_format() {
        let quiz: QuizData = serde_json::from_str(
            r#"{"questions":[{"question":"q","options":["a","b","c"],"correctAnswerIndex":1,"explanation":"e"}]}"#,
        )
        .unwrap();
        assert_eq!(quiz.questions[0].correct_option(), Some("b"));
    }

    #[test]
    fn option_letters_and_parsing() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
        assert_eq!(parse_option("b", 4), Some(1));
        assert_eq!(parse_option("D", 4), Some(3));
        assert_eq!(parse_option("3", 4), Some(2));
        assert_eq!(parse_option("0", 4), None);
        assert_eq!(parse_option("e", 4), None);
        assert_eq!(parse_option("ab", 4), None);
        assert_eq!(parse_option("", 4), None);
    }
}
