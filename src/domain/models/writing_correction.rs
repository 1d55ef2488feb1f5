use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::StructuredOutput;
use crate::domain::DomainError;

pub const MIN_SCORE: f32 = 1.0;
pub const MAX_SCORE: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WritingRating {
    pub grammar: f32,
    pub clarity: f32,
    pub tone: f32,
}

impl WritingRating {
    /// Scores in display order.
    pub fn entries(&self) -> [(&'static str, f32); 3] {
        [
            ("grammar", self.grammar),
            ("clarity", self.clarity),
            ("tone", self.tone),
        ]
    }
}

/// Editor feedback on a piece of learner writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WritingCorrectionResult {
    /// The rewritten version.
    pub corrected_text: String,
    /// Why changes were made.
    pub explanation: String,
    /// Tips for improvement.
    pub tips: Vec<String>,
    /// Scores from 1 to 10.
    pub rating: WritingRating,
}

impl StructuredOutput for WritingCorrectionResult {
    fn normalize(mut self) -> Result<Self, DomainError> {
        if self.corrected_text.trim().is_empty() {
            return Err(DomainError::malformed("correctedText is empty"));
        }

        for (name, score) in self.rating.entries() {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(DomainError::malformed(format!(
                    "rating.{name} is {score}, expected {MIN_SCORE}-{MAX_SCORE}"
                )));
            }
        }

        self.tips.retain(|tip| !tip.trim().is_empty());

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WritingCorrectionResult {
        serde_json::from_str(
            r#"{
                "correctedText": "Je suis allé au marché.",
                "explanation": "Aller takes être in the passé composé.",
                "tips": ["Review être verbs", "", "Watch agreement"],
                "rating": {"grammar": 6, "clarity": 8.5, "tone": 10}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_camel_case_payload() {
        let result = sample();
        assert_eq!(result.corrected_text, "Je suis allé au marché.");
        assert_eq!(result.tips.len(), 3);
    }

    #[test]
    fn normalize_keeps_scores_and_drops_blank_tips() {
        let result = sample().normalize().unwrap();
        assert_eq!(result.rating.grammar, 6.0);
        assert_eq!(result.rating.clarity, 8.5);
        assert_eq!(result.rating.tone, MAX_SCORE);
        assert_eq!(result.tips, vec!["Review être verbs", "Watch agreement"]);
    }

    #[test]
    fn normalize_rejects_out_of_range_scores() {
        let mut result = sample();
        result.rating.clarity = 12.0;
        assert!(result.normalize().unwrap_err().is_malformed());

        let mut result = sample();
        result.rating.grammar = 42.0;
        result.rating.tone = -3.0;
        assert!(result.normalize().unwrap_err().is_malformed());

        let mut result = sample();
        result.rating.tone = 0.5;
        assert!(result.normalize().unwrap_err().is_malformed());
    }

    #[test]
    fn normalize_rejects_non_finite_scores() {
        let mut result = sample();
        result.rating.grammar = f32::NAN;
        assert!(result.normalize().unwrap_err().is_malformed());
    }

    #[test]
    fn normalize_rejects_empty_correction() {
        let mut result = sample();
        result.corrected_text = "  ".to_string();
        assert!(result.normalize().unwrap_err().is_malformed());
    }

    #[test]
    fn missing_rating_does_not_parse() {
        let parsed = serde_json::from_str::<WritingCorrectionResult>(
            r#"{"correctedText": "x", "explanation": "y", "tips": []}"#,
        );
        assert!(parsed.is_err());
    }
}
