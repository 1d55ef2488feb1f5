use serde::{Deserialize, Serialize};

/// What the learner wants to practise. Each goal selects exactly one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningGoal {
    Grammar,
    Vocabulary,
    Writing,
    Translation,
    Pronunciation,
    Conversation,
    Plan,
    Quiz,
}

impl LearningGoal {
    /// Navigation order.
    pub const ALL: [LearningGoal; 8] = [
        LearningGoal::Grammar,
        LearningGoal::Vocabulary,
        LearningGoal::Writing,
        LearningGoal::Translation,
        LearningGoal::Conversation,
        LearningGoal::Pronunciation,
        LearningGoal::Quiz,
        LearningGoal::Plan,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            LearningGoal::Grammar => "Grammar Practice",
            LearningGoal::Vocabulary => "Vocabulary Building",
            LearningGoal::Writing => "Writing Correction",
            LearningGoal::Translation => "Translation Help",
            LearningGoal::Pronunciation => "Pronunciation Guide",
            LearningGoal::Conversation => "Conversation Practice",
            LearningGoal::Plan => "Personalized Plan",
            LearningGoal::Quiz => "Quizzes & Exercises",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LearningGoal::Grammar => "Grammar",
            LearningGoal::Vocabulary => "Vocabulary",
            LearningGoal::Writing => "Writing",
            LearningGoal::Translation => "Translation",
            LearningGoal::Pronunciation => "Pronunciation",
            LearningGoal::Conversation => "Conversation",
            LearningGoal::Plan => "My Plan",
            LearningGoal::Quiz => "Quiz",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LearningGoal::Grammar => "grammar",
            LearningGoal::Vocabulary => "vocabulary",
            LearningGoal::Writing => "writing",
            LearningGoal::Translation => "translation",
            LearningGoal::Pronunciation => "pronunciation",
            LearningGoal::Conversation => "conversation",
            LearningGoal::Plan => "plan",
            LearningGoal::Quiz => "quiz",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "grammar" => Some(LearningGoal::Grammar),
            "vocabulary" | "vocab" => Some(LearningGoal::Vocabulary),
            "writing" | "write" => Some(LearningGoal::Writing),
            "translation" | "translate" => Some(LearningGoal::Translation),
            "pronunciation" | "pronounce" => Some(LearningGoal::Pronunciation),
            "conversation" | "chat" => Some(LearningGoal::Conversation),
            "plan" => Some(LearningGoal::Plan),
            "quiz" => Some(LearningGoal::Quiz),
            _ => None,
        }
    }
}

impl std::fmt::Display for LearningGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_goal_round_trips_through_its_identifier() {
        for goal in LearningGoal::ALL {
            assert_eq!(LearningGoal::parse(goal.as_str()), Some(goal));
        }
        assert_eq!(LearningGoal::ALL.len(), 8);
    }

    #[test]
    fn parse_accepts_command_aliases() {
        assert_eq!(LearningGoal::parse("vocab"), Some(LearningGoal::Vocabulary));
        assert_eq!(LearningGoal::parse("Chat"), Some(LearningGoal::Conversation));
        assert_eq!(LearningGoal::parse("dance"), None);
    }
}
