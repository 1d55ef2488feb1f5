use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::tool_state::{error_message, PendingRequest, ToolController, ToolState};
use crate::application::RequestDispatcher;
use crate::domain::{prompt_builder, DomainError, Language, ProficiencyLevel, QuizData};

/// Whether answers can still be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    Graded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,
}

impl std::fmt::Display for QuizScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// Per-question result after grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: usize,
    pub correct: usize,
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        self.selected == self.correct
    }
}

/// Quiz generation, answering and grading.
pub struct QuizTool {
    language: Language,
    difficulty: ProficiencyLevel,
    dispatcher: Arc<RequestDispatcher>,
    controller: ToolController<QuizData>,
    selected: BTreeMap<usize, usize>,
    phase: QuizPhase,
}

impl QuizTool {
    pub fn new(language: Language, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            language,
            difficulty: ProficiencyLevel::Intermediate,
            dispatcher,
            controller: ToolController::new(),
            selected: BTreeMap::new(),
            phase: QuizPhase::Answering,
        }
    }

    pub fn with_difficulty(mut self, difficulty: ProficiencyLevel) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn difficulty(&self) -> ProficiencyLevel {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: ProficiencyLevel) {
        self.difficulty = difficulty;
    }

    pub fn state(&self) -> &ToolState<QuizData> {
        self.controller.state()
    }

    pub fn topic(&self) -> &str {
        self.controller.input()
    }

    pub fn edit_topic(&mut self, topic: impl Into<String>) -> bool {
        self.controller.edit_input(topic)
    }

    pub fn quiz(&self) -> Option<&QuizData> {
        self.controller.state().result()
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn is_graded(&self) -> bool {
        self.quiz().is_some() && self.phase == QuizPhase::Graded
    }

    /// Start generating a quiz. Answers and grading from any previous quiz
    /// are cleared before the new questions can appear.
    pub fn begin(&mut self) -> Option<PendingRequest> {
        let prompt = prompt_builder::quiz(self.language.name(), self.controller.input().trim(), self.difficulty);
        let request = self.controller.begin_request(prompt, &self.dispatcher)?;
        self.selected.clear();
        self.phase = QuizPhase::Answering;
        Some(request)
    }

    pub fn finish(&mut self, request: &PendingRequest, outcome: Result<QuizData, DomainError>) -> bool {
        let outcome = match outcome {
            Ok(quiz) => {
                info!("Quiz ready with {} questions", quiz.len());
                Ok(quiz)
            }
            Err(e) => {
                warn!("Quiz generation failed: {}", e);
                Err(error_message(&e))
            }
        };
        self.controller.finish(request.ticket(), outcome)
    }

    pub async fn submit(&mut self, topic: &str) -> bool {
        self.edit_topic(topic);
        let Some(request) = self.begin() else {
            return false;
        };
        let outcome = request.structured::<QuizData>().await;
        self.finish(&request, outcome);
        true
    }

    /// Choose an option. Only allowed while answering and for indices that
    /// exist in the current quiz.
    pub fn select(&mut self, question: usize, option: usize) -> bool {
        if self.phase != QuizPhase::Answering {
            return false;
        }
        let Some(quiz) = self.quiz() else {
            return false;
        };
        let valid = quiz
            .questions
            .get(question)
            .is_some_and(|q| option < q.options.len());
        if valid {
            self.selected.insert(question, option);
        }
        valid
    }

    pub fn selected(&self, question: usize) -> Option<usize> {
        self.selected.get(&question).copied()
    }

    pub fn selections(&self) -> &BTreeMap<usize, usize> {
        &self.selected
    }

    /// True iff every question has a selected option.
    pub fn can_submit_answers(&self) -> bool {
        match self.quiz() {
            Some(quiz) if self.phase == QuizPhase::Answering => {
                (0..quiz.len()).all(|i| self.selected.contains_key(&i))
            }
            _ => false,
        }
    }

    /// Freeze the answers and reveal correctness.
    pub fn submit_answers(&mut self) -> bool {
        if !self.can_submit_answers() {
            return false;
        }
        self.phase = QuizPhase::Graded;
        true
    }

    pub fn outcome(&self, question: usize) -> Option<AnswerOutcome> {
        if !self.is_graded() {
            return None;
        }
        let q = self.quiz()?.questions.get(question)?;
        Some(AnswerOutcome {
            selected: self.selected(question)?,
            correct: q.correct_answer_index,
        })
    }

    pub fn score(&self) -> Option<QuizScore> {
        if !self.is_graded() {
            return None;
        }
        let quiz = self.quiz()?;
        let correct = quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.selected(*i).is_some_and(|s| q.is_correct(s)))
            .count();
        Some(QuizScore {
            correct,
            total: quiz.len(),
        })
    }

    /// Leave the current quiz and return to topic entry.
    pub fn new_quiz(&mut self) {
        self.controller.dismiss();
        self.selected.clear();
        self.phase = QuizPhase::Answering;
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.selected.clear();
        self.phase = QuizPhase::Answering;
    }
}
