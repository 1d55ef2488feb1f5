use std::sync::Arc;

use tracing::warn;

use super::tool_state::{error_message, PendingRequest, ToolController, ToolState};
use crate::application::RequestDispatcher;
use crate::domain::{prompt_builder, DomainError, Language, LearningGoal, ProficiencyLevel};

/// The five tools that answer with free-form markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextToolKind {
    Grammar,
    Vocabulary,
    Translation,
    Pronunciation,
    Plan,
}

impl TextToolKind {
    pub fn goal(&self) -> LearningGoal {
        match self {
            TextToolKind::Grammar => LearningGoal::Grammar,
            TextToolKind::Vocabulary => LearningGoal::Vocabulary,
            TextToolKind::Translation => LearningGoal::Translation,
            TextToolKind::Pronunciation => LearningGoal::Pronunciation,
            TextToolKind::Plan => LearningGoal::Plan,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TextToolKind::Grammar => "Grammar Guide",
            TextToolKind::Vocabulary => "Vocabulary Builder",
            TextToolKind::Translation => "Smart Translation",
            TextToolKind::Pronunciation => "Pronunciation Guide",
            TextToolKind::Plan => "Personalized Plan",
        }
    }

    /// Placeholder shown when the model answers with nothing.
    pub fn fallback(&self) -> &'static str {
        match self {
            TextToolKind::Grammar => "Could not generate explanation.",
            TextToolKind::Vocabulary => "Could not generate vocabulary.",
            TextToolKind::Translation => "Translation failed.",
            TextToolKind::Pronunciation => "Guide generation failed.",
            TextToolKind::Plan => "Plan generation failed.",
        }
    }

    pub fn input_hint(&self, language: &Language) -> String {
        match self {
            TextToolKind::Grammar => "Enter a topic (e.g., Past Tense, Articles...)".to_string(),
            TextToolKind::Vocabulary => "Enter a theme (e.g., At the Airport, Business...)".to_string(),
            TextToolKind::Translation => "Enter text in any language...".to_string(),
            TextToolKind::Pronunciation => format!("Enter a {} phrase...", language.name()),
            TextToolKind::Plan => "Beginner, Intermediate or Advanced".to_string(),
        }
    }

    /// `None` when the input cannot be turned into a prompt.
    pub fn build_prompt(&self, language: &Language, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let name = language.name();
        Some(match self {
            TextToolKind::Grammar => prompt_builder::grammar(name, input),
            TextToolKind::Vocabulary => prompt_builder::vocabulary(name, input),
            TextToolKind::Translation => prompt_builder::translation(name, input),
            TextToolKind::Pronunciation => prompt_builder::pronunciation(name, input),
            TextToolKind::Plan => prompt_builder::learning_plan(name, ProficiencyLevel::parse(input)?),
        })
    }

    /// Input a fresh tool starts with.
    fn initial_input(&self) -> &'static str {
        match self {
            TextToolKind::Plan => ProficiencyLevel::Beginner.as_str(),
            _ => "",
        }
    }
}

/// Controller for a markdown-producing tool.
pub struct TextTool {
    kind: TextToolKind,
    language: Language,
    dispatcher: Arc<RequestDispatcher>,
    controller: ToolController<String>,
}

impl TextTool {
    pub fn new(kind: TextToolKind, language: Language, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            kind,
            language,
            dispatcher,
            controller: ToolController::with_input(kind.initial_input()),
        }
    }

    pub fn kind(&self) -> TextToolKind {
        self.kind
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn state(&self) -> &ToolState<String> {
        self.controller.state()
    }

    pub fn input(&self) -> &str {
        self.controller.input()
    }

    pub fn edit_input(&mut self, input: impl Into<String>) -> bool {
        self.controller.edit_input(input)
    }

    pub fn can_submit(&self) -> bool {
        self.controller.can_submit() && self.kind.build_prompt(&self.language, self.input()).is_some()
    }

    pub fn begin(&mut self) -> Option<PendingRequest> {
        if !self.can_submit() {
            return None;
        }
        let prompt = self.kind.build_prompt(&self.language, self.controller.input())?;
        self.controller.begin_request(prompt, &self.dispatcher)
    }

    pub fn finish(&mut self, request: &PendingRequest, outcome: Result<Option<String>, DomainError>) -> bool {
        let outcome = match outcome {
            Ok(Some(text)) => Ok(text),
            Ok(None) => {
                warn!("{} returned no text; showing fallback", self.kind.title());
                Ok(self.kind.fallback().to_string())
            }
            Err(e) => {
                warn!("{} request failed: {}", self.kind.title(), e);
                Err(error_message(&e))
            }
        };
        self.controller.finish(request.ticket(), outcome)
    }

    /// Set the input and run one request to completion.
    ///
    /// Returns `false` without touching the network when the input is not
    /// submittable.
    pub async fn submit(&mut self, input: &str) -> bool {
        self.edit_input(input);
        let Some(request) = self.begin() else {
            return false;
        };
        let outcome = request.text().await;
        self.finish(&request, outcome);
        true
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.controller.edit_input(self.kind.initial_input());
    }
}
