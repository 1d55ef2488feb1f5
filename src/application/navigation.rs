//! Onboarding (language, then goal) and routing to the active tool.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{
    ConversationTool, QuizTool, RequestDispatcher, TextTool, TextToolKind, TutorChatService,
    WritingTool,
};
use crate::domain::{DomainError, Language, LearningGoal};

/// Shared services every tool is built from.
#[derive(Clone)]
pub struct ToolServices {
    pub dispatcher: Arc<RequestDispatcher>,
    pub chat: Arc<TutorChatService>,
}

/// The controller behind one learning goal.
pub enum ToolPanel {
    Text(TextTool),
    Writing(WritingTool),
    Quiz(QuizTool),
    Conversation(ConversationTool),
}

impl ToolPanel {
    pub fn for_goal(goal: LearningGoal, language: Language, services: &ToolServices) -> Self {
        let dispatcher = Arc::clone(&services.dispatcher);
        match goal {
            LearningGoal::Grammar => ToolPanel::Text(TextTool::new(TextToolKind::Grammar, language, dispatcher)),
            LearningGoal::Vocabulary => {
                ToolPanel::Text(TextTool::new(TextToolKind::Vocabulary, language, dispatcher))
            }
            LearningGoal::Translation => {
                ToolPanel::Text(TextTool::new(TextToolKind::Translation, language, dispatcher))
            }
            LearningGoal::Pronunciation => {
                ToolPanel::Text(TextTool::new(TextToolKind::Pronunciation, language, dispatcher))
            }
            LearningGoal::Plan => ToolPanel::Text(TextTool::new(TextToolKind::Plan, language, dispatcher)),
            LearningGoal::Writing => ToolPanel::Writing(WritingTool::new(language, dispatcher)),
            LearningGoal::Quiz => ToolPanel::Quiz(QuizTool::new(language, dispatcher)),
            LearningGoal::Conversation => {
                ToolPanel::Conversation(ConversationTool::new(language, Arc::clone(&services.chat)))
            }
        }
    }

    pub fn reset(&mut self) {
        match self {
            ToolPanel::Text(tool) => tool.reset(),
            ToolPanel::Writing(tool) => tool.reset(),
            ToolPanel::Quiz(tool) => tool.reset(),
            ToolPanel::Conversation(tool) => tool.reset(),
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextTool> {
        match self {
            ToolPanel::Text(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_writing_mut(&mut self) -> Option<&mut WritingTool> {
        match self {
            ToolPanel::Writing(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_quiz_mut(&mut self) -> Option<&mut QuizTool> {
        match self {
            ToolPanel::Quiz(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_conversation_mut(&mut self) -> Option<&mut ConversationTool> {
        match self {
            ToolPanel::Conversation(tool) => Some(tool),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    ChoosingLanguage,
    ChoosingGoal,
    Active,
}

/// Onboarding state plus the tools opened so far.
///
/// Tools are created the first time their goal is selected and keep their
/// state while the learner switches between goals.
pub struct NavigationShell {
    services: ToolServices,
    language: Option<Language>,
    goal: Option<LearningGoal>,
    panels: HashMap<LearningGoal, ToolPanel>,
}

impl NavigationShell {
    pub fn new(services: ToolServices) -> Self {
        Self {
            services,
            language: None,
            goal: None,
            panels: HashMap::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        match (self.language, self.goal) {
            (None, _) => Screen::ChoosingLanguage,
            (Some(_), None) => Screen::ChoosingGoal,
            (Some(_), Some(_)) => Screen::Active,
        }
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    pub fn goal(&self) -> Option<LearningGoal> {
        self.goal
    }

    /// Choosing a different language closes every open tool.
    pub fn select_language(&mut self, language: Language) {
        if self.language != Some(language) {
            self.close_panels();
        }
        info!("Language selected: {}", language.name());
        self.language = Some(language);
    }

    pub fn select_goal(&mut self, goal: LearningGoal) -> Result<&mut ToolPanel, DomainError> {
        let language = self
            .language
            .ok_or_else(|| DomainError::invalid_input("select a language before choosing a goal"))?;

        debug!("Goal selected: {}", goal);
        self.goal = Some(goal);
        let services = &self.services;
        Ok(self
            .panels
            .entry(goal)
            .or_insert_with(|| ToolPanel::for_goal(goal, language, services)))
    }

    pub fn active_panel(&mut self) -> Option<&mut ToolPanel> {
        let goal = self.goal?;
        self.panels.get_mut(&goal)
    }

    pub fn has_panel(&self, goal: LearningGoal) -> bool {
        self.panels.contains_key(&goal)
    }

    /// One step back: from a tool to goal selection, from goal selection to
    /// language selection.
    pub fn back(&mut self) {
        if self.goal.take().is_none() {
            self.language = None;
            self.close_panels();
        }
    }

    /// Clear both selections and every tool.
    pub fn reset(&mut self) {
        self.close_panels();
        self.language = None;
        self.goal = None;
    }

    fn close_panels(&mut self) {
        for panel in self.panels.values_mut() {
            panel.reset();
        }
        self.panels.clear();
    }
}
