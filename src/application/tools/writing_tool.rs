use std::sync::Arc;

use tracing::warn;

use super::tool_state::{error_message, PendingRequest, ToolController, ToolState};
use crate::application::RequestDispatcher;
use crate::domain::{prompt_builder, DomainError, Language, WritingCorrectionResult};

/// Writing correction with structured feedback.
pub struct WritingTool {
    language: Language,
    dispatcher: Arc<RequestDispatcher>,
    controller: ToolController<WritingCorrectionResult>,
}

impl WritingTool {
    pub fn new(language: Language, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            language,
            dispatcher,
            controller: ToolController::new(),
        }
    }

    pub fn state(&self) -> &ToolState<WritingCorrectionResult> {
        self.controller.state()
    }

    pub fn input(&self) -> &str {
        self.controller.input()
    }

    pub fn edit_input(&mut self, input: impl Into<String>) -> bool {
        self.controller.edit_input(input)
    }

    pub fn can_submit(&self) -> bool {
        self.controller.can_submit()
    }

    pub fn begin(&mut self) -> Option<PendingRequest> {
        let prompt = prompt_builder::writing_correction(self.language.name(), self.controller.input());
        self.controller.begin_request(prompt, &self.dispatcher)
    }

    pub fn finish(
        &mut self,
        request: &PendingRequest,
        outcome: Result<WritingCorrectionResult, DomainError>,
    ) -> bool {
        let outcome = outcome.map_err(|e| {
            warn!("Writing correction failed: {}", e);
            error_message(&e)
        });
        self.controller.finish(request.ticket(), outcome)
    }

    pub async fn submit(&mut self, text: &str) -> bool {
        self.edit_input(text);
        let Some(request) = self.begin() else {
            return false;
        };
        let outcome = request.structured::<WritingCorrectionResult>().await;
        self.finish(&request, outcome);
        true
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }
}
