use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::application::RequestDispatcher;
use crate::domain::{DomainError, StructuredOutput};

/// Shown when a request fails for any reason other than a bad payload.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";
/// Shown when a structured answer is missing or does not parse.
pub const MALFORMED_ERROR: &str = "The tutor's answer could not be read. Please try again.";

/// Observable state of a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolState<T> {
    Idle,
    InputPending,
    Loading,
    ResultShown(T),
    ErrorShown(String),
}

impl<T> ToolState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ToolState::Loading)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            ToolState::ResultShown(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolState::ErrorShown(message) => Some(message),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolState::Idle => "idle",
            ToolState::InputPending => "input-pending",
            ToolState::Loading => "loading",
            ToolState::ResultShown(_) => "result-shown",
            ToolState::ErrorShown(_) => "error-shown",
        }
    }
}

/// Identifies one submission of one controller.
///
/// A ticket whose generation no longer matches its controller belongs to a
/// request the user has abandoned; its outcome is dropped.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl RequestTicket {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` unless the controller is reset first.
    pub async fn run<R, F>(&self, fut: F) -> Result<R, DomainError>
    where
        F: Future<Output = Result<R, DomainError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(DomainError::Cancelled),
            result = fut => result,
        }
    }
}

/// A prompt ready to be sent on behalf of a controller.
///
/// Owns everything it needs, so the controller stays free to be reset or
/// navigated away from while the request is in flight.
pub struct PendingRequest {
    ticket: RequestTicket,
    prompt: String,
    dispatcher: Arc<RequestDispatcher>,
}

impl PendingRequest {
    pub fn ticket(&self) -> &RequestTicket {
        &self.ticket
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn text(&self) -> Result<Option<String>, DomainError> {
        self.ticket
            .run(self.dispatcher.generate_text(&self.prompt))
            .await
    }

    pub async fn structured<T: StructuredOutput>(&self) -> Result<T, DomainError> {
        self.ticket
            .run(self.dispatcher.generate_structured::<T>(&self.prompt))
            .await
    }
}

/// Input, state and request generation shared by every tool.
#[derive(Debug)]
pub struct ToolController<T> {
    state: ToolState<T>,
    input: String,
    generation: u64,
    cancel: CancellationToken,
}

impl<T> Default for ToolController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ToolController<T> {
    pub fn new() -> Self {
        Self {
            state: ToolState::Idle,
            input: String::new(),
            generation: 0,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_input(input: impl Into<String>) -> Self {
        let mut controller = Self::new();
        controller.edit_input(input);
        controller
    }

    pub fn state(&self) -> &ToolState<T> {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Input is frozen while a request is in flight.
    pub fn edit_input(&mut self, input: impl Into<String>) -> bool {
        if self.state.is_loading() {
            return false;
        }
        self.input = input.into();
        match self.state {
            ToolState::Idle | ToolState::InputPending => {
                self.state = if self.input.trim().is_empty() {
                    ToolState::Idle
                } else {
                    ToolState::InputPending
                };
            }
            _ => {}
        }
        true
    }

    pub fn can_submit(&self) -> bool {
        !self.state.is_loading() && !self.input.trim().is_empty()
    }

    /// Move to `Loading` and hand out a ticket, or `None` when submission is
    /// not allowed (blank input or a request already in flight).
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if !self.can_submit() {
            return None;
        }
        self.generation += 1;
        self.cancel = CancellationToken::new();
        self.state = ToolState::Loading;
        Some(RequestTicket {
            generation: self.generation,
            cancel: self.cancel.clone(),
        })
    }

    pub fn begin_request(&mut self, prompt: String, dispatcher: &Arc<RequestDispatcher>) -> Option<PendingRequest> {
        let ticket = self.begin()?;
        debug!("Prompt (generation {}): {}", ticket.generation, prompt);
        Some(PendingRequest {
            ticket,
            prompt,
            dispatcher: Arc::clone(dispatcher),
        })
    }

    /// Apply an outcome. Returns `false` when the ticket is stale and the
    /// outcome was discarded.
    pub fn finish(&mut self, ticket: &RequestTicket, outcome: Result<T, String>) -> bool {
        if ticket.generation != self.generation || !self.state.is_loading() {
            warn!(
                "Discarding stale response (generation {}, current {})",
                ticket.generation, self.generation
            );
            return false;
        }
        self.state = match outcome {
            Ok(result) => ToolState::ResultShown(result),
            Err(message) => ToolState::ErrorShown(message),
        };
        true
    }

    /// Hide the current result or error and go back to input entry.
    pub fn dismiss(&mut self) {
        if self.state.is_loading() {
            return;
        }
        self.state = if self.input.trim().is_empty() {
            ToolState::Idle
        } else {
            ToolState::InputPending
        };
    }

    /// Abandon any in-flight request and return to `Idle` with empty input.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        self.generation += 1;
        self.input.clear();
        self.state = ToolState::Idle;
    }
}

/// User-facing message for a failed request.
pub fn error_message(error: &DomainError) -> String {
    if error.is_malformed() {
        MALFORMED_ERROR.to_string()
    } else {
        GENERIC_ERROR.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_drives_idle_and_pending() {
        let mut controller: ToolController<String> = ToolController::new();
        assert_eq!(controller.state().name(), "idle");

        controller.edit_input("Past tense");
        assert_eq!(controller.state(), &ToolState::InputPending);

        controller.edit_input("   ");
        assert_eq!(controller.state(), &ToolState::Idle);
        assert!(controller.begin().is_none());
    }

    #[test]
    fn begin_is_refused_while_loading() {
        let mut controller: ToolController<String> = ToolController::with_input("x");
        let ticket = controller.begin().unwrap();
        assert!(controller.state().is_loading());
        assert!(controller.begin().is_none());
        assert!(!controller.edit_input("y"));

        assert!(controller.finish(&ticket, Ok("done".to_string())));
        assert_eq!(controller.state().result().map(String::as_str), Some("done"));
    }

    #[test]
    fn resubmission_from_result_goes_back_to_loading() {
        let mut controller: ToolController<u32> = ToolController::with_input("x");
        let first = controller.begin().unwrap();
        controller.finish(&first, Ok(1));

        let second = controller.begin().unwrap();
        assert!(controller.state().is_loading());
        controller.finish(&second, Err(GENERIC_ERROR.to_string()));
        assert_eq!(controller.state().error(), Some(GENERIC_ERROR));
    }

    #[test]
    fn outcome_after_reset_is_discarded() {
        let mut controller: ToolController<u32> = ToolController::with_input("x");
        let ticket = controller.begin().unwrap();

        controller.reset();
        assert!(ticket.is_cancelled());
        assert!(!controller.finish(&ticket, Ok(42)));
        assert_eq!(controller.state(), &ToolState::Idle);
    }

    #[test]
    fn stale_ticket_cannot_overwrite_newer_request() {
        let mut controller: ToolController<u32> = ToolController::with_input("x");
        let old = controller.begin().unwrap();
        controller.reset();
        controller.edit_input("y");
        let new = controller.begin().unwrap();

        assert!(!controller.finish(&old, Ok(1)));
        assert!(controller.state().is_loading());
        assert!(controller.finish(&new, Ok(2)));
        assert_eq!(controller.state().result(), Some(&2));
    }

    #[tokio::test]
    async fn cancelled_ticket_aborts_the_future() {
        let mut controller: ToolController<u32> = ToolController::with_input("x");
        let ticket = controller.begin().unwrap();
        controller.reset();

        let outcome = ticket.run(std::future::pending::<Result<u32, DomainError>>()).await;
        assert!(outcome.unwrap_err().is_cancelled());
    }

    #[test]
    fn dismiss_returns_to_input() {
        let mut controller: ToolController<u32> = ToolController::with_input("x");
        let ticket = controller.begin().unwrap();
        controller.finish(&ticket, Ok(1));
        controller.dismiss();
        assert_eq!(controller.state(), &ToolState::InputPending);
        assert_eq!(controller.input(), "x");
    }
}
