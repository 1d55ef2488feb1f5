use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::application::{GenerateRequest, ModelClient};
use crate::domain::{response_schema, DomainError, StructuredOutput};

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(8);

/// Bounded retry with full jitter for transient failures.
///
/// The default performs a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::new(1)
    }

    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay.max(base_delay);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Random delay in `[0, min(max_delay, base_delay * 2^(attempt-1))]`.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let ceiling = self
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);
        let ceiling_ms = ceiling.as_millis() as u64;
        if ceiling_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Sends prompts to the model and turns the answers into text or typed values.
pub struct RequestDispatcher {
    client: Arc<dyn ModelClient>,
    retry: RetryPolicy,
}

impl RequestDispatcher {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Raw call. Retries transient failures according to the policy.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, DomainError> {
        let mut attempt = 1;
        loop {
            debug!(
                "Dispatching {} request to {} (attempt {}/{})",
                if request.is_structured() { "structured" } else { "text" },
                self.client.model_name(),
                attempt,
                self.retry.max_attempts
            );

            match self.client.generate(request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        "Model request failed ({}); retrying in {}ms",
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Free-form answer. Empty or whitespace-only answers come back as `None`
    /// so the caller can substitute its own placeholder.
    pub async fn generate_text(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        let text = self.generate(&GenerateRequest::text(prompt)).await?;
        Ok(text.filter(|t| !t.trim().is_empty()))
    }

    /// Schema-constrained answer parsed into `T`.
    ///
    /// Fails with [`DomainError::MalformedResponse`] when the payload is
    /// missing, does not parse, or is rejected by `T::normalize`.
    pub async fn generate_structured<T: StructuredOutput>(&self, prompt: &str) -> Result<T, DomainError> {
        let request = GenerateRequest::structured(prompt, response_schema::<T>());
        let text = self
            .generate(&request)
            .await?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DomainError::malformed("model returned an empty payload"))?;

        let parsed: T = serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            warn!("Could not parse structured response: {e}");
            debug!("Unparsable payload: {text}");
            DomainError::malformed(format!("payload does not match schema: {e}"))
        })?;

        parsed.normalize()
    }
}

/// Models occasionally wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Drop the info string (`json`), with or without a line break after it.
    let info_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    body[info_len..].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockModelClient;
    use crate::domain::QuizData;

    #[test]
    fn strip_code_fence_handles_plain_and_fenced_json() {
        assert_eq!(strip_code_fence(" {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```JSON [1, 2]```"), "[1, 2]");
    }

    #[test]
    fn backoff_stays_under_ceiling() {
        let policy = RetryPolicy::new(5)
            .with_delays(Duration::from_millis(100), Duration::from_millis(250));
        for attempt in 1..10 {
            assert!(policy.backoff(attempt) <= Duration::from_millis(250));
        }
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn generate_text_maps_blank_answers_to_none() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("   ");
        let dispatcher = RequestDispatcher::new(client.clone());

        let text = dispatcher.generate_text("prompt").await.unwrap();
        assert!(text.is_none());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn structured_request_carries_schema() {
        let client = Arc::new(MockModelClient::new());
        client.push_text(
            r#"{"questions":[{"question":"q","options":["a","b"],"correctAnswerIndex":0,"explanation":"e"}]}"#,
        );
        let dispatcher = RequestDispatcher::new(client.clone());

        let quiz: QuizData = dispatcher.generate_structured("quiz please").await.unwrap();
        assert_eq!(quiz.len(), 1);

        let request = client.last_request().unwrap();
        assert_eq!(request.prompt, "quiz please");
        let schema = request.response_schema.unwrap();
        assert!(schema["properties"]["questions"].is_object());
    }

    #[tokio::test]
    async fn empty_structured_payload_is_malformed() {
        let client = Arc::new(MockModelClient::new());
        client.push_empty();
        let dispatcher = RequestDispatcher::new(client);

        let err = dispatcher
            .generate_structured::<QuizData>("quiz")
            .await
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn unparsable_structured_payload_is_malformed() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("Sure! Here is your quiz.");
        let dispatcher = RequestDispatcher::new(client);

        let err = dispatcher
            .generate_structured::<QuizData>("quiz")
            .await
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn transient_failures_are_retried_within_budget() {
        let client = Arc::new(MockModelClient::new());
        client.push_error(DomainError::api(503, "overloaded"));
        client.push_error(DomainError::network("reset"));
        client.push_text("Bonjour");
        let dispatcher = RequestDispatcher::new(client.clone())
            .with_retry(RetryPolicy::new(3).with_delays(Duration::ZERO, Duration::ZERO));

        let text = dispatcher.generate_text("hi").await.unwrap();
        assert_eq!(text.as_deref(), Some("Bonjour"));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn no_retry_by_default() {
        let client = Arc::new(MockModelClient::new());
        client.push_error(DomainError::network("reset"));
        client.push_text("never reached");
        let dispatcher = RequestDispatcher::new(client.clone());

        assert!(dispatcher.generate_text("hi").await.is_err());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn malformed_responses_are_not_retried() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("not json");
        client.push_text("also not json");
        let dispatcher = RequestDispatcher::new(client.clone())
            .with_retry(RetryPolicy::new(3).with_delays(Duration::ZERO, Duration::ZERO));

        assert!(dispatcher.generate_structured::<QuizData>("q").await.is_err());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let client = Arc::new(MockModelClient::new());
        client.push_error(DomainError::api(400, "bad key"));
        let dispatcher = RequestDispatcher::new(client.clone())
            .with_retry(RetryPolicy::new(3).with_delays(Duration::ZERO, Duration::ZERO));

        assert!(dispatcher.generate_text("hi").await.is_err());
        assert_eq!(client.call_count(), 1);
    }
}
