use async_trait::async_trait;

use crate::domain::DomainError;

/// A single `generateContent`-style call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    /// When present the model must answer with JSON matching this schema.
    pub response_schema: Option<serde_json::Value>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    pub fn structured(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: Some(schema),
        }
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// Remote language model service.
///
/// Implementors own transport, authentication and vendor wire formats.
/// `Ok(None)` means the service answered but produced no text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, DomainError>;

    /// Open a multi-turn conversation seeded with a system instruction.
    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatTransport>;

    fn model_name(&self) -> &str;
}

/// One live conversation with the remote model.
///
/// `send_message` takes `&mut self`: a conversation can only have one turn in
/// flight, and the history the model sees depends on turns arriving in order.
#[async_trait]
pub trait ChatTransport: Send {
    async fn send_message(&mut self, message: &str) -> Result<Option<String>, DomainError>;
}
