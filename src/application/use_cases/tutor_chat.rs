use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::{ChatTransport, ModelClient};
use crate::domain::{prompt_builder, ChatMessage, DomainError};

/// Shown in place of a reply when a turn fails.
pub const CHAT_APOLOGY: &str = "Sorry, I had trouble processing that. Please try again.";

/// Opens conversation-practice sessions against the model.
pub struct TutorChatService {
    client: Arc<dyn ModelClient>,
}

impl TutorChatService {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Start a conversation about `topic` in `language`.
    ///
    /// The transcript starts with a greeting from the tutor that names both.
    pub fn open(&self, language: &str, topic: &str) -> Result<ChatSession, DomainError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DomainError::invalid_input("conversation topic is empty"));
        }

        info!("Starting {} conversation about \"{}\"", language, topic);
        let instruction = prompt_builder::tutor_instruction(language, topic);
        let transport = self.client.start_chat(&instruction);

        Ok(ChatSession {
            transport,
            language: language.to_string(),
            topic: topic.to_string(),
            messages: vec![ChatMessage::model(prompt_builder::chat_greeting(language, topic))],
        })
    }
}

/// A live conversation and its visible transcript.
///
/// The model keeps its own view of the history; the transcript here is only
/// what the learner sees. Dropping the session ends the conversation.
pub struct ChatSession {
    transport: Box<dyn ChatTransport>,
    language: String,
    topic: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Take one turn: append the learner's message, wait for the tutor and
    /// append exactly one model message.
    ///
    /// A failed or empty reply becomes [`CHAT_APOLOGY`]; the session remains
    /// usable. Only blank input is an error, and it never reaches the model.
    pub async fn send(&mut self, text: &str) -> Result<&ChatMessage, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::invalid_input("message is empty"));
        }

        self.messages.push(ChatMessage::user(text));

        let reply = match self.transport.send_message(text).await {
            Ok(Some(reply)) if !reply.trim().is_empty() => {
                debug!("Tutor replied with {} chars", reply.len());
                reply
            }
            Ok(_) => {
                warn!("Tutor returned an empty reply");
                CHAT_APOLOGY.to_string()
            }
            Err(e) => {
                warn!("Chat turn failed: {}", e);
                CHAT_APOLOGY.to_string()
            }
        };

        self.messages.push(ChatMessage::model(reply));
        Ok(&self.messages[self.messages.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockModelClient;
    use crate::domain::Role;

    fn service(client: &Arc<MockModelClient>) -> TutorChatService {
        TutorChatService::new(client.clone())
    }

    #[test]
    fn open_greets_with_language_and_topic() {
        let client = Arc::new(MockModelClient::new());
        let session = service(&client).open("Spanish", "Travel").unwrap();

        let first = &session.messages()[0];
        assert_eq!(first.role(), Role::Model);
        assert!(first.text().contains("Spanish"));
        assert!(first.text().contains("Travel"));
        assert_eq!(client.chat_instructions().len(), 1);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn open_rejects_blank_topic() {
        let client = Arc::new(MockModelClient::new());
        assert!(service(&client).open("Spanish", "  ").is_err());
        assert!(client.chat_instructions().is_empty());
    }

    #[tokio::test]
    async fn send_appends_user_then_one_model_message() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("¡Muy bien! ¿Adónde viajas?");
        let mut session = service(&client).open("Spanish", "Travel").unwrap();

        let reply = session.send("Estoy bien").await.unwrap();
        assert_eq!(reply.role(), Role::Model);
        assert_eq!(reply.text(), "¡Muy bien! ¿Adónde viajas?");

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
    }

    #[tokio::test]
    async fn failed_turn_becomes_apology_and_session_survives() {
        let client = Arc::new(MockModelClient::new());
        client.push_error(DomainError::network("timeout"));
        client.push_text("Claro.");
        let mut session = service(&client).open("French", "Food").unwrap();

        assert_eq!(session.send("Bonjour").await.unwrap().text(), CHAT_APOLOGY);
        assert_eq!(session.send("Encore").await.unwrap().text(), "Claro.");
        assert_eq!(session.messages().len(), 5);
        assert_eq!(client.chat_messages(), vec!["Bonjour", "Encore"]);
    }

    #[tokio::test]
    async fn empty_reply_becomes_apology() {
        let client = Arc::new(MockModelClient::new());
        client.push_empty();
        let mut session = service(&client).open("German", "Work").unwrap();

        assert_eq!(session.send("Hallo").await.unwrap().text(), CHAT_APOLOGY);
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_a_call() {
        let client = Arc::new(MockModelClient::new());
        let mut session = service(&client).open("German", "Work").unwrap();

        assert!(session.send("   ").await.is_err());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(client.call_count(), 0);
    }
}
