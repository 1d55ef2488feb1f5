use std::sync::Arc;

use tracing::warn;

use crate::application::{ChatSession, TutorChatService};
use crate::domain::{ChatMessage, DomainError, Language};

pub const SUGGESTED_TOPICS: [&str; 5] = ["Travel", "Restaurants", "Hobbies", "Family", "Work"];

/// Conversation practice: pick a topic, then take turns with the tutor.
pub struct ConversationTool {
    language: Language,
    chat: Arc<TutorChatService>,
    topic: String,
    session: Option<ChatSession>,
}

impl ConversationTool {
    pub fn new(language: Language, chat: Arc<TutorChatService>) -> Self {
        Self {
            language,
            chat,
            topic: String::new(),
            session: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The topic can only change before the conversation starts.
    pub fn edit_topic(&mut self, topic: impl Into<String>) -> bool {
        if self.is_started() {
            return false;
        }
        self.topic = topic.into();
        true
    }

    pub fn choose_suggestion(&mut self, index: usize) -> bool {
        match SUGGESTED_TOPICS.get(index) {
            Some(topic) => self.edit_topic(*topic),
            None => false,
        }
    }

    pub fn can_start(&self) -> bool {
        !self.is_started() && !self.topic.trim().is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    pub fn start(&mut self) -> bool {
        if !self.can_start() {
            return false;
        }
        match self.chat.open(self.language.name(), &self.topic) {
            Ok(session) => {
                self.session = Some(session);
                true
            }
            Err(e) => {
                warn!("Could not start conversation: {}", e);
                false
            }
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.session.as_ref().map(|s| s.messages()).unwrap_or_default()
    }

    /// One turn. Fails only when the conversation has not started or the
    /// message is blank; a failed model call shows up as an apology message.
    pub async fn send(&mut self, text: &str) -> Result<&ChatMessage, DomainError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| DomainError::invalid_input("conversation has not started"))?;
        session.send(text).await
    }

    /// Discard the session and its transcript.
    pub fn end(&mut self) {
        self.session = None;
    }

    pub fn reset(&mut self) {
        self.end();
        self.topic.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockModelClient;
    use crate::domain::Role;

    fn tool(client: &Arc<MockModelClient>) -> ConversationTool {
        let chat = Arc::new(TutorChatService::new(client.clone()));
        ConversationTool::new(Language::from_code("es").unwrap(), chat)
    }

    #[tokio::test]
    async fn start_is_gated_on_topic() {
        let client = Arc::new(MockModelClient::new());
        let mut conversation = tool(&client);

        assert!(!conversation.start());
        assert!(conversation.send("hola").await.is_err());

        assert!(conversation.choose_suggestion(0));
        assert!(conversation.start());
        assert!(conversation.messages()[0].text().contains("\"Travel\" in Spanish"));
        assert!(!conversation.edit_topic("Food"));
    }

    #[tokio::test]
    async fn turns_append_model_replies() {
        let client = Arc::new(MockModelClient::new());
        client.push_text("¡Qué bien!");
        let mut conversation = tool(&client);
        conversation.edit_topic("Hobbies");
        conversation.start();

        let reply = conversation.send("Me gusta leer").await.unwrap();
        assert_eq!(reply.role(), Role::Model);
        assert_eq!(conversation.messages().len(), 3);
    }

    #[tokio::test]
    async fn end_discards_transcript() {
        let client = Arc::new(MockModelClient::new());
        let mut conversation = tool(&client);
        conversation.edit_topic("Work");
        conversation.start();
        conversation.end();

        assert!(!conversation.is_started());
        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.topic(), "Work");
        assert!(conversation.can_start());
    }
}
