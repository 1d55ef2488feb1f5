use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::application::{ChatTransport, GenerateRequest, ModelClient};
use crate::domain::DomainError;

const CANNED_QUIZ: &str = r#"{"questions":[
{"question":"Which word means 'hello'?","options":["Hola","Adiós","Gracias","Perdón"],"correctAnswerIndex":0,"explanation":"'Hola' is the everyday greeting."},
{"question":"Which word means 'thank you'?","options":["Por favor","Gracias","Lo siento","De nada"],"correctAnswerIndex":1,"explanation":"'Gracias' expresses thanks."}
]}"#;

const CANNED_CORRECTION: &str = r#"{"correctedText":"This is a corrected sentence.","explanation":"Mock explanation of the changes.","tips":["Read your text aloud","Check verb endings","Keep sentences short"],"rating":{"grammar":7,"clarity":8,"tone":9}}"#;

enum Scripted {
    Reply(Option<String>),
    Fail(DomainError),
}

#[derive(Default)]
struct MockState {
    script: VecDeque<Scripted>,
    requests: Vec<GenerateRequest>,
    chat_instructions: Vec<String>,
    chat_messages: Vec<String>,
    calls: usize,
}

/// In-process [`ModelClient`] with scripted replies.
///
/// Replies queued with the `push_*` methods are consumed in order by both
/// `generate` and chat turns. When the queue is empty a deterministic canned
/// answer is produced: markdown for text requests, a valid payload for the
/// quiz and writing schemas, an echo for chat turns.
#[derive(Clone, Default)]
pub struct MockModelClient {
    state: Arc<Mutex<MockState>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.lock().script.push_back(Scripted::Reply(Some(text.into())));
    }

    pub fn push_empty(&self) {
        self.lock().script.push_back(Scripted::Reply(None));
    }

    pub fn push_error(&self, error: DomainError) {
        self.lock().script.push_back(Scripted::Fail(error));
    }

    /// Number of remote calls made, `generate` and chat turns combined.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn chat_instructions(&self) -> Vec<String> {
        self.lock().chat_instructions.clone()
    }

    pub fn chat_messages(&self) -> Vec<String> {
        self.lock().chat_messages.clone()
    }

    fn next_scripted(&self) -> Option<Scripted> {
        let mut state = self.lock();
        state.calls += 1;
        state.script.pop_front()
    }

    fn canned_generate(request: &GenerateRequest) -> String {
        match &request.response_schema {
            Some(schema) if schema["properties"].get("questions").is_some() => CANNED_QUIZ.to_string(),
            Some(schema) if schema["properties"].get("correctedText").is_some() => {
                CANNED_CORRECTION.to_string()
            }
            Some(_) => "{}".to_string(),
            None => {
                let first_line = request.prompt.lines().next().unwrap_or_default();
                format!("## Mock lesson\n\n_Offline answer for:_ {first_line}\n")
            }
        }
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, DomainError> {
        self.lock().requests.push(request.clone());
        match self.next_scripted() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(e)) => Err(e),
            None => Ok(Some(Self::canned_generate(request))),
        }
    }

    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatTransport> {
        self.lock()
            .chat_instructions
            .push(system_instruction.to_string());
        Box::new(MockChat {
            client: self.clone(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

struct MockChat {
    client: MockModelClient,
}

#[async_trait]
impl ChatTransport for MockChat {
    async fn send_message(&mut self, message: &str) -> Result<Option<String>, DomainError> {
        self.client.lock().chat_messages.push(message.to_string());
        match self.client.next_scripted() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(e)) => Err(e),
            None => Ok(Some(format!("(mock) You said: {message}"))),
        }
    }
}
