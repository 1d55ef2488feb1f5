use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::application::{
    ModelClient, NavigationShell, RequestDispatcher, RetryPolicy, ToolServices, TutorChatService,
};
use crate::connector::{GeminiClient, MockModelClient};
use crate::domain::Language;

pub struct ContainerConfig {
    /// Target language, by code (`es`) or name (`Spanish`).
    pub language: String,
    /// Answer from canned responses instead of calling Gemini.
    pub mock_model: bool,
    /// Maximum attempts per request; `1` disables retrying.
    pub retries: u32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            mock_model: false,
            retries: 1,
        }
    }
}

pub struct Container {
    client: Arc<dyn ModelClient>,
    services: ToolServices,
    language: Language,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let client: Arc<dyn ModelClient> = if config.mock_model {
            debug!("Using mock model client");
            Arc::new(MockModelClient::new())
        } else {
            let gemini = GeminiClient::from_env()?;
            debug!("Using Gemini model {}", gemini.model_name());
            Arc::new(gemini)
        };
        Self::with_client(client, config)
    }

    /// Build the container around an existing client.
    pub fn with_client(client: Arc<dyn ModelClient>, config: ContainerConfig) -> Result<Self> {
        let language = Language::resolve(&config.language)?;

        let dispatcher = RequestDispatcher::new(Arc::clone(&client))
            .with_retry(RetryPolicy::new(config.retries));
        let services = ToolServices {
            dispatcher: Arc::new(dispatcher),
            chat: Arc::new(TutorChatService::new(Arc::clone(&client))),
        };

        Ok(Self {
            client,
            services,
            language,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn services(&self) -> &ToolServices {
        &self.services
    }

    /// A navigation shell with the configured language already chosen.
    pub fn shell(&self) -> NavigationShell {
        let mut shell = NavigationShell::new(self.services.clone());
        shell.select_language(self.language);
        shell
    }
}
