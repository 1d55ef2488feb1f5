use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::application::{ChatTransport, GenerateRequest, ModelClient};
use crate::domain::DomainError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Connection settings for the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read configuration from the environment:
    ///
    /// | Variable              | Default                                              |
    /// |-----------------------|------------------------------------------------------|
    /// | `GEMINI_API_KEY`      | required (falls back to `API_KEY`)                   |
    /// | `GEMINI_MODEL`        | `gemini-2.5-flash`                                   |
    /// | `GEMINI_BASE_URL`     | `https://generativelanguage.googleapis.com/v1beta`   |
    /// | `GEMINI_TIMEOUT_SECS` | `60`                                                 |
    pub fn from_env() -> Result<Self, DomainError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("GEMINI_API_KEY is not set (use --mock-model to run offline)")
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(secs) = std::env::var("GEMINI_TIMEOUT_SECS") {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| DomainError::configuration(format!("invalid GEMINI_TIMEOUT_SECS: {secs}")))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: &'a [ApiContent],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct ApiSystemInstruction<'a> {
    parts: [ApiPart<'a>; 1],
}

#[derive(Debug, Clone, Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct ApiContent {
    role: &'static str,
    parts: Vec<ApiOwnedPart>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct ApiOwnedPart {
    text: String,
}

impl ApiContent {
    fn user(text: &str) -> Self {
        Self {
            role: "user",
            parts: vec![ApiOwnedPart { text: text.to_string() }],
        }
    }

    fn model(text: &str) -> Self {
        Self {
            role: "model",
            parts: vec![ApiOwnedPart { text: text.to_string() }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ApiResponse {
    /// Text of the first candidate, thought parts excluded.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// HTTP client for the Gemini `generateContent` API.
///
/// Implements [`ModelClient`]; chat sessions resend the accumulated history
/// on each turn since the endpoint itself is stateless.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (`{base}/models/{model}:generateContent`).
    url: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, DomainError> {
        if config.api_key.trim().is_empty() {
            return Err(DomainError::configuration("Gemini API key is empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("GeminiClient: {e}")))?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            api_key: config.api_key,
            model: config.model,
            url,
        })
    }

    pub fn from_env() -> Result<Self, DomainError> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }

    async fn post(&self, request: &ApiRequest<'_>) -> Result<Option<String>, DomainError> {
        debug!("POST {} ({} contents)", self.url, request.contents.len());

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::network(format!("GeminiClient: request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}: {body}");
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(DomainError::api(status.as_u16(), message));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| DomainError::network(format!("GeminiClient: failed to read response: {e}")))?;

        Ok(api_response.into_text())
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<Option<String>, DomainError> {
        let contents = [ApiContent::user(&request.prompt)];
        let generation_config = request.response_schema.as_ref().map(|schema| ApiGenerationConfig {
            response_mime_type: JSON_MIME_TYPE,
            response_schema: to_gemini_schema(schema),
        });
        let api_request = ApiRequest {
            contents: &contents,
            system_instruction: None,
            generation_config,
        };
        self.post(&api_request).await
    }

    fn start_chat(&self, system_instruction: &str) -> Box<dyn ChatTransport> {
        Box::new(GeminiChat {
            client: self.clone(),
            system_instruction: system_instruction.to_string(),
            history: Vec::new(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// A conversation held client-side and replayed on every turn.
struct GeminiChat {
    client: GeminiClient,
    system_instruction: String,
    history: Vec<ApiContent>,
}

#[async_trait]
impl ChatTransport for GeminiChat {
    async fn send_message(&mut self, message: &str) -> Result<Option<String>, DomainError> {
        self.history.push(ApiContent::user(message));

        let request = ApiRequest {
            contents: &self.history,
            system_instruction: Some(ApiSystemInstruction {
                parts: [ApiPart {
                    text: &self.system_instruction,
                }],
            }),
            generation_config: None,
        };
        let result = self.client.post(&request).await;

        match &result {
            Ok(Some(reply)) => self.history.push(ApiContent::model(reply)),
            // Keep user/model turns alternating: forget a turn that got no answer.
            _ => {
                self.history.pop();
            }
        }
        result
    }
}

/// Convert a schemars JSON Schema into the OpenAPI subset Gemini accepts:
/// `$ref`s inlined, types upper-cased, optional types expressed as
/// `nullable`, unsupported keywords dropped.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let defs = schema
        .get("$defs")
        .or_else(|| schema.get("definitions"))
        .cloned()
        .unwrap_or(Value::Null);
    convert_schema_node(schema, &defs, 0)
}

const MAX_SCHEMA_DEPTH: usize = 16;
const KEPT_FORMATS: [&str; 4] = ["float", "double", "int32", "int64"];

fn convert_schema_node(node: &Value, defs: &Value, depth: usize) -> Value {
    let Some(obj) = node.as_object() else {
        return node.clone();
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        let name = reference.rsplit('/').next().unwrap_or_default();
        return match defs.get(name) {
            Some(target) if depth < MAX_SCHEMA_DEPTH => convert_schema_node(target, defs, depth + 1),
            _ => Value::Object(Map::new()),
        };
    }

    let mut out = Map::new();

    match obj.get("type") {
        Some(Value::String(t)) => {
            out.insert("type".to_string(), Value::String(t.to_uppercase()));
        }
        Some(Value::Array(types)) => {
            let mut nullable = false;
            for t in types.iter().filter_map(Value::as_str) {
                if t == "null" {
                    nullable = true;
                } else if !out.contains_key("type") {
                    out.insert("type".to_string(), Value::String(t.to_uppercase()));
                }
            }
            if nullable {
                out.insert("nullable".to_string(), Value::Bool(true));
            }
        }
        _ => {}
    }

    if let Some(format) = obj.get("format").and_then(Value::as_str) {
        if KEPT_FORMATS.contains(&format) {
            out.insert("format".to_string(), Value::String(format.to_string()));
        }
    }

    for key in ["description", "enum", "required", "minItems", "maxItems", "nullable"] {
        if let Some(value) = obj.get(key) {
            out.insert(key.to_string(), value.clone());
        }
    }

    if let Some(items) = obj.get("items") {
        out.insert("items".to_string(), convert_schema_node(items, defs, depth + 1));
    }

    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        let converted: Map<String, Value> = properties
            .iter()
            .map(|(name, prop)| (name.clone(), convert_schema_node(prop, defs, depth + 1)))
            .collect();
        out.insert(
            "propertyOrdering".to_string(),
            Value::Array(properties.keys().cloned().map(Value::String).collect()),
        );
        out.insert("properties".to_string(), Value::Object(converted));
    }

    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{response_schema, QuizData, WritingCorrectionResult};
    use serde_json::json;

    #[test]
    fn quiz_schema_is_inlined_and_uppercased() {
        let schema = to_gemini_schema(&response_schema::<QuizData>());
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"], json!(["questions"]));

        let question = &schema["properties"]["questions"]["items"];
        assert_eq!(question["type"], "OBJECT");
        assert_eq!(question["properties"]["correctAnswerIndex"]["type"], "INTEGER");
        assert_eq!(question["properties"]["options"]["items"]["type"], "STRING");
        assert!(question.get("$ref").is_none());
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("$defs").is_none());
    }

    #[test]
    fn writing_schema_keeps_camel_case_fields() {
        let schema = to_gemini_schema(&response_schema::<WritingCorrectionResult>());
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("correctedText"));
        assert_eq!(schema["properties"]["rating"]["properties"]["tone"]["type"], "NUMBER");
    }

    #[test]
    fn optional_types_become_nullable() {
        let schema = to_gemini_schema(&json!({"type": ["string", "null"]}));
        assert_eq!(schema, json!({"type": "STRING", "nullable": true}));
    }

    #[test]
    fn text_request_has_no_generation_config() {
        let contents = [ApiContent::user("hola")];
        let request = ApiRequest {
            contents: &contents,
            system_instruction: None,
            generation_config: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"contents": [{"role": "user", "parts": [{"text": "hola"}]}]}));
    }

    #[test]
    fn structured_request_uses_camel_case_config() {
        let contents = [ApiContent::user("quiz")];
        let request = ApiRequest {
            contents: &contents,
            system_instruction: Some(ApiSystemInstruction {
                parts: [ApiPart { text: "be brief" }],
            }),
            generation_config: Some(ApiGenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: json!({"type": "OBJECT"}),
            }),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let response: ApiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Hola, "},
                {"text": "¿qué tal?"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Hola, ¿qué tal?"));
    }

    #[test]
    fn missing_candidates_yield_no_text() {
        let response: ApiResponse = serde_json::from_value(json!({"promptFeedback": {}})).unwrap();
        assert!(response.into_text().is_none());

        let blocked: ApiResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new(GeminiConfig::new("key").with_model("gemini-2.0-flash")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(GeminiClient::new(GeminiConfig::new(" ")).is_err());
    }

    #[test]
    fn config_debug_hides_key() {
        let rendered = format!("{:?}", GeminiConfig::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
