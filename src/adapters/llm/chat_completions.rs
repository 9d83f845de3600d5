//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol
//! (Groq, OpenAI, local gateways).
//!
//! # Configuration
//!
//! ```ignore
//! let config = ChatCompletionsConfig::new(api_key)
//!     .with_model("llama-3.3-70b-versatile")
//!     .with_base_url("https://api.groq.com/openai/v1");
//!
//! let generator = ChatCompletionsGenerator::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::ReplySanitizer;
use crate::domain::session::Sender;
use crate::ports::{
    GeneratedContent, GenerationFailure, GenerationOutcome, GenerationRequest, GenerationTask,
    TextGenerator,
};

use super::parsing::parse_classification;

/// Configuration for the chat-completions client.
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ChatCompletionsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Generation service client.
pub struct ChatCompletionsGenerator {
    config: ChatCompletionsConfig,
    client: Client,
    sanitizer: ReplySanitizer,
}

impl ChatCompletionsGenerator {
    pub fn new(config: ChatCompletionsConfig) -> Result<Self, GenerationFailure> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationFailure::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            sanitizer: ReplySanitizer::new(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts a request into the wire format.
    fn to_wire_request(&self, request: &GenerationRequest) -> ChatRequest {
        let mut messages = Vec::new();

        let mut system = request.system_context.clone();
        if let Some(guidance) = &request.stage_guidance {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str("Current tactic: ");
            system.push_str(guidance);
        }
        if !system.is_empty() {
            messages.push(ChatMessage::new("system", system));
        }

        match request.task {
            GenerationTask::Classify => {
                let context = match request.prior_message_count {
                    0 => "First message".to_string(),
                    n => format!("{} previous messages", n),
                };
                let channel = request.channel.as_deref().unwrap_or("unknown");
                messages.push(ChatMessage::new(
                    "user",
                    format!(
                        "Channel: {}\nContext: {}\nMessage: {}",
                        channel, context, request.counterparty_text
                    ),
                ));
            }
            GenerationTask::Reply => {
                for message in &request.recent_history {
                    let role = match message.sender() {
                        Sender::Counterparty => "user",
                        Sender::Agent => "assistant",
                    };
                    messages.push(ChatMessage::new(role, message.text()));
                }
                messages.push(ChatMessage::new("user", request.counterparty_text.clone()));
            }
        }

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: match request.task {
                GenerationTask::Classify => Some(ResponseFormat {
                    kind: "json_object".to_string(),
                }),
                GenerationTask::Reply => None,
            },
        }
    }

    async fn send(&self, request: &GenerationRequest) -> Result<Response, GenerationFailure> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_wire_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationFailure::Timeout(self.config.timeout)
                } else if e.is_connect() {
                    GenerationFailure::transport(format!("Connection failed: {}", e))
                } else {
                    GenerationFailure::transport(e.to_string())
                }
            })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GenerationFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message: String = body.chars().take(200).collect();
        Err(GenerationFailure::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_content(&self, response: Response) -> Result<String, GenerationFailure> {
        let response = self.handle_response_status(response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationFailure::malformed(format!("Failed to parse response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationFailure::malformed("No content in response"))
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<GeneratedContent, GenerationFailure> {
        let response = self.send(request).await?;
        let content = self.parse_content(response).await?;

        match request.task {
            GenerationTask::Classify => {
                parse_classification(&content).map(GeneratedContent::classification)
            }
            GenerationTask::Reply => self
                .sanitizer
                .sanitize(&content)
                .map(GeneratedContent::reply)
                .map_err(|e| GenerationFailure::malformed(e.to_string())),
        }
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        match self.complete(&request).await {
            Ok(content) => GenerationOutcome::Success(content),
            Err(failure) => GenerationOutcome::Failure(failure),
        }
    }
}

// ----- Wire Types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, Timestamp};
    use crate::domain::persona::PersonaId;
    use crate::domain::session::Message;
    use crate::ports::RequestMetadata;

    fn generator() -> ChatCompletionsGenerator {
        ChatCompletionsGenerator::new(
            ChatCompletionsConfig::new("test-key").with_base_url("http://localhost:9/v1/"),
        )
        .unwrap()
    }

    fn metadata() -> RequestMetadata {
        RequestMetadata::new(SessionId::new("wire").unwrap())
    }

    #[test]
    fn config_builder_works() {
        let config = ChatCompletionsConfig::new("k")
            .with_model("m")
            .with_base_url("http://x")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.model, "m");
        assert_eq!(config.base_url, "http://x");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key(), "k");
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        assert_eq!(generator().completions_url(), "http://localhost:9/v1/chat/completions");
    }

    #[test]
    fn reply_request_maps_history_roles_and_guidance() {
        let now = Timestamp::now();
        let request = GenerationRequest::new(GenerationTask::Reply, "send the otp", metadata())
            .with_system_context("You are Kamala.")
            .with_persona(PersonaId::ElderlyConfused)
            .with_stage_guidance("Stall.")
            .with_history(vec![
                Message::counterparty("your account is blocked", now).unwrap(),
                Message::agent("oh no, why?", now).unwrap(),
            ]);

        let wire = generator().to_wire_request(&request);
        let roles: Vec<&str> = wire.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(
            wire.messages[0].content.as_deref(),
            Some("You are Kamala.\n\nCurrent tactic: Stall.")
        );
        assert!(wire.response_format.is_none());
    }

    #[test]
    fn classify_request_asks_for_json_with_context_line() {
        let request = GenerationRequest::new(GenerationTask::Classify, "you won a prize", metadata())
            .with_system_context("Classify.")
            .with_channel("SMS")
            .with_prior_message_count(2);

        let wire = generator().to_wire_request(&request);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(
            wire.messages[1].content.as_deref(),
            Some("Channel: SMS\nContext: 2 previous messages\nMessage: you won a prize")
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_failure_not_a_panic() {
        let request = GenerationRequest::new(GenerationTask::Reply, "hello", metadata());
        let outcome = generator().generate(request).await;
        assert!(matches!(
            outcome,
            GenerationOutcome::Failure(GenerationFailure::Transport(_))
                | GenerationOutcome::Failure(GenerationFailure::Timeout(_))
        ));
    }
}
