//! Text Generation Port - the external generation/classification service.
//!
//! One capability, one method. The result is a closed union so every caller
//! handles the failure path with a `match` instead of error interception.
//!
//! # Example
//!
//! ```ignore
//! match generator.generate(request).await {
//!     GenerationOutcome::Success(content) => use_reply(content.reply),
//!     GenerationOutcome::Failure(reason) => use_fallback(reason),
//! }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::detection::Classification;
use crate::domain::foundation::{RequestId, SessionId};
use crate::domain::intelligence::IntelligenceRecord;
use crate::domain::persona::PersonaId;
use crate::domain::session::Message;

/// Port for the external text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Performs one generation call. Never panics on malformed output.
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome;
}

/// What the call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationTask {
    /// Judge whether the counterparty text is a fraud attempt.
    Classify,
    /// Produce the persona's next message.
    Reply,
}

impl GenerationTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationTask::Classify => "classify",
            GenerationTask::Reply => "reply",
        }
    }
}

/// Request for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Selects the prompt shape and the expected response.
    pub task: GenerationTask,
    /// Standing instructions for the model.
    pub system_context: String,
    /// Voice to reply in. `None` for classification.
    pub persona: Option<PersonaId>,
    /// Hint for what the reply should try to draw out next.
    pub stage_guidance: Option<String>,
    /// Bounded window of recent messages, oldest first.
    pub recent_history: Vec<Message>,
    /// The inbound message being classified or answered.
    pub counterparty_text: String,
    /// Delivery channel as reported by the caller, e.g. `SMS`.
    pub channel: Option<String>,
    /// Number of messages the caller says preceded this one.
    pub prior_message_count: usize,
    /// Completion budget.
    pub max_tokens: u32,
    pub temperature: f32,
    pub metadata: RequestMetadata,
}

impl GenerationRequest {
    pub fn new(task: GenerationTask, counterparty_text: impl Into<String>, metadata: RequestMetadata) -> Self {
        Self {
            task,
            system_context: String::new(),
            persona: None,
            stage_guidance: None,
            recent_history: Vec::new(),
            counterparty_text: counterparty_text.into(),
            channel: None,
            prior_message_count: 0,
            max_tokens: 100,
            temperature: 0.7,
            metadata,
        }
    }

    pub fn with_system_context(mut self, context: impl Into<String>) -> Self {
        self.system_context = context.into();
        self
    }

    pub fn with_persona(mut self, persona: PersonaId) -> Self {
        self.persona = Some(persona);
        self
    }

    pub fn with_stage_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.stage_guidance = Some(guidance.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.recent_history = history;
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_prior_message_count(mut self, count: usize) -> Self {
        self.prior_message_count = count;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    /// Token cost used for quota accounting: prompt characters / 4 plus the
    /// completion budget.
    pub fn estimated_tokens(&self) -> u32 {
        let prompt_chars = self.system_context.len()
            + self.stage_guidance.as_ref().map_or(0, |g| g.len())
            + self.counterparty_text.len()
            + self.recent_history.iter().map(|m| m.text().len()).sum::<usize>();
        let prompt_tokens = u32::try_from(prompt_chars / 4).unwrap_or(u32::MAX);
        prompt_tokens.saturating_add(self.max_tokens)
    }
}

/// Tracing metadata carried with a request.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Session the call is made for.
    pub session_id: SessionId,
    /// Fresh per call; retries of the same call share it.
    pub request_id: RequestId,
}

impl RequestMetadata {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            request_id: RequestId::new(),
        }
    }
}

/// Result of a generation call.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Success(GeneratedContent),
    /// Callers fall back to local behaviour on any failure.
    Failure(GenerationFailure),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }
}

/// Content of a successful call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedContent {
    /// The reply text. Empty for classification calls.
    pub reply: String,
    /// The verdict of a classification call.
    pub classification: Option<Classification>,
    /// Intelligence the model pointed out. Merged alongside the regex pass.
    pub extracted_hints: Option<IntelligenceRecord>,
}

impl GeneratedContent {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: text.into(),
            ..Self::default()
        }
    }

    pub fn classification(classification: Classification) -> Self {
        Self {
            classification: Some(classification),
            ..Self::default()
        }
    }
}

/// Why a generation call produced nothing usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationFailure {
    /// No response within the per-call timeout.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or protocol failure before a status arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("Generation service returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error body, as far as it could be read.
        message: String,
    },

    /// The response arrived but could not be interpreted.
    #[error("Malformed generation result: {0}")]
    Malformed(String),

    /// The governor refused to wait that long.
    #[error("Quota exceeded: would wait {wait:?}, ceiling {ceiling:?}")]
    QuotaExceeded { wait: Duration, ceiling: Duration },

    /// No API key was supplied.
    #[error("Generation service is not configured")]
    Unconfigured,
}

impl GenerationFailure {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::QuotaExceeded { .. } => "quota_exceeded",
            Self::Unconfigured => "unconfigured",
        }
    }

    /// Whether retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Malformed(_) | Self::QuotaExceeded { .. } | Self::Unconfigured => false,
        }
    }
}
