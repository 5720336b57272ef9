use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::providers::ProviderId;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

// substituted when nobody in the conversation spoke as the user
pub const FALLBACK_USER_PROMPT: &str = "Hello";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

// Selects the canned system prompt for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Default,
    Rag,
    Document,
    Image,
    Audio,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Default, Mode::Rag, Mode::Document, Mode::Image, Mode::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Default => "default",
            Mode::Rag => "rag",
            Mode::Document => "document",
            Mode::Image => "image",
            Mode::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Mode::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

// Chat API request body as it arrives on the wire.
// Everything is optional here so validation can name what is missing.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub messages: Option<Vec<WireMessage>>,
    pub provider: Option<String>,
    pub mode: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// A validated chat request. Immutable once built; lives for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub provider: ProviderId,
    pub mode: Mode,
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>, provider: ProviderId, mode: Mode) -> Self {
        Self {
            messages,
            provider,
            mode,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    // Most recent user-authored content, or `"Hello"` when there is none.
    pub fn last_user_content(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or(FALLBACK_USER_PROMPT)
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }
}

impl TryFrom<ChatRequestBody> for ChatRequest {
    type Error = GatewayError;

    fn try_from(body: ChatRequestBody) -> Result<Self, Self::Error> {
        let wire_messages = body
            .messages
            .ok_or_else(|| GatewayError::malformed("messages array is required"))?;
        if wire_messages.is_empty() {
            return Err(GatewayError::malformed("messages array must not be empty"));
        }

        let provider = body
            .provider
            .ok_or_else(|| GatewayError::malformed("provider is required"))?;
        let provider = ProviderId::parse(&provider)
            .ok_or_else(|| GatewayError::UnknownProvider(provider.clone()))?;

        let mode = body
            .mode
            .ok_or_else(|| GatewayError::malformed("mode is required"))?;
        let mode = Mode::parse(&mode)
            .ok_or_else(|| GatewayError::malformed(format!("unknown mode '{}'", mode)))?;

        let mut messages = Vec::with_capacity(wire_messages.len());
        for m in wire_messages {
            let role = Role::parse(&m.role)
                .ok_or_else(|| GatewayError::malformed(format!("unknown role '{}'", m.role)))?;
            messages.push(Message::new(role, m.content));
        }

        let temperature = body.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=1.0).contains(&temperature) {
            return Err(GatewayError::malformed(
                "temperature must be between 0.0 and 1.0",
            ));
        }

        let max_tokens = body.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if max_tokens == 0 {
            return Err(GatewayError::malformed("maxTokens must be positive"));
        }

        // blank model means "pick the provider default"
        let model = body.model.filter(|m| !m.trim().is_empty());

        Ok(Self {
            messages,
            provider,
            mode,
            model,
            temperature,
            max_tokens,
        })
    }
}
