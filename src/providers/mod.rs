mod anthropic;
mod backend;
mod cohere;
mod credentials;
mod gemini;
mod openai_compat;
mod sse;

pub use backend::{ChatBackend, HttpBackend, ProviderCall, TextStream};
pub use credentials::Credentials;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Groq,
    OpenAi,
    Anthropic,
    Mistral,
    DeepSeek,
    Cohere,
    HuggingFace,
    Fireworks,
    Google,
    Alibaba,
    Xai,
    DashScope,
}

impl ProviderId {
    pub const ALL: [ProviderId; 12] = [
        ProviderId::Groq,
        ProviderId::OpenAi,
        ProviderId::Anthropic,
        ProviderId::Mistral,
        ProviderId::DeepSeek,
        ProviderId::Cohere,
        ProviderId::HuggingFace,
        ProviderId::Fireworks,
        ProviderId::Google,
        ProviderId::Alibaba,
        ProviderId::Xai,
        ProviderId::DashScope,
    ];

    pub fn as_str(&self) -> &'static str {
        self.profile().id
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        ProviderId::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        match self {
            ProviderId::Groq => &GROQ,
            ProviderId::OpenAi => &OPENAI,
            ProviderId::Anthropic => &ANTHROPIC,
            ProviderId::Mistral => &MISTRAL,
            ProviderId::DeepSeek => &DEEPSEEK,
            ProviderId::Cohere => &COHERE,
            ProviderId::HuggingFace => &HUGGINGFACE,
            ProviderId::Fireworks => &FIREWORKS,
            ProviderId::Google => &GOOGLE,
            ProviderId::Alibaba => &ALIBABA,
            ProviderId::Xai => &XAI,
            ProviderId::DashScope => &DASHSCOPE,
        }
    }

    pub fn is_implemented(&self) -> bool {
        self.profile().wire.is_some()
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::parse(s).ok_or_else(|| format!("unknown provider '{}'", s))
    }
}

// How we talk to a vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    // `POST {base}/chat/completions` with SSE deltas
    OpenAiCompatible { base_url: &'static str },
    Anthropic,
    Cohere,
    Gemini,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub economical: bool,
}

// Static description of a provider. Never mutated at runtime.
#[derive(Debug)]
pub struct ProviderProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub env_var: &'static str,
    // Smallest / cheapest model, used when the request names none.
    pub default_model: &'static str,
    pub capabilities: &'static [&'static str],
    pub wire: Option<Wire>,
    pub models: &'static [ModelInfo],
}

static GROQ: ProviderProfile = ProviderProfile {
    id: "groq",
    display_name: "Groq",
    env_var: "GROQ_API_KEY",
    default_model: "llama-3.1-8b-instant",
    capabilities: &["chat", "fast"],
    wire: Some(Wire::OpenAiCompatible {
        base_url: "https://api.groq.com/openai/v1",
    }),
    models: &[
        ModelInfo { id: "llama-3.1-8b-instant", name: "Llama 3.1 8B Instant", economical: true },
        ModelInfo { id: "llama-3.3-70b-versatile", name: "Llama 3.3 70B", economical: false },
        ModelInfo { id: "mixtral-8x7b-32768", name: "Mixtral 8x7B", economical: true },
        ModelInfo { id: "gemma2-9b-it", name: "Gemma 2 9B", economical: true },
    ],
};

static OPENAI: ProviderProfile = ProviderProfile {
    id: "openai",
    display_name: "OpenAI",
    env_var: "OPENAI_API_KEY",
    default_model: "gpt-4o-mini",
    capabilities: &["chat", "vision", "image", "audio"],
    wire: Some(Wire::OpenAiCompatible {
        base_url: "https://api.openai.com/v1",
    }),
    models: &[
        ModelInfo { id: "gpt-4o-mini", name: "GPT-4o mini", economical: true },
        ModelInfo { id: "gpt-4o", name: "GPT-4o", economical: false },
        ModelInfo { id: "gpt-3.5-turbo", name: "GPT-3.5 Turbo", economical: true },
    ],
};

static ANTHROPIC: ProviderProfile = ProviderProfile {
    id: "anthropic",
    display_name: "Anthropic",
    env_var: "ANTHROPIC_API_KEY",
    default_model: "claude-3-haiku-20240307",
    capabilities: &["chat", "vision", "document"],
    wire: Some(Wire::Anthropic),
    models: &[
        ModelInfo { id: "claude-3-haiku-20240307", name: "Claude 3 Haiku", economical: true },
        ModelInfo { id: "claude-3-5-sonnet-20240620", name: "Claude 3.5 Sonnet", economical: false },
        ModelInfo { id: "claude-3-opus-20240229", name: "Claude 3 Opus", economical: false },
    ],
};

static MISTRAL: ProviderProfile = ProviderProfile {
    id: "mistral",
    display_name: "Mistral AI",
    env_var: "MISTRAL_API_KEY",
    default_model: "mistral-small-latest",
    capabilities: &["chat"],
    wire: Some(Wire::OpenAiCompatible {
        base_url: "https://api.mistral.ai/v1",
    }),
    models: &[
        ModelInfo { id: "mistral-small-latest", name: "Mistral Small", economical: true },
        ModelInfo { id: "mistral-large-latest", name: "Mistral Large", economical: false },
        ModelInfo { id: "open-mistral-nemo", name: "Mistral Nemo", economical: true },
    ],
};

static DEEPSEEK: ProviderProfile = ProviderProfile {
    id: "deepseek",
    display_name: "DeepSeek",
    env_var: "DEEPSEEK_API_KEY",
    default_model: "deepseek-chat",
    capabilities: &["chat", "code"],
    wire: Some(Wire::OpenAiCompatible {
        base_url: "https://api.deepseek.com/v1",
    }),
    models: &[
        ModelInfo { id: "deepseek-chat", name: "DeepSeek Chat", economical: true },
        ModelInfo { id: "deepseek-reasoner", name: "DeepSeek Reasoner", economical: false },
    ],
};

static COHERE: ProviderProfile = ProviderProfile {
    id: "cohere",
    display_name: "Cohere",
    env_var: "COHERE_API_KEY",
    default_model: "command-r",
    capabilities: &["chat", "rag"],
    wire: Some(Wire::Cohere),
    models: &[
        ModelInfo { id: "command-r", name: "Command R", economical: true },
        ModelInfo { id: "command-r-plus", name: "Command R+", economical: false },
    ],
};

static HUGGINGFACE: ProviderProfile = ProviderProfile {
    id: "huggingface",
    display_name: "Hugging Face",
    env_var: "HUGGINGFACE_API_KEY",
    default_model: "meta-llama/Meta-Llama-3-8B-Instruct",
    capabilities: &["chat"],
    wire: None,
    models: &[
        ModelInfo { id: "meta-llama/Meta-Llama-3-8B-Instruct", name: "Llama 3 8B Instruct", economical: true },
        ModelInfo { id: "mistralai/Mistral-7B-Instruct-v0.3", name: "Mistral 7B Instruct", economical: true },
    ],
};

static FIREWORKS: ProviderProfile = ProviderProfile {
    id: "fireworks",
    display_name: "Fireworks",
    env_var: "FIREWORKS_API_KEY",
    default_model: "accounts/fireworks/models/llama-v3p1-8b-instruct",
    capabilities: &["chat", "fast"],
    wire: None,
    models: &[
        ModelInfo { id: "accounts/fireworks/models/llama-v3p1-8b-instruct", name: "Llama 3.1 8B", economical: true },
        ModelInfo { id: "accounts/fireworks/models/llama-v3p1-70b-instruct", name: "Llama 3.1 70B", economical: false },
    ],
};

static GOOGLE: ProviderProfile = ProviderProfile {
    id: "google",
    display_name: "Google Gemini",
    env_var: "GOOGLE_API_KEY",
    default_model: "gemini-1.5-flash",
    capabilities: &["chat", "vision", "audio", "document"],
    wire: Some(Wire::Gemini),
    models: &[
        ModelInfo { id: "gemini-1.5-flash", name: "Gemini 1.5 Flash", economical: true },
        ModelInfo { id: "gemini-1.5-pro", name: "Gemini 1.5 Pro", economical: false },
    ],
};

static ALIBABA: ProviderProfile = ProviderProfile {
    id: "alibaba",
    display_name: "Alibaba Cloud",
    env_var: "ALIBABA_API_KEY",
    default_model: "qwen-turbo",
    capabilities: &["chat"],
    wire: None,
    models: &[
        ModelInfo { id: "qwen-turbo", name: "Qwen Turbo", economical: true },
        ModelInfo { id: "qwen-max", name: "Qwen Max", economical: false },
    ],
};

static XAI: ProviderProfile = ProviderProfile {
    id: "xai",
    display_name: "xAI",
    env_var: "XAI_API_KEY",
    default_model: "grok-beta",
    capabilities: &["chat"],
    wire: None,
    models: &[ModelInfo { id: "grok-beta", name: "Grok Beta", economical: false }],
};

static DASHSCOPE: ProviderProfile = ProviderProfile {
    id: "dashscope",
    display_name: "DashScope",
    env_var: "DASHSCOPE_API_KEY",
    default_model: "qwen-plus",
    capabilities: &["chat"],
    wire: None,
    models: &[
        ModelInfo { id: "qwen-plus", name: "Qwen Plus", economical: true },
        ModelInfo { id: "qwen-long", name: "Qwen Long", economical: false },
    ],
};
