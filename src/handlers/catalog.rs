use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::providers::{ModelInfo, ProviderId};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProviderSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub default: bool,
    pub implemented: bool,
    pub configured: bool,
    pub default_model: &'static str,
    pub capabilities: &'static [&'static str],
}

// GET /api/providers
pub async fn providers_handler(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderSummary>> {
    let credentials = state.router.credentials();
    let default = state.router.default_provider();

    let providers = ProviderId::ALL
        .into_iter()
        .map(|p| {
            let profile = p.profile();
            ProviderSummary {
                id: profile.id,
                name: profile.display_name,
                default: p == default,
                implemented: p.is_implemented(),
                configured: credentials.has(p),
                default_model: profile.default_model,
                capabilities: profile.capabilities,
            }
        })
        .collect();

    Json(providers)
}

#[derive(Deserialize)]
pub struct ModelsQuery {
    pub provider: Option<String>,
}

#[derive(Serialize)]
pub struct ModelSummary {
    #[serde(flatten)]
    pub model: ModelInfo,
    pub provider: &'static str,
    pub default: bool,
}

// GET /api/models?provider=groq
pub async fn models_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Vec<ModelSummary>>, (StatusCode, Json<serde_json::Value>)> {
    let provider = match query.provider {
        Some(id) => ProviderId::parse(&id).ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("Provider {} not found", id) })),
            )
        })?,
        None => state.router.default_provider(),
    };

    let profile = provider.profile();
    let models = profile
        .models
        .iter()
        .map(|m| ModelSummary {
            model: *m,
            provider: profile.id,
            default: m.id == profile.default_model,
        })
        .collect();

    Ok(Json(models))
}

#[derive(Serialize, Clone, Copy)]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub prompt: &'static str,
}

const PERSONAS: &[Persona] = &[
    Persona {
        id: "default",
        name: "Default Assistant",
        prompt: "You are a helpful, creative, and friendly AI assistant. Answer as concisely as possible.",
    },
    Persona {
        id: "developer",
        name: "Developer Assistant",
        prompt: "You are an expert software developer assistant. Provide detailed, accurate technical advice with code examples when appropriate.",
    },
    Persona {
        id: "writer",
        name: "Writing Assistant",
        prompt: "You are a writing assistant that helps improve text clarity, grammar, and style. Provide thoughtful suggestions to enhance writing quality.",
    },
    Persona {
        id: "researcher",
        name: "Research Assistant",
        prompt: "You are a research assistant who helps find, analyze, and summarize information. Provide well-cited, factual responses and highlight areas of consensus and controversy.",
    },
    Persona {
        id: "creative",
        name: "Creative Collaborator",
        prompt: "You are a creative collaborator who helps generate new ideas, stories, and content. Be imaginative, playful, and inspiring in your responses.",
    },
    Persona {
        id: "expert",
        name: "Expert Analyst",
        prompt: "You are an expert analyst who provides insightful, thorough analysis on complex topics. Your responses should be well-structured, comprehensive, and nuanced.",
    },
    Persona {
        id: "teacher",
        name: "Patient Teacher",
        prompt: "You are a patient teacher who explains complex concepts in simple terms. Adapt your explanations to different learning styles and provide examples to illustrate key points.",
    },
    Persona {
        id: "coach",
        name: "Supportive Coach",
        prompt: "You are a supportive coach who helps set and achieve goals. Provide encouragement, practical advice, and accountability in your responses.",
    },
    Persona {
        id: "critic",
        name: "Constructive Critic",
        prompt: "You are a constructive critic who provides honest, helpful feedback. Balance pointing out areas for improvement with recognizing strengths.",
    },
    Persona {
        id: "debater",
        name: "Balanced Debater",
        prompt: "You are a balanced debater who can present multiple perspectives on complex issues. Present the strongest versions of different viewpoints and identify common ground when possible.",
    },
    Persona {
        id: "data_analyst",
        name: "Data Analyst",
        prompt: "You are a data analyst who excels at interpreting numbers and trends. Help extract insights from data and explain your analysis in clear, accessible language.",
    },
    Persona {
        id: "strategist",
        name: "Business Strategist",
        prompt: "You are a business strategist who helps develop and refine strategic plans. Provide thoughtful analysis of opportunities, threats, and potential paths forward.",
    },
    Persona {
        id: "designer",
        name: "Design Thinker",
        prompt: "You are a design thinker who helps solve problems with creativity and user focus. Approach challenges with empathy, ideation, and a willingness to iterate.",
    },
    Persona {
        id: "interviewer",
        name: "Curious Interviewer",
        prompt: "You are a curious interviewer who asks insightful questions to draw out interesting information and perspectives. Help people explore and articulate their thoughts.",
    },
    Persona {
        id: "custom",
        name: "Custom Persona",
        prompt: "",
    },
];

// GET /api/personas
pub async fn personas_handler() -> Json<&'static [Persona]> {
    Json(PERSONAS)
}
