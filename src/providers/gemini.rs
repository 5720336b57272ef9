use serde_json::{Value, json};

use super::ProviderCall;
use crate::error::{ProviderError, ProviderResult};
use crate::models::Role;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub(super) fn payload(call: &ProviderCall) -> Value {
    // gemini calls the assistant "model"
    let contents: Vec<Value> = call
        .messages
        .iter()
        .map(|m| {
            let role = if m.role == Role::Assistant { "model" } else { "user" };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    json!({
        "systemInstruction": {"parts": [{"text": call.system_prompt}]},
        "contents": contents,
        "generationConfig": {
            "temperature": call.temperature,
            "maxOutputTokens": call.max_tokens
        }
    })
}

pub(super) fn request(client: &reqwest::Client, call: &ProviderCall) -> reqwest::RequestBuilder {
    client
        .post(format!("{}/{}:streamGenerateContent?alt=sse", API_BASE, call.model))
        .header("x-goog-api-key", &call.api_key)
        .json(&payload(call))
}

pub(super) fn parse_event(provider: &'static str, data: &str) -> Option<ProviderResult<String>> {
    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(ProviderError::invalid_response(provider, e.to_string()))),
    };

    if let Some(error) = json.get("error") {
        let message = error["message"].as_str().unwrap_or("unknown error");
        return Some(Err(ProviderError::stream(provider, message)));
    }

    let text: String = json["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    if text.is_empty() { None } else { Some(Ok(text)) }
}
