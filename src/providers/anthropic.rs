use serde_json::{Value, json};

use super::ProviderCall;
use crate::error::{ProviderError, ProviderResult};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub(super) fn payload(call: &ProviderCall) -> Value {
    let messages: Vec<Value> = call
        .messages
        .iter()
        .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
        .collect();

    json!({
        "model": call.model,
        "system": call.system_prompt,
        "messages": messages,
        "max_tokens": call.max_tokens,
        "temperature": call.temperature,
        "stream": true
    })
}

pub(super) fn request(client: &reqwest::Client, call: &ProviderCall) -> reqwest::RequestBuilder {
    client
        .post(MESSAGES_URL)
        .header("x-api-key", &call.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&payload(call))
}

pub(super) fn parse_event(provider: &'static str, data: &str) -> Option<ProviderResult<String>> {
    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(ProviderError::invalid_response(provider, e.to_string()))),
    };

    match json["type"].as_str().unwrap_or("") {
        "content_block_delta" => json["delta"]["text"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| Ok(s.to_string())),
        "error" => {
            let message = json["error"]["message"].as_str().unwrap_or("unknown error");
            Some(Err(ProviderError::stream(provider, message)))
        }
        // message_start, ping, content_block_start/stop, message_delta, message_stop
        _ => None,
    }
}
