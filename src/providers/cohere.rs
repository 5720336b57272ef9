use serde_json::{Value, json};

use super::ProviderCall;
use crate::error::{ProviderError, ProviderResult};

const CHAT_URL: &str = "https://api.cohere.com/v2/chat";

pub(super) fn payload(call: &ProviderCall) -> Value {
    let mut messages = vec![json!({"role": "system", "content": call.system_prompt})];
    messages.extend(
        call.messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content})),
    );

    json!({
        "model": call.model,
        "messages": messages,
        "temperature": call.temperature,
        "max_tokens": call.max_tokens,
        "stream": true
    })
}

pub(super) fn request(client: &reqwest::Client, call: &ProviderCall) -> reqwest::RequestBuilder {
    client
        .post(CHAT_URL)
        .bearer_auth(&call.api_key)
        .json(&payload(call))
}

pub(super) fn parse_event(provider: &'static str, data: &str) -> Option<ProviderResult<String>> {
    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return Some(Err(ProviderError::invalid_response(provider, e.to_string()))),
    };

    match json["type"].as_str().unwrap_or("") {
        "content-delta" => json["delta"]["message"]["content"]["text"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| Ok(s.to_string())),
        "message-end" => {
            // finish_reason ERROR means the generation broke off
            let reason = json["delta"]["finish_reason"].as_str().unwrap_or("");
            if reason == "ERROR" {
                Some(Err(ProviderError::stream(provider, "generation ended with an error")))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_delta() {
        let data = r#"{"type":"content-delta","index":0,"delta":{"message":{"content":{"text":"Bonjour"}}}}"#;
        assert_eq!(parse_event("Cohere", data).unwrap().unwrap(), "Bonjour");
    }

    #[test]
    fn test_message_end() {
        let ok = r#"{"type":"message-end","delta":{"finish_reason":"COMPLETE"}}"#;
        assert!(parse_event("Cohere", ok).is_none());

        let failed = r#"{"type":"message-end","delta":{"finish_reason":"ERROR"}}"#;
        assert!(parse_event("Cohere", failed).unwrap().is_err());
    }
}
