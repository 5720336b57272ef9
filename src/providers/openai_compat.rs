// OpenAI chat completions. Groq, Mistral and DeepSeek speak the same dialect.

use serde_json::{Value, json};

use super::ProviderCall;
use crate::error::{ProviderError, ProviderResult};

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

pub(super) fn request(
    client: &reqwest::Client,
    base_url: &str,
    call: &ProviderCall,
) -> reqwest::RequestBuilder {
    client
        .post(format!("{}/chat/completions", base_url))
        .bearer_auth(&call.api_key)
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

    json["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| Ok(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Role};
    use crate::providers::ProviderId;

    fn call() -> ProviderCall {
        ProviderCall {
            provider: ProviderId::Groq,
            model: "llama-3.1-8b-instant".into(),
            api_key: "gsk".into(),
            system_prompt: "be brief".into(),
            messages: vec![Message::user("hi"), Message::new(Role::Assistant, "hello")],
            temperature: 0.5,
            max_tokens: 64,
        }
    }

    #[test]
    fn test_payload_prepends_system_prompt() {
        let body = payload(&call());
        assert_eq!(body["stream"], true);
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][2]["role"], "assistant");
    }

    #[test]
    fn test_parse_delta() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_event("Groq", data).unwrap().unwrap(), "Hel");

        let role_only = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(parse_event("Groq", role_only).is_none());
    }

    #[test]
    fn test_parse_error_event() {
        let data = r#"{"error":{"message":"model overloaded"}}"#;
        let err = parse_event("Groq", data).unwrap().unwrap_err();
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_event("Groq", "not json").unwrap().is_err());
    }
}
