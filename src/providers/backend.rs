use async_trait::async_trait;
use futures::{Stream, StreamExt, stream};
use std::pin::Pin;

use super::sse::{DONE, SseDecoder};
use super::{ProviderId, Wire, anthropic, cohere, gemini, openai_compat};
use crate::error::{ProviderError, ProviderResult};
use crate::models::Message;

// Text fragments from a provider, ending either with completion or an error.
pub type TextStream = Pin<Box<dyn Stream<Item = ProviderResult<String>> + Send>>;

// One outbound call to one provider, already resolved by the router
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub provider: ProviderId,
    pub model: String,
    pub api_key: String,
    pub system_prompt: String,
    // never contains system messages; those are folded into system_prompt
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    // Start a streaming completion.
    async fn stream_chat(&self, call: &ProviderCall) -> ProviderResult<TextStream>;
}

// parses one SSE payload; None means "nothing to emit for this event"
type EventParser = fn(&'static str, &str) -> Option<ProviderResult<String>>;

// Talks to the real provider APIs over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn stream_chat(&self, call: &ProviderCall) -> ProviderResult<TextStream> {
        let profile = call.provider.profile();
        let name = profile.display_name;
        let wire = profile
            .wire
            .ok_or_else(|| ProviderError::invalid_response(name, "no adapter for this provider"))?;

        let (request, parse) = match wire {
            Wire::OpenAiCompatible { base_url } => (
                openai_compat::request(&self.client, base_url, call),
                openai_compat::parse_event as EventParser,
            ),
            Wire::Anthropic => (
                anthropic::request(&self.client, call),
                anthropic::parse_event as EventParser,
            ),
            Wire::Cohere => (
                cohere::request(&self.client, call),
                cohere::parse_event as EventParser,
            ),
            Wire::Gemini => (
                gemini::request(&self.client, call),
                gemini::parse_event as EventParser,
            ),
        };

        tracing::debug!(provider = %call.provider, model = %call.model, "sending streaming request");
        let response = request.send().await?;
        let response = check_status(name, response).await?;

        Ok(sse_text_stream(name, response, parse))
    }
}

async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(provider, status = status.as_u16(), error = %e, "could not read error body");
            String::new()
        }
    };
    if status.as_u16() == 429 {
        return Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            message: body,
        });
    }

    Err(ProviderError::Api {
        provider: provider.to_string(),
        status: status.as_u16(),
        message: body,
    })
}

// Turns an SSE response body into text fragments. Everything after `[DONE]`
// is dropped. A body that ends without a single event is an error.
fn sse_text_stream(
    provider: &'static str,
    response: reqwest::Response,
    parse: EventParser,
) -> TextStream {
    let body = response
        .bytes_stream()
        .map(Some)
        .chain(stream::once(async { None }));

    let mut decoder = SseDecoder::new();
    let mut done = false;
    let mut events = 0usize;
    let mut failed = false;

    let fragments = body.flat_map(move |item| {
        let finished = item.is_none();
        let payloads: Vec<ProviderResult<String>> = match item {
            Some(Ok(bytes)) => decoder.push(&bytes).into_iter().map(Ok).collect(),
            Some(Err(e)) => vec![Err(ProviderError::from(e))],
            None => decoder.finish().into_iter().map(Ok).collect(),
        };

        let mut out = Vec::new();
        for payload in payloads {
            if done {
                break;
            }
            match payload {
                Ok(data) if data.trim() == DONE => done = true,
                Ok(data) => {
                    events += 1;
                    if let Some(fragment) = parse(provider, &data) {
                        out.push(fragment);
                    }
                }
                Err(e) => {
                    failed = true;
                    out.push(Err(e));
                }
            }
        }

        // plain JSON or an empty body: nothing was ever streamed
        if finished && !done && !failed && events == 0 {
            out.push(Err(ProviderError::invalid_response(
                provider,
                "empty or non-SSE response body",
            )));
        }
        stream::iter(out)
    });

    Box::pin(fragments)
}
