use futures::StreamExt;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::models::{ChatRequest, Message, Role};
use crate::prompts;
use crate::providers::{ChatBackend, Credentials, ProviderCall, ProviderId};

// What to do with a provider that has no adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnsupportedProviderPolicy {
    // Serve it from the default provider, role-playing as the requested one.
    #[default]
    Fallback,
    // Refuse the request.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub text: String,
    pub requested: ProviderId,
    // provider that actually answered (same as requested unless we fell back)
    pub provider: ProviderId,
    pub model: String,
    pub simulated: bool,
    pub error: bool,
}

// provider + model the request ends up on
struct Target {
    provider: ProviderId,
    model: String,
}

pub struct ProviderRouter {
    credentials: Credentials,
    backend: Arc<dyn ChatBackend>,
    default_provider: ProviderId,
    policy: UnsupportedProviderPolicy,
}

impl ProviderRouter {
    pub fn new(
        credentials: Credentials,
        backend: Arc<dyn ChatBackend>,
        default_provider: ProviderId,
        policy: UnsupportedProviderPolicy,
    ) -> Self {
        Self {
            credentials,
            backend,
            default_provider,
            policy,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn default_provider(&self) -> ProviderId {
        self.default_provider
    }

    pub fn is_simulating(&self) -> bool {
        !self.credentials.any_configured()
    }

    // Whether requests naming `provider` are served at all.
    pub fn accepts(&self, provider: ProviderId) -> bool {
        provider.is_implemented() || self.policy == UnsupportedProviderPolicy::Fallback
    }

    // Provider and model a request would be served by, without calling
    // anything. Cache hits report these.
    pub fn plan(&self, request: &ChatRequest) -> (ProviderId, String) {
        let target = if self.is_simulating() {
            Target {
                provider: request.provider,
                model: request
                    .model
                    .clone()
                    .unwrap_or_else(|| request.provider.profile().default_model.to_string()),
            }
        } else {
            self.resolve(request)
        };
        (target.provider, target.model)
    }

    pub async fn route(&self, request: &ChatRequest) -> RouteOutcome {
        if self.is_simulating() {
            tracing::info!(provider = %request.provider, mode = request.mode.as_str(), "no credentials configured, simulating");
            let (provider, model) = self.plan(request);
            return RouteOutcome {
                text: prompts::simulation_text(request),
                requested: request.provider,
                provider,
                model,
                simulated: true,
                error: false,
            };
        }

        let target = self.resolve(request);
        if target.provider != request.provider {
            tracing::warn!(
                requested = %request.provider,
                serving = %target.provider,
                "provider has no adapter, falling back"
            );
        }

        let result = self.call(request, &target).await;
        let (text, error) = match result {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::error!(provider = %target.provider, error = %e, "provider call failed");
                (
                    format!("Error from {} API: {}", target.provider.profile().display_name, e),
                    true,
                )
            }
        };

        RouteOutcome {
            text,
            requested: request.provider,
            provider: target.provider,
            model: target.model,
            simulated: false,
            error,
        }
    }

    fn resolve(&self, request: &ChatRequest) -> Target {
        if request.provider.is_implemented() {
            let model = request
                .model
                .clone()
                .unwrap_or_else(|| request.provider.profile().default_model.to_string());
            return Target {
                provider: request.provider,
                model,
            };
        }

        // the requested model belongs to another vendor, so use the default's
        Target {
            provider: self.default_provider,
            model: self.default_provider.profile().default_model.to_string(),
        }
    }

    async fn call(&self, request: &ChatRequest, target: &Target) -> Result<String, ProviderError> {
        let profile = target.provider.profile();
        let api_key = self
            .credentials
            .get(target.provider)
            .ok_or(ProviderError::MissingApiKey {
                provider: profile.display_name.to_string(),
                env_var: profile.env_var,
            })?;

        let call = build_call(request, target, api_key);
        let mut stream = self.backend.stream_chat(&call).await?;

        // drain fully; a mid-stream error discards what came before
        let mut text = String::new();
        while let Some(fragment) = stream.next().await {
            text.push_str(&fragment?);
        }

        tracing::debug!(provider = %target.provider, chars = text.len(), "provider stream complete");
        Ok(text)
    }
}

fn build_call(request: &ChatRequest, target: &Target, api_key: &str) -> ProviderCall {
    // prompt always names the provider the user picked
    let mut system_prompt = prompts::system_prompt(request.mode, request.provider);
    for m in request.messages.iter().filter(|m| m.role == Role::System) {
        system_prompt.push_str("\n\n");
        system_prompt.push_str(&m.content);
    }

    let mut messages: Vec<Message> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .cloned()
        .collect();
    if !request.has_user_message() {
        messages.push(Message::user(crate::models::FALLBACK_USER_PROMPT));
    }

    ProviderCall {
        provider: target.provider,
        model: target.model.clone(),
        api_key: api_key.to_string(),
        system_prompt,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    use crate::error::{ProviderError, ProviderResult};
    use crate::providers::{ChatBackend, ProviderCall, TextStream};

    pub(crate) enum Script {
        Chunks(Vec<&'static str>),
        FailAfter(Vec<&'static str>, &'static str),
        Refuse(&'static str),
    }

    // Backend that records every call and replays a script.
    pub(crate) struct RecordingBackend {
        pub calls: Mutex<Vec<ProviderCall>>,
        script: Script,
    }

    impl RecordingBackend {
        pub fn new(script: Script) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                script,
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn last_call(&self) -> ProviderCall {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ChatBackend for RecordingBackend {
        async fn stream_chat(&self, call: &ProviderCall) -> ProviderResult<TextStream> {
            self.calls.lock().unwrap().push(call.clone());
            let name = call.provider.profile().display_name;
            let items: Vec<ProviderResult<String>> = match &self.script {
                Script::Chunks(chunks) => chunks.iter().map(|c| Ok(c.to_string())).collect(),
                Script::FailAfter(chunks, message) => chunks
                    .iter()
                    .map(|c| Ok(c.to_string()))
                    .chain(std::iter::once(Err(ProviderError::stream(name, *message))))
                    .collect(),
                Script::Refuse(message) => {
                    return Err(ProviderError::Api {
                        provider: name.to_string(),
                        status: 401,
                        message: message.to_string(),
                    });
                }
            };
            Ok(Box::pin(stream::iter(items)))
        }
    }
}
