use std::collections::HashMap;

use super::ProviderId;

// values people leave in .env files before they have a real key
const PLACEHOLDERS: &[&str] = &[
    "your_api_key_here",
    "your-api-key",
    "your_api_key",
    "changeme",
    "sk-...",
];

fn is_placeholder(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v.is_empty() || v.starts_with("demo_key") || PLACEHOLDERS.contains(&v.as_str())
}

// API keys per provider. Only usable keys are kept.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderId, String>,
}

impl Credentials {
    // Read `<PROVIDER>_API_KEY` for every known provider.
    pub fn from_env() -> Self {
        Self::from_pairs(ProviderId::ALL.into_iter().filter_map(|p| {
            std::env::var(p.profile().env_var).ok().map(|v| (p, v))
        }))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ProviderId, S)>,
        S: Into<String>,
    {
        let keys = pairs
            .into_iter()
            .map(|(p, v)| {
                let v: String = v.into();
                (p, v.trim().to_string())
            })
            .filter(|(_, v)| !is_placeholder(v))
            .collect();
        Self { keys }
    }

    pub fn get(&self, provider: ProviderId) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }

    pub fn has(&self, provider: ProviderId) -> bool {
        self.keys.contains_key(&provider)
    }

    // false => the router runs in simulation mode
    pub fn any_configured(&self) -> bool {
        !self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_dropped() {
        let creds = Credentials::from_pairs([
            (ProviderId::Groq, "demo_key_groq"),
            (ProviderId::OpenAi, "  "),
            (ProviderId::Anthropic, "your_api_key_here"),
            (ProviderId::Cohere, "CHANGEME"),
        ]);
        assert!(!creds.any_configured());
        assert_eq!(creds.get(ProviderId::Groq), None);
    }

    #[test]
    fn test_real_key_is_kept_trimmed() {
        let creds = Credentials::from_pairs([
            (ProviderId::Groq, " gsk_live_123 "),
            (ProviderId::OpenAi, ""),
        ]);
        assert!(creds.any_configured());
        assert!(creds.has(ProviderId::Groq));
        assert!(!creds.has(ProviderId::OpenAi));
        assert_eq!(creds.get(ProviderId::Groq), Some("gsk_live_123"));
    }
}
