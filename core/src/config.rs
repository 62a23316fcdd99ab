use std::time::Duration;

use url::Url;

/// Default per-request timeout for the KSM exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/**
    Process-wide configuration for the key security module endpoint.

    All fields are static for the lifetime of the process; nothing here is
    per-request.
*/
#[derive(Debug, Clone)]
pub struct KsmConfig {
    /// KSM endpoint the key request is POSTed to.
    pub url: Url,
    /// Bearer token sent in the `Authorization` header.
    pub auth_token: String,
    /// Timeout applied to each KSM round trip.
    pub request_timeout: Duration,
}

impl KsmConfig {
    pub fn new(url: Url, auth_token: impl Into<String>) -> Self {
        Self {
            url,
            auth_token: auth_token.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/**
    Capabilities of the hosting platform.

    Governs the single branch point where a key request may be converted
    into a persistable-key request instead of going straight online.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformCapabilities {
    /// Whether the platform supports persistable (offline) content keys.
    pub persistable_keys: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_and_overrides() {
        let url = Url::parse("https://ksm.example.com/fps/").unwrap();
        let config = KsmConfig::new(url.clone(), "token");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);

        let config = KsmConfig::new(url, "token").with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
