//! Relay configuration.

use std::time::Duration;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 2000;

/// Default timeout for requests to Teams.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the relay.
///
/// The library never reads the environment itself; the binary fills this in
/// from its command line (see `TEAMS_INCOMING_WEBHOOK_URL`,
/// `MARKDOWN_ENABLED`, `PORT`, `REQUEST_TIMEOUT_SECS`).
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Teams incoming webhook URL cards are posted to.
    pub webhook_url: String,
    /// Whether card sections render Markdown.
    pub markdown_enabled: bool,
    /// HTTP server port.
    pub port: u16,
    /// Timeout applied to each outbound request.
    pub request_timeout_secs: u64,
}

impl RelayConfig {
    /// Configuration with default port and timeout.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            markdown_enabled: false,
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Set whether card sections render Markdown.
    #[must_use]
    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.markdown_enabled = enabled;
        self
    }

    /// Outbound request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Interpret a boolean-like toggle value.
///
/// `yes`, `true`, `1` and `on` (any case, surrounding whitespace ignored)
/// enable the toggle; everything else, including an empty value, disables it.
#[must_use]
pub fn parse_toggle(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "true" | "1" | "on"
    )
}
