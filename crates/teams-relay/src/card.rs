//! Microsoft Teams `MessageCard` construction.
//!
//! Card reference:
//! <https://learn.microsoft.com/en-us/outlook/actionable-messages/message-card-reference>

use serde::{Deserialize, Serialize};

use crate::alertmanager::{Alert, AlertBatch, BatchStatus};

/// `@type` of every card we send.
pub const MESSAGE_CARD_TYPE: &str = "MessageCard";

/// `@context` of every card we send.
pub const MESSAGE_CARD_CONTEXT: &str = "http://schema.org/extensions";

/// Theme colours keyed by batch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    /// Green
    Resolved,
    /// Dark red
    Firing,
    /// Grey
    Unknown,
}

impl ThemeColor {
    /// Hex colour as Teams expects it (no leading `#`).
    #[must_use]
    pub const fn as_hex(&self) -> &'static str {
        match self {
            Self::Resolved => "2DC72D",
            Self::Firing => "8C1A1A",
            Self::Unknown => "CCCCCC",
        }
    }
}

impl From<BatchStatus> for ThemeColor {
    fn from(status: BatchStatus) -> Self {
        match status {
            BatchStatus::Resolved => Self::Resolved,
            BatchStatus::Firing => Self::Firing,
            BatchStatus::Unknown => Self::Unknown,
        }
    }
}

// =============================================================================
// Teams API types
// =============================================================================

/// Outbound Teams card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub theme_color: String,
    pub summary: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    pub sections: Vec<Section>,
}

/// One section per alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub activity_title: String,
    pub facts: Vec<Fact>,
    pub markdown: bool,
}

/// Name/value pair rendered inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Build the Teams card for an alert batch.
///
/// Never fails: missing annotations or URLs render as empty strings.
/// Facts list every annotation of an alert followed by every label; the
/// order within each group follows map iteration and is not stable.
#[must_use]
pub fn build(batch: &AlertBatch, markdown_enabled: bool) -> MessageCard {
    let theme_color = ThemeColor::from(batch.status_kind());

    let sections = batch
        .alerts
        .iter()
        .map(|alert| build_section(alert, &batch.external_url, markdown_enabled))
        .collect();

    MessageCard {
        card_type: MESSAGE_CARD_TYPE.to_string(),
        context: MESSAGE_CARD_CONTEXT.to_string(),
        theme_color: theme_color.as_hex().to_string(),
        summary: batch.summary().unwrap_or_default().to_string(),
        title: format!("Prometheus Alert ({})", batch.status),
        text: String::new(),
        sections,
    }
}

fn build_section(alert: &Alert, external_url: &str, markdown: bool) -> Section {
    let description = alert
        .annotations
        .get("description")
        .map_or("", String::as_str);

    let facts = alert
        .annotations
        .iter()
        .chain(alert.labels.iter())
        .map(|(name, value)| Fact::new(name, value))
        .collect();

    Section {
        activity_title: format!("[{description}]({external_url})"),
        facts,
        markdown,
    }
}
