//! Alertmanager webhook payload types.
//!
//! Mirrors the body Alertmanager posts to a generic `webhook_config`
//! receiver. Decoding is permissive: every field is optional, `null` is
//! treated like a missing value and unknown fields are ignored so newer
//! Alertmanager releases keep working.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::io::Read;

use crate::error::DecodeError;

/// Batch-level status values sent by Alertmanager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// At least one alert in the group is firing
    Firing,
    /// Every alert in the group has resolved
    Resolved,
    /// Anything else, including an empty status
    Unknown,
}

impl BatchStatus {
    /// Classify a raw status string. Matching is exact.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "firing" => Self::Firing,
            "resolved" => Self::Resolved,
            _ => Self::Unknown,
        }
    }
}

/// One notification cycle from Alertmanager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub receiver: String,
    #[serde(default, deserialize_with = "nullable_string_map")]
    pub group_labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable_string_map")]
    pub common_labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable_string_map")]
    pub common_annotations: HashMap<String, String>,
    /// Link back to the Alertmanager UI
    #[serde(
        rename = "externalURL",
        default,
        deserialize_with = "null_as_default"
    )]
    pub external_url: String,
    /// Alerts in the order Alertmanager sent them
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
}

/// A single alert inside a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "nullable_string_map")]
    pub labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "nullable_string_map")]
    pub annotations: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starts_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ends_at: String,
    #[serde(
        rename = "generatorURL",
        default,
        deserialize_with = "null_as_default"
    )]
    pub generator_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fingerprint: String,
}

impl AlertBatch {
    /// Decode a batch from a raw request body.
    ///
    /// Only the first JSON value is read; anything after it is ignored.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the body is not valid JSON or a field has
    /// the wrong type.
    pub fn from_slice(body: &[u8]) -> Result<Self, DecodeError> {
        first_value(serde_json::Deserializer::from_slice(body))
    }

    /// Decode a batch from a byte stream.
    ///
    /// # Errors
    /// Returns [`DecodeError`] if the stream is not valid JSON or a field has
    /// the wrong type.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DecodeError> {
        first_value(serde_json::Deserializer::from_reader(reader))
    }

    /// Classified batch status.
    #[must_use]
    pub fn status_kind(&self) -> BatchStatus {
        BatchStatus::parse(&self.status)
    }

    /// `commonAnnotations.summary`, if present.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.common_annotations.get("summary").map(String::as_str)
    }
}

/// Decode the first JSON value of a stream, ignoring whatever follows it.
fn first_value<'de, R>(deserializer: serde_json::Deserializer<R>) -> Result<AlertBatch, DecodeError>
where
    R: serde_json::de::Read<'de>,
{
    match deserializer.into_iter::<AlertBatch>().next() {
        Some(batch) => Ok(batch?),
        None => Err(DecodeError::from(<serde_json::Error as de::Error>::custom(
            "EOF while parsing a value",
        ))),
    }
}

/// String map whose values may be `null`; `null` values become `""`.
fn nullable_string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
