//! Delivery of cards to a Teams incoming webhook.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::card::MessageCard;
use crate::error::DispatchError;

/// Number of cards Teams accepted since startup.
///
/// Cheap to clone; clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct SendCounter(Arc<AtomicU64>);

impl SendCounter {
    /// Counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delivered card and return the new total.
    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Cards delivered so far.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Posts cards to a Teams webhook. One attempt per card, no retries.
#[derive(Debug, Clone)]
pub struct CardDispatcher {
    client: reqwest::Client,
    counter: SendCounter,
}

impl CardDispatcher {
    /// Create a dispatcher whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns [`DispatchError::Client`] if the HTTP client cannot be built
    /// (TLS backend initialisation).
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DispatchError::Client)?;
        Ok(Self::with_client(client, SendCounter::new()))
    }

    /// Create a dispatcher around an existing client and counter.
    #[must_use]
    pub fn with_client(client: reqwest::Client, counter: SendCounter) -> Self {
        Self { client, counter }
    }

    /// Handle to the delivered-card counter.
    #[must_use]
    pub fn counter(&self) -> &SendCounter {
        &self.counter
    }

    /// POST `card` as JSON to `endpoint`.
    ///
    /// Only `200 OK` counts as delivered; anything else is a
    /// [`DispatchError::Delivery`] carrying the status line.
    ///
    /// # Errors
    /// Returns [`DispatchError::Transport`] if the request could not be sent
    /// and [`DispatchError::Delivery`] if Teams rejected it.
    pub async fn dispatch(&self, card: &MessageCard, endpoint: &str) -> Result<(), DispatchError> {
        let body = serde_json::to_vec(card)?;

        debug!(
            sections = card.sections.len(),
            bytes = body.len(),
            "Sending card to Teams"
        );

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();

            warn!(status = %status, body = %body, "Teams webhook request failed");

            return Err(DispatchError::Delivery {
                status: status.to_string(),
                body,
            });
        }

        let total = self.counter.increment();
        info!(total_sent = total, "Card delivered to Teams");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_zero() {
        let counter = SendCounter::new();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_counter_clones_share_state() {
        let counter = SendCounter::new();
        let clone = counter.clone();

        assert_eq!(counter.increment(), 1);
        assert_eq!(clone.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_counter_concurrent_increments() {
        let counter = SendCounter::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 8000);
    }

    #[test]
    fn test_new_dispatcher_starts_with_empty_counter() {
        let dispatcher = CardDispatcher::new(Duration::from_secs(5)).unwrap();
        assert_eq!(dispatcher.counter().get(), 0);
    }

    #[test]
    fn test_dispatcher_shares_counter() {
        let counter = SendCounter::new();
        let dispatcher = CardDispatcher::with_client(reqwest::Client::new(), counter.clone());

        counter.increment();
        assert_eq!(dispatcher.counter().get(), 1);
    }
}
