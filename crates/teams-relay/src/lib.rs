//! Relay Prometheus Alertmanager notifications to Microsoft Teams.
//!
//! Alertmanager posts a batch of alerts to a generic webhook receiver; this
//! crate turns each batch into a Teams `MessageCard` and posts it to a
//! Teams incoming webhook.
//!
//! # Pipeline
//!
//! - [`AlertBatch`] decodes the inbound webhook body
//! - [`card::build`] turns a batch into a [`MessageCard`], one section per alert
//! - [`CardDispatcher`] posts the card and counts successful deliveries
//!
//! [`server::build_router`] wires the three behind an axum router.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use teams_relay::{card, AlertBatch, CardDispatcher};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let body = br#"{"status":"firing","externalURL":"http://alertmanager:9093","alerts":[]}"#;
//! let batch = AlertBatch::from_slice(body)?;
//! let card = card::build(&batch, true);
//!
//! let dispatcher = CardDispatcher::new(Duration::from_secs(30))?;
//! dispatcher
//!     .dispatch(&card, "https://example.webhook.office.com/webhookb2/...")
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alertmanager;
pub mod card;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;

pub use alertmanager::{Alert, AlertBatch, BatchStatus};
pub use card::{Fact, MessageCard, Section, ThemeColor};
pub use config::RelayConfig;
pub use dispatch::{CardDispatcher, SendCounter};
pub use error::{DecodeError, DispatchError};
