//! # Helper Token Agent
//!
//! Supplies short-lived bearer tokens minted by an external credential
//! helper (by default `gcloud config config-helper --format=json`),
//! caches them and refreshes them shortly before they expire.
//!
//! Modules:
//! - `helper` — launching the helper process and capturing its output
//! - `parser` — decoding helper output into a credential
//! - `cache` — token state and the single-flight refresh policy
//! - `provider` — the `Authorization` value entry point
//! - `executor` — background refresh loop
//! - `server` — token, health and metrics endpoints
//! - `config` — YAML configuration, defaults and validation

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod helper;
pub mod observability;
pub mod parser;
pub mod provider;
pub mod resilience;
pub mod server;
pub mod tests;
pub mod utils;

pub use crate::config::helper::HelperConfig;
pub use crate::error::{LaunchError, ParseError, ProviderError};
pub use crate::provider::TokenProvider;
