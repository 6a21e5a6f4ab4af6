//! emoscope — a terminal dashboard client for an emotion-classification
//! service.
//!
//! The crate is organized around three small cores plus command plumbing:
//!
//! - [`api`] — typed HTTP client for the classification service
//! - [`ranking`] — pure label→score ranking/normalization for display
//! - [`history`] — durable, size-bounded local store of past predictions
//! - [`config`] — layered TOML + environment configuration
//! - [`cli`] — subcommand handlers and terminal rendering

pub mod api;
pub mod cli;
pub mod config;
pub mod history;
pub mod ranking;
