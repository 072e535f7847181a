//! Birdhouse - OAuth 1.0a authorization and signed calls for a timeline API
//!
//! Birdhouse signs requests with HMAC-SHA1, runs the three-legged
//! request-token / consent / access-token handshake, persists the resulting
//! access token, and exposes timeline and status operations on top.
//!
//! # Architecture
//!
//! - [`oauth`] - Percent-encoding, signature base strings, signed requests
//! - [`transport`] - HTTP capability (reqwest in production, mock in tests)
//! - [`secrets`] - Secret storage abstraction
//! - [`auth`] - Authorization state machine, consent, credential record
//! - [`api`] - The [`api::BirdHouse`] facade: `authorize`, `call`, `get_timeline`, `post_status`
//! - [`config`] - TOML configuration with environment overrides
//! - [`cli`] - Command-line interface layer
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! 1. Access tokens are persisted before the session reports `Authorized`
//! 2. Any failed handshake leaves the session `Unauthorized` with nothing persisted
//! 3. Token and secret values never appear in `Debug`/`Display` output or logs
//! 4. Each public operation produces exactly one result

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod oauth;
pub mod secrets;
pub mod transport;
pub mod ui;
