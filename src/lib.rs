//! Pktime - Pakistan Standard Time API
//!
//! This crate serves the current time in Pakistan Standard Time (PKT, UTC+5)
//! over a single HTTP endpoint, throttled per client address by a fixed-window
//! rate limiter. The limiter counts against a networked REST counter store
//! when credentials are configured, and falls back to an in-process map
//! otherwise.

pub mod http;
pub mod ratelimit;
pub mod config;
pub mod error;
pub mod ident;
pub mod timezone;
