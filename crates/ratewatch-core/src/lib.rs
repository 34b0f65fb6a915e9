//! # Ratewatch Core
//!
//! The domain layer of ratewatch.
//! This crate holds the rate limiting vocabulary and the ports that
//! infrastructure implements; it has no I/O of its own.

pub mod domain;
pub mod ports;

pub use domain::{ClientWindow, RateLimitDecision, RequestMeta};
