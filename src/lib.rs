//! Mailgate - Rate-Limited Contact Form Relay
//!
//! This crate implements a small backend service that accepts contact-form
//! submissions over HTTP, applies a per-client sliding-window rate limit,
//! and relays each admitted submission as an email over SMTP.

pub mod config;
pub mod error;
pub mod http;
pub mod mail;
pub mod ratelimit;
