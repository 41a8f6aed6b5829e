//! HTTP server module for the contact endpoint.

mod client_ip;
mod handlers;
mod server;

pub use server::{AppState, HttpServer};
