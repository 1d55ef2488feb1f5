//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Model clients (Gemini over HTTP, scripted mock for offline use)
//! - Command-line API (container, router, controllers)

pub mod adapter;
pub mod api;

pub use adapter::*;
