//! # Domain Layer
//!
//! Core models, prompt construction and the error type.
//! This layer is independent of the remote model and of any front end.

pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
