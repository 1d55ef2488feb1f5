//! Domain services: prompt construction and the shared error type.

mod error;
pub mod prompt_builder;

pub use error::*;
