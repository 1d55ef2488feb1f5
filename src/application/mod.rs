//! # Application Layer
//!
//! Request dispatch, chat sessions, tool controllers and navigation,
//! coordinating the domain layer with a [`ModelClient`] implementation.

pub mod interfaces;
pub mod navigation;
pub mod tools;
pub mod use_cases;

pub use interfaces::*;
pub use navigation::*;
pub use tools::*;
pub use use_cases::*;
