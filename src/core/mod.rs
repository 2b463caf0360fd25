//! Core types shared across modpin.
//!
//! At the moment this is the error taxonomy and its user-facing rendering;
//! see [`error`] for details.

pub mod error;

pub use error::{ErrorContext, ModpinError, user_friendly_error};
