//! Domain Layer
//!
//! Core business entity definitions

pub mod chat_log;

pub use chat_log::*;
