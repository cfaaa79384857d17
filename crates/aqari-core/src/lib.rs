//! # aqari-core
//!
//! Core types, configuration, text normalization, and error handling for
//! the Aqari property concierge.

pub mod config;
pub mod error;
pub mod message;
pub mod text;
