//! Common utilities shared by the service crates.
//!
//! This crate provides:
//! - Unified error handling with gRPC status conversion
//! - Configuration structures loaded from the environment

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
