//! Infrastructure layer for cross-cutting concerns.
//!
//! - Configuration management and validation
//! - Error handling and result types

pub mod config;
pub mod error;
