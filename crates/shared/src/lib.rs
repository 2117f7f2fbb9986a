//! Shared types, payloads, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - The `Sum` monetary value type with decimal precision
//! - JWT service and claims
//! - Request/response payload types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::Sum;
