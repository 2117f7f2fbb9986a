//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, policy rules, and validation live here.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `user_update` - Field access policy, admin-role transfer guard, and
//!   approver set reconciliation for the user-update workflow

pub mod auth;
pub mod user_update;
