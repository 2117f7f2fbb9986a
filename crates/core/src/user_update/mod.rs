//! User-update policy engine.
//!
//! This module implements the authorization and field-mutation policy for
//! the user-update workflow:
//!
//! - `membership` - Group membership oracle (is in group / is group admin)
//! - `fields` - Field access classification and the allow-list check
//! - `admin_transfer` - Guard for changes to the group-admin flag
//! - `approvers` - Approver set reconciliation (full-rebuild semantics)
//! - `error` - Policy error types
//!
//! Everything here is pure: the caller supplies snapshots of persisted
//! state, the policy returns decisions. Persistence and transactions are
//! the repository layer's concern.

pub mod admin_transfer;
pub mod approvers;
pub mod error;
pub mod fields;
pub mod membership;

#[cfg(test)]
mod policy_props;

pub use admin_transfer::{AdminChange, plan_admin_change};
pub use approvers::ApproverRebuild;
pub use error::UpdateError;
pub use fields::{FieldAccess, UserField, check_field_access};
pub use membership::MemberProfile;
