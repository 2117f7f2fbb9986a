//! User-update policy error types.

use thiserror::Error;

/// Errors raised by the user-update policy engine.
///
/// The first two variants are permission failures (an unauthorized actor);
/// `SelfAdminRemoval` is a validation failure (a structurally invalid state
/// transition by an authorized actor). The distinction matters for HTTP
/// status mapping.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// The caller tried to modify fields only the user themselves may touch.
    #[error("Only the user may modify these fields: {}", .fields.join(", "))]
    NotEditableByOthers {
        /// The offending field names.
        fields: Vec<String>,
    },

    /// The caller tried to modify fields that require group-admin status.
    #[error("Only a group admin may modify these fields: {}", .fields.join(", "))]
    AdminRequired {
        /// The offending field names.
        fields: Vec<String>,
    },

    /// A group admin tried to unset their own admin flag.
    #[error(
        "You cannot unset yourself as admin. Instead, make somebody else in your group admin"
    )]
    SelfAdminRemoval,
}

impl UpdateError {
    /// Returns true for permission failures (unauthorized actor).
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::NotEditableByOthers { .. } | Self::AdminRequired { .. }
        )
    }

    /// The field this error is scoped to, for field-scoped validation errors.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::SelfAdminRemoval => Some("is_group_admin"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_errors_enumerate_fields() {
        let err = UpdateError::NotEditableByOthers {
            fields: vec!["email".to_string(), "password".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Only the user may modify these fields: email, password"
        );

        let err = UpdateError::AdminRequired {
            fields: vec!["balance_amount".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Only a group admin may modify these fields: balance_amount"
        );
    }

    #[test]
    fn test_classification() {
        assert!(
            UpdateError::NotEditableByOthers { fields: vec![] }.is_permission_denied()
        );
        assert!(UpdateError::AdminRequired { fields: vec![] }.is_permission_denied());
        assert!(!UpdateError::SelfAdminRemoval.is_permission_denied());
    }

    #[test]
    fn test_self_admin_removal_is_field_scoped() {
        assert_eq!(
            UpdateError::SelfAdminRemoval.field(),
            Some("is_group_admin")
        );
        assert_eq!(
            UpdateError::AdminRequired { fields: vec![] }.field(),
            None
        );
    }
}
