//! Admin-role transfer guard.
//!
//! Changes to the group-admin flag are an explicit domain operation, not an
//! incidental field write: transferring the role touches two user records
//! (the outgoing and the incoming admin) as a single logical unit, and the
//! repository executes the resulting [`AdminChange`] inside one transaction.

use uuid::Uuid;

use crate::user_update::error::UpdateError;
use crate::user_update::membership::MemberProfile;

/// The planned change to the group-admin flag for a user update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminChange {
    /// The payload did not touch the admin flag.
    Unchanged,
    /// The caller sets the flag on their own record. The guard only lets
    /// `true` through here; unsetting yourself is rejected.
    SetSelf(bool),
    /// The caller sets the flag on another member's record and is demoted
    /// in the same transaction, preserving the single-admin invariant.
    Transfer {
        /// The caller, whose admin flag is cleared.
        demote: Uuid,
        /// The value assigned to the target's flag.
        value: bool,
    },
}

/// Validates a requested admin-flag change and plans its execution.
///
/// Rules:
/// - only a current group admin may change the flag at all, on anyone;
/// - an admin may not unset their own flag; they must promote somebody
///   else first (which demotes them implicitly).
///
/// The guard runs against the *resolved* boolean from the validated payload,
/// not the raw request, so `Some(false)` here really means "unset".
///
/// # Errors
///
/// Returns `UpdateError::AdminRequired` when the caller is not a group
/// admin, and `UpdateError::SelfAdminRemoval` for a self-unset.
pub fn plan_admin_change(
    caller: &MemberProfile,
    target_id: Uuid,
    requested: Option<bool>,
) -> Result<AdminChange, UpdateError> {
    let Some(value) = requested else {
        return Ok(AdminChange::Unchanged);
    };

    if !caller.is_admin() {
        return Err(UpdateError::AdminRequired {
            fields: vec!["is_group_admin".to_string()],
        });
    }

    if caller.id == target_id {
        if value {
            // Re-affirming your own admin status is a no-op worth allowing.
            return Ok(AdminChange::SetSelf(true));
        }
        return Err(UpdateError::SelfAdminRemoval);
    }

    Ok(AdminChange::Transfer {
        demote: caller.id,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(group: Uuid) -> MemberProfile {
        MemberProfile::new(Uuid::new_v4(), Some(group), true)
    }

    #[test]
    fn test_absent_flag_is_unchanged() {
        let caller = admin(Uuid::new_v4());
        let plan = plan_admin_change(&caller, Uuid::new_v4(), None).unwrap();
        assert_eq!(plan, AdminChange::Unchanged);
    }

    #[test]
    fn test_non_admin_may_not_touch_flag() {
        let caller = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);

        // Neither on themselves...
        let result = plan_admin_change(&caller, caller.id, Some(true));
        assert_eq!(
            result,
            Err(UpdateError::AdminRequired {
                fields: vec!["is_group_admin".to_string()]
            })
        );

        // ...nor on anyone else.
        let result = plan_admin_change(&caller, Uuid::new_v4(), Some(false));
        assert!(matches!(result, Err(UpdateError::AdminRequired { .. })));
    }

    #[test]
    fn test_admin_cannot_unset_self() {
        let caller = admin(Uuid::new_v4());
        let result = plan_admin_change(&caller, caller.id, Some(false));
        assert_eq!(result, Err(UpdateError::SelfAdminRemoval));
    }

    #[test]
    fn test_admin_may_reaffirm_self() {
        let caller = admin(Uuid::new_v4());
        let plan = plan_admin_change(&caller, caller.id, Some(true)).unwrap();
        assert_eq!(plan, AdminChange::SetSelf(true));
    }

    #[test]
    fn test_admin_promoting_other_demotes_caller() {
        let caller = admin(Uuid::new_v4());
        let target = Uuid::new_v4();
        let plan = plan_admin_change(&caller, target, Some(true)).unwrap();
        assert_eq!(
            plan,
            AdminChange::Transfer {
                demote: caller.id,
                value: true,
            }
        );
    }
}
