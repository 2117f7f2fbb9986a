//! Property-based tests for the field access policy and approver
//! reconciliation.

use std::collections::BTreeSet;

use proptest::prelude::*;
use uuid::Uuid;

use crate::user_update::approvers::ApproverRebuild;
use crate::user_update::error::UpdateError;
use crate::user_update::fields::{FieldAccess, UserField, check_field_access};
use crate::user_update::membership::MemberProfile;

/// Strategy for generating an arbitrary subset of payload fields.
fn arb_fields() -> impl Strategy<Value = Vec<UserField>> {
    proptest::sample::subsequence(UserField::ALL.to_vec(), 0..=UserField::ALL.len())
}

/// Strategy for generating small approver id sets.
fn arb_approver_ids() -> impl Strategy<Value = Vec<Uuid>> {
    prop::collection::vec(0u8..8, 0..8)
        .prop_map(|ns| ns.into_iter().map(|n| Uuid::from_u128(u128::from(n))).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A non-admin can never edit another user's record, whatever the payload.
    #[test]
    fn non_admin_rejected_on_any_foreign_edit(fields in arb_fields()) {
        prop_assume!(!fields.is_empty());
        let caller = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);
        let target = Uuid::new_v4();

        let err = check_field_access(&caller, target, &fields).unwrap_err();
        prop_assert!(err.is_permission_denied());
    }

    /// For an admin editing somebody else, the check fails exactly when the
    /// payload touches a self-only field, and the error names exactly those.
    #[test]
    fn admin_foreign_edit_blocked_only_by_self_only_fields(fields in arb_fields()) {
        let caller = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), true);
        let target = Uuid::new_v4();

        let expected: Vec<String> = fields
            .iter()
            .filter(|f| f.access() == FieldAccess::SelfOnly)
            .map(|f| f.as_str().to_string())
            .collect();

        let result = check_field_access(&caller, target, &fields);
        if expected.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result,
                Err(UpdateError::NotEditableByOthers { fields: expected })
            );
        }
    }

    /// A non-admin editing themselves is blocked exactly by admin-only
    /// fields, and the error names exactly those.
    #[test]
    fn non_admin_self_edit_blocked_only_by_admin_only_fields(fields in arb_fields()) {
        let caller = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);

        let expected: Vec<String> = fields
            .iter()
            .filter(|f| f.access() == FieldAccess::AdminOnly)
            .map(|f| f.as_str().to_string())
            .collect();

        let result = check_field_access(&caller, caller.id, &fields);
        if expected.is_empty() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result,
                Err(UpdateError::AdminRequired { fields: expected })
            );
        }
    }

    /// An admin editing their own record passes the field check for any payload.
    #[test]
    fn admin_self_edit_always_passes(fields in arb_fields()) {
        let caller = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), true);
        prop_assert!(check_field_access(&caller, caller.id, &fields).is_ok());
    }

    /// A rebuild plan exists exactly when the requested set differs from the
    /// current one, and applying it then re-planning is a no-op.
    #[test]
    fn approver_rebuild_is_idempotent(
        current in arb_approver_ids(),
        requested in arb_approver_ids(),
    ) {
        let current: BTreeSet<Uuid> = current.into_iter().collect();
        let requested_set: BTreeSet<Uuid> = requested.iter().copied().collect();

        match ApproverRebuild::plan(&current, &requested) {
            None => prop_assert_eq!(&current, &requested_set),
            Some(plan) => {
                prop_assert_ne!(&current, &requested_set);
                let after: BTreeSet<Uuid> = plan.add.iter().copied().collect();
                prop_assert_eq!(&after, &requested_set);
                prop_assert_eq!(ApproverRebuild::plan(&after, &requested), None);
            }
        }
    }
}
