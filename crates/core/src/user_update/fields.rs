//! Field access classification for user updates.
//!
//! Every mutable field of the user representation is classified into
//! exactly one access class, and an update payload is checked in a single
//! pass against the caller's relationship to the target. Explicit
//! allow-lists per caller role keep the policy auditable and total: there
//! is no field without a classification.

use uuid::Uuid;

use crate::user_update::error::UpdateError;
use crate::user_update::membership::MemberProfile;

/// The mutable fields of a user record, as they appear in update payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    /// Login email.
    Email,
    /// Display name.
    Username,
    /// Plaintext password (hashed before storage).
    Password,
    /// Reporting currency code.
    ReportingCurrency,
    /// Signed balance in the reporting currency.
    BalanceAmount,
    /// The approver set.
    Approvers,
    /// The group-admin flag.
    IsGroupAdmin,
}

/// Who may modify a given field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    /// Only the user themselves, regardless of anyone's admin status.
    SelfOnly,
    /// The user themselves, or their group admin.
    AdminEditable,
    /// Only a group admin, even on the admin's own record.
    AdminOnly,
}

impl UserField {
    /// All fields, in payload order.
    pub const ALL: [Self; 7] = [
        Self::Email,
        Self::Username,
        Self::Password,
        Self::ReportingCurrency,
        Self::BalanceAmount,
        Self::Approvers,
        Self::IsGroupAdmin,
    ];

    /// The field name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Password => "password",
            Self::ReportingCurrency => "reporting_currency",
            Self::BalanceAmount => "balance_amount",
            Self::Approvers => "approvers",
            Self::IsGroupAdmin => "is_group_admin",
        }
    }

    /// The access class of this field.
    #[must_use]
    pub const fn access(self) -> FieldAccess {
        match self {
            Self::Email | Self::Password | Self::ReportingCurrency => FieldAccess::SelfOnly,
            Self::Username | Self::IsGroupAdmin => FieldAccess::AdminEditable,
            Self::BalanceAmount | Self::Approvers => FieldAccess::AdminOnly,
        }
    }
}

impl std::fmt::Display for UserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks whether the caller may touch every field present in the payload.
///
/// Two rules, evaluated in one pass over the field set:
///
/// 1. When the caller is not the target, `SelfOnly` fields are off limits.
/// 2. When the caller is not a group admin, `AdminOnly` fields are off
///    limits, and so is editing anyone else's record at all.
///
/// # Errors
///
/// Returns `UpdateError::NotEditableByOthers` or `UpdateError::AdminRequired`
/// enumerating exactly the offending field names. Rule 1 violations are
/// reported first when both rules are broken.
pub fn check_field_access(
    caller: &MemberProfile,
    target_id: Uuid,
    fields: &[UserField],
) -> Result<(), UpdateError> {
    let is_self = caller.id == target_id;
    let is_admin = caller.is_admin();

    let mut self_only_offenders = Vec::new();
    let mut admin_offenders = Vec::new();

    for field in fields {
        match field.access() {
            FieldAccess::SelfOnly => {
                if !is_self {
                    self_only_offenders.push(field.as_str().to_string());
                }
            }
            FieldAccess::AdminEditable => {
                if !is_self && !is_admin {
                    admin_offenders.push(field.as_str().to_string());
                }
            }
            FieldAccess::AdminOnly => {
                if !is_admin {
                    admin_offenders.push(field.as_str().to_string());
                }
            }
        }
    }

    if !self_only_offenders.is_empty() {
        return Err(UpdateError::NotEditableByOthers {
            fields: self_only_offenders,
        });
    }

    if !admin_offenders.is_empty() {
        return Err(UpdateError::AdminRequired {
            fields: admin_offenders,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn admin_in_group(group: Uuid) -> MemberProfile {
        MemberProfile::new(Uuid::new_v4(), Some(group), true)
    }

    fn member_in_group(group: Uuid) -> MemberProfile {
        MemberProfile::new(Uuid::new_v4(), Some(group), false)
    }

    #[rstest]
    #[case(UserField::Email, FieldAccess::SelfOnly)]
    #[case(UserField::Username, FieldAccess::AdminEditable)]
    #[case(UserField::Password, FieldAccess::SelfOnly)]
    #[case(UserField::ReportingCurrency, FieldAccess::SelfOnly)]
    #[case(UserField::BalanceAmount, FieldAccess::AdminOnly)]
    #[case(UserField::Approvers, FieldAccess::AdminOnly)]
    #[case(UserField::IsGroupAdmin, FieldAccess::AdminEditable)]
    fn test_access_classification(#[case] field: UserField, #[case] expected: FieldAccess) {
        assert_eq!(field.access(), expected);
        assert!(!field.as_str().is_empty());
    }

    #[test]
    fn test_self_service_fields_pass_for_non_admin_self() {
        let caller = member_in_group(Uuid::new_v4());
        let result = check_field_access(
            &caller,
            caller.id,
            &[
                UserField::Email,
                UserField::Username,
                UserField::Password,
                UserField::ReportingCurrency,
            ],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_admin_cannot_set_own_approvers() {
        let caller = member_in_group(Uuid::new_v4());
        let result = check_field_access(&caller, caller.id, &[UserField::Approvers]);
        assert_eq!(
            result,
            Err(UpdateError::AdminRequired {
                fields: vec!["approvers".to_string()]
            })
        );
    }

    #[test]
    fn test_non_admin_cannot_edit_others_at_all() {
        let caller = member_in_group(Uuid::new_v4());
        let target = Uuid::new_v4();
        let result = check_field_access(&caller, target, &[UserField::Username]);
        assert_eq!(
            result,
            Err(UpdateError::AdminRequired {
                fields: vec!["username".to_string()]
            })
        );
    }

    #[test]
    fn test_admin_cannot_touch_self_only_fields_of_others() {
        let caller = admin_in_group(Uuid::new_v4());
        let target = Uuid::new_v4();
        let result = check_field_access(
            &caller,
            target,
            &[UserField::Email, UserField::Password, UserField::Username],
        );
        assert_eq!(
            result,
            Err(UpdateError::NotEditableByOthers {
                fields: vec!["email".to_string(), "password".to_string()]
            })
        );
    }

    #[test]
    fn test_admin_may_edit_admin_fields_of_others() {
        let caller = admin_in_group(Uuid::new_v4());
        let target = Uuid::new_v4();
        let result = check_field_access(
            &caller,
            target,
            &[
                UserField::Username,
                UserField::BalanceAmount,
                UserField::Approvers,
                UserField::IsGroupAdmin,
            ],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_admin_may_edit_own_record_fully() {
        let caller = admin_in_group(Uuid::new_v4());
        let result = check_field_access(&caller, caller.id, &UserField::ALL);
        assert!(result.is_ok());
    }

    #[test]
    fn test_self_only_violation_reported_before_admin_violation() {
        let caller = member_in_group(Uuid::new_v4());
        let target = Uuid::new_v4();
        let result = check_field_access(
            &caller,
            target,
            &[UserField::BalanceAmount, UserField::Email],
        );
        // Both rules are broken; rule 1 wins the error slot.
        assert_eq!(
            result,
            Err(UpdateError::NotEditableByOthers {
                fields: vec!["email".to_string()]
            })
        );
    }

    #[test]
    fn test_admin_flag_without_group_grants_nothing() {
        // A user who left their group keeps no admin privileges.
        let caller = MemberProfile::new(Uuid::new_v4(), None, true);
        let target = Uuid::new_v4();
        let result = check_field_access(&caller, target, &[UserField::Username]);
        assert_eq!(
            result,
            Err(UpdateError::AdminRequired {
                fields: vec!["username".to_string()]
            })
        );
    }

    #[test]
    fn test_empty_payload_is_allowed() {
        let caller = member_in_group(Uuid::new_v4());
        assert!(check_field_access(&caller, Uuid::new_v4(), &[]).is_ok());
    }
}
