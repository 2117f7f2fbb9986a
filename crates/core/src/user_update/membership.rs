//! Group membership oracle.
//!
//! Answers "is this user in a group" and "is this user a group admin"
//! from a snapshot of the persisted user row. Pure reads, no side effects.

use uuid::Uuid;

/// Snapshot of a user's identity and group membership.
///
/// Built from the freshly loaded user row at the start of a request, so the
/// policy always sees the current persisted state rather than anything
/// cached in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberProfile {
    /// The user's ID.
    pub id: Uuid,
    /// The group the user belongs to, if any.
    pub group_id: Option<Uuid>,
    /// The persisted admin flag. Meaningful only relative to `group_id`.
    pub is_group_admin: bool,
}

impl MemberProfile {
    /// Creates a membership snapshot.
    #[must_use]
    pub const fn new(id: Uuid, group_id: Option<Uuid>, is_group_admin: bool) -> Self {
        Self {
            id,
            group_id,
            is_group_admin,
        }
    }

    /// Returns true if the user belongs to any group.
    #[must_use]
    pub const fn is_in_group(&self) -> bool {
        self.group_id.is_some()
    }

    /// Returns true if the user is the admin of their group.
    ///
    /// The admin flag only counts while the user is actually in a group.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.group_id.is_some() && self.is_group_admin
    }

    /// Returns true if both users are members of the same group.
    #[must_use]
    pub fn shares_group_with(&self, other: &Self) -> bool {
        match (self.group_id, other.group_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_group() {
        let grouped = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);
        assert!(grouped.is_in_group());

        let loner = MemberProfile::new(Uuid::new_v4(), None, false);
        assert!(!loner.is_in_group());
    }

    #[test]
    fn test_is_admin_requires_group() {
        let admin = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), true);
        assert!(admin.is_admin());

        // A dangling admin flag without a group grants nothing.
        let dangling = MemberProfile::new(Uuid::new_v4(), None, true);
        assert!(!dangling.is_admin());

        let member = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);
        assert!(!member.is_admin());
    }

    #[test]
    fn test_shares_group_with() {
        let group = Uuid::new_v4();
        let a = MemberProfile::new(Uuid::new_v4(), Some(group), true);
        let b = MemberProfile::new(Uuid::new_v4(), Some(group), false);
        let c = MemberProfile::new(Uuid::new_v4(), Some(Uuid::new_v4()), false);
        let d = MemberProfile::new(Uuid::new_v4(), None, false);

        assert!(a.shares_group_with(&b));
        assert!(!a.shares_group_with(&c));
        assert!(!a.shares_group_with(&d));
        // Two ungrouped users share nothing, not even with themselves.
        assert!(!d.shares_group_with(&d));
    }
}
