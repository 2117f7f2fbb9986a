//! User repository and the user-update orchestrator.
//!
//! `update_user` is the single entry point for mutating a user record. It
//! sequences the pure policy checks from `tally-core` (field access,
//! admin-transfer guard, approver reconciliation) and applies the resulting
//! mutation inside one transaction with row-level locks, so a rejected
//! request never leaves partial state behind.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use tally_core::auth::{PasswordError, hash_password};
use tally_core::user_update::{
    AdminChange, ApproverRebuild, MemberProfile, UpdateError, UserField, check_field_access,
    plan_admin_change,
};
use tally_shared::auth::UpdateUserRequest;

use crate::entities::{currencies, user_approvers, users};

/// Maximum username length, matching the column definition.
const USERNAME_MAX_LEN: usize = 150;

/// Errors from the user-update workflow.
#[derive(Debug, Error)]
pub enum UserUpdateError {
    /// A policy rejection from the core engine.
    #[error(transparent)]
    Policy(#[from] UpdateError),

    /// The target user does not exist.
    #[error("user not found")]
    NotFound,

    /// The requested email is already registered.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// Promoting the target would give their group a second admin.
    #[error("the target's group already has an admin")]
    AdminConflict,

    /// The requested email is not a usable address.
    #[error("invalid email address")]
    InvalidEmail,

    /// The requested username is out of bounds.
    #[error("username must be between 1 and 150 characters")]
    InvalidUsername,

    /// The requested reporting currency is not configured.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A requested approver does not exist.
    #[error("approver {0} not found")]
    ApproverNotFound(Uuid),

    /// A requested approver is not a member of the target's group.
    #[error("approver {0} is not a member of the user's group")]
    ApproverNotInGroup(Uuid),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// The validated change set for a user update.
///
/// A field is part of the update exactly when it is `Some`; `fields()`
/// reports the present fields for the access policy.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New email.
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New plaintext password (hashed before storage).
    pub password: Option<String>,
    /// New reporting currency code.
    pub reporting_currency: Option<String>,
    /// New balance amount.
    pub balance_amount: Option<Decimal>,
    /// Requested approver set.
    pub approvers: Option<Vec<Uuid>>,
    /// New admin flag.
    pub is_group_admin: Option<bool>,
}

impl UserChanges {
    /// The payload fields present in this change set.
    #[must_use]
    pub fn fields(&self) -> Vec<UserField> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push(UserField::Email);
        }
        if self.username.is_some() {
            fields.push(UserField::Username);
        }
        if self.password.is_some() {
            fields.push(UserField::Password);
        }
        if self.reporting_currency.is_some() {
            fields.push(UserField::ReportingCurrency);
        }
        if self.balance_amount.is_some() {
            fields.push(UserField::BalanceAmount);
        }
        if self.approvers.is_some() {
            fields.push(UserField::Approvers);
        }
        if self.is_group_admin.is_some() {
            fields.push(UserField::IsGroupAdmin);
        }
        fields
    }

    /// Returns true when no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            password: req.password,
            reporting_currency: req.reporting_currency,
            balance_amount: req.balance_amount,
            approvers: req.approvers,
            is_group_admin: req.is_group_admin,
        }
    }
}

/// User repository for CRUD operations and the update orchestrator.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new unaffiliated user.
    ///
    /// The username defaults to the local part of the email; the caller
    /// supplies the already-hashed password and a validated currency code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        reporting_currency: &str,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let username = email.split('@').next().unwrap_or(email).to_string();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            username: Set(username),
            password_hash: Set(password_hash.to_string()),
            reporting_currency: Set(reporting_currency.to_string()),
            balance_amount: Set(Decimal::ZERO),
            group_id: Set(None),
            is_group_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Returns the IDs of a user's approvers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn approver_ids(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>, DbErr> {
        let rows = user_approvers::Entity::find()
            .filter(user_approvers::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| r.approver_id).collect())
    }

    /// Returns the IDs of the users who designated this user as an approver
    /// (the derived reporters view).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn reporter_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let rows = user_approvers::Entity::find()
            .filter(user_approvers::Column::ApproverId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|r| r.user_id).collect())
    }

    /// Applies a validated update to a user record.
    ///
    /// The caller row must be freshly loaded; the policy reads its group and
    /// admin flag as current persisted state. Sequencing:
    ///
    /// 1. field access policy against the present payload fields;
    /// 2. value-level validation (email, username, currency code);
    /// 3. admin-transfer guard against the resolved admin flag;
    /// 4. transaction: lock and load the target row;
    /// 5. demote the caller first on an admin transfer (the partial unique
    ///    index forbids two admins per group, even transiently);
    /// 6. apply scalar assignments, hashing any new password;
    /// 7. rebuild the approver relation when the requested set differs;
    /// 8. commit.
    ///
    /// Any error before commit rolls the whole update back.
    ///
    /// # Errors
    ///
    /// Returns a policy, validation, or database error; see [`UserUpdateError`].
    pub async fn update_user(
        &self,
        caller: &users::Model,
        target_id: Uuid,
        changes: UserChanges,
    ) -> Result<users::Model, UserUpdateError> {
        let caller_profile = MemberProfile::new(caller.id, caller.group_id, caller.is_group_admin);

        // Step 1: field access policy, before touching any state.
        check_field_access(&caller_profile, target_id, &changes.fields())?;

        // Step 2: value-level validation.
        if let Some(email) = &changes.email
            && (email.len() > 255 || !email.contains('@'))
        {
            return Err(UserUpdateError::InvalidEmail);
        }
        if let Some(username) = &changes.username
            && (username.is_empty() || username.len() > USERNAME_MAX_LEN)
        {
            return Err(UserUpdateError::InvalidUsername);
        }
        let reporting_currency = match &changes.reporting_currency {
            Some(code) => Some(self.resolve_currency(code).await?),
            None => None,
        };

        // Step 3: admin-transfer guard against the resolved boolean.
        let admin_change = plan_admin_change(&caller_profile, target_id, changes.is_group_admin)?;

        let txn = self.db.begin().await?;

        // Step 4: lock and load the target row.
        let target = users::Entity::find_by_id(target_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(UserUpdateError::NotFound)?;

        // Step 5: on a transfer, clear the outgoing admin's flag before the
        // target's is set, or the single-admin index rejects the update.
        if let AdminChange::Transfer { demote, .. } = admin_change {
            let outgoing = users::Entity::find_by_id(demote)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or(UserUpdateError::NotFound)?;

            let mut outgoing: users::ActiveModel = outgoing.into();
            outgoing.is_group_admin = Set(false);
            outgoing.updated_at = Set(chrono::Utc::now().into());
            outgoing.update(&txn).await?;
        }

        // Step 6: scalar assignments.
        let mut active: users::ActiveModel = target.clone().into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(code) = reporting_currency {
            active.reporting_currency = Set(code);
        }
        if let Some(amount) = changes.balance_amount {
            active.balance_amount = Set(amount);
        }
        match admin_change {
            AdminChange::Unchanged => {}
            AdminChange::SetSelf(value) | AdminChange::Transfer { value, .. } => {
                active.is_group_admin = Set(value);
            }
        }
        if let Some(password) = changes.password {
            // Credentials go through the hashing path, never plain assignment.
            active.password_hash = Set(hash_password(&password)?);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&txn).await.map_err(unique_violation)?;

        // Step 7: approver reconciliation, full-rebuild semantics.
        if let Some(requested) = &changes.approvers {
            let current = self.approver_ids_in(&txn, target_id).await?;
            if let Some(plan) = ApproverRebuild::plan(&current, requested) {
                user_approvers::Entity::delete_many()
                    .filter(user_approvers::Column::UserId.eq(target_id))
                    .exec(&txn)
                    .await?;

                for approver_id in plan.add {
                    self.add_approver(&txn, &updated, approver_id).await?;
                }
            }
        }

        txn.commit().await?;

        Ok(updated)
    }

    /// Adds a single approver to a user, validating group membership.
    ///
    /// Every approver goes through this path, including ones that were
    /// already present before a rebuild, so the membership check is applied
    /// uniformly.
    async fn add_approver(
        &self,
        txn: &DatabaseTransaction,
        user: &users::Model,
        approver_id: Uuid,
    ) -> Result<(), UserUpdateError> {
        let approver = users::Entity::find_by_id(approver_id)
            .one(txn)
            .await?
            .ok_or(UserUpdateError::ApproverNotFound(approver_id))?;

        let user_profile = MemberProfile::new(user.id, user.group_id, user.is_group_admin);
        let approver_profile =
            MemberProfile::new(approver.id, approver.group_id, approver.is_group_admin);
        if !user_profile.shares_group_with(&approver_profile) {
            return Err(UserUpdateError::ApproverNotInGroup(approver_id));
        }

        let edge = user_approvers::ActiveModel {
            user_id: Set(user.id),
            approver_id: Set(approver_id),
            created_at: Set(chrono::Utc::now().into()),
        };
        edge.insert(txn).await?;

        Ok(())
    }

    /// Reads a user's approver set inside an open transaction.
    async fn approver_ids_in(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
    ) -> Result<BTreeSet<Uuid>, DbErr> {
        let rows = user_approvers::Entity::find()
            .filter(user_approvers::Column::UserId.eq(user_id))
            .all(txn)
            .await?;

        Ok(rows.into_iter().map(|r| r.approver_id).collect())
    }

    /// Resolves and normalizes a currency code.
    async fn resolve_currency(&self, code: &str) -> Result<String, UserUpdateError> {
        let normalized = code.to_uppercase();
        let found = currencies::Entity::find_by_id(normalized.clone())
            .one(&self.db)
            .await?;

        match found {
            Some(currency) => Ok(currency.code),
            None => Err(UserUpdateError::UnknownCurrency(code.to_string())),
        }
    }
}

/// Maps a unique violation on the target-row update to the constraint that
/// actually fired. The statement can trip two indexes: the email column and
/// the single-admin partial index (when promoting into a group that already
/// has an admin, or when two transfers race).
fn unique_violation(e: DbErr) -> UserUpdateError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            if msg.contains("uq_users_group_admin") {
                UserUpdateError::AdminConflict
            } else {
                UserUpdateError::EmailTaken
            }
        }
        _ => UserUpdateError::Db(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_report_present_fields() {
        let changes = UserChanges {
            username: Some("bob".to_string()),
            is_group_admin: Some(true),
            ..UserChanges::default()
        };

        assert_eq!(
            changes.fields(),
            vec![UserField::Username, UserField::IsGroupAdmin]
        );
        assert!(!changes.is_empty());
        assert!(UserChanges::default().is_empty());
    }

    #[test]
    fn test_changes_from_request() {
        let req = UpdateUserRequest {
            email: Some("a@b.example".to_string()),
            approvers: Some(vec![Uuid::new_v4()]),
            ..UpdateUserRequest::default()
        };

        let changes = UserChanges::from(req);
        assert_eq!(
            changes.fields(),
            vec![UserField::Email, UserField::Approvers]
        );
    }
}
