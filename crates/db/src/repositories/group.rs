//! Group repository.
//!
//! Groups are created with their creator as the sole admin; other users
//! join through an invite code. A user belongs to at most one group.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{groups, users};

/// Errors from group operations.
#[derive(Debug, Error)]
pub enum GroupError {
    /// The user already belongs to a group.
    #[error("user already belongs to a group")]
    AlreadyInGroup,

    /// The group does not exist.
    #[error("group not found")]
    NotFound,

    /// The invite code does not match any group.
    #[error("invalid invite code")]
    InvalidInviteCode,

    /// Database error.
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Group repository for membership and admin lookups.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a URL-safe random invite code.
    fn generate_invite_code() -> String {
        let bytes: [u8; 16] = rand::random();
        base64_url::encode(&bytes)
    }

    /// Creates a new group with the creator as its admin.
    ///
    /// The creator must be unaffiliated; group insert and membership update
    /// happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::AlreadyInGroup` if the creator already belongs
    /// to a group, or a database error.
    pub async fn create_with_admin(
        &self,
        name: &str,
        creator: &users::Model,
    ) -> Result<groups::Model, GroupError> {
        if creator.group_id.is_some() {
            return Err(GroupError::AlreadyInGroup);
        }

        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let group = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            invite_code: Set(Self::generate_invite_code()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let group = group.insert(&txn).await?;

        let mut member: users::ActiveModel = creator.clone().into();
        member.group_id = Set(Some(group.id));
        member.is_group_admin = Set(true);
        member.updated_at = Set(now);
        member.update(&txn).await?;

        txn.commit().await?;

        Ok(group)
    }

    /// Finds a group by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<groups::Model>, DbErr> {
        groups::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a group by invite code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_invite_code(&self, code: &str) -> Result<Option<groups::Model>, DbErr> {
        groups::Entity::find()
            .filter(groups::Column::InviteCode.eq(code))
            .one(&self.db)
            .await
    }

    /// Lists the members of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn members(&self, group_id: Uuid) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::GroupId.eq(group_id))
            .order_by_asc(users::Column::Username)
            .all(&self.db)
            .await
    }

    /// Finds the admin of a group, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_admin(&self, group_id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::GroupId.eq(group_id))
            .filter(users::Column::IsGroupAdmin.eq(true))
            .one(&self.db)
            .await
    }

    /// Checks whether a user is a member of a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::GroupId.eq(group_id))
            .filter(users::Column::Id.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Joins a user to a group via invite code.
    ///
    /// The joiner enters as a regular member, never as admin.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::AlreadyInGroup` if the user already belongs to a
    /// group, `GroupError::InvalidInviteCode` if the code matches no group,
    /// or a database error.
    pub async fn join(
        &self,
        invite_code: &str,
        user: &users::Model,
    ) -> Result<groups::Model, GroupError> {
        if user.group_id.is_some() {
            return Err(GroupError::AlreadyInGroup);
        }

        let group = self
            .find_by_invite_code(invite_code)
            .await?
            .ok_or(GroupError::InvalidInviteCode)?;

        let mut member: users::ActiveModel = user.clone().into();
        member.group_id = Set(Some(group.id));
        member.is_group_admin = Set(false);
        member.updated_at = Set(chrono::Utc::now().into());
        member.update(&self.db).await?;

        Ok(group)
    }
}
