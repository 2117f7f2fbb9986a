//! Authentication claims and request/response payload types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Sum;

/// JWT claims for access and refresh tokens.
///
/// Group membership and admin status are deliberately not embedded in the
/// token: the policy engine always reads them fresh from the database, so a
/// stale token can never grant stale privileges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// Reporting currency (ISO 4217 code). Defaults to the configured
    /// currency when omitted.
    pub reporting_currency: Option<String>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserResponse,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// Full user representation.
///
/// Returned to the user themselves and to their group admin.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// Username.
    pub username: String,
    /// Balance in the reporting currency (positive = owed to the user).
    pub balance: Sum,
    /// Reporting currency code.
    pub reporting_currency: String,
    /// Group the user belongs to, if any.
    pub group: Option<Uuid>,
    /// Users empowered to authorize requests on this user's behalf.
    pub approvers: Vec<Uuid>,
    /// Users who designated this user as their approver (derived).
    pub reporters: Vec<Uuid>,
    /// Whether this user is the admin of their group.
    pub is_group_admin: bool,
}

/// Reduced public projection of a user.
///
/// Exposed to authenticated viewers who are neither the user nor their
/// group admin.
#[derive(Debug, Clone, Serialize)]
pub struct UserPublicResponse {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Whether this user is the admin of their group.
    pub is_group_admin: bool,
}

/// User update request payload.
///
/// Every field is optional; a field is "present in the payload" exactly when
/// it deserializes to `Some`. Unknown keys are rejected so the field access
/// policy sees the complete key set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    /// New email (self only).
    pub email: Option<String>,
    /// New username.
    pub username: Option<String>,
    /// New password (self only, hashed before storage).
    pub password: Option<String>,
    /// New reporting currency code (self only).
    pub reporting_currency: Option<String>,
    /// New balance amount (group admin only).
    pub balance_amount: Option<Decimal>,
    /// Requested approver set (group admin only).
    pub approvers: Option<Vec<Uuid>>,
    /// Admin flag (group admin only; see the admin-transfer guard).
    pub is_group_admin: Option<bool>,
}

/// Create group request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name.
    pub name: String,
}

/// Join group request.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinGroupRequest {
    /// Invite code of the group to join.
    pub invite_code: String,
}

/// Group representation.
#[derive(Debug, Clone, Serialize)]
pub struct GroupResponse {
    /// Group ID.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// Opaque join token.
    pub invite_code: String,
    /// Resource link to the group admin's user detail.
    pub group_admin: Option<String>,
}
