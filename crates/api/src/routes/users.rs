//! User routes: detail views and the update endpoint.
//!
//! `PATCH /users/{id}` is the HTTP surface of the update orchestrator. The
//! caller's membership is loaded fresh for every request; tokens carry no
//! group or admin information.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use tally_core::user_update::{MemberProfile, UpdateError};
use tally_db::UserRepository;
use tally_db::entities::users;
use tally_db::repositories::user::{UserChanges, UserUpdateError};
use tally_shared::auth::{UpdateUserRequest, UserPublicResponse, UserResponse};
use tally_shared::types::Sum;

/// Creates the users router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}", patch(update_user))
}

/// Builds the full user representation, loading the approver relation and
/// its inverse.
pub(crate) async fn build_user_response(
    repo: &UserRepository,
    user: &users::Model,
) -> Result<UserResponse, DbErr> {
    let approvers = repo.approver_ids(user.id).await?;
    let reporters = repo.reporter_ids(user.id).await?;

    Ok(UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        balance: Sum::new(user.balance_amount, user.reporting_currency.clone()),
        reporting_currency: user.reporting_currency.clone(),
        group: user.group_id,
        approvers: approvers.into_iter().collect(),
        reporters,
        is_group_admin: user.is_group_admin,
    })
}

/// Whether the viewer sees the target's full representation: the user
/// themselves, or the admin of the target's group.
fn sees_full_representation(viewer: &users::Model, target: &users::Model) -> bool {
    if viewer.id == target.id {
        return true;
    }
    let viewer = MemberProfile::new(viewer.id, viewer.group_id, viewer.is_group_admin);
    let target = MemberProfile::new(target.id, target.group_id, target.is_group_admin);
    viewer.is_admin() && viewer.shares_group_with(&target)
}

/// GET /users/me - The authenticated user's own representation.
async fn get_me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());

    let user = match repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error loading user");
            return internal_error();
        }
    };

    match build_user_response(&repo, &user).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load user relations");
            internal_error()
        }
    }
}

/// GET /users/{user_id} - User detail.
///
/// The user themselves and their group admin get the full representation;
/// any other authenticated viewer gets the reduced public projection.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());

    let viewer = match repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error loading viewer");
            return internal_error();
        }
    };
    let target = match repo.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error loading user");
            return internal_error();
        }
    };

    if sees_full_representation(&viewer, &target) {
        match build_user_response(&repo, &target).await {
            Ok(r) => Json(r).into_response(),
            Err(e) => {
                error!(error = %e, "Failed to load user relations");
                internal_error()
            }
        }
    } else {
        Json(UserPublicResponse {
            id: target.id,
            username: target.username.clone(),
            is_group_admin: target.is_group_admin,
        })
        .into_response()
    }
}

/// PATCH /users/{user_id} - Apply a partial update to a user.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());

    // Fresh caller state; never trusted from the token
    let caller = match repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => return user_not_found(),
        Err(e) => {
            error!(error = %e, "Database error loading caller");
            return internal_error();
        }
    };

    let changes = UserChanges::from(payload);
    let updated = match repo.update_user(&caller, user_id, changes).await {
        Ok(u) => u,
        Err(e) => return update_error_response(&e),
    };

    info!(
        caller_id = %caller.id,
        target_id = %updated.id,
        "User updated"
    );

    match build_user_response(&repo, &updated).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load user relations");
            internal_error()
        }
    }
}

/// Maps an orchestrator error to an HTTP response.
fn update_error_response(err: &UserUpdateError) -> axum::response::Response {
    match err {
        UserUpdateError::Policy(policy) => match policy {
            UpdateError::NotEditableByOthers { .. } | UpdateError::AdminRequired { .. } => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "permission_denied",
                    "message": policy.to_string()
                })),
            )
                .into_response(),
            UpdateError::SelfAdminRemoval => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "field": policy.field(),
                    "message": policy.to_string()
                })),
            )
                .into_response(),
        },
        UserUpdateError::NotFound => user_not_found(),
        UserUpdateError::EmailTaken => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "email_exists",
                "message": err.to_string()
            })),
        )
            .into_response(),
        UserUpdateError::AdminConflict => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "admin_conflict",
                "field": "is_group_admin",
                "message": err.to_string()
            })),
        )
            .into_response(),
        UserUpdateError::InvalidEmail
        | UserUpdateError::InvalidUsername
        | UserUpdateError::UnknownCurrency(_)
        | UserUpdateError::ApproverNotFound(_)
        | UserUpdateError::ApproverNotInGroup(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": err.to_string()
            })),
        )
            .into_response(),
        UserUpdateError::Password(e) => {
            error!(error = %e, "Password hashing error during update");
            internal_error()
        }
        UserUpdateError::Db(e) => {
            error!(error = %e, "Database error during user update");
            internal_error()
        }
    }
}

fn user_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "User not found"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
