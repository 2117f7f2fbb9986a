//! Group routes: creation, joining, and member listing.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use tally_db::entities::{groups, users};
use tally_db::repositories::group::GroupError;
use tally_db::{GroupRepository, UserRepository};
use tally_shared::auth::{CreateGroupRequest, GroupResponse, JoinGroupRequest, UserPublicResponse};

/// Creates the groups router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups/join", post(join_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", get(list_members))
}

/// Builds the group representation. The admin is exposed as a resource
/// link to their user detail rather than an embedded object.
async fn build_group_response(
    repo: &GroupRepository,
    group: &groups::Model,
) -> Result<GroupResponse, sea_orm::DbErr> {
    let admin = repo.find_admin(group.id).await?;

    Ok(GroupResponse {
        id: group.id,
        name: group.name.clone(),
        invite_code: group.invite_code.clone(),
        group_admin: admin.map(|a| format!("/api/v1/users/{}", a.id)),
    })
}

/// POST /groups - Create a group with the caller as its admin.
async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    if payload.name.is_empty() || payload.name.len() > 255 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Group name must be between 1 and 255 characters"
            })),
        )
            .into_response();
    }

    let group_repo = GroupRepository::new((*state.db).clone());

    let caller = match load_caller(&state, &auth).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let group = match group_repo.create_with_admin(&payload.name, &caller).await {
        Ok(g) => g,
        Err(GroupError::AlreadyInGroup) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_in_group",
                    "message": "User already belongs to a group"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to create group");
            return internal_error();
        }
    };

    info!(group_id = %group.id, admin_id = %caller.id, "Group created");

    match build_group_response(&group_repo, &group).await {
        Ok(r) => (StatusCode::CREATED, Json(r)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load group admin");
            internal_error()
        }
    }
}

/// POST /groups/join - Join a group via invite code.
async fn join_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JoinGroupRequest>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    let caller = match load_caller(&state, &auth).await {
        Ok(u) => u,
        Err(resp) => return resp,
    };

    let group = match group_repo.join(&payload.invite_code, &caller).await {
        Ok(g) => g,
        Err(GroupError::AlreadyInGroup) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_in_group",
                    "message": "User already belongs to a group"
                })),
            )
                .into_response();
        }
        Err(GroupError::InvalidInviteCode) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_invite_code",
                    "message": "Invalid invite code"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to join group");
            return internal_error();
        }
    };

    info!(group_id = %group.id, user_id = %caller.id, "User joined group");

    match build_group_response(&group_repo, &group).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load group admin");
            internal_error()
        }
    }
}

/// GET /groups/{group_id} - Group detail, visible to members only.
async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    let group = match group_repo.find_by_id(group_id).await {
        Ok(Some(g)) => g,
        Ok(None) => return group_not_found(),
        Err(e) => {
            error!(error = %e, "Database error loading group");
            return internal_error();
        }
    };

    match group_repo.is_member(group_id, auth.user_id()).await {
        Ok(true) => {}
        Ok(false) => return group_not_found(),
        Err(e) => {
            error!(error = %e, "Database error checking membership");
            return internal_error();
        }
    }

    match build_group_response(&group_repo, &group).await {
        Ok(r) => Json(r).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load group admin");
            internal_error()
        }
    }
}

/// GET /groups/{group_id}/members - Public projections of the members.
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
) -> impl IntoResponse {
    let group_repo = GroupRepository::new((*state.db).clone());

    match group_repo.is_member(group_id, auth.user_id()).await {
        Ok(true) => {}
        Ok(false) => return group_not_found(),
        Err(e) => {
            error!(error = %e, "Database error checking membership");
            return internal_error();
        }
    }

    let members = match group_repo.members(group_id).await {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Database error listing members");
            return internal_error();
        }
    };

    let members: Vec<UserPublicResponse> = members
        .into_iter()
        .map(|m| UserPublicResponse {
            id: m.id,
            username: m.username,
            is_group_admin: m.is_group_admin,
        })
        .collect();

    Json(members).into_response()
}

/// Loads the caller's fresh user row, or an error response.
async fn load_caller(
    state: &AppState,
    auth: &AuthUser,
) -> Result<users::Model, axum::response::Response> {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => Ok(u),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response()),
        Err(e) => {
            error!(error = %e, "Database error loading caller");
            Err(internal_error())
        }
    }
}

fn group_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Group not found"
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
