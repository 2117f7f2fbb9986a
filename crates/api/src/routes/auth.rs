//! Authentication routes for login, register, and token refresh.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::routes::users::build_user_response;
use tally_core::auth::{hash_password, verify_password};
use tally_db::{CurrencyRepository, UserRepository};
use tally_shared::auth::{LoginRequest, LoginResponse, RefreshRequest, RegisterRequest};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/refresh", post(refresh))
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid email or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    // Generate tokens
    let access_token = match state.jwt_service.generate_access_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during login");
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during login");
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    let user_response = match build_user_response(&user_repo, &user).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to load user relations");
            return internal_error("An error occurred during login");
        }
    };

    Json(LoginResponse {
        user: user_response,
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
    .into_response()
}

/// POST /auth/register - Create a new unaffiliated user account.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());
    let currency_repo = CurrencyRepository::new((*state.db).clone());

    if payload.email.len() > 255 || !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_email",
                "message": "A valid email address is required"
            })),
        )
            .into_response();
    }
    if payload.password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "weak_password",
                "message": "Password must be at least 8 characters"
            })),
        )
            .into_response();
    }

    // Check email availability
    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error("An error occurred during registration");
        }
    }

    // Resolve the reporting currency
    let requested = payload
        .reporting_currency
        .unwrap_or_else(|| state.default_reporting_currency.clone());
    let currency = match currency_repo.find_by_code(&requested).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "unknown_currency",
                    "message": format!("Unknown currency code: {requested}")
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error resolving currency");
            return internal_error("An error occurred during registration");
        }
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing error");
            return internal_error("An error occurred during registration");
        }
    };

    let user = match user_repo
        .create(&payload.email, &password_hash, &currency.code)
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, "User registered");

    let user_response = match build_user_response(&user_repo, &user).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to load user relations");
            return internal_error("An error occurred during registration");
        }
    };

    (StatusCode::CREATED, Json(user_response)).into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired refresh token"
                })),
            )
                .into_response();
        }
    };

    // The account must still exist
    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired refresh token"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let access_token = match state.jwt_service.generate_access_token(claims.user_id()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };
    let refresh_token = match state.jwt_service.generate_refresh_token(claims.user_id()) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during token refresh");
        }
    };

    Json(json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_in": state.jwt_service.access_token_expires_in()
    }))
    .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
