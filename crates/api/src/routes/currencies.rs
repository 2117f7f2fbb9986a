//! Currency routes.
//!
//! Deleting a currency that any user reports in is refused with a conflict;
//! the schema's RESTRICT foreign key backs this at the database level.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use tally_db::CurrencyRepository;
use tally_db::repositories::currency::CurrencyError;

/// Create currency request.
#[derive(Debug, Deserialize)]
pub struct CreateCurrencyRequest {
    /// ISO 4217 code.
    pub code: String,
    /// Exchange rate against the base currency.
    pub rate: Decimal,
}

/// Creates the currencies router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies))
        .route("/currencies", post(create_currency))
        .route("/currencies/{code}", get(get_currency))
        .route("/currencies/{code}", delete(delete_currency))
}

/// GET /currencies/{code} - Currency detail.
async fn get_currency(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let repo = CurrencyRepository::new((*state.db).clone());

    match repo.find_by_code(&code).await {
        Ok(Some(c)) => Json(json!({ "code": c.code, "rate": c.rate })).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Currency not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error loading currency");
            internal_error()
        }
    }
}

/// GET /currencies - List all configured currencies.
async fn list_currencies(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = CurrencyRepository::new((*state.db).clone());

    match repo.all().await {
        Ok(currencies) => {
            let body: Vec<_> = currencies
                .into_iter()
                .map(|c| json!({ "code": c.code, "rate": c.rate }))
                .collect();
            Json(body).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing currencies");
            internal_error()
        }
    }
}

/// POST /currencies - Register a new currency.
async fn create_currency(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateCurrencyRequest>,
) -> impl IntoResponse {
    if payload.rate <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Exchange rate must be positive"
            })),
        )
            .into_response();
    }

    let repo = CurrencyRepository::new((*state.db).clone());

    match repo.create(&payload.code, payload.rate).await {
        Ok(currency) => {
            info!(code = %currency.code, "Currency created");
            (
                StatusCode::CREATED,
                Json(json!({ "code": currency.code, "rate": currency.rate })),
            )
                .into_response()
        }
        Err(CurrencyError::InvalidCode) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Currency code must be three letters"
            })),
        )
            .into_response(),
        Err(CurrencyError::AlreadyExists) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "currency_exists",
                "message": "Currency code already exists"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create currency");
            internal_error()
        }
    }
}

/// DELETE /currencies/{code} - Remove a currency not referenced by any user.
async fn delete_currency(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(code): Path<String>,
) -> impl IntoResponse {
    let repo = CurrencyRepository::new((*state.db).clone());

    match repo.delete(&code).await {
        Ok(()) => {
            info!(code = %code, "Currency deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(CurrencyError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Currency not found"
            })),
        )
            .into_response(),
        Err(CurrencyError::InUse) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "currency_in_use",
                "message": "Currency is in use and cannot be deleted"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete currency");
            internal_error()
        }
    }
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
