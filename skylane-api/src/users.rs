use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use skylane_core::identity::{CredentialStore, IdentityError};
use skylane_core::repository::{BookingLedger, BookingQueries};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
        .route("/user/bookings", get(my_bookings))
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    username: String,
    password: String,
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, AppError> {
    match state.directory.register(&req.username, &req.password, false).await {
        Ok(user) => {
            info!("user '{}' signed up", user.username);
            Ok("User signed up successfully".into_response())
        }
        Err(IdentityError::DuplicateUser(name)) => Err(AppError::ConflictError(format!(
            "Username '{}' is already taken.",
            name
        ))),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

// Both outcomes answer 200 with plain text; clients key off the message.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    match state.directory.authenticate(&req.username, &req.password).await {
        Ok(user) => {
            info!("user '{}' logged in", user.username);
            Ok("User logged in successfully".into_response())
        }
        Err(IdentityError::InvalidCredentials) => {
            Ok("Invalid username or password".into_response())
        }
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct BookingsQuery {
    username: Option<String>,
}

async fn my_bookings(
    State(state): State<AppState>,
    Query(params): Query<BookingsQuery>,
) -> Result<Response, AppError> {
    let username = params
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::ValidationError("Missing username parameter.".to_string()))?;

    let user = state
        .directory
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("User not found.".to_string()))?;

    let bookings = state
        .ledger
        .list_by_rider(user.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if bookings.is_empty() {
        return Ok(Json(json!({"message": "No bookings found for this user."})).into_response());
    }

    // The join drops bookings whose flight was removed; an all-dropped
    // result is distinguishable from having no bookings at all.
    let views = state
        .queries
        .bookings_for_rider(user.id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    if views.is_empty() {
        return Ok(
            Json(json!({"message": "No valid bookings found for this user."})).into_response(),
        );
    }

    Ok(Json(views).into_response())
}
