use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use skylane_core::flight::{CatalogError, NewFlight};
use skylane_core::identity::{AdminSessions, CredentialStore, IdentityError};
use skylane_core::query::AdminBooking;
use skylane_core::repository::{BookingQueries, FlightCatalog};

use crate::error::AppError;
use crate::middleware::auth::{admin_auth_middleware, AdminIdentity};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let guarded = Router::new()
        .route("/admin/flights/add", post(add_flight))
        .route("/admin/flights/remove", post(remove_flight))
        .route("/admin/bookings", get(all_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ));

    Router::new()
        .route("/admin/login", post(admin_login))
        .merge(guarded)
}

#[derive(Debug, Deserialize)]
struct AdminLoginRequest {
    username: Option<String>,
    password: Option<String>,
}

async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Response, AppError> {
    let invalid = || AppError::AuthenticationError("Invalid admin credentials".to_string());

    let (username, password) = match (req.username, req.password) {
        (Some(u), Some(p)) => (u, p),
        _ => return Err(invalid()),
    };

    match state.directory.authenticate(&username, &password).await {
        Ok(user) if user.is_admin => {
            let token = state
                .sessions
                .issue(user.id)
                .await
                .map_err(|e| AppError::InternalServerError(e.to_string()))?;
            info!("administrator '{}' logged in", user.username);
            Ok(Json(json!({
                "message": "Admin logged in successfully",
                "admin_auth_token": token,
            }))
            .into_response())
        }
        // A valid rider credential is still not an admin credential.
        Ok(_) => Err(invalid()),
        Err(IdentityError::InvalidCredentials) => Err(invalid()),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct AddFlightRequest {
    flight_number: Option<String>,
    departure_time: Option<String>,
    seat_count: Option<i32>,
}

async fn add_flight(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminIdentity>,
    Json(req): Json<AddFlightRequest>,
) -> Result<Response, AppError> {
    let (Some(flight_number), Some(departure_time), Some(seat_count)) =
        (req.flight_number, req.departure_time, req.seat_count)
    else {
        return Err(AppError::ValidationError(
            "Missing required data. Please provide flight_number, departure_time, and seat_count."
                .to_string(),
        ));
    };

    let new_flight = NewFlight {
        flight_number,
        departure_time,
        seat_count,
    };

    match state.catalog.create(new_flight).await {
        Ok(flight) => {
            info!(
                "admin {} added flight {} with {} seats",
                admin.admin_id, flight.flight_number, flight.capacity
            );
            Ok((
                StatusCode::CREATED,
                Json(json!({"message": "Flight added successfully"})),
            )
                .into_response())
        }
        Err(CatalogError::DuplicateFlightNumber(_)) => Err(AppError::ConflictError(
            "Flight with the same number already exists.".to_string(),
        )),
        Err(CatalogError::InvalidInput(msg)) => Err(AppError::ValidationError(msg)),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct RemoveFlightRequest {
    flight_number: Option<String>,
}

async fn remove_flight(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminIdentity>,
    Json(req): Json<RemoveFlightRequest>,
) -> Result<Response, AppError> {
    let Some(flight_number) = req.flight_number else {
        return Err(AppError::ValidationError(
            "Missing required data. Please provide flight_number.".to_string(),
        ));
    };

    match state.catalog.remove(&flight_number).await {
        Ok(()) => {
            info!("admin {} removed flight {}", admin.admin_id, flight_number);
            Ok(Json(json!({"message": "Flight removed successfully"})).into_response())
        }
        Err(CatalogError::NotFound(_)) => {
            Err(AppError::NotFoundError("Flight not found".to_string()))
        }
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}

async fn all_bookings(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminBooking>>, AppError> {
    let views = state
        .queries
        .all_bookings()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    Ok(Json(views))
}
