use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use skylane_core::booking::AllocationError;
use skylane_core::identity::CredentialStore;
use skylane_core::query::FlightSummary;
use skylane_core::repository::{FlightCatalog, SeatAllocator};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights/search", get(search))
        .route("/flights/book", post(book))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    departure_time: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let departure_time = params.departure_time.unwrap_or_default();

    let flights = state
        .catalog
        .find_by_departure_time(&departure_time)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if flights.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "No flights found for the given departure time."})),
        )
            .into_response());
    }

    let summaries: Vec<FlightSummary> = flights.iter().map(FlightSummary::from).collect();
    Ok(Json(json!({ "flights": summaries })).into_response())
}

#[derive(Debug, Deserialize)]
struct BookRequest {
    flight_number: String,
    username: String,
}

async fn book(
    State(state): State<AppState>,
    Json(req): Json<BookRequest>,
) -> Result<Response, AppError> {
    let rider = state
        .directory
        .find_by_username(&req.username)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("User not found.".to_string()))?;

    match state.allocator.book(&req.flight_number, rider.id).await {
        Ok(booking) => {
            info!(
                "rider '{}' booked flight {} (booking {})",
                rider.username, req.flight_number, booking.id
            );
            Ok("Ticket booked successfully".into_response())
        }
        Err(AllocationError::FlightNotFound(_)) => {
            Ok((StatusCode::NOT_FOUND, "Flight not found").into_response())
        }
        // Sold out answers 200 with plain text; clients key off the message.
        Err(AllocationError::SoldOut(_)) => Ok("No seats available".into_response()),
        Err(err) => Err(AppError::InternalServerError(err.to_string())),
    }
}
