use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use skyport_catalog::{Flight, NewFlight};
use skyport_core::projection::{DetailProjector, FlightDetailView, FlightListView, ListProjector, Projector};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{require_staff, Claims};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights).post(create_flight))
        .route("/flights/{id}", get(get_flight))
}

/// GET /api/flights
async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<FlightListView>>, AppError> {
    let flights = state.catalog.list_flights().await?;
    Ok(Json(flights.iter().map(|f| ListProjector.flight(f)).collect()))
}

/// GET /api/flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlightDetailView>, AppError> {
    let flight = state.catalog.get_flight(id).await?;
    Ok(Json(DetailProjector.flight(&flight)))
}

/// POST /api/flights
async fn create_flight(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewFlight>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    require_staff(&claims)?;
    req.validate()?;
    let flight = state.catalog.create_flight(&req).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}
