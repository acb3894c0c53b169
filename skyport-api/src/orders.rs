use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use skyport_core::projection::{DetailProjector, ListProjector, OrderListView, OrderView, Projector};
use skyport_order::CreateOrderRequest;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/orders", get(list_orders).post(create_order))
}

/// GET /api/orders
///
/// Orders of the calling user, newest first.
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<OrderListView>>, AppError> {
    let orders = state.orders.list_orders(claims.sub).await?;
    Ok(Json(orders.iter().map(|o| ListProjector.order(o)).collect()))
}

/// POST /api/orders
///
/// The response is built from the committed placement, never re-read.
async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), AppError> {
    let placed = state.placement.place(claims.sub, &req).await?;
    Ok((StatusCode::CREATED, Json(DetailProjector.placed(&placed))))
}
