//! Reference data: crews, countries, cities, airports, routes, airplane types
//! and airplanes. Any authenticated user may list; only staff may create.

use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use skyport_catalog::{
    Airplane, AirplaneType, Airport, City, Country, Crew, NewAirplane, NewAirplaneType,
    NewAirport, NewCity, NewCountry, NewCrew, NewRoute, Route,
};
use skyport_core::projection::{
    airplane_view, airport_view, city_view, crew_view, AirplaneView, AirportView, CityView,
    CrewView, DetailProjector, Projector, RouteView,
};

use crate::error::AppError;
use crate::middleware::auth::{require_staff, Claims};
use crate::state::AppState;

type Created<T> = (StatusCode, Json<T>);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/crews", get(list_crews).post(create_crew))
        .route("/countries", get(list_countries).post(create_country))
        .route("/cities", get(list_cities).post(create_city))
        .route("/airports", get(list_airports).post(create_airport))
        .route("/routes", get(list_routes).post(create_route))
        .route(
            "/airplane_types",
            get(list_airplane_types).post(create_airplane_type),
        )
        .route("/airplanes", get(list_airplanes).post(create_airplane))
}

async fn list_crews(State(state): State<AppState>) -> Result<Json<Vec<CrewView>>, AppError> {
    let crews = state.catalog.list_crews().await?;
    Ok(Json(crews.iter().map(crew_view).collect()))
}

async fn create_crew(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewCrew>,
) -> Result<Created<Crew>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_crew(&req).await?)))
}

async fn list_countries(State(state): State<AppState>) -> Result<Json<Vec<Country>>, AppError> {
    Ok(Json(state.catalog.list_countries().await?))
}

async fn create_country(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewCountry>,
) -> Result<Created<Country>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_country(&req).await?)))
}

async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<CityView>>, AppError> {
    let cities = state.catalog.list_cities().await?;
    Ok(Json(cities.iter().map(city_view).collect()))
}

async fn create_city(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewCity>,
) -> Result<Created<City>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_city(&req).await?)))
}

async fn list_airports(State(state): State<AppState>) -> Result<Json<Vec<AirportView>>, AppError> {
    let airports = state.catalog.list_airports().await?;
    Ok(Json(airports.iter().map(airport_view).collect()))
}

async fn create_airport(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewAirport>,
) -> Result<Created<Airport>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_airport(&req).await?)))
}

async fn list_routes(State(state): State<AppState>) -> Result<Json<Vec<RouteView>>, AppError> {
    let routes = state.catalog.list_routes().await?;
    Ok(Json(routes.iter().map(|r| DetailProjector.route(r)).collect()))
}

async fn create_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewRoute>,
) -> Result<Created<Route>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_route(&req).await?)))
}

async fn list_airplane_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<AirplaneType>>, AppError> {
    Ok(Json(state.catalog.list_airplane_types().await?))
}

async fn create_airplane_type(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewAirplaneType>,
) -> Result<Created<AirplaneType>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((
        StatusCode::CREATED,
        Json(state.catalog.create_airplane_type(&req).await?),
    ))
}

async fn list_airplanes(
    State(state): State<AppState>,
) -> Result<Json<Vec<AirplaneView>>, AppError> {
    let airplanes = state.catalog.list_airplanes().await?;
    Ok(Json(airplanes.iter().map(airplane_view).collect()))
}

async fn create_airplane(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewAirplane>,
) -> Result<Created<Airplane>, AppError> {
    require_staff(&claims)?;
    req.validate()?;
    Ok((StatusCode::CREATED, Json(state.catalog.create_airplane(&req).await?)))
}
