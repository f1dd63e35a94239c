//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::domain::{Coordinate, Stop, StopCode};
use crate::ranking::rank_vehicles_near_stop;

use super::dto::*;
use super::state::AppState;
use super::ws::ws_handler;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // The tracking clients are browser apps served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/bus-stops", post(create_stop))
        .route("/api/bus-stops/:stop_code", get(get_stop))
        .route("/api/passenger/nearest-buses/:stop_code", get(nearest_buses))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        time: Utc::now(),
    })
}

/// Create or replace a stop.
async fn create_stop(
    State(state): State<AppState>,
    Json(req): Json<CreateStopRequest>,
) -> Result<(StatusCode, Json<StopDto>), AppError> {
    let code = StopCode::parse(&req.stop_code).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;
    let coordinate =
        Coordinate::new(req.latitude, req.longitude).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;

    let stop = Stop::new(code, coordinate);
    let dto = StopDto::from_stop(&stop);
    let created = state.stops.insert(stop).await;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(dto)))
}

/// Look up a stop by code.
async fn get_stop(
    State(state): State<AppState>,
    Path(stop_code): Path<String>,
) -> Result<Json<StopDto>, AppError> {
    let code = StopCode::parse(&stop_code).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let stop = state.stops.get(&code).await.ok_or_else(|| AppError::NotFound {
        message: format!("stop '{code}' not found"),
    })?;

    Ok(Json(StopDto::from_stop(&stop)))
}

/// Rank the currently-online vehicles by distance from a stop.
///
/// This is the QR-scan flow: the stop code printed at the stop comes in,
/// the nearest live buses with distance and ETA come out.
async fn nearest_buses(
    State(state): State<AppState>,
    Path(stop_code): Path<String>,
) -> Result<Json<NearestBusesResponse>, AppError> {
    let code = StopCode::parse(&stop_code).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let stop = state.stops.get(&code).await.ok_or_else(|| AppError::NotFound {
        message: format!("stop '{code}' not found"),
    })?;

    let candidates = state.registry.online_vehicles().await;
    let ranked = rank_vehicles_near_stop(&stop, candidates);

    let buses: Vec<RankedVehicleDto> = ranked.iter().map(RankedVehicleDto::from_ranked).collect();
    let count = buses.len();

    Ok(Json(NearestBusesResponse {
        stop: StopDto::from_stop(&stop),
        buses,
        count,
    }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
