use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use models::Car;
use serde_json::{json, Value};
use service::errors::ServiceError;
use tracing::{error, info};

use crate::{errors::ApiError, routes::ServerState};

/// Decode a car from the raw body regardless of `Content-Type`.
/// A JSON `null` yields an empty car; syntax and type errors are rejected.
fn car_from_body(body: Result<Bytes, BytesRejection>) -> Result<Car, ApiError> {
    let body = body?;
    let car: Option<Car> = serde_json::from_slice(&body)?;
    Ok(car.unwrap_or_default())
}

/// POST /cars
pub async fn create_car(
    State(state): State<ServerState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Car>), ApiError> {
    let car = car_from_body(body)?;
    match state.cars.create(car).await {
        Ok(car) => Ok((StatusCode::CREATED, Json(car))),
        Err(e) => {
            error!(err = %e, "create car failed");
            Err(ApiError::Internal("Failed to insert car"))
        }
    }
}

/// GET /cars
pub async fn list_cars(State(state): State<ServerState>) -> Result<Json<Vec<Car>>, ApiError> {
    match state.cars.list().await {
        Ok(cars) => {
            info!(count = cars.len(), "list cars");
            Ok(Json(cars))
        }
        Err(e @ ServiceError::Decode(_)) => {
            error!(err = %e, "decode car failed");
            Err(ApiError::Internal("Failed to decode car"))
        }
        Err(e) => {
            error!(err = %e, "list cars failed");
            Err(ApiError::Internal("Failed to retrieve cars"))
        }
    }
}

/// GET /cars/:name
pub async fn get_car(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Car>, ApiError> {
    let Path(name) = path?;
    match state.cars.get(&name).await {
        Ok(car) => Ok(Json(car)),
        Err(ServiceError::NotFound(msg)) => Err(ApiError::NotFound(msg)),
        Err(e) => {
            error!(err = %e, %name, "get car failed");
            Err(ApiError::Internal("Failed to retrieve car"))
        }
    }
}

/// PUT /cars/:name
///
/// Responds with the submitted car whether or not a document matched.
pub async fn update_car(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Car>, ApiError> {
    let Path(name) = path?;
    let car = car_from_body(body)?;
    match state.cars.update(&name, car).await {
        Ok(car) => Ok(Json(car)),
        Err(e) => {
            error!(err = %e, %name, "update car failed");
            Err(ApiError::Internal("Failed to update car"))
        }
    }
}

/// DELETE /cars/:name
pub async fn delete_car(
    State(state): State<ServerState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(name) = path?;
    match state.cars.delete(&name).await {
        Ok(_) => Ok(Json(json!({"message": "car deleted"}))),
        Err(e) => {
            error!(err = %e, %name, "delete car failed");
            Err(ApiError::Internal("Failed to delete car"))
        }
    }
}
