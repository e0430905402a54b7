use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::sensors::{NewSensor, Sensor};

use super::types::SensorsQuery;

/// Create a sensor
#[utoipa::path(
    post,
    path = "/api/sensors",
    request_body = NewSensor,
    responses(
        (status = 201, description = "Sensor created", body = Sensor),
    ),
    tag = "sensors"
)]
pub async fn create_sensor(
    State(state): State<AppState>,
    Json(body): Json<NewSensor>,
) -> AppResult<(StatusCode, Json<Sensor>)> {
    let cx = state.request_context();
    let sensor = state.sensors.create(&cx, body).await?;

    tracing::debug!(id = %sensor.id, site_id = %sensor.site_id, "Sensor created");
    Ok((StatusCode::CREATED, Json(sensor)))
}

/// List the sensors of a site
#[utoipa::path(
    get,
    path = "/api/sensors",
    params(SensorsQuery),
    responses(
        (status = 200, description = "Sensors retrieved successfully", body = Vec<Sensor>),
        (status = 400, description = "siteId missing"),
    ),
    tag = "sensors"
)]
pub async fn list_sensors(
    State(state): State<AppState>,
    Query(query): Query<SensorsQuery>,
) -> AppResult<Json<Vec<Sensor>>> {
    let site_id = query
        .site_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("siteId is required".to_string()))?;

    let cx = state.request_context();
    let sensors = state.sensors.all(&cx, &site_id).await?;

    Ok(Json(sensors))
}

/// Get a sensor by ID
#[utoipa::path(
    get,
    path = "/api/sensors/{id}",
    params(
        ("id" = String, Path, description = "Sensor ID"),
    ),
    responses(
        (status = 200, description = "Sensor found", body = Sensor),
        (status = 404, description = "Sensor not found"),
    ),
    tag = "sensors"
)]
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Sensor>> {
    let cx = state.request_context();

    state
        .sensors
        .get(&cx, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Sensor '{id}' not found")))
}

/// Replace a sensor's fields
#[utoipa::path(
    put,
    path = "/api/sensors/{id}",
    params(
        ("id" = String, Path, description = "Sensor ID"),
    ),
    request_body = NewSensor,
    responses(
        (status = 204, description = "Sensor updated"),
        (status = 404, description = "Sensor not found"),
    ),
    tag = "sensors"
)]
pub async fn update_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<NewSensor>,
) -> AppResult<StatusCode> {
    let sensor = Sensor {
        id,
        site_id: body.site_id,
        name: body.name,
        unit: body.unit,
        min_safe: body.min_safe,
        max_safe: body.max_safe,
    };

    let cx = state.request_context();
    match state.sensors.update(&cx, &sensor).await? {
        0 => Err(AppError::NotFound(format!("Sensor '{}' not found", sensor.id))),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// Delete a sensor
///
/// Deleting a sensor that does not exist also succeeds.
#[utoipa::path(
    delete,
    path = "/api/sensors/{id}",
    params(
        ("id" = String, Path, description = "Sensor ID"),
    ),
    responses(
        (status = 204, description = "Sensor deleted"),
    ),
    tag = "sensors"
)]
pub async fn delete_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let cx = state.request_context();
    state.sensors.delete(&cx, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
