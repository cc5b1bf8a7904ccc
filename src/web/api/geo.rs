use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::geo::{footprint_with_step, locator_to_lat_lon, position_at, Footprint};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FootprintQuery {
    pub satellite: String,
    /// RFC3339, defaults to now.
    pub time: Option<DateTime<Utc>>,
    /// Defaults to the session's minimum elevation.
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocatorResponse {
    pub locator: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[utoipa::path(
    get,
    path = "/api/footprint",
    params(FootprintQuery),
    responses(
        (status = 200, description = "Visibility circle of the satellite", body = Footprint),
        (status = 400, description = "Minimum elevation outside [0, 90)", body = ErrorResponse),
        (status = 404, description = "Unknown satellite, or no footprint at that time", body = ErrorResponse)
    ),
    tag = "geo"
)]
pub async fn get_footprint(
    State(state): State<AppState>,
    Query(query): Query<FootprintQuery>,
) -> ApiResult<Json<Footprint>> {
    let (elements, default_min_elevation, step) = {
        let session = state.session.lock().await;
        let elements = session
            .catalog()
            .get(&query.satellite)
            .ok_or_else(|| ApiError::UnknownSatellite(query.satellite.clone()))?;
        let settings = session.settings();
        (elements, settings.min_elevation_deg, settings.footprint_step_deg)
    };

    let time = query.time.unwrap_or_else(|| state.now());
    let min_elevation = query.min_elevation.unwrap_or(default_min_elevation);
    if !(0.0..90.0).contains(&min_elevation) {
        return Err(ApiError::Validation(format!(
            "min_elevation {} outside [0, 90)",
            min_elevation
        )));
    }

    position_at(&elements, time)
        .and_then(|position| footprint_with_step(&position, min_elevation, step))
        .map(Json)
        .ok_or(ApiError::NotFound("no_footprint"))
}

#[utoipa::path(
    get,
    path = "/api/locator/{locator}",
    params(
        ("locator" = String, Path, description = "Maidenhead locator, 4, 6 or 8 characters")
    ),
    responses(
        (status = 200, description = "Centre of the grid square", body = LocatorResponse),
        (status = 400, description = "Malformed locator", body = ErrorResponse)
    ),
    tag = "geo"
)]
pub async fn get_locator(Path(locator): Path<String>) -> ApiResult<Json<LocatorResponse>> {
    let center = locator_to_lat_lon(&locator)?;
    Ok(Json(LocatorResponse {
        locator: locator.trim().to_string(),
        latitude_deg: center.latitude_deg,
        longitude_deg: center.longitude_deg,
    }))
}
