use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::geo::Observer;
use crate::predict::{predict_mutual_passes, MutualPass, OrbitalElementSet, Pass, PassSearch};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteSummary {
    pub name: String,
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PassQuery {
    /// Catalog name; every satellite when omitted.
    pub satellite: Option<String>,
    /// RFC3339, defaults to now.
    pub start: Option<DateTime<Utc>>,
    /// RFC3339, defaults to start plus the session's prediction window.
    pub end: Option<DateTime<Utc>>,
    pub min_elevation: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PassesResponse {
    pub passes: Vec<Pass>,
    pub satellite_count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MutualQuery {
    pub satellite: String,
    /// Locator of the second station.
    pub locator: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub min_elevation: Option<f64>,
}

/// Everything needed to predict outside the session lock.
struct PredictionInput {
    satellites: Vec<Arc<OrbitalElementSet>>,
    observer: Observer,
    search: PassSearch,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
}

async fn prediction_input(
    state: &AppState,
    satellite: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    min_elevation: Option<f64>,
) -> ApiResult<PredictionInput> {
    let session = state.session.lock().await;
    let settings = session.settings();

    let satellites = match satellite {
        Some(name) => vec![session
            .catalog()
            .get(name)
            .ok_or_else(|| ApiError::UnknownSatellite(name.to_string()))?],
        None => session.catalog().satellites().cloned().collect(),
    };

    let start = start.unwrap_or_else(|| state.now());
    let end = match end {
        Some(end) => end,
        None => start
            .checked_add_signed(settings.prediction_window)
            .ok_or_else(|| ApiError::Validation("start is too far in the future".into()))?,
    };
    if end <= start {
        return Err(ApiError::Validation("end must be after start".into()));
    }
    let min_elevation = min_elevation.unwrap_or(settings.min_elevation_deg);
    if !(-90.0..=90.0).contains(&min_elevation) {
        return Err(ApiError::Validation(format!(
            "min_elevation {} out of range",
            min_elevation
        )));
    }

    Ok(PredictionInput {
        satellites,
        observer: *session.observer(),
        search: settings.pass_search,
        start,
        end,
        min_elevation,
    })
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    responses(
        (status = 200, description = "Satellites in the element catalog", body = Vec<SatelliteSummary>)
    ),
    tag = "predict"
)]
pub async fn list_satellites(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<SatelliteSummary>>> {
    let session = state.session.lock().await;
    let satellites = session
        .catalog()
        .satellites()
        .map(|sat| SatelliteSummary {
            name: sat.name().to_string(),
            norad_id: sat.norad_id(),
            epoch: sat.epoch(),
        })
        .collect();
    Ok(Json(satellites))
}

#[utoipa::path(
    get,
    path = "/api/passes",
    params(PassQuery),
    responses(
        (status = 200, description = "Passes over the session observer", body = PassesResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Satellite not in catalog", body = ErrorResponse)
    ),
    tag = "predict"
)]
pub async fn list_passes(
    State(state): State<AppState>,
    Query(query): Query<PassQuery>,
) -> ApiResult<Json<PassesResponse>> {
    let input = prediction_input(
        &state,
        query.satellite.as_deref(),
        query.start,
        query.end,
        query.min_elevation,
    )
    .await?;

    let mut passes = Vec::new();
    for sat in &input.satellites {
        passes.extend(input.search.predict(
            sat.as_ref(),
            sat.name(),
            &input.observer,
            input.start,
            input.end,
            input.min_elevation,
        ));
    }
    passes.sort_by_key(|p| p.start);

    let satellite_count = passes
        .iter()
        .map(|p| p.satellite.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(Json(PassesResponse {
        passes,
        satellite_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/passes/mutual",
    params(MutualQuery),
    responses(
        (status = 200, description = "Windows where both stations see the satellite", body = Vec<MutualPass>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "Satellite not in catalog", body = ErrorResponse)
    ),
    tag = "predict"
)]
pub async fn list_mutual_passes(
    State(state): State<AppState>,
    Query(query): Query<MutualQuery>,
) -> ApiResult<Json<Vec<MutualPass>>> {
    let remote = Observer::from_locator(&query.locator, None)?;
    let input = prediction_input(
        &state,
        Some(&query.satellite),
        query.start,
        query.end,
        query.min_elevation,
    )
    .await?;

    let mut mutual = Vec::new();
    for sat in &input.satellites {
        mutual.extend(predict_mutual_passes(
            sat.as_ref(),
            sat.name(),
            &input.observer,
            &remote,
            input.start,
            input.end,
            input.min_elevation,
            &input.search,
        ));
    }
    Ok(Json(mutual))
}
