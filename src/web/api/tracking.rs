use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::geo::Observer;
use crate::tracker::SessionSnapshot;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectionRequest {
    pub satellites: Vec<String>,
}

/// Either explicit coordinates or a Maidenhead locator.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ObserverRequest {
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub locator: Option<String>,
    #[serde(default)]
    pub altitude_m: f64,
}

impl ObserverRequest {
    fn into_observer(self) -> ApiResult<Observer> {
        match (self.latitude_deg, self.longitude_deg, self.locator) {
            (Some(lat), Some(lon), _) => Ok(Observer::new(lat, lon, self.altitude_m)?),
            (None, None, Some(locator)) => {
                Ok(Observer::from_locator(&locator, Some(self.altitude_m))?)
            }
            _ => Err(ApiError::Validation(
                "give latitude_deg and longitude_deg, or a locator".into(),
            )),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/tracking",
    responses(
        (status = 200, description = "Current tracking snapshot", body = SessionSnapshot)
    ),
    tag = "tracking"
)]
pub async fn get_tracking(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.session.lock().await;
    Ok(Json(session.snapshot()))
}

#[utoipa::path(
    put,
    path = "/api/tracking/selection",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Selection replaced", body = SessionSnapshot),
        (status = 404, description = "Satellite not in catalog", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn put_selection(
    State(state): State<AppState>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let now = state.now();
    let mut session = state.session.lock().await;
    session.set_selection(&request.satellites, now)?;
    Ok(Json(session.snapshot()))
}

#[utoipa::path(
    post,
    path = "/api/tracking/stop",
    responses(
        (status = 200, description = "Tracking stopped", body = SessionSnapshot)
    ),
    tag = "tracking"
)]
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let mut session = state.session.lock().await;
    session.stop();
    Ok(Json(session.snapshot()))
}

#[utoipa::path(
    post,
    path = "/api/tracking/start",
    responses(
        (status = 200, description = "Tracking started if anything is selected", body = SessionSnapshot)
    ),
    tag = "tracking"
)]
pub async fn start(State(state): State<AppState>) -> ApiResult<Json<SessionSnapshot>> {
    let now = state.now();
    let mut session = state.session.lock().await;
    session.start(now);
    Ok(Json(session.snapshot()))
}

#[utoipa::path(
    put,
    path = "/api/tracking/observer",
    request_body = ObserverRequest,
    responses(
        (status = 200, description = "Observer moved", body = SessionSnapshot),
        (status = 400, description = "Invalid coordinates or locator", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn put_observer(
    State(state): State<AppState>,
    Json(request): Json<ObserverRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let observer = request.into_observer()?;
    let mut session = state.session.lock().await;
    session.set_observer(observer);
    Ok(Json(session.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::api::test_support::app_state;
    use crate::tracker::SessionState;

    #[tokio::test]
    async fn selection_activates_and_stop_idles() {
        let state = app_state();

        let Json(snapshot) = put_selection(
            State(state.clone()),
            Json(SelectionRequest {
                satellites: vec!["ISS (ZARYA)".into()],
            }),
        )
        .await
        .unwrap();
        assert!(matches!(snapshot.state, SessionState::Active { .. }));
        assert_eq!(snapshot.selection, vec!["ISS (ZARYA)"]);

        let Json(snapshot) = stop(State(state.clone())).await.unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);

        let Json(snapshot) = start(State(state)).await.unwrap();
        assert!(matches!(snapshot.state, SessionState::Active { .. }));
    }

    #[tokio::test]
    async fn unknown_satellite_is_not_found() {
        let err = put_selection(
            State(app_state()),
            Json(SelectionRequest {
                satellites: vec!["NOPE".into()],
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::UnknownSatellite(name) if name == "NOPE"));
    }

    #[tokio::test]
    async fn observer_from_locator_or_coordinates() {
        let state = app_state();

        let Json(snapshot) = put_observer(
            State(state.clone()),
            Json(ObserverRequest {
                latitude_deg: None,
                longitude_deg: None,
                locator: Some("JN18".into()),
                altitude_m: 35.0,
            }),
        )
        .await
        .unwrap();
        assert_eq!(snapshot.observer.latitude_deg, 48.5);
        assert_eq!(snapshot.observer.longitude_deg, 3.0);
        assert_eq!(snapshot.observer.altitude_m, 35.0);
        assert_eq!(snapshot.observer_locator.as_deref(), Some("JN18mm"));

        let err = put_observer(
            State(state),
            Json(ObserverRequest {
                latitude_deg: Some(120.0),
                longitude_deg: Some(0.0),
                locator: None,
                altitude_m: 0.0,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
