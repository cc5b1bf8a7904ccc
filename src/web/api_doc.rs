use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::geo::LocatorResponse;
use super::api::predict::{PassesResponse, SatelliteSummary};
use super::api::tracking::{ObserverRequest, SelectionRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracking::get_tracking,
        super::api::tracking::put_selection,
        super::api::tracking::start,
        super::api::tracking::stop,
        super::api::tracking::put_observer,
        super::api::predict::list_satellites,
        super::api::predict::list_passes,
        super::api::predict::list_mutual_passes,
        super::api::geo::get_footprint,
        super::api::geo::get_locator,
    ),
    components(
        schemas(
            ErrorResponse,
            SelectionRequest,
            ObserverRequest,
            PassesResponse,
            SatelliteSummary,
            LocatorResponse,
            crate::tracker::SessionSnapshot,
            crate::tracker::SessionState,
            crate::tracker::TrackedSatellite,
            crate::predict::Pass,
            crate::predict::MutualPass,
            crate::geo::Footprint,
            crate::geo::Observer,
        )
    ),
    info(
        title = "Sat-O-Scope Tracking API",
        description = "Live satellite tracking, pass predictions and footprints",
        version = "0.1.0"
    ),
    tags(
        (name = "tracking", description = "Live tracking session"),
        (name = "predict", description = "Pass predictions"),
        (name = "geo", description = "Footprints and grid locators")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/tracking",
            "/api/tracking/selection",
            "/api/tracking/start",
            "/api/tracking/stop",
            "/api/tracking/observer",
            "/api/satellites",
            "/api/passes",
            "/api/passes/mutual",
            "/api/footprint",
            "/api/locator/{locator}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
