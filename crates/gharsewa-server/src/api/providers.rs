use axum::{
    extract::{Query, State},
    Extension, Json,
};
use gharsewa_core::{GeoPoint, RankOptions, RankedResult, Role};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub limit: Option<i64>,
    /// `provider` (default), `customer`, or `all`.
    pub role: Option<String>,
    /// Id to leave out of the results, usually the caller's own.
    pub exclude: Option<String>,
}

pub(super) fn parse_role_filter(request_id: &str, raw: Option<&str>) -> Result<Option<Role>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(Role::Provider)),
        Some(r) if r.eq_ignore_ascii_case("all") => Ok(None),
        Some(r) => r
            .parse::<Role>()
            .map(Some)
            .map_err(|e| ApiError::validation(request_id, e.to_string())),
    }
}

/// GET /api/v1/providers/nearby: rank directory entries by distance.
///
/// Each item is the flattened candidate (with its `location`) plus `distance_km`.
pub(super) async fn list_nearby_providers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<RankedResult>>>, ApiError> {
    let rid = &req_id.0;

    let (Some(latitude), Some(longitude)) = (params.latitude, params.longitude) else {
        return Err(ApiError::validation(
            rid,
            "latitude and longitude are required",
        ));
    };
    let origin = GeoPoint::try_new(latitude, longitude)
        .map_err(|e| ApiError::validation(rid, e.to_string()))?;

    let options = RankOptions {
        role: parse_role_filter(rid, params.role.as_deref())?,
        limit: Some(normalize_limit(params.limit, state.limits)),
        exclude_id: params.exclude.filter(|id| !id.trim().is_empty()),
    };

    let ranked = gharsewa_core::nearby(&state.directory, origin, &options)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(
        origin = %origin,
        role = ?options.role,
        results = ranked.len(),
        "served nearby providers"
    );

    Ok(Json(ApiResponse {
        data: ranked,
        meta: ResponseMeta::new(req_id.0),
    }))
}
