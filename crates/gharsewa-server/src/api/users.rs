use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gharsewa_core::GeoPoint;
use gharsewa_db::DbError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct UserItem {
    pub id: String,
    pub name: String,
    pub role: String,
    pub location: Option<GeoPoint>,
    pub skills: Option<String>,
    pub average_rating: Option<f64>,
    pub total_reviews: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationRecorded {
    pub id: String,
    pub location: GeoPoint,
}

/// GET /api/v1/users/:id: a single directory entry.
pub(super) async fn get_user(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserItem>>, ApiError> {
    let rid = &req_id.0;

    let row = gharsewa_db::get_user(state.directory.pool(), &id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &DbError::from(e)))?
        .ok_or_else(|| ApiError::user_not_found(rid, &id))?;

    let location = row.location();
    let average_rating = row.average_rating_f64();

    Ok(Json(ApiResponse {
        data: UserItem {
            id: row.id,
            name: row.name,
            role: row.role,
            location,
            skills: row.skills,
            average_rating,
            total_reviews: row.total_reviews,
            updated_at: row.updated_at,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PUT /api/v1/users/:id/location: record the caller's last known location.
///
/// The caller's identity is the path id; nothing is read from ambient session
/// state.
pub(super) async fn record_user_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<LocationRequest>,
) -> Result<Json<ApiResponse<LocationRecorded>>, ApiError> {
    let rid = &req_id.0;

    let point = GeoPoint::try_new(body.latitude, body.longitude)
        .map_err(|e| ApiError::validation(rid, e.to_string()))?;

    match gharsewa_core::record_location(&state.directory, &id, point).await {
        Ok(()) => {}
        Err(DbError::NotFound) => {
            return Err(ApiError::user_not_found(rid, &id));
        }
        Err(e) => return Err(map_db_error(rid.clone(), &e)),
    }

    tracing::info!(user_id = %id, point = %point, "recorded user location");

    Ok(Json(ApiResponse {
        data: LocationRecorded {
            id,
            location: point,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
