//! HTTP request handlers for the bootcamp service.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, RawQuery, State,
    },
    http::{StatusCode, Uri},
    Json,
};
use bootcamp::query::Pagination;
use bootcamp::{Bootcamp, ListQuery};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::AppState;

/// A single bootcamp.
#[derive(Debug, Serialize, ToSchema)]
pub struct BootcampResponse {
    pub success: bool,
    /// The bootcamp document.
    #[schema(value_type = Object)]
    pub data: Value,
}

/// A page of bootcamps.
#[derive(Debug, Serialize, ToSchema)]
pub struct BootcampListResponse {
    pub success: bool,
    /// Number of documents in `data`.
    pub count: usize,
    /// Links to the neighbouring pages, when they exist.
    #[schema(value_type = Object)]
    pub pagination: Pagination,
    /// Documents, restricted to the selected fields.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

/// Bootcamps found by a radius search.
#[derive(Debug, Serialize, ToSchema)]
pub struct RadiusResponse {
    pub success: bool,
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

/// Confirmation of a deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub msg: String,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Collection and geocoder cache statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of stored bootcamps.
    pub bootcamps: u64,
    /// Number of geocoder answers in cache.
    pub cached_queries: u64,
    /// Maximum number of cached geocoder answers.
    pub cache_capacity: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

fn document(bootcamp: &Bootcamp) -> Result<Value, ApiError> {
    Ok(bootcamp.to_document()?)
}

fn documents(bootcamps: &[Bootcamp]) -> Result<Vec<Value>, ApiError> {
    bootcamps.iter().map(document).collect()
}

/// An id segment that cannot be decoded names no bootcamp.
fn bootcamp_id(id: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Undecodable bootcamp id");
            Err(ApiError::new(StatusCode::NOT_FOUND, "Bootcamp not found"))
        }
    }
}

/// List bootcamps.
///
/// Every query parameter other than `select`, `sort`, `page` and `limit` is a
/// filter: `field=value`, `field[gt|gte|lt|lte|in]=value`, or a nested field
/// such as `location[state]=MA`.
#[utoipa::path(
    get,
    path = "/bootcamps",
    tag = "bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort fields, `-` for descending (default `-createdAt`)"),
        ("page" = Option<u64>, Query, description = "Page number, from 1 (default 1)"),
        ("limit" = Option<u64>, Query, description = "Page size (default 25)"),
    ),
    responses(
        (status = 200, description = "A page of bootcamps", body = BootcampListResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_bootcamps(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<BootcampListResponse>, ApiError> {
    let query = ListQuery::parse(query.as_deref().unwrap_or_default());
    let page = state.service.list(&query).await?;

    Ok(Json(BootcampListResponse {
        success: true,
        count: page.data.len(),
        pagination: page.pagination,
        data: page.data,
    }))
}

/// Get a single bootcamp.
#[utoipa::path(
    get,
    path = "/bootcamps/{id}",
    tag = "bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "The bootcamp", body = BootcampResponse),
        (status = 404, description = "No bootcamp with this id", body = ErrorResponse)
    )
)]
pub async fn get_bootcamp(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<BootcampResponse>, ApiError> {
    let id = bootcamp_id(id)?;
    let bootcamp = state.service.get(&id).await?;
    Ok(Json(BootcampResponse {
        success: true,
        data: document(&bootcamp)?,
    }))
}

/// Create a bootcamp.
///
/// The body is a bootcamp object, optionally wrapped as `{"bootcamp": {...}}`.
#[utoipa::path(
    post,
    path = "/bootcamps",
    tag = "bootcamps",
    responses(
        (status = 201, description = "Bootcamp created", body = BootcampResponse),
        (status = 400, description = "Invalid or duplicate bootcamp", body = ErrorResponse)
    )
)]
pub async fn create_bootcamp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BootcampResponse>), ApiError> {
    let Json(payload) = payload?;
    let bootcamp = state.service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(BootcampResponse {
            success: true,
            data: document(&bootcamp)?,
        }),
    ))
}

/// Update a bootcamp.
///
/// Fields in the body replace the stored ones; `id` and `createdAt` are
/// ignored. The merged document is validated again.
#[utoipa::path(
    put,
    path = "/bootcamps/{id}",
    tag = "bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Updated bootcamp", body = BootcampResponse),
        (status = 400, description = "Merged bootcamp is invalid", body = ErrorResponse),
        (status = 404, description = "No bootcamp with this id", body = ErrorResponse)
    )
)]
pub async fn update_bootcamp(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BootcampResponse>, ApiError> {
    let id = bootcamp_id(id)?;
    let Json(payload) = payload?;
    let bootcamp = state.service.update(&id, payload).await?;
    Ok(Json(BootcampResponse {
        success: true,
        data: document(&bootcamp)?,
    }))
}

/// Delete a bootcamp.
#[utoipa::path(
    delete,
    path = "/bootcamps/{id}",
    tag = "bootcamps",
    params(("id" = String, Path, description = "Bootcamp id")),
    responses(
        (status = 200, description = "Bootcamp deleted", body = DeleteResponse),
        (status = 404, description = "No bootcamp with this id", body = ErrorResponse)
    )
)]
pub async fn delete_bootcamp(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = bootcamp_id(id)?;
    state.service.delete(&id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        msg: "Successfully deleted".to_string(),
    }))
}

/// Find bootcamps within a distance of a postal code.
#[utoipa::path(
    get,
    path = "/bootcamps/radius/{zipcode}/{distance}",
    tag = "bootcamps",
    params(
        ("zipcode" = String, Path, description = "Postal code to search around"),
        ("distance" = f64, Path, description = "Radius in miles")
    ),
    responses(
        (status = 200, description = "Bootcamps within the radius", body = RadiusResponse),
        (status = 400, description = "Invalid distance", body = ErrorResponse),
        (status = 404, description = "Postal code could not be geocoded", body = ErrorResponse),
        (status = 502, description = "Geocoder unavailable", body = ErrorResponse)
    )
)]
pub async fn bootcamps_in_radius(
    State(state): State<Arc<AppState>>,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<RadiusResponse>, ApiError> {
    let Path((zipcode, distance)) = params?;
    let distance: f64 = distance.trim().parse().map_err(|_| {
        ApiError::bad_request(format!("Invalid distance '{}': expected miles", distance))
    })?;

    let bootcamps = state.service.within_radius(&zipcode, distance).await?;
    Ok(Json(RadiusResponse {
        success: true,
        count: bootcamps.len(),
        data: documents(&bootcamps)?,
    }))
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get collection size and geocoder cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses((status = 200, description = "Service statistics", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let bootcamps = state.service.count().await?;
    let stats = state.service.cache_stats();

    Ok(Json(StatsResponse {
        bootcamps,
        cached_queries: stats.entry_count,
        cache_capacity: state.service.cache_capacity(),
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    }))
}

/// Fallback for requests that match no route.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        format!("Route {} not found", uri.path()),
    )
}
