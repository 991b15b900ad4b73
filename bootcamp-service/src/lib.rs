//! Bootcamp Service Library
//!
//! HTTP handlers, router and OpenAPI document for the bootcamp directory.
//! This library is used by both the bootcamp-service binary and integration
//! tests.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use bootcamp::BootcampService;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Default prefix of the bootcamp routes.
pub const DEFAULT_BASE_PATH: &str = "/api/v1.0.0";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Application state shared across handlers.
pub struct AppState {
    /// Store and geocoder handles.
    pub service: BootcampService,
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Prefix for the bootcamp routes, e.g. `/api/v1.0.0`.
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `BOOTCAMP_PORT` and `BOOTCAMP_BASE_PATH`, falling back to the
    /// defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        let port = std::env::var("BOOTCAMP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let base_path = std::env::var("BOOTCAMP_BASE_PATH")
            .map(|s| normalize_base_path(&s))
            .unwrap_or_else(|_| DEFAULT_BASE_PATH.to_string());

        Self { port, base_path }
    }
}

/// Ensure a leading slash and drop trailing ones. The root becomes `""`.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Bootcamp resource endpoints, relative to the base path.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_bootcamps,
        handlers::create_bootcamp,
        handlers::get_bootcamp,
        handlers::update_bootcamp,
        handlers::delete_bootcamp,
        handlers::bootcamps_in_radius,
    ),
    components(schemas(
        handlers::BootcampResponse,
        handlers::BootcampListResponse,
        handlers::RadiusResponse,
        handlers::DeleteResponse,
        handlers::ErrorResponse,
    ))
)]
struct BootcampApi;

/// OpenAPI documentation for the bootcamp service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bootcamp Directory Service",
        version = "0.1.0",
        description = "REST API for coding bootcamps: filtered listing, CRUD and radius search.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(handlers::health_check, handlers::get_stats),
    components(schemas(handlers::HealthResponse, handlers::StatsResponse)),
    tags(
        (name = "bootcamps", description = "Bootcamp resource endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

/// The OpenAPI document with the bootcamp routes under `base_path`.
pub fn openapi(base_path: &str) -> utoipa::openapi::OpenApi {
    let base_path = normalize_base_path(base_path);
    if base_path.is_empty() {
        ApiDoc::openapi().merge_from(BootcampApi::openapi())
    } else {
        ApiDoc::openapi().nest(base_path, BootcampApi::openapi())
    }
}

/// Build the application router.
///
/// Bootcamp routes live under `base_path`; `/health`, `/stats`, `/docs` and
/// `/api-docs/openapi.json` stay at the root.
pub fn router(state: Arc<AppState>, base_path: &str) -> Router {
    let base_path = normalize_base_path(base_path);

    let bootcamps = Router::new()
        .route(
            "/bootcamps",
            get(handlers::list_bootcamps).post(handlers::create_bootcamp),
        )
        .route(
            "/bootcamps/:id",
            get(handlers::get_bootcamp)
                .put(handlers::update_bootcamp)
                .delete(handlers::delete_bootcamp),
        )
        .route(
            "/bootcamps/radius/:zipcode/:distance",
            get(handlers::bootcamps_in_radius),
        );

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi(&base_path)))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats));

    let app = if base_path.is_empty() {
        app.merge(bootcamps)
    } else {
        app.nest(&base_path, bootcamps)
    };

    app.fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use handlers::{
    BootcampListResponse, BootcampResponse, DeleteResponse, ErrorResponse, HealthResponse,
    RadiusResponse, StatsResponse,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("/api/v1.0.0"), "/api/v1.0.0");
        assert_eq!(normalize_base_path("api/v1/"), "/api/v1");
        assert_eq!(normalize_base_path(" / "), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn test_openapi_paths_are_prefixed() {
        let doc = openapi("/api/v1.0.0");
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/v1.0.0/bootcamps"));
        assert!(paths
            .iter()
            .any(|p| *p == "/api/v1.0.0/bootcamps/radius/{zipcode}/{distance}"));
        assert!(paths.iter().any(|p| *p == "/health"));
    }

    #[test]
    fn test_server_config_from_env() {
        std::env::remove_var("BOOTCAMP_PORT");
        std::env::remove_var("BOOTCAMP_BASE_PATH");
        assert_eq!(ServerConfig::from_env(), ServerConfig::default());

        std::env::set_var("BOOTCAMP_PORT", "5000");
        std::env::set_var("BOOTCAMP_BASE_PATH", "api/v2/");
        let config = ServerConfig::from_env();
        assert_eq!(config.port, 5000);
        assert_eq!(config.base_path, "/api/v2");

        std::env::set_var("BOOTCAMP_PORT", "not-a-port");
        assert_eq!(ServerConfig::from_env().port, DEFAULT_PORT);

        std::env::remove_var("BOOTCAMP_PORT");
        std::env::remove_var("BOOTCAMP_BASE_PATH");
    }
}
