//! REST API server module
//!
//! Provides an OpenAPI 3.1 compliant REST API for the owner registry, pets and
//! visits, and the owner CSV export.

use crate::{Config, Database, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Owners
/// - `GET /owners` - Search owners (paginated)
/// - `POST /owners` - Register an owner
/// - `GET /owners/:id` - Get single owner
/// - `PUT /owners/:id` - Update owner
///
/// ## Pets and visits
/// - `GET /pet-types` - List pet types
/// - `GET /owners/:id/pets` - List an owner's pets
/// - `POST /owners/:id/pets` - Add a pet
/// - `GET /owners/:id/pets/:pet_id/visits` - List a pet's visits
/// - `POST /owners/:id/pets/:pet_id/visits` - Book a visit
/// - `GET /visits/upcoming` - Upcoming visits, filtered by date range, pet type, owner
///
/// ## Export
/// - `GET /owners.csv` - Download matching owners as CSV
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(db: Arc<Database>, config: Arc<Config>) -> Router {
    let state = AppState::new(db, config.clone());

    let router = Router::new()
        // Owners
        .route("/owners", get(routes::list_owners))
        .route("/owners", post(routes::create_owner))
        .route("/owners/:id", get(routes::get_owner))
        .route("/owners/:id", put(routes::update_owner))
        // Pets and visits
        .route("/pet-types", get(routes::list_pet_types))
        .route("/owners/:id/pets", get(routes::list_pets))
        .route("/owners/:id/pets", post(routes::create_pet))
        .route("/owners/:id/pets/:pet_id/visits", get(routes::list_visits))
        .route("/owners/:id/pets/:pet_id/visits", post(routes::create_visit))
        .route("/visits/upcoming", get(routes::upcoming_visits))
        // Export
        .route("/owners.csv", get(routes::export_owners_csv))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config (outermost)
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin. The export's
/// `Content-Disposition` header is exposed so browser clients can read the
/// download filename.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    let layer = if allow_any || origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
    };

    layer
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([axum::http::header::CONTENT_DISPOSITION])
}

/// Start the API server on the configured bind address.
///
/// Serves until `shutdown` resolves, then stops accepting connections and
/// lets in-flight requests finish.
///
/// # Example
///
/// ```no_run
/// use petclinic::{Config, Database};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let db = Arc::new(Database::new(&config.persistence.database_path).await?);
///
/// // Blocks until Ctrl+C / SIGTERM
/// petclinic::api::start_api_server(db, config, petclinic::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(db: Arc<Database>, config: Arc<Config>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(db, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
