//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the petclinic REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the petclinic REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation, loading `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "petclinic REST API",
        version = "0.1.0",
        description = "Owner registry for a veterinary clinic: owners, pets, visits, and bounded CSV export of owners"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Owners
        crate::api::routes::list_owners,
        crate::api::routes::create_owner,
        crate::api::routes::get_owner,
        crate::api::routes::update_owner,

        // Pets and visits
        crate::api::routes::list_pet_types,
        crate::api::routes::list_pets,
        crate::api::routes::create_pet,
        crate::api::routes::list_visits,
        crate::api::routes::create_visit,
        crate::api::routes::upcoming_visits,

        // Export
        crate::api::routes::export_owners_csv,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::Owner,
        crate::types::OwnerForm,
        crate::types::OwnerPage,
        crate::types::PetType,
        crate::types::Pet,
        crate::types::PetForm,
        crate::types::Visit,
        crate::types::VisitForm,
        crate::types::UpcomingVisit,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "owners", description = "Owner registry - Search, register, view, and edit pet owners"),
        (name = "visits", description = "Pets and visits - Register pets, book visits, view the upcoming schedule"),
        (name = "export", description = "Export - Download owners as a CSV attachment"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();

        for path in [
            "/owners",
            "/owners/{id}",
            "/owners.csv",
            "/owners/{id}/pets",
            "/owners/{id}/pets/{pet_id}/visits",
            "/pet-types",
            "/visits/upcoming",
            "/health",
            "/openapi.json",
        ] {
            assert!(
                spec.paths.paths.contains_key(path),
                "OpenAPI spec should document {}",
                path
            );
        }
    }

    #[test]
    fn test_openapi_paths_match_router() {
        // Documented paths are served at the root, with no version prefix
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.keys().all(|p| !p.starts_with("/api/")));

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["servers"][0]["url"], "http://localhost:8080");
    }

    #[test]
    fn test_openapi_spec_has_schemas() {
        let components = ApiDoc::openapi().components.unwrap();

        for schema in [
            "Owner",
            "OwnerForm",
            "OwnerPage",
            "PetType",
            "Pet",
            "PetForm",
            "Visit",
            "VisitForm",
            "UpcomingVisit",
            "ApiError",
            "ErrorDetail",
        ] {
            assert!(
                components.schemas.contains_key(schema),
                "Should have '{}' schema",
                schema
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let tags = ApiDoc::openapi().tags.unwrap();
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert!(tag_names.contains(&"owners"), "Should have 'owners' tag");
        assert!(tag_names.contains(&"visits"), "Should have 'visits' tag");
        assert!(tag_names.contains(&"export"), "Should have 'export' tag");
        assert!(tag_names.contains(&"system"), "Should have 'system' tag");
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "petclinic REST API");
        assert_eq!(spec.info.version, "0.1.0");
        assert!(spec.info.description.is_some());
    }

    #[test]
    fn test_openapi_spec_version() {
        let spec = ApiDoc::openapi();

        let json = serde_json::to_value(&spec).expect("Should serialize to JSON");
        let version = json.get("openapi").and_then(|v| v.as_str());
        assert!(
            version.unwrap().starts_with("3."),
            "Should use OpenAPI 3.x version"
        );
    }
}
