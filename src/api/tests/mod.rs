use super::*;
use crate::db::NewOwner;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

mod owners;

/// Helper to create a fresh database and default config in a temp directory
async fn create_test_state() -> (Arc<Database>, Arc<Config>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.persistence.database_path = temp_dir.path().join("petclinic.db");
    let db = Database::new(&config.persistence.database_path)
        .await
        .unwrap();
    (Arc::new(db), Arc::new(config), temp_dir)
}

fn owner(first: &str, last: &str, city: &str, telephone: &str) -> NewOwner {
    NewOwner {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: Some(format!("{} Main St.", first)),
        city: Some(city.to_string()),
        telephone: Some(telephone.to_string()),
    }
}

/// Seed the classic sample owners, returning their IDs in insertion order
async fn seed_owners(db: &Database) -> Vec<i64> {
    let owners = [
        owner("George", "Franklin", "Madison", "6085551023"),
        owner("Betty", "Davis", "Sun Prairie", "6085551749"),
        owner("Eduardo", "Rodriquez", "McFarland", "6085558763"),
        owner("Harold", "Davis", "Windsor", "6085553198"),
        owner("Peter", "McTavish", "Madison", "6085552765"),
        owner("Jean", "Coleman", "Monona", "6085552654"),
        owner("Jeff", "Black", "Monona", "6085555387"),
    ];
    let mut ids = Vec::new();
    for o in &owners {
        ids.push(db.insert_owner(o).await.unwrap());
    }
    ids
}

async fn send_get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn send_json(app: Router, method: &str, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_starts_and_stops_gracefully() {
    let (db, config, _temp_dir) = create_test_state().await;

    let mut config = (*config).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(start_api_server(db, config, async move {
        let _ = rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db, config);

    let response = send_get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_endpoint() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db, config);

    let response = send_get(app, "/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/owners.csv"].is_object());
    assert!(json["paths"]["/visits/upcoming"].is_object());
    assert_eq!(json["servers"][0]["url"], "http://localhost:8080");
}

#[tokio::test]
async fn test_cors_enabled() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db, config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (db, config, _temp_dir) = create_test_state().await;
    let mut config = (*config).clone();
    config.server.api.cors_enabled = false;
    let app = create_router(db, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be absent when CORS is disabled"
    );
}

#[tokio::test]
async fn test_swagger_ui_toggle() {
    let (db, config, _temp_dir) = create_test_state().await;

    let app = create_router(db.clone(), config.clone());
    let response = send_get(app.clone(), "/swagger-ui/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);

    // The UI loads its document from a path that does not shadow /openapi.json
    let response = send_get(app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/owners"].is_object());

    let mut disabled = (*config).clone();
    disabled.server.api.swagger_ui = false;
    let app = create_router(db, Arc::new(disabled));
    let response = send_get(app, "/swagger-ui/index.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
