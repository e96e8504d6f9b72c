use super::*;
use serde_json::json;

fn george() -> serde_json::Value {
    json!({
        "firstName": "George",
        "lastName": "Franklin",
        "address": "110 W. Liberty St.",
        "city": "Madison",
        "telephone": "608-555-1023"
    })
}

#[tokio::test]
async fn test_list_owners_first_page() {
    let (db, config, _temp_dir) = create_test_state().await;
    let ids = seed_owners(&db).await;
    let app = create_router(db, config);

    let response = send_get(app, "/owners").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["current_page"], 1);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["total_items"], 7);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["id"], ids[0]);
}

#[tokio::test]
async fn test_list_owners_second_page_and_beyond() {
    let (db, config, _temp_dir) = create_test_state().await;
    seed_owners(&db).await;

    let app = create_router(db.clone(), config.clone());
    let json = body_json(send_get(app, "/owners?page=2").await).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["current_page"], 2);

    // Past the last page the search still matches, the page is just empty
    let app = create_router(db, config);
    let json = body_json(send_get(app, "/owners?page=3").await).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_owners_page_zero_is_rejected() {
    let (db, config, _temp_dir) = create_test_state().await;
    seed_owners(&db).await;
    let app = create_router(db, config);

    let response = send_get(app, "/owners?page=0").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_list_owners_by_criteria() {
    let (db, config, _temp_dir) = create_test_state().await;
    seed_owners(&db).await;

    let app = create_router(db.clone(), config.clone());
    let json = body_json(send_get(app, "/owners?lastName=davis&city=windsor").await).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["first_name"], "Harold");

    let app = create_router(db.clone(), config.clone());
    let json = body_json(send_get(app, "/owners?telephone=608-555-1").await).await;
    assert_eq!(json["total_items"], 2);

    let app = create_router(db, config);
    let json = body_json(send_get(app, "/owners?last_name=&city=Monona").await).await;
    assert_eq!(json["total_items"], 2);
}

#[tokio::test]
async fn test_list_owners_no_match_is_not_found() {
    let (db, config, _temp_dir) = create_test_state().await;
    seed_owners(&db).await;
    let app = create_router(db, config);

    let response = send_get(app, "/owners?lastName=Zzz").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_create_owner() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db.clone(), config);

    let response = send_json(app, "POST", "/owners", george()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["first_name"], "George");
    assert_eq!(json["telephone"], "6085551023", "telephone is stored normalized");

    let id = json["id"].as_i64().unwrap();
    let stored = db.get_owner(id).await.unwrap().unwrap();
    assert_eq!(stored.last_name, "Franklin");
}

#[tokio::test]
async fn test_create_duplicate_owner_is_conflict() {
    let (db, config, _temp_dir) = create_test_state().await;

    let app = create_router(db.clone(), config.clone());
    let response = send_json(app, "POST", "/owners", george()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut again = george();
    again["firstName"] = json!("  george ");
    again["telephone"] = json!("608 555 1023");
    let app = create_router(db.clone(), config);
    let response = send_json(app, "POST", "/owners", again).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "duplicate");
    assert_eq!(db.count_owners(&Default::default()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_invalid_owner_is_bad_request() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db.clone(), config);

    let response = send_json(
        app,
        "POST",
        "/owners",
        json!({"firstName": "", "lastName": "Franklin", "telephone": "12345"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("first_name"));
    assert!(message.contains("telephone"));
    assert_eq!(db.count_owners(&Default::default()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_owner() {
    let (db, config, _temp_dir) = create_test_state().await;
    let ids = seed_owners(&db).await;

    let app = create_router(db.clone(), config.clone());
    let response = send_get(app, &format!("/owners/{}", ids[1])).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["first_name"], "Betty");
    assert_eq!(json["last_name"], "Davis");

    let app = create_router(db, config);
    let response = send_get(app, "/owners/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_update_owner() {
    let (db, config, _temp_dir) = create_test_state().await;
    let ids = seed_owners(&db).await;
    let app = create_router(db.clone(), config);

    let mut body = george();
    body["id"] = json!(ids[0]);
    body["city"] = json!("Sun Prairie");
    let response = send_json(app, "PUT", &format!("/owners/{}", ids[0]), body).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["city"], "Sun Prairie");
    let stored = db.get_owner(ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.city.as_deref(), Some("Sun Prairie"));
}

#[tokio::test]
async fn test_update_owner_id_mismatch_is_bad_request() {
    let (db, config, _temp_dir) = create_test_state().await;
    let ids = seed_owners(&db).await;
    let app = create_router(db.clone(), config);

    let mut body = george();
    body["id"] = json!(ids[1]);
    body["city"] = json!("Elsewhere");
    let response = send_json(app, "PUT", &format!("/owners/{}", ids[0]), body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let stored = db.get_owner(ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.city.as_deref(), Some("Madison"));
}

#[tokio::test]
async fn test_update_missing_owner_is_not_found() {
    let (db, config, _temp_dir) = create_test_state().await;
    let app = create_router(db, config);

    let response = send_json(app, "PUT", "/owners/42", george()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_duplicate_creates_admit_one() {
    let (db, config, _temp_dir) = create_test_state().await;

    let first = send_json(create_router(db.clone(), config.clone()), "POST", "/owners", george());
    let second = send_json(create_router(db.clone(), config), "POST", "/owners", george());
    let (first, second) = tokio::join!(first, second);

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(db.count_owners(&Default::default()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_into_another_owner_is_conflict() {
    let (db, config, _temp_dir) = create_test_state().await;
    let ids = seed_owners(&db).await;
    let app = create_router(db.clone(), config);

    // Betty Davis takes George Franklin's names and telephone
    let response = send_json(app, "PUT", &format!("/owners/{}", ids[1]), george()).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"]["code"], "duplicate");
    let betty = db.get_owner(ids[1]).await.unwrap().unwrap();
    assert_eq!(betty.first_name, "Betty");
}

#[tokio::test]
async fn test_create_duplicate_with_non_ascii_case_is_conflict() {
    let (db, config, _temp_dir) = create_test_state().await;
    db.insert_owner(&owner("Åse", "Ødegaard", "Tromsø", "4790000000"))
        .await
        .unwrap();
    let app = create_router(db, config);

    let response = send_json(
        app,
        "POST",
        "/owners",
        json!({
            "firstName": "ÅSE",
            "lastName": "ØDEGAARD",
            "address": "Storgata 1",
            "city": "Tromsø",
            "telephone": "4790000000"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
