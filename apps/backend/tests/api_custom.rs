//! Custom module API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;

use common::fixtures;
use common::TestContext;

fn ids(words: &serde_json::Value) -> Vec<i64> {
    words
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_i64().unwrap())
        .collect()
}

/// Test creating a module stores every word with defaults applied.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_module_defaults() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let response = server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_module_request(
            "Kitchen",
            &fixtures::word_list_text(25),
        ))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Kitchen");
    assert_eq!(body["icon"], "📝");
    assert_eq!(body["color"], "from-blue-500 to-cyan-600");
    assert_eq!(body["word_count"], 25);
    assert_eq!(body["list_size"], 80);
    assert_eq!(body["group_size"], 20);
    assert_eq!(body["list_count"], 1);
    assert_eq!(body["lists"][0]["total"], 25);
    assert_eq!(body["lists"][0]["group_count"], 2);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test layout sizes are clamped to their minimums.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_module_clamps_layout() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let response = server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_module_request_with_layout(
            "Tiny",
            &fixtures::word_list_text(25),
            3,
            1,
        ))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["list_size"], 10);
    assert_eq!(body["group_size"], 5);
    assert_eq!(body["list_count"], 3);
    assert_eq!(body["lists"][2]["total"], 5);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test an empty word list is rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_module_empty_list() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let auth = TestContext::auth_header_value(&token);

    server
        .post("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_module_request("Blank", "\n   \n\t\n"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_module_request("  ", "apple"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth)
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["modules"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test module words get ids above the corpus range and tile into groups.
#[tokio::test]
#[ignore = "requires database"]
async fn test_module_lists_and_groups() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_module_request_with_layout(
            "Travel",
            &fixtures::word_list_text(12),
            10,
            5,
        ))
        .await;
    let module: serde_json::Value = response.json();
    let module_id = module["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/custom-modules/{module_id}/lists/0"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let list = ids(&body["words"]);
    assert_eq!(list.len(), 10);
    assert_eq!(body["group_count"], 2);
    assert!(list.iter().all(|&id| id >= vocab_core::CUSTOM_ITEM_ID_BASE));
    assert!(body["words"][0]["translation"]
        .as_str()
        .unwrap()
        .starts_with("meaning "));

    let response = server
        .get(&format!("/api/custom-modules/{module_id}/lists/0/groups/1"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(ids(&body["words"]), list[5..10].to_vec());

    let response = server
        .get(&format!("/api/custom-modules/{module_id}/lists/1"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(ids(&body["words"]).len(), 2);

    server
        .get(&format!("/api/custom-modules/{module_id}/lists/2"))
        .add_header(axum::http::header::AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test custom words can be reviewed and show up in the module's due queue.
#[tokio::test]
#[ignore = "requires database"]
async fn test_review_custom_word() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_module_request(
            "Verbs",
            &fixtures::word_list_text(10),
        ))
        .await;
    let module: serde_json::Value = response.json();
    let module_id = module["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/custom-modules/{module_id}/lists/0"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    let body: serde_json::Value = response.json();
    let item_id = body["words"][0]["id"].as_i64().unwrap();

    server
        .post("/api/study/review")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::review_request(item_id, 5))
        .await
        .assert_status_ok();
    ctx.make_due(device_id, item_id, 2).await;

    let response = server
        .get(&format!("/api/study/due?module={module_id}"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_due"], 1);
    assert_eq!(body["words"][0]["id"], item_id);
    assert!(body["words"][0]["word"]
        .as_str()
        .unwrap()
        .starts_with("custom"));

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test deleting a module removes it, its words and their progress.
#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_module() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/custom-modules")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_module_request(
            "Temporary",
            &fixtures::word_list_text(10),
        ))
        .await;
    let module: serde_json::Value = response.json();
    let module_id = module["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/custom-modules/{module_id}/lists/0"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    let body: serde_json::Value = response.json();
    let item_id = body["words"][0]["id"].as_i64().unwrap();
    server
        .post("/api/study/review")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::review_request(item_id, 5))
        .await
        .assert_status_ok();

    let response = server
        .delete(&format!("/api/custom-modules/{module_id}"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["deleted"], true);

    assert!(ctx.db.get_card_state(device_id, item_id).await.unwrap().is_none());

    server
        .get(&format!("/api/custom-modules/{module_id}"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/custom-modules/{module_id}/lists/0"))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/custom-modules/{module_id}"))
        .add_header(axum::http::header::AUTHORIZATION, auth)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // Cleanup
    ctx.cleanup_device(device_id).await;
}

/// Test modules are private to their device.
#[tokio::test]
#[ignore = "requires database"]
async fn test_module_not_visible_to_other_device() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (owner_id, owner_token) = ctx.create_test_device(Some("owner")).await;
    let (other_id, other_token) = ctx.create_test_device(Some("other")).await;

    let response = server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&owner_token),
        )
        .json(&fixtures::create_module_request(
            "Private",
            &fixtures::word_list_text(10),
        ))
        .await;
    let module: serde_json::Value = response.json();
    let module_id = module["id"].as_str().unwrap().to_string();

    server
        .get(&format!("/api/custom-modules/{module_id}"))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&other_token),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&other_token),
        )
        .await;
    let body: serde_json::Value = response.json();
    assert!(body["modules"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_device(owner_id).await;
    ctx.cleanup_device(other_id).await;
}

/// Test uploading the same word list twice is rejected for the same device only.
#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_word_list_rejected() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(Some("first")).await;
    let (other_id, other_token) = ctx.create_test_device(Some("second")).await;
    let text = fixtures::word_list_text(15);

    server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_module_request("Original", &text))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_module_request("Copy", &text))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let modules = ctx.db.list_custom_modules(device_id).await.unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].name, "Original");

    server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&other_token),
        )
        .json(&fixtures::create_module_request("Original", &text))
        .await
        .assert_status_ok();

    // Cleanup
    ctx.cleanup_device(device_id).await;
    ctx.cleanup_device(other_id).await;
}

/// Test layout sizes too large for storage are rejected instead of truncated.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_module_rejects_oversized_layout() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (device_id, token) = ctx.create_test_device(None).await;

    let response = server
        .post("/api/custom-modules")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_module_request_with_layout(
            "Huge",
            &fixtures::word_list_text(10),
            1 << 31,
            20,
        ))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.db.list_custom_modules(device_id).await.unwrap().is_empty());

    // Cleanup
    ctx.cleanup_device(device_id).await;
}
