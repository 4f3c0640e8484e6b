/// Integration tests for the catalog API
///
/// Two tiers:
///
/// - Tests that stop before the database (validation, routing, auth) run
///   against a lazily connecting pool and need no infrastructure.
/// - End-to-end tests marked `#[ignore]` require PostgreSQL. Point
///   `DATABASE_URL` at a scratch database and run:
///   `cargo test --test integration_test -- --ignored --test-threads=1`

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog_shared::models::product::Product;
use catalog_shared::models::version::Version;
use common::{create_test_category, get, json_post, reset_products, send_json, TestContext};
use serde_json::json;
use tower::ServiceExt as _;
use uuid::Uuid;

fn detail_fields(body: &serde_json::Value) -> Vec<String> {
    body["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .filter_map(|d| d["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_invalid_product_submission_returns_field_errors() {
    let ctx = TestContext::new();

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/product/create",
            json!({
                "name": "",
                "price": -1,
                "category_id": 0,
                "versions": [{"number": ""}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let fields = detail_fields(&body);
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"price".to_string()));
    assert!(fields.contains(&"category_id".to_string()));
    assert!(fields.contains(&"versions[0].number".to_string()));
}

#[tokio::test]
async fn test_two_active_versions_rejected() {
    let ctx = TestContext::new();

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/product/create",
            json!({
                "name": "Widget",
                "price": "9.99",
                "category_id": 1,
                "versions": [
                    {"number": "1.0", "is_active": true},
                    {"number": "2.0", "is_active": true}
                ]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail_fields(&body).contains(&"versions".to_string()));
}

#[tokio::test]
async fn test_invalid_bearer_token_rejected_on_workflow_routes() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/product/create")
        .header("authorization", "Bearer not-a-real-token")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Widget", "price": "9.99", "category_id": 1}).to_string(),
        ))
        .unwrap();

    let (status, body) = send_json(&ctx.app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_profile_requires_auth() {
    let ctx = TestContext::new();

    let (status, body) = send_json(&ctx.app, get("/users/update")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let ctx = TestContext::new();

    let (status, body) = send_json(&ctx.app, get("/users/logout")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "logged_out");
}

#[tokio::test]
async fn test_register_validation_rejects_bad_fields() {
    let ctx = TestContext::new();

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/users/register",
            json!({"username": "ab", "email": "not-an-email", "password": "short"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields = detail_fields(&body);
    assert!(fields.contains(&"username".to_string()));
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"password".to_string()));
}

#[tokio::test]
async fn test_contact_message_accepted_and_validated() {
    let ctx = TestContext::new();

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/contacts",
            json!({"name": "Ada", "email": "ada@example.com", "message": "Hello"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "received");

    let (status, _) = send_json(
        &ctx.app,
        json_post(
            "/contacts",
            json!({"name": "", "email": "bad", "message": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_contact_info_unconfigured_is_not_found() {
    let ctx = TestContext::new();

    // Test config leaves CONTACT_USER_ID unset.
    let (status, body) = send_json(&ctx.app, get("/contacts")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_non_numeric_product_id_is_bad_request() {
    let ctx = TestContext::new();

    let (status, _) = send_json(&ctx.app, get("/product/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();

    let (status, _) = send_json(&ctx.app, get("/no-such-route")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Paths near the auth-wrapped routers must also miss as 404, not 401.
    let (status, _) = send_json(&ctx.app, get("/product/1/publish")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&ctx.app, get("/users/no-such-route")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// End-to-end tests below require a live database.

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_workflow_persists_product_and_versions() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(json_post(
            "/product/create",
            json!({
                "name": "Widget",
                "price": 9.99,
                "category_id": category.id,
                "versions": [{"number": "1.0", "is_active": true}]
            }),
        ))
        .await
        .unwrap();

    // Success is a redirect to the listing page.
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/");

    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);
    assert_eq!(product.name, "Widget");
    assert_eq!(product.price.to_string(), "9.99");
    assert_eq!(product.category_id, category.id);
    assert!(product.owner_id.is_none());

    let versions = Version::list_by_product(&ctx.db, product.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].number, "1.0");
    assert!(versions[0].is_active);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_workflow_with_zero_versions() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let response = ctx
        .app
        .clone()
        .oneshot(json_post(
            "/product/create",
            json!({"name": "Bare Product", "price": "1.00", "category_id": category.id}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(Product::count(&ctx.db).await.unwrap(), 1);
    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);
    assert!(Version::list_by_product(&ctx.db, product.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_invalid_submission_persists_nothing() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    // The product fields are fine but one version row is invalid; the
    // whole submission must be rejected with nothing persisted.
    let (status, _) = send_json(
        &ctx.app,
        json_post(
            "/product/create",
            json!({
                "name": "Half Valid",
                "price": "2.50",
                "category_id": category.id,
                "versions": [{"number": ""}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(Product::count(&ctx.db).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_update_workflow_replaces_version_set() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let create = ctx
        .app
        .clone()
        .oneshot(json_post(
            "/product/create",
            json!({
                "name": "Widget",
                "price": "9.99",
                "category_id": category.id,
                "versions": [
                    {"number": "1.0", "is_active": true},
                    {"number": "1.1"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::SEE_OTHER);

    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);
    assert_eq!(
        Version::list_by_product(&ctx.db, product.id)
            .await
            .unwrap()
            .len(),
        2
    );

    // Replace both stored rows with a single new one.
    let update = ctx
        .app
        .clone()
        .oneshot(json_post(
            &format!("/product/{}/update", product.id),
            json!({
                "name": "Widget v2",
                "price": "19.99",
                "category_id": category.id,
                "versions": [{"number": "2.0", "is_active": true}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(update.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        update.headers().get("location").unwrap(),
        &format!("/product/{}", product.id)
    );

    let updated = Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Widget v2");

    let versions = Version::list_by_product(&ctx.db, product.id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].number, "2.0");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_update_moves_active_flag_between_versions() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let create = ctx
        .app
        .clone()
        .oneshot(json_post(
            "/product/create",
            json!({
                "name": "Widget",
                "price": "9.99",
                "category_id": category.id,
                "versions": [
                    {"number": "1.0", "is_active": true},
                    {"number": "1.1"}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::SEE_OTHER);

    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);
    let versions = Version::list_by_product(&ctx.db, product.id).await.unwrap();
    let (old_active, new_active) = (&versions[0], &versions[1]);
    assert!(old_active.is_active);

    // Swap the flag, submitting the newly-active row first. Must persist,
    // not trip the single-active index mid-reconciliation.
    let update = ctx
        .app
        .clone()
        .oneshot(json_post(
            &format!("/product/{}/update", product.id),
            json!({
                "name": "Widget",
                "price": "9.99",
                "category_id": category.id,
                "versions": [
                    {"id": new_active.id, "number": "1.1", "is_active": true},
                    {"id": old_active.id, "number": "1.0", "is_active": false}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::SEE_OTHER);

    let versions = Version::list_by_product(&ctx.db, product.id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert!(!versions[0].is_active);
    assert!(versions[1].is_active);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_listing_page_size_is_fixed() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    for i in 0..10 {
        Product::create(
            &ctx.db,
            catalog_shared::models::product::CreateProduct {
                name: format!("Product {}", i),
                description: None,
                price: rust_decimal::Decimal::new(100 + i, 2),
                category_id: category.id,
                owner_id: None,
            },
        )
        .await
        .unwrap();
    }

    let (status, body) = send_json(&ctx.app, get("/?page=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 6);
    assert_eq!(body["total"], 10);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["latest"].as_array().unwrap().len(), 5);

    let (_, body) = send_json(&ctx.app, get("/?page=2")).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 4);

    // Out-of-range pages come back empty, never as a fault.
    let (status, body) = send_json(&ctx.app, get("/?page=99")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_detail_of_missing_product_is_not_found() {
    let ctx = TestContext::with_database().await.unwrap();

    let (status, body) = send_json(&ctx.app, get("/product/999999999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_register_login_and_profile_flow() {
    let ctx = TestContext::with_database().await.unwrap();

    let username = format!("user-{}", Uuid::new_v4());
    let email = format!("{}@example.com", username);

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/users/register",
            json!({"username": username, "email": email, "password": "hunter2hunter2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/users",
            json!({"username": username, "password": "hunter2hunter2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("GET")
        .uri("/users/update")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send_json(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], username.as_str());
    assert_eq!(body["email"], email.as_str());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_password_reset_issues_working_password() {
    let ctx = TestContext::with_database().await.unwrap();

    let username = format!("reset-{}", Uuid::new_v4());
    let email = format!("{}@example.com", username);

    let (status, _) = send_json(
        &ctx.app,
        json_post(
            "/users/register",
            json!({"username": username, "email": email, "password": "original-pw-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        &ctx.app,
        json_post("/users/reset", json!({"email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "password_reset");
    let new_password = body["new_password"].as_str().unwrap().to_string();
    assert!(body["reset_token"].is_string());

    // The old password no longer works; the issued one does.
    let (status, _) = send_json(
        &ctx.app,
        json_post(
            "/users",
            json!({"username": username, "password": "original-pw-1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &ctx.app,
        json_post(
            "/users",
            json!({"username": username, "password": new_password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_with_session_records_owner() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let username = format!("owner-{}", Uuid::new_v4());
    let (status, body) = send_json(
        &ctx.app,
        json_post(
            "/users/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "hunter2hunter2"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user_id = body["user_id"].as_i64().unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/product/create")
        .header("authorization", ctx.auth_header_for(user_id))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Owned", "price": "5.00", "category_id": category.id}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);
    assert_eq!(product.owner_id, Some(user_id));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_product_cascades_versions() {
    let ctx = TestContext::with_database().await.unwrap();
    reset_products(&ctx.db).await.unwrap();
    let category = create_test_category(&ctx.db).await.unwrap();

    let create = ctx
        .app
        .clone()
        .oneshot(json_post(
            "/product/create",
            json!({
                "name": "Doomed",
                "price": "3.00",
                "category_id": category.id,
                "versions": [{"number": "1.0", "is_active": true}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(create.status(), StatusCode::SEE_OTHER);

    let product = Product::latest(&ctx.db, 1).await.unwrap().remove(0);

    let response = ctx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/product/{}/delete", product.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .is_none());
    assert!(Version::list_by_product(&ctx.db, product.id)
        .await
        .unwrap()
        .is_empty());
}
