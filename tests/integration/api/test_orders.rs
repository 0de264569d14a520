// Order submission against catalog and the current meal

use crate::common::{body_json, registration_body, TestApp, EMAIL, PASSWORD};
use axum::http::StatusCode;
use go_eats::core::models::{ItemKind, MealType};
use serde_json::{json, Value};
use uuid::Uuid;

/// Default catalog with Bebidas and Outros served at Ceia (09:00-22:59)
async fn register_ceia_catalog(app: &TestApp) -> String {
    let mut body = registration_body(EMAIL);
    body["items"][1]["mealType"] = json!("CEIA");
    body["items"][2]["mealType"] = json!("CEIA");

    let response = app.post_json("/api/registerUser", body, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.login(EMAIL, PASSWORD).await
}

async fn user_id(app: &TestApp, cookie: &str) -> Uuid {
    let body = body_json(app.get("/api/me", Some(cookie)).await).await;
    body["user"]["id"].as_str().unwrap().parse().unwrap()
}

async fn place(app: &TestApp, cookie: &str, order: Value) -> (StatusCode, Value) {
    let response = app.post_json("/api/orders", order, Some(cookie)).await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_order_for_current_meal_is_stored() {
    let app = TestApp::at(8, 0);
    let cookie = app.register_and_login().await;

    let (status, body) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Jantar", "quantity": 2 }], "note": "  sem cebola " }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["totalItems"], 2);

    let orders = app.store.orders_for(user_id(&app, &cookie).await).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id.to_string(), body["orderId"].as_str().unwrap());
    assert_eq!(orders[0].note.as_deref(), Some("sem cebola"));
    assert_eq!(orders[0].lines.len(), 1);
    assert_eq!(orders[0].lines[0].item, ItemKind::Jantar);
    assert_eq!(orders[0].lines[0].meal_type, MealType::Jantar);
    assert_eq!(orders[0].lines[0].quantity, 2);
}

#[tokio::test]
async fn test_order_inside_window_of_other_current_meal_conflicts() {
    // 07:00 is inside the Jantar window but Cafe da tarde is the current meal
    let app = TestApp::at(7, 0);
    let cookie = app.register_and_login().await;

    let (status, body) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Jantar", "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Jantar is not available right now");
    assert!(app.store.orders_for(user_id(&app, &cookie).await).await.is_empty());
}

#[tokio::test]
async fn test_order_outside_meal_window_conflicts() {
    let app = TestApp::at(15, 0);
    let cookie = app.register_and_login().await;

    let (status, body) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Jantar", "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Jantar is not available right now");
}

#[tokio::test]
async fn test_order_for_meal_that_is_never_current_conflicts() {
    let app = TestApp::at(10, 0);
    let cookie = app.register_and_login().await;

    let (status, _) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Outros", "quantity": 1 }] }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_order_with_subcategories() {
    let app = TestApp::at(10, 0);
    let cookie = register_ceia_catalog(&app).await;

    let (status, body) = place(
        &app,
        &cookie,
        json!({
            "items": [{
                "item": "Bebidas",
                "subcategories": [
                    { "name": "Suco", "quantity": 1 },
                    { "name": "Café", "quantity": 2 }
                ]
            }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalItems"], 3);

    let orders = app.store.orders_for(user_id(&app, &cookie).await).await;
    let lines = &orders[0].lines;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].subcategory.as_deref(), Some("Suco"));
    assert_eq!(lines[0].meal_type, MealType::Ceia);
    assert_eq!(lines[1].subcategory.as_deref(), Some("Café"));
    assert_eq!(lines[1].quantity, 2);
    assert!(orders[0].note.is_none());
}

#[tokio::test]
async fn test_order_with_unknown_subcategory_is_rejected() {
    let app = TestApp::at(10, 0);
    let cookie = register_ceia_catalog(&app).await;

    let (status, _) = place(
        &app,
        &cookie,
        json!({
            "items": [{
                "item": "Bebidas",
                "subcategories": [{ "name": "Refrigerante", "quantity": 1 }]
            }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_for_item_outside_catalog_is_rejected() {
    let app = TestApp::at(16, 0);
    let cookie = app.register_and_login().await;

    let (status, body) = place(&app, &cookie, json!({ "items": [{ "item": "Ceia", "quantity": 1 }] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Item 'Ceia' is not in your catalog");
}

#[tokio::test]
async fn test_invalid_orders_are_rejected() {
    let app = TestApp::at(10, 0);
    let cookie = register_ceia_catalog(&app).await;

    let cases = [
        json!({ "items": [] }),
        json!({ "items": [{ "item": "Pizza", "quantity": 1 }] }),
        json!({ "items": [{ "item": "Outros" }] }),
        json!({ "items": [{ "item": "Outros", "quantity": 1 }, { "item": "Outros", "quantity": 2 }] }),
        json!({ "items": [{ "item": "Outros", "quantity": -1 }] }),
        json!({ "note": "sem itens" }),
    ];
    for order in cases {
        let (status, _) = place(&app, &cookie, order.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "order: {}", order);
    }

    assert!(app.store.orders_for(user_id(&app, &cookie).await).await.is_empty());
}

#[tokio::test]
async fn test_oversized_quantities_are_rejected_before_storing() {
    let app = TestApp::at(10, 0);
    let cookie = register_ceia_catalog(&app).await;

    let cases = [
        json!({
            "items": [{
                "item": "Bebidas",
                "subcategories": [
                    { "name": "Suco", "quantity": 4294967295u64 },
                    { "name": "Café", "quantity": 1 }
                ]
            }]
        }),
        json!({ "items": [{ "item": "Outros", "quantity": 2147483648u64 }] }),
        json!({
            "items": [
                { "item": "Outros", "quantity": 2147483647 },
                {
                    "item": "Bebidas",
                    "subcategories": [
                        { "name": "Suco", "quantity": 2147483647 },
                        { "name": "Café", "quantity": 2147483647 }
                    ]
                }
            ]
        }),
    ];
    for order in cases {
        let (status, body) = place(&app, &cookie, order.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "order: {}", order);
        assert_eq!(body["success"], false);
    }

    assert!(app.store.orders_for(user_id(&app, &cookie).await).await.is_empty());
}

#[tokio::test]
async fn test_order_note_length_is_limited() {
    let app = TestApp::at(10, 0);
    let cookie = register_ceia_catalog(&app).await;

    let (status, _) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Outros", "quantity": 1 }], "note": "a".repeat(501) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = place(
        &app,
        &cookie,
        json!({ "items": [{ "item": "Outros", "quantity": 1 }], "note": "é".repeat(500) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_order_requires_session() {
    let app = TestApp::at(10, 0);

    let response = app
        .post_json("/api/orders", json!({ "items": [{ "item": "Outros", "quantity": 1 }] }), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
