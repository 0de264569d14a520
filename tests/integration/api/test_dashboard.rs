// Catalog listing and current meal window

use crate::common::{body_json, registration_body, TestApp};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_items_require_session() {
    let app = TestApp::at(12, 0);

    let response = app.get("/api/dashboard/items", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not authenticated");
}

#[tokio::test]
async fn test_items_grouped_for_current_user() {
    let app = TestApp::at(12, 0);
    let cookie = app.register_and_login().await;

    let response = app.get("/api/dashboard/items", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "items": [
                { "name": "Jantar", "mealType": "JANTAR" },
                {
                    "name": "Bebidas",
                    "mealType": "BEBIDAS",
                    "subcategories": [
                        { "name": "Suco", "defaultQuantity": 2 },
                        { "name": "Café", "defaultQuantity": null }
                    ]
                },
                { "name": "Outros", "mealType": "FIM_SEMANA", "defaultQuantity": 1 }
            ]
        })
    );
}

#[tokio::test]
async fn test_items_are_scoped_per_user() {
    let app = TestApp::at(12, 0);
    app.register_default().await;

    let mut other = registration_body("cozinha@padaria.com.br");
    other["items"] = json!([{ "name": "Ceia", "mealType": "LANCHE" }]);
    let response = app.post_json("/api/registerUser", other, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = app.login("cozinha@padaria.com.br", crate::common::PASSWORD).await;
    let body = body_json(app.get("/api/dashboard/items", Some(&cookie)).await).await;

    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["name"], "Ceia");
    assert_eq!(body["items"][0]["mealType"], "LANCHE");
}

#[tokio::test]
async fn test_existing_item_keeps_its_meal_type() {
    let app = TestApp::at(12, 0);
    app.register_default().await;

    let mut other = registration_body("cozinha@padaria.com.br");
    other["items"] = json!([{ "name": "Jantar", "mealType": "CEIA" }]);
    app.post_json("/api/registerUser", other, None).await;

    let cookie = app.login("cozinha@padaria.com.br", crate::common::PASSWORD).await;
    let body = body_json(app.get("/api/dashboard/items", Some(&cookie)).await).await;

    assert_eq!(body["items"][0]["mealType"], "JANTAR");
}

#[tokio::test]
async fn test_current_meal_morning() {
    let app = TestApp::at(6, 30);

    let response = app.get("/api/meals/current", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "meal": "CAFE_TARDE", "remaining": "1h 30m" })
    );
}

#[tokio::test]
async fn test_current_meal_wraps_past_midnight() {
    let app = TestApp::at(23, 30);

    let body = body_json(app.get("/api/meals/current", None).await).await;
    assert_eq!(body, json!({ "meal": "CAFE_NOTURNO", "remaining": "5h 30m" }));
}

#[tokio::test]
async fn test_current_meal_follows_clock() {
    let app = TestApp::at(14, 0);

    let body = body_json(app.get("/api/meals/current", None).await).await;
    assert_eq!(body, json!({ "meal": "CEIA", "remaining": "9h 0m" }));

    app.clock.set(crate::common::at(2, 15));
    let body = body_json(app.get("/api/meals/current", None).await).await;
    assert_eq!(body, json!({ "meal": "CAFE_NOTURNO", "remaining": "2h 45m" }));
}
