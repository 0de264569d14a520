// Account registration

use crate::common::{body_json, registration_body, TestApp, EMAIL, PASSWORD};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_ids() {
    let app = TestApp::at(12, 0);

    let response = app
        .post_json("/api/registerUser", registration_body(EMAIL), None)
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["result"]["userId"].is_string());
    assert!(body["result"]["companyId"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::at(12, 0);
    app.register_default().await;

    let response = app
        .post_json("/api/registerUser", registration_body("COMPRAS@padaria.com.br"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "Account already exists");
}

#[tokio::test]
async fn test_invalid_registrations_are_rejected() {
    let app = TestApp::at(12, 0);

    let mut bad_cnpj = registration_body(EMAIL);
    bad_cnpj["company"]["cnpj"] = json!("12.345.678/0001-95");

    let mut short_password = registration_body(EMAIL);
    short_password["user"]["password"] = json!("abcd");

    let mut long_password = registration_body(EMAIL);
    long_password["user"]["password"] = json!("x".repeat(51));

    let mut no_items = registration_body(EMAIL);
    no_items["items"] = json!([]);

    let mut no_company = registration_body(EMAIL);
    no_company.as_object_mut().unwrap().remove("company");

    let mut blank_name = registration_body(EMAIL);
    blank_name["company"]["socialName"] = json!("   ");

    let mut duplicate_item = registration_body(EMAIL);
    duplicate_item["items"] = json!([{ "name": "Jantar" }, { "name": "Jantar" }]);

    let mut unknown_item = registration_body(EMAIL);
    unknown_item["items"] = json!([{ "name": "Pizza" }]);

    let cases = [
        registration_body("sem-arroba.com.br"),
        registration_body("compras@padaria"),
        bad_cnpj,
        short_password,
        long_password,
        no_items,
        no_company,
        blank_name,
        duplicate_item,
        unknown_item,
    ];

    for body in cases {
        let response = app.post_json("/api/registerUser", body.clone(), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(body_json(response).await["success"], false);
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::at(12, 0);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/registerUser")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"user\":"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid data");
}

#[tokio::test]
async fn test_company_is_shared_by_cnpj() {
    let app = TestApp::at(12, 0);
    let first = app.register_default().await;

    let mut second = registration_body("cozinha@padaria.com.br");
    second["company"]["socialName"] = json!("Padaria Central Ltda");
    let response = app.post_json("/api/registerUser", second, None).await;
    let second = body_json(response).await;

    assert_eq!(first["result"]["companyId"], second["result"]["companyId"]);
    assert_ne!(first["result"]["userId"], second["result"]["userId"]);

    let cookie = app.login(EMAIL, PASSWORD).await;
    let me = body_json(app.get("/api/me", Some(&cookie)).await).await;
    assert_eq!(me["user"]["name"], "Padaria Central Ltda");
}
