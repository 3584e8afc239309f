mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;

use common::{body_json, TestApp};

#[tokio::test]
async fn menu_listing_supports_category_and_availability_filters() {
    let app = TestApp::new().await;
    app.seed_menu_item("Burger", dec!(8.50), true).await;
    app.seed_menu_item("Off menu pie", dec!(4.00), false).await;

    let all = body_json(
        app.request_authenticated(Method::GET, "/api/v1/menu/items", None)
            .await,
    )
    .await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let available = body_json(
        app.request_authenticated(Method::GET, "/api/v1/menu/items?available=true", None)
            .await,
    )
    .await;
    let names: Vec<_> = available["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Burger"]);

    let none = body_json(
        app.request_authenticated(Method::GET, "/api/v1/menu/items?category=desserts", None)
            .await,
    )
    .await;
    assert!(none["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn menu_items_can_be_fetched_by_id() {
    let app = TestApp::new().await;
    let id = app.seed_menu_item("Burger", dec!(8.50), true).await;

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/menu/items/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Burger");
    assert_eq!(body["data"]["price"], "8.50");

    let missing = app
        .request_authenticated(Method::GET, "/api/v1/menu/items/999", None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customization_choices_are_listed_with_surcharges() {
    let app = TestApp::new().await;
    app.seed_choice("Extra bacon", dec!(1.25)).await;

    let body = body_json(
        app.request_authenticated(Method::GET, "/api/v1/menu/customizations", None)
            .await,
    )
    .await;
    let choices = body["data"].as_array().unwrap();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0]["name"], "Extra bacon");
    assert_eq!(choices[0]["price_extra"], "1.25");
}

#[tokio::test]
async fn tables_are_listed_in_number_order() {
    let app = TestApp::new().await;
    app.seed_table(7, 2).await;
    app.seed_table(3, 4).await;

    let body = body_json(
        app.request_authenticated(Method::GET, "/api/v1/tables", None)
            .await,
    )
    .await;
    let numbers: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|table| table["number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![3, 7]);
}

#[tokio::test]
async fn tables_can_be_fetched_by_id() {
    let app = TestApp::new().await;
    let id = app.seed_table(5, 6).await;

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tables/{}", id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["number"], 5);
    assert_eq!(body["data"]["capacity"], 6);

    let missing = app
        .request_authenticated(Method::GET, "/api/v1/tables/999", None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_status_endpoints_are_public() {
    let app = TestApp::new().await;

    let health = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(health.status(), StatusCode::OK);
    let body = body_json(health).await;
    assert_eq!(body["status"], "up");

    let live = app.request(Method::GET, "/health/live", None, None).await;
    assert_eq!(live.status(), StatusCode::OK);

    let status = app.request(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(status.status(), StatusCode::OK);
    let body = body_json(status).await;
    assert_eq!(body["data"]["service"], "comanda-api");
}
