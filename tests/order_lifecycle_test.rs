mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use tokio::time::timeout;

use common::{body_json, TestApp};
use comanda_api::events::Event;

async fn create_order(app: &TestApp) -> i64 {
    let table_id = app.seed_table(1, 2).await;
    let burger = app.seed_menu_item("Burger", dec!(8.50), true).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "table_id": table_id,
                "items": [ { "menu_item_id": burger, "quantity": 2 } ]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn set_status(app: &TestApp, id: i64, status: &str) -> axum::response::Response {
    app.request_authenticated(
        Method::PUT,
        &format!("/api/v1/orders/{}/status", id),
        Some(json!({ "status": status })),
    )
    .await
}

#[tokio::test]
async fn orders_walk_the_service_flow_in_sequence() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    for next in ["confirmed", "preparing", "ready", "served", "paid"] {
        let response = set_status(&app, id, next).await;
        assert_eq!(response.status(), StatusCode::OK, "moving to {}", next);
        let body = body_json(response).await;
        assert_eq!(body["data"]["status"], next);
    }
}

#[tokio::test]
async fn skipping_a_step_is_rejected() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let response = set_status(&app, id, "preparing").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The order is untouched.
    let body = body_json(
        app.request_authenticated(Method::GET, &format!("/api/v1/orders/{}", id), None)
            .await,
    )
    .await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn repeating_the_current_status_is_a_no_op() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let response = set_status(&app, id, "pending").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn orders_can_be_cancelled_until_paid() {
    let app = TestApp::new().await;

    let id = create_order(&app).await;
    let response = set_status(&app, id, "cancelled").await;
    assert_eq!(response.status(), StatusCode::OK);

    // Cancelled is terminal: nothing but a repeat is accepted.
    let response = set_status(&app, id, "confirmed").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = set_status(&app, id, "cancelled").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn paid_orders_cannot_be_cancelled() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    for next in ["confirmed", "preparing", "ready", "served", "paid"] {
        assert_eq!(set_status(&app, id, next).await.status(), StatusCode::OK);
    }

    let response = set_status(&app, id, "cancelled").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn racing_updates_cannot_resurrect_a_cancelled_order() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    // Cancellation and confirmation race on the same pending order. Whichever
    // interleaving wins, the row-locked transition check means a committed
    // cancellation can never be overwritten by the confirm.
    let (cancel, confirm) = tokio::join!(
        set_status(&app, id, "cancelled"),
        set_status(&app, id, "confirmed"),
    );

    assert_eq!(cancel.status(), StatusCode::OK);
    assert!(
        confirm.status() == StatusCode::OK || confirm.status() == StatusCode::BAD_REQUEST,
        "unexpected status {}",
        confirm.status()
    );

    let body = body_json(
        app.request_authenticated(Method::GET, &format!("/api/v1/orders/{}", id), None)
            .await,
    )
    .await;
    assert_eq!(body["data"]["status"], "cancelled");
}

#[tokio::test]
async fn unknown_status_values_are_rejected() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let response = set_status(&app, id, "shipped").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found() {
    let app = TestApp::new().await;

    let response = set_status(&app, 987_654, "confirmed").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_creation_is_broadcast_to_subscribers() {
    let app = TestApp::new().await;
    let mut events = app.subscribe();

    let id = create_order(&app).await;

    let event = timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("event should arrive promptly")
        .expect("event channel should stay open");

    assert_eq!(event.kind(), "order_created");
    let order = event.order();
    assert_eq!(order.id, id);
    assert_eq!(order.total_amount, dec!(17.00));

    // The wire format clients see over the websocket.
    let payload = serde_json::to_value(&event).unwrap();
    assert_eq!(payload["type"], "order_created");
    assert_eq!(payload["order"]["id"].as_i64(), Some(id));
}

#[tokio::test]
async fn status_updates_are_broadcast_to_subscribers() {
    let app = TestApp::new().await;
    let id = create_order(&app).await;

    let mut events = app.subscribe();
    let response = set_status(&app, id, "confirmed").await;
    assert_eq!(response.status(), StatusCode::OK);

    let event = timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("event should arrive promptly")
        .expect("event channel should stay open");

    assert_eq!(event.kind(), "order_updated");
    assert_eq!(event.order().id, id);

    let payload = serde_json::to_value(&event).unwrap();
    assert_eq!(payload["type"], "order_updated");
    assert_eq!(payload["order"]["status"], "confirmed");

    // Rejected transitions must not be announced.
    let rejected = set_status(&app, id, "paid").await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);
    assert!(matches!(
        events.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
