//! End-to-end admin order management: status walk, the delivered-only
//! delete guard, and listings.
//!
//! Requires a running server with a migrated database and seeded admin;
//! see `src/lib.rs` for the setup recipe. Run with `-- --ignored`.

use serde_json::json;

use voltstore_integration_tests::{TestContext, unique_email};

fn single_item_order() -> serde_json::Value {
    json!([{"id": 1, "name": "Nova X1 Smartphone", "price": 999, "quantity": 1}])
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_status_walk_then_delete() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let email = unique_email("lifecycle");

    let order = ctx.create_order(&email, single_item_order(), 999).await;
    let id = order["id"].as_i64().expect("order id");
    assert_eq!(order["status"], "pending");

    // pending -> on_the_way -> delivered
    for status in ["on_the_way", "delivered"] {
        let response = ctx
            .client
            .patch(ctx.url(&format!("/admin/order/{id}/status")))
            .bearer_auth(&token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("status request failed");
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("status response not JSON");
        assert_eq!(body["status"], status);
    }

    // Delivered orders may be deleted, and then disappear from listings.
    let response = ctx
        .client
        .delete(ctx.url(&format!("/admin/order/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete request failed");
    assert!(response.status().is_success());

    let orders = ctx.list_orders(&email).await;
    assert!(
        orders.iter().all(|o| o["id"].as_i64() != Some(id)),
        "deleted order must not appear in listings"
    );
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_pending_order_cannot_be_deleted() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let email = unique_email("guard");

    let order = ctx.create_order(&email, single_item_order(), 999).await;
    let id = order["id"].as_i64().expect("order id");

    let response = ctx
        .client
        .delete(ctx.url(&format!("/admin/order/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete request failed");
    assert_eq!(response.status(), 400, "pending orders are protected");

    // The order is unchanged and still listed.
    let orders = ctx.list_orders(&email).await;
    let found = orders
        .iter()
        .find(|o| o["id"].as_i64() == Some(id))
        .expect("order still listed");
    assert_eq!(found["status"], "pending");
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_invalid_status_value_is_rejected_without_mutation() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let email = unique_email("badstatus");

    let order = ctx.create_order(&email, single_item_order(), 999).await;
    let id = order["id"].as_i64().expect("order id");

    let response = ctx
        .client
        .patch(ctx.url(&format!("/admin/order/{id}/status")))
        .bearer_auth(&token)
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .expect("status request failed");
    assert_eq!(response.status(), 400);

    let orders = ctx.list_orders(&email).await;
    let found = orders
        .iter()
        .find(|o| o["id"].as_i64() == Some(id))
        .expect("order still listed");
    assert_eq!(found["status"], "pending", "status unchanged");
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_approve_shortcut_marks_delivered() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;
    let email = unique_email("approve");

    let order = ctx.create_order(&email, single_item_order(), 999).await;
    let id = order["id"].as_i64().expect("order id");

    let response = ctx
        .client
        .patch(ctx.url(&format!("/admin/order/{id}/approve")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("approve request failed");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("approve response not JSON");
    assert_eq!(body["status"], "delivered");
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_admin_mutations_reject_missing_token() {
    let ctx = TestContext::new();
    let email = unique_email("noauth");

    let order = ctx.create_order(&email, single_item_order(), 999).await;
    let id = order["id"].as_i64().expect("order id");

    let response = ctx
        .client
        .patch(ctx.url(&format!("/admin/order/{id}/status")))
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .expect("status request failed");
    assert_eq!(response.status(), 401);
}
