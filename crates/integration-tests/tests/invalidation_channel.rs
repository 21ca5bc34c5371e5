//! The real-time invalidation channel: hello on connect, fan-out to every
//! connected client, refetch-on-signal convergence.
//!
//! Requires a running server with a migrated database and seeded admin;
//! see `src/lib.rs` for the setup recipe. Run with `-- --ignored`.

use std::time::Duration;

use url::Url;

use voltstore_client::ChannelClient;
use voltstore_core::ChangeEvent;
use voltstore_integration_tests::{TestContext, base_url};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn channel() -> ChannelClient {
    let base = Url::parse(&format!("{}/", base_url())).expect("bad base url");
    ChannelClient::new(&base).expect("bad channel url")
}

/// Wait for a specific event, skipping others (hello, users_count, ...).
async fn wait_for(
    rx: &mut tokio::sync::mpsc::Receiver<ChangeEvent>,
    wanted: ChangeEvent,
) -> ChangeEvent {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match rx.recv().await {
                Some(event) if event == wanted => return event,
                Some(_) => {}
                None => panic!("channel closed before {wanted:?}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {wanted:?}"))
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_hello_on_connect() {
    let mut rx = channel().subscribe();

    let first = tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("no event before timeout")
        .expect("channel closed");
    assert_eq!(first, ChangeEvent::Hello);
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_product_creation_fans_out_to_all_clients() {
    let ctx = TestContext::new();
    let token = ctx.admin_token().await;

    // Two independent clients, connected before the mutation.
    let mut client_a = channel().subscribe();
    let mut client_b = channel().subscribe();
    wait_for(&mut client_a, ChangeEvent::Hello).await;
    wait_for(&mut client_b, ChangeEvent::Hello).await;

    // Client A (well, the admin) creates a product.
    let name = format!("Fanout Gadget {}", uuid::Uuid::new_v4().simple());
    ctx.create_product(&token, &name, 123).await;

    // Both connected clients see the invalidation signal.
    wait_for(&mut client_a, ChangeEvent::ProductsChanged).await;
    wait_for(&mut client_b, ChangeEvent::ProductsChanged).await;

    // Client B's refetch includes the new product.
    let products: Vec<serde_json::Value> = ctx
        .client
        .get(ctx.url("/admin/products"))
        .send()
        .await
        .expect("products request failed")
        .json()
        .await
        .expect("products response not JSON");
    assert!(
        products.iter().any(|p| p["name"] == name.as_str()),
        "refetch after products_changed must include the new product"
    );
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_order_mutations_signal_orders_changed() {
    let ctx = TestContext::new();

    let mut rx = channel().subscribe();
    wait_for(&mut rx, ChangeEvent::Hello).await;

    ctx.create_order(
        &voltstore_integration_tests::unique_email("ws"),
        serde_json::json!([{"id": 1, "name": "Nova X1", "price": 999, "quantity": 1}]),
        999,
    )
    .await;

    wait_for(&mut rx, ChangeEvent::OrdersChanged).await;
}

#[tokio::test]
#[ignore = "Requires running voltstore-server and PostgreSQL"]
async fn test_track_broadcasts_users_count() {
    let ctx = TestContext::new();

    let mut rx = channel().subscribe();
    wait_for(&mut rx, ChangeEvent::Hello).await;

    let response = ctx
        .client
        .get(ctx.url("/track"))
        .send()
        .await
        .expect("track request failed");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("track response not JSON");
    let expected = body["totalUsers"].as_i64().expect("totalUsers");

    let event = tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match rx.recv().await {
                Some(ChangeEvent::UsersCount { total_users }) => return total_users,
                Some(_) => {}
                None => panic!("channel closed before users_count"),
            }
        }
    })
    .await
    .expect("timed out waiting for users_count");

    // Another visitor may tick the counter concurrently; monotonicity is
    // the contract, not exact equality.
    assert!(event >= expected);
}
