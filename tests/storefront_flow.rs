//! End-to-end storefront flows: tools, bus, caches, relay and replay.

mod common;

use std::time::Duration;

use common::Session;
use pretty_assertions::assert_eq;
use serde_json::json;
use storefront_sync::bus::StoreEvent;
use storefront_sync::cache::CacheStatus;
use storefront_sync::highlight::SequencerState;
use storefront_sync::runtime::headless::RouteChange;
use storefront_sync::runtime::replay::run_replay;
use storefront_sync::tools::ToolCallInput;

fn call(name: &str, args: serde_json::Value) -> ToolCallInput {
    ToolCallInput {
        name: name.to_string(),
        args,
    }
}

#[tokio::test]
async fn test_add_twice_then_remove_through_cache() {
    let session = Session::start();
    let sf = &session.storefront;
    sf.prefetch().await.unwrap();

    sf.add_to_cart("p-sonic-buds", 1).await.unwrap();
    sf.add_to_cart("p-sonic-buds", 1).await.unwrap();

    let cart = sf.cart().read().await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.total, 178.0);

    let line_id = cart.items[0].id.clone();
    sf.remove_from_cart(&line_id).await.unwrap();
    let cart = sf.cart().read().await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total, 0.0);
}

#[tokio::test]
async fn test_unavailable_backend_rolls_back_update() {
    let session = Session::start();
    let sf = &session.storefront;
    sf.add_to_cart("p-pixel-cam", 2).await.unwrap();
    let before = sf.cart().read().await.unwrap();
    let line_id = before.items[0].id.clone();

    session.store.set_unavailable(true);
    assert!(sf.update_cart_item(&line_id, 5).await.is_err());

    assert_eq!(*sf.cart().snapshot(), *before);
    assert_eq!(sf.cart().peek().status, CacheStatus::Stale);
    assert_eq!(
        session.notifier.errors(),
        vec!["Couldn't update cart item. Please try again.".to_string()]
    );

    session.store.set_unavailable(false);
    let cart = sf.cart().read().await.unwrap();
    assert_eq!(cart.items[0].quantity, 2);
}

#[tokio::test]
async fn test_tool_cart_add_invalidates_ui_cache() {
    let session = Session::start();
    let sf = &session.storefront;
    sf.prefetch().await.unwrap();
    assert_eq!(sf.cart().peek().status, CacheStatus::Fresh);

    let output = sf
        .invoke_tool(call("cart.add", json!({ "product_id": "p-volt-watch" })))
        .await;
    assert!(output.ok);
    assert_eq!(sf.cart().peek().status, CacheStatus::Stale);

    let cart = sf.cart().read().await.unwrap();
    assert_eq!(cart.items[0].product_id, "p-volt-watch");
    assert_eq!(cart.total, 249.0);
}

#[tokio::test]
async fn test_search_tool_feeds_banner_and_router() {
    let session = Session::start();
    let sf = &session.storefront;

    let output = sf
        .invoke_tool(call("catalog.search", json!({ "query": "laptop" })))
        .await;
    assert!(output.ok);

    let search = sf.search().get_snapshot();
    assert!(search.is_active);
    assert_eq!(search.query.as_deref(), Some("laptop"));
    assert!(!search.results.is_empty());
    assert!(search.results.iter().all(|product| product.category == "laptops"));

    session.wait_for_path("/products").await;
    assert_eq!(
        session.navigator.history(),
        vec![RouteChange::Push("/products".to_string())]
    );

    sf.search().clear();
    assert!(!sf.search().get_snapshot().is_active);
}

#[tokio::test]
async fn test_signed_out_tool_call_routes_to_sign_in() {
    let session = Session::start();
    session.store.set_permissions(Default::default());

    let output = session
        .storefront
        .invoke_tool(call("likes.toggle", json!({ "product_id": "p-aero-14" })))
        .await;
    assert!(!output.ok);
    assert_eq!(output.error.as_deref(), Some("sign in required to like products"));

    session.wait_for_path("/sign-in").await;
    assert_eq!(session.notifier.errors(), vec!["Please sign in first".to_string()]);
}

#[tokio::test]
async fn test_checkout_tool_redirects() {
    let session = Session::start_at("/cart");
    let sf = &session.storefront;
    sf.add_to_cart("p-aero-16", 1).await.unwrap();

    let output = sf.invoke_tool(call("checkout.start", json!({}))).await;
    assert!(output.ok);
    let url = output.data["checkout_url"].as_str().unwrap().to_string();

    tokio::time::timeout(Duration::from_secs(2), async {
        while !session.navigator.history().contains(&RouteChange::Redirect(url.clone())) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("checkout redirect never reached the router");
}

#[tokio::test(start_paused = true)]
async fn test_highlight_tool_drives_the_page() {
    let session = Session::start();
    let sf = &session.storefront;

    let output = sf
        .invoke_tool(call("ui.highlight", json!({ "element_id": "cart-button", "label": "Your cart" })))
        .await;
    assert!(output.ok);
    assert!(matches!(sf.sequencer().state(), SequencerState::Highlighting { .. }));
    assert!(session.surface.active_elements().is_empty());

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(session.surface.active_elements(), vec!["cart-button".to_string()]);
    let overlay = sf.sequencer().overlay().unwrap();
    assert_eq!(overlay.target.label, "Your cart");
    assert_eq!(overlay.step, None);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert!(session.surface.active_elements().is_empty());
    assert_eq!(sf.sequencer().state(), SequencerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_onboarding_tour_walks_home_steps() {
    let session = Session::start();
    let sf = &session.storefront;

    let output = sf.invoke_tool(call("ui.onboarding", json!({}))).await;
    assert!(output.ok);
    assert_eq!(output.data["steps"].as_array().unwrap().len(), 7);

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(session.surface.active_elements(), vec!["logo".to_string()]);
    assert_eq!(sf.sequencer().overlay().unwrap().step, Some((1, 7)));

    // Each step holds for 3500ms with a 500ms gap before the next.
    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert_eq!(session.surface.active_elements(), vec!["nav-products".to_string()]);
    assert_eq!(sf.sequencer().overlay().unwrap().step, Some((2, 7)));
}

#[tokio::test]
async fn test_replay_script() {
    let session = Session::start();
    let script = concat!(
        "{\"op\":\"add_to_cart\",\"product_id\":\"p-sonic-buds\"}\n",
        "\n",
        "{\"op\":\"tool\",\"name\":\"catalog.search\",\"args\":{\"query\":\"sonic\"}}\n",
        "not json\n",
        "{\"op\":\"toggle_like\",\"product_id\":\"p-aero-14\"}\n",
        "{\"op\":\"state\"}\n",
    );

    let mut out = Vec::new();
    let handled = run_replay(
        &session.storefront,
        tokio::io::BufReader::new(script.as_bytes()),
        &mut out,
    )
    .await
    .unwrap();
    assert_eq!(handled, 4);

    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0]["kind"], "done");
    assert_eq!(lines[1]["kind"], "tool");
    assert_eq!(lines[1]["ok"], true);
    assert_eq!(lines[2]["kind"], "error");
    assert_eq!(lines[3]["kind"], "done");

    let state = &lines[4];
    assert_eq!(state["kind"], "state");
    assert_eq!(state["cart"]["total"], 89.0);
    assert_eq!(state["cart"]["status"], "fresh");
    assert_eq!(state["likes"], json!(["p-aero-14"]));
    assert_eq!(state["search_query"], "sonic");
}

#[tokio::test]
async fn test_shutdown_detaches_everything() {
    let mut session = Session::start();
    let bus = session.storefront.bus().clone();
    assert_eq!(bus.subscriber_count(), 4);

    session.storefront.shutdown();
    assert_eq!(bus.subscriber_count(), 0);

    let report = bus.publish(StoreEvent::Cart);
    assert_eq!(report.delivered, 0);
}
