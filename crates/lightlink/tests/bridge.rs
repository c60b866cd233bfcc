//! End-to-end tests driving the bridge against the scriptable mock client.

use futures_util::StreamExt;
use lightlink::testing::{MockChain, MockClient};
use lightlink::{Bridge, Error, RegistryConfig, Request};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CHAIN_SPEC: &str = r#"{"name":"westend","id":"westend2","genesis":{}}"#;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

fn bridge_with(config: RegistryConfig) -> (Arc<MockClient>, Arc<Bridge>) {
    init_tracing();
    let client = Arc::new(MockClient::new());
    let bridge = Arc::new(Bridge::with_config(Arc::clone(&client) as _, config));
    (client, bridge)
}

fn bridge() -> (Arc<MockClient>, Arc<Bridge>) {
    bridge_with(RegistryConfig::default())
}

async fn wait_for_requests(chain: &MockChain, count: usize) -> Vec<Request> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    loop {
        let requests = chain.sent_requests();
        if requests.len() >= count {
            return requests;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "chain saw {} of {count} expected requests",
            requests.len()
        );
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test]
async fn system_name_scenario_round_trips() {
    let (client, bridge) = bridge();

    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let call = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_name", vec![]).await }
    });

    let requests = wait_for_requests(&chain, 1).await;
    assert_eq!(requests[0].method, "system_name");
    assert_eq!(requests[0].id, 1);

    chain.deliver(r#"{"jsonrpc":"2.0","id":1,"result":"MyNode"}"#);

    assert_eq!(call.await.unwrap().unwrap(), json!("MyNode"));
}

#[tokio::test]
async fn out_of_order_responses_resolve_their_own_calls() {
    let (client, bridge) = bridge();
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let first = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_name", vec![]).await }
    });
    let second = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_version", vec![]).await }
    });

    let requests = wait_for_requests(&chain, 2).await;
    let id_of = |method: &str| {
        requests
            .iter()
            .find(|request| request.method == method)
            .map(|request| request.id)
            .unwrap()
    };

    // Deliver in reverse submission order.
    chain.respond(id_of("system_version"), json!("1.2.3"));
    chain.respond(id_of("system_name"), json!("MyNode"));

    assert_eq!(first.await.unwrap().unwrap(), json!("MyNode"));
    assert_eq!(second.await.unwrap().unwrap(), json!("1.2.3"));
}

#[tokio::test]
async fn unanswered_call_times_out_and_late_response_is_ignored() {
    let (client, bridge) =
        bridge_with(RegistryConfig::default().with_call_timeout(Duration::from_millis(50)));
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let started = tokio::time::Instant::now();
    let err = bridge
        .call_rpc(session, "system_name", vec![])
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(started.elapsed() >= Duration::from_millis(50));

    // The late response correlates to nothing and must not disturb a
    // subsequent call on the same session.
    let requests = wait_for_requests(&chain, 1).await;
    chain.respond(requests[0].id, json!("late"));

    let call = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_name", vec![]).await }
    });
    let requests = wait_for_requests(&chain, 2).await;
    chain.respond(requests[1].id, json!("fresh"));
    assert_eq!(call.await.unwrap().unwrap(), json!("fresh"));
}

#[tokio::test]
async fn notifications_bypass_pending_calls_and_arrive_once() {
    let (client, bridge) = bridge();
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let mut notifications = bridge.subscribe_notifications(session).unwrap();

    let call = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_name", vec![]).await }
    });
    let requests = wait_for_requests(&chain, 1).await;

    chain.notify("state_storage", json!({"subscription": "abc"}));
    chain.respond(requests[0].id, json!("MyNode"));

    // The call resolved from the response, not the notification.
    assert_eq!(call.await.unwrap().unwrap(), json!("MyNode"));

    let notification = notifications.next().await.unwrap();
    assert_eq!(notification.method, "state_storage");

    // Exactly once: closing the session ends the stream with nothing queued.
    bridge.close_session(session).unwrap();
    assert!(notifications.next().await.is_none());
}

#[tokio::test]
async fn closing_a_session_rejects_pending_calls() {
    let (client, bridge) = bridge();
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let call = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "system_name", vec![]).await }
    });
    wait_for_requests(&chain, 1).await;

    bridge.close_session(session).unwrap();

    let err = call.await.unwrap().unwrap_err();
    assert!(matches!(err, Error::SessionClosed));

    // Closing again or calling again reports the miss, never a fault.
    assert!(matches!(
        bridge.close_session(session).unwrap_err(),
        Error::UnknownSession(_)
    ));
    assert!(matches!(
        bridge
            .call_rpc(session, "system_name", vec![])
            .await
            .unwrap_err(),
        Error::UnknownSession(_)
    ));
}

#[tokio::test]
async fn registration_and_submission_failures_surface_typed() {
    let (client, bridge) = bridge();

    let err = bridge.open_session("not a chain spec").await.unwrap_err();
    assert!(matches!(err, Error::ChainRegistration(_)));

    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    client.chain(0).unwrap().fail_submissions(true);

    let err = bridge
        .call_rpc(session, "system_name", vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Submission(_)));
}

#[tokio::test]
async fn rpc_level_errors_reject_the_call() {
    let (client, bridge) = bridge();
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let call = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.call_rpc(session, "no_such_method", vec![]).await }
    });
    let requests = wait_for_requests(&chain, 1).await;
    chain.respond_error(requests[0].id, -32601, "Method not found");

    let err = call.await.unwrap().unwrap_err();
    assert_eq!(err.rpc_code(), Some(-32601));
}

#[tokio::test]
async fn typed_helpers_decode_results() {
    let (client, bridge) = bridge();
    let session = bridge.open_session(CHAIN_SPEC).await.unwrap();
    let chain = client.chain(0).unwrap();

    let name = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.rpc(session).system_name().await }
    });
    let requests = wait_for_requests(&chain, 1).await;
    chain.respond(requests[0].id, json!("MyNode"));
    assert_eq!(name.await.unwrap().unwrap(), "MyNode");

    let storage = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.rpc(session).storage(b"abc", None).await }
    });
    let requests = wait_for_requests(&chain, 2).await;
    assert_eq!(requests[1].method, "state_getStorage");
    assert_eq!(requests[1].params[0], json!("0x616263"));
    chain.respond(requests[1].id, json!("0x0001"));
    assert_eq!(storage.await.unwrap().unwrap(), Some(vec![0x00, 0x01]));

    let missing = tokio::spawn({
        let bridge = Arc::clone(&bridge);
        async move { bridge.rpc(session).storage(b"missing", None).await }
    });
    let requests = wait_for_requests(&chain, 3).await;
    chain.respond(requests[2].id, json!(null));
    assert_eq!(missing.await.unwrap().unwrap(), None);
}
