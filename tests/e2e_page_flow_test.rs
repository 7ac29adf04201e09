//! End-to-end flows through a `PageContext` with a scripted host.

use std::time::Duration;

use serde_json::json;
use tokio::sync::oneshot;
use tokio::time::timeout;

use u2f_bridge::{
    HostConnection, HostEndpoint, Origin, PageContext, RegisterCall, RegisterRequestEntry,
    RegisteredKey, ResponsePayload, SUPPORTED_VERSION, SignCall, U2fResult,
};

const PAGE: &str = "https://example.com";
const WAIT: Duration = Duration::from_secs(2);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn page() -> (PageContext, HostEndpoint) {
    init_tracing();
    let (host, endpoint) = HostConnection::channel();
    let page = PageContext::builder()
        .origin(PAGE)
        .host(host)
        .build()
        .expect("build page context");
    (page, endpoint)
}

fn oneshot_callback() -> (
    impl FnOnce(U2fResult) + Send + 'static,
    oneshot::Receiver<U2fResult>,
) {
    let (tx, rx) = oneshot::channel();
    let callback = move |result: U2fResult| {
        let _ = tx.send(result);
    };
    (callback, rx)
}

#[tokio::test]
async fn test_register_round_trip_through_host() {
    let (page, mut endpoint) = page();
    let (callback, result_rx) = oneshot_callback();

    let request = RegisterRequestEntry::new(SUPPORTED_VERSION, "c1").with_app_id(PAGE);
    assert!(page.api().register(RegisterCall::new(vec![request], callback)));

    let sent = timeout(WAIT, endpoint.recv())
        .await
        .expect("host receives in time")
        .expect("page side alive");
    assert_eq!(sent.name, "U2FRegister");
    assert_eq!(sent.message, json!({ "appId": PAGE, "challenge": "c1" }));

    endpoint
        .respond(
            ResponsePayload::success(&json!({
                "clientData": "cd",
                "registrationData": "rd"
            }))
            .expect("payload"),
        )
        .expect("respond");

    let result = timeout(WAIT, result_rx)
        .await
        .expect("callback in time")
        .expect("callback invoked");
    assert_eq!(
        serde_json::to_value(result).expect("serialize"),
        json!({ "version": "U2F_V2", "clientData": "cd", "registrationData": "rd" })
    );
    assert!(!page.is_pending());
}

#[tokio::test]
async fn test_sign_remote_error() {
    let (page, mut endpoint) = page();
    let (callback, result_rx) = oneshot_callback();

    let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
        .with_app_id(PAGE)
        .with_challenge("chal1");
    assert!(page.api().sign(SignCall::new(vec![key], callback)));

    let sent = timeout(WAIT, endpoint.recv())
        .await
        .expect("host receives in time")
        .expect("page side alive");
    assert_eq!(sent.name, "U2FSign");
    assert_eq!(
        sent.message,
        json!({ "appId": PAGE, "challenge": "chal1", "keyHandle": "kh1" })
    );

    endpoint
        .respond(ResponsePayload::error(1))
        .expect("respond");

    let result = timeout(WAIT, result_rx)
        .await
        .expect("callback in time")
        .expect("callback invoked");
    assert_eq!(result.error_code(), Some(1));
}

#[tokio::test]
async fn test_busy_call_never_reaches_host() {
    let (page, mut endpoint) = page();
    let (first, first_rx) = oneshot_callback();
    let (second, second_rx) = oneshot_callback();

    let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
        .with_app_id(PAGE)
        .with_challenge("chal1");
    assert!(page.api().sign(SignCall::new(vec![key.clone()], first)));
    assert!(!page.api().sign(SignCall::legacy(PAGE, "chal2", vec![key], second)));

    let sent = timeout(WAIT, endpoint.recv())
        .await
        .expect("host receives in time")
        .expect("page side alive");
    assert_eq!(sent.message["challenge"], "chal1");

    // The rejected callback was dropped without being called.
    assert!(second_rx.await.is_err());

    endpoint
        .respond(ResponsePayload::error(1))
        .expect("respond");
    timeout(WAIT, first_rx)
        .await
        .expect("callback in time")
        .expect("callback invoked");

    assert!(endpoint.try_recv().is_none());
}

#[tokio::test]
async fn test_unsupported_version_fails_locally() {
    let (page, mut endpoint) = page();
    let (callback, result_rx) = oneshot_callback();

    let request = RegisterRequestEntry::new("U2F_V1", "c1").with_app_id(PAGE);
    assert!(page.api().register(RegisterCall::new(vec![request], callback)));

    let result = timeout(WAIT, result_rx)
        .await
        .expect("callback in time")
        .expect("callback invoked");
    assert!(result.is_error());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(endpoint.try_recv().is_none());
}

#[tokio::test]
async fn test_cross_origin_response_is_ignored() {
    let (page, mut endpoint) = page();
    let (callback, mut result_rx) = oneshot_callback();

    let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
        .with_app_id(PAGE)
        .with_challenge("chal1");
    page.api().sign(SignCall::new(vec![key], callback));
    timeout(WAIT, endpoint.recv())
        .await
        .expect("host receives in time")
        .expect("page side alive");

    // A frame from another origin forges a well-formed response.
    page.surface()
        .post(
            Origin::parse("https://evil.example").expect("valid"),
            json!({ "name": "U2FResponse", "message": { "error": 1 } }),
        )
        .expect("post");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(page.is_pending());
    assert!(result_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_page_posted_request_is_forwarded() {
    let (page, mut endpoint) = page();

    page.post_message(json!({
        "name": "U2FRegister",
        "message": { "appId": PAGE, "challenge": "from-page" }
    }))
    .expect("post");
    page.post_message(json!({ "name": "chat", "message": "hello" }))
        .expect("post");

    let sent = timeout(WAIT, endpoint.recv())
        .await
        .expect("host receives in time")
        .expect("page side alive");
    assert_eq!(sent.message["challenge"], "from-page");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(endpoint.try_recv().is_none());
}

#[tokio::test]
async fn test_next_operation_accepted_after_completion() {
    let (page, mut endpoint) = page();
    let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
        .with_app_id(PAGE)
        .with_challenge("chal1");

    for round in 0..3 {
        let (callback, result_rx) = oneshot_callback();
        assert!(
            page.api().sign(SignCall::new(vec![key.clone()], callback)),
            "round {round} accepted"
        );

        timeout(WAIT, endpoint.recv())
            .await
            .expect("host receives in time")
            .expect("page side alive");
        endpoint
            .respond(
                ResponsePayload::success(&json!({
                    "clientData": "cd",
                    "keyHandle": "kh1",
                    "signatureData": format!("sig-{round}")
                }))
                .expect("payload"),
            )
            .expect("respond");

        let result = timeout(WAIT, result_rx)
            .await
            .expect("callback in time")
            .expect("callback invoked");
        assert!(!result.is_error());
    }
}
