use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wirehop::{
    BodyKind, ErrorCode, ExecutionContext, ExecutionPolicy, HttpExecutor, HttpRequest, RawResponse,
    RequestConfig, ScriptedTransport, Transport, TransportError,
};

fn get_config(url: &str) -> RequestConfig {
    RequestConfig {
        url: url.to_string(),
        method: "GET".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_end_to_end_redirect_then_json() {
    let transport = ScriptedTransport::new();
    transport.push_response(
        RawResponse::new(StatusCode::FOUND).with_header("location", "https://svc.test/b"),
    );
    transport.push_response(RawResponse::new(StatusCode::OK).with_json(&json!({"ok": true})));

    let policy = ExecutionPolicy {
        max_redirects: 5,
        ..Default::default()
    };
    let executor = HttpExecutor::with_policy(transport, policy);
    let context = ExecutionContext::new("exec-7", "req-42");

    let result = executor
        .execute(&get_config("https://svc.test/a"), &context)
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    assert_eq!(result.status_text, "OK");
    assert_eq!(result.body.kind, BodyKind::Json);
    assert_eq!(result.body.data.as_ref().unwrap()["ok"], true);

    assert_eq!(result.redirects.len(), 1);
    let hop = &result.redirects[0];
    assert_eq!(hop.from_url.as_str(), "https://svc.test/a");
    assert_eq!(hop.to_url.as_str(), "https://svc.test/b");
    assert_eq!(hop.status_code, 302);
    assert_eq!(hop.method_used, http::Method::GET);
    assert_eq!(hop.redirect_count, 1);

    assert_eq!(result.execution_id, "exec-7");
    assert_eq!(result.request_id, "req-42");
    assert!(result.timing.total >= result.timing.request.unwrap());
}

#[tokio::test]
async fn test_direct_200_has_empty_chain() {
    let transport = ScriptedTransport::new();
    transport.push_response(RawResponse::new(StatusCode::OK).with_body("hello"));
    let executor = HttpExecutor::new(transport);

    let result = executor
        .execute(&get_config("https://svc.test/a"), &ExecutionContext::default())
        .await
        .unwrap();
    assert_eq!(result.status, 200);
    assert!(result.redirects.is_empty());
    assert_eq!(result.body.kind, BodyKind::Text);
    assert_eq!(result.body.text.as_deref(), Some("hello"));
    assert_eq!(result.execution_id, "unknown");
}

#[tokio::test]
async fn test_build_failure_is_terminal_before_any_send() {
    let transport = ScriptedTransport::new();
    let executor = HttpExecutor::new(transport);

    let err = executor
        .execute(&get_config("not a url"), &ExecutionContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(executor.transport().request_count(), 0);
}

/// Transport whose send never completes, for timeout and cancellation tests.
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: &HttpRequest) -> Result<RawResponse, TransportError> {
        futures::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_enforced_per_hop() {
    let executor = HttpExecutor::new(HangingTransport);
    let mut config = get_config("https://svc.test/slow");
    config.timeout = Some(1_000);

    let err = executor
        .execute(&config, &ExecutionContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::TimeoutError);
    assert_eq!(err.context["timeout_ms"], 1_000);
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_hop() {
    let executor = HttpExecutor::new(HangingTransport);
    let cancel = CancellationToken::new();
    let aborter = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        aborter.cancel();
    });

    let err = executor
        .execute_with_cancel(
            &get_config("https://svc.test/slow"),
            &ExecutionContext::default(),
            cancel,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AbortError);
}

#[tokio::test]
async fn test_resolver_is_deterministic_across_runs() {
    // The same scripted exchanges produce the same chain both times.
    for _ in 0..2 {
        let transport = ScriptedTransport::new();
        transport.push_response(
            RawResponse::new(StatusCode::SEE_OTHER).with_header("location", "/step1"),
        );
        transport.push_response(
            RawResponse::new(StatusCode::TEMPORARY_REDIRECT).with_header("location", "/step2"),
        );
        transport.push_response(RawResponse::new(StatusCode::OK));
        let executor = HttpExecutor::new(transport);

        let config: RequestConfig = serde_json::from_str(
            r#"{"url": "https://svc.test/start", "method": "POST", "body": "data"}"#,
        )
        .unwrap();
        let result = executor
            .execute(&config, &ExecutionContext::default())
            .await
            .unwrap();

        assert_eq!(result.redirects.len(), 2);
        // 303 rewrote to GET; 307 then preserved GET.
        assert_eq!(result.redirects[0].method_used, http::Method::GET);
        assert_eq!(result.redirects[1].method_used, http::Method::GET);
        let sent = executor.transport().requests();
        assert_eq!(sent[1].url.as_str(), "https://svc.test/step1");
        assert_eq!(sent[2].url.as_str(), "https://svc.test/step2");
    }
}
