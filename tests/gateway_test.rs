//! Gateway tests against a wiremock backend.
//!
//! A real reqwest client plays the browser; the gateway runs on an
//! ephemeral port in front of the mock server.

mod common;

use std::time::Duration;

use bytes::Bytes;
use chatgate::config::GatewaySettings;
use chatgate::error::{BAD_GATEWAY_BODY, INVALID_PATH_BODY, MISCONFIGURED_BODY};
use common::{
    browser, closed_port_url, contains, raw_backend, raw_exchange, read_until, sse_body,
    TestGateway,
};
use futures::channel::mpsc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn only_request(backend: &MockServer) -> Request {
    let mut requests = backend.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one outbound request");
    requests.remove(0)
}

#[tokio::test]
async fn test_client_credentials_never_forwarded() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::in_front_of(&backend).await;

    browser()
        .get(gateway.proxy_url("profile"))
        .header("Cookie", "session=abc")
        .header("X-API-Key", "client-supplied")
        .header("Authorization", "Bearer stolen")
        .header("X-User-Email", "buyer@example.com")
        .send()
        .await
        .unwrap();

    let request = only_request(&backend).await;
    assert!(request.headers.get("cookie").is_none());
    assert!(request.headers.get("x-api-key").is_none());
    assert!(request.headers.get("authorization").is_none());
    assert_eq!(request.headers.get("x-user-email").unwrap(), "buyer@example.com");
}

#[tokio::test]
async fn test_server_key_injected_over_client_key() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(
        GatewaySettings::new()
            .with_backend_base_url(backend.uri())
            .with_api_key("server-key"),
    )
    .await;

    browser()
        .get(gateway.proxy_url("listings"))
        .header("X-API-Key", "client-supplied")
        .send()
        .await
        .unwrap();

    let request = only_request(&backend).await;
    let keys: Vec<_> = request.headers.get_all("x-api-key").iter().collect();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0], "server-key");
}

#[tokio::test]
async fn test_key_rotation_applies_without_restart() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(
        GatewaySettings::new()
            .with_backend_base_url(backend.uri())
            .with_api_key_rotation("key-old,key-new"),
    )
    .await;

    browser().get(gateway.proxy_url("a")).send().await.unwrap();
    gateway
        .settings
        .update(|s| s.api_key_rotation = Some(" ,key-new".to_string()));
    browser().get(gateway.proxy_url("b")).send().await.unwrap();

    let requests = backend.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].headers.get("x-api-key").unwrap(), "key-old");
    assert_eq!(requests[1].headers.get("x-api-key").unwrap(), "key-new");
}

#[tokio::test]
async fn test_status_body_and_headers_relayed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(
            ResponseTemplate::new(418)
                .insert_header("X-Request-ID", "req-42")
                .insert_header("Proxy-Authenticate", "Basic realm=backend")
                .insert_header("Keep-Alive", "timeout=5")
                .set_body_string("short and stout"),
        )
        .mount(&backend)
        .await;
    let gateway = TestGateway::in_front_of(&backend).await;

    let response = browser().get(gateway.proxy_url("teapot")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 418);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    assert!(response.headers().get("proxy-authenticate").is_none());
    assert!(response.headers().get("keep-alive").is_none());
    assert_eq!(response.text().await.unwrap(), "short and stout");
}

#[tokio::test]
async fn test_path_segments_encoded_and_query_preserved() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/a%20b/report"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::in_front_of(&backend).await;

    let response = browser()
        .get(gateway.proxy_url("documents/a%20b/report?page=2&q=%2Fhomes"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let request = only_request(&backend).await;
    assert_eq!(request.url.path(), "/documents/a%20b/report");
    assert_eq!(request.url.query(), Some("page=2&q=%2Fhomes"));
}

#[tokio::test]
async fn test_encoded_slash_stays_inside_base_path() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(
        GatewaySettings::new().with_backend_base_url(format!("{}/v1", backend.uri())),
    )
    .await;

    browser()
        .get(gateway.proxy_url("docs/a%2Fb"))
        .send()
        .await
        .unwrap();
    browser()
        .get(gateway.proxy_url("..%2F..%2Fadmin"))
        .send()
        .await
        .unwrap();

    let requests = backend.received_requests().await.unwrap();
    let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(paths, vec!["/v1/docs/a%2Fb", "/v1/..%2F..%2Fadmin"]);
}

#[tokio::test]
async fn test_dot_segments_rejected() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(
        GatewaySettings::new().with_backend_base_url(format!("{}/v1", backend.uri())),
    )
    .await;

    // Written by hand: URL-parsing clients collapse these before sending.
    for target in ["/api/proxy/%2E%2E/admin", "/api/proxy/docs/../../admin", "/api/proxy/./x"] {
        let response = raw_exchange(
            gateway.addr,
            &format!("GET {} HTTP/1.1\r\nHost: gateway\r\nConnection: close\r\n\r\n", target),
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 400"), "{}: {}", target, response);
        assert!(response.ends_with(INVALID_PATH_BODY), "{}", target);
    }
    assert!(backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_path_prefix_kept() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/search"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(
        GatewaySettings::new().with_backend_base_url(format!("{}/v2/", backend.uri())),
    )
    .await;

    let response = browser().get(gateway.proxy_url("search")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_redirect_relayed_not_followed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&backend)
        .await;
    let gateway = TestGateway::in_front_of(&backend).await;

    let response = browser().get(gateway.proxy_url("old")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(response.headers().get("location").unwrap(), "/new");
    assert_eq!(backend.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_body_forwarded() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&[r#"{"content":"hi"}"#, "[DONE]"]), "text/event-stream"),
        )
        .mount(&backend)
        .await;
    let gateway = TestGateway::in_front_of(&backend).await;

    let response = browser()
        .post(gateway.proxy_url("chat/stream"))
        .header("Content-Type", "application/json")
        .body(r#"{"message":"hello"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(
        response.text().await.unwrap(),
        "data: {\"content\":\"hi\"}\n\ndata: [DONE]\n\n"
    );

    let request = only_request(&backend).await;
    assert_eq!(request.body, br#"{"message":"hello"}"#);
    assert_eq!(request.headers.get("content-type").unwrap(), "application/json");
}

#[tokio::test]
async fn test_request_body_streams_before_upload_finishes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend_url = format!("http://{}", listener.local_addr().unwrap());
    let (head_seen_tx, head_seen_rx) = oneshot::channel();

    let backend = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let head = read_until(&mut socket, |buf| contains(buf, b"\r\n\r\n")).await;
        let _ = head_seen_tx.send(());
        let rest = read_until(&mut socket, |buf| {
            contains(buf, b"final-chunk") && buf.ends_with(b"0\r\n\r\n")
        })
        .await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndone")
            .await
            .unwrap();
        [head, rest].concat()
    });

    let gateway =
        TestGateway::start(GatewaySettings::new().with_backend_base_url(backend_url)).await;

    let (upload, chunks) = mpsc::unbounded::<Result<Bytes, std::io::Error>>();
    upload
        .unbounded_send(Ok(Bytes::from_static(b"first-chunk,")))
        .unwrap();
    let feeder = tokio::spawn(async move {
        // The last chunk is held back until the backend has the request.
        let seen = tokio::time::timeout(Duration::from_secs(5), head_seen_rx).await;
        let _ = upload.unbounded_send(Ok(Bytes::from_static(b"final-chunk")));
        matches!(seen, Ok(Ok(())))
    });

    let response = browser()
        .post(gateway.proxy_url("upload"))
        .header("Content-Type", "text/plain")
        .body(reqwest::Body::wrap_stream(chunks))
        .send()
        .await
        .unwrap();

    assert!(feeder.await.unwrap(), "backend never saw the request mid-upload");
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "done");

    let received = backend.await.unwrap();
    assert!(received.starts_with(b"POST /upload HTTP/1.1"));
    assert!(contains(&received, b"first-chunk,"));
    assert!(contains(&received, b"final-chunk"));
}

#[tokio::test]
async fn test_upstream_transfer_encoding_not_relayed() {
    let (backend_url, backend) = raw_backend(
        b"HTTP/1.1 200 OK\r\n\
          Transfer-Encoding: gzip, chunked\r\n\
          Connection: close, X-Backend-Hop\r\n\
          X-Backend-Hop: 1\r\n\
          \r\n\
          5\r\nhello\r\n0\r\n\r\n",
    )
    .await;
    let gateway =
        TestGateway::start(GatewaySettings::new().with_backend_base_url(backend_url)).await;

    let response = raw_exchange(
        gateway.addr,
        "GET /api/proxy/greeting HTTP/1.1\r\nHost: gateway\r\nConnection: close\r\n\r\n",
    )
    .await;
    backend.await.unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let head = head.to_ascii_lowercase();
    assert!(head.starts_with("http/1.1 200"), "{}", head);
    assert!(!head.contains("gzip"), "{}", head);
    assert!(!head.contains("x-backend-hop"), "{}", head);
    assert!(body.contains("hello"));
}

#[tokio::test]
async fn test_custom_reason_phrase_relayed() {
    let (backend_url, backend) = raw_backend(
        b"HTTP/1.1 429 Slow Down Please\r\nContent-Length: 4\r\nConnection: close\r\n\r\nwait",
    )
    .await;
    let gateway =
        TestGateway::start(GatewaySettings::new().with_backend_base_url(backend_url)).await;

    let response = raw_exchange(
        gateway.addr,
        "GET /api/proxy/limits HTTP/1.1\r\nHost: gateway\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(
        response.starts_with("HTTP/1.1 429 Slow Down Please\r\n"),
        "{}",
        response
    );
    assert!(response.contains("wait"));
    let request = backend.await.unwrap();
    assert!(request.starts_with(b"GET /limits HTTP/1.1"));
}

#[tokio::test]
async fn test_hardened_mode_refuses_local_backend() {
    let gateway = TestGateway::start(
        GatewaySettings::new()
            .with_backend_base_url("http://127.0.0.1:9/internal-secret")
            .with_hardened(true),
    )
    .await;

    let response = browser().get(gateway.proxy_url("listings")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body = response.text().await.unwrap();
    assert_eq!(body, MISCONFIGURED_BODY);
    assert!(!body.contains("internal-secret"));
}

#[tokio::test]
async fn test_hardened_mode_requires_backend() {
    let gateway = TestGateway::start(GatewaySettings::new().with_hardened(true)).await;

    let response = browser().get(gateway.proxy_url("listings")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.text().await.unwrap(), MISCONFIGURED_BODY);
}

#[tokio::test]
async fn test_backend_change_applies_without_restart() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&backend)
        .await;
    let gateway = TestGateway::start(GatewaySettings::new().with_hardened(true)).await;

    let response = browser().get(gateway.proxy_url("x")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 500);

    gateway
        .settings
        .set(GatewaySettings::new().with_backend_base_url(backend.uri()));
    let response = browser().get(gateway.proxy_url("x")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let gateway = TestGateway::start(
        GatewaySettings::new().with_backend_base_url(closed_port_url().await),
    )
    .await;

    let response = browser().get(gateway.proxy_url("listings")).send().await.unwrap();

    assert_eq!(response.status().as_u16(), 502);
    assert_eq!(response.text().await.unwrap(), BAD_GATEWAY_BODY);
}

#[tokio::test]
async fn test_healthz_does_not_touch_backend() {
    let backend = MockServer::start().await;
    let gateway = TestGateway::in_front_of(&backend).await;

    let response = browser()
        .get(format!("{}/healthz", gateway.base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(backend.received_requests().await.unwrap().is_empty());
}
