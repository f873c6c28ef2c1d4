//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chatgate::adapters::StaticSettings;
use chatgate::config::GatewaySettings;
use chatgate::gateway::start_gateway_on;
use chatgate::traits::SettingsProvider;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use wiremock::MockServer;

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub settings: StaticSettings,
    handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway whose settings can be swapped while it runs.
    pub async fn start(settings: GatewaySettings) -> Self {
        let settings = StaticSettings::new(settings);
        let provider: Arc<dyn SettingsProvider> = Arc::new(settings.clone());
        let (handle, addr) = start_gateway_on("127.0.0.1:0".parse().unwrap(), provider)
            .await
            .expect("gateway should start");
        Self {
            addr,
            settings,
            handle,
        }
    }

    /// Start a development-mode gateway in front of a wiremock backend.
    pub async fn in_front_of(backend: &MockServer) -> Self {
        Self::start(GatewaySettings::new().with_backend_base_url(backend.uri())).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of a proxied backend path.
    pub fn proxy_url(&self, path: &str) -> String {
        format!("{}/api/proxy/{}", self.base_url(), path.trim_start_matches('/'))
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Browser-side client. Never follows redirects so relayed 3xx are visible.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client should build")
}

/// SSE body with one `data:` record per payload.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {}\n\n", payload))
        .collect()
}

/// An address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Read from `socket` until `done` holds for everything received so far,
/// or the peer closes.
pub async fn read_until(socket: &mut TcpStream, done: impl Fn(&[u8]) -> bool) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !done(&received) {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    received
}

/// Backend that answers one bodiless request with `response` written
/// verbatim. The handle yields the raw request it received.
pub async fn raw_backend(response: &'static [u8]) -> (String, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_until(&mut socket, |buf| contains(buf, b"\r\n\r\n")).await;
        socket.write_all(response).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (url, handle)
}

/// Send a hand-written request to `addr` and return the raw response.
///
/// The request should carry `Connection: close` so the read terminates.
pub async fn raw_exchange(addr: SocketAddr, request: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}
