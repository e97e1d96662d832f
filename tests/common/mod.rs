//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode};
use axum::Router;
use flate2::{write::GzEncoder, Compression};
use roproxy::http::{OutboundRequest, Transport, UpstreamResponse};
use roproxy::{HttpServer, ProxyConfig, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// What the fake upstream does on each call.
#[derive(Clone)]
pub enum Reply {
    /// Answer with a canned response.
    Respond(UpstreamResponse),
    /// Fail at the transport level.
    Fail,
}

/// Transport double that records every request and can inject failures.
pub struct FakeUpstream {
    /// Number of leading calls that fail before `reply` is used.
    fail_first: u32,
    reply: Reply,
    calls: AtomicU32,
    seen: Mutex<Vec<OutboundRequest>>,
}

impl FakeUpstream {
    pub fn responding(response: UpstreamResponse) -> Arc<Self> {
        Self::build(0, Reply::Respond(response))
    }

    pub fn failing() -> Arc<Self> {
        Self::build(0, Reply::Fail)
    }

    pub fn flaky(fail_first: u32, response: UpstreamResponse) -> Arc<Self> {
        Self::build(fail_first, Reply::Respond(response))
    }

    fn build(fail_first: u32, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            reply,
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeUpstream {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);

        if n < self.fail_first {
            return Err(TransportError::Connect("connection refused".into()));
        }
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail => Err(TransportError::Io("connection reset by peer".into())),
        }
    }
}

/// Build an upstream response from parts.
pub fn upstream_response(
    status: u16,
    headers: &[(&'static str, &'static str)],
    body: impl Into<Bytes>,
) -> UpstreamResponse {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        map.append(HeaderName::from_static(k), HeaderValue::from_static(v));
    }
    UpstreamResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers: map,
        body: body.into(),
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A proxy router wired to `transport`.
pub fn proxy(config: ProxyConfig, transport: Arc<dyn Transport>) -> Router {
    HttpServer::with_transport(config, transport).router()
}

/// Send one request through the router and collect status, headers and body.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

/// Start a raw TCP upstream that answers every connection with `response`
/// and records each request head it receives.
pub async fn start_raw_backend(response: Vec<u8>) -> (SocketAddr, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let heads = Arc::new(Mutex::new(Vec::new()));
    let recorded = heads.clone();
    let response = Arc::new(response);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let response = response.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 4096];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        recorded
                            .lock()
                            .unwrap()
                            .push(String::from_utf8_lossy(&buf).into_owned());
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, heads)
}

/// Start a TCP upstream that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Transport that sends every request to a fixed local address over plain
/// HTTP, recording the URI the proxy originally resolved.
pub struct Loopback<T> {
    pub inner: T,
    pub addr: SocketAddr,
    pub resolved: Mutex<Vec<String>>,
}

#[async_trait]
impl<T: Transport> Transport for Loopback<T> {
    async fn send(&self, mut request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        self.resolved.lock().unwrap().push(request.uri.to_string());
        let path = request
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        request.uri = format!("http://{}{}", self.addr, path).parse().unwrap();
        self.inner.send(request).await
    }
}
