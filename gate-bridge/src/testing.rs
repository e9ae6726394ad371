//! Loopback HTTP server for exercising outbound calls in tests.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, HeaderMap, Method, Request, Response, Server};
use serde_json::Value;
use tokio::sync::oneshot;

/// Request captured by [`TestServer`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Path and query.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Full request body.
    pub body: Bytes,
}

/// HTTP server bound to an ephemeral loopback port.
///
/// Every request is recorded before the handler runs. The server stops when
/// dropped.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Starts a server answering every request with `handler`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if no loopback port can be bound.
    pub fn start<F, Fut>(handler: F) -> Self
    where
        F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response<Body>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let make_service = {
            let requests = Arc::clone(&requests);
            make_service_fn(move |_conn| {
                let handler = Arc::clone(&handler);
                let requests = Arc::clone(&requests);
                async move {
                    Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                        let handler = Arc::clone(&handler);
                        let requests = Arc::clone(&requests);
                        async move {
                            let (parts, body) = request.into_parts();
                            let body = hyper::body::to_bytes(body).await.unwrap_or_default();
                            let recorded = RecordedRequest {
                                method: parts.method,
                                path: parts
                                    .uri
                                    .path_and_query()
                                    .map_or_else(|| "/".to_owned(), ToString::to_string),
                                headers: parts.headers,
                                body,
                            };
                            requests
                                .lock()
                                .expect("request log poisoned")
                                .push(recorded.clone());
                            Ok::<_, Infallible>(handler(recorded).await)
                        }
                    }))
                }
            })
        };

        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = server
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
        });

        Self {
            addr,
            requests,
            shutdown: Some(tx),
        }
    }

    /// Bound socket address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received so far, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the request log.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Builds a plain-text response.
///
/// # Panics
///
/// Panics if `status` is not a valid status code.
#[must_use]
pub fn text_response(status: u16, body: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_owned()))
        .expect("valid response")
}

/// Builds a JSON response.
///
/// # Panics
///
/// Panics if `status` is not a valid status code.
#[must_use]
pub fn json_response(status: u16, body: &Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid response")
}
