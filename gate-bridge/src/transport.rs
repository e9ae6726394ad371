//! Outbound HTTP transport with deadlines, body caps, and redirect refusal.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use gate_primitives::CappedText;
use hyper::body::HttpBody;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION, USER_AGENT};
use hyper::{Body, Method, Request, StatusCode, Uri};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::http_client::{HyperClient, build_https_client};

/// Default `User-Agent` sent with every outbound request.
pub const DEFAULT_USER_AGENT: &str = concat!("skillgate/", env!("CARGO_PKG_VERSION"));

/// Request description handed to [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    timeout: Duration,
}

impl OutboundRequest {
    /// Creates a request with no headers, no body, and a 30 second deadline.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Shorthand for a `POST` request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Adds a header. Later headers with the same name replace earlier ones.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Adds every header from `headers`.
    #[must_use]
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |request, (name, value)| request.header(name, value))
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the deadline covering connect, headers, and body.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Configured deadline.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.timeout
    }

    /// Returns `true` if a header named `name` (case-insensitive) is present.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

/// Text response whose body was capped by characters.
#[derive(Clone, Debug)]
pub struct TextResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: CappedText,
}

impl TextResponse {
    /// Upstream status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Upstream `Content-Type`, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Capped body.
    #[must_use]
    pub fn body(&self) -> &CappedText {
        &self.body
    }

    /// Consumes the response and returns the capped body text.
    #[must_use]
    pub fn into_text(self) -> String {
        self.body.into_string()
    }
}

/// Raw response whose body stayed within a byte ceiling.
#[derive(Clone, Debug)]
pub struct BytesResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Bytes,
}

impl BytesResponse {
    /// Upstream status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Upstream `Content-Type`, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Shared HTTPS client used by every outbound call the gateway makes.
///
/// Redirects are refused rather than followed so a URL that passed the
/// security gate cannot bounce the request somewhere else.
#[derive(Clone)]
pub struct HttpTransport {
    client: HyperClient,
    user_agent: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Builds a transport with the bundled web PKI roots.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Transport`] if the TLS client cannot be built.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            client: build_https_client()?,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sends `request` and returns the body capped at `max_chars` characters.
    ///
    /// At most `4 * max_chars + 4` bytes are read from the wire, which is
    /// always enough to decide whether the text needs cutting.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Timeout`] when the deadline elapses,
    /// [`BridgeError::Redirect`] on any 3xx answer, and transport or
    /// configuration errors otherwise. Non-2xx statuses are returned as
    /// responses for the caller to judge.
    pub async fn fetch_text(
        &self,
        request: OutboundRequest,
        max_chars: usize,
    ) -> BridgeResult<TextResponse> {
        let byte_budget = max_chars.saturating_mul(4).saturating_add(4);
        let deadline = request.timeout;
        let exchange = async {
            let response = self.send(request).await?;
            let status = response.status();
            let content_type = content_type(&response);
            let (bytes, _) = read_limited(response.into_body(), byte_budget).await?;
            let text = String::from_utf8_lossy(&bytes);
            Ok(TextResponse {
                status,
                content_type,
                body: CappedText::new(text.into_owned(), max_chars),
            })
        };
        with_deadline(deadline, exchange).await
    }

    /// Sends `request` and returns the raw body, failing if it exceeds
    /// `max_bytes`.
    ///
    /// # Errors
    ///
    /// Same as [`HttpTransport::fetch_text`], plus
    /// [`BridgeError::ResponseTooLarge`] when the body is over the ceiling.
    pub async fn fetch_bytes(
        &self,
        request: OutboundRequest,
        max_bytes: usize,
    ) -> BridgeResult<BytesResponse> {
        let deadline = request.timeout;
        let exchange = async {
            let response = self.send(request).await?;
            let status = response.status();
            let content_type = content_type(&response);
            let (bytes, overflowed) = read_limited(response.into_body(), max_bytes).await?;
            if overflowed {
                return Err(BridgeError::ResponseTooLarge { limit: max_bytes });
            }
            Ok(BytesResponse {
                status,
                content_type,
                body: Bytes::from(bytes),
            })
        };
        with_deadline(deadline, exchange).await
    }

    async fn send(&self, request: OutboundRequest) -> BridgeResult<hyper::Response<Body>> {
        let uri = parse_url(&request.url)?;
        let mut builder = Request::builder().method(request.method.clone()).uri(uri);

        let headers = builder.headers_mut().ok_or_else(|| BridgeError::InvalidUrl {
            url: request.url.clone(),
            reason: "request could not be assembled".to_owned(),
        })?;
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|err| BridgeError::InvalidHeader {
                name: USER_AGENT.to_string(),
                reason: err.to_string(),
            })?,
        );
        for (name, value) in &request.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                    BridgeError::InvalidHeader {
                        name: name.clone(),
                        reason: err.to_string(),
                    }
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|err| BridgeError::InvalidHeader {
                    name: name.clone(),
                    reason: err.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let body = request.body.map_or_else(Body::empty, Body::from);
        let http_request = builder.body(body).map_err(|err| BridgeError::InvalidUrl {
            url: request.url.clone(),
            reason: err.to_string(),
        })?;

        debug!(method = %request.method, url = %request.url, "sending outbound request");
        let response = self
            .client
            .request(http_request)
            .await
            .map_err(|err| BridgeError::transport(err.to_string()))?;

        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            warn!(
                url = %request.url,
                status = response.status().as_u16(),
                location = location.as_deref().unwrap_or(""),
                "refusing to follow redirect"
            );
            return Err(BridgeError::Redirect {
                status: response.status().as_u16(),
                location,
            });
        }

        Ok(response)
    }
}

fn parse_url(url: &str) -> BridgeResult<Uri> {
    let uri = url.parse::<Uri>().map_err(|err| BridgeError::InvalidUrl {
        url: url.to_owned(),
        reason: err.to_string(),
    })?;
    match uri.scheme_str() {
        Some("http" | "https") if uri.host().is_some() => Ok(uri),
        Some("http" | "https") => Err(BridgeError::InvalidUrl {
            url: url.to_owned(),
            reason: "missing host".to_owned(),
        }),
        _ => Err(BridgeError::InvalidUrl {
            url: url.to_owned(),
            reason: "only http and https are supported".to_owned(),
        }),
    }
}

fn content_type(response: &hyper::Response<Body>) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn with_deadline<T>(
    deadline: Duration,
    exchange: impl Future<Output = BridgeResult<T>>,
) -> BridgeResult<T> {
    match timeout(deadline, exchange).await {
        Ok(result) => result,
        Err(_) => Err(BridgeError::Timeout { after: deadline }),
    }
}

/// Reads at most `limit` bytes, reporting whether more were available.
async fn read_limited(mut body: Body, limit: usize) -> BridgeResult<(Vec<u8>, bool)> {
    let mut buffer = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|err| BridgeError::transport(err.to_string()))?;
        let room = limit.saturating_sub(buffer.len());
        if chunk.len() > room {
            buffer.extend_from_slice(&chunk[..room]);
            return Ok((buffer, true));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok((buffer, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestServer, text_response};

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            parse_url("ftp://example.com/file"),
            Err(BridgeError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_url("not a url"),
            Err(BridgeError::InvalidUrl { .. })
        ));
        assert!(parse_url("https://example.com/x").is_ok());
    }

    #[test]
    fn later_headers_replace_earlier_ones() {
        let request = OutboundRequest::get("http://example.com")
            .header("content-type", "text/plain")
            .header("Content-Type", "application/json");
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.headers[0].1, "application/json");
        assert!(request.has_header("CONTENT-TYPE"));
    }

    #[tokio::test]
    async fn caps_text_bodies_by_characters() {
        let server = TestServer::start(|_| async { text_response(200, &"é".repeat(800)) });
        let transport = HttpTransport::new().unwrap();

        let response = transport
            .fetch_text(OutboundRequest::get(server.url("/")), 500)
            .await
            .unwrap();
        assert!(response.body().is_truncated());
        assert_eq!(
            response.into_text(),
            format!("{}{}", "é".repeat(500), gate_primitives::TRUNCATION_SUFFIX)
        );
    }

    #[tokio::test]
    async fn refuses_redirects() {
        let server = TestServer::start(|_| async {
            hyper::Response::builder()
                .status(302)
                .header(LOCATION, "http://169.254.169.254/latest")
                .body(Body::empty())
                .unwrap()
        });
        let transport = HttpTransport::new().unwrap();

        let err = transport
            .fetch_text(OutboundRequest::get(server.url("/")), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Redirect { status: 302, .. }));
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn applies_deadline() {
        let server = TestServer::start(|_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            text_response(200, "late")
        });
        let transport = HttpTransport::new().unwrap();

        let err = transport
            .fetch_text(
                OutboundRequest::get(server.url("/")).timeout(Duration::from_millis(50)),
                100,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn rejects_oversized_byte_bodies() {
        let server = TestServer::start(|_| async { text_response(200, &"x".repeat(64)) });
        let transport = HttpTransport::new().unwrap();

        let err = transport
            .fetch_bytes(OutboundRequest::get(server.url("/")), 16)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ResponseTooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn sends_headers_and_body() {
        let server = TestServer::start(|_| async { text_response(201, "created") });
        let transport = HttpTransport::new().unwrap();

        let response = transport
            .fetch_text(
                OutboundRequest::post(server.url("/hook"))
                    .header("X-Api-Key", "k")
                    .body("{\"input\":\"hi\"}"),
                100,
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let recorded = &server.requests()[0];
        assert_eq!(recorded.method, Method::POST);
        assert_eq!(recorded.path, "/hook");
        assert_eq!(recorded.headers["x-api-key"], "k");
        assert_eq!(recorded.body, Bytes::from_static(b"{\"input\":\"hi\"}"));
    }
}
