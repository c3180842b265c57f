//! `reqwest`-backed [`Transport`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use valitor::TransportError;
use valitor::gateway::{BoxFuture, Outbound, Reply, Transport};

use crate::constants::{DEFAULT_TIMEOUT, MAX_REDIRECTS};

/// Sends gateway requests with a shared [`reqwest::Client`].
///
/// Every request is a single POST with the timeout applied per request.
/// Nothing is retried, and any status code is returned as a [`Reply`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport with a fresh client and the default timeout.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .expect("failed to build reqwest::Client");
        Self::with_client(client)
    }

    /// Creates a transport around a pre-configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, request: Outbound) -> Result<Reply, TransportError> {
        let mut builder = self
            .client
            .post(request.url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, request.content_type);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::new("failed to send request", e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new("failed to read response body", e))?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(status, bytes = body.len(), "gateway replied");

        Ok(Reply::new(status, body.to_vec()))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn post(&self, request: Outbound) -> BoxFuture<'_, Result<Reply, TransportError>> {
        Box::pin(self.send(request))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn outbound(uri: &str, body: &str) -> Outbound {
        Outbound {
            url: format!("{uri}/echo").parse().unwrap(),
            content_type: "text/plain; charset=utf-8",
            headers: vec![("x-test", "yes".to_owned())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "text/plain; charset=utf-8"))
            .and(header("x-test", "yes"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("world"))
            .expect(1)
            .mount(&server)
            .await;

        let reply = ReqwestTransport::new()
            .post(outbound(&server.uri(), "hello"))
            .await
            .unwrap();
        assert_eq!(reply, Reply::new(200, "world"));
    }

    #[tokio::test]
    async fn test_error_status_is_a_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let reply = ReqwestTransport::default()
            .post(outbound(&server.uri(), ""))
            .await
            .unwrap();
        assert_eq!(reply.status, 500);
        assert_eq!(reply.text(), "boom");
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().with_timeout(Duration::from_millis(100));
        let err = transport
            .post(outbound(&server.uri(), ""))
            .await
            .unwrap_err();
        assert_eq!(err.context, "failed to send request");
    }
}
