//! The generic request pipeline shared by both gateways.
//!
//! A gateway call is an [`Operation`] executed over a [`Protocol`]:
//!
//! 1. [`Operation::validate`] runs the operation's required-field checks.
//! 2. [`Operation::encode`] maps parameters and settings to the wire payload.
//! 3. [`Protocol::prepare`] turns the payload into an [`Outbound`] POST.
//! 4. The [`Transport`] performs the POST and returns the raw [`Reply`].
//! 5. [`Operation::decode`] turns the reply into a typed result or a
//!    [`GatewayError`].
//!
//! The XML and JSON gateways are the two [`Protocol`] implementations,
//! [`Soap`](crate::corporate::Soap) and [`Json`](crate::pay::Json). The HTTP
//! client is a trait object so the pipeline can run against any transport.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use url::Url;

use crate::card::Card;
use crate::error::{GatewayError, TransportError, ValidationError};
use crate::id::{IdGenerator, UuidGenerator};

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully prepared HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Target URL.
    pub url: Url,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// Additional headers.
    pub headers: Vec<(&'static str, String)>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Outbound {
    /// Returns the value of the named header, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    /// Creates a reply.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs a single HTTP POST.
///
/// Implementations must not retry. Any failure to obtain a status and body is
/// reported as a [`TransportError`]; non-2xx statuses are not errors at this
/// layer.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the reply.
    fn post(&self, request: Outbound) -> BoxFuture<'_, Result<Reply, TransportError>>;
}

/// A wire protocol: how a payload becomes an HTTP request.
pub trait Protocol: Send + Sync + 'static {
    /// Client settings for this protocol.
    type Settings: fmt::Debug + Send + Sync;
    /// Encoded request produced by operations.
    type Payload: Send;
    /// Protocol name used in tracing.
    const NAME: &'static str;

    /// Builds the HTTP request for `payload`.
    ///
    /// Requests for a test card go to the protocol's UAT endpoint instead of
    /// the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the request cannot be built.
    fn prepare(
        settings: &Self::Settings,
        payload: Self::Payload,
        test_card: bool,
    ) -> Result<Outbound, GatewayError>;

    /// Whether request and response bodies should be logged.
    fn log_payloads(settings: &Self::Settings) -> bool;
}

/// One remote operation over protocol `P`.
pub trait Operation<P: Protocol>: Sync {
    /// Typed result.
    type Output: Send;

    /// Operation name used in tracing.
    fn name(&self) -> &'static str;

    /// The card the operation acts on.
    fn card(&self) -> &Card;

    /// Runs the operation's required-field checks in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Maps parameters and settings to the wire payload.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the payload cannot be built.
    fn encode(&self, settings: &P::Settings) -> Result<P::Payload, GatewayError>;

    /// Maps the raw reply to the typed result.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Remote`] for gateway-reported failures and
    /// [`GatewayError::Decode`] for unreadable replies.
    fn decode(&self, reply: Reply) -> Result<Self::Output, GatewayError>;
}

/// A client for protocol `P`: settings, transport and id source.
///
/// Cloning is cheap; clones share settings and transport.
pub struct Gateway<P: Protocol> {
    settings: Arc<P::Settings>,
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
}

impl<P: Protocol> Gateway<P> {
    /// Creates a gateway that issues UUID v4 lifecycle ids.
    pub fn new(settings: P::Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Replaces the lifecycle id source.
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Returns the client settings.
    #[must_use]
    pub fn settings(&self) -> &P::Settings {
        &self.settings
    }

    /// Returns `id` if it is non-blank, otherwise a freshly generated id.
    pub(crate) fn resolve_id(&self, id: Option<&str>) -> String {
        match id {
            Some(id) if !id.trim().is_empty() => id.to_owned(),
            _ => self.ids.generate(),
        }
    }

    /// Validates, encodes, sends and decodes `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] from whichever stage failed. Validation
    /// failures never reach the transport.
    #[cfg(feature = "telemetry")]
    pub async fn execute<O: Operation<P>>(&self, operation: &O) -> Result<O::Output, GatewayError> {
        with_span(
            self.execute_traced(operation),
            tracing::info_span!(
                "valitor.gateway.execute",
                protocol = P::NAME,
                operation = operation.name(),
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            ),
        )
        .await
    }

    /// Validates, encodes, sends and decodes `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] from whichever stage failed. Validation
    /// failures never reach the transport.
    #[cfg(not(feature = "telemetry"))]
    pub async fn execute<O: Operation<P>>(&self, operation: &O) -> Result<O::Output, GatewayError> {
        self.execute_traced(operation).await
    }

    async fn execute_traced<O: Operation<P>>(&self, operation: &O) -> Result<O::Output, GatewayError> {
        let result = self.run(operation).await;
        record_result_on_span(&result);
        result
    }

    async fn run<O: Operation<P>>(&self, operation: &O) -> Result<O::Output, GatewayError> {
        operation.validate()?;
        let payload = operation.encode(&self.settings)?;
        let outbound = P::prepare(&self.settings, payload, operation.card().test)?;

        #[cfg(feature = "telemetry")]
        if P::log_payloads(&self.settings) {
            tracing::debug!(
                url = %outbound.url,
                body = %String::from_utf8_lossy(&outbound.body),
                "gateway request"
            );
        }

        let reply = self.transport.post(outbound).await?;

        #[cfg(feature = "telemetry")]
        if P::log_payloads(&self.settings) {
            tracing::debug!(status = reply.status, body = %reply.text(), "gateway response");
        }

        operation.decode(reply)
    }
}

impl<P: Protocol> Clone for Gateway<P> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            transport: Arc::clone(&self.transport),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl<P: Protocol> fmt::Debug for Gateway<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("protocol", &P::NAME)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R, GatewayError>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, kind = ?err.kind(), "gateway call failed");
        }
    }
}

/// Records the outcome of a call on the current span.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R>(_result: &Result<R, GatewayError>) {}

/// Instruments a future with a given tracing span.
#[cfg(feature = "telemetry")]
fn with_span<F: Future>(fut: F, span: Span) -> impl Future<Output = F::Output> {
    fut.instrument(span)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory transport that records requests and replays canned replies.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        pub requests: Mutex<Vec<Outbound>>,
        replies: Mutex<VecDeque<Reply>>,
    }

    impl RecordingTransport {
        pub fn replying(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::default(),
                replies: Mutex::new(replies.into_iter().collect()),
            })
        }

        pub fn empty() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn sent(&self) -> Vec<Outbound> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_body(&self) -> String {
            let requests = self.requests.lock().unwrap();
            String::from_utf8(requests.last().unwrap().body.clone()).unwrap()
        }
    }

    impl Transport for RecordingTransport {
        fn post(&self, request: Outbound) -> BoxFuture<'_, Result<Reply, TransportError>> {
            self.requests.lock().unwrap().push(request);
            let reply = self.replies.lock().unwrap().pop_front();
            Box::pin(async move {
                reply.ok_or_else(|| TransportError::new("failed to send request", "connection refused"))
            })
        }
    }
}
