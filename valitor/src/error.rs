//! Error types for gateway operations.
//!
//! Every operation returns [`GatewayError`], which partitions failures by
//! where they happened. A request can be rejected locally
//! ([`ValidationError`]) or fail to serialize ([`EncodeError`]). The HTTP
//! exchange can fail ([`TransportError`]). The gateway can answer with a
//! business error ([`RemoteError`]) or with something unreadable
//! ([`DecodeError`]). Nothing is retried.

use std::fmt;

use valitor_proto::SoapError;

pub use crate::validate::ValidationError;

/// Boxed error source carried by [`TransportError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required field was missing or malformed. No request was sent.
    Validation,
    /// The request body could not be serialized. No request was sent.
    Encode,
    /// The HTTP exchange did not complete.
    Transport,
    /// The gateway processed the request and refused it.
    Remote,
    /// The gateway reply could not be decoded.
    Decode,
}

/// Error returned by every gateway operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Local validation failed before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request body could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The request could not be sent or the reply could not be received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The gateway returned an error code.
    #[error(transparent)]
    Remote(Box<RemoteError>),

    /// The reply was not a well-formed gateway response.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl GatewayError {
    /// Returns the kind of failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Remote(_) => ErrorKind::Remote,
            Self::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Whether the failure is a system-level one (encode, transport or decode)
    /// rather than a caller or business error.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Encode | ErrorKind::Transport | ErrorKind::Decode
        )
    }

    /// Returns the gateway error, if this is one.
    #[must_use]
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(remote) => Some(remote),
            _ => None,
        }
    }

    /// Returns the validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<ValidationError> {
        match self {
            Self::Validation(err) => Some(*err),
            _ => None,
        }
    }
}

impl From<RemoteError> for GatewayError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(Box::new(err))
    }
}

/// HTTP-level failure.
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct TransportError {
    /// What was being attempted (e.g. `"failed to send request"`).
    pub context: &'static str,
    /// Underlying error.
    #[source]
    pub source: BoxError,
}

impl TransportError {
    /// Creates a transport error with context.
    pub fn new(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            context,
            source: source.into(),
        }
    }
}

/// A request body could not be serialized.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// JSON serialization failed.
    #[error("failed to encode JSON request: {0}")]
    Json(#[from] serde_json::Error),
}

/// The gateway reply could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// SOAP/XML reply was malformed or incomplete.
    #[error("invalid SOAP response: {0}")]
    Xml(#[from] SoapError),

    /// JSON reply was malformed.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Business error reported by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteError {
    /// Gateway error code (the SOAP error number, the JSON response code, or
    /// the HTTP status).
    pub code: String,
    /// Gateway or synthesized description.
    pub message: String,
    /// Gateway log reference, when the gateway supplies one.
    pub log_id: Option<String>,
    /// Raw response body of a non-200 JSON reply.
    pub body: Option<String>,
    /// Transaction lifecycle id sent with the request, when there was one.
    pub transaction_lifecycle_id: Option<String>,
}

impl RemoteError {
    /// Creates a remote error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the gateway log reference.
    #[must_use]
    pub fn with_log_id(mut self, log_id: impl Into<String>) -> Self {
        self.log_id = Some(log_id.into());
        self
    }

    /// Attaches the raw response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attaches the transaction lifecycle id.
    #[must_use]
    pub fn with_transaction_lifecycle_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_lifecycle_id = Some(id.into());
        self
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gateway error {}: {}", self.code, self.message)?;
        if let Some(log_id) = &self.log_id {
            write!(f, " (log id {log_id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for RemoteError {}

/// Invalid client settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The endpoint URL does not parse.
    #[error("invalid endpoint url {url:?}: {source}")]
    Url {
        /// The rejected input.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_system_classification() {
        let validation = GatewayError::from(ValidationError::MissingCvc);
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(!validation.is_system());
        assert_eq!(validation.as_validation(), Some(ValidationError::MissingCvc));

        let transport = GatewayError::from(TransportError::new("failed to send request", "refused"));
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert!(transport.is_system());

        let remote = GatewayError::from(RemoteError::new("5", "declined"));
        assert_eq!(remote.kind(), ErrorKind::Remote);
        assert!(!remote.is_system());
        assert_eq!(remote.as_remote().map(|r| r.code.as_str()), Some("5"));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode = GatewayError::from(DecodeError::from(json));
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert!(decode.is_system());

        let json = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let encode = GatewayError::from(EncodeError::from(json));
        assert_eq!(encode.kind(), ErrorKind::Encode);
        assert!(encode.is_system());
        assert!(encode.to_string().starts_with("failed to encode JSON request"));
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = GatewayError::from(ValidationError::MissingCurrency);
        assert_eq!(err.to_string(), "Currency missing");
    }

    #[test]
    fn test_remote_display_includes_log_id() {
        let err = RemoteError::new("12", "Hafnad").with_log_id("LOG-1");
        assert_eq!(err.to_string(), "gateway error 12: Hafnad (log id LOG-1)");
    }

    #[test]
    fn test_transport_display_includes_context() {
        let err = TransportError::new("failed to send request", "connection refused");
        assert_eq!(err.to_string(), "failed to send request: connection refused");
    }
}
