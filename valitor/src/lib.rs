#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Typed client core for the Valitor payment gateways.
//!
//! Valitor offers two APIs: the legacy *corporate payments* service (SOAP 1.1
//! with Icelandic element names) and the *pay* API (camelCase JSON). Both are
//! driven through the same pipeline: each call validates its parameters,
//! encodes a request, POSTs it through a [`Transport`](gateway::Transport) and
//! decodes the reply into a typed result or a [`GatewayError`].
//!
//! This crate has no HTTP client of its own; `valitor-http` provides one.
//!
//! # Modules
//!
//! - [`card`] - The payment card value object
//! - [`config`] - Settings for both gateways
//! - [`corporate`] - Corporate payments operations ([`CorporateClient`])
//! - [`error`] - Error types and their classification
//! - [`gateway`] - Protocol and operation traits and the shared request pipeline
//! - [`id`] - Transaction lifecycle id generation
//! - [`pay`] - Pay API operations ([`PayClient`])
//! - [`status`] - Descriptions for non-200 replies
//! - [`validate`] - Required-field checks
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing spans for every gateway call and payload
//!   logging when `log_payloads` is set

pub mod card;
pub mod config;
pub mod corporate;
pub mod error;
pub mod gateway;
pub mod id;
pub mod pay;
pub mod status;
pub mod validate;

pub use card::{Card, Expiry};
pub use config::{CorporateSettings, PaySettings};
pub use corporate::CorporateClient;
pub use error::{EncodeError, ErrorKind, GatewayError, RemoteError, TransportError};
pub use gateway::{Gateway, Transport};
pub use pay::PayClient;
pub use validate::ValidationError;
pub use valitor_proto as proto;
