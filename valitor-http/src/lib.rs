//! HTTP transport for the Valitor gateway clients.
//!
//! Provides [`ReqwestTransport`], a [`valitor::Transport`] backed by
//! `reqwest`, and constructors for ready-to-use clients.
//!
//! # Modules
//!
//! - [`constants`] - Timeouts and redirect limits
//! - [`transport`] - The `reqwest` transport
//! - [`client`] - Client constructors

pub mod client;
pub mod constants;
pub mod transport;

pub use client::{corporate_client, pay_client};
pub use transport::ReqwestTransport;
