//! Wire format types for the Valitor payment gateways.
//!
//! Valitor exposes two generations of API. The legacy *corporate payments*
//! service speaks SOAP 1.1 with Icelandic element names; the newer *pay* API
//! speaks camelCase JSON. This crate holds the serialization-level types for
//! both and has no knowledge of HTTP.
//!
//! # Modules
//!
//! - [`receipt`] — The fixed-schema transaction receipt shared by the SOAP results
//! - [`soap`] — SOAP envelope writer and result reader
//! - [`corporate`] — Result types of the corporate payments (SOAP) service
//! - [`pay`] — Request and response bodies of the pay (JSON) API

pub mod corporate;
mod de;
pub mod pay;
pub mod receipt;
pub mod soap;

pub use corporate::CorporateResult;
pub use pay::GatewayStatus;
pub use receipt::Receipt;
pub use soap::{Envelope, SoapError};
