//! Ready-to-use clients over [`ReqwestTransport`].

use std::sync::Arc;

use valitor::{CorporateClient, CorporateSettings, PayClient, PaySettings};

use crate::transport::ReqwestTransport;

/// Creates a corporate payments client with a default [`ReqwestTransport`].
#[must_use]
pub fn corporate_client(settings: CorporateSettings) -> CorporateClient {
    CorporateClient::new(settings, Arc::new(ReqwestTransport::new()))
}

/// Creates a pay API client with a default [`ReqwestTransport`].
#[must_use]
pub fn pay_client(settings: PaySettings) -> PayClient {
    PayClient::new(settings, Arc::new(ReqwestTransport::new()))
}
