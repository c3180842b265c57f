//! Client settings for both gateways.
//!
//! Settings are built once and shared read-only by every call made through a
//! client. Both types deserialize from configuration files; a missing or blank
//! `url` falls back to the UAT endpoint.

use std::fmt;

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::error::ConfigError;

/// Default corporate payments (SOAP) endpoint.
pub const DEFAULT_CORPORATE_URL: &str =
    "https://api.processing.uat.valitor.com/Fyrirtaekjagreidslur/Fyrirtaekjagreidslur.asmx";

/// Default pay (JSON) API base URL.
pub const DEFAULT_PAY_URL: &str = "https://uat.valitorpay.com/";

pub(crate) fn default_corporate_url() -> Url {
    Url::parse(DEFAULT_CORPORATE_URL).expect("default corporate url is valid")
}

fn default_pay_url() -> Url {
    Url::parse(DEFAULT_PAY_URL).expect("default pay url is valid")
}

fn default_api_version() -> String {
    valitor_proto::pay::DEFAULT_API_VERSION.to_owned()
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::Url {
        url: value.to_owned(),
        source,
    })
}

/// Parses a base URL so relative endpoint paths join beneath it.
///
/// Trailing slashes are collapsed to exactly one.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let mut normalized = value.trim_end_matches('/').to_owned();
    normalized.push('/');
    parse_url(&normalized)
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
    base.join(path).map_err(|source| ConfigError::Url {
        url: path.to_owned(),
        source,
    })
}

fn corporate_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Url, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(url) if !url.trim().is_empty() => {
            parse_url(url.trim()).map_err(serde::de::Error::custom)
        }
        _ => Ok(default_corporate_url()),
    }
}

fn pay_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Url, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(url) if !url.trim().is_empty() => {
            parse_base_url(url.trim()).map_err(serde::de::Error::custom)
        }
        _ => Ok(default_pay_url()),
    }
}

/// Credentials and endpoint for the corporate payments (SOAP) service.
///
/// `Debug` output hides the password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CorporateSettings {
    /// Web service user name (`Notandanafn`).
    pub username: String,
    /// Web service password (`Lykilord`).
    pub password: String,
    /// Merchant contract number (`Samningsnumer`).
    pub contract_number: String,
    /// National id of the contract holder (`SamningsKennitala`).
    pub contract_id_number: String,
    /// POS identifier (`PosiID`).
    pub pos_id: String,
    /// Service endpoint.
    #[serde(default = "default_corporate_url", deserialize_with = "corporate_url")]
    pub url: Url,
    /// Log request and response bodies at `DEBUG` level.
    #[serde(default)]
    pub log_payloads: bool,
    /// Escape XML markup in envelope field text. When off, values are sent
    /// as given and must already be valid XML text.
    #[serde(default)]
    pub escape_xml: bool,
}

impl CorporateSettings {
    /// Creates settings for the default endpoint.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        contract_number: impl Into<String>,
        contract_id_number: impl Into<String>,
        pos_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            contract_number: contract_number.into(),
            contract_id_number: contract_id_number.into(),
            pos_id: pos_id.into(),
            url: default_corporate_url(),
            log_payloads: false,
            escape_xml: false,
        }
    }

    /// Sets the endpoint. A blank value keeps the current endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Url`] if `url` does not parse.
    pub fn with_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if !url.is_empty() {
            self.url = parse_url(url)?;
        }
        Ok(self)
    }

    /// Enables or disables payload logging.
    #[must_use]
    pub fn with_log_payloads(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Enables or disables escaping of envelope field text.
    #[must_use]
    pub fn with_escape_xml(mut self, enabled: bool) -> Self {
        self.escape_xml = enabled;
        self
    }
}

impl fmt::Debug for CorporateSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorporateSettings")
            .field("username", &self.username)
            .field("has_password", &!self.password.is_empty())
            .field("contract_number", &self.contract_number)
            .field("contract_id_number", &self.contract_id_number)
            .field("pos_id", &self.pos_id)
            .field("url", &self.url.as_str())
            .field("log_payloads", &self.log_payloads)
            .field("escape_xml", &self.escape_xml)
            .finish()
    }
}

/// Credentials and endpoint for the pay (JSON) API.
///
/// `Debug` output hides the API key.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PaySettings {
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// API key sent as `Authorization: APIKey <key>`.
    pub api_key: String,
    /// Value of the `valitor-api-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// API base URL, always ending in `/`.
    #[serde(default = "default_pay_url", deserialize_with = "pay_url")]
    pub url: Url,
    /// Log request and response bodies at `DEBUG` level.
    #[serde(default)]
    pub log_payloads: bool,
}

impl PaySettings {
    /// Creates settings for the default endpoint and API version.
    #[must_use]
    pub fn new(
        agreement_number: impl Into<String>,
        terminal_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            agreement_number: agreement_number.into(),
            terminal_id: terminal_id.into(),
            api_key: api_key.into(),
            api_version: default_api_version(),
            url: default_pay_url(),
            log_payloads: false,
        }
    }

    /// Sets the API base URL. A blank value keeps the current URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Url`] if `url` does not parse.
    pub fn with_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if !url.is_empty() {
            self.url = parse_base_url(url)?;
        }
        Ok(self)
    }

    /// Sets the API version header value.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Enables or disables payload logging.
    #[must_use]
    pub fn with_log_payloads(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Resolves an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Url`] if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        join_endpoint(&self.url, path)
    }

    /// Resolves an endpoint path against the UAT base URL.
    pub(crate) fn uat_endpoint(path: &str) -> Result<Url, ConfigError> {
        join_endpoint(&default_pay_url(), path)
    }
}

impl fmt::Debug for PaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaySettings")
            .field("agreement_number", &self.agreement_number)
            .field("terminal_id", &self.terminal_id)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("api_version", &self.api_version)
            .field("url", &self.url.as_str())
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let corporate = CorporateSettings::new("u", "p", "c", "k", "1");
        assert_eq!(corporate.url.as_str(), DEFAULT_CORPORATE_URL);

        let pay = PaySettings::new("053128", "225", "key");
        assert_eq!(pay.url.as_str(), DEFAULT_PAY_URL);
        assert_eq!(pay.api_version, "2.0");
    }

    #[test]
    fn test_blank_url_keeps_default() {
        let pay = PaySettings::new("a", "t", "k").with_url("   ").unwrap();
        assert_eq!(pay.url.as_str(), DEFAULT_PAY_URL);
        let corporate = CorporateSettings::new("u", "p", "c", "k", "1")
            .with_url("")
            .unwrap();
        assert_eq!(corporate.url.as_str(), DEFAULT_CORPORATE_URL);
    }

    #[test]
    fn test_pay_url_is_normalized_for_joining() {
        let pay = PaySettings::new("a", "t", "k")
            .with_url("http://localhost:8080/api//")
            .unwrap();
        assert_eq!(pay.url.as_str(), "http://localhost:8080/api/");
        assert_eq!(
            pay.endpoint("Payment/CardPayment").unwrap().as_str(),
            "http://localhost:8080/api/Payment/CardPayment"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = PaySettings::new("a", "t", "k").with_url("not a url").unwrap_err();
        assert!(matches!(err, ConfigError::Url { .. }));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let pay: PaySettings = serde_json::from_str(
            r#"{"agreement_number":"053128","terminal_id":"225","api_key":"k","url":""}"#,
        )
        .unwrap();
        assert_eq!(pay.url.as_str(), DEFAULT_PAY_URL);
        assert_eq!(pay.api_version, "2.0");
        assert!(!pay.log_payloads);

        let corporate: CorporateSettings = serde_json::from_str(
            r#"{"username":"u","password":"p","contract_number":"c",
                "contract_id_number":"k","pos_id":"1","url":"http://localhost/svc.asmx"}"#,
        )
        .unwrap();
        assert_eq!(corporate.url.as_str(), "http://localhost/svc.asmx");
        assert!(!corporate.escape_xml);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let corporate = CorporateSettings::new("user", "hunter2", "c", "k", "1");
        assert!(!format!("{corporate:?}").contains("hunter2"));
        let pay = PaySettings::new("a", "t", "VPUAT.secret");
        assert!(!format!("{pay:?}").contains("VPUAT.secret"));
    }
}
