//! CLI configuration.
//!
//! Loads gateway settings from a TOML file. String values may reference
//! environment variables as `$VAR` or `${VAR}`; these are expanded before
//! parsing, and unresolved references are left untouched.
//!
//! # Example Configuration
//!
//! ```toml
//! [corporate]
//! username = "$VALITOR_USERNAME"
//! password = "${VALITOR_PASSWORD}"
//! contract_number = "123"
//! contract_id_number = "5501692829"
//! pos_id = "1"
//!
//! [pay]
//! agreement_number = "053128"
//! terminal_id = "225"
//! api_key = "$VALITOR_API_KEY"
//! url = "https://uat.valitorpay.com"
//! log_payloads = true
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to the configuration file (default: `valitor.toml`)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use valitor::{CorporateSettings, PaySettings};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "valitor.toml";

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The section needed by the command is absent.
    #[error("missing [{0}] section in configuration")]
    MissingSection(&'static str),
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Corporate payments (SOAP) settings.
    #[serde(default)]
    pub corporate: Option<CorporateSettings>,

    /// Pay (JSON) API settings.
    #[serde(default)]
    pub pay: Option<PaySettings>,
}

impl CliConfig {
    /// Loads the file at `path`. A missing file yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError`] if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigLoadError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Parses configuration text after expanding environment references.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the expanded text does not parse.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(&expand_env_vars(content, |name| std::env::var(name).ok()))
    }

    /// Returns the corporate settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::MissingSection`] if `[corporate]` is absent.
    pub fn corporate(&self) -> Result<CorporateSettings, ConfigLoadError> {
        self.corporate
            .clone()
            .ok_or(ConfigLoadError::MissingSection("corporate"))
    }

    /// Returns the pay API settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::MissingSection`] if `[pay]` is absent.
    pub fn pay(&self) -> Result<PaySettings, ConfigLoadError> {
        self.pay.clone().ok_or(ConfigLoadError::MissingSection("pay"))
    }
}

/// Replaces `$VAR` and `${VAR}` with values from `lookup`.
///
/// References `lookup` cannot resolve, and a lone `$`, are copied verbatim.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => out.push_str(&rest[start..=start + consumed]),
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "KEY" => Some("secret".to_owned()),
            "USER_1" => Some("prufa".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn test_expands_plain_and_braced() {
        assert_eq!(expand_env_vars("a=$KEY;", lookup), "a=secret;");
        assert_eq!(expand_env_vars("a=${KEY}b", lookup), "a=secretb");
        assert_eq!(expand_env_vars("$USER_1-$KEY", lookup), "prufa-secret");
    }

    #[test]
    fn test_leaves_unresolved_references() {
        assert_eq!(expand_env_vars("$MISSING", lookup), "$MISSING");
        assert_eq!(expand_env_vars("${MISSING}", lookup), "${MISSING}");
        assert_eq!(expand_env_vars("cost $ 5", lookup), "cost $ 5");
        assert_eq!(expand_env_vars("tail $", lookup), "tail $");
        assert_eq!(expand_env_vars("${open", lookup), "${open");
    }

    #[test]
    fn test_parse_both_sections() {
        let config = CliConfig::parse(
            r#"
            [corporate]
            username = "prufa"
            password = "leyni"
            contract_number = "123"
            contract_id_number = "5501692829"
            pos_id = "1"

            [pay]
            agreement_number = "053128"
            terminal_id = "225"
            api_key = "VPUAT.key"
            url = "http://localhost:8080/api"
            log_payloads = true
            "#,
        )
        .unwrap();

        let corporate = config.corporate().unwrap();
        assert_eq!(corporate.username, "prufa");
        assert_eq!(corporate.url.as_str(), valitor::config::DEFAULT_CORPORATE_URL);

        let pay = config.pay().unwrap();
        assert_eq!(pay.url.as_str(), "http://localhost:8080/api/");
        assert_eq!(pay.api_version, "2.0");
        assert!(pay.log_payloads);
    }

    #[test]
    fn test_missing_section() {
        let config = CliConfig::parse("").unwrap();
        assert!(matches!(
            config.pay(),
            Err(ConfigLoadError::MissingSection("pay"))
        ));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let config = CliConfig::load_from(Path::new("/nonexistent/valitor.toml")).unwrap();
        assert!(config.corporate.is_none());
        assert!(config.pay.is_none());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = CliConfig::parse("[pay\nterminal_id = ").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
