//! SOAP 1.1 envelope writer and result reader for the corporate payments service.
//!
//! Every operation of the service is a single element in the SOAP body whose
//! children carry the credentials and parameters as text. The reply wraps the
//! payload in `<{Operation}Response><{Operation}Result>`; [`read_result`]
//! locates the result element by local name, ignoring namespace prefixes, and
//! hands its content to `quick_xml`'s serde deserializer.

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::name::QName;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// XML namespace of the corporate payments service.
pub const SERVICE_NAMESPACE: &str = "http://api.valitor.is/Fyrirtaekjagreidslur/";

/// Content type of SOAP 1.1 requests.
pub const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

const ENVELOPE_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
    r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
    r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
    "<soap:Body>"
);

const ENVELOPE_CLOSE: &str = "</soap:Body></soap:Envelope>";

/// Errors produced while reading a SOAP response.
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    /// The document is not well-formed XML.
    #[error("malformed SOAP document: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The result element does not match the expected shape.
    #[error("unexpected SOAP result content: {0}")]
    Deserialize(#[from] quick_xml::de::DeError),

    /// The service answered with a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    Fault {
        /// The `faultcode` value.
        code: String,
        /// The `faultstring` value.
        message: String,
    },

    /// The expected result element is absent.
    #[error("SOAP response has no <{0}> element")]
    MissingElement(String),
}

/// A SOAP request envelope for one service operation.
///
/// Fields are emitted in insertion order, followed by the empty
/// `<Stillingar>` (settings) element every operation accepts.
///
/// Field text is embedded as given and must already be valid XML character
/// data. Call [`Envelope::escape_text`] to have `&`, `<`, `>` and quotes
/// escaped instead.
///
/// ```
/// use valitor_proto::Envelope;
///
/// let xml = Envelope::new("FaSyndarkortnumer")
///     .field("Notandanafn", "user")
///     .field("Kortnumer", "4111111111111111")
///     .render();
/// assert!(xml.contains("<Notandanafn>user</Notandanafn>"));
/// ```
#[derive(Debug, Clone)]
pub struct Envelope {
    operation: &'static str,
    fields: Vec<(&'static str, String)>,
    escape: bool,
}

impl Envelope {
    /// Starts an envelope for the given operation element.
    #[must_use]
    pub const fn new(operation: &'static str) -> Self {
        Self {
            operation,
            fields: Vec::new(),
            escape: false,
        }
    }

    /// Escapes XML markup characters in field text when rendering.
    #[must_use]
    pub const fn escape_text(mut self, enabled: bool) -> Self {
        self.escape = enabled;
        self
    }

    /// Appends a child element with the given text.
    #[must_use]
    pub fn field(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Returns the operation element name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the text of the first field with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Renders the complete SOAP document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(ENVELOPE_OPEN);
        push_open(&mut xml, self.operation, Some(SERVICE_NAMESPACE));
        for (name, value) in &self.fields {
            push_open(&mut xml, name, None);
            if self.escape {
                xml.push_str(&quick_xml::escape::escape(value.as_str()));
            } else {
                xml.push_str(value);
            }
            push_close(&mut xml, name);
        }
        xml.push_str("<Stillingar></Stillingar>");
        push_close(&mut xml, self.operation);
        xml.push_str(ENVELOPE_CLOSE);
        xml
    }
}

fn push_open(xml: &mut String, name: &str, namespace: Option<&str>) {
    xml.push('<');
    xml.push_str(name);
    if let Some(ns) = namespace {
        xml.push_str(" xmlns=\"");
        xml.push_str(ns);
        xml.push('"');
    }
    xml.push('>');
}

fn push_close(xml: &mut String, name: &str) {
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}

#[derive(Debug, Default, Deserialize)]
struct Fault {
    #[serde(default)]
    faultcode: String,
    #[serde(default)]
    faultstring: String,
}

/// Reads the content of the `result_element` element of a SOAP response.
///
/// The element is matched by local name anywhere in the document. A SOAP
/// `Fault` encountered first is reported as [`SoapError::Fault`].
///
/// # Errors
///
/// Returns [`SoapError`] if the document is malformed, carries a fault, lacks
/// the result element, or the element content does not deserialize into `T`.
pub fn read_result<T: DeserializeOwned>(body: &[u8], result_element: &str) -> Result<T, SoapError> {
    let mut reader = Reader::from_reader(body);
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let local = start.local_name();
                if local.as_ref() == result_element.as_bytes() {
                    let name = start.name().as_ref().to_vec();
                    let inner = reader.read_text(QName(&name))?;
                    return deserialize_wrapped(&inner);
                }
                if local.as_ref() == b"Fault" {
                    let name = start.name().as_ref().to_vec();
                    let inner = reader.read_text(QName(&name))?;
                    let fault: Fault = deserialize_wrapped(&inner)?;
                    return Err(SoapError::Fault {
                        code: fault.faultcode,
                        message: fault.faultstring,
                    });
                }
            }
            Event::Empty(start) if start.local_name().as_ref() == result_element.as_bytes() => {
                return deserialize_wrapped("");
            }
            Event::Eof => return Err(SoapError::MissingElement(result_element.to_owned())),
            _ => {}
        }
    }
}

fn deserialize_wrapped<T: DeserializeOwned>(inner: &str) -> Result<T, SoapError> {
    let wrapped = format!("<Result>{inner}</Result>");
    Ok(quick_xml::de::from_str(&wrapped)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(rename = "Villunumer", default)]
        code: i32,
        #[serde(rename = "Villuskilabod", default)]
        message: Option<String>,
    }

    #[test]
    fn test_render_wraps_fields_in_operation_element() {
        let xml = Envelope::new("FaHeimild")
            .field("Notandanafn", "user")
            .field("Upphaed", "100")
            .render();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(
            r#"<soap:Body><FaHeimild xmlns="http://api.valitor.is/Fyrirtaekjagreidslur/">"#
        ));
        let user = xml.find("<Notandanafn>user</Notandanafn>").unwrap();
        let amount = xml.find("<Upphaed>100</Upphaed>").unwrap();
        let settings = xml.find("<Stillingar></Stillingar>").unwrap();
        assert!(user < amount && amount < settings);
        assert!(xml.ends_with("</FaHeimild></soap:Body></soap:Envelope>"));
    }

    #[test]
    fn test_render_embeds_text_unchanged_by_default() {
        let xml = Envelope::new("FaHeimild")
            .field("Lykilord", "a&amp;b")
            .render();
        assert!(xml.contains("<Lykilord>a&amp;b</Lykilord>"));
    }

    #[test]
    fn test_render_escapes_text_when_enabled() {
        let xml = Envelope::new("FaHeimild")
            .escape_text(true)
            .field("Lykilord", "a<b&c")
            .render();
        assert!(xml.contains("<Lykilord>a&lt;b&amp;c</Lykilord>"));
    }

    #[test]
    fn test_get_returns_field_value() {
        let envelope = Envelope::new("FaHeimild").field("Gjaldmidill", "ISK");
        assert_eq!(envelope.get("Gjaldmidill"), Some("ISK"));
        assert_eq!(envelope.get("Upphaed"), None);
        assert_eq!(envelope.operation(), "FaHeimild");
    }

    #[test]
    fn test_read_result_finds_prefixed_result() {
        let body = br#"<?xml version="1.0" encoding="utf-8"?>
            <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <FaHeimildResponse xmlns="http://api.valitor.is/Fyrirtaekjagreidslur/">
                  <FaHeimildResult>
                    <Villunumer>12</Villunumer>
                    <Villuskilabod>Hafnad</Villuskilabod>
                  </FaHeimildResult>
                </FaHeimildResponse>
              </soap:Body>
            </soap:Envelope>"#;

        let sample: Sample = read_result(body, "FaHeimildResult").unwrap();
        assert_eq!(sample.code, 12);
        assert_eq!(sample.message.as_deref(), Some("Hafnad"));
    }

    #[test]
    fn test_read_result_reports_fault() {
        let body = br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <soap:Fault>
                  <faultcode>soap:Client</faultcode>
                  <faultstring>Server was unable to read request.</faultstring>
                </soap:Fault>
              </soap:Body>
            </soap:Envelope>"#;

        let err = read_result::<Sample>(body, "FaHeimildResult").unwrap_err();
        match err {
            SoapError::Fault { code, message } => {
                assert_eq!(code, "soap:Client");
                assert_eq!(message, "Server was unable to read request.");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_read_result_missing_element() {
        let body = b"<soap:Envelope><soap:Body></soap:Body></soap:Envelope>";
        let err = read_result::<Sample>(body, "FaHeimildResult").unwrap_err();
        assert!(matches!(err, SoapError::MissingElement(name) if name == "FaHeimildResult"));
    }

    #[test]
    fn test_read_result_rejects_mismatched_tags() {
        let body = b"<soap:Envelope><soap:Body></soap:Envelop></soap:Body>";
        let err = read_result::<Sample>(body, "FaHeimildResult").unwrap_err();
        assert!(matches!(err, SoapError::Xml(_)));
    }

    #[test]
    fn test_read_result_rejects_wrong_content_type() {
        let body = b"<R><FaHeimildResult><Villunumer>abc</Villunumer></FaHeimildResult></R>";
        let err = read_result::<Sample>(body, "FaHeimildResult").unwrap_err();
        assert!(matches!(err, SoapError::Deserialize(_)));
    }
}
