//! Result types and operation names of the corporate payments (SOAP) service.

use serde::Deserialize;

use crate::receipt::Receipt;

/// A SOAP operation: the request element and the result element of its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoapAction {
    /// Element name of the request body (e.g. `FaHeimild`).
    pub element: &'static str,
    /// Element name of the result inside the response (e.g. `FaHeimildResult`).
    pub result: &'static str,
}

/// Issues a virtual card number for a real card.
pub const VIRTUAL_NUMBER: SoapAction = SoapAction {
    element: "FaSyndarkortnumer",
    result: "FaSyndarkortnumerResult",
};

/// Authorizes and captures a payment on a virtual card number.
pub const AUTHORIZE: SoapAction = SoapAction {
    element: "FaHeimild",
    result: "FaHeimildResult",
};

/// Authorizes a payment without capturing it.
pub const AUTHORIZE_ONLY: SoapAction = SoapAction {
    element: "FaAdeinsheimild",
    result: "FaAdeinsheimildResult",
};

/// Captures a previous authorization-only transaction.
pub const USE_AUTHORIZATION: SoapAction = SoapAction {
    element: "NotaAdeinsheimild",
    result: "NotaAdeinsheimildResult",
};

/// Refunds an amount to a virtual card number.
pub const REFUND: SoapAction = SoapAction {
    element: "FaEndurgreitt",
    result: "FaEndurgreittResult",
};

/// Invalidates (voids) a transaction.
pub const INVALIDATE: SoapAction = SoapAction {
    element: "FaOgildingu",
    result: "FaOgildinguResult",
};

/// Updates the expiry date behind a virtual card number.
pub const UPDATE_EXPIRATION: SoapAction = SoapAction {
    element: "UppfaeraGildistima",
    result: "UppfaeraGildistimaResult",
};

/// Looks up the last four digits of the card behind a virtual card number.
pub const LAST_FOUR_DIGITS: SoapAction = SoapAction {
    element: "FaSidustuFjoraIKortnumeriUtFraSyndarkortnumeri",
    result: "FaSidustuFjoraIKortnumeriUtFraSyndarkortnumeriResult",
};

/// Every operation of the service.
pub const ALL_ACTIONS: [SoapAction; 8] = [
    VIRTUAL_NUMBER,
    AUTHORIZE,
    AUTHORIZE_ONLY,
    USE_AUTHORIZATION,
    REFUND,
    INVALIDATE,
    UPDATE_EXPIRATION,
    LAST_FOUR_DIGITS,
];

/// Content of any `{Operation}Result` element.
///
/// All operations share the error triple; the remaining fields are filled
/// only by the operations that return them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CorporateResult {
    /// Gateway error number; `0` means success.
    #[serde(
        rename = "Villunumer",
        default,
        deserialize_with = "crate::de::blank_as_default"
    )]
    pub error_code: i32,

    /// Gateway error message.
    #[serde(rename = "Villuskilabod", default)]
    pub error_message: Option<String>,

    /// Gateway log reference for the error.
    #[serde(rename = "VilluLogID", default)]
    pub error_log_id: Option<String>,

    /// Issued virtual card number.
    #[serde(rename = "Syndarkortnumer", default)]
    pub virtual_number: Option<String>,

    /// Transaction receipt.
    #[serde(rename = "Kvittun", default)]
    pub receipt: Option<Receipt>,

    /// Last four digits of the real card number.
    #[serde(rename = "Kortnumer", default)]
    pub card_number: Option<String>,
}

impl CorporateResult {
    /// Whether the gateway reported success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::read_result;

    #[test]
    fn test_result_elements_follow_operation_names() {
        for action in ALL_ACTIONS {
            assert_eq!(action.result, format!("{}Result", action.element));
        }
    }

    #[test]
    fn test_authorization_result_with_receipt() {
        let body = br#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
              <soap:Body>
                <FaHeimildResponse xmlns="http://api.valitor.is/Fyrirtaekjagreidslur/">
                  <FaHeimildResult>
                    <Villunumer>0</Villunumer>
                    <Villuskilabod />
                    <Kvittun>
                      <Kortnumer>530425******2887</Kortnumer>
                      <Upphaed>500</Upphaed>
                      <Faerslunumer>000777</Faerslunumer>
                    </Kvittun>
                  </FaHeimildResult>
                </FaHeimildResponse>
              </soap:Body>
            </soap:Envelope>"#;

        let result: CorporateResult = read_result(body, AUTHORIZE.result).unwrap();
        assert!(result.is_success());
        let receipt = result.receipt.unwrap();
        assert_eq!(receipt.amount, Some(500));
        assert_eq!(receipt.transaction_id.as_deref(), Some("000777"));
        assert!(result.card_number.is_none());
    }

    #[test]
    fn test_authorization_with_empty_receipt_numbers_succeeds() {
        let body = br"<Envelope><Body><FaHeimildResponse><FaHeimildResult>
                <Villunumer>0</Villunumer>
                <Kvittun><PosiID/><Upphaed/><Faerslunumer>12</Faerslunumer></Kvittun>
            </FaHeimildResult></FaHeimildResponse></Body></Envelope>";

        let result: CorporateResult = read_result(body, AUTHORIZE.result).unwrap();
        assert!(result.is_success());
        let receipt = result.receipt.unwrap();
        assert_eq!(receipt.pos_id, None);
        assert_eq!(receipt.amount, None);
        assert_eq!(receipt.transaction_id.as_deref(), Some("12"));
    }

    #[test]
    fn test_error_result() {
        let body = br"<Envelope><Body><FaSyndarkortnumerResponse><FaSyndarkortnumerResult>
                <Villunumer>5</Villunumer>
                <Villuskilabod>Rangt kortnumer</Villuskilabod>
                <VilluLogID>LOG-42</VilluLogID>
            </FaSyndarkortnumerResult></FaSyndarkortnumerResponse></Body></Envelope>";

        let result: CorporateResult = read_result(body, VIRTUAL_NUMBER.result).unwrap();
        assert!(!result.is_success());
        assert_eq!(result.error_code, 5);
        assert_eq!(result.error_message.as_deref(), Some("Rangt kortnumer"));
        assert_eq!(result.error_log_id.as_deref(), Some("LOG-42"));
        assert!(result.virtual_number.is_none());
    }
}
