//! The transaction receipt (`Kvittun`) returned by the corporate payments service.
//!
//! Authorization, refund and invalidation results all embed the same receipt
//! schema. The gateway sends it with Icelandic element names; it serializes to
//! camelCase JSON so it can be stored or forwarded, and that JSON form reads
//! back into an identical [`Receipt`].
//!
//! Numeric and boolean elements the gateway sends empty (`<PosiID/>`) read as
//! absent.

use serde::{Deserialize, Serialize};

/// Summary of a settled transaction.
///
/// Every field is optional: the gateway omits the ones that do not apply to
/// the operation, and absent fields are skipped when serializing.
///
/// # JSON Format
///
/// ```json
/// {
///   "companyName": "Prufufyrirtæki",
///   "maskedPan": "530425******2887",
///   "amount": 100,
///   "transactionId": "123456",
///   "authorizationId": "654321",
///   "invalidated": false
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Receipt {
    /// Merchant name.
    #[serde(
        rename(deserialize = "VerslunNafn"),
        alias = "companyName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_name: Option<String>,

    /// Merchant street address.
    #[serde(
        rename(deserialize = "VerslunHeimilisfang"),
        alias = "companyAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_address: Option<String>,

    /// Merchant city.
    #[serde(
        rename(deserialize = "VerslunStadur"),
        alias = "companyCity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_city: Option<String>,

    /// Card brand name (e.g. `"MasterCard"`).
    #[serde(
        rename(deserialize = "TegundKorts"),
        alias = "cardTypeName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub card_type_name: Option<String>,

    /// Card brand code.
    #[serde(
        rename(deserialize = "TegundKortsKodi"),
        alias = "cardTypeCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub card_type_code: Option<String>,

    /// Transaction date as printed by the gateway.
    #[serde(
        rename(deserialize = "Dagsetning"),
        alias = "date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    /// Transaction time as printed by the gateway.
    #[serde(
        rename(deserialize = "Timi"),
        alias = "time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,

    /// Masked card number.
    #[serde(
        rename(deserialize = "Kortnumer"),
        alias = "maskedPan",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub masked_pan: Option<String>,

    /// Amount in minor units.
    #[serde(
        rename(deserialize = "Upphaed"),
        alias = "amount",
        default,
        deserialize_with = "crate::de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<i64>,

    /// Gateway transaction number. Used as the authorization number when
    /// invalidating or capturing.
    #[serde(
        rename(deserialize = "Faerslunumer"),
        alias = "transactionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_id: Option<String>,

    /// Processor information line.
    #[serde(
        rename(deserialize = "Faersluhirdir"),
        alias = "processorInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub processor_info: Option<String>,

    /// Issuer authorization code.
    #[serde(
        rename(deserialize = "Heimildarnumer"),
        alias = "authorizationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authorization_id: Option<String>,

    /// Merchant position number.
    #[serde(
        rename(deserialize = "StadsetningNumer"),
        alias = "positionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub position_id: Option<String>,

    /// Workstation number.
    #[serde(
        rename(deserialize = "UtstodNumer"),
        alias = "workstationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workstation_id: Option<String>,

    /// Whether the transaction has been invalidated.
    #[serde(
        rename(deserialize = "BuidAdOgilda"),
        alias = "invalidated",
        default,
        deserialize_with = "crate::de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub invalidated: Option<bool>,

    /// Settlement batch number.
    #[serde(
        rename(deserialize = "Bunkanumer"),
        alias = "batchNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub batch_number: Option<String>,

    /// Merchant (seller) number.
    #[serde(
        rename(deserialize = "Soluadilinumer"),
        alias = "sellerId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub seller_id: Option<String>,

    /// Software identifier.
    #[serde(
        rename(deserialize = "Hugbunadarnumer"),
        alias = "softwareId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub software_id: Option<String>,

    /// POS identifier.
    #[serde(
        rename(deserialize = "PosiID"),
        alias = "posId",
        default,
        deserialize_with = "crate::de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub pos_id: Option<u32>,

    /// PIN message line.
    #[serde(
        rename(deserialize = "PinSkilabod"),
        alias = "pinMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pin_message: Option<String>,

    /// Cardholder-facing receipt message.
    #[serde(
        rename(deserialize = "Vidskiptaskilabod"),
        alias = "receiptMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub receipt_message: Option<String>,

    /// ISO 8583 field 22, positions 1-4 (POS entry mode).
    #[serde(
        rename(deserialize = "F22_1til4", serialize = "posEntryMode"),
        alias = "posEntryMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pos_entry_mode: Option<String>,

    /// Receipt line C1.
    #[serde(
        rename(deserialize = "LinaC1"),
        alias = "lineC1",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_c1: Option<String>,

    /// Receipt line C2.
    #[serde(
        rename(deserialize = "LinaC2"),
        alias = "lineC2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_c2: Option<String>,

    /// Receipt line C3.
    #[serde(
        rename(deserialize = "LinaC3"),
        alias = "lineC3",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_c3: Option<String>,

    /// Receipt line C4.
    #[serde(
        rename(deserialize = "LinaC4"),
        alias = "lineC4",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_c4: Option<String>,

    /// Receipt line D1.
    #[serde(
        rename(deserialize = "LinaD1"),
        alias = "lineD1",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_d1: Option<String>,

    /// Receipt line D2.
    #[serde(
        rename(deserialize = "LinaD2"),
        alias = "lineD2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub line_d2: Option<String>,

    /// Kind of operation the receipt describes.
    #[serde(
        rename(deserialize = "TegundAdgerd"),
        alias = "operation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation: Option<String>,

    /// Transaction number of the transaction this one refers back to.
    #[serde(
        rename(deserialize = "FaerslunumerUpphafleguFaerslu"),
        alias = "originalTransactionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_transaction_id: Option<String>,

    /// Terminal identifier.
    #[serde(
        rename(deserialize = "TerminalID"),
        alias = "terminalId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub terminal_id: Option<String>,
}

impl Receipt {
    /// Serializes the receipt to a camelCase JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a receipt from the JSON produced by [`Receipt::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the document is not a valid receipt.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KVITTUN: &str = r"<Kvittun>
        <VerslunNafn>Prufufyrirtaeki</VerslunNafn>
        <VerslunHeimilisfang>Dalshrauni 3</VerslunHeimilisfang>
        <VerslunStadur>Hafnarfjordur</VerslunStadur>
        <TegundKorts>MasterCard</TegundKorts>
        <Dagsetning>01.11.2021</Dagsetning>
        <Timi>12:30</Timi>
        <Kortnumer>530425******2887</Kortnumer>
        <Upphaed>100</Upphaed>
        <Faerslunumer>000123</Faerslunumer>
        <Heimildarnumer>654321</Heimildarnumer>
        <BuidAdOgilda>false</BuidAdOgilda>
        <PosiID>225</PosiID>
        <F22_1til4>1010</F22_1til4>
        <LinaC1>Takk fyrir</LinaC1>
        <TerminalID>T0001</TerminalID>
    </Kvittun>";

    #[test]
    fn test_receipt_deserializes_icelandic_elements() {
        let receipt: Receipt = quick_xml::de::from_str(KVITTUN).unwrap();
        assert_eq!(receipt.company_name.as_deref(), Some("Prufufyrirtaeki"));
        assert_eq!(receipt.masked_pan.as_deref(), Some("530425******2887"));
        assert_eq!(receipt.amount, Some(100));
        assert_eq!(receipt.transaction_id.as_deref(), Some("000123"));
        assert_eq!(receipt.invalidated, Some(false));
        assert_eq!(receipt.pos_id, Some(225));
        assert_eq!(receipt.pos_entry_mode.as_deref(), Some("1010"));
        assert_eq!(receipt.terminal_id.as_deref(), Some("T0001"));
        assert!(receipt.batch_number.is_none());
    }

    #[test]
    fn test_receipt_json_uses_camel_case_and_skips_absent_fields() {
        let receipt: Receipt = quick_xml::de::from_str(KVITTUN).unwrap();
        let json: serde_json::Value = serde_json::from_str(&receipt.to_json().unwrap()).unwrap();

        assert_eq!(json["maskedPan"], "530425******2887");
        assert_eq!(json["transactionId"], "000123");
        assert_eq!(json["posEntryMode"], "1010");
        assert_eq!(json["invalidated"], false);
        assert!(json.get("batchNumber").is_none());
        assert!(json.get("Kortnumer").is_none());
    }

    #[test]
    fn test_receipt_json_round_trip_preserves_populated_fields() {
        let receipt: Receipt = quick_xml::de::from_str(KVITTUN).unwrap();
        let json = receipt.to_json().unwrap();
        let restored = Receipt::from_json(&json).unwrap();
        assert_eq!(receipt, restored);
    }

    #[test]
    fn test_empty_numeric_elements_read_as_absent() {
        let receipt: Receipt = quick_xml::de::from_str(
            "<Kvittun><PosiID/><Upphaed></Upphaed><BuidAdOgilda> </BuidAdOgilda>\
             <Faerslunumer>12</Faerslunumer></Kvittun>",
        )
        .unwrap();
        assert_eq!(receipt.pos_id, None);
        assert_eq!(receipt.amount, None);
        assert_eq!(receipt.invalidated, None);
        assert_eq!(receipt.transaction_id.as_deref(), Some("12"));
    }

    #[test]
    fn test_empty_receipt_serializes_to_empty_object() {
        assert_eq!(Receipt::default().to_json().unwrap(), "{}");
    }
}
