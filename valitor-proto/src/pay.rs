//! Request and response bodies of the pay (JSON) API.
//!
//! All bodies use camelCase keys. Optional nested objects are left out of the
//! request entirely when not supplied. Responses share the
//! `isSuccess`/`responseCode`/`responseDescription` status triple exposed
//! through [`GatewayStatus`]. Response fields sent as `null` read as their
//! default value.

use serde::{Deserialize, Serialize};

/// Content type of pay API requests.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Header carrying the API version.
pub const API_VERSION_HEADER: &str = "valitor-api-version";

/// API version sent when none is configured.
pub const DEFAULT_API_VERSION: &str = "2.0";

/// Endpoint paths relative to the API base URL.
pub mod paths {
    /// Creates a virtual card.
    pub const CREATE_VIRTUAL_CARD: &str = "VirtualCard/CreateVirtualCard";
    /// Updates the expiry date of a virtual card.
    pub const UPDATE_EXPIRATION_DATE: &str = "VirtualCard/UpdateExpirationDate";
    /// Charges a real card.
    pub const CARD_PAYMENT: &str = "Payment/CardPayment";
    /// Charges a virtual card.
    pub const VIRTUAL_CARD_PAYMENT: &str = "Payment/VirtualCardPayment";
    /// Requests a dynamic currency conversion offer.
    pub const DCC_OFFER: &str = "Dcc";
    /// Starts 3-D Secure card verification.
    pub const CARD_VERIFICATION: &str = "CardVerification";
}

/// Status triple common to every pay API response.
pub trait GatewayStatus {
    /// Whether the gateway accepted the request.
    fn is_success(&self) -> bool;
    /// Gateway response code.
    fn response_code(&self) -> &str;
    /// Human-readable description of the response code.
    fn response_description(&self) -> &str;
}

macro_rules! gateway_status {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl GatewayStatus for $ty {
                fn is_success(&self) -> bool {
                    self.is_success
                }

                fn response_code(&self) -> &str {
                    &self.response_code
                }

                fn response_description(&self) -> &str {
                    &self.response_description
                }
            }
        )+
    };
}

/// 3-D Secure results attached to a card-present-equivalent request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVerificationData {
    /// Enrollment check response.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub verifying_enrollment_response: String,
    /// Payer authentication response.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub payer_authentication_response: String,
    /// Cardholder authentication verification value (CAVV).
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub cardholder_authentication_verification_data: String,
}

/// Marks a payment as part of a stored-credential series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsequentTransactionData {
    /// Whether the card is stored on file.
    pub is_stored_credential: bool,
    /// Lifecycle id of the initial transaction in the series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_lifecycle_id: Option<String>,
    /// Kind of subsequent transaction (e.g. `MerchantInitiatedRecurring`).
    pub subsequent_transaction_type: String,
}

/// Accepted dynamic currency conversion offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DccData {
    /// Amount in the merchant currency.
    pub original_trans_amount: i64,
    /// Merchant currency.
    pub original_trans_currency: String,
    /// Fee billed to the cardholder.
    pub dcc_cardholder_billing_fee: i64,
    /// Offered exchange rate.
    pub dcc_exchange_rate: f64,
    /// Offer creation timestamp.
    pub dcc_offer_creation_date: String,
    /// Opaque offer token returned by the DCC endpoint.
    pub dcc_information_encrypted_value: String,
}

/// `POST VirtualCard/CreateVirtualCard` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCardRequest {
    /// Card number (PAN).
    pub card_number: String,
    /// Expiry month, 1-12.
    pub expiration_month: u8,
    /// Four-digit expiry year.
    pub expiration_year: u16,
    /// Card security code.
    pub cvc: String,
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// Intended use of the stored card.
    pub subsequent_transaction_type: String,
    /// Transaction channel (e.g. `ECommerceWithCvc`).
    pub transaction_type: String,
    /// Lifecycle id linking related transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_lifecycle_id: Option<String>,
    /// 3-D Secure results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_verification_data: Option<CardVerificationData>,
}

/// `VirtualCard/CreateVirtualCard` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCardResponse {
    /// Issued virtual card number.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub virtual_card: String,
    /// Lifecycle id sent with the request. Filled by the client, not the
    /// gateway.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub transaction_lifecycle_id: String,
    /// Whether the gateway accepted the request.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_success: bool,
    /// Gateway response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_description: String,
}

/// `POST VirtualCard/UpdateExpirationDate` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationUpdateRequest {
    /// Virtual card number issued by the gateway.
    pub virtual_card_number: String,
    /// Expiry month, 1-12.
    pub expiration_month: u8,
    /// Four-digit expiry year.
    pub expiration_year: u16,
    /// Card security code.
    pub cvc: String,
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// Transaction channel (e.g. `ECommerceWithCvc`).
    pub transaction_type: String,
    /// 3-D Secure results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_verification_data: Option<CardVerificationData>,
}

/// `VirtualCard/UpdateExpirationDate` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationUpdateResponse {
    /// Whether the gateway accepted the request.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_success: bool,
    /// Gateway response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_description: String,
}

/// `POST Payment/CardPayment` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPaymentRequest {
    /// Payment operation (e.g. `Sale`).
    pub operation: String,
    /// Transaction channel (e.g. `ECommerceWithCvc`).
    pub transaction_type: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount in minor units.
    pub amount: u64,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Card number (PAN).
    pub card_number: String,
    /// Expiry month, 1-12.
    pub expiration_month: u8,
    /// Four-digit expiry year.
    pub expiration_year: u16,
    /// Card security code.
    pub cvc: String,
    /// Merchant reference for the payment.
    pub reference_number: String,
    /// Starts a stored-credential series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_as_first_transaction: Option<bool>,
    /// 3-D Secure results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_verification_data: Option<CardVerificationData>,
    /// Stored-credential series data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subsequent_transaction_data: Option<SubsequentTransactionData>,
    /// Accepted currency conversion offer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dcc_data: Option<DccData>,
}

/// Result of a card or virtual card payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Merchant reference for the payment.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub reference_number: String,
    /// Gateway transaction id.
    #[serde(
        rename = "transactionID",
        alias = "transactionId",
        default,
        deserialize_with = "crate::de::null_as_default"
    )]
    pub transaction_id: String,
    /// Issuer authorization code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub authorization_code: String,
    /// Lifecycle id linking related transactions.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub transaction_lifecycle_id: String,
    /// Time of the issuer response.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub authorization_response_time: String,
    /// Whether the gateway accepted the request.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_success: bool,
    /// Gateway response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_description: String,
}

/// `Payment/CardPayment` response.
pub type CardPaymentResponse = PaymentResponse;

/// `Payment/VirtualCardPayment` response.
pub type VirtualCardPaymentResponse = PaymentResponse;

/// `POST Payment/VirtualCardPayment` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCardPaymentRequest {
    /// Payment operation (e.g. `Sale`).
    pub operation: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount in minor units.
    pub amount: u64,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Virtual card number issued by the gateway.
    pub virtual_card_number: String,
    /// Merchant reference for the payment.
    pub reference_number: String,
    /// Why a merchant-initiated payment was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiation_reason: Option<String>,
}

/// `POST Dcc` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DccOfferRequest {
    /// Card number (PAN).
    pub card_number: String,
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Merchant terminal id.
    pub terminal_id: String,
}

/// `Dcc` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DccOfferResponse {
    /// ISO 4217 currency code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub currency: String,
    /// Amount in minor units.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub amount: i64,
    /// Cardholder billing currency offered.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub offer_currency: String,
    /// Amount in the offered currency.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub offer_amount: i64,
    /// Conversion fee billed to the cardholder.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub dcc_cardholder_billing_fee: i64,
    /// Offered exchange rate.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub exchange_rate: f64,
    /// Opaque offer token.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub dcc_information_encrypted_value: String,
    /// Offer timestamp.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_timestamp: String,
    /// Whether the gateway accepted the request.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_success: bool,
    /// Gateway response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_description: String,
}

impl DccOfferResponse {
    /// Builds the [`DccData`] to attach to a card payment accepting this offer.
    #[must_use]
    pub fn accept(&self) -> DccData {
        DccData {
            original_trans_amount: self.amount,
            original_trans_currency: self.currency.clone(),
            dcc_cardholder_billing_fee: self.dcc_cardholder_billing_fee,
            dcc_exchange_rate: self.exchange_rate,
            dcc_offer_creation_date: self.response_timestamp.clone(),
            dcc_information_encrypted_value: self.dcc_information_encrypted_value.clone(),
        }
    }
}

/// `POST CardVerification` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVerificationRequest {
    /// Merchant agreement number.
    pub agreement_number: String,
    /// Merchant terminal id.
    pub terminal_id: String,
    /// Card brand.
    pub card_type: String,
    /// Card number (PAN).
    pub card_number: String,
    /// Expiry month, 1-12.
    pub expiration_month: u8,
    /// Four-digit expiry year.
    pub expiration_year: u16,
    /// Device the cardholder uses (e.g. `Browser`).
    pub cardholder_device_type: String,
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Redirect target after successful verification.
    pub authorization_success_url: String,
    /// Redirect target after failed verification.
    pub authorization_failed_url: String,
    /// Opaque data echoed back to the redirect targets.
    pub merchant_data: String,
}

/// A form field to post to the card issuer's 3-D Secure page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationField {
    /// Form field name.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub name: String,
    /// Form field value.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub value: String,
}

/// `CardVerification` response: the form the cardholder is redirected with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardVerificationResponse {
    /// Raw issuer response.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub card_verification_raw_response: String,
    /// URL the verification form posts to.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub post_url: String,
    /// Form fields to post.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub verification_fields: Vec<VerificationField>,
    /// Whether the gateway accepted the request.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub is_success: bool,
    /// Gateway response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_code: String,
    /// Description of the response code.
    #[serde(default, deserialize_with = "crate::de::null_as_default")]
    pub response_description: String,
}

gateway_status!(
    VirtualCardResponse,
    ExpirationUpdateResponse,
    PaymentResponse,
    DccOfferResponse,
    CardVerificationResponse,
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_virtual_card_request_omits_absent_sub_objects() {
        let request = VirtualCardRequest {
            card_number: "5304259906522887".into(),
            expiration_month: 11,
            expiration_year: 2030,
            cvc: "749".into(),
            agreement_number: "053128".into(),
            terminal_id: "225".into(),
            subsequent_transaction_type: "CardholderInitiatedCredentialOnFile".into(),
            transaction_type: "ECommerceWithCvc".into(),
            transaction_lifecycle_id: Some("abc".into()),
            card_verification_data: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["cardNumber"], "5304259906522887");
        assert_eq!(value["expirationMonth"], 11);
        assert_eq!(value["expirationYear"], 2030);
        assert_eq!(value["terminalId"], "225");
        assert_eq!(value["transactionLifecycleId"], "abc");
        assert!(value.get("cardVerificationData").is_none());
    }

    #[test]
    fn test_card_payment_request_includes_supplied_sub_objects() {
        let request = CardPaymentRequest {
            operation: "Sale".into(),
            transaction_type: "ECommerce".into(),
            currency: "ISK".into(),
            amount: 1000,
            terminal_id: "225".into(),
            agreement_number: "053128".into(),
            card_number: "5304259906522887".into(),
            expiration_month: 11,
            expiration_year: 2030,
            cvc: "749".into(),
            reference_number: "order-1".into(),
            use_as_first_transaction: None,
            card_verification_data: None,
            subsequent_transaction_data: Some(SubsequentTransactionData {
                is_stored_credential: true,
                transaction_lifecycle_id: None,
                subsequent_transaction_type: "MerchantInitiatedRecurring".into(),
            }),
            dcc_data: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["subsequentTransactionData"],
            json!({
                "isStoredCredential": true,
                "subsequentTransactionType": "MerchantInitiatedRecurring"
            })
        );
        assert!(value.get("dccData").is_none());
        assert!(value.get("useAsFirstTransaction").is_none());
    }

    #[test]
    fn test_payment_response_accepts_both_transaction_id_spellings() {
        let upper: PaymentResponse =
            serde_json::from_value(json!({"transactionID": "T1", "isSuccess": true})).unwrap();
        let lower: PaymentResponse =
            serde_json::from_value(json!({"transactionId": "T1", "isSuccess": true})).unwrap();
        assert_eq!(upper.transaction_id, "T1");
        assert_eq!(upper, lower);
        assert!(upper.is_success());
    }

    #[test]
    fn test_status_triple_defaults_when_absent() {
        let response: ExpirationUpdateResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.is_success());
        assert_eq!(response.response_code(), "");
        assert_eq!(response.response_description(), "");
    }

    #[test]
    fn test_null_response_fields_read_as_defaults() {
        let response: PaymentResponse =
            serde_json::from_str(r#"{"isSuccess":true,"authorizationCode":null}"#).unwrap();
        assert!(response.is_success());
        assert_eq!(response.authorization_code, "");

        let offer: DccOfferResponse = serde_json::from_value(json!({
            "amount": null,
            "exchangeRate": null,
            "responseCode": null,
            "isSuccess": null
        }))
        .unwrap();
        assert_eq!(offer.amount, 0);
        assert!(!offer.is_success());

        let form: CardVerificationResponse =
            serde_json::from_value(json!({"verificationFields": null, "postUrl": null})).unwrap();
        assert!(form.verification_fields.is_empty());
    }

    #[test]
    fn test_dcc_offer_accept_carries_offer_token() {
        let offer: DccOfferResponse = serde_json::from_value(json!({
            "currency": "ISK",
            "amount": 1000,
            "offerCurrency": "EUR",
            "offerAmount": 7,
            "dccCardholderBillingFee": 1,
            "exchangeRate": 0.0068,
            "dccInformationEncryptedValue": "opaque",
            "responseTimestamp": "2024-01-01T00:00:00Z",
            "isSuccess": true,
            "responseCode": "00",
            "responseDescription": "Approved"
        }))
        .unwrap();

        let dcc = offer.accept();
        assert_eq!(dcc.original_trans_amount, 1000);
        assert_eq!(dcc.original_trans_currency, "ISK");
        assert_eq!(dcc.dcc_information_encrypted_value, "opaque");
        assert!((dcc.dcc_exchange_rate - 0.0068).abs() < f64::EPSILON);
    }

    #[test]
    fn test_card_verification_response_fields() {
        let response: CardVerificationResponse = serde_json::from_value(json!({
            "postUrl": "https://acs.example/3ds",
            "verificationFields": [{"name": "PaReq", "value": "xyz"}],
            "isSuccess": true
        }))
        .unwrap();
        assert_eq!(response.post_url, "https://acs.example/3ds");
        assert_eq!(response.verification_fields[0].name, "PaReq");
        assert!(response.card_verification_raw_response.is_empty());
    }
}
