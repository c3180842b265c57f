//! The pay API over JSON.
//!
//! Requests are camelCase JSON bodies posted to endpoint paths beneath the
//! configured base URL, authenticated with a static API key. A reply other
//! than `200`, or a `200` whose `isSuccess` is `false`, is a
//! [`GatewayError::Remote`].

use serde::Serialize;
use serde::de::DeserializeOwned;
use valitor_proto::GatewayStatus;
use valitor_proto::pay::{
    self, CardPaymentRequest, CardPaymentResponse, CardVerificationData, CardVerificationRequest,
    CardVerificationResponse, DccData, DccOfferRequest, DccOfferResponse,
    ExpirationUpdateRequest, ExpirationUpdateResponse, SubsequentTransactionData,
    VirtualCardPaymentRequest, VirtualCardPaymentResponse, VirtualCardRequest,
    VirtualCardResponse, paths,
};

use crate::card::Card;
use crate::config::PaySettings;
use crate::error::{
    DecodeError, EncodeError, GatewayError, RemoteError, TransportError, ValidationError,
};
use crate::gateway::{Gateway, Operation, Outbound, Protocol, Reply};
use crate::status::describe_status;
use crate::validate::{
    check_amount, check_card_number, check_currency, check_cvc, check_expiration,
    check_reference_number, check_virtual_number,
};

/// JSON protocol of the pay API.
#[derive(Debug, Clone, Copy)]
pub struct Json;

/// An encoded pay API request: endpoint path and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRequest {
    /// Endpoint path relative to the base URL.
    pub path: &'static str,
    /// Serialized body.
    pub body: Vec<u8>,
}

impl JsonRequest {
    fn new<T: Serialize>(path: &'static str, body: &T) -> Result<Self, GatewayError> {
        let body = serde_json::to_vec(body).map_err(EncodeError::from)?;
        Ok(Self { path, body })
    }
}

impl Protocol for Json {
    type Settings = PaySettings;
    type Payload = JsonRequest;
    const NAME: &'static str = "json";

    fn prepare(
        settings: &PaySettings,
        payload: JsonRequest,
        test_card: bool,
    ) -> Result<Outbound, GatewayError> {
        let url = if test_card {
            PaySettings::uat_endpoint(payload.path)
        } else {
            settings.endpoint(payload.path)
        }
        .map_err(|err| TransportError::new("invalid endpoint url", err))?;
        Ok(Outbound {
            url,
            content_type: pay::CONTENT_TYPE,
            headers: vec![
                (pay::API_VERSION_HEADER, settings.api_version.clone()),
                ("Authorization", format!("APIKey {}", settings.api_key)),
            ],
            body: payload.body,
        })
    }

    fn log_payloads(settings: &PaySettings) -> bool {
        settings.log_payloads
    }
}

/// Client for the pay (JSON) API.
pub type PayClient = Gateway<Json>;

/// Maps a reply to `T`, turning non-200 statuses and unsuccessful bodies into
/// [`RemoteError`].
fn read_response<T>(reply: &Reply) -> Result<T, GatewayError>
where
    T: DeserializeOwned + GatewayStatus,
{
    match reply.status {
        200 => {}
        400 => {
            let body = reply.text();
            return Err(RemoteError::new("400", body.clone()).with_body(body).into());
        }
        status => {
            return Err(RemoteError::new(status.to_string(), describe_status(status))
                .with_body(reply.text())
                .into());
        }
    }

    let response: T = serde_json::from_slice(&reply.body).map_err(DecodeError::from)?;
    if response.is_success() {
        return Ok(response);
    }
    Err(
        RemoteError::new(response.response_code(), response.response_description())
            .with_body(reply.text())
            .into(),
    )
}

fn currency_code(currency: &str) -> String {
    currency.trim().to_uppercase()
}

/// Options for [`PayClient::create_virtual_card`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualCardOptions {
    /// Intended use of the stored card (e.g. `CardholderInitiatedCredentialOnFile`).
    pub subsequent_transaction_type: String,
    /// Transaction channel (e.g. `ECommerceWithCvc`).
    pub transaction_type: String,
    /// Lifecycle id to send. A fresh id is generated when absent or blank.
    pub transaction_lifecycle_id: Option<String>,
    /// 3-D Secure results from a prior card verification.
    pub card_verification_data: Option<CardVerificationData>,
}

impl VirtualCardOptions {
    /// Creates options without a lifecycle id or verification data.
    #[must_use]
    pub fn new(
        subsequent_transaction_type: impl Into<String>,
        transaction_type: impl Into<String>,
    ) -> Self {
        Self {
            subsequent_transaction_type: subsequent_transaction_type.into(),
            transaction_type: transaction_type.into(),
            ..Self::default()
        }
    }

    /// Sets the lifecycle id to send.
    #[must_use]
    pub fn with_transaction_lifecycle_id(mut self, id: impl Into<String>) -> Self {
        self.transaction_lifecycle_id = Some(id.into());
        self
    }

    /// Attaches 3-D Secure results.
    #[must_use]
    pub fn with_card_verification_data(mut self, data: CardVerificationData) -> Self {
        self.card_verification_data = Some(data);
        self
    }
}

/// Parameters of [`PayClient::card_payment`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardPayment {
    /// Payment operation (e.g. `Sale`).
    pub operation: String,
    /// Transaction channel (e.g. `ECommerceWithCvc`).
    pub transaction_type: String,
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant reference for the payment.
    pub reference_number: String,
    /// Starts a stored-credential series.
    pub use_as_first_transaction: Option<bool>,
    /// 3-D Secure results.
    pub card_verification_data: Option<CardVerificationData>,
    /// Stored-credential series data.
    pub subsequent_transaction_data: Option<SubsequentTransactionData>,
    /// Accepted currency conversion offer, see [`DccOfferResponse::accept`].
    pub dcc_data: Option<DccData>,
}

/// Parameters of [`PayClient::virtual_card_payment`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualCardPayment {
    /// Payment operation (e.g. `Sale`).
    pub operation: String,
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Merchant reference for the payment.
    pub reference_number: String,
    /// Why a merchant-initiated payment was made.
    pub initiation_reason: Option<String>,
}

/// Parameters of [`PayClient::card_verification`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardVerification {
    /// Card brand (e.g. `VISA`).
    pub card_type: String,
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

struct CreateVirtualCard<'a> {
    card: &'a Card,
    options: &'a VirtualCardOptions,
    lifecycle_id: String,
}

impl Operation<Json> for CreateVirtualCard<'_> {
    type Output = VirtualCardResponse;

    fn name(&self) -> &'static str {
        "CreateVirtualCard"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_card_number(self.card)?;
        check_expiration(self.card)?;
        check_cvc(self.card)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        let expiry = self.card.expiry()?;
        JsonRequest::new(
            paths::CREATE_VIRTUAL_CARD,
            &VirtualCardRequest {
                card_number: self.card.number.clone(),
                expiration_month: expiry.month,
                expiration_year: expiry.year,
                cvc: self.card.cvc.clone(),
                agreement_number: settings.agreement_number.clone(),
                terminal_id: settings.terminal_id.clone(),
                subsequent_transaction_type: self.options.subsequent_transaction_type.clone(),
                transaction_type: self.options.transaction_type.clone(),
                transaction_lifecycle_id: Some(self.lifecycle_id.clone()),
                card_verification_data: self.options.card_verification_data.clone(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<VirtualCardResponse, GatewayError> {
        match read_response::<VirtualCardResponse>(&reply) {
            Ok(mut response) => {
                response.transaction_lifecycle_id.clone_from(&self.lifecycle_id);
                Ok(response)
            }
            Err(GatewayError::Remote(remote)) => Err((*remote)
                .with_transaction_lifecycle_id(self.lifecycle_id.as_str())
                .into()),
            Err(err) => Err(err),
        }
    }
}

struct UpdateExpirationDate<'a> {
    card: &'a Card,
    transaction_type: &'a str,
    verification: Option<&'a CardVerificationData>,
}

impl Operation<Json> for UpdateExpirationDate<'_> {
    type Output = ExpirationUpdateResponse;

    fn name(&self) -> &'static str {
        "UpdateExpirationDate"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        check_expiration(self.card)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        let expiry = self.card.expiry()?;
        JsonRequest::new(
            paths::UPDATE_EXPIRATION_DATE,
            &ExpirationUpdateRequest {
                virtual_card_number: self.card.virtual_number().to_owned(),
                expiration_month: expiry.month,
                expiration_year: expiry.year,
                cvc: self.card.cvc.clone(),
                agreement_number: settings.agreement_number.clone(),
                terminal_id: settings.terminal_id.clone(),
                transaction_type: self.transaction_type.to_owned(),
                card_verification_data: self.verification.cloned(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<ExpirationUpdateResponse, GatewayError> {
        read_response(&reply)
    }
}

struct CardPaymentOp<'a> {
    card: &'a Card,
    payment: &'a CardPayment,
}

impl Operation<Json> for CardPaymentOp<'_> {
    type Output = CardPaymentResponse;

    fn name(&self) -> &'static str {
        "CardPayment"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_card_number(self.card)?;
        check_expiration(self.card)?;
        check_currency(&self.payment.currency)?;
        check_amount(self.payment.amount)?;
        check_reference_number(&self.payment.reference_number)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        let expiry = self.card.expiry()?;
        let payment = self.payment;
        JsonRequest::new(
            paths::CARD_PAYMENT,
            &CardPaymentRequest {
                operation: payment.operation.clone(),
                transaction_type: payment.transaction_type.clone(),
                currency: currency_code(&payment.currency),
                amount: payment.amount,
                terminal_id: settings.terminal_id.clone(),
                agreement_number: settings.agreement_number.clone(),
                card_number: self.card.number.clone(),
                expiration_month: expiry.month,
                expiration_year: expiry.year,
                cvc: self.card.cvc.clone(),
                reference_number: payment.reference_number.clone(),
                use_as_first_transaction: payment.use_as_first_transaction,
                card_verification_data: payment.card_verification_data.clone(),
                subsequent_transaction_data: payment.subsequent_transaction_data.clone(),
                dcc_data: payment.dcc_data.clone(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<CardPaymentResponse, GatewayError> {
        read_response(&reply)
    }
}

struct VirtualCardPaymentOp<'a> {
    card: &'a Card,
    payment: &'a VirtualCardPayment,
}

impl Operation<Json> for VirtualCardPaymentOp<'_> {
    type Output = VirtualCardPaymentResponse;

    fn name(&self) -> &'static str {
        "VirtualCardPayment"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        check_currency(&self.payment.currency)?;
        check_amount(self.payment.amount)?;
        check_reference_number(&self.payment.reference_number)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        let payment = self.payment;
        JsonRequest::new(
            paths::VIRTUAL_CARD_PAYMENT,
            &VirtualCardPaymentRequest {
                operation: payment.operation.clone(),
                currency: currency_code(&payment.currency),
                amount: payment.amount,
                terminal_id: settings.terminal_id.clone(),
                agreement_number: settings.agreement_number.clone(),
                virtual_card_number: self.card.virtual_number().to_owned(),
                reference_number: payment.reference_number.clone(),
                initiation_reason: payment.initiation_reason.clone(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<VirtualCardPaymentResponse, GatewayError> {
        read_response(&reply)
    }
}

struct DccOffer<'a> {
    card: &'a Card,
    amount: u64,
    currency: &'a str,
}

impl Operation<Json> for DccOffer<'_> {
    type Output = DccOfferResponse;

    fn name(&self) -> &'static str {
        "Dcc"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_card_number(self.card)?;
        check_currency(self.currency)?;
        check_amount(self.amount)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        JsonRequest::new(
            paths::DCC_OFFER,
            &DccOfferRequest {
                card_number: self.card.number.clone(),
                amount: self.amount,
                currency: currency_code(self.currency),
                agreement_number: settings.agreement_number.clone(),
                terminal_id: settings.terminal_id.clone(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<DccOfferResponse, GatewayError> {
        read_response(&reply)
    }
}

struct CardVerificationOp<'a> {
    card: &'a Card,
    verification: &'a CardVerification,
}

impl Operation<Json> for CardVerificationOp<'_> {
    type Output = CardVerificationResponse;

    fn name(&self) -> &'static str {
        "CardVerification"
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_card_number(self.card)?;
        check_expiration(self.card)?;
        check_currency(&self.verification.currency)?;
        check_amount(self.verification.amount)
    }

    fn encode(&self, settings: &PaySettings) -> Result<JsonRequest, GatewayError> {
        let expiry = self.card.expiry()?;
        let verification = self.verification;
        JsonRequest::new(
            paths::CARD_VERIFICATION,
            &CardVerificationRequest {
                agreement_number: settings.agreement_number.clone(),
                terminal_id: settings.terminal_id.clone(),
                card_type: verification.card_type.clone(),
                card_number: self.card.number.clone(),
                expiration_month: expiry.month,
                expiration_year: expiry.year,
                cardholder_device_type: verification.cardholder_device_type.clone(),
                amount: verification.amount,
                currency: currency_code(&verification.currency),
                authorization_success_url: verification.authorization_success_url.clone(),
                authorization_failed_url: verification.authorization_failed_url.clone(),
                merchant_data: verification.merchant_data.clone(),
            },
        )
    }

    fn decode(&self, reply: Reply) -> Result<CardVerificationResponse, GatewayError> {
        read_response(&reply)
    }
}

impl Gateway<Json> {
    /// Stores `card` at the gateway and returns its virtual card number
    /// (`VirtualCard/CreateVirtualCard`).
    ///
    /// Checks card number, expiry and CVC, in that order. The lifecycle id
    /// sent, whether supplied or generated, is returned on the response and
    /// on a [`RemoteError`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn create_virtual_card(
        &self,
        card: &Card,
        options: &VirtualCardOptions,
    ) -> Result<VirtualCardResponse, GatewayError> {
        let lifecycle_id = self.resolve_id(options.transaction_lifecycle_id.as_deref());
        self.execute(&CreateVirtualCard {
            card,
            options,
            lifecycle_id,
        })
        .await
    }

    /// Replaces the expiry date behind the card's virtual number with the
    /// card's current expiry (`VirtualCard/UpdateExpirationDate`).
    ///
    /// Checks virtual number and expiry, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn update_expiration_date(
        &self,
        card: &Card,
        transaction_type: &str,
        verification: Option<&CardVerificationData>,
    ) -> Result<ExpirationUpdateResponse, GatewayError> {
        self.execute(&UpdateExpirationDate {
            card,
            transaction_type,
            verification,
        })
        .await
    }

    /// Charges a real card (`Payment/CardPayment`).
    ///
    /// Checks card number, expiry, currency, amount and reference number, in
    /// that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn card_payment(
        &self,
        card: &Card,
        payment: &CardPayment,
    ) -> Result<CardPaymentResponse, GatewayError> {
        self.execute(&CardPaymentOp { card, payment }).await
    }

    /// Charges the card's virtual number (`Payment/VirtualCardPayment`).
    ///
    /// Checks virtual number, currency, amount and reference number, in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn virtual_card_payment(
        &self,
        card: &Card,
        payment: &VirtualCardPayment,
    ) -> Result<VirtualCardPaymentResponse, GatewayError> {
        self.execute(&VirtualCardPaymentOp { card, payment }).await
    }

    /// Asks for a dynamic currency conversion offer (`Dcc`).
    ///
    /// Pass [`DccOfferResponse::accept`] as [`CardPayment::dcc_data`] to
    /// charge in the offered currency.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn dcc_offer(
        &self,
        card: &Card,
        amount: u64,
        currency: &str,
    ) -> Result<DccOfferResponse, GatewayError> {
        self.execute(&DccOffer {
            card,
            amount,
            currency,
        })
        .await
    }

    /// Starts 3-D Secure verification (`CardVerification`).
    ///
    /// The response carries the form (post URL and fields) to redirect the
    /// cardholder with.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn card_verification(
        &self,
        card: &Card,
        verification: &CardVerification,
    ) -> Result<CardVerificationResponse, GatewayError> {
        self.execute(&CardVerificationOp { card, verification })
            .await
    }
}
