//! Corporate payments over SOAP.
//!
//! Every operation posts one SOAP envelope to the configured endpoint with the
//! credentials from [`CorporateSettings`] followed by the operation's
//! parameters. A non-zero `Villunumer` in the result is a
//! [`GatewayError::Remote`]; a SOAP fault is reported the same way.
//!
//! The service works on *virtual card numbers*: issue one with
//! [`CorporateClient::virtual_number`], store it on the [`Card`], and use it
//! for every later call.

use valitor_proto::corporate::{
    AUTHORIZE, AUTHORIZE_ONLY, INVALIDATE, LAST_FOUR_DIGITS, REFUND, SoapAction, UPDATE_EXPIRATION,
    USE_AUTHORIZATION, VIRTUAL_NUMBER,
};
use valitor_proto::soap::{self, Envelope, SoapError};
use valitor_proto::{CorporateResult, Receipt};

use crate::card::Card;
use crate::config::{CorporateSettings, default_corporate_url};
use crate::error::{DecodeError, GatewayError, RemoteError, ValidationError};
use crate::gateway::{Gateway, Operation, Outbound, Protocol, Reply};
use crate::status::describe_status;
use crate::validate::{
    check_amount, check_authorization_number, check_card_number, check_currency, check_cvc,
    check_expiration, check_virtual_number,
};

/// SOAP 1.1 protocol of the corporate payments service.
#[derive(Debug, Clone, Copy)]
pub struct Soap;

impl Protocol for Soap {
    type Settings = CorporateSettings;
    type Payload = Envelope;
    const NAME: &'static str = "soap";

    fn prepare(
        settings: &CorporateSettings,
        payload: Envelope,
        test_card: bool,
    ) -> Result<Outbound, GatewayError> {
        let url = if test_card {
            default_corporate_url()
        } else {
            settings.url.clone()
        };
        Ok(Outbound {
            url,
            content_type: soap::CONTENT_TYPE,
            headers: Vec::new(),
            body: payload.render().into_bytes(),
        })
    }

    fn log_payloads(settings: &CorporateSettings) -> bool {
        settings.log_payloads
    }
}

/// Client for the corporate payments (SOAP) service.
pub type CorporateClient = Gateway<Soap>;

/// Starts an envelope with the four credential fields every operation sends.
fn credentials(action: SoapAction, settings: &CorporateSettings) -> Envelope {
    Envelope::new(action.element)
        .escape_text(settings.escape_xml)
        .field("Notandanafn", settings.username.as_str())
        .field("Lykilord", settings.password.as_str())
        .field("Samningsnumer", settings.contract_number.as_str())
        .field("SamningsKennitala", settings.contract_id_number.as_str())
}

/// Reads the result of `action` and turns gateway errors into [`RemoteError`].
fn read_result(reply: &Reply, action: SoapAction) -> Result<CorporateResult, GatewayError> {
    let result: CorporateResult = match soap::read_result(&reply.body, action.result) {
        Ok(result) => result,
        Err(SoapError::Fault { code, message }) => {
            return Err(RemoteError::new(code, message).into());
        }
        Err(_) if reply.status != 200 => {
            return Err(RemoteError::new(reply.status.to_string(), describe_status(reply.status))
                .with_body(reply.text())
                .into());
        }
        Err(err) => return Err(DecodeError::from(err).into()),
    };

    if result.is_success() {
        return Ok(result);
    }

    let mut remote = RemoteError::new(
        result.error_code.to_string(),
        result.error_message.unwrap_or_default(),
    );
    if let Some(log_id) = result.error_log_id.filter(|id| !id.is_empty()) {
        remote = remote.with_log_id(log_id);
    }
    Err(remote.into())
}

fn missing(element: &str) -> GatewayError {
    DecodeError::from(SoapError::MissingElement(element.to_owned())).into()
}

fn receipt(result: CorporateResult) -> Result<Receipt, GatewayError> {
    result.receipt.ok_or_else(|| missing("Kvittun"))
}

fn non_empty(value: Option<String>, element: &str) -> Result<String, GatewayError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing(element))
}

struct VirtualNumber<'a> {
    card: &'a Card,
}

impl Operation<Soap> for VirtualNumber<'_> {
    type Output = String;

    fn name(&self) -> &'static str {
        VIRTUAL_NUMBER.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_expiration(self.card)?;
        check_cvc(self.card)?;
        check_card_number(self.card)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        let expiry = self.card.expiry()?;
        Ok(credentials(VIRTUAL_NUMBER, settings)
            .field("PosiID", settings.pos_id.as_str())
            .field("Kortnumer", self.card.number.as_str())
            .field("Gildistimi", expiry.mmyy())
            .field("Oryggisnumer", self.card.cvc.as_str()))
    }

    fn decode(&self, reply: Reply) -> Result<String, GatewayError> {
        let result = read_result(&reply, VIRTUAL_NUMBER)?;
        non_empty(result.virtual_number, "Syndarkortnumer")
    }
}

/// Amount-bearing operations share parameters and differ in action and CVC.
struct Charge<'a> {
    action: SoapAction,
    card: &'a Card,
    amount: u64,
    currency: &'a str,
}

impl Charge<'_> {
    fn requires_cvc(&self) -> bool {
        self.action == AUTHORIZE_ONLY
    }
}

impl Operation<Soap> for Charge<'_> {
    type Output = Receipt;

    fn name(&self) -> &'static str {
        self.action.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        if self.requires_cvc() {
            check_cvc(self.card)?;
        }
        check_currency(self.currency)?;
        check_amount(self.amount)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        let envelope = credentials(self.action, settings)
            .field("PosiID", settings.pos_id.as_str())
            .field("Syndarkortnumer", self.card.virtual_number())
            .field("Upphaed", self.amount.to_string())
            .field("Gjaldmidill", self.currency.trim().to_uppercase());
        if self.requires_cvc() {
            return Ok(envelope.field("Oryggisnumer", self.card.cvc.as_str()));
        }
        Ok(envelope)
    }

    fn decode(&self, reply: Reply) -> Result<Receipt, GatewayError> {
        receipt(read_result(&reply, self.action)?)
    }
}

struct UseAuthorization<'a> {
    card: &'a Card,
    authorization_number: &'a str,
}

impl Operation<Soap> for UseAuthorization<'_> {
    type Output = ();

    fn name(&self) -> &'static str {
        USE_AUTHORIZATION.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        check_cvc(self.card)?;
        check_authorization_number(self.authorization_number)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        Ok(credentials(USE_AUTHORIZATION, settings)
            .field("PosiID", settings.pos_id.as_str())
            .field("Syndarkortnumer", self.card.virtual_number())
            .field("Oryggisnumer", self.card.cvc.as_str())
            .field("Faerslunumer", self.authorization_number.trim()))
    }

    fn decode(&self, reply: Reply) -> Result<(), GatewayError> {
        read_result(&reply, USE_AUTHORIZATION).map(|_| ())
    }
}

struct Invalidate<'a> {
    card: &'a Card,
    currency: &'a str,
    authorization_number: &'a str,
}

impl Operation<Soap> for Invalidate<'_> {
    type Output = Receipt;

    fn name(&self) -> &'static str {
        INVALIDATE.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        check_authorization_number(self.authorization_number)?;
        check_currency(self.currency)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        Ok(credentials(INVALIDATE, settings)
            .field("Syndarkortnumer", self.card.virtual_number())
            .field("Faerslunumer", self.authorization_number.trim())
            .field("PosiID", settings.pos_id.as_str())
            .field("Gjaldmidill", self.currency.trim().to_uppercase()))
    }

    fn decode(&self, reply: Reply) -> Result<Receipt, GatewayError> {
        receipt(read_result(&reply, INVALIDATE)?)
    }
}

struct UpdateExpiration<'a> {
    card: &'a Card,
}

impl Operation<Soap> for UpdateExpiration<'_> {
    type Output = ();

    fn name(&self) -> &'static str {
        UPDATE_EXPIRATION.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)?;
        check_expiration(self.card)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        let expiry = self.card.expiry()?;
        Ok(credentials(UPDATE_EXPIRATION, settings)
            .field("Syndarkortnumer", self.card.virtual_number())
            .field("NyrGildistimi", expiry.mmyy()))
    }

    fn decode(&self, reply: Reply) -> Result<(), GatewayError> {
        read_result(&reply, UPDATE_EXPIRATION).map(|_| ())
    }
}

struct LastFourDigits<'a> {
    card: &'a Card,
}

impl Operation<Soap> for LastFourDigits<'_> {
    type Output = String;

    fn name(&self) -> &'static str {
        LAST_FOUR_DIGITS.element
    }

    fn card(&self) -> &Card {
        self.card
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_virtual_number(self.card)
    }

    fn encode(&self, settings: &CorporateSettings) -> Result<Envelope, GatewayError> {
        Ok(credentials(LAST_FOUR_DIGITS, settings)
            .field("Syndarkortnumer", self.card.virtual_number()))
    }

    fn decode(&self, reply: Reply) -> Result<String, GatewayError> {
        let result = read_result(&reply, LAST_FOUR_DIGITS)?;
        non_empty(result.card_number, "Kortnumer")
    }
}

impl Gateway<Soap> {
    /// Issues a virtual card number for `card` (`FaSyndarkortnumer`).
    ///
    /// Checks expiry, CVC and card number, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn virtual_number(&self, card: &Card) -> Result<String, GatewayError> {
        self.execute(&VirtualNumber { card }).await
    }

    /// Authorizes and captures `amount` on the card's virtual number
    /// (`FaHeimild`).
    ///
    /// Checks virtual number, currency and amount, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn authorize(
        &self,
        card: &Card,
        amount: u64,
        currency: &str,
    ) -> Result<Receipt, GatewayError> {
        self.execute(&Charge {
            action: AUTHORIZE,
            card,
            amount,
            currency,
        })
        .await
    }

    /// Authorizes `amount` without capturing it (`FaAdeinsheimild`).
    ///
    /// Checks virtual number, CVC, currency and amount, in that order. The
    /// receipt's transaction id is the authorization number to pass to
    /// [`use_authorization`](Self::use_authorization).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn authorize_only(
        &self,
        card: &Card,
        amount: u64,
        currency: &str,
    ) -> Result<Receipt, GatewayError> {
        self.execute(&Charge {
            action: AUTHORIZE_ONLY,
            card,
            amount,
            currency,
        })
        .await
    }

    /// Captures a previous authorization-only transaction
    /// (`NotaAdeinsheimild`).
    ///
    /// Checks virtual number, CVC and authorization number, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn use_authorization(
        &self,
        card: &Card,
        authorization_number: &str,
    ) -> Result<(), GatewayError> {
        self.execute(&UseAuthorization {
            card,
            authorization_number,
        })
        .await
    }

    /// Refunds `amount` to the card's virtual number (`FaEndurgreitt`).
    ///
    /// Checks virtual number, currency and amount, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn refund(
        &self,
        card: &Card,
        amount: u64,
        currency: &str,
    ) -> Result<Receipt, GatewayError> {
        self.execute(&Charge {
            action: REFUND,
            card,
            amount,
            currency,
        })
        .await
    }

    /// Invalidates a transaction (`FaOgildingu`).
    ///
    /// Checks virtual number, authorization number and currency, in that
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn invalidate(
        &self,
        card: &Card,
        currency: &str,
        authorization_number: &str,
    ) -> Result<Receipt, GatewayError> {
        self.execute(&Invalidate {
            card,
            currency,
            authorization_number,
        })
        .await
    }

    /// Replaces the expiry date behind the card's virtual number with the
    /// card's current expiry (`UppfaeraGildistima`).
    ///
    /// Checks virtual number and expiry, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn update_expiration(&self, card: &Card) -> Result<(), GatewayError> {
        self.execute(&UpdateExpiration { card }).await
    }

    /// Looks up the last four digits of the real card behind the virtual
    /// number (`FaSidustuFjoraIKortnumeriUtFraSyndarkortnumeri`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on validation, transport, gateway or decode
    /// failure.
    pub async fn last_four_digits(&self, card: &Card) -> Result<String, GatewayError> {
        self.execute(&LastFourDigits { card }).await
    }
}
