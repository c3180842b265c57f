//! Required-field checks run before any request leaves the client.
//!
//! Each check is independent and pure. An operation calls only the checks it
//! needs, in a fixed order, and stops at the first failure; the failing
//! check's message is part of the public contract and never changes.

use crate::card::Card;

/// A missing or malformed request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The card number is empty.
    #[error("Card Number missing")]
    MissingCardNumber,

    /// Neither expiry month nor year is set.
    #[error("Expiration Month and Year missing")]
    MissingExpiration,

    /// Expiry year is set but month is not.
    #[error("Expiration Month missing")]
    MissingExpirationMonth,

    /// Expiry month is set but year is not.
    #[error("Expiration Year missing")]
    MissingExpirationYear,

    /// Expiry month is outside `1..=12`.
    #[error("Expiration Month invalid")]
    InvalidExpirationMonth,

    /// Expiry year has neither two nor four digits.
    #[error("Expiration Year invalid")]
    InvalidExpirationYear,

    /// The card security code is empty.
    #[error("CVC missing")]
    MissingCvc,

    /// No virtual card number has been issued for the card.
    #[error("Virtual Number missing")]
    MissingVirtualNumber,

    /// The amount is zero.
    #[error("Amount missing")]
    MissingAmount,

    /// The currency code is blank.
    #[error("Currency missing")]
    MissingCurrency,

    /// The authorization (transaction) number is blank.
    #[error("Authorization number missing")]
    MissingAuthorizationNumber,

    /// The merchant reference number is blank.
    #[error("Reference number missing")]
    MissingReferenceNumber,

    /// The card number is too short to derive its last four digits.
    #[error("Card Number too short")]
    CardNumberTooShort,
}

/// Requires a non-empty card number.
///
/// # Errors
///
/// [`ValidationError::MissingCardNumber`].
pub fn check_card_number(card: &Card) -> Result<(), ValidationError> {
    if card.number.is_empty() {
        return Err(ValidationError::MissingCardNumber);
    }
    Ok(())
}

/// Requires a complete, valid expiry date.
///
/// # Errors
///
/// One of the expiration variants of [`ValidationError`].
pub fn check_expiration(card: &Card) -> Result<(), ValidationError> {
    card.expiry().map(|_| ())
}

/// Requires a non-empty CVC.
///
/// # Errors
///
/// [`ValidationError::MissingCvc`].
pub fn check_cvc(card: &Card) -> Result<(), ValidationError> {
    if card.cvc.is_empty() {
        return Err(ValidationError::MissingCvc);
    }
    Ok(())
}

/// Requires a previously issued virtual card number.
///
/// # Errors
///
/// [`ValidationError::MissingVirtualNumber`].
pub fn check_virtual_number(card: &Card) -> Result<(), ValidationError> {
    match card.virtual_number.as_deref() {
        Some(number) if !number.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingVirtualNumber),
    }
}

/// Requires a non-zero amount.
///
/// # Errors
///
/// [`ValidationError::MissingAmount`].
pub const fn check_amount(amount: u64) -> Result<(), ValidationError> {
    if amount == 0 {
        return Err(ValidationError::MissingAmount);
    }
    Ok(())
}

/// Requires a non-blank currency code.
///
/// # Errors
///
/// [`ValidationError::MissingCurrency`].
pub fn check_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.trim().is_empty() {
        return Err(ValidationError::MissingCurrency);
    }
    Ok(())
}

/// Requires a non-blank authorization number.
///
/// # Errors
///
/// [`ValidationError::MissingAuthorizationNumber`].
pub fn check_authorization_number(number: &str) -> Result<(), ValidationError> {
    if number.trim().is_empty() {
        return Err(ValidationError::MissingAuthorizationNumber);
    }
    Ok(())
}

/// Requires a non-blank merchant reference number.
///
/// # Errors
///
/// [`ValidationError::MissingReferenceNumber`].
pub fn check_reference_number(reference: &str) -> Result<(), ValidationError> {
    if reference.trim().is_empty() {
        return Err(ValidationError::MissingReferenceNumber);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_card() -> Card {
        Card::new("5304259906522887")
            .with_expiry(11, 2030)
            .with_cvc("749")
            .with_virtual_number("4999993986001010")
    }

    #[test]
    fn test_messages_are_literal() {
        let cases = [
            (ValidationError::MissingCardNumber, "Card Number missing"),
            (ValidationError::MissingExpiration, "Expiration Month and Year missing"),
            (ValidationError::MissingExpirationMonth, "Expiration Month missing"),
            (ValidationError::MissingExpirationYear, "Expiration Year missing"),
            (ValidationError::InvalidExpirationMonth, "Expiration Month invalid"),
            (ValidationError::InvalidExpirationYear, "Expiration Year invalid"),
            (ValidationError::MissingCvc, "CVC missing"),
            (ValidationError::MissingVirtualNumber, "Virtual Number missing"),
            (ValidationError::MissingAmount, "Amount missing"),
            (ValidationError::MissingCurrency, "Currency missing"),
            (ValidationError::MissingAuthorizationNumber, "Authorization number missing"),
            (ValidationError::MissingReferenceNumber, "Reference number missing"),
            (ValidationError::CardNumberTooShort, "Card Number too short"),
        ];
        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
        }
    }

    #[test]
    fn test_complete_card_passes_card_checks() {
        let card = full_card();
        assert_eq!(check_card_number(&card), Ok(()));
        assert_eq!(check_expiration(&card), Ok(()));
        assert_eq!(check_cvc(&card), Ok(()));
        assert_eq!(check_virtual_number(&card), Ok(()));
    }

    #[test]
    fn test_each_missing_card_field() {
        let mut card = full_card();
        card.number.clear();
        assert_eq!(check_card_number(&card), Err(ValidationError::MissingCardNumber));

        let mut card = full_card();
        card.cvc.clear();
        assert_eq!(check_cvc(&card), Err(ValidationError::MissingCvc));

        let mut card = full_card();
        card.virtual_number = None;
        assert_eq!(check_virtual_number(&card), Err(ValidationError::MissingVirtualNumber));

        let mut card = full_card();
        card.virtual_number = Some(String::new());
        assert_eq!(check_virtual_number(&card), Err(ValidationError::MissingVirtualNumber));
    }

    #[test]
    fn test_expiration_variants() {
        let mut card = full_card();
        card.exp_month = None;
        card.exp_year = None;
        assert_eq!(check_expiration(&card), Err(ValidationError::MissingExpiration));

        card.exp_year = Some(2030);
        assert_eq!(check_expiration(&card), Err(ValidationError::MissingExpirationMonth));

        card.exp_month = Some(11);
        card.exp_year = None;
        assert_eq!(check_expiration(&card), Err(ValidationError::MissingExpirationYear));

        card.exp_month = Some(13);
        card.exp_year = Some(2030);
        assert_eq!(check_expiration(&card), Err(ValidationError::InvalidExpirationMonth));

        card.exp_month = Some(11);
        card.exp_year = Some(203);
        assert_eq!(check_expiration(&card), Err(ValidationError::InvalidExpirationYear));
    }

    #[test]
    fn test_scalar_checks() {
        assert_eq!(check_amount(0), Err(ValidationError::MissingAmount));
        assert_eq!(check_amount(1), Ok(()));
        assert_eq!(check_currency("  "), Err(ValidationError::MissingCurrency));
        assert_eq!(check_currency("isk"), Ok(()));
        assert_eq!(
            check_authorization_number(""),
            Err(ValidationError::MissingAuthorizationNumber)
        );
        assert_eq!(check_authorization_number("000123"), Ok(()));
        assert_eq!(check_reference_number(""), Err(ValidationError::MissingReferenceNumber));
    }
}
