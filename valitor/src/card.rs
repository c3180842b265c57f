//! The payment card value object.

use std::fmt;

use crate::validate::ValidationError;

/// A payment card as supplied by the caller.
///
/// `Card` is a plain value: operations borrow it and never modify it. After
/// the gateway issues a virtual number, store it with
/// [`Card::with_virtual_number`] (or by assigning the field) and pass the same
/// card to later calls.
///
/// `Debug` output masks the card number and hides the CVC.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Card {
    /// Card number (PAN).
    pub number: String,
    /// Expiry month, 1-12.
    pub exp_month: Option<u8>,
    /// Expiry year, two or four digits. Two-digit years are read as `20YY`.
    pub exp_year: Option<u16>,
    /// Card security code.
    pub cvc: String,
    /// Virtual card number issued by the gateway for this card.
    pub virtual_number: Option<String>,
    /// Whether this is a test card. Requests for a test card always go to the
    /// UAT endpoint, whatever URL the client is configured with.
    pub test: bool,
}

impl Card {
    /// Creates a card with only the number set.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }

    /// Sets the expiry month and year.
    #[must_use]
    pub fn with_expiry(mut self, month: u8, year: u16) -> Self {
        self.exp_month = Some(month);
        self.exp_year = Some(year);
        self
    }

    /// Sets the security code.
    #[must_use]
    pub fn with_cvc(mut self, cvc: impl Into<String>) -> Self {
        self.cvc = cvc.into();
        self
    }

    /// Sets the gateway-issued virtual card number.
    #[must_use]
    pub fn with_virtual_number(mut self, virtual_number: impl Into<String>) -> Self {
        self.virtual_number = Some(virtual_number.into());
        self
    }

    /// Marks the card as a test card, routing its requests to UAT.
    #[must_use]
    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    /// Returns the virtual card number, or `""` if none has been issued.
    #[must_use]
    pub fn virtual_number(&self) -> &str {
        self.virtual_number.as_deref().unwrap_or_default()
    }

    /// Returns the validated, normalized expiry date.
    ///
    /// A month or year of `0` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns the matching expiration variant of [`ValidationError`] when the
    /// month or year is absent, the month is outside `1..=12`, or the year has
    /// neither two nor four digits.
    pub fn expiry(&self) -> Result<Expiry, ValidationError> {
        let month = self.exp_month.filter(|m| *m != 0);
        let year = self.exp_year.filter(|y| *y != 0);
        match (month, year) {
            (None, None) => Err(ValidationError::MissingExpiration),
            (None, Some(_)) => Err(ValidationError::MissingExpirationMonth),
            (Some(_), None) => Err(ValidationError::MissingExpirationYear),
            (Some(month), Some(_)) if month > 12 => Err(ValidationError::InvalidExpirationMonth),
            (Some(month), Some(year)) => match year {
                1..=99 => Ok(Expiry {
                    month,
                    year: year + 2000,
                }),
                1000..=9999 => Ok(Expiry { month, year }),
                _ => Err(ValidationError::InvalidExpirationYear),
            },
        }
    }

    /// Returns the last four characters of the card number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCardNumber`] for an empty number and
    /// [`ValidationError::CardNumberTooShort`] for numbers shorter than five
    /// characters.
    pub fn last_four(&self) -> Result<&str, ValidationError> {
        let len = self.number.len();
        if len == 0 {
            return Err(ValidationError::MissingCardNumber);
        }
        if len < 5 {
            return Err(ValidationError::CardNumberTooShort);
        }
        self.number
            .get(len - 4..)
            .ok_or(ValidationError::CardNumberTooShort)
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("number", &format_args!("****{}", self.last_four().unwrap_or("")))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("has_cvc", &!self.cvc.is_empty())
            .field("virtual_number", &self.virtual_number)
            .field("test", &self.test)
            .finish()
    }
}

/// A validated card expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Month, 1-12.
    pub month: u8,
    /// Four-digit year.
    pub year: u16,
}

impl Expiry {
    /// Renders the expiry as zero-padded `MMYY`.
    #[must_use]
    pub fn mmyy(&self) -> String {
        format!("{:02}{:02}", self.month, self.year % 100)
    }
}
