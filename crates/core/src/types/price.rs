//! Currency and multi-currency price types using decimal arithmetic.
//!
//! The shop sells in two currencies: hryvnia for domestic customers and euro
//! for everyone else. Every catalog price is stored in both.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency an order is paid in.
///
/// Serialized in lowercase (`"uah"`, `"eur"`), matching the payment pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Ukrainian hryvnia.
    Uah,
    /// Euro.
    Eur,
}

impl Currency {
    /// Lowercase code as used on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Uah => "uah",
            Self::Eur => "eur",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Uah => "₴",
            Self::Eur => "€",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A price expressed in every supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MulticurrencyPrice {
    /// Amount in hryvnia.
    pub uah: Decimal,
    /// Amount in euro.
    pub eur: Decimal,
}

impl MulticurrencyPrice {
    /// Create a price from both currency amounts.
    #[must_use]
    pub const fn new(uah: Decimal, eur: Decimal) -> Self {
        Self { uah, eur }
    }

    /// Amount in the given currency.
    #[must_use]
    pub const fn in_currency(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Uah => self.uah,
            Currency::Eur => self.eur,
        }
    }
}
