//! Promo codes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::PromoCode;

/// A promo code and the percentage it takes off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoItem {
    pub name: PromoCode,
    pub discount: Decimal,
}
