//! Payment gateway callback payloads.
//!
//! WayForPay posts its transaction report either as a JSON body or as a
//! form body whose single key is the JSON document. LiqPay posts a form with
//! a base64-encoded JSON `data` field.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::OrderId;

/// WayForPay reason code for a settled payment.
pub const WAYFORPAY_SETTLED: i64 = 1100;

/// LiqPay status for a successful payment.
pub const LIQPAY_SUCCESS: &str = "success";

/// Errors decoding a gateway callback.
#[derive(Debug, thiserror::Error)]
pub enum PaymentDecodeError {
    #[error("callback body is empty")]
    Empty,
    #[error("callback body is not a transaction report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("callback data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// WayForPay service-URL transaction report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WayForPayCallback {
    pub order_reference: OrderId,
    pub reason_code: i64,
    #[serde(default)]
    pub merchant_account: Option<String>,
    #[serde(default)]
    pub merchant_signature: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl WayForPayCallback {
    /// Whether the gateway reports the payment as settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.reason_code == WAYFORPAY_SETTLED
    }

    /// Decode a callback body sent as JSON or as a form whose key is JSON.
    ///
    /// # Errors
    ///
    /// Returns `PaymentDecodeError` if neither shape yields a report.
    pub fn from_body(body: &[u8]) -> Result<Self, PaymentDecodeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(PaymentDecodeError::Empty);
        }

        let json_err = match serde_json::from_slice::<Self>(body) {
            Ok(callback) => return Ok(callback),
            Err(e) => e,
        };

        let Some((key, value)) = url::form_urlencoded::parse(body).next() else {
            return Err(json_err.into());
        };
        serde_json::from_str(&key).or_else(|_| {
            // A '=' inside the JSON splits it into key and value
            serde_json::from_str(&format!("{key}={value}")).map_err(PaymentDecodeError::from)
        })
    }
}

/// LiqPay server-to-server callback, decoded from its `data` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiqPayCallback {
    pub order_id: OrderId,
    pub status: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LiqPayCallback {
    /// Whether LiqPay reports the payment as successful.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == LIQPAY_SUCCESS
    }
}

/// Decode the base64 JSON `data` field of a LiqPay callback.
///
/// # Errors
///
/// Returns `PaymentDecodeError` if the field is not base64 or not a callback.
pub fn decode_liqpay_data(data: &str) -> Result<LiqPayCallback, PaymentDecodeError> {
    let raw = STANDARD.decode(data.trim())?;
    Ok(serde_json::from_slice(&raw)?)
}
