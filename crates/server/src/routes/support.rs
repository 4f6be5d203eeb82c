//! Support request handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::Email;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Support form data. Missing fields are treated as blank.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SupportForm {
    pub email: String,
    pub fullname: String,
    pub message: String,
}

/// POST /support
///
/// Forwards the message to the admin mailbox. Delivery happens in the
/// background, so success only means the request was accepted.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<SupportForm>,
) -> Result<StatusCode> {
    let invalid = || AppError::BadRequest("Something goes wrong. Try again later".to_string());

    let email = Email::parse(&form.email).map_err(|_| invalid())?;
    if form.fullname.trim().is_empty() || form.message.trim().is_empty() {
        return Err(invalid());
    }

    state
        .notifier()
        .support_request(email.as_str(), form.fullname.trim(), form.message.trim());
    tracing::info!("support request forwarded");
    Ok(StatusCode::OK)
}
