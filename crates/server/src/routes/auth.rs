//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{NewUser, PublicUser};
use crate::services::AuthService;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /auth/register
#[instrument(skip(state, new_user), fields(email = %new_user.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let user = AuthService::new(state.repositories().users.as_ref())
        .register(new_user)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /auth/login
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<PublicUser>> {
    AuthService::new(state.repositories().users.as_ref())
        .validate_user(&form.email, &form.password)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))
}
