//! Order route handlers: checkout, payment callbacks, admin actions.

use axum::{
    Form, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::OrderId;

use crate::error::{AppError, Result};
use crate::models::{CreateOrderRequest, Order, WayForPayCallback, decode_liqpay_data};
use crate::services::OrderService;
use crate::state::AppState;

/// Body of `POST /order/approve/admin`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminApproval {
    pub order_id: OrderId,
}

/// Form posted by LiqPay.
#[derive(Debug, Deserialize)]
pub struct LiqPayForm {
    pub data: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Query of `GET /order/by-email`.
#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

/// Response of `DELETE /order/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

fn service(state: &AppState) -> OrderService<'_> {
    OrderService::new(state.repositories(), state.notifier())
}

/// GET /order
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(service(&state).get_all().await?))
}

/// POST /order
#[instrument(skip(state, request))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = service(&state).create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// POST /order/approve
///
/// WayForPay service URL. Accepts the report as JSON or as a form body whose
/// single key is the JSON document. Answers `null` when nothing was approved.
#[instrument(skip(state, body), fields(size = body.len()))]
pub async fn approve(State(state): State<AppState>, body: Bytes) -> Result<Json<Option<Order>>> {
    let callback = WayForPayCallback::from_body(&body).map_err(|e| {
        tracing::warn!(error = %e, "unreadable payment callback");
        AppError::BadRequest("Invalid payment callback".to_string())
    })?;

    Ok(Json(service(&state).approve_order(&callback).await?))
}

/// POST /order/approve/admin
#[instrument(skip(state), fields(order_id = %body.order_id))]
pub async fn approve_admin(
    State(state): State<AppState>,
    Json(body): Json<AdminApproval>,
) -> Result<Json<Option<Order>>> {
    Ok(Json(service(&state).approve_order_admin(&body.order_id).await?))
}

/// POST /order/approve/liqpay
///
/// LiqPay server callback. The signature is not verified.
#[instrument(skip(state, form))]
pub async fn approve_liqpay(
    State(state): State<AppState>,
    Form(form): Form<LiqPayForm>,
) -> Result<Json<Option<Order>>> {
    let callback = decode_liqpay_data(&form.data).map_err(|e| {
        tracing::warn!(error = %e, "unreadable LiqPay callback");
        AppError::BadRequest("Invalid payment callback".to_string())
    })?;

    if !callback.is_success() {
        tracing::info!(order_id = %callback.order_id, status = %callback.status, "LiqPay payment not successful");
        return Ok(Json(None));
    }

    Ok(Json(
        service(&state)
            .approve_order_admin(&callback.order_id)
            .await?,
    ))
}

/// POST /order/success
///
/// Payment pages post back here; the customer is sent on to the storefront.
pub async fn success(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.config().success_redirect_url.clone())],
    )
}

/// DELETE /order/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<DeleteResponse>> {
    let deleted = service(&state).delete_order(&order_id).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// GET /order/by-email?email=
#[instrument(skip(state))]
pub async fn by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(service(&state).find_all_by_email(&query.email).await?))
}
