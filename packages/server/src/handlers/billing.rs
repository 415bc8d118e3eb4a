use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use common::{PaymentStatus, Plan};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::billing::{ChargeOutcome, ChargeRequest};
use crate::entity::{organization, payment, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::billing::*;
use crate::state::AppState;

/// A PENDING payment younger than this blocks new checkouts of the account.
/// Older ones are left behind by interrupted requests and no longer count.
const PENDING_CHECKOUT_TTL: chrono::TimeDelta = chrono::TimeDelta::minutes(15);

#[utoipa::path(
    get,
    path = "/api/v1/billing/plans",
    tag = "Billing",
    operation_id = "listPlans",
    summary = "List plans",
    description = "Public. Limits and price of every plan.",
    responses((status = 200, description = "Plans", body = Vec<PlanInfo>)),
)]
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanInfo>> {
    let billing = &state.config.billing;
    Json(
        Plan::ALL
            .iter()
            .map(|&plan| PlanInfo {
                plan,
                max_players: plan.max_players(),
                max_matches_per_week: plan.max_matches_per_week(),
                price_minor: match plan {
                    Plan::Free => 0,
                    Plan::Premium => billing.premium_price_minor,
                },
                currency: billing.currency.clone(),
            })
            .collect(),
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/billing/checkout",
    tag = "Billing",
    operation_id = "checkout",
    summary = "Buy a plan",
    description = "Charges the card once through the configured payment gateway. On success the account moves to the plan and every organization it owns follows, with the plan's `max_players`. Every attempt is recorded as a payment.",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Plan purchased", body = CheckoutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 402, description = "Card declined (PAYMENT_FAILED)", body = ErrorBody),
        (status = 409, description = "Already on this plan or another checkout in progress (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, payload), fields(user_id = auth_user.user_id, plan = %payload.plan))]
pub async fn checkout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    validate_checkout(&payload)?;

    let billing = &state.config.billing;
    let conversation_id = uuid::Uuid::now_v7().to_string();

    // Reserve the checkout under the account row lock so that concurrent
    // requests cannot both reach the gateway.
    let txn = state.db.begin().await?;
    let buyer_account = user::Entity::find_by_id(auth_user.user_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    if buyer_account.plan == payload.plan {
        return Err(AppError::Conflict(format!(
            "Account is already on the {} plan",
            payload.plan
        )));
    }
    let in_flight = payment::Entity::find()
        .filter(payment::Column::UserId.eq(buyer_account.id))
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .filter(payment::Column::CreatedAt.gt(chrono::Utc::now() - PENDING_CHECKOUT_TTL))
        .count(&txn)
        .await?;
    if in_flight > 0 {
        return Err(AppError::Conflict(
            "Another checkout for this account is in progress".into(),
        ));
    }

    let now = chrono::Utc::now();
    let pending = payment::ActiveModel {
        user_id: Set(buyer_account.id),
        plan: Set(payload.plan),
        amount_minor: Set(billing.premium_price_minor),
        currency: Set(billing.currency.clone()),
        status: Set(PaymentStatus::Pending),
        conversation_id: Set(conversation_id.clone()),
        provider_payment_id: Set(None),
        error_message: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    let request = ChargeRequest {
        conversation_id,
        plan: payload.plan,
        amount_minor: billing.premium_price_minor,
        currency: billing.currency.clone(),
        locale: billing.locale.clone(),
        card: payload.card.into(),
        buyer: build_buyer(&buyer_account, payload.buyer, client_ip(&headers)),
    };

    let outcome = match state.gateway.charge(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            mark_failed(&state.db, pending, e.to_string()).await?;
            return Err(AppError::Internal(format!("Payment gateway error: {e}")));
        }
    };

    let provider_payment_id = match outcome {
        ChargeOutcome::Approved { payment_id } => payment_id,
        ChargeOutcome::Declined { code, message } => {
            warn!(
                payment_id = pending.id,
                code = code.as_deref().unwrap_or("-"),
                "Payment declined"
            );
            mark_failed(&state.db, pending, message.clone()).await?;
            return Err(AppError::PaymentFailed(message));
        }
    };

    let txn = state.db.begin().await?;

    let mut active: payment::ActiveModel = pending.into();
    active.status = Set(PaymentStatus::Success);
    active.provider_payment_id = Set(Some(provider_payment_id));
    active.updated_at = Set(chrono::Utc::now());
    let paid = active.update(&txn).await?;

    let mut account: user::ActiveModel = buyer_account.into();
    account.plan = Set(payload.plan);
    let upgraded_user = account.update(&txn).await?;

    let upgraded = organization::Entity::update_many()
        .col_expr(organization::Column::Plan, Expr::value(payload.plan))
        .col_expr(
            organization::Column::MaxPlayers,
            Expr::value(payload.plan.max_players()),
        )
        .col_expr(organization::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(organization::Column::OwnerId.eq(upgraded_user.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(
        payment_id = paid.id,
        user_id = upgraded_user.id,
        organizations = upgraded.rows_affected,
        "Plan upgraded"
    );

    Ok(Json(CheckoutResponse {
        payment: paid.into(),
        user: upgraded_user.into(),
        upgraded_organizations: upgraded.rows_affected,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/billing/payments",
    tag = "Billing",
    operation_id = "listPayments",
    summary = "List the caller's payments",
    description = "Newest first, failed attempts included.",
    responses(
        (status = 200, description = "Payments", body = Vec<PaymentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_payments(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let rows = payment::Entity::find()
        .filter(payment::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

async fn mark_failed(
    db: &DatabaseConnection,
    pending: payment::Model,
    message: String,
) -> Result<(), DbErr> {
    let mut active: payment::ActiveModel = pending.into();
    active.status = Set(PaymentStatus::Failure);
    active.error_message = Set(Some(message));
    active.updated_at = Set(chrono::Utc::now());
    active.update(db).await?;
    Ok(())
}

/// First hop of `X-Forwarded-For`, for the gateway's fraud checks.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("127.0.0.1")
        .to_string()
}
