use chrono::{DateTime, Utc};
use common::{PaymentStatus, Plan};
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::billing::{Buyer, Card};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CardRequest {
    #[schema(example = "Emre Yılmaz")]
    pub holder_name: String,
    #[schema(example = "5528790000000008")]
    pub number: String,
    #[schema(example = "12")]
    pub expire_month: String,
    #[schema(example = "2030")]
    pub expire_year: String,
    #[schema(example = "123")]
    pub cvc: String,
}

/// Optional buyer details. Missing fields fall back to the account and
/// to placeholder values the gateway accepts.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct BuyerRequest {
    pub surname: Option<String>,
    pub gsm_number: Option<String>,
    pub identity_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CheckoutRequest {
    pub plan: Plan,
    pub card: CardRequest,
    pub buyer: Option<BuyerRequest>,
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

fn luhn_valid(number: &str) -> bool {
    let mut sum = 0;
    for (i, c) in number.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

pub fn validate_checkout(req: &CheckoutRequest) -> Result<(), AppError> {
    if req.plan == Plan::Free {
        return Err(AppError::Validation("Only PREMIUM can be purchased".into()));
    }
    let card = &req.card;
    validate_name(&card.holder_name, "Card holder name", 100)?;
    let number = digits(&card.number);
    if !(12..=19).contains(&number.len()) || !luhn_valid(&number) {
        return Err(AppError::Validation("Card number is not valid".into()));
    }
    let month: u32 = card
        .expire_month
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Expiry month is not valid".into()))?;
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("Expiry month is not valid".into()));
    }
    let year = card.expire_year.trim();
    if !matches!(year.len(), 2 | 4) || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("Expiry year is not valid".into()));
    }
    let cvc = card.cvc.trim();
    if !matches!(cvc.len(), 3 | 4) || !cvc.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("CVC is not valid".into()));
    }
    Ok(())
}

impl From<CardRequest> for Card {
    fn from(card: CardRequest) -> Self {
        Self {
            holder_name: card.holder_name.trim().to_string(),
            number: digits(&card.number),
            expire_month: format!("{:0>2}", card.expire_month.trim()),
            expire_year: card.expire_year.trim().to_string(),
            cvc: card.cvc.trim().to_string(),
        }
    }
}

/// Assemble the gateway buyer from the account and the optional overrides.
pub fn build_buyer(
    user: &crate::entity::user::Model,
    overrides: Option<BuyerRequest>,
    ip: String,
) -> Buyer {
    let overrides = overrides.unwrap_or_default();
    let (first, last) = match user.name.trim().rsplit_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (user.name.trim().to_string(), user.name.trim().to_string()),
    };
    Buyer {
        id: user.id,
        name: first,
        surname: overrides.surname.unwrap_or(last),
        email: user.email.clone(),
        gsm_number: overrides.gsm_number,
        identity_number: overrides
            .identity_number
            .unwrap_or_else(|| "11111111111".into()),
        ip,
        city: overrides.city.unwrap_or_else(|| "Istanbul".into()),
        country: overrides.country.unwrap_or_else(|| "Turkey".into()),
        address: overrides.address.unwrap_or_else(|| "N/A".into()),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PlanInfo {
    pub plan: Plan,
    #[schema(example = 10)]
    pub max_players: i32,
    /// `None` means unlimited.
    pub max_matches_per_week: Option<u64>,
    /// Price in minor units; 0 for FREE.
    #[schema(example = 29900)]
    pub price_minor: i64,
    #[schema(example = "TRY")]
    pub currency: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub plan: Plan,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub conversation_id: String,
    pub provider_payment_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::payment::Model> for PaymentResponse {
    fn from(m: crate::entity::payment::Model) -> Self {
        Self {
            id: m.id,
            plan: m.plan,
            amount_minor: m.amount_minor,
            currency: m.currency,
            status: m.status,
            conversation_id: m.conversation_id,
            provider_payment_id: m.provider_payment_id,
            error_message: m.error_message,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Result of a successful checkout.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckoutResponse {
    pub payment: PaymentResponse,
    pub user: super::auth::UserResponse,
    /// Number of owned organizations moved to the new plan.
    pub upgraded_organizations: u64,
}
