//! Plan purchases through an external payment gateway.

mod iyzico;
mod sandbox;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use common::Plan;
use thiserror::Error;

use crate::config::{BillingConfig, BillingProvider};

pub use iyzico::IyzicoGateway;
pub use sandbox::SandboxGateway;

/// Card details as entered by the buyer. Never stored.
#[derive(Clone)]
pub struct Card {
    pub holder_name: String,
    pub number: String,
    pub expire_month: String,
    pub expire_year: String,
    pub cvc: String,
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4 = self.number.get(self.number.len().saturating_sub(4)..).unwrap_or("");
        f.debug_struct("Card")
            .field("holder_name", &self.holder_name)
            .field("number", &format_args!("**** {last4}"))
            .finish_non_exhaustive()
    }
}

/// Buyer identity and address sent along with the charge.
#[derive(Clone, Debug)]
pub struct Buyer {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub gsm_number: Option<String>,
    pub identity_number: String,
    pub ip: String,
    pub city: String,
    pub country: String,
    pub address: String,
}

#[derive(Clone, Debug)]
pub struct ChargeRequest {
    /// Our reference for the payment, echoed back by the gateway.
    pub conversation_id: String,
    pub plan: Plan,
    pub amount_minor: i64,
    pub currency: String,
    pub locale: String,
    pub card: Card,
    pub buyer: Buyer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChargeOutcome {
    Approved {
        payment_id: String,
    },
    Declined {
        code: Option<String>,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected gateway response: {0}")]
    Unexpected(String),
}

/// A payment provider able to charge a card once.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}

/// Build the gateway selected by `billing.provider`.
pub fn gateway_from_config(config: &BillingConfig) -> Arc<dyn PaymentGateway> {
    match config.provider {
        BillingProvider::Sandbox => Arc::new(SandboxGateway),
        BillingProvider::Iyzico => Arc::new(IyzicoGateway::new(config)),
    }
}

/// Render minor units as a decimal string (`29900` -> `"299.00"`).
pub fn format_amount(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
