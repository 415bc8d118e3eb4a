use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use tracing::{info, warn};

use super::{ChargeOutcome, ChargeRequest, GatewayError, PaymentGateway, format_amount};
use crate::config::BillingConfig;

const PAYMENT_PATH: &str = "/payment/auth";

/// Client for the iyzico hosted payment API (non-3DS card payment).
#[derive(Clone)]
pub struct IyzicoGateway {
    api_key: String,
    secret_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentCard<'a> {
    card_holder_name: &'a str,
    card_number: &'a str,
    expire_month: &'a str,
    expire_year: &'a str,
    cvc: &'a str,
    register_card: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuyerBody<'a> {
    id: String,
    name: &'a str,
    surname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    gsm_number: Option<&'a str>,
    email: &'a str,
    identity_number: &'a str,
    registration_address: &'a str,
    ip: &'a str,
    city: &'a str,
    country: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddressBody<'a> {
    contact_name: String,
    city: &'a str,
    country: &'a str,
    address: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BasketItem {
    id: String,
    name: String,
    category1: &'static str,
    item_type: &'static str,
    price: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentBody<'a> {
    locale: &'a str,
    conversation_id: &'a str,
    price: String,
    paid_price: String,
    currency: &'a str,
    installment: u8,
    basket_id: String,
    payment_channel: &'static str,
    payment_group: &'static str,
    payment_card: PaymentCard<'a>,
    buyer: BuyerBody<'a>,
    shipping_address: AddressBody<'a>,
    billing_address: AddressBody<'a>,
    basket_items: Vec<BasketItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentReply {
    status: String,
    payment_id: Option<String>,
    error_code: Option<String>,
    error_message: Option<String>,
}

impl IyzicoGateway {
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn body<'a>(request: &'a ChargeRequest) -> PaymentBody<'a> {
        let price = format_amount(request.amount_minor);
        let buyer = &request.buyer;
        let contact_name = format!("{} {}", buyer.name, buyer.surname);
        let address = || AddressBody {
            contact_name: contact_name.clone(),
            city: &buyer.city,
            country: &buyer.country,
            address: &buyer.address,
        };

        PaymentBody {
            locale: &request.locale,
            conversation_id: &request.conversation_id,
            price: price.clone(),
            paid_price: price.clone(),
            currency: &request.currency,
            installment: 1,
            basket_id: format!("plan-{}", request.conversation_id),
            payment_channel: "WEB",
            payment_group: "SUBSCRIPTION",
            payment_card: PaymentCard {
                card_holder_name: &request.card.holder_name,
                card_number: &request.card.number,
                expire_month: &request.card.expire_month,
                expire_year: &request.card.expire_year,
                cvc: &request.card.cvc,
                register_card: 0,
            },
            buyer: BuyerBody {
                id: buyer.id.to_string(),
                name: &buyer.name,
                surname: &buyer.surname,
                gsm_number: buyer.gsm_number.as_deref(),
                email: &buyer.email,
                identity_number: &buyer.identity_number,
                registration_address: &buyer.address,
                ip: &buyer.ip,
                city: &buyer.city,
                country: &buyer.country,
            },
            shipping_address: address(),
            billing_address: address(),
            basket_items: vec![BasketItem {
                id: request.plan.as_str().to_string(),
                name: format!("{} plan", request.plan),
                category1: "Subscription",
                item_type: "VIRTUAL",
                price,
            }],
        }
    }

    /// Build the `IYZWSv2` authorization header value for a request body.
    pub(crate) fn authorization(
        &self,
        random_key: &str,
        path: &str,
        body: &str,
    ) -> Result<String, GatewayError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| GatewayError::Unexpected(e.to_string()))?;
        mac.update(random_key.as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let params = format!(
            "apiKey:{}&randomKey:{}&signature:{}",
            self.api_key, random_key, signature
        );
        Ok(format!("IYZWSv2 {}", STANDARD.encode(params)))
    }
}

fn random_key() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(100_000..1_000_000);
    format!("{millis}{suffix}")
}

#[async_trait]
impl PaymentGateway for IyzicoGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let body = serde_json::to_string(&Self::body(request))
            .map_err(|e| GatewayError::Unexpected(e.to_string()))?;
        let rnd = random_key();
        let authorization = self.authorization(&rnd, PAYMENT_PATH, &body)?;

        let resp = self
            .client
            .post(format!("{}{}", self.base_url, PAYMENT_PATH))
            .header("Authorization", authorization)
            .header("x-iyzi-rnd", &rnd)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let value: Value = resp.json().await?;
        let reply: PaymentReply = serde_json::from_value(value).map_err(|e| {
            GatewayError::Unexpected(format!("HTTP {status}: {e}"))
        })?;

        match (reply.status.as_str(), reply.payment_id) {
            ("success", Some(payment_id)) => {
                info!(conversation_id = %request.conversation_id, %payment_id, "Payment approved");
                Ok(ChargeOutcome::Approved { payment_id })
            }
            ("success", None) => Err(GatewayError::Unexpected(
                "success reply without paymentId".into(),
            )),
            _ => {
                warn!(
                    conversation_id = %request.conversation_id,
                    code = ?reply.error_code,
                    "Payment declined"
                );
                Ok(ChargeOutcome::Declined {
                    code: reply.error_code,
                    message: reply
                        .error_message
                        .unwrap_or_else(|| "Payment was declined".into()),
                })
            }
        }
    }
}
