use async_trait::async_trait;
use tracing::info;

use super::{ChargeOutcome, ChargeRequest, GatewayError, PaymentGateway};

/// Test card numbers that the sandbox declines, with the gateway's code and message.
const DECLINED_CARDS: &[(&str, &str, &str)] = &[
    ("4111111111111129", "10051", "Insufficient funds"),
    ("4129111111111111", "10005", "Do not honour"),
    ("4128111111111112", "10012", "Invalid transaction"),
    ("4127111111111113", "10043", "Lost card"),
    ("4126111111111114", "10043", "Stolen card"),
    ("4125111111111115", "10054", "Expired card"),
];

/// Offline gateway used in development and tests.
///
/// Approves every card except the ones in [`DECLINED_CARDS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SandboxGateway;

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let number: String = request
            .card
            .number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();

        if let Some((_, code, message)) = DECLINED_CARDS.iter().find(|(n, _, _)| *n == number) {
            info!(conversation_id = %request.conversation_id, code, "Sandbox declined charge");
            return Ok(ChargeOutcome::Declined {
                code: Some((*code).to_string()),
                message: (*message).to_string(),
            });
        }

        Ok(ChargeOutcome::Approved {
            payment_id: format!("sandbox-{}", request.conversation_id),
        })
    }
}
