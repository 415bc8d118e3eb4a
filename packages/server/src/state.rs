use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::billing::PaymentGateway;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub gateway: Arc<dyn PaymentGateway>,
}
