use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens and of the `token` cookie.
    pub token_ttl_days: i64,
    /// Mark the `token` cookie `Secure`. Disable only for plain-HTTP development.
    pub cookie_secure: bool,
}

/// Which payment gateway implementation to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingProvider {
    /// Approves every card except the documented failure cards. No network.
    #[default]
    Sandbox,
    Iyzico,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BillingConfig {
    pub provider: BillingProvider,
    pub api_key: String,
    pub secret_key: String,
    pub base_url: String,
    /// PREMIUM price in minor units (kuruş).
    pub premium_price_minor: i64,
    pub currency: String,
    pub locale: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            provider: BillingProvider::Sandbox,
            api_key: String::new(),
            secret_key: String::new(),
            base_url: "https://sandbox-api.iyzipay.com".into(),
            premium_price_minor: 29_900,
            currency: "TRY".into(),
            locale: "tr".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub billing: BillingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let billing = BillingConfig::default();
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("auth.cookie_secure", true)?
            .set_default("billing.provider", "sandbox")?
            .set_default("billing.api_key", billing.api_key)?
            .set_default("billing.secret_key", billing.secret_key)?
            .set_default("billing.base_url", billing.base_url)?
            .set_default("billing.premium_price_minor", billing.premium_price_minor)?
            .set_default("billing.currency", billing.currency)?
            .set_default("billing.locale", billing.locale)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., HALISAHA__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("HALISAHA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
