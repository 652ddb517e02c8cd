use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_CHANNEL: &str = "whatsapp";
pub const DEFAULT_TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct AppointmentConfig {
    pub common: core_config::Config,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: Secret<String>,
    /// Sender address, sent verbatim as `From`.
    pub phone_number: String,
    /// Channel indicator prefixed to every destination, e.g. `whatsapp`.
    pub channel: String,
    pub api_base_url: String,
    /// `false` swaps in the mock provider; nothing is delivered.
    pub enabled: bool,
}

impl TwilioConfig {
    pub fn has_credentials(&self) -> bool {
        !self.account_sid.is_empty()
            && !self.auth_token.expose_secret().is_empty()
            && !self.phone_number.is_empty()
    }
}

impl AppointmentConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AppointmentConfig {
            common: common_config,
            twilio: TwilioConfig {
                account_sid: get_env("TWILIO_ACCOUNT_SID", Some(""), is_prod)?,
                auth_token: Secret::new(get_env("TWILIO_AUTH_TOKEN", Some(""), is_prod)?),
                phone_number: get_env("TWILIO_PHONE_NUMBER", Some(""), is_prod)?,
                channel: env::var("TWILIO_CHANNEL").unwrap_or_else(|_| DEFAULT_CHANNEL.to_string()),
                api_base_url: env::var("TWILIO_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_TWILIO_API_BASE_URL.to_string()),
                enabled: env::var("TWILIO_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
