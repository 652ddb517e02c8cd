use super::{MessagingProvider, OutboundMessage, ProviderError, ProviderResponse};
use crate::config::TwilioConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

const TWILIO_API_VERSION: &str = "2010-04-01";

/// Twilio error codes that mean the destination itself is unusable.
const INVALID_RECIPIENT_CODES: [u32; 3] = [21211, 21614, 63003];

pub struct TwilioProvider {
    config: TwilioConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct TwilioMessageForm<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<u32>,
    message: String,
    #[serde(default)]
    more_info: Option<String>,
}

impl TwilioProvider {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            TWILIO_API_VERSION,
            self.config.account_sid
        )
    }
}

/// Map a non-2xx Twilio reply onto a provider error carrying Twilio's message.
fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
    let (code, detail) = match serde_json::from_str::<TwilioErrorBody>(body) {
        Ok(error) => {
            if let Some(more_info) = &error.more_info {
                tracing::debug!(code = ?error.code, more_info = %more_info, "Twilio error details");
            }
            (error.code, error.message)
        }
        Err(_) => (None, format!("{}: {}", status.as_u16(), body)),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(detail),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(detail),
        StatusCode::BAD_REQUEST
            if code.is_some_and(|code| INVALID_RECIPIENT_CODES.contains(&code)) =>
        {
            ProviderError::InvalidRecipient(detail)
        }
        _ => ProviderError::SendFailed(detail),
    }
}

#[async_trait]
impl MessagingProvider for TwilioProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderResponse, ProviderError> {
        let form = TwilioMessageForm {
            from: &self.config.phone_number,
            to: &message.to,
            body: &message.body,
        };

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let twilio_message: TwilioMessage = response.json().await.map_err(|e| {
            ProviderError::SendFailed(format!("Failed to parse Twilio response: {}", e))
        })?;

        tracing::info!(
            to = %message.to,
            sid = %twilio_message.sid,
            "Message accepted by Twilio"
        );

        Ok(ProviderResponse::accepted(
            Some(twilio_message.sid),
            twilio_message.status,
        ))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        // Twilio has no cheap unauthenticated check; validate configuration only.
        if self.config.account_sid.is_empty() {
            return Err(ProviderError::Configuration(
                "Twilio account_sid is not configured".to_string(),
            ));
        }

        if self.config.auth_token.expose_secret().is_empty() {
            return Err(ProviderError::Configuration(
                "Twilio auth_token is not configured".to_string(),
            ));
        }

        if self.config.phone_number.is_empty() {
            return Err(ProviderError::Configuration(
                "Twilio phone_number is not configured".to_string(),
            ));
        }

        Ok(())
    }
}
