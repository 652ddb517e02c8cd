use appointment_service::config::{AppointmentConfig, TwilioConfig};
use appointment_service::services::{init_metrics, MessagingProvider, MockMessagingProvider};
use appointment_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

pub fn test_config(api_base_url: &str) -> AppointmentConfig {
    AppointmentConfig {
        // Use random port for testing (port 0)
        common: CoreConfig { port: 0 },
        twilio: TwilioConfig {
            account_sid: "AC00000000000000000000000000000000".to_string(),
            auth_token: Secret::new("test-token".to_string()),
            phone_number: "whatsapp:+14155238886".to_string(),
            channel: "whatsapp".to_string(),
            api_base_url: api_base_url.to_string(),
            enabled: false,
        },
    }
}

pub fn booking_payload() -> Value {
    json!({
        "patientName": "Asha",
        "patientPhone": "+919800000001",
        "doctorName": "Rao",
        "doctorPhone": "+919800000002",
        "appointmentDate": "2024-05-01",
        "appointmentTime": "10:00"
    })
}

impl TestApp {
    pub async fn spawn() -> (Self, Arc<MockMessagingProvider>) {
        let provider = Arc::new(MockMessagingProvider::new());
        let app = Self::spawn_with(provider.clone(), test_config("http://127.0.0.1:9")).await;
        (app, provider)
    }

    pub async fn spawn_with(
        provider: Arc<dyn MessagingProvider>,
        config: AppointmentConfig,
    ) -> Self {
        init_metrics();

        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling the liveness route
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_booking(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/book-appointment", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
