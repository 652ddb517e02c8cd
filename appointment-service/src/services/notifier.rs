use crate::models::{Appointment, Recipient};
use crate::services::metrics::record_notification;
use crate::services::providers::{
    MessagingProvider, OutboundMessage, ProviderError, ProviderResponse,
};
use std::sync::Arc;
use thiserror::Error;

/// A send failed; `recipient` says which one, for logs only.
#[derive(Debug, Error)]
#[error("Failed to notify {recipient}: {source}")]
pub struct NotifyError {
    pub recipient: Recipient,
    pub source: ProviderError,
}

#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub patient: ProviderResponse,
    pub doctor: ProviderResponse,
}

/// Sends the patient and doctor confirmations for a booking.
#[derive(Clone)]
pub struct AppointmentNotifier {
    provider: Arc<dyn MessagingProvider>,
    channel: String,
}

impl AppointmentNotifier {
    pub fn new(provider: Arc<dyn MessagingProvider>, channel: impl Into<String>) -> Self {
        Self {
            provider,
            channel: channel.into(),
        }
    }

    pub fn destination(&self, phone: &str) -> String {
        format!("{}:{}", self.channel, phone)
    }

    /// Notify the patient, then the doctor.
    ///
    /// The doctor is only contacted once the patient send has succeeded. A
    /// delivered patient message is never compensated for if the doctor send
    /// fails afterwards.
    #[tracing::instrument(skip_all)]
    pub async fn notify(&self, appointment: &Appointment) -> Result<DispatchReceipt, NotifyError> {
        let patient = self
            .send_to(
                Recipient::Patient,
                &appointment.patient_phone,
                appointment.patient_message(),
            )
            .await?;

        let doctor = self
            .send_to(
                Recipient::Doctor,
                &appointment.doctor_phone,
                appointment.doctor_message(),
            )
            .await?;

        Ok(DispatchReceipt { patient, doctor })
    }

    async fn send_to(
        &self,
        recipient: Recipient,
        phone: &str,
        body: String,
    ) -> Result<ProviderResponse, NotifyError> {
        let message = OutboundMessage {
            to: self.destination(phone),
            body,
        };

        match self.provider.send(&message).await {
            Ok(response) => {
                record_notification(recipient, "sent");
                tracing::info!(
                    recipient = %recipient,
                    to = %message.to,
                    provider_id = ?response.provider_id,
                    "Notification sent"
                );
                Ok(response)
            }
            Err(source) => {
                record_notification(recipient, "failed");
                Err(NotifyError { recipient, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMessagingProvider;

    fn appointment() -> Appointment {
        Appointment {
            patient_name: "Asha".to_string(),
            patient_phone: "+919800000001".to_string(),
            doctor_name: "Rao".to_string(),
            doctor_phone: "+919800000002".to_string(),
            date: "2024-05-01".to_string(),
            time: "10:00".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_patient_then_doctor() {
        let provider = Arc::new(MockMessagingProvider::new());
        let notifier = AppointmentNotifier::new(provider.clone(), "whatsapp");

        let receipt = notifier.notify(&appointment()).await.unwrap();

        let attempts = provider.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].to, "whatsapp:+919800000001");
        assert_eq!(
            attempts[0].body,
            "Hi Asha, your appointment with Dr. Rao is confirmed for 2024-05-01 at 10:00."
        );
        assert_eq!(attempts[1].to, "whatsapp:+919800000002");
        assert_eq!(
            attempts[1].body,
            "Dr. Rao, you have a new appointment with Asha on 2024-05-01 at 10:00."
        );
        assert_eq!(receipt.patient.provider_id.as_deref(), Some("mock-message-1"));
        assert_eq!(receipt.doctor.provider_id.as_deref(), Some("mock-message-2"));
    }

    #[tokio::test]
    async fn patient_failure_skips_doctor() {
        let provider = Arc::new(MockMessagingProvider::failing_on(
            1,
            ProviderError::Connection("connect ECONNREFUSED".to_string()),
        ));
        let notifier = AppointmentNotifier::new(provider.clone(), "whatsapp");

        let err = notifier.notify(&appointment()).await.unwrap_err();

        assert_eq!(err.recipient, Recipient::Patient);
        assert_eq!(err.source.detail(), "connect ECONNREFUSED");
        assert_eq!(provider.send_count(), 1);
    }

    #[tokio::test]
    async fn doctor_failure_reports_after_patient_was_sent() {
        let provider = Arc::new(MockMessagingProvider::failing_on(
            2,
            ProviderError::InvalidRecipient("Invalid 'To' Phone Number".to_string()),
        ));
        let notifier = AppointmentNotifier::new(provider.clone(), "whatsapp");

        let err = notifier.notify(&appointment()).await.unwrap_err();

        assert_eq!(err.recipient, Recipient::Doctor);
        assert_eq!(provider.send_count(), 2);
    }

    #[test]
    fn destination_uses_configured_channel() {
        let notifier = AppointmentNotifier::new(Arc::new(MockMessagingProvider::new()), "sms");
        assert_eq!(notifier.destination("+15550001"), "sms:+15550001");
    }
}
