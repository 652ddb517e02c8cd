pub mod metrics;
pub mod notifier;
pub mod providers;

pub use metrics::{get_metrics, init_metrics, record_booking, record_notification};
pub use notifier::{AppointmentNotifier, DispatchReceipt, NotifyError};
pub use providers::{
    MessagingProvider, MockMessagingProvider, OutboundMessage, ProviderError, ProviderResponse,
    TwilioProvider,
};
