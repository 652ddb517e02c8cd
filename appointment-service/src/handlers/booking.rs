use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BookingRequest, MissingFields};
use crate::services::{record_booking, NotifyError};
use crate::startup::AppState;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";
pub const BOOKED_MESSAGE: &str = "Appointment booked and messages sent successfully.";
pub const DISPATCH_FAILED_MESSAGE: &str = "Failed to send WhatsApp messages";

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    MissingFields(#[from] MissingFields),

    #[error(transparent)]
    Dispatch(#[from] NotifyError),
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            BookingError::MissingFields(_) => (
                StatusCode::BAD_REQUEST,
                BookingResponse {
                    message: MISSING_FIELDS_MESSAGE.to_string(),
                    error: None,
                },
            ),
            // The provider's text goes back to the caller verbatim.
            BookingError::Dispatch(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                BookingResponse {
                    message: DISPATCH_FAILED_MESSAGE.to_string(),
                    error: Some(err.source.detail().to_string()),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// POST /api/book-appointment
#[tracing::instrument(skip(state, payload))]
pub async fn book_appointment(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), BookingError> {
    let appointment = payload
        .map_err(|rejection| {
            tracing::debug!(error = %rejection, "Booking payload could not be parsed");
            MissingFields::default()
        })
        .and_then(|Json(request)| request.into_appointment())
        .map_err(|missing| {
            record_booking("invalid");
            tracing::debug!(fields = ?missing.fields, "Booking rejected");
            missing
        })?;

    if let Err(err) = state.notifier.notify(&appointment).await {
        record_booking("failed");
        tracing::error!(
            recipient = %err.recipient,
            error = %err.source,
            "Error sending messages"
        );
        return Err(err.into());
    }

    record_booking("booked");

    Ok((
        StatusCode::OK,
        Json(BookingResponse {
            message: BOOKED_MESSAGE.to_string(),
            error: None,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recipient;
    use crate::services::ProviderError;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_fields_is_a_bad_request_without_error_key() {
        let response = BookingError::from(MissingFields::default()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": "Missing required fields" }));
    }

    #[tokio::test]
    async fn dispatch_failure_exposes_provider_text_only() {
        let response = BookingError::from(NotifyError {
            recipient: Recipient::Doctor,
            source: ProviderError::Authentication("Authenticate".to_string()),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to send WhatsApp messages");
        assert_eq!(body["error"], "Authenticate");
    }
}
