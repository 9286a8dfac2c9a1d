use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::SensitivePayload;
use crate::services::booking::{self, BookingError, BookingRequest};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub activity_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub participants: Option<i64>,
    pub currency: Option<String>,
    pub customer: Option<CustomerBody>,
    pub billing_address: Option<serde_json::Value>,
    pub card: Option<serde_json::Value>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBody {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking_id: String,
    pub sensitive_saved: bool,
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingBody>,
) -> Response {
    let customer = body.customer.unwrap_or_default();

    let name = [customer.first_name.as_deref(), customer.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let request = BookingRequest {
        activity_id: body.activity_id,
        date: body.date,
        time: body.time,
        participants: body.participants,
        currency: body.currency,
        customer_id: customer.id.clone(),
        customer_name: (!name.is_empty()).then_some(name),
        customer_email: customer.email.clone(),
        customer_phone: customer.phone.clone(),
        customer_country: customer.country.clone(),
    };

    let outcome = {
        let db = state.db.lock().unwrap();
        booking::create_booking(&db, &request)
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => return error_response(&state, e),
    };

    // The sensitive record is written after the booking, outside any shared
    // transaction; a booking with no sensitive record is a tolerated state.
    let payload = SensitivePayload {
        customer: serde_json::to_value(&customer).unwrap_or_default(),
        billing_address: body.billing_address,
        card: body.card,
        notes: body.notes,
    };
    let sensitive_saved = state.sensitive.record(&outcome.booking.id, &payload);

    tracing::info!(
        booking_id = %outcome.booking.id,
        activity_id = %outcome.booking.activity_id,
        customer_id = %outcome.customer.id,
        total_price = outcome.booking.total_price,
        sensitive_saved,
        "booking created"
    );

    // 200 rather than 201, for compatibility with the site this replaces.
    (
        StatusCode::OK,
        Json(CreateBookingResponse {
            booking_id: outcome.booking.id,
            sensitive_saved,
        }),
    )
        .into_response()
}

fn error_response(state: &AppState, err: BookingError) -> Response {
    match &err {
        BookingError::MissingField(_) | BookingError::InvalidDateTime(_) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": err.to_string() })),
        )
            .into_response(),
        BookingError::ActivityNotFound(_) | BookingError::CustomerNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "message": err.to_string() })),
        )
            .into_response(),
        BookingError::Database(source) => {
            tracing::error!(error = %source, "booking persistence failed");
            let body = if state.config.is_production() {
                serde_json::json!({ "message": "internal server error" })
            } else {
                serde_json::json!({
                    "message": "internal server error",
                    "error": source.to_string(),
                })
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
