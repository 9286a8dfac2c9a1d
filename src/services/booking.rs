use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{Booking, BookingStatus, Customer};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("missing or invalid required field: {0}")]
    MissingField(&'static str),

    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Pre-validation view of an inbound booking request. Presence checks happen
/// here rather than at deserialization so every missing field maps to the
/// same error shape.
#[derive(Debug, Default)]
pub struct BookingRequest {
    pub activity_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub participants: Option<i64>,
    pub currency: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_country: Option<String>,
}

#[derive(Debug)]
pub struct BookingOutcome {
    pub booking: Booking,
    pub customer: Customer,
}

/// Combines `YYYY-MM-DD` and `HH:MM` into one timestamp, interpreted as UTC.
/// Both components must parse strictly; `2024-02-30` and `25:99` are
/// rejected rather than coerced.
pub fn parse_date_time(date: &str, time: &str) -> Result<NaiveDateTime, BookingError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        BookingError::InvalidDateTime(format!("date must be a valid YYYY-MM-DD, got {date:?}"))
    })?;
    let time = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| {
        BookingError::InvalidDateTime(format!("time must be a valid HH:MM, got {time:?}"))
    })?;
    Ok(date.and_time(time))
}

/// `round(price × participants)` in whole currency units, half away from
/// zero. Deterministic; the only pricing rule in the system.
pub fn total_price(price_per_person: f64, participants: i64) -> i64 {
    (price_per_person * participants as f64).round() as i64
}

/// Find-or-create, never upsert: an email hit returns the stored row with
/// its fields untouched. An explicit id that resolves to nothing is an
/// error. At most one write.
pub fn resolve_customer(
    conn: &Connection,
    request: &BookingRequest,
) -> Result<Customer, BookingError> {
    if let Some(id) = request.customer_id.as_deref() {
        return queries::find_customer_by_id(conn, id)?
            .ok_or_else(|| BookingError::CustomerNotFound(id.to_string()));
    }

    let email = request.customer_email.as_deref().unwrap_or_default();
    if let Some(existing) = queries::find_customer_by_email(conn, email)? {
        return Ok(existing);
    }

    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        name: request.customer_name.clone().unwrap_or_default(),
        email: email.to_string(),
        phone: request.customer_phone.clone(),
        country: request.customer_country.clone(),
        created_at: Utc::now().naive_utc(),
    };

    match queries::create_customer(conn, &customer) {
        Ok(()) => Ok(customer),
        // Lost an insert race on the unique email: the winning row is the
        // customer.
        Err(e) if is_unique_violation(&e) => queries::find_customer_by_email(conn, email)?
            .ok_or(BookingError::Database(e)),
        Err(e) => Err(BookingError::Database(e)),
    }
}

/// The booking-creation workflow: validate, resolve the customer, price,
/// persist. All read-only checks complete before the first write, so a
/// rejected request leaves no rows behind.
pub fn create_booking(
    conn: &Connection,
    request: &BookingRequest,
) -> Result<BookingOutcome, BookingError> {
    let activity_id = require(request.activity_id.as_deref(), "activityId")?;
    let date = require(request.date.as_deref(), "date")?;
    let time = require(request.time.as_deref(), "time")?;
    if request.customer_id.is_none() {
        require(request.customer_email.as_deref(), "customer.email")?;
    }
    let participants = match request.participants {
        Some(n) if n > 0 => n,
        _ => return Err(BookingError::MissingField("participants")),
    };

    let date_time = parse_date_time(date, time)?;

    let activity = queries::get_activity_by_id(conn, activity_id)?
        .ok_or_else(|| BookingError::ActivityNotFound(activity_id.to_string()))?;

    let customer = resolve_customer(conn, request)?;

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        activity_id: activity.id.clone(),
        customer_id: customer.id.clone(),
        date_time,
        participants,
        currency: request
            .currency
            .clone()
            .unwrap_or_else(|| "USD".to_string()),
        total_price: total_price(activity.price, participants),
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    queries::create_booking(conn, &booking)?;

    Ok(BookingOutcome { booking, customer })
}

fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, BookingError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(BookingError::MissingField(field)),
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Activity;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_activity(conn: &Connection, price: f64) -> Activity {
        let now = Utc::now().naive_utc();
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            name: "Coastal Kayak Tour".to_string(),
            slug: "coastal-kayak-tour".to_string(),
            description: Some("Half-day paddle along the cliffs".to_string()),
            location: Some("Lagos".to_string()),
            duration_minutes: 180,
            price,
            capacity: 12,
            active: true,
            created_at: now,
            updated_at: now,
        };
        queries::create_activity(conn, &activity).unwrap();
        activity
    }

    fn valid_request(activity_id: &str) -> BookingRequest {
        BookingRequest {
            activity_id: Some(activity_id.to_string()),
            date: Some("2025-07-10".to_string()),
            time: Some("09:30".to_string()),
            participants: Some(2),
            customer_name: Some("Alice Mendes".to_string()),
            customer_email: Some("alice@example.com".to_string()),
            ..Default::default()
        }
    }

    fn customer_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))
            .unwrap()
    }

    fn booking_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_total_price_rounds_to_whole_units() {
        assert_eq!(total_price(89.99, 2), 180); // 179.98
        assert_eq!(total_price(10.0, 3), 30);
        assert_eq!(total_price(33.4, 1), 33);
        assert_eq!(total_price(2.5, 1), 3); // half away from zero
    }

    #[test]
    fn test_parse_date_time_valid() {
        let dt = parse_date_time("2025-07-10", "09:30").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-07-10 09:30");
    }

    #[test]
    fn test_parse_date_time_rejects_impossible_date() {
        let result = parse_date_time("2024-02-30", "10:00");
        assert!(matches!(result, Err(BookingError::InvalidDateTime(_))));
    }

    #[test]
    fn test_parse_date_time_rejects_impossible_time() {
        let result = parse_date_time("2024-02-28", "25:99");
        assert!(matches!(result, Err(BookingError::InvalidDateTime(_))));
    }

    #[test]
    fn test_resolve_customer_is_idempotent_by_email() {
        let conn = setup_db();
        let request = valid_request("unused");

        let first = resolve_customer(&conn, &request).unwrap();
        let second = resolve_customer(&conn, &request).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(customer_count(&conn), 1);
    }

    #[test]
    fn test_resolve_customer_does_not_overwrite_existing_fields() {
        let conn = setup_db();
        let mut request = valid_request("unused");
        resolve_customer(&conn, &request).unwrap();

        request.customer_name = Some("Someone Else".to_string());
        request.customer_phone = Some("+351000000".to_string());
        let resolved = resolve_customer(&conn, &request).unwrap();

        assert_eq!(resolved.name, "Alice Mendes");
        assert_eq!(resolved.phone, None);
    }

    #[test]
    fn test_resolve_customer_unknown_id_fails() {
        let conn = setup_db();
        let request = BookingRequest {
            customer_id: Some("no-such-id".to_string()),
            ..Default::default()
        };

        let result = resolve_customer(&conn, &request);
        assert!(matches!(result, Err(BookingError::CustomerNotFound(_))));
    }

    #[test]
    fn test_create_booking_happy_path() {
        let conn = setup_db();
        let activity = seed_activity(&conn, 89.99);

        let outcome = create_booking(&conn, &valid_request(&activity.id)).unwrap();

        assert_eq!(outcome.booking.status, BookingStatus::Pending);
        assert_eq!(outcome.booking.total_price, 180);
        assert_eq!(outcome.booking.currency, "USD");
        assert_eq!(outcome.booking.participants, 2);

        let stored = queries::get_booking_by_id(&conn, &outcome.booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.activity_id, activity.id);
        assert_eq!(stored.customer_id, outcome.customer.id);
    }

    #[test]
    fn test_create_booking_unknown_activity_leaves_no_rows() {
        let conn = setup_db();

        let result = create_booking(&conn, &valid_request("ghost-activity"));

        assert!(matches!(result, Err(BookingError::ActivityNotFound(_))));
        assert_eq!(customer_count(&conn), 0);
        assert_eq!(booking_count(&conn), 0);
    }

    #[test]
    fn test_create_booking_invalid_date_leaves_no_rows() {
        let conn = setup_db();
        let activity = seed_activity(&conn, 50.0);

        let mut request = valid_request(&activity.id);
        request.date = Some("2024-02-30".to_string());

        let result = create_booking(&conn, &request);
        assert!(matches!(result, Err(BookingError::InvalidDateTime(_))));
        assert_eq!(booking_count(&conn), 0);
    }

    #[test]
    fn test_create_booking_missing_email_names_the_field() {
        let conn = setup_db();
        let activity = seed_activity(&conn, 50.0);

        let mut request = valid_request(&activity.id);
        request.customer_email = None;

        match create_booking(&conn, &request) {
            Err(BookingError::MissingField(field)) => assert_eq!(field, "customer.email"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_create_booking_rejects_non_positive_participants() {
        let conn = setup_db();
        let activity = seed_activity(&conn, 50.0);

        let mut request = valid_request(&activity.id);
        request.participants = Some(0);

        let result = create_booking(&conn, &request);
        assert!(matches!(result, Err(BookingError::MissingField("participants"))));
    }

    #[test]
    fn test_create_booking_with_explicit_customer_id() {
        let conn = setup_db();
        let activity = seed_activity(&conn, 25.0);

        let existing = resolve_customer(&conn, &valid_request(&activity.id)).unwrap();

        let mut request = valid_request(&activity.id);
        request.customer_id = Some(existing.id.clone());
        request.customer_email = None;

        let outcome = create_booking(&conn, &request).unwrap();
        assert_eq!(outcome.customer.id, existing.id);
        assert_eq!(customer_count(&conn), 1);
    }
}
