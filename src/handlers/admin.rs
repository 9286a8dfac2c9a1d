use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::models::{Activity, BookingStatus};
use crate::state::AppState;

#[allow(clippy::result_large_err)]
fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), Response> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"message": "unauthorized"})),
        )
            .into_response());
    }
    Ok(())
}

fn internal_error(e: anyhow::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"message": e.to_string()})),
    )
        .into_response()
}

// GET /api/admin/stats
#[derive(Serialize)]
pub struct StatsResponse {
    pending_bookings: i64,
    confirmed_bookings: i64,
    cancelled_bookings: i64,
    customers_count: i64,
    activities_count: i64,
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let stats = {
        let db = state.db.lock().unwrap();
        queries::get_dashboard_stats(&db).map_err(internal_error)?
    };

    Ok(Json(StatsResponse {
        pending_bookings: stats.pending_bookings,
        confirmed_bookings: stats.confirmed_bookings,
        cancelled_bookings: stats.cancelled_bookings,
        customers_count: stats.customers_count,
        activities_count: stats.activities_count,
    }))
}

// GET /api/admin/activities
pub async fn get_activities(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Activity>>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let activities = {
        let db = state.db.lock().unwrap();
        queries::list_activities(&db, false).map_err(internal_error)?
    };

    Ok(Json(activities))
}

// POST /api/admin/activities
#[derive(Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: f64,
    pub capacity: Option<i32>,
    pub active: Option<bool>,
}

pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateActivityRequest>,
) -> Result<Json<Activity>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let now = Utc::now().naive_utc();
    let activity = Activity {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        slug: body.slug,
        description: body.description,
        location: body.location,
        duration_minutes: body.duration_minutes.unwrap_or(60),
        price: body.price,
        capacity: body.capacity.unwrap_or(10),
        active: body.active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_activity(&db, &activity).map_err(internal_error)?;
    }

    Ok(Json(activity))
}

// POST /api/admin/activities/:id
#[derive(Deserialize)]
pub struct UpdateActivityRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<f64>,
    pub capacity: Option<i32>,
    pub active: Option<bool>,
}

pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateActivityRequest>,
) -> Result<Json<Activity>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let db = state.db.lock().unwrap();

    let mut activity = queries::get_activity_by_id(&db, &id)
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"message": "activity not found"})),
            )
                .into_response()
        })?;

    if let Some(name) = body.name {
        activity.name = name;
    }
    if let Some(slug) = body.slug {
        activity.slug = slug;
    }
    if let Some(description) = body.description {
        activity.description = Some(description);
    }
    if let Some(location) = body.location {
        activity.location = Some(location);
    }
    if let Some(duration) = body.duration_minutes {
        activity.duration_minutes = duration;
    }
    if let Some(price) = body.price {
        activity.price = price;
    }
    if let Some(capacity) = body.capacity {
        activity.capacity = capacity;
    }
    if let Some(active) = body.active {
        activity.active = active;
    }

    queries::update_activity(&db, &activity).map_err(internal_error)?;

    Ok(Json(activity))
}

// POST /api/admin/activities/:id/delete
pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let removed = {
        let db = state.db.lock().unwrap();
        queries::delete_activity(&db, &id).map_err(internal_error)?
    };

    if removed {
        Ok(Json(serde_json::json!({"ok": true})))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"message": "activity not found"})),
        )
            .into_response())
    }
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    activity_id: String,
    customer_id: String,
    date_time: String,
    participants: i64,
    currency: String,
    total_price: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let status_filter = query.status.as_deref();

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, status_filter, limit).map_err(internal_error)?
    };

    let response: Vec<BookingResponse> = bookings
        .into_iter()
        .map(|b| BookingResponse {
            id: b.id,
            activity_id: b.activity_id,
            customer_id: b.customer_id,
            date_time: b.date_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            participants: b.participants,
            currency: b.currency,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(response))
}

// POST /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;
    set_booking_status(&state, &id, BookingStatus::Confirmed)
}

// POST /api/admin/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, Response> {
    check_auth(&headers, &state.config.admin_token)?;
    set_booking_status(&state, &id, BookingStatus::Cancelled)
}

fn set_booking_status(
    state: &AppState,
    id: &str,
    status: BookingStatus,
) -> Result<Json<serde_json::Value>, Response> {
    let updated = {
        let db = state.db.lock().unwrap();
        queries::update_booking_status(&db, id, &status).map_err(internal_error)?
    };

    if updated {
        tracing::info!(booking_id = %id, status = status.as_str(), "booking status updated");
        Ok(Json(serde_json::json!({"ok": true, "status": status.as_str()})))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"message": "booking not found"})),
        )
            .into_response())
    }
}

// GET /api/admin/customers
#[derive(Deserialize)]
pub struct CustomersQuery {
    pub limit: Option<i64>,
}

pub async fn get_customers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CustomersQuery>,
) -> Result<Json<Vec<crate::models::Customer>>, Response> {
    check_auth(&headers, &state.config.admin_token)?;

    let customers = {
        let db = state.db.lock().unwrap();
        queries::list_customers(&db, query.limit.unwrap_or(100)).map_err(internal_error)?
    };

    Ok(Json(customers))
}
