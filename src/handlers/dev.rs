use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::db::queries;
use crate::models::Activity;
use crate::state::AppState;

const SAMPLE_ACTIVITIES: &[(&str, &str, &str, f64, i32, i32)] = &[
    (
        "Coastal Kayak Tour",
        "coastal-kayak-tour",
        "Half-day paddle along the cliffs with a certified guide.",
        89.99,
        180,
        12,
    ),
    (
        "Old Town Food Walk",
        "old-town-food-walk",
        "Tastings at six family-run spots in the historic center.",
        55.0,
        150,
        10,
    ),
    (
        "Sunset Catamaran Cruise",
        "sunset-catamaran-cruise",
        "Two hours on the water, drinks included.",
        120.0,
        120,
        30,
    ),
    (
        "Volcano Hike",
        "volcano-hike",
        "Full-day guided ascent, moderate fitness required.",
        75.5,
        420,
        8,
    ),
];

#[derive(Serialize)]
pub struct SeedResponse {
    pub inserted: usize,
    pub skipped: usize,
}

// POST /api/dev/seed — development only, idempotent on slug.
pub async fn seed(State(state): State<Arc<AppState>>) -> Response {
    if state.config.is_production() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"message": "not found"})),
        )
            .into_response();
    }

    let db = state.db.lock().unwrap();

    let mut inserted = 0;
    let mut skipped = 0;
    for (name, slug, description, price, duration_minutes, capacity) in SAMPLE_ACTIVITIES {
        let exists = match queries::get_activity_by_slug(&db, slug) {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"message": e.to_string()})),
                )
                    .into_response()
            }
        };
        if exists {
            skipped += 1;
            continue;
        }

        let now = Utc::now().naive_utc();
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
            location: None,
            duration_minutes: *duration_minutes,
            price: *price,
            capacity: *capacity,
            active: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = queries::create_activity(&db, &activity) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"message": e.to_string()})),
            )
                .into_response();
        }
        inserted += 1;
    }

    tracing::info!(inserted, skipped, "seeded sample activities");
    Json(SeedResponse { inserted, skipped }).into_response()
}
