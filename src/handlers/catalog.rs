use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Activity;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub capacity: i32,
    pub active: bool,
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        ActivityResponse {
            id: a.id,
            name: a.name,
            slug: a.slug,
            description: a.description,
            location: a.location,
            duration_minutes: a.duration_minutes,
            price: a.price,
            capacity: a.capacity,
            active: a.active,
        }
    }
}

// GET /api/activities
pub async fn list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityResponse>>, AppError> {
    let activities = {
        let db = state.db.lock().unwrap();
        queries::list_activities(&db, true)?
    };

    Ok(Json(activities.into_iter().map(Into::into).collect()))
}

// GET /api/activities/:slug
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<ActivityResponse>, AppError> {
    let activity = {
        let db = state.db.lock().unwrap();
        queries::get_activity_by_slug(&db, &slug)?
    };

    activity
        .map(|a| Json(a.into()))
        .ok_or_else(|| AppError::NotFound(format!("activity {slug}")))
}
