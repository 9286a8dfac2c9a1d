use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A bookable excursion with a per-person price. Read-only input to pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub capacity: i32,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
