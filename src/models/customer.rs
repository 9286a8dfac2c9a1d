use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A person identified uniquely by email; may hold many bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub created_at: NaiveDateTime,
}
