use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A descriptive tag on a post. Its own `is_published` flag only hides
/// it from the location listing; it never affects post visibility.
#[derive(Debug, Serialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationPayload {
    pub name: String,
    pub is_published: Option<bool>,
}
