use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job posting. Owned by the surrounding CRUD layer; screening only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: String,
    pub title: String,
    pub requirements: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
