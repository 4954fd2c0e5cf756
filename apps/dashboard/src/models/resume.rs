use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::null_as_default;

/// A resume saved server-side by an authenticated match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}
