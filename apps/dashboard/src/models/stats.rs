use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::null_as_default;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    #[serde(rename = "total_resumes")]
    pub resume_count: u64,
    #[serde(rename = "total_job_searches")]
    pub job_search_count: u64,
    #[serde(rename = "total_matches")]
    pub match_count: u64,
    /// Absent until the first match exists.
    #[serde(default, rename = "average_match_score")]
    pub average_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_activity: Vec<Value>,
}

impl DashboardStatistics {
    /// Average score as shown to the user. Never renders a missing average as zero.
    pub fn average_display(&self) -> String {
        match self.average_score {
            Some(avg) if self.match_count > 0 && avg.is_finite() => format!("{avg:.1}%"),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}
