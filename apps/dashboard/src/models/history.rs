use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{null_as_default, JobCriteria, ResumeRecord};

/// A saved job search. Immutable once created server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSearchRecord {
    pub id: String,
    #[serde(default, rename = "job_title")]
    pub title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobSearchRecord {
    /// The criteria this search was run with: its description when present, else its keywords.
    pub fn criteria(&self) -> JobCriteria {
        match self.job_description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => JobCriteria::Description {
                description: text.to_string(),
            },
            _ => JobCriteria::Keywords {
                keywords: self.keywords.clone(),
            },
        }
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled search")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchHistoryRecord {
    pub id: String,
    pub job_search_id: String,
    pub resume_id: String,
    #[serde(rename = "match_score")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_skills: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_skills: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub job_search: Option<JobSearchRecord>,
    #[serde(default)]
    pub resume: Option<ResumeRecord>,
}
