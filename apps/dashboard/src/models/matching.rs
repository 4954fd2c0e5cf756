use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SubmissionError;
use crate::models::null_as_default;

/// One scored association between an uploaded resume and the job criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub filename: String,
    pub score: f64, // 0 – 100
    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_skills: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_skills: BTreeSet<String>,
    #[serde(default, alias = "extracted_data", rename = "extracted_fields")]
    pub extracted_fields: Option<Map<String, Value>>,
}

impl MatchResult {
    /// Looks up a string field the backend extracted from the resume (e.g. `email`).
    pub fn extracted_str(&self, key: &str) -> Option<&str> {
        self.extracted_fields
            .as_ref()
            .and_then(|fields| fields.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// What the user typed on the match form. The variant is the mode flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRequestInput {
    Description(String),
    /// Raw comma separated keyword string, exactly as entered.
    Keywords(String),
}

impl MatchRequestInput {
    pub fn from_mode(use_keywords: bool, description: &str, keywords: &str) -> Self {
        if use_keywords {
            MatchRequestInput::Keywords(keywords.to_string())
        } else {
            MatchRequestInput::Description(description.to_string())
        }
    }

    /// Checks the active variant and produces the job criteria sent to the backend.
    pub fn validate(&self) -> Result<JobCriteria, SubmissionError> {
        match self {
            MatchRequestInput::Description(text) => {
                if text.trim().is_empty() {
                    return Err(SubmissionError::MissingDescription);
                }
                Ok(JobCriteria::Description {
                    description: text.clone(),
                })
            }
            MatchRequestInput::Keywords(raw) => {
                let keywords = split_keywords(raw);
                if keywords.is_empty() {
                    return Err(SubmissionError::MissingKeywords);
                }
                Ok(JobCriteria::Keywords { keywords })
            }
        }
    }
}

/// The `job_input` field: `{"description": ...}` or `{"keywords": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobCriteria {
    Description { description: String },
    Keywords { keywords: Vec<String> },
}

/// Splits on commas, trims each keyword and drops empty segments.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
