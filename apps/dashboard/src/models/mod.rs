pub mod history;
pub mod matching;
pub mod resume;
pub mod stats;
pub mod upload;

use std::fmt;

use serde::{Deserialize, Deserializer};

pub use history::{JobSearchRecord, MatchHistoryRecord};
pub use matching::{split_keywords, JobCriteria, MatchRequestInput, MatchResult};
pub use resume::ResumeRecord;
pub use stats::DashboardStatistics;
pub use upload::UploadedFile;

/// A remotely loaded collection, named by the endpoint that serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Resumes,
    JobSearches,
    MatchHistory,
    Stats,
}

impl Resource {
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Resumes => "/api/resumes",
            Resource::JobSearches => "/api/job-searches",
            Resource::MatchHistory => "/api/matches",
            Resource::Stats => "/api/dashboard/stats",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Resumes => "resumes",
            Resource::JobSearches => "job_searches",
            Resource::MatchHistory => "match_history",
            Resource::Stats => "stats",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
