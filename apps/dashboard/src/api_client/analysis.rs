use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;

use crate::api_client::{MatchClient, ANALYZE_JOB_ENDPOINT};
use crate::errors::{LoadError, TransportFailure};
use crate::models::{null_as_default, JobCriteria};

/// What the backend extracted from a job description or keyword list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub experience: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
}

impl MatchClient {
    /// POST /api/analyze-job. `criteria` comes from `MatchRequestInput::validate`.
    pub async fn analyze_job(
        &self,
        criteria: &JobCriteria,
        credential: Option<&str>,
    ) -> Result<JobAnalysis, LoadError> {
        let (request, span) = self.request(Method::POST, ANALYZE_JOB_ENDPOINT, credential);
        let call = async {
            let response = request.json(criteria).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .instrument(span);

        let (status, body) = self
            .policy
            .guard()
            .run(call)
            .await
            .map_err(|e| LoadError::from(TransportFailure::from(e)))?;

        if !status.is_success() {
            return Err(LoadError::Rejected {
                endpoint: ANALYZE_JOB_ENDPOINT.to_string(),
                status: status.as_u16(),
            });
        }
        serde_json::from_slice(&body)
            .map_err(|e| LoadError::Unknown(format!("unreadable job analysis: {e}")))
    }
}
