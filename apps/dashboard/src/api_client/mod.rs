//! Match API client: the single point of entry for every call to the resume
//! matching backend.
//!
//! Every request goes through the shared `DeadlinePolicy`, carries a fresh
//! `x-request-id`, and attaches `Authorization: Bearer <token>` only when a
//! session token is present.

use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use tracing::{info, Instrument};
use uuid::Uuid;

use crate::errors::{LoadError, TransportFailure};
use crate::timing::DeadlinePolicy;

pub mod analysis;
pub mod loader;
pub mod normalize;
pub mod submit;

pub use analysis::JobAnalysis;
pub use loader::Payloads;
pub use normalize::{detect_shape, normalize, PayloadShape};
pub use submit::validate_submission;

/// Stateless matching: nothing is persisted.
pub const MATCH_ENDPOINT: &str = "/api/match";
/// Authenticated matching: resumes, the search and its matches are saved.
pub const MATCH_AND_SAVE_ENDPOINT: &str = "/api/match-and-save";
const ANALYZE_JOB_ENDPOINT: &str = "/api/analyze-job";
const HEALTH_ENDPOINT: &str = "/";
const RESUMES_ENDPOINT: &str = "/api/resumes";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Greeting returned by the backend root, used as a wake-up probe.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone)]
pub struct MatchClient {
    client: Client,
    base_url: String,
    policy: DeadlinePolicy,
}

impl MatchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: DeadlinePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: DeadlinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DeadlinePolicy {
        self.policy
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Picks the match endpoint. Depends only on whether a session token exists.
    pub fn endpoint_for(credential: Option<&str>) -> &'static str {
        if bearer(credential).is_some() {
            MATCH_AND_SAVE_ENDPOINT
        } else {
            MATCH_ENDPOINT
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds a request with the auth and correlation headers applied.
    fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&str>,
    ) -> (RequestBuilder, tracing::Span) {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "backend_call",
            %request_id,
            method = %method,
            endpoint = path
        );

        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(header) = bearer(credential) {
            builder = builder.header(reqwest::header::AUTHORIZATION, header);
        }
        (builder, span)
    }

    /// GET / through the guard. Useful to wake a cold backend before real work.
    pub async fn ping(&self) -> Result<BackendStatus, LoadError> {
        let (request, span) = self.request(Method::GET, HEALTH_ENDPOINT, None);
        let call = async {
            let response = request.send().await?;
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
                endpoint: HEALTH_ENDPOINT.to_string(),
                status: status.as_u16(),
            });
        }
        serde_json::from_slice(&body)
            .map_err(|e| LoadError::Unknown(format!("unreadable health response: {e}")))
    }

    /// DELETE /api/resumes/{id}. The caller refreshes the resume list afterwards.
    pub async fn delete_resume(&self, id: &str, credential: Option<&str>) -> Result<(), LoadError> {
        let path = format!("{RESUMES_ENDPOINT}/{id}");
        let (request, span) = self.request(Method::DELETE, &path, credential);
        let call = async {
            let response = request.send().await?;
            Ok::<_, reqwest::Error>(response.status())
        }
        .instrument(span);

        let status = self
            .policy
            .guard()
            .run(call)
            .await
            .map_err(|e| LoadError::from(TransportFailure::from(e)))?;

        if !status.is_success() {
            return Err(LoadError::Rejected {
                endpoint: path,
                status: status.as_u16(),
            });
        }
        info!(resume_id = id, "resume deleted");
        Ok(())
    }
}

/// `Bearer <token>` for a non-blank token, otherwise nothing.
pub(crate) fn bearer(credential: Option<&str>) -> Option<String> {
    credential
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| format!("Bearer {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBackend;
    use serde_json::json;

    #[test]
    fn test_endpoint_depends_only_on_credential() {
        assert_eq!(MatchClient::endpoint_for(Some("tok")), MATCH_AND_SAVE_ENDPOINT);
        assert_eq!(MatchClient::endpoint_for(None), MATCH_ENDPOINT);
        assert_eq!(MatchClient::endpoint_for(Some("   ")), MATCH_ENDPOINT);
    }

    #[test]
    fn test_bearer_header_format() {
        assert_eq!(bearer(Some("abc")), Some("Bearer abc".to_string()));
        assert_eq!(bearer(Some("")), None);
        assert_eq!(bearer(None), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = MatchClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/match"), "http://localhost:8000/api/match");
    }

    #[tokio::test]
    async fn test_ping_reads_backend_status() {
        let backend = MockBackend::start().await;
        backend.respond(
            "GET",
            "/",
            200,
            json!({"status": "active", "message": "Resume Parser API is running", "version": "1.0.0"}),
        );

        let client = MatchClient::new(&backend.base_url).unwrap();
        let status = client.ping().await.unwrap();
        assert_eq!(status.status, "active");
        assert_eq!(status.version.as_deref(), Some("1.0.0"));

        let recorded = backend.requests();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].authorization.is_none());
        assert!(recorded[0].request_id.is_some());
    }

    #[tokio::test]
    async fn test_delete_sends_bearer_and_reports_rejection() {
        let backend = MockBackend::start().await;
        backend.respond("DELETE", "/api/resumes/r-1", 200, json!({"success": true}));
        backend.respond("DELETE", "/api/resumes/r-2", 404, json!({"detail": "not found"}));

        let client = MatchClient::new(&backend.base_url).unwrap();
        client.delete_resume("r-1", Some("tok")).await.unwrap();
        let err = client.delete_resume("r-2", Some("tok")).await.unwrap_err();

        assert_eq!(
            err,
            LoadError::Rejected {
                endpoint: "/api/resumes/r-2".into(),
                status: 404
            }
        );
        assert_eq!(
            backend.requests()[0].authorization.as_deref(),
            Some("Bearer tok")
        );
    }
}
