use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn, Instrument};

use crate::api_client::{normalize, MatchClient};
use crate::errors::{SubmissionError, TransportFailure};
use crate::models::{JobCriteria, MatchRequestInput, MatchResult, UploadedFile};

/// Checks a submission without touching the network.
pub fn validate_submission(
    input: &MatchRequestInput,
    files: &[UploadedFile],
) -> Result<JobCriteria, SubmissionError> {
    if files.is_empty() {
        return Err(SubmissionError::NoFiles);
    }
    input.validate()
}

fn build_form(files: &[UploadedFile], criteria: &JobCriteria) -> Result<Form, SubmissionError> {
    let job_input = serde_json::to_string(criteria)
        .map_err(|e| SubmissionError::Unknown(format!("could not encode job input: {e}")))?;

    let mut form = Form::new();
    for file in files {
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type())
            .map_err(|e| SubmissionError::Unknown(format!("invalid upload {}: {e}", file.file_name)))?;
        form = form.part("files", part);
    }
    Ok(form.text("job_input", job_input))
}

impl MatchClient {
    pub async fn submit(
        &self,
        input: &MatchRequestInput,
        files: &[UploadedFile],
        credential: Option<&str>,
    ) -> Result<Vec<MatchResult>, SubmissionError> {
        self.submit_with_notice(input, files, credential, || {}).await
    }

    /// Validates, uploads and normalizes one match request.
    ///
    /// `on_slow` runs once if the request is still pending after the slow
    /// threshold. A non-2xx status is not an error by itself: its JSON body is
    /// normalized like any other and usually yields an empty result list.
    pub async fn submit_with_notice<N>(
        &self,
        input: &MatchRequestInput,
        files: &[UploadedFile],
        credential: Option<&str>,
        on_slow: N,
    ) -> Result<Vec<MatchResult>, SubmissionError>
    where
        N: FnOnce() + Send + 'static,
    {
        let criteria = validate_submission(input, files)?;
        let endpoint = Self::endpoint_for(credential);
        let form = build_form(files, &criteria)?;

        info!(endpoint, files = files.len(), "submitting match request");

        let (request, span) = self.request(Method::POST, endpoint, credential);
        let call = async {
            let response = request.multipart(form).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .instrument(span);

        let (status, body) = self
            .policy
            .run_with_notice(call, on_slow)
            .await
            .map_err(|e| SubmissionError::from(TransportFailure::from(e)))?;

        let payload: Value = serde_json::from_slice(&body).map_err(|e| {
            SubmissionError::Unknown(format!("server returned {status} with a non-JSON body: {e}"))
        })?;

        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "match request returned error status");
        }

        let results = normalize(&payload);
        info!(endpoint, status = status.as_u16(), results = results.len(), "match request settled");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::{MATCH_AND_SAVE_ENDPOINT, MATCH_ENDPOINT};
    use crate::test_support::{unreachable_base_url, MockBackend};
    use crate::timing::DeadlinePolicy;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn two_files() -> Vec<UploadedFile> {
        vec![
            UploadedFile::new("alice.pdf", b"%PDF alice".to_vec()),
            UploadedFile::new("bob.txt", b"bob resume".to_vec()),
        ]
    }

    fn match_body() -> Value {
        json!([
            {"filename": "alice.pdf", "score": 88, "matched_skills": ["Python"], "missing_skills": ["SQL"]},
            {"filename": "bob.txt", "score": 35}
        ])
    }

    #[tokio::test]
    async fn test_validation_precedes_network() {
        let backend = MockBackend::start().await;
        let client = MatchClient::new(&backend.base_url).unwrap();

        let no_files = client
            .submit(&MatchRequestInput::Description("Rust dev".into()), &[], None)
            .await;
        assert_eq!(no_files, Err(SubmissionError::NoFiles));

        let no_keywords = client
            .submit(&MatchRequestInput::Keywords("  ".into()), &two_files(), None)
            .await;
        assert_eq!(no_keywords, Err(SubmissionError::MissingKeywords));

        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_submit_uses_stateless_endpoint() {
        let backend = MockBackend::start().await;
        backend.respond("POST", MATCH_ENDPOINT, 200, match_body());
        let client = MatchClient::new(&backend.base_url).unwrap();

        let results = client
            .submit(&MatchRequestInput::Keywords("Python, React,  SQL ".into()), &two_files(), None)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].filename, "alice.pdf");

        let recorded = backend.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].path, MATCH_ENDPOINT);
        assert!(recorded[0].authorization.is_none());
        assert_eq!(recorded[0].file_names, vec!["alice.pdf", "bob.txt"]);
        assert_eq!(
            recorded[0].job_input,
            Some(json!({"keywords": ["Python", "React", "SQL"]}))
        );
    }

    #[tokio::test]
    async fn test_authenticated_submit_uses_persisting_endpoint() {
        let backend = MockBackend::start().await;
        backend.respond("POST", MATCH_AND_SAVE_ENDPOINT, 200, json!({"matches": match_body()}));
        let client = MatchClient::new(&backend.base_url).unwrap();

        let results = client
            .submit(
                &MatchRequestInput::Description("Senior data engineer".into()),
                &two_files(),
                Some("session-token"),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let recorded = backend.requests();
        assert_eq!(recorded[0].path, MATCH_AND_SAVE_ENDPOINT);
        assert_eq!(recorded[0].authorization.as_deref(), Some("Bearer session-token"));
        assert_eq!(
            recorded[0].job_input,
            Some(json!({"description": "Senior data engineer"}))
        );
    }

    #[tokio::test]
    async fn test_error_status_with_typed_body_yields_empty_results() {
        let backend = MockBackend::start().await;
        backend.respond("POST", MATCH_ENDPOINT, 500, json!({"detail": "Matching failed: boom"}));
        let client = MatchClient::new(&backend.base_url).unwrap();

        let results = client
            .submit(&MatchRequestInput::Keywords("rust".into()), &two_files(), None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_with_results_shape_still_normalizes() {
        let backend = MockBackend::start().await;
        backend.respond(
            "POST",
            MATCH_ENDPOINT,
            422,
            json!({"results": [{"filename": "alice.pdf", "score": 71, "matched_skills": ["Rust"]}]}),
        );
        let client = MatchClient::new(&backend.base_url).unwrap();

        let results = client
            .submit(&MatchRequestInput::Keywords("rust".into()), &two_files(), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filename, "alice.pdf");
        assert_eq!(results[0].score, 71.0);
        assert!(results[0].matched_skills.contains("Rust"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_unknown_error() {
        let backend = MockBackend::start().await;
        backend.respond_raw("POST", MATCH_ENDPOINT, 502, "<html>Bad Gateway</html>");
        let client = MatchClient::new(&backend.base_url).unwrap();

        let err = client
            .submit(&MatchRequestInput::Keywords("rust".into()), &two_files(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Unknown(ref msg) if msg.contains("502")), "{err:?}");
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_after_notice() {
        let backend = MockBackend::start().await;
        backend.respond_after("POST", MATCH_ENDPOINT, Duration::from_secs(5), 200, match_body());
        let policy =
            DeadlinePolicy::new(Duration::from_millis(400), Duration::from_millis(100)).unwrap();
        let client = MatchClient::new(&backend.base_url).unwrap().with_policy(policy);

        let slow = Arc::new(AtomicBool::new(false));
        let flag = slow.clone();
        let err = client
            .submit_with_notice(
                &MatchRequestInput::Keywords("rust".into()),
                &two_files(),
                None,
                move || flag.store(true, Ordering::SeqCst),
            )
            .await
            .unwrap_err();

        assert_eq!(err, SubmissionError::BackendUnresponsive);
        assert!(slow.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = MatchClient::new(unreachable_base_url().await).unwrap();
        let err = client
            .submit(&MatchRequestInput::Keywords("rust".into()), &two_files(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Unreachable(_)), "{err:?}");
    }
}
