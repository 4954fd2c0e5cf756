use std::sync::Arc;

use tracing::{info, warn};

use crate::api_client::{validate_submission, BackendStatus, JobAnalysis, MatchClient};
use crate::auth::AuthTokenProvider;
use crate::errors::{AuthError, LoadError, SubmissionError};
use crate::models::{MatchRequestInput, Resource, UploadedFile};
use crate::store::{Collection, CollectionKind, DashboardResourceStore};

/// Dashboard sections. Activating one reloads the collections it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Match,
    Resumes,
    History,
    Analytics,
}

impl Tab {
    pub fn resources(&self) -> &'static [Resource] {
        match self {
            Tab::Match => &[],
            Tab::Resumes => &[Resource::Resumes],
            Tab::History => &[Resource::JobSearches, Resource::MatchHistory],
            Tab::Analytics => &[Resource::Stats],
        }
    }
}

/// Ties the session, the backend client and the store together.
/// The store is the only thing presentation code reads.
pub struct Dashboard {
    client: MatchClient,
    auth: Arc<dyn AuthTokenProvider>,
    store: Arc<DashboardResourceStore>,
}

impl Dashboard {
    pub fn new(client: MatchClient, auth: Arc<dyn AuthTokenProvider>) -> Self {
        Self {
            client,
            auth,
            store: Arc::new(DashboardResourceStore::new()),
        }
    }

    pub fn store(&self) -> &DashboardResourceStore {
        &self.store
    }

    pub fn client(&self) -> &MatchClient {
        &self.client
    }

    /// Runs one match and stores its results. Returns how many came back.
    pub async fn run_match(
        &self,
        input: &MatchRequestInput,
        files: &[UploadedFile],
    ) -> Result<usize, SubmissionError> {
        validate_submission(input, files)?;

        let kinds = [CollectionKind::MatchResults];
        self.store.begin(&kinds);
        let store = self.store.clone();
        let token = self.auth.current_token().await;

        let outcome = self
            .client
            .submit_with_notice(input, files, token.as_deref(), move || {
                store.mark_slow(&kinds)
            })
            .await;

        match outcome {
            Ok(results) => {
                let count = results.len();
                self.store
                    .finish_success(vec![Collection::MatchResults(results)]);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "match failed");
                self.store.finish_failure(&kinds);
                Err(e)
            }
        }
    }

    pub async fn activate_tab(&self, tab: Tab) -> Result<(), LoadError> {
        if tab.resources().is_empty() {
            return Ok(());
        }
        self.refresh(tab.resources()).await
    }

    /// Reloads `resources` as one consistent snapshot. On any failure none of
    /// them is replaced.
    pub async fn refresh(&self, resources: &[Resource]) -> Result<(), LoadError> {
        let token = self.session_token().await?;

        let kinds: Vec<CollectionKind> = resources.iter().copied().map(Into::into).collect();
        self.store.begin(&kinds);
        let store = self.store.clone();
        let slow_kinds = kinds.clone();

        let loaded = self
            .client
            .load_all_with_notice(resources, Some(&token), move || {
                store.mark_slow(&slow_kinds)
            })
            .await
            .and_then(|payloads| {
                payloads
                    .into_iter()
                    .map(|(resource, payload)| Collection::decode(resource, payload))
                    .collect::<Result<Vec<_>, _>>()
            });

        match loaded {
            Ok(values) => {
                info!(collections = values.len(), "dashboard collections refreshed");
                self.store.finish_success(values);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "dashboard load failed; keeping previous data");
                self.store.finish_failure(&kinds);
                Err(e)
            }
        }
    }

    /// Deletes a saved resume, then reloads the resume list from the server.
    /// Nothing is removed locally. A rejected delete still triggers the reload
    /// and is reported afterwards; a transport failure skips it.
    pub async fn delete_resume(&self, id: &str) -> Result<(), LoadError> {
        let token = self.session_token().await?;
        match self.client.delete_resume(id, Some(&token)).await {
            Ok(()) => self.refresh(&[Resource::Resumes]).await,
            Err(rejected @ LoadError::Rejected { .. }) => {
                warn!(resume_id = id, error = %rejected, "delete rejected; reloading resumes");
                self.refresh(&[Resource::Resumes]).await?;
                Err(rejected)
            }
            Err(e) => Err(e),
        }
    }

    /// A non-blank session token, or `NotSignedIn`.
    async fn session_token(&self) -> Result<String, LoadError> {
        self.auth
            .current_token()
            .await
            .filter(|token| !token.trim().is_empty())
            .ok_or(LoadError::NotSignedIn)
    }

    pub async fn analyze_job(&self, input: &MatchRequestInput) -> Result<JobAnalysis, LoadError> {
        let criteria = input.validate()?;
        let token = self.auth.current_token().await;
        self.client.analyze_job(&criteria, token.as_deref()).await
    }

    pub async fn ping(&self) -> Result<BackendStatus, LoadError> {
        self.client.ping().await
    }

    /// Ends the session and drops every cached collection.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        self.store.clear();
        info!("signed out; dashboard cache cleared");
        Ok(())
    }
}
