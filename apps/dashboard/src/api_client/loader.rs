use std::collections::BTreeMap;

use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn, Instrument};

use crate::api_client::MatchClient;
use crate::errors::{GuardError, LoadError, TransportFailure};
use crate::models::Resource;

/// Decoded JSON bodies keyed by the resource that produced them.
pub type Payloads = BTreeMap<Resource, Value>;

enum FetchFailure {
    Transport(reqwest::Error),
    Aborted(String),
}

impl MatchClient {
    pub async fn load_all(
        &self,
        resources: &[Resource],
        credential: Option<&str>,
    ) -> Result<Payloads, LoadError> {
        self.load_all_with_notice(resources, credential, || {}).await
    }

    /// Fetches every resource concurrently under one shared deadline.
    ///
    /// All-or-nothing: if any fetch returns a non-success status the whole load
    /// fails with `PartialFailure` naming the first such resource in request
    /// order. A transport failure in one fetch is reported immediately; its
    /// siblings keep running and their answers are ignored. Only the deadline
    /// aborts them.
    pub async fn load_all_with_notice<N>(
        &self,
        resources: &[Resource],
        credential: Option<&str>,
        on_slow: N,
    ) -> Result<Payloads, LoadError>
    where
        N: FnOnce() + Send + 'static,
    {
        let mut handles = Vec::with_capacity(resources.len());
        let mut abort_handles = Vec::with_capacity(resources.len());
        for &resource in resources {
            let (request, span) = self.request(Method::GET, resource.path(), credential);
            let handle = tokio::spawn(
                async move {
                    let response = request.send().await?;
                    let status = response.status();
                    let body = response.bytes().await?;
                    debug!(status = status.as_u16(), bytes = body.len(), "resource fetched");
                    Ok::<(StatusCode, Bytes), reqwest::Error>((status, body))
                }
                .instrument(span),
            );
            abort_handles.push(handle.abort_handle());
            handles.push((resource, handle));
        }

        let fan_in = async move {
            let mut settled = Vec::with_capacity(handles.len());
            for (resource, handle) in handles {
                match handle.await {
                    Ok(Ok((status, body))) => settled.push((resource, status, body)),
                    Ok(Err(e)) => return Err(FetchFailure::Transport(e)),
                    Err(join_error) => {
                        return Err(FetchFailure::Aborted(format!("{resource}: {join_error}")))
                    }
                }
            }
            Ok(settled)
        };

        let settled = match self.policy.run_with_notice(fan_in, on_slow).await {
            Ok(settled) => settled,
            Err(GuardError::TimedOut) => {
                for handle in &abort_handles {
                    handle.abort();
                }
                return Err(LoadError::TimedOut);
            }
            Err(GuardError::Failed(FetchFailure::Transport(e))) => {
                return Err(TransportFailure::from(GuardError::Failed(e)).into());
            }
            Err(GuardError::Failed(FetchFailure::Aborted(msg))) => {
                return Err(LoadError::Unknown(msg));
            }
        };

        if let Some((resource, status, _)) = settled.iter().find(|(_, status, _)| !status.is_success()) {
            warn!(%resource, status = status.as_u16(), "resource load rejected");
            return Err(LoadError::PartialFailure {
                resource: *resource,
                status: status.as_u16(),
            });
        }

        settled
            .into_iter()
            .map(|(resource, _, body)| {
                serde_json::from_slice::<Value>(&body)
                    .map(|payload| (resource, payload))
                    .map_err(|e| LoadError::Decode {
                        resource,
                        message: e.to_string(),
                    })
            })
            .collect()
    }
}
