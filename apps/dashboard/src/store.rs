//! Session-scoped cache of everything the dashboard shows.
//!
//! Each collection starts "not loaded", is replaced wholesale on a successful
//! load and is left untouched on failure, so the last good view survives a
//! retry. All writes for one load happen under a single lock acquisition.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::LoadError;
use crate::models::{
    DashboardStatistics, JobSearchRecord, MatchHistoryRecord, MatchResult, Resource, ResumeRecord,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Cached<T> {
    NotLoaded,
    Loaded(T),
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Cached::NotLoaded
    }
}

impl<T> Cached<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Cached::Loaded(value) => Some(value),
            Cached::NotLoaded => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Cached::Loaded(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    Resumes,
    JobSearches,
    MatchHistory,
    Stats,
    MatchResults,
}

impl From<Resource> for CollectionKind {
    fn from(resource: Resource) -> Self {
        match resource {
            Resource::Resumes => CollectionKind::Resumes,
            Resource::JobSearches => CollectionKind::JobSearches,
            Resource::MatchHistory => CollectionKind::MatchHistory,
            Resource::Stats => CollectionKind::Stats,
        }
    }
}

/// A whole collection value, as handed to `replace`.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Resumes(Vec<ResumeRecord>),
    JobSearches(Vec<JobSearchRecord>),
    MatchHistory(Vec<MatchHistoryRecord>),
    Stats(DashboardStatistics),
    MatchResults(Vec<MatchResult>),
}

impl Collection {
    pub fn kind(&self) -> CollectionKind {
        match self {
            Collection::Resumes(_) => CollectionKind::Resumes,
            Collection::JobSearches(_) => CollectionKind::JobSearches,
            Collection::MatchHistory(_) => CollectionKind::MatchHistory,
            Collection::Stats(_) => CollectionKind::Stats,
            Collection::MatchResults(_) => CollectionKind::MatchResults,
        }
    }

    /// Decodes a loaded payload into the typed collection for `resource`.
    pub fn decode(resource: Resource, payload: Value) -> Result<Self, LoadError> {
        fn typed<T: DeserializeOwned>(resource: Resource, payload: Value) -> Result<T, LoadError> {
            serde_json::from_value(payload).map_err(|e| LoadError::Decode {
                resource,
                message: e.to_string(),
            })
        }

        Ok(match resource {
            Resource::Resumes => Collection::Resumes(typed(resource, payload)?),
            Resource::JobSearches => Collection::JobSearches(typed(resource, payload)?),
            Resource::MatchHistory => Collection::MatchHistory(typed(resource, payload)?),
            Resource::Stats => Collection::Stats(typed(resource, payload)?),
        })
    }
}

/// Per-collection progress. `SlowWarning` is still in flight: it only adds the
/// "this is taking a while" notice on top of `InFlight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    InFlight,
    SlowWarning,
    Succeeded,
    Failed,
}

impl LoadState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, LoadState::InFlight | LoadState::SlowWarning)
    }
}

#[derive(Default)]
struct Collections {
    resumes: Cached<Vec<ResumeRecord>>,
    job_searches: Cached<Vec<JobSearchRecord>>,
    match_history: Cached<Vec<MatchHistoryRecord>>,
    stats: Cached<DashboardStatistics>,
    match_results: Cached<Vec<MatchResult>>,
    states: BTreeMap<CollectionKind, LoadState>,
}

impl Collections {
    fn put(&mut self, value: Collection) {
        match value {
            Collection::Resumes(v) => self.resumes = Cached::Loaded(v),
            Collection::JobSearches(v) => self.job_searches = Cached::Loaded(v),
            Collection::MatchHistory(v) => self.match_history = Cached::Loaded(v),
            Collection::Stats(v) => self.stats = Cached::Loaded(v),
            Collection::MatchResults(v) => self.match_results = Cached::Loaded(v),
        }
    }
}

#[derive(Default)]
pub struct DashboardResourceStore {
    inner: RwLock<Collections>,
}

impl DashboardResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn replace(&self, value: Collection) {
        self.write().put(value);
    }

    /// The last loaded value of `kind`, or `None` if it was never loaded.
    pub fn get(&self, kind: CollectionKind) -> Option<Collection> {
        let inner = self.read();
        match kind {
            CollectionKind::Resumes => inner.resumes.loaded().cloned().map(Collection::Resumes),
            CollectionKind::JobSearches => {
                inner.job_searches.loaded().cloned().map(Collection::JobSearches)
            }
            CollectionKind::MatchHistory => {
                inner.match_history.loaded().cloned().map(Collection::MatchHistory)
            }
            CollectionKind::Stats => inner.stats.loaded().cloned().map(Collection::Stats),
            CollectionKind::MatchResults => {
                inner.match_results.loaded().cloned().map(Collection::MatchResults)
            }
        }
    }

    pub fn resumes(&self) -> Cached<Vec<ResumeRecord>> {
        self.read().resumes.clone()
    }

    pub fn job_searches(&self) -> Cached<Vec<JobSearchRecord>> {
        self.read().job_searches.clone()
    }

    pub fn match_history(&self) -> Cached<Vec<MatchHistoryRecord>> {
        self.read().match_history.clone()
    }

    pub fn stats(&self) -> Cached<DashboardStatistics> {
        self.read().stats.clone()
    }

    pub fn match_results(&self) -> Cached<Vec<MatchResult>> {
        self.read().match_results.clone()
    }

    pub fn load_state(&self, kind: CollectionKind) -> LoadState {
        self.read().states.get(&kind).copied().unwrap_or_default()
    }

    pub fn begin(&self, kinds: &[CollectionKind]) {
        let mut inner = self.write();
        for &kind in kinds {
            inner.states.insert(kind, LoadState::InFlight);
        }
    }

    /// Raises the slow notice for collections still in flight. A late call
    /// after the load finished is ignored.
    pub fn mark_slow(&self, kinds: &[CollectionKind]) {
        let mut inner = self.write();
        for &kind in kinds {
            if let Some(state) = inner.states.get_mut(&kind) {
                if *state == LoadState::InFlight {
                    *state = LoadState::SlowWarning;
                }
            }
        }
    }

    /// Stores the loaded values and marks their collections succeeded, atomically.
    pub fn finish_success(&self, values: Vec<Collection>) {
        let mut inner = self.write();
        for value in values {
            inner.states.insert(value.kind(), LoadState::Succeeded);
            inner.put(value);
        }
    }

    /// Marks the collections failed. Their data stays as it was.
    pub fn finish_failure(&self, kinds: &[CollectionKind]) {
        let mut inner = self.write();
        for &kind in kinds {
            inner.states.insert(kind, LoadState::Failed);
        }
    }

    /// Forgets everything, as at session start.
    pub fn clear(&self) {
        *self.write() = Collections::default();
    }
}
