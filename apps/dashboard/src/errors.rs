use std::time::Duration;

use thiserror::Error;

use crate::models::Resource;

const WAKING_UP_HINT: &str = "The backend might be waking up from sleep (a cold start takes 30-60 seconds). Please try again in 30 seconds.";
const CONNECTIVITY_HINT: &str = "Please check your internet connection, or try again in a moment in case the backend is still starting up.";

/// Outcome of a call run under the hard deadline.
#[derive(Debug, Error)]
pub enum GuardError<E> {
    #[error("request timed out")]
    TimedOut,

    #[error("request failed: {0}")]
    Failed(E),
}

/// How a guarded network call went wrong, independent of which operation issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    TimedOut,
    Unreachable(String),
    Other(String),
}

impl From<GuardError<reqwest::Error>> for TransportFailure {
    fn from(err: GuardError<reqwest::Error>) -> Self {
        match err {
            GuardError::TimedOut => TransportFailure::TimedOut,
            GuardError::Failed(e) if e.is_connect() => TransportFailure::Unreachable(e.to_string()),
            GuardError::Failed(e) if e.is_timeout() => TransportFailure::TimedOut,
            GuardError::Failed(e) => TransportFailure::Other(e.to_string()),
        }
    }
}

/// Errors surfaced by a match submission.
///
/// The first three variants are validation errors: they are raised before any
/// network activity and are always correctable by the user.
#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Please upload at least one resume")]
    NoFiles,

    #[error("Please enter a job description")]
    MissingDescription,

    #[error("Please enter keywords")]
    MissingKeywords,

    #[error("Backend did not respond before the request deadline")]
    BackendUnresponsive,

    #[error("Cannot connect to backend: {0}")]
    Unreachable(String),

    #[error("Failed to match resumes: {0}")]
    Unknown(String),
}

impl SubmissionError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SubmissionError::NoFiles
                | SubmissionError::MissingDescription
                | SubmissionError::MissingKeywords
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::BackendUnresponsive => format!("Request timed out. {WAKING_UP_HINT}"),
            SubmissionError::Unreachable(_) => format!("Cannot connect to backend. {CONNECTIVITY_HINT}"),
            other => other.to_string(),
        }
    }
}

impl From<TransportFailure> for SubmissionError {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::TimedOut => SubmissionError::BackendUnresponsive,
            TransportFailure::Unreachable(msg) => SubmissionError::Unreachable(msg),
            TransportFailure::Other(msg) => SubmissionError::Unknown(msg),
        }
    }
}

/// Errors surfaced by collection loads and the other authenticated calls.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("Sign in to load your dashboard")]
    NotSignedIn,

    #[error(transparent)]
    Invalid(#[from] SubmissionError),

    #[error("Backend did not respond before the request deadline")]
    TimedOut,

    #[error("Cannot connect to backend: {0}")]
    Unreachable(String),

    #[error("Server returned {status} for {resource}")]
    PartialFailure { resource: Resource, status: u16 },

    #[error("Server returned {status} for {endpoint}")]
    Rejected { endpoint: String, status: u16 },

    #[error("Could not decode {resource}: {message}")]
    Decode { resource: Resource, message: String },

    #[error("Request failed: {0}")]
    Unknown(String),
}

impl LoadError {
    pub fn user_message(&self) -> String {
        match self {
            LoadError::TimedOut => format!("Request timed out. {WAKING_UP_HINT}"),
            LoadError::Unreachable(_) => format!("Cannot connect to backend. {CONNECTIVITY_HINT}"),
            LoadError::NotSignedIn | LoadError::Invalid(_) => self.to_string(),
            other => format!("{other}. If you just deployed, the backend may be starting up."),
        }
    }
}

impl From<TransportFailure> for LoadError {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::TimedOut => LoadError::TimedOut,
            TransportFailure::Unreachable(msg) => LoadError::Unreachable(msg),
            TransportFailure::Other(msg) => LoadError::Unknown(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to sign out: {0}")]
    SignOut(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("slow notice ({slow:?}) must fire strictly before the deadline ({ceiling:?})")]
    SlowNoticeAfterDeadline { slow: Duration, ceiling: Duration },

    #[error("API base URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),
}
