use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::errors::AuthError;

/// The session collaborator. Consulted immediately before every request;
/// nothing in this crate caches the token it returns.
#[async_trait]
pub trait AuthTokenProvider: Send + Sync {
    /// The current bearer token, or `None` when nobody is signed in.
    async fn current_token(&self) -> Option<String>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Holds a token handed over at startup (e.g. from `RESUME_API_TOKEN`).
#[derive(Debug, Default)]
pub struct StaticTokenProvider {
    token: RwLock<Option<String>>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthTokenProvider for StaticTokenProvider {
    async fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_token_is_no_session() {
        assert_eq!(StaticTokenProvider::new(Some("  ".into())).current_token().await, None);
        assert_eq!(StaticTokenProvider::anonymous().current_token().await, None);
    }

    #[tokio::test]
    async fn test_sign_out_forgets_token() {
        let provider = StaticTokenProvider::new(Some("tok".into()));
        assert_eq!(provider.current_token().await.as_deref(), Some("tok"));
        provider.sign_out().await.unwrap();
        assert_eq!(provider.current_token().await, None);
    }
}
