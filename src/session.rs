//! Identity/session provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// The signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

/// Source of the current session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or `None` when nobody is signed in.
    async fn get_session(&self) -> Result<Option<Session>, SessionError>;
}

/// A provider that always reports the same session.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    session: Option<Session>,
}

impl StaticSession {
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }

    /// Build from `ONBOARDING_USER_ID` / `ONBOARDING_EMAIL`.
    /// A missing or blank user id or email means no session.
    pub fn from_env() -> Self {
        Self {
            session: Self::from_values(
                std::env::var("ONBOARDING_USER_ID").ok(),
                std::env::var("ONBOARDING_EMAIL").ok(),
            ),
        }
    }

    fn from_values(user_id: Option<String>, email: Option<String>) -> Option<Session> {
        let non_blank = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        let user_id = non_blank(user_id)?;
        match non_blank(email) {
            Some(email) => Some(Session::new(user_id, email)),
            None => {
                tracing::warn!(user_id = %user_id, "ONBOARDING_EMAIL is not set, starting signed out");
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn get_session(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.clone())
    }
}
