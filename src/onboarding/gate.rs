//! Access gate for pages that require a finished profile.
//!
//! Unlike the form's bootstrap, a failed completion lookup here fails
//! closed: the user is sent back to the onboarding form.

use tracing::{info, warn};

use crate::config::OnboardingConfig;
use crate::navigation::Navigator;
use crate::session::{Session, SessionProvider};
use crate::store::ProfileStore;

/// What the gate decided for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted(Session),
    RedirectToLogin,
    RedirectToOnboarding,
}

/// Guards the protected area of the application.
pub struct AccessGate<'a> {
    sessions: &'a dyn SessionProvider,
    store: &'a dyn ProfileStore,
    navigator: &'a dyn Navigator,
    config: &'a OnboardingConfig,
}

impl<'a> AccessGate<'a> {
    pub fn new(
        sessions: &'a dyn SessionProvider,
        store: &'a dyn ProfileStore,
        navigator: &'a dyn Navigator,
        config: &'a OnboardingConfig,
    ) -> Self {
        Self {
            sessions,
            store,
            navigator,
            config,
        }
    }

    pub async fn check(&self) -> AccessDecision {
        let session = match self.sessions.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.navigator.navigate(&self.config.login_path);
                return AccessDecision::RedirectToLogin;
            }
            Err(e) => {
                warn!("Session lookup failed at gate: {}", e);
                self.navigator.navigate(&self.config.login_path);
                return AccessDecision::RedirectToLogin;
            }
        };

        let onboarded = match self.store.get_completion(&session.user_id).await {
            Ok(completion) => completion.is_some_and(|c| c.has_onboarded),
            Err(e) => {
                warn!(user_id = %session.user_id, "Completion lookup failed at gate: {}", e);
                false
            }
        };

        if !onboarded {
            info!(user_id = %session.user_id, "Profile incomplete, redirecting to onboarding");
            self.navigator.navigate(&self.config.form_path);
            return AccessDecision::RedirectToOnboarding;
        }

        AccessDecision::Granted(session)
    }
}
