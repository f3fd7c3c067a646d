//! Session bootstrap guard — decides whether the form may open.
//!
//! Runs once per mount: session first, then the completion flag. Session
//! failures fail closed (treated as signed out); completion failures fail
//! open (treated as not yet onboarded).

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::OnboardingConfig;
use crate::navigation::Navigator;
use crate::session::{Session, SessionProvider};
use crate::store::ProfileStore;

/// Where the bootstrap ended up.
///
/// Loading → Unlocked | RedirectedToLogin | RedirectedToDashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPhase {
    #[default]
    Loading,
    Unlocked,
    RedirectedToLogin,
    RedirectedToDashboard,
}

impl BootstrapPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: BootstrapPhase) -> bool {
        use BootstrapPhase::*;
        matches!(
            (self, target),
            (Loading, Unlocked) | (Loading, RedirectedToLogin) | (Loading, RedirectedToDashboard)
        )
    }

    /// Whether the guard has finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Whether the user was sent elsewhere.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectedToLogin | Self::RedirectedToDashboard)
    }
}

impl std::fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Unlocked => "unlocked",
            Self::RedirectedToLogin => "redirected_to_login",
            Self::RedirectedToDashboard => "redirected_to_dashboard",
        };
        write!(f, "{s}")
    }
}

/// One-shot guard that resolves the session before the form is shown.
#[derive(Debug, Default)]
pub struct BootstrapGuard {
    phase: BootstrapPhase,
    session: Option<Session>,
}

impl BootstrapGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> BootstrapPhase {
        self.phase
    }

    /// The retained identity. Only set once unlocked.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Resolve the session and completion state.
    ///
    /// Only the first call queries the collaborators; later calls return
    /// the phase already reached.
    pub async fn run(
        &mut self,
        sessions: &dyn SessionProvider,
        store: &dyn ProfileStore,
        navigator: &dyn Navigator,
        config: &OnboardingConfig,
    ) -> BootstrapPhase {
        if self.phase.is_terminal() {
            return self.phase;
        }

        let session = match sessions.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("No session, redirecting to login");
                return self.redirect(BootstrapPhase::RedirectedToLogin, navigator, &config.login_path);
            }
            Err(e) => {
                warn!("Session lookup failed, treating as signed out: {}", e);
                return self.redirect(BootstrapPhase::RedirectedToLogin, navigator, &config.login_path);
            }
        };

        let onboarded = match store.get_completion(&session.user_id).await {
            Ok(completion) => completion.is_some_and(|c| c.has_onboarded),
            Err(e) => {
                warn!(
                    user_id = %session.user_id,
                    "Completion lookup failed, treating as not onboarded: {}",
                    e
                );
                false
            }
        };

        if onboarded {
            info!(user_id = %session.user_id, "Already onboarded, redirecting to dashboard");
            return self.redirect(
                BootstrapPhase::RedirectedToDashboard,
                navigator,
                &config.dashboard_path,
            );
        }

        info!(user_id = %session.user_id, "Onboarding form unlocked");
        self.session = Some(session);
        self.transition(BootstrapPhase::Unlocked);
        self.phase
    }

    fn redirect(
        &mut self,
        target: BootstrapPhase,
        navigator: &dyn Navigator,
        path: &str,
    ) -> BootstrapPhase {
        if self.transition(target) {
            navigator.navigate(path);
        }
        self.phase
    }

    fn transition(&mut self, target: BootstrapPhase) -> bool {
        if !self.phase.can_transition_to(target) {
            warn!("Cannot transition bootstrap from {} to {}", self.phase, target);
            return false;
        }
        self.phase = target;
        true
    }
}
