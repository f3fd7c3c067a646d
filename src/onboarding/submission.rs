//! Submission controller — final validation, the profile write, and the
//! post-write redirect.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::OnboardingConfig;
use crate::error::DatabaseError;
use crate::navigation::Navigator;
use crate::session::Session;
use crate::store::ProfileStore;

use super::model::{FormValues, ProfileRecord, is_institutional_email};
use super::validation::{ValidatedForm, ValidationState};

/// Busy/idle signal for the submit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
}

/// Result of asking to start a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// No identity yet, a write already in flight, or already finished.
    Ignored,
    /// Validation failed; nothing was written.
    Rejected(ValidationState),
    /// Now submitting; this record must be written.
    Started(ProfileRecord),
}

/// Final outcome of a submit gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Ignored,
    Rejected(ValidationState),
    /// The write succeeded and the user was sent to the dashboard.
    Navigated,
    /// The write failed; values are untouched and the user may retry.
    Failed(String),
}

/// The profile write, detached from the form so the caller can await it
/// without holding the form.
pub struct PendingWrite {
    record: ProfileRecord,
    store: Arc<dyn ProfileStore>,
}

impl PendingWrite {
    pub fn new(record: ProfileRecord, store: Arc<dyn ProfileStore>) -> Self {
        Self { record, store }
    }

    /// Perform the upsert.
    pub async fn execute(self) -> Result<(), DatabaseError> {
        self.store.upsert_profile(&self.record).await
    }
}

/// Build the persisted record from validated values.
pub fn build_record(
    form: &ValidatedForm,
    session: &Session,
    verified_suffix: &str,
    now: DateTime<Utc>,
) -> ProfileRecord {
    ProfileRecord {
        id: session.user_id.clone(),
        category: form.category,
        stage: form.stage.number(),
        tags: form.tags.clone(),
        bio: form.bio.clone(),
        wants_type_a: form.wants_type_a,
        wants_type_b: form.wants_type_b,
        picture_url: form.picture_url.clone(),
        has_onboarded: true,
        verified: is_institutional_email(&session.email, verified_suffix),
        updated_at: now,
    }
}

/// Idle → Submitting → Idle, with at most one write outstanding.
#[derive(Debug, Default)]
pub struct SubmissionController {
    status: SubmissionStatus,
    completed: bool,
    attempted: bool,
    last_error: Option<String>,
}

impl SubmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Whether the submit trigger is enabled.
    pub fn can_submit(&self) -> bool {
        self.status == SubmissionStatus::Idle && !self.completed
    }

    /// Whether a submit gesture has passed the identity check at least once.
    pub fn attempted(&self) -> bool {
        self.attempted
    }

    /// Whether a write has succeeded.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Message from the most recent failed write.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Validate and, if clean, enter `Submitting` and hand back the record.
    pub fn begin(
        &mut self,
        values: &FormValues,
        session: Option<&Session>,
        config: &OnboardingConfig,
        now: DateTime<Utc>,
    ) -> SubmitStart {
        let Some(session) = session.filter(|s| !s.email.trim().is_empty()) else {
            debug!("Submit ignored: identity not resolved");
            return SubmitStart::Ignored;
        };
        if !self.can_submit() {
            debug!(status = ?self.status, completed = self.completed, "Submit ignored");
            return SubmitStart::Ignored;
        }
        self.attempted = true;

        let form = match ValidatedForm::try_from(values) {
            Ok(form) => form,
            Err(state) => {
                debug!(errors = state.len(), "Submit rejected by validation");
                return SubmitStart::Rejected(state);
            }
        };

        self.last_error = None;
        self.status = SubmissionStatus::Submitting;
        SubmitStart::Started(build_record(&form, session, &config.verified_suffix, now))
    }

    /// Apply the write result. Results arriving while not submitting are dropped.
    pub fn finish(
        &mut self,
        result: Result<(), DatabaseError>,
        navigator: &dyn Navigator,
        config: &OnboardingConfig,
    ) -> SubmitOutcome {
        if self.status != SubmissionStatus::Submitting {
            debug!("Dropping write result received outside of a submission");
            return SubmitOutcome::Ignored;
        }
        self.status = SubmissionStatus::Idle;

        match result {
            Ok(()) => {
                self.completed = true;
                info!("Profile saved, onboarding complete");
                navigator.navigate(&config.dashboard_path);
                SubmitOutcome::Navigated
            }
            Err(e) => {
                error!("Profile write failed: {}", e);
                let message = e.to_string();
                self.last_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::HistoryNavigator;
    use crate::onboarding::model::{Category, FormField};

    fn valid() -> FormValues {
        FormValues {
            category: Some("ME".into()),
            stage: Some("4".into()),
            tags: vec!["ai".into(), "music".into()],
            bio: String::new(),
            wants_type_a: false,
            wants_type_b: true,
            picture_url: "https://github.com/ghost.png?size=40".into(),
            consent: true,
        }
    }

    fn session(email: &str) -> Session {
        Session::new("user-1", email)
    }

    #[test]
    fn ignored_without_identity() {
        let mut ctl = SubmissionController::new();
        let start = ctl.begin(&valid(), None, &OnboardingConfig::default(), Utc::now());
        assert_eq!(start, SubmitStart::Ignored);
        assert!(!ctl.attempted());
        assert_eq!(ctl.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn ignored_when_email_is_blank() {
        let mut ctl = SubmissionController::new();
        for email in ["", "   "] {
            let s = session(email);
            let start = ctl.begin(&valid(), Some(&s), &OnboardingConfig::default(), Utc::now());
            assert_eq!(start, SubmitStart::Ignored);
        }
        assert!(!ctl.attempted());
        assert_eq!(ctl.status(), SubmissionStatus::Idle);
    }

    #[test]
    fn rejected_values_stay_idle() {
        let mut ctl = SubmissionController::new();
        let mut values = valid();
        values.wants_type_b = false;
        let s = session("a@thapar.edu");
        match ctl.begin(&values, Some(&s), &OnboardingConfig::default(), Utc::now()) {
            SubmitStart::Rejected(state) => {
                assert!(state.has(FormField::WantsTypeA));
                assert!(state.has(FormField::WantsTypeB));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(ctl.status(), SubmissionStatus::Idle);
        assert!(ctl.attempted());
        assert!(ctl.can_submit());
    }

    #[test]
    fn started_record_coerces_stage_and_stamps_fields() {
        let mut ctl = SubmissionController::new();
        let now = Utc::now();
        let s = session("student@thapar.edu");
        let SubmitStart::Started(record) =
            ctl.begin(&valid(), Some(&s), &OnboardingConfig::default(), now)
        else {
            panic!("expected start");
        };
        assert_eq!(ctl.status(), SubmissionStatus::Submitting);
        assert!(!ctl.can_submit());
        assert_eq!(record.id, "user-1");
        assert_eq!(record.category, Category::Me);
        assert_eq!(record.stage, 4);
        assert!(record.has_onboarded);
        assert!(record.verified);
        assert_eq!(record.updated_at, now);
    }

    #[test]
    fn non_institutional_email_is_not_verified() {
        let form = ValidatedForm::try_from(&valid()).unwrap();
        let record = build_record(&form, &session("x@gmail.com"), "@thapar.edu", Utc::now());
        assert!(!record.verified);
    }

    #[test]
    fn second_begin_while_submitting_is_ignored() {
        let mut ctl = SubmissionController::new();
        let s = session("a@b.c");
        let config = OnboardingConfig::default();
        assert!(matches!(
            ctl.begin(&valid(), Some(&s), &config, Utc::now()),
            SubmitStart::Started(_)
        ));
        assert_eq!(
            ctl.begin(&valid(), Some(&s), &config, Utc::now()),
            SubmitStart::Ignored
        );
    }

    #[test]
    fn success_navigates_once_and_disables_trigger() {
        let mut ctl = SubmissionController::new();
        let nav = HistoryNavigator::new();
        let config = OnboardingConfig::default();
        let s = session("a@b.c");
        ctl.begin(&valid(), Some(&s), &config, Utc::now());

        assert_eq!(ctl.finish(Ok(()), &nav, &config), SubmitOutcome::Navigated);
        assert_eq!(nav.visited(), vec![config.dashboard_path.clone()]);
        assert!(ctl.completed());
        assert!(!ctl.can_submit());

        // Nothing after success changes state or navigates again.
        assert_eq!(ctl.finish(Ok(()), &nav, &config), SubmitOutcome::Ignored);
        assert_eq!(
            ctl.begin(&valid(), Some(&s), &config, Utc::now()),
            SubmitStart::Ignored
        );
        assert_eq!(ctl.status(), SubmissionStatus::Idle);
        assert_eq!(nav.visited().len(), 1);
    }

    #[test]
    fn failure_returns_to_idle_and_allows_retry() {
        let mut ctl = SubmissionController::new();
        let nav = HistoryNavigator::new();
        let config = OnboardingConfig::default();
        let s = session("a@b.c");
        ctl.begin(&valid(), Some(&s), &config, Utc::now());

        let outcome = ctl.finish(
            Err(DatabaseError::Query("connection reset".into())),
            &nav,
            &config,
        );
        assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.contains("connection reset")));
        assert_eq!(ctl.status(), SubmissionStatus::Idle);
        assert!(ctl.can_submit());
        assert!(ctl.last_error().is_some());
        assert!(nav.visited().is_empty());

        // Retrying clears the previous failure.
        assert!(matches!(
            ctl.begin(&valid(), Some(&s), &config, Utc::now()),
            SubmitStart::Started(_)
        ));
        assert!(ctl.last_error().is_none());
    }
}
