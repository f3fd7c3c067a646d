//! Form state container.
//!
//! Owns the values, the derived validation state, and the two state
//! machines (bootstrap, then submission). Validation is recomputed from the
//! values after every accepted change, so the intent rule is always live.

use std::sync::Arc;

use chrono::Utc;

use crate::config::OnboardingConfig;
use crate::error::DatabaseError;
use crate::navigation::Navigator;
use crate::session::{Session, SessionProvider};
use crate::store::ProfileStore;

use super::bootstrap::{BootstrapGuard, BootstrapPhase};
use super::model::{FormValues, MAX_BIO_CHARS};
use super::submission::{
    PendingWrite, SubmissionController, SubmissionStatus, SubmitOutcome, SubmitStart,
};
use super::tags::{self, TagEditor, TagKey};
use super::validation::{ValidationState, validate};

/// External collaborators the form talks to.
#[derive(Clone)]
pub struct OnboardingDeps {
    pub sessions: Arc<dyn SessionProvider>,
    pub store: Arc<dyn ProfileStore>,
    pub navigator: Arc<dyn Navigator>,
}

/// One mounted instance of the onboarding form.
pub struct OnboardingForm {
    config: Arc<OnboardingConfig>,
    deps: OnboardingDeps,
    bootstrap: BootstrapGuard,
    submission: SubmissionController,
    values: FormValues,
    tag_editor: TagEditor,
    validation: Option<ValidationState>,
}

impl OnboardingForm {
    pub fn new(config: Arc<OnboardingConfig>, deps: OnboardingDeps) -> Self {
        Self {
            config,
            deps,
            bootstrap: BootstrapGuard::new(),
            submission: SubmissionController::new(),
            values: FormValues::default(),
            tag_editor: TagEditor::new(),
            validation: None,
        }
    }

    /// Run the bootstrap guard. Installs defaults when the form unlocks.
    pub async fn mount(&mut self) -> BootstrapPhase {
        let phase = self
            .bootstrap
            .run(
                self.deps.sessions.as_ref(),
                self.deps.store.as_ref(),
                self.deps.navigator.as_ref(),
                &self.config,
            )
            .await;
        if phase == BootstrapPhase::Unlocked && self.validation.is_none() {
            self.values = FormValues::default();
            self.tag_editor = TagEditor::new();
            self.revalidate();
        }
        phase
    }

    // ── Read side ───────────────────────────────────────────────────

    pub fn phase(&self) -> BootstrapPhase {
        self.bootstrap.phase()
    }

    pub fn is_interactive(&self) -> bool {
        self.bootstrap.phase() == BootstrapPhase::Unlocked
    }

    pub fn session(&self) -> Option<&Session> {
        self.bootstrap.session()
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    /// Full derived validation state. `None` until the form unlocks.
    pub fn validation(&self) -> Option<&ValidationState> {
        self.validation.as_ref()
    }

    /// Errors to show inline: the intent rule always, everything else once
    /// the user has tried to submit.
    pub fn visible_errors(&self) -> ValidationState {
        let Some(state) = &self.validation else {
            return ValidationState::default();
        };
        if self.submission.attempted() {
            state.clone()
        } else {
            state.filtered(|f| f.is_intent())
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.submission.status()
    }

    pub fn can_submit(&self) -> bool {
        self.is_interactive() && self.submission.can_submit()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.submission.last_error()
    }

    pub fn picture_candidates(&self) -> &[String] {
        &self.config.picture_candidates
    }

    /// Character counter shown under the bio field.
    pub fn bio_counter(&self) -> String {
        format!("{}/{}", self.values.bio.chars().count(), MAX_BIO_CHARS)
    }

    pub fn tag_draft(&self) -> &str {
        self.tag_editor.draft()
    }

    pub fn tags_disabled(&self) -> bool {
        self.tag_editor.is_disabled(&self.values.tags)
    }

    pub fn tag_placeholder(&self) -> &'static str {
        self.tag_editor.placeholder(&self.values.tags)
    }

    // ── Editing ─────────────────────────────────────────────────────

    pub fn set_category(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        self.edit(|v| replace(&mut v.category, Some(token)))
    }

    pub fn set_stage(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        self.edit(|v| replace(&mut v.stage, Some(token)))
    }

    pub fn set_bio(&mut self, bio: impl Into<String>) -> bool {
        let bio = bio.into();
        self.edit(|v| replace(&mut v.bio, bio))
    }

    pub fn set_wants_type_a(&mut self, on: bool) -> bool {
        self.edit(|v| replace(&mut v.wants_type_a, on))
    }

    pub fn set_wants_type_b(&mut self, on: bool) -> bool {
        self.edit(|v| replace(&mut v.wants_type_b, on))
    }

    pub fn set_consent(&mut self, on: bool) -> bool {
        self.edit(|v| replace(&mut v.consent, on))
    }

    /// Select a picture. Only configured candidates are accepted.
    pub fn select_picture(&mut self, url: &str) -> bool {
        if !self.config.picture_candidates.iter().any(|c| c == url) {
            return false;
        }
        let url = url.to_string();
        self.edit(|v| replace(&mut v.picture_url, url))
    }

    pub fn select_picture_at(&mut self, index: usize) -> bool {
        match self.config.picture_candidates.get(index).cloned() {
            Some(url) => self.select_picture(&url),
            None => false,
        }
    }

    pub fn add_tag(&mut self, candidate: &str) -> bool {
        self.edit(|v| tags::add_tag(&mut v.tags, candidate))
    }

    pub fn remove_tag(&mut self, index: usize) -> bool {
        self.edit(|v| tags::remove_tag(&mut v.tags, index))
    }

    /// Feed a gesture to the tag input.
    pub fn tag_key(&mut self, key: TagKey) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let changed = self.tag_editor.handle_key(key, &mut self.values.tags);
        if changed {
            self.revalidate();
        }
        changed
    }

    /// Type text into the tag draft. A typed space commits the draft.
    pub fn type_tag(&mut self, text: &str) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let changed = self.tag_editor.type_text(text, &mut self.values.tags);
        if changed {
            self.revalidate();
        }
        changed
    }

    /// Commit the tag draft.
    pub fn commit_tag(&mut self) -> bool {
        self.tag_key(TagKey::Enter)
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Start a submission. On success the returned write must be executed
    /// and its result passed to [`complete_submit`](Self::complete_submit).
    pub fn begin_submit(&mut self) -> Result<PendingWrite, SubmitOutcome> {
        if !self.is_interactive() {
            return Err(SubmitOutcome::Ignored);
        }
        match self.submission.begin(
            &self.values,
            self.bootstrap.session(),
            &self.config,
            Utc::now(),
        ) {
            SubmitStart::Ignored => Err(SubmitOutcome::Ignored),
            SubmitStart::Rejected(state) => Err(SubmitOutcome::Rejected(state)),
            SubmitStart::Started(record) => {
                Ok(PendingWrite::new(record, Arc::clone(&self.deps.store)))
            }
        }
    }

    pub fn complete_submit(&mut self, result: Result<(), DatabaseError>) -> SubmitOutcome {
        self.submission
            .finish(result, self.deps.navigator.as_ref(), &self.config)
    }

    /// Validate, write, and redirect.
    pub async fn submit(&mut self) -> SubmitOutcome {
        match self.begin_submit() {
            Ok(write) => {
                let result = write.execute().await;
                self.complete_submit(result)
            }
            Err(outcome) => outcome,
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut FormValues) -> bool) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let changed = apply(&mut self.values);
        if changed {
            self.revalidate();
        }
        changed
    }

    fn revalidate(&mut self) {
        self.validation = Some(validate(&self.values));
    }
}

/// Store `new` in `slot`; report whether it differed.
fn replace<T: PartialEq>(slot: &mut T, new: T) -> bool {
    if *slot == new {
        return false;
    }
    *slot = new;
    true
}
