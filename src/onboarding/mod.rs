//! Onboarding system — the guided profile-setup form.
//!
//! A new user lands on the form after signing in. The bootstrap guard sends
//! them away if they have no session or already finished; otherwise they
//! fill in the form, which validates live and writes one profile record on
//! submit before redirecting to the dashboard.

pub mod bootstrap;
pub mod form;
pub mod gate;
pub mod model;
pub mod submission;
pub mod tags;
pub mod validation;

pub use bootstrap::{BootstrapGuard, BootstrapPhase};
pub use form::{OnboardingDeps, OnboardingForm};
pub use gate::{AccessDecision, AccessGate};
pub use model::{Category, FormField, FormValues, ProfileCompletion, ProfileRecord, Stage};
pub use submission::{PendingWrite, SubmissionController, SubmissionStatus, SubmitOutcome};
pub use tags::{TagEditor, TagKey};
pub use validation::{ValidatedForm, ValidationState, validate};
