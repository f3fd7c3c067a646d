//! `ProfileStore` trait — the async persistence seam for onboarding.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::onboarding::model::{ProfileCompletion, ProfileRecord};

/// Backend-agnostic profile persistence.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the completion flag for a user. `None` when no profile exists.
    async fn get_completion(
        &self,
        user_id: &str,
    ) -> Result<Option<ProfileCompletion>, DatabaseError>;

    /// Insert or overwrite the profile keyed by `record.id`. Last write wins.
    async fn upsert_profile(&self, record: &ProfileRecord) -> Result<(), DatabaseError>;

    /// Read the full profile for a user.
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, DatabaseError>;
}
