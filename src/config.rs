//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::onboarding::validation::is_url;

/// Preset profile pictures offered by the picture picker.
pub const DEFAULT_PICTURES: &[&str] = &[
    "https://github.com/github.png?size=40",
    "https://github.com/octocat.png?size=40",
    "https://github.com/hubot.png?size=40",
    "https://github.com/ghost.png?size=40",
    "https://github.com/gitster.png?size=40",
    "https://github.com/probot.png?size=40",
    "https://github.com/github-hero.png?size=40",
    "https://github.com/defunkt.png?size=40",
    "https://github.com/mojombo.png?size=40",
    "https://github.com/wycats.png?size=40",
    "https://github.com/rtomayko.png?size=40",
    "https://github.com/vanpelt.png?size=40",
    "https://github.com/ezmobius.png?size=40",
    "https://github.com/ivey.png?size=40",
    "https://github.com/evanphx.png?size=40",
    "https://github.com/wayneeseguin.png?size=40",
    "https://github.com/brynary.png?size=40",
    "https://github.com/kevinclark.png?size=40",
];

/// Onboarding configuration.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Profile database location.
    pub db_path: PathBuf,
    /// Email suffix that marks a profile as verified.
    pub verified_suffix: String,
    /// Where users without a session are sent.
    pub login_path: String,
    /// Where onboarded users land.
    pub dashboard_path: String,
    /// Where the onboarding form lives.
    pub form_path: String,
    /// Pictures the user may choose from.
    pub picture_candidates: Vec<String>,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/onboarding.db"),
            verified_suffix: "@thapar.edu".to_string(),
            login_path: "/auth/login".to_string(),
            dashboard_path: "/protected/dashboard".to_string(),
            form_path: "/onboarding".to_string(),
            picture_candidates: DEFAULT_PICTURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl OnboardingConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let picture_candidates = match var("ONBOARDING_PICTURES") {
            Some(list) => parse_pictures(&list)?,
            None => defaults.picture_candidates,
        };

        Ok(Self {
            db_path: var("ONBOARDING_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            verified_suffix: var("ONBOARDING_VERIFIED_SUFFIX").unwrap_or(defaults.verified_suffix),
            login_path: var("ONBOARDING_LOGIN_PATH").unwrap_or(defaults.login_path),
            dashboard_path: var("ONBOARDING_DASHBOARD_PATH").unwrap_or(defaults.dashboard_path),
            form_path: var("ONBOARDING_FORM_PATH").unwrap_or(defaults.form_path),
            picture_candidates,
        })
    }
}

/// Split a comma-separated picture list; every entry must be a URL.
fn parse_pictures(list: &str) -> Result<Vec<String>, ConfigError> {
    let pictures: Vec<String> = list
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if pictures.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "ONBOARDING_PICTURES".to_string(),
            message: "at least one picture URL is required".to_string(),
        });
    }
    if let Some(bad) = pictures.iter().find(|p| !is_url(p)) {
        return Err(ConfigError::InvalidValue {
            key: "ONBOARDING_PICTURES".to_string(),
            message: format!("not a URL: {bad}"),
        });
    }
    Ok(pictures)
}
