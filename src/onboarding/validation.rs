//! Field validation engine.
//!
//! `validate` is pure: every rule is evaluated on every call and the result
//! depends only on the given values. The intent rule is the one cross-field
//! check; its message lands on both intent fields.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::model::{Category, FormField, FormValues, MAX_BIO_CHARS, MAX_TAGS, Stage};

pub const MSG_CATEGORY_REQUIRED: &str = "Category is required";
pub const MSG_CATEGORY_INVALID: &str = "Select a valid category";
pub const MSG_STAGE_REQUIRED: &str = "Stage is required";
pub const MSG_STAGE_INVALID: &str = "Select a valid stage";
pub const MSG_TAGS_MIN: &str = "At least 1 tag";
pub const MSG_TAGS_MAX: &str = "Max 10 tags";
pub const MSG_TAGS_EMPTY: &str = "No empty tags";
pub const MSG_BIO_MAX: &str = "Max 100 characters";
pub const MSG_PICTURE: &str = "Select a picture";
pub const MSG_CONSENT: &str = "You must agree to the community guidelines";
pub const MSG_INTENT: &str = "Select at least one goal";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+(?:[/?#]\S*)?$").unwrap()
});

/// Whether `s` is syntactically an absolute URL (`scheme://authority[...]`).
pub fn is_url(s: &str) -> bool {
    URL_PATTERN.is_match(s)
}

/// Field → error message. Derived from `FormValues`, never edited directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    errors: BTreeMap<FormField, String>,
}

impl ValidationState {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn has(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn filtered(&self, keep: impl Fn(FormField) -> bool) -> Self {
        Self {
            errors: self
                .errors
                .iter()
                .filter(|(f, _)| keep(**f))
                .map(|(f, m)| (*f, m.clone()))
                .collect(),
        }
    }

    fn set(&mut self, field: FormField, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// Evaluate every field rule plus the intent cross-field rule.
pub fn validate(values: &FormValues) -> ValidationState {
    let mut state = ValidationState::default();

    match values.category.as_deref() {
        None => state.set(FormField::Category, MSG_CATEGORY_REQUIRED),
        Some(token) if token.parse::<Category>().is_err() => {
            state.set(FormField::Category, MSG_CATEGORY_INVALID)
        }
        Some(_) => {}
    }

    match values.stage.as_deref() {
        None => state.set(FormField::Stage, MSG_STAGE_REQUIRED),
        Some(token) if token.parse::<Stage>().is_err() => {
            state.set(FormField::Stage, MSG_STAGE_INVALID)
        }
        Some(_) => {}
    }

    if values.tags.is_empty() {
        state.set(FormField::Tags, MSG_TAGS_MIN);
    } else if values.tags.len() > MAX_TAGS {
        state.set(FormField::Tags, MSG_TAGS_MAX);
    } else if values.tags.iter().any(|t| t.trim().is_empty()) {
        state.set(FormField::Tags, MSG_TAGS_EMPTY);
    }

    if values.bio.chars().count() > MAX_BIO_CHARS {
        state.set(FormField::Bio, MSG_BIO_MAX);
    }

    if values.picture_url.is_empty() || !is_url(&values.picture_url) {
        state.set(FormField::PictureUrl, MSG_PICTURE);
    }

    if !values.consent {
        state.set(FormField::Consent, MSG_CONSENT);
    }

    if !(values.wants_type_a || values.wants_type_b) {
        state.set(FormField::WantsTypeA, MSG_INTENT);
        state.set(FormField::WantsTypeB, MSG_INTENT);
    }

    state
}

/// Form values that passed validation, with tokens parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub category: Category,
    pub stage: Stage,
    pub tags: Vec<String>,
    pub bio: String,
    pub wants_type_a: bool,
    pub wants_type_b: bool,
    pub picture_url: String,
}

impl TryFrom<&FormValues> for ValidatedForm {
    type Error = ValidationState;

    fn try_from(values: &FormValues) -> Result<Self, Self::Error> {
        let state = validate(values);
        if !state.is_clean() {
            return Err(state);
        }
        // Both tokens were accepted by `validate` above.
        let (Some(Ok(category)), Some(Ok(stage))) = (
            values.category.as_deref().map(str::parse::<Category>),
            values.stage.as_deref().map(str::parse::<Stage>),
        ) else {
            return Err(state);
        };
        Ok(Self {
            category,
            stage,
            tags: values.tags.clone(),
            bio: values.bio.clone(),
            wants_type_a: values.wants_type_a,
            wants_type_b: values.wants_type_b,
            picture_url: values.picture_url.clone(),
        })
    }
}
