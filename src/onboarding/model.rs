//! Form values, field identifiers, and the persisted profile record.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of committed tags.
pub const MAX_TAGS: usize = 10;

/// Maximum bio length, in characters.
pub const MAX_BIO_CHARS: usize = 100;

/// Academic branch the user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "COE")]
    Coe,
    #[serde(rename = "CSE")]
    Cse,
    #[serde(rename = "ECE")]
    Ece,
    #[serde(rename = "ME")]
    Me,
    #[serde(rename = "CIVIL")]
    Civil,
    #[serde(rename = "EE")]
    Ee,
    #[serde(rename = "BioTech")]
    BioTech,
    #[serde(rename = "Mechtronics")]
    Mechtronics,
}

impl Category {
    /// Every category, in the order the select lists them.
    pub const ALL: [Category; 8] = [
        Self::Coe,
        Self::Cse,
        Self::Ece,
        Self::Me,
        Self::Civil,
        Self::Ee,
        Self::BioTech,
        Self::Mechtronics,
    ];

    /// The select token for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coe => "COE",
            Self::Cse => "CSE",
            Self::Ece => "ECE",
            Self::Me => "ME",
            Self::Civil => "CIVIL",
            Self::Ee => "EE",
            Self::BioTech => "BioTech",
            Self::Mechtronics => "Mechtronics",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Year of study. Selected as a string token, stored as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Stage(u8);

impl Stage {
    pub const TOKENS: [&'static str; 4] = ["1", "2", "3", "4"];

    pub fn number(&self) -> u8 {
        self.0
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self(1)),
            "2" => Ok(Self(2)),
            "3" => Ok(Self(3)),
            "4" => Ok(Self(4)),
            _ => Err(format!("Unknown stage: {s}")),
        }
    }
}

/// Identifies one field of the form. Error messages are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Category,
    Stage,
    Tags,
    Bio,
    WantsTypeA,
    WantsTypeB,
    PictureUrl,
    Consent,
}

impl FormField {
    /// The two intent booleans that share the cross-field rule.
    pub fn is_intent(&self) -> bool {
        matches!(self, Self::WantsTypeA | Self::WantsTypeB)
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Category => "category",
            Self::Stage => "stage",
            Self::Tags => "tags",
            Self::Bio => "bio",
            Self::WantsTypeA => "wants_type_a",
            Self::WantsTypeB => "wants_type_b",
            Self::PictureUrl => "picture_url",
            Self::Consent => "consent",
        };
        write!(f, "{s}")
    }
}

/// The values the user is editing.
///
/// `category` and `stage` hold the raw select tokens; they are parsed by
/// validation and only coerced to their typed form when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    pub category: Option<String>,
    pub stage: Option<String>,
    pub tags: Vec<String>,
    pub bio: String,
    pub wants_type_a: bool,
    pub wants_type_b: bool,
    pub picture_url: String,
    pub consent: bool,
}

/// Completion snapshot read from the profile store at bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCompletion {
    pub has_onboarded: bool,
}

/// The record written to the profile store on submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub category: Category,
    pub stage: u8,
    pub tags: Vec<String>,
    pub bio: String,
    pub wants_type_a: bool,
    pub wants_type_b: bool,
    pub picture_url: String,
    pub has_onboarded: bool,
    pub verified: bool,
    pub updated_at: DateTime<Utc>,
}

/// Whether `email` belongs to the institution identified by `suffix`.
///
/// Domains are compared ASCII case-insensitively, so `a@THAPAR.edu`
/// counts as institutional.
pub fn is_institutional_email(email: &str, suffix: &str) -> bool {
    if suffix.is_empty() || email.len() < suffix.len() {
        return false;
    }
    let start = email.len() - suffix.len();
    email.is_char_boundary(start) && email[start..].eq_ignore_ascii_case(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tokens_roundtrip_through_from_str() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
        assert!("cse".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn category_serde_uses_select_tokens() {
        let json = serde_json::to_string(&Category::BioTech).unwrap();
        assert_eq!(json, "\"BioTech\"");
        let civil: Category = serde_json::from_str("\"CIVIL\"").unwrap();
        assert_eq!(civil, Category::Civil);
    }

    #[test]
    fn stage_parses_only_one_through_four() {
        for (i, token) in Stage::TOKENS.iter().enumerate() {
            let stage: Stage = token.parse().unwrap();
            assert_eq!(stage.number() as usize, i + 1);
        }
        assert!("0".parse::<Stage>().is_err());
        assert!("5".parse::<Stage>().is_err());
        assert!(" 1".parse::<Stage>().is_err());
    }

    #[test]
    fn field_display_matches_serde() {
        use FormField::*;
        for field in [
            Category, Stage, Tags, Bio, WantsTypeA, WantsTypeB, PictureUrl, Consent,
        ] {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(format!("\"{field}\""), json);
        }
    }

    #[test]
    fn default_values_are_empty() {
        let v = FormValues::default();
        assert!(v.category.is_none());
        assert!(v.stage.is_none());
        assert!(v.tags.is_empty());
        assert!(v.bio.is_empty());
        assert!(!v.wants_type_a && !v.wants_type_b);
        assert!(v.picture_url.is_empty());
        assert!(!v.consent);
    }

    #[test]
    fn institutional_email_suffix() {
        assert!(is_institutional_email("a@thapar.edu", "@thapar.edu"));
        assert!(is_institutional_email("a@THAPAR.edu", "@thapar.edu"));
        assert!(!is_institutional_email("a@gmail.com", "@thapar.edu"));
        assert!(!is_institutional_email("a@notthapar.edu.in", "@thapar.edu"));
        assert!(!is_institutional_email("", "@thapar.edu"));
        assert!(!is_institutional_email("a@thapar.edu", ""));
    }
}
