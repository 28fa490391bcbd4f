use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// Fixed allow-list; changing it means a redeploy, not a migration.
pub const LANGUAGES: [Language; 5] = [
    Language::Python,
    Language::C,
    Language::Cpp,
    Language::CSharp,
    Language::Java,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    C,
    Cpp,
    CSharp,
    Java,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Java => "Java",
        }
    }

    /// The allow-list as it is sent to clients.
    pub fn names() -> Vec<&'static str> {
        LANGUAGES.iter().map(Language::as_str).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LANGUAGES
            .iter()
            .copied()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| ValidationError::new("language", "Invalid programming language"))
    }
}

/// A geographic point stored as `[longitude, latitude]`, GeoJSON order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// One stored vote. `option` is kept as text so that rows written before an
/// allow-list change still group under whatever value they carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteRecord {
    pub username: String,
    pub option: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub location: Option<GeoPoint>,
}

impl VoteRecord {
    pub fn new(username: impl Into<String>, option: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            option: option.into(),
            timestamp: Some(timestamp),
            location: None,
        }
    }

    pub fn at(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }
}

// Raw location as sent by a client, before the two-element check.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLocation {
    pub coordinates: Vec<f64>,
}

/// Inbound vote submission, exactly as deserialized from the request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitVote {
    pub username: Option<String>,
    #[serde(alias = "option")]
    pub language: Option<String>,
    pub location: Option<RawLocation>,
}

/// A submission that passed validation and may be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Ballot {
    pub username: String,
    pub language: Language,
    pub location: Option<GeoPoint>,
}

impl SubmitVote {
    pub fn validate(self) -> Result<Ballot, ValidationError> {
        let username = match self.username {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(ValidationError::new("username", "Please enter a name")),
        };

        let language = self
            .language
            .as_deref()
            .ok_or_else(|| ValidationError::new("language", "Invalid programming language"))?
            .parse::<Language>()?;

        let location = match self.location {
            Some(raw) => match raw.coordinates.as_slice() {
                [lng, lat] if lng.is_finite() && lat.is_finite() => Some(GeoPoint::new(*lng, *lat)),
                _ => {
                    return Err(ValidationError::new(
                        "location",
                        "Location must be a [longitude, latitude] pair",
                    ))
                }
            },
            None => None,
        };

        Ok(Ballot {
            username,
            language,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(username: Option<&str>, language: Option<&str>) -> SubmitVote {
        SubmitVote {
            username: username.map(str::to_string),
            language: language.map(str::to_string),
            location: None,
        }
    }

    #[test]
    fn accepts_every_allowed_language() {
        for name in Language::names() {
            let ballot = submission(Some("ana"), Some(name)).validate().unwrap();
            assert_eq!(ballot.language.as_str(), name);
        }
    }

    #[test]
    fn rejects_language_outside_allow_list() {
        let err = submission(Some("ana"), Some("Rust")).validate().unwrap_err();
        assert_eq!(err.field, "language");

        // Matching is exact, not case-insensitive
        let err = submission(Some("ana"), Some("java")).validate().unwrap_err();
        assert_eq!(err.field, "language");

        let err = submission(Some("ana"), None).validate().unwrap_err();
        assert_eq!(err.field, "language");
    }

    #[test]
    fn rejects_missing_or_blank_username() {
        assert_eq!(submission(None, Some("C")).validate().unwrap_err().field, "username");
        assert_eq!(submission(Some(""), Some("C")).validate().unwrap_err().field, "username");
        assert_eq!(submission(Some("   "), Some("C")).validate().unwrap_err().field, "username");
    }

    #[test]
    fn username_is_checked_before_language() {
        let err = submission(Some(""), Some("Rust")).validate().unwrap_err();
        assert_eq!(err.field, "username");
    }

    #[test]
    fn location_must_be_a_pair() {
        let mut vote = submission(Some("ana"), Some("Java"));
        vote.location = Some(RawLocation {
            coordinates: vec![23.3, 42.7],
        });
        let ballot = vote.clone().validate().unwrap();
        let point = ballot.location.unwrap();
        assert_eq!(point.longitude(), 23.3);
        assert_eq!(point.latitude(), 42.7);

        vote.location = Some(RawLocation {
            coordinates: vec![23.3],
        });
        assert_eq!(vote.validate().unwrap_err().field, "location");
    }

    #[test]
    fn payload_accepts_option_alias() {
        let vote: SubmitVote =
            serde_json::from_str(r#"{"username":"ana","option":"C#"}"#).unwrap();
        assert_eq!(vote.validate().unwrap().language, Language::CSharp);
    }
}
