// ABOUTME: Helm-compatible release name validation.
// ABOUTME: Release names are DNS labels capped at Helm's 53 character limit.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Helm refuses release names longer than this.
pub const MAX_RELEASE_NAME_LEN: usize = 53;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseNameError {
    #[error("release name cannot be empty")]
    Empty,

    #[error("release name exceeds maximum length of 53 characters")]
    TooLong,

    #[error("release name cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("release name cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("release name must be lowercase")]
    NotLowercase,

    #[error("invalid character in release name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ReleaseName(String);

impl ReleaseName {
    pub fn new(value: &str) -> Result<Self, ReleaseNameError> {
        if value.is_empty() {
            return Err(ReleaseNameError::Empty);
        }

        if value.len() > MAX_RELEASE_NAME_LEN {
            return Err(ReleaseNameError::TooLong);
        }

        if value.starts_with('-') {
            return Err(ReleaseNameError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(ReleaseNameError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ReleaseNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(ReleaseNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for ReleaseName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ReleaseName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
