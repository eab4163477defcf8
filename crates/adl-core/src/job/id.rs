use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid id: {0:?}")]
pub struct InvalidId(pub String);

/// Accepts only the canonical hyphenated lowercase form.
pub fn parse_canonical_uuid(s: &str) -> Result<Uuid, InvalidId> {
    match Uuid::parse_str(s) {
        Ok(u) if u.hyphenated().to_string() == s => Ok(u),
        _ => Err(InvalidId(s.to_string())),
    }
}

/// Random UUIDv4 job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex digits, used as a log prefix.
    pub fn short(&self) -> String {
        self.to_string()[..8].to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical_uuid(s).map(Self)
    }
}

impl TryFrom<String> for JobId {
    type Error = InvalidId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.to_string()
    }
}
