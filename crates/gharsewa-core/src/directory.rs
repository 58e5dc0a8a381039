//! Directory entities as seen by the ranker.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CoreError, GeoPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Provider,
    Customer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Provider => "provider",
            Role::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "provider" => Ok(Role::Provider),
            "customer" => Ok(Role::Customer),
            _ => Err(CoreError::InvalidRole(s.to_string())),
        }
    }
}

/// An entity eligible for proximity ranking.
///
/// `attributes` (skills, rating, review count, ...) are carried through to the
/// output untouched; the ranker never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Candidate {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            location: None,
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A candidate paired with its distance from the query origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub distance_km: f64,
}
