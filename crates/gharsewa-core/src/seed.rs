//! Directory seed file loading and validation.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Candidate, ConfigError, GeoPoint, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: Option<String>,
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: u32,
}

impl SeedUser {
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    /// Map the seed row to a ranking candidate.
    ///
    /// Attribute keys match what the presentation layer renders:
    /// `skills`, `averageRating`, `totalReviews`.
    #[must_use]
    pub fn into_candidate(self) -> Candidate {
        let location = self.location();
        let mut candidate = Candidate::new(self.id, self.name, self.role);
        candidate.location = location;
        if let Some(skills) = self.skills {
            candidate = candidate.with_attribute("skills", skills);
        }
        if let Some(rating) = self.average_rating {
            candidate = candidate.with_attribute("averageRating", rating);
        }
        candidate.with_attribute("totalReviews", self.total_reviews)
    }
}

#[derive(Debug, Deserialize)]
pub struct DirectorySeed {
    pub users: Vec<SeedUser>,
}

impl DirectorySeed {
    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.users.into_iter().map(SeedUser::into_candidate).collect()
    }
}

/// Load and validate a directory seed from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_directory_seed(path: &Path) -> Result<DirectorySeed, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let seed: DirectorySeed = serde_yaml::from_str(&content)?;
    validate_seed(&seed)?;

    Ok(seed)
}

fn validate_seed(seed: &DirectorySeed) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for user in &seed.users {
        if user.id.trim().is_empty() {
            return Err(ConfigError::Validation("user id must be non-empty".to_string()));
        }

        if user.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "user '{}' must have a non-empty name",
                user.id
            )));
        }

        if !seen_ids.insert(user.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate user id: '{}'",
                user.id
            )));
        }

        match (user.latitude, user.longitude) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::Validation(format!(
                    "user '{}' must set both latitude and longitude or neither",
                    user.id
                )));
            }
            (Some(lat), Some(lon)) => {
                GeoPoint::try_new(lat, lon).map_err(|e| {
                    ConfigError::Validation(format!("user '{}': {e}", user.id))
                })?;
            }
            (None, None) => {}
        }

        if let Some(rating) = user.average_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(ConfigError::Validation(format!(
                    "user '{}' has average_rating {rating}; must be within 0..=5",
                    user.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
