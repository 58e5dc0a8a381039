//! Row types for the `users` table.

use chrono::{DateTime, Utc};
use gharsewa_core::{Candidate, GeoPoint, Role, SeedUser};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::DbError;

/// Input record for inserting/upserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub location: Option<GeoPoint>,
    pub skills: Option<String>,
    pub average_rating: Option<f64>,
    pub total_reviews: i32,
}

impl From<SeedUser> for NewUser {
    fn from(seed: SeedUser) -> Self {
        Self {
            location: seed.location(),
            id: seed.id,
            name: seed.name,
            role: seed.role,
            skills: seed.skills,
            average_rating: seed.average_rating,
            total_reviews: i32::try_from(seed.total_reviews).unwrap_or(i32::MAX),
        }
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: Option<String>,
    pub average_rating: Option<Decimal>,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    #[must_use]
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }

    #[must_use]
    pub fn average_rating_f64(&self) -> Option<f64> {
        self.average_rating.and_then(|d| d.to_f64())
    }
}

impl TryFrom<UserRow> for Candidate {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse()?;
        let location = row.location();
        let average_rating = row.average_rating_f64();
        let mut candidate = Candidate::new(row.id, row.name, role);
        candidate.location = location;
        if let Some(skills) = row.skills {
            candidate = candidate.with_attribute("skills", skills);
        }
        if let Some(rating) = average_rating {
            candidate = candidate.with_attribute("averageRating", rating);
        }
        Ok(candidate.with_attribute("totalReviews", row.total_reviews))
    }
}
