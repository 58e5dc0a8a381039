//! Proximity ranking of directory candidates.

use std::num::NonZeroUsize;

use crate::{Candidate, GeoPoint, RankedResult, Role};

/// Filters applied by [`rank`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankOptions {
    /// Keep only candidates with this role. `None` keeps every role.
    pub role: Option<Role>,
    /// Truncate to the nearest `limit` results. `None` is unbounded.
    pub limit: Option<NonZeroUsize>,
    /// Drop the candidate with this id (typically the caller's own entry).
    ///
    /// Self-exclusion never happens implicitly; callers opt in here.
    pub exclude_id: Option<String>,
}

impl RankOptions {
    #[must_use]
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: NonZeroUsize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    fn admits(&self, candidate: &Candidate) -> bool {
        if self.role.is_some_and(|role| role != candidate.role) {
            return false;
        }
        self.exclude_id
            .as_deref()
            .is_none_or(|excluded| excluded != candidate.id)
    }
}

/// Rank `candidates` by great-circle distance from `origin`, nearest first.
///
/// Candidates without a location are dropped. Equal distances keep their
/// input order. The result holds at most `options.limit` entries.
///
/// Coordinates are not validated here. A NaN or infinite coordinate ranks at
/// `f64::INFINITY`, after every finite distance.
#[must_use]
pub fn rank<I>(origin: GeoPoint, candidates: I, options: &RankOptions) -> Vec<RankedResult>
where
    I: IntoIterator<Item = Candidate>,
{
    let mut considered = 0usize;
    let mut ranked: Vec<RankedResult> = candidates
        .into_iter()
        .inspect(|_| considered += 1)
        .filter(|candidate| options.admits(candidate))
        .filter_map(|candidate| {
            let location = candidate.location?;
            Some(RankedResult {
                distance_km: origin.distance_km(&location),
                candidate,
            })
        })
        .collect();

    // `sort_by` is stable, so ties keep input order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    if let Some(limit) = options.limit {
        ranked.truncate(limit.get());
    }

    tracing::debug!(
        origin = %origin,
        candidates = considered,
        ranked = ranked.len(),
        "ranked candidates by distance"
    );

    ranked
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
