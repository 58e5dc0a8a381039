//! Proximity command handlers for the CLI.

use std::fmt::Write as _;
use std::num::NonZeroUsize;
use std::path::Path;

use gharsewa_core::{GeoPoint, MemoryDirectory, RankOptions, RankedResult, Role};
use gharsewa_db::PgDirectory;

/// A validated `nearby` invocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyRequest {
    pub origin: GeoPoint,
    pub options: RankOptions,
}

impl NearbyRequest {
    /// Validate raw CLI arguments.
    ///
    /// `role = "all"` disables the role filter.
    pub(crate) fn parse(
        latitude: f64,
        longitude: f64,
        limit: NonZeroUsize,
        role: &str,
        exclude: Option<String>,
    ) -> anyhow::Result<Self> {
        let origin = GeoPoint::try_new(latitude, longitude)?;
        let role = if role.trim().eq_ignore_ascii_case("all") {
            None
        } else {
            Some(role.parse::<Role>()?)
        };
        Ok(Self {
            origin,
            options: RankOptions {
                role,
                limit: Some(limit),
                exclude_id: exclude,
            },
        })
    }
}

/// An explicit `--limit` wins; otherwise the configured default applies.
pub(crate) fn resolve_limit<F>(flag: Option<NonZeroUsize>, configured: F) -> anyhow::Result<NonZeroUsize>
where
    F: FnOnce() -> Result<NonZeroUsize, gharsewa_core::ConfigError>,
{
    match flag {
        Some(limit) => Ok(limit),
        None => Ok(configured()?),
    }
}

pub(crate) async fn nearby_from_seed(
    path: &Path,
    request: &NearbyRequest,
) -> anyhow::Result<Vec<RankedResult>> {
    let seed = gharsewa_core::load_directory_seed(path)?;
    let directory = MemoryDirectory::new(seed.into_candidates());
    Ok(gharsewa_core::nearby(&directory, request.origin, &request.options).await?)
}

pub(crate) async fn nearby_from_db(
    pool: sqlx::PgPool,
    request: &NearbyRequest,
) -> anyhow::Result<Vec<RankedResult>> {
    let directory = PgDirectory::new(pool);
    Ok(gharsewa_core::nearby(&directory, request.origin, &request.options).await?)
}

pub(crate) async fn locate(
    pool: sqlx::PgPool,
    id: &str,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<()> {
    let point = GeoPoint::try_new(latitude, longitude)?;
    let directory = PgDirectory::new(pool);
    gharsewa_core::record_location(&directory, id, point).await?;
    Ok(())
}

/// Render ranked results as one line per entry.
///
/// Entries without a rating show `New`, entries without skills show `-`.
pub(crate) fn format_ranked(results: &[RankedResult]) -> String {
    if results.is_empty() {
        return "no providers found in this area\n".to_string();
    }

    let mut out = String::new();
    for (idx, result) in results.iter().enumerate() {
        let attrs = &result.candidate.attributes;
        let rating = attrs
            .get("averageRating")
            .and_then(serde_json::Value::as_f64)
            .map_or_else(|| "New".to_string(), |r| format!("{r:.1}"));
        let skills = attrs
            .get("skills")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "{:>2}. {:<28} {:>8.1} km  rating {:<4} {}",
            idx + 1,
            result.candidate.name,
            result.distance_km,
            rating,
            skills
        );
    }
    out
}
