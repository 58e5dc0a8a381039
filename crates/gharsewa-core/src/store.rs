//! The directory store seam and an in-memory implementation.

use std::future::Future;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::{rank, Candidate, GeoPoint, RankOptions, RankedResult, Role};

/// System of record for directory entries and their last known location.
///
/// Implementations surface their own error type; nothing in this crate
/// retries or wraps it.
pub trait DirectoryStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return every known entity, pre-filtered by `role` when given.
    fn fetch_all(
        &self,
        role: Option<Role>,
    ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send;

    /// Persist `point` as the last known location of `entity_id`.
    fn write_location(
        &self,
        entity_id: &str,
        point: GeoPoint,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Record a location update for `entity_id`.
///
/// Success means the store accepted the write. The store's error is returned
/// unchanged.
///
/// # Errors
///
/// Returns `S::Error` if the store rejects or fails the write.
pub async fn record_location<S>(store: &S, entity_id: &str, point: GeoPoint) -> Result<(), S::Error>
where
    S: DirectoryStore + Sync,
{
    store.write_location(entity_id, point).await?;
    tracing::debug!(entity_id, point = %point, "location recorded");
    Ok(())
}

/// Fetch a full directory snapshot and rank it around `origin`.
///
/// # Errors
///
/// Returns `S::Error` if the snapshot fetch fails.
pub async fn nearby<S>(
    store: &S,
    origin: GeoPoint,
    options: &RankOptions,
) -> Result<Vec<RankedResult>, S::Error>
where
    S: DirectoryStore + Sync,
{
    let snapshot = store.fetch_all(options.role).await?;
    Ok(rank(origin, snapshot, options))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    #[error("directory lock poisoned")]
    Poisoned,
}

impl<T> From<PoisonError<T>> for MemoryStoreError {
    fn from(_: PoisonError<T>) -> Self {
        MemoryStoreError::Poisoned
    }
}

/// Thread-safe in-memory directory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: RwLock<Vec<Candidate>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Insert `candidate`, replacing any entry with the same id in place.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryStoreError::Poisoned`] if a writer panicked.
    pub fn upsert(&self, candidate: Candidate) -> Result<(), MemoryStoreError> {
        let mut entries = self.entries.write()?;
        match entries.iter_mut().find(|c| c.id == candidate.id) {
            Some(existing) => *existing = candidate,
            None => entries.push(candidate),
        }
        Ok(())
    }

    /// Look up a single entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryStoreError::Poisoned`] if a writer panicked.
    pub fn get(&self, id: &str) -> Result<Option<Candidate>, MemoryStoreError> {
        let entries = self.entries.read()?;
        Ok(entries.iter().find(|c| c.id == id).cloned())
    }

    fn snapshot(&self, role: Option<Role>) -> Result<Vec<Candidate>, MemoryStoreError> {
        let entries = self.entries.read()?;
        Ok(entries
            .iter()
            .filter(|c| role.is_none_or(|r| r == c.role))
            .cloned()
            .collect())
    }

    fn set_location(&self, entity_id: &str, point: GeoPoint) -> Result<(), MemoryStoreError> {
        let mut entries = self.entries.write()?;
        let entry = entries
            .iter_mut()
            .find(|c| c.id == entity_id)
            .ok_or_else(|| MemoryStoreError::UnknownEntity(entity_id.to_string()))?;
        entry.location = Some(point);
        Ok(())
    }
}

impl DirectoryStore for MemoryDirectory {
    type Error = MemoryStoreError;

    async fn fetch_all(&self, role: Option<Role>) -> Result<Vec<Candidate>, Self::Error> {
        self.snapshot(role)
    }

    async fn write_location(&self, entity_id: &str, point: GeoPoint) -> Result<(), Self::Error> {
        self.set_location(entity_id, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new(vec![
            Candidate::new("p1", "Hari Electric", Role::Provider)
                .with_location(GeoPoint::new(27.70, 85.32)),
            Candidate::new("p2", "Gita Plumbing", Role::Provider),
            Candidate::new("c1", "Sita", Role::Customer).with_location(GeoPoint::new(27.71, 85.32)),
        ])
    }

    #[tokio::test]
    async fn fetch_all_filters_by_role() {
        let dir = directory();
        let providers = dir.fetch_all(Some(Role::Provider)).await.unwrap();
        assert_eq!(providers.len(), 2);
        assert!(providers.iter().all(|c| c.role == Role::Provider));

        let everyone = dir.fetch_all(None).await.unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn record_location_makes_candidate_rankable() {
        let dir = directory();
        let origin = GeoPoint::new(27.7172, 85.3240);
        let options = RankOptions::default().role(Role::Provider);

        let before = nearby(&dir, origin, &options).await.unwrap();
        assert_eq!(before.len(), 1);

        record_location(&dir, "p2", GeoPoint::new(27.7172, 85.3240))
            .await
            .unwrap();

        let after = nearby(&dir, origin, &options).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].candidate.id, "p2");
    }

    #[tokio::test]
    async fn record_location_last_write_wins() {
        let dir = directory();
        record_location(&dir, "p1", GeoPoint::new(1.0, 1.0)).await.unwrap();
        record_location(&dir, "p1", GeoPoint::new(2.0, 2.0)).await.unwrap();
        let p1 = dir.get("p1").unwrap().unwrap();
        assert_eq!(p1.location, Some(GeoPoint::new(2.0, 2.0)));
    }

    #[tokio::test]
    async fn record_location_surfaces_store_error_unchanged() {
        let dir = directory();
        let err = record_location(&dir, "ghost", GeoPoint::new(0.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(err, MemoryStoreError::UnknownEntity("ghost".to_string()));
    }

    #[tokio::test]
    async fn nearby_on_empty_directory_is_empty() {
        let dir = MemoryDirectory::default();
        let results = nearby(&dir, GeoPoint::new(0.0, 0.0), &RankOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let dir = directory();
        dir.upsert(Candidate::new("p1", "Hari Electric & Sons", Role::Provider))
            .unwrap();
        dir.upsert(Candidate::new("p3", "New", Role::Provider)).unwrap();

        let all = dir.snapshot(None).unwrap();
        let ids: Vec<&str> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "c1", "p3"]);
        assert_eq!(all[0].name, "Hari Electric & Sons");
        assert!(all[0].location.is_none());
    }
}
