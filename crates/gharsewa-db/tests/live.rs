//! Live integration tests for gharsewa-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/gharsewa-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use gharsewa_core::{nearby, record_location, GeoPoint, RankOptions, Role};
use gharsewa_db::{
    get_user, list_users, update_user_location, upsert_user, DbError, NewUser, PgDirectory,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(id: &str, role: Role, location: Option<GeoPoint>) -> NewUser {
    NewUser {
        id: id.to_string(),
        name: format!("User {id}"),
        role,
        location,
        skills: None,
        average_rating: None,
        total_reviews: 0,
    }
}

async fn seed(pool: &sqlx::PgPool, users: &[NewUser]) {
    for user in users {
        upsert_user(pool, user)
            .await
            .unwrap_or_else(|e| panic!("upsert_user failed for '{}': {e}", user.id));
    }
}

// ---------------------------------------------------------------------------
// Section 1: users table
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_user_reports_insert_then_update(pool: sqlx::PgPool) {
    let mut user = new_user("prov-a", Role::Provider, None);

    let first = upsert_user(&pool, &user).await.expect("insert");
    assert!(first, "first upsert should insert");

    user.name = "Renamed".to_string();
    let second = upsert_user(&pool, &user).await.expect("update");
    assert!(!second, "second upsert should update");

    let row = get_user(&pool, "prov-a").await.expect("get").expect("row");
    assert_eq!(row.name, "Renamed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_users_filters_by_role(pool: sqlx::PgPool) {
    seed(
        &pool,
        &[
            new_user("prov-a", Role::Provider, None),
            new_user("cust-a", Role::Customer, None),
            new_user("prov-b", Role::Provider, None),
        ],
    )
    .await;

    let providers = list_users(&pool, Some(Role::Provider)).await.expect("list");
    assert_eq!(providers.len(), 2);
    assert!(providers.iter().all(|r| r.role == "provider"));

    let everyone = list_users(&pool, None).await.expect("list");
    assert_eq!(everyone.len(), 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_user_location_overwrites(pool: sqlx::PgPool) {
    seed(&pool, &[new_user("prov-a", Role::Provider, None)]).await;

    update_user_location(&pool, "prov-a", GeoPoint::new(27.7, 85.3))
        .await
        .expect("first write");
    update_user_location(&pool, "prov-a", GeoPoint::new(27.6, 85.4))
        .await
        .expect("second write");

    let row = get_user(&pool, "prov-a").await.expect("get").expect("row");
    assert_eq!(row.location(), Some(GeoPoint::new(27.6, 85.4)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_user_location_unknown_id_is_not_found(pool: sqlx::PgPool) {
    let err = update_user_location(&pool, "ghost", GeoPoint::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound), "got {err:?}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn half_a_location_is_rejected_by_schema(pool: sqlx::PgPool) {
    let result = sqlx::query(
        "INSERT INTO users (id, name, role, latitude) VALUES ('x', 'X', 'provider', 10)",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "latitude without longitude must be rejected");
}

// ---------------------------------------------------------------------------
// Section 2: PgDirectory as a DirectoryStore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn nearby_ranks_providers_from_postgres(pool: sqlx::PgPool) {
    seed(
        &pool,
        &[
            new_user("far", Role::Provider, Some(GeoPoint::new(28.2096, 83.9856))),
            new_user("near", Role::Provider, Some(GeoPoint::new(27.7154, 85.3123))),
            new_user("unlocated", Role::Provider, None),
            new_user("cust", Role::Customer, Some(GeoPoint::new(27.7172, 85.3240))),
        ],
    )
    .await;

    let directory = PgDirectory::new(pool);
    let origin = GeoPoint::new(27.7172, 85.3240);
    let options = RankOptions::default().role(Role::Provider);

    let results = nearby(&directory, origin, &options).await.expect("nearby");
    let ids: Vec<&str> = results.iter().map(|r| r.candidate.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn record_location_through_directory(pool: sqlx::PgPool) {
    seed(&pool, &[new_user("prov-a", Role::Provider, None)]).await;
    let directory = PgDirectory::new(pool.clone());

    record_location(&directory, "prov-a", GeoPoint::new(27.7172, 85.324))
        .await
        .expect("record");

    let row = get_user(&pool, "prov-a").await.expect("get").expect("row");
    assert_eq!(row.location(), Some(GeoPoint::new(27.7172, 85.324)));

    let err = record_location(&directory, "ghost", GeoPoint::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}
