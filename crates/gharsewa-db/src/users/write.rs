//! Write operations for the `users` table.

use gharsewa_core::GeoPoint;
use sqlx::PgPool;

use super::types::NewUser;
use crate::DbError;

/// Insert a user or refresh an existing one with the same id.
///
/// Returns `true` when the row was newly inserted.
///
/// The rating is bound as `Option<f64>` and cast to `NUMERIC(3,2)` inside the
/// statement so Postgres does the rounding.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_user(pool: &PgPool, user: &NewUser) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "INSERT INTO users \
             (id, name, role, latitude, longitude, skills, average_rating, total_reviews) \
         VALUES ($1, $2, $3, $4, $5, $6, $7::NUMERIC(3,2), $8) \
         ON CONFLICT (id) DO UPDATE SET \
             name           = EXCLUDED.name, \
             role           = EXCLUDED.role, \
             latitude       = EXCLUDED.latitude, \
             longitude      = EXCLUDED.longitude, \
             skills         = EXCLUDED.skills, \
             average_rating = EXCLUDED.average_rating, \
             total_reviews  = EXCLUDED.total_reviews, \
             updated_at     = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(user.location.map(|p| p.latitude))
    .bind(user.location.map(|p| p.longitude))
    .bind(&user.skills)
    .bind(user.average_rating)
    .bind(user.total_reviews)
    .fetch_one(pool)
    .await
}

/// Overwrite the stored location of user `id`. Last write wins.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no user has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_user_location(pool: &PgPool, id: &str, point: GeoPoint) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE users \
         SET latitude = $2, longitude = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(point.latitude)
    .bind(point.longitude)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
