//! Read operations for the `users` table.

use gharsewa_core::Role;
use sqlx::PgPool;

use super::types::UserRow;

const USER_COLUMNS: &str = "id, name, role, latitude, longitude, skills, average_rating, \
                            total_reviews, created_at, updated_at";

/// Return every user, optionally restricted to one role.
///
/// Ordered by `created_at, id` so that equal-distance ties downstream resolve
/// in registration order.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_users(pool: &PgPool, role: Option<Role>) -> Result<Vec<UserRow>, sqlx::Error> {
    if let Some(role) = role {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at, id"
        ))
        .bind(role.as_str())
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(pool)
        .await
    }
}

/// Return a single user by id, or `None` if no such user exists.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_user(pool: &PgPool, id: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
