//! Database operations for the `users` table.

mod read;
mod types;
mod write;

pub use read::{get_user, list_users};
pub use types::{NewUser, UserRow};
pub use write::{update_user_location, upsert_user};
