//! Database maintenance command handlers for the CLI.

use std::path::PathBuf;

use clap::Subcommand;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load the directory seed file into the `users` table
    Seed {
        /// Seed file; defaults to `GHARSEWA_SEED_PATH`
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

/// Connect using the environment configuration.
pub(crate) async fn connect() -> anyhow::Result<sqlx::PgPool> {
    let config = gharsewa_core::load_app_config()?;
    connect_with(&config).await
}

async fn connect_with(config: &gharsewa_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = gharsewa_db::PoolConfig::from_app_config(config);
    Ok(gharsewa_db::connect_pool(&config.database_url, pool_config).await?)
}

pub(crate) async fn run(command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            let pool = connect().await?;
            gharsewa_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let pool = connect().await?;
            let applied = gharsewa_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed { path } => {
            let config = gharsewa_core::load_app_config()?;
            let path = path.unwrap_or_else(|| config.seed_path.clone());
            let pool = connect_with(&config).await?;
            let (inserted, updated) = run_seed(&pool, &path).await?;
            println!("seeded {} users ({inserted} new, {updated} updated)", inserted + updated);
        }
    }
    Ok(())
}

/// Upsert every user in the seed file. Returns `(inserted, updated)`.
///
/// # Errors
///
/// Returns an error if the seed file is invalid or any upsert fails.
pub(crate) async fn run_seed(
    pool: &sqlx::PgPool,
    path: &std::path::Path,
) -> anyhow::Result<(usize, usize)> {
    let seed = gharsewa_core::load_directory_seed(path)?;
    let mut inserted = 0usize;
    let mut updated = 0usize;

    for user in seed.users {
        let user = gharsewa_db::NewUser::from(user);
        if gharsewa_db::upsert_user(pool, &user).await? {
            inserted += 1;
        } else {
            updated += 1;
        }
    }

    tracing::info!(path = %path.display(), inserted, updated, "directory seeded");
    Ok((inserted, updated))
}
