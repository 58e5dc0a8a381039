mod db;
mod directory;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "gharsewa-cli")]
#[command(about = "Gharsewa provider directory command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Rank directory entries by distance from a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        /// Maximum number of results; defaults to `GHARSEWA_NEARBY_DEFAULT_LIMIT`
        #[arg(long)]
        limit: Option<NonZeroUsize>,
        /// `provider`, `customer`, or `all`
        #[arg(long, default_value = "provider")]
        role: String,
        /// Leave this id out of the results (usually your own)
        #[arg(long)]
        exclude: Option<String>,
        /// Rank against a seed file instead of the database
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Record the last known location of a directory entry
    Locate {
        #[arg(long)]
        id: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => db::run(command).await?,
        Some(Commands::Nearby {
            latitude,
            longitude,
            limit,
            role,
            exclude,
            seed,
        }) => {
            let limit = directory::resolve_limit(limit, gharsewa_core::load_nearby_default_limit)?;
            let request =
                directory::NearbyRequest::parse(latitude, longitude, limit, &role, exclude)?;
            let results = match seed {
                Some(path) => directory::nearby_from_seed(&path, &request).await?,
                None => {
                    let pool = db::connect().await?;
                    directory::nearby_from_db(pool, &request).await?
                }
            };
            print!("{}", directory::format_ranked(&results));
        }
        Some(Commands::Locate {
            id,
            latitude,
            longitude,
        }) => {
            let pool = db::connect().await?;
            directory::locate(pool, &id, latitude, longitude).await?;
            println!("recorded location for {id}: {latitude:.6}, {longitude:.6}");
        }
        None => println!("gharsewa-cli: run with --help for available commands"),
    }

    Ok(())
}
