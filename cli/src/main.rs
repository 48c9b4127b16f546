//! Qrforge CLI - QR code studio.

mod commands;
mod ui;

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use qrforge_core::store::User;
use qrforge_core::{Config, Store};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrforge")]
#[command(about = "Generate, style and track QR codes", long_about = None)]
struct Cli {
    /// Act as this user (enables history, favorites and analytics)
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Password for --username
    #[arg(short, long, global = true)]
    password: Option<String>,

    /// Override the data directory (default: ~/.qrforge)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a QR code from one of the supported content types
    Generate(commands::GenerateArgs),
    /// Decode QR codes from an image file
    Scan {
        /// Image file to scan
        image: PathBuf,
    },
    /// Browse and manage past generations
    History {
        #[command(subcommand)]
        action: commands::HistoryAction,
    },
    /// Manage saved style presets
    Favorites {
        #[command(subcommand)]
        action: commands::FavoritesAction,
    },
    /// Show usage analytics
    Analytics,
    /// List the built-in style templates
    Templates,
    /// Export all database tables to CSV (administrators only)
    Export {
        /// Directory to write the CSV files into
        dir: PathBuf,
    },
    /// Create a new account
    Register { username: String, password: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("qrforge_core=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = match &cli.data_dir {
        Some(dir) => Config {
            data_dir: dir.clone(),
        },
        None => Config::default(),
    };
    std::fs::create_dir_all(&config.data_dir)?;
    let store = Store::open(config.db_path())?;

    let user = match (&cli.username, &cli.password) {
        (Some(u), Some(p)) => Some(store.authenticate(u, p)?),
        (None, None) => None,
        _ => bail!("--username and --password must be given together"),
    };

    match cli.command {
        Commands::Generate(args) => commands::generate(&store, user.as_ref(), args)?,
        Commands::Scan { image } => commands::scan(&image)?,
        Commands::History { action } => commands::history(&store, &required(user)?, action)?,
        Commands::Favorites { action } => commands::favorites(&store, &required(user)?, action)?,
        Commands::Analytics => commands::analytics(&store, &required(user)?)?,
        Commands::Templates => commands::templates(),
        Commands::Export { dir } => commands::export(&store, &required(user)?, &dir)?,
        Commands::Register { username, password } => {
            commands::register(&store, &username, &password)?
        }
    }

    Ok(())
}

fn required(user: Option<User>) -> anyhow::Result<User> {
    user.ok_or_else(|| anyhow::anyhow!("this command requires --username and --password"))
}
