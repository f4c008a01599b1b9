//! Card Tracker - sports card collection server
//!
//! `serve` runs the REST API; `stats` prints a collection summary.

use card_tracker::web::{self, AppState};
use card_tracker::{
    database, default_db_path, open_database, ImageStore, LogoResolver, MarketplaceClient,
    TrackerConfig,
};
use clap::{Parser, Subcommand};
use collection_common::{collection_stats, stats_by_tag, Sport};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Sports card collection tracker
#[derive(Parser, Debug)]
#[command(name = "card_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, default_value_t = default_db_path())]
    database: String,

    /// Directory for uploaded card images (default: next to the database)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Owner id all records are scoped to
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
    /// Print collection statistics and exit
    Stats,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = TrackerConfig::new(PathBuf::from(&args.database), args.data_dir, args.owner);

    log::info!("Starting card_tracker...");
    log::info!("Database path: {}", config.database.display());

    let conn = match open_database(&config.database) {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Serve { port } => {
            let state = AppState::new(
                Arc::new(Mutex::new(conn)),
                ImageStore::new(&config.data_dir),
                MarketplaceClient::new(config.ebay.clone()),
                LogoResolver::new(config.sportsdb_api_key.clone()),
                &config.owner,
            );
            if let Err(e) = web::serve(state, port).await {
                log::error!("Web server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Stats => {
            if let Err(e) = print_stats(&conn, &config.owner) {
                log::error!("Failed to compute statistics: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn print_stats(conn: &rusqlite::Connection, owner: &str) -> card_tracker::Result<()> {
    let players = database::list_players_with_cards(conn, owner)?;
    let stats = collection_stats(&players);

    println!("Players:      {}", stats.total_players);
    println!("Cards:        {}", stats.total_cards);
    println!(
        "Owned:        {} ({:.1}%)",
        stats.owned,
        stats.owned_percent()
    );
    println!("Located:      {}", stats.located);
    println!("Missing:      {}", stats.missing);
    if stats.unknown_status > 0 {
        println!("Other status: {}", stats.unknown_status);
    }
    println!("Owned value:  {:.2}", stats.total_value);

    let mut by_sport = Sport::ALL
        .iter()
        .map(|sport| {
            let count = players.iter().filter(|p| p.player.sport == *sport).count();
            (sport, count)
        })
        .filter(|(_, count)| *count > 0)
        .peekable();
    if by_sport.peek().is_some() {
        println!();
        for (sport, count) in by_sport {
            println!("{:<20} {:>4} players", sport.label(), count);
        }
    }

    let by_tag = stats_by_tag(&players);
    if !by_tag.is_empty() {
        println!();
        for entry in by_tag {
            println!(
                "{:<20} {:>4} players {:>5} cards {:>5} owned",
                entry.tag.name,
                entry.stats.total_players,
                entry.stats.total_cards,
                entry.stats.owned
            );
        }
    }
    Ok(())
}
