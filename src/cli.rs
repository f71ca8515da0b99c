//! Command-line interface for par-source-windows.
//!
//! The binary is a maintenance tool for the state the coordinator persists:
//! it inspects or clears saved satellite geometry, mints window ids and
//! locates the config file.

use crate::config::{Config, LogLevel};
use crate::geometry::{FileGeometryStore, storage};
use crate::ids::WindowId;
use crate::traits::GeometryPersistence;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// par-source-windows - satellite source window coordinator
#[derive(Parser)]
#[command(name = "par-source-windows")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Debug log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level, global = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or reset persisted satellite window geometry
    Geometry {
        #[command(subcommand)]
        action: GeometryCommand,
    },
    /// Print a freshly generated satellite window id
    NewWindowId {
        /// Print the full window name (prefix + id) instead of the bare id
        #[arg(long)]
        name: bool,
    },
    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum GeometryCommand {
    /// List saved geometry for every known satellite
    List {
        /// Print the geometry map as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the saved geometry file
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Write the current (or default) configuration back to disk
    Init,
}

fn parse_log_level(value: &str) -> std::result::Result<LogLevel, String> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Ok(LogLevel::Off),
        "error" => Ok(LogLevel::Error),
        "warn" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        other => Err(format!("unknown log level '{other}'")),
    }
}

/// Parse CLI arguments, run the selected subcommand and return the exit code
pub fn process_cli() -> i32 {
    let cli = Cli::parse();
    crate::debug::init_log_bridge(cli.log_level);

    match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("par-source-windows: error: {e:#}");
            1
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_file.unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Geometry { action } => {
            let path = config.geometry_path();
            match action {
                GeometryCommand::List { json } => list_geometry(path, json),
                GeometryCommand::Clear => {
                    if storage::clear_geometry(&path)? {
                        println!("Removed {}", path.display());
                    } else {
                        println!("No saved geometry at {}", path.display());
                    }
                    Ok(())
                }
            }
        }
        Commands::NewWindowId { name } => {
            let id = WindowId::generate();
            if name {
                println!("{}", id.window_name(&config.window_name_prefix));
            } else {
                println!("{id}");
            }
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigCommand::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigCommand::Init => {
                config.save_to(&config_path)?;
                println!("Wrote {}", config_path.display());
                Ok(())
            }
        },
    }
}

fn list_geometry(path: PathBuf, json: bool) -> Result<()> {
    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let store = FileGeometryStore::new(path);
    let geometry = runtime.block_on(store.load())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
        return Ok(());
    }

    if geometry.is_empty() {
        println!("No saved geometry at {}", store.path().display());
        return Ok(());
    }

    println!("{:<16} {:>7} {:>7} {:>7} {:>7} {:>7}", "WINDOW", "ORDINAL", "X", "Y", "WIDTH", "HEIGHT");
    let mut rows: Vec<_> = geometry.iter().collect();
    rows.sort_by_key(|(_, g)| g.ordinal);
    for (id, g) in rows {
        println!(
            "{:<16} {:>7} {:>7} {:>7} {:>7} {:>7}",
            id.as_str(),
            g.ordinal,
            g.x,
            g.y,
            g.width,
            g.height
        );
    }
    Ok(())
}
