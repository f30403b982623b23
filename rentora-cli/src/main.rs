use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    AuthCommand, CategoryAreaCommand, ConfigCommand, RoomCommand, SpecialPriceCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "rentora")]
#[command(version)]
#[command(about = "Manage your rental properties from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and manage the stored session
    Auth(AuthCommand),

    /// Manage rooms for a property
    Room(RoomCommand),

    /// Manage date-ranged price overrides for rooms
    #[command(name = "special-price")]
    SpecialPrice(SpecialPriceCommand),

    /// Manage category areas
    #[command(name = "category-area")]
    CategoryArea(CategoryAreaCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Save config path for commands that rewrite the file
    let cli_config_path = cli.config.clone();

    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Auth(cmd)) => cmd.run(&config, cli_config_path)?,
        Some(Commands::Room(cmd)) => cmd.run(&config)?,
        Some(Commands::SpecialPrice(cmd)) => cmd.run(&config)?,
        Some(Commands::CategoryArea(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => println!("Use --help to see available commands"),
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}
