//! Category area commands.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use rentora_core::{ApiClient, ApiError};

use crate::commands::api_client;
use crate::config::Config;

/// Manage category areas
#[derive(Args)]
pub struct CategoryAreaCommand {
    #[command(subcommand)]
    pub command: CategoryAreaSubcommand,
}

#[derive(Subcommand)]
pub enum CategoryAreaSubcommand {
    /// List your category areas
    List,
    /// Create a new category area
    Create {
        /// Name of the category area
        name: String,
    },
    /// Rename a category area
    Rename {
        /// Category area id
        id: i64,
        /// New name
        name: String,
    },
    /// Delete a category area
    Delete {
        /// Category area id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl CategoryAreaCommand {
    pub fn run(&self, config: &Config) -> Result<(), CategoryAreaError> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| CategoryAreaError::Runtime(e.to_string()))?;
        let client = api_client(config);

        match &self.command {
            CategoryAreaSubcommand::List => rt.block_on(list(&client)),
            CategoryAreaSubcommand::Create { name } => rt.block_on(create(&client, name)),
            CategoryAreaSubcommand::Rename { id, name } => {
                rt.block_on(rename(&client, *id, name))
            }
            CategoryAreaSubcommand::Delete { id, force } => {
                if !force && !confirm(&format!("Delete category area {}? [y/N] ", id))? {
                    println!("Aborted.");
                    return Ok(());
                }
                rt.block_on(delete(&client, *id))
            }
        }
    }
}

/// Errors that can occur while managing category areas
#[derive(Debug)]
pub enum CategoryAreaError {
    /// I/O error while prompting
    Io(io::Error),
    /// Backend rejected the request
    Api(ApiError),
    /// Failed to start the async runtime
    Runtime(String),
}

impl std::fmt::Display for CategoryAreaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryAreaError::Io(e) => write!(f, "I/O error: {}", e),
            CategoryAreaError::Api(e) => write!(f, "{}", e),
            CategoryAreaError::Runtime(e) => write!(f, "Failed to create runtime: {}", e),
        }
    }
}

impl std::error::Error for CategoryAreaError {}

impl From<io::Error> for CategoryAreaError {
    fn from(e: io::Error) -> Self {
        CategoryAreaError::Io(e)
    }
}

impl From<ApiError> for CategoryAreaError {
    fn from(e: ApiError) -> Self {
        CategoryAreaError::Api(e)
    }
}

fn confirm(label: &str) -> Result<bool, io::Error> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

async fn list(client: &ApiClient) -> Result<(), CategoryAreaError> {
    let areas = client.list_category_areas().await?;
    if areas.is_empty() {
        println!("No category areas.");
        println!();
        println!("Create one with: rentora category-area create <name>");
        return Ok(());
    }
    for area in areas {
        println!("{}", area);
    }
    Ok(())
}

async fn create(client: &ApiClient, name: &str) -> Result<(), CategoryAreaError> {
    client.create_category_area(name).await?;
    println!("✓ Category area '{}' created successfully!", name);
    Ok(())
}

async fn rename(client: &ApiClient, id: i64, name: &str) -> Result<(), CategoryAreaError> {
    client.rename_category_area(id, name).await?;
    println!("✓ Category area {} renamed to '{}'", id, name);
    Ok(())
}

async fn delete(client: &ApiClient, id: i64) -> Result<(), CategoryAreaError> {
    client.delete_category_area(id).await?;
    println!("✓ Category area {} deleted successfully!", id);
    Ok(())
}
