//! Special price commands: date-ranged price overrides per room.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use rentora_core::{ApiClient, ApiError, NewSpecialPrice, SpecialPriceUpdate};

use crate::commands::api_client;
use crate::config::Config;

/// Manage date-ranged price overrides for rooms
#[derive(Args)]
pub struct SpecialPriceCommand {
    #[command(subcommand)]
    pub command: SpecialPriceSubcommand,
}

#[derive(Subcommand)]
pub enum SpecialPriceSubcommand {
    /// List special prices per room for a property
    List {
        /// Property id (defaults to the configured property)
        property: Option<i64>,
    },
    /// Create a special price for a room
    Create {
        /// Room id the override applies to
        #[arg(long)]
        room: i64,
        /// Override price
        #[arg(long)]
        price: i64,
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
    /// Update a special price
    Update {
        /// Special price id
        id: i64,
        /// Override price
        #[arg(long)]
        price: i64,
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Deactivate the override instead of keeping it active
        #[arg(long)]
        inactive: bool,
    },
}

impl SpecialPriceCommand {
    pub fn run(&self, config: &Config) -> Result<(), SpecialPriceError> {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| SpecialPriceError::Runtime(e.to_string()))?;
        let client = api_client(config);

        match &self.command {
            SpecialPriceSubcommand::List { property } => {
                let property = property
                    .or(config.default_property)
                    .ok_or(SpecialPriceError::NoProperty)?;
                rt.block_on(list(&client, property))
            }
            SpecialPriceSubcommand::Create {
                room,
                price,
                start,
                end,
            } => {
                let request = NewSpecialPrice {
                    room_id: *room,
                    price: *price,
                    start_date: parse_date(start)?,
                    end_date: parse_date(end)?,
                };
                rt.block_on(create(&client, request))
            }
            SpecialPriceSubcommand::Update {
                id,
                price,
                start,
                end,
                inactive,
            } => {
                let request = SpecialPriceUpdate {
                    price: *price,
                    start_date: parse_date(start)?,
                    end_date: parse_date(end)?,
                    is_active: !inactive,
                };
                rt.block_on(update(&client, *id, request))
            }
        }
    }
}

/// Errors that can occur while managing special prices
#[derive(Debug)]
pub enum SpecialPriceError {
    /// No property id given and none configured
    NoProperty,
    /// A date flag that is not YYYY-MM-DD
    InvalidDate(String),
    /// Backend rejected the request
    Api(ApiError),
    /// Failed to start the async runtime
    Runtime(String),
}

impl std::fmt::Display for SpecialPriceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecialPriceError::NoProperty => write!(
                f,
                "No property id given. Pass one or set default_property in config."
            ),
            SpecialPriceError::InvalidDate(value) => {
                write!(f, "Invalid date '{}', expected YYYY-MM-DD", value)
            }
            SpecialPriceError::Api(e) => write!(f, "{}", e),
            SpecialPriceError::Runtime(e) => write!(f, "Failed to create runtime: {}", e),
        }
    }
}

impl std::error::Error for SpecialPriceError {}

impl From<ApiError> for SpecialPriceError {
    fn from(e: ApiError) -> Self {
        SpecialPriceError::Api(e)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, SpecialPriceError> {
    value
        .parse()
        .map_err(|_| SpecialPriceError::InvalidDate(value.to_string()))
}

async fn list(client: &ApiClient, property: i64) -> Result<(), SpecialPriceError> {
    let rooms = client.list_special_prices(property).await?;
    if rooms.is_empty() {
        println!("No rooms.");
        return Ok(());
    }
    for room in rooms {
        println!("{} (room {})", room.name, room.id);
        if room.special_prices.is_empty() {
            println!("  (no special prices)");
        }
        for price in &room.special_prices {
            println!("  {}", price);
        }
    }
    Ok(())
}

async fn create(client: &ApiClient, request: NewSpecialPrice) -> Result<(), SpecialPriceError> {
    client.create_special_price(&request).await?;
    println!(
        "✓ Special price created for room {} ({} to {})",
        request.room_id, request.start_date, request.end_date
    );
    Ok(())
}

async fn update(
    client: &ApiClient,
    id: i64,
    request: SpecialPriceUpdate,
) -> Result<(), SpecialPriceError> {
    client.update_special_price(id, &request).await?;
    println!("✓ Special price {} updated successfully!", id);
    Ok(())
}
