mod auth;
mod category_area;
mod config_cmd;
mod room;
mod special_price;

pub use auth::AuthCommand;
pub use category_area::CategoryAreaCommand;
pub use config_cmd::ConfigCommand;
pub use room::RoomCommand;
pub use special_price::SpecialPriceCommand;

use rentora_core::ApiClient;

use crate::config::Config;

/// Builds an API client from configuration, attaching the stored token.
pub(crate) fn api_client(config: &Config) -> ApiClient {
    tracing::debug!(server_url = %config.server_url.value, "using backend");
    let client = ApiClient::new(config.server_url.value.clone());
    match &config.access_token {
        Some(token) => client.with_token(token.clone()),
        None => client,
    }
}
