//! Authentication commands for the Rentora CLI.
//!
//! Provides login, logout, and status commands. Logging in stores the
//! backend's access token in the config file; every other command picks
//! it up from there.

use clap::{Args, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rentora_core::{ApiError, LoginRequest, Role};

use crate::commands::api_client;
use crate::config::Config;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Log in with email and password
    Login {
        /// Account email (prompted for when omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Role to authenticate as: 'tenant' or 'user'
        #[arg(long, default_value = "tenant")]
        role: String,
    },
    /// Log out (remove access token from config)
    Logout,
    /// Show authentication status
    Status,
}

impl AuthCommand {
    pub fn run(&self, config: &Config, cli_config_path: Option<PathBuf>) -> Result<(), AuthError> {
        match &self.command {
            AuthSubcommand::Login {
                email,
                password,
                role,
            } => {
                let rt = tokio::runtime::Runtime::new()
                    .map_err(|e| AuthError::Runtime(e.to_string()))?;
                let role = role
                    .parse::<Role>()
                    .map_err(|e| AuthError::Config(e.to_string()))?;
                rt.block_on(login(
                    config,
                    cli_config_path,
                    email.as_deref(),
                    password.as_deref(),
                    role,
                ))
            }
            AuthSubcommand::Logout => logout(config, cli_config_path),
            AuthSubcommand::Status => status(config),
        }
    }
}

/// Errors that can occur during authentication
#[derive(Debug)]
pub enum AuthError {
    /// I/O error
    Io(io::Error),
    /// Backend rejected the request
    Api(ApiError),
    /// Logged in with the wrong account kind
    RoleMismatch { expected: Role, actual: Role },
    /// Config file error
    Config(String),
    /// Failed to start the async runtime
    Runtime(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Io(e) => write!(f, "I/O error: {}", e),
            AuthError::Api(e) => write!(f, "{}", e),
            AuthError::RoleMismatch { expected, actual } => write!(
                f,
                "This account holds the {} role, not {}. Make sure you are using the right account.",
                actual, expected
            ),
            AuthError::Config(e) => write!(f, "Config error: {}", e),
            AuthError::Runtime(e) => write!(f, "Failed to create runtime: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self {
        AuthError::Io(e)
    }
}

impl From<ApiError> for AuthError {
    fn from(e: ApiError) -> Self {
        AuthError::Api(e)
    }
}

/// Interactive login flow
async fn login(
    config: &Config,
    cli_config_path: Option<PathBuf>,
    email: Option<&str>,
    password: Option<&str>,
    role: Role,
) -> Result<(), AuthError> {
    let email = match email {
        Some(e) => e.to_string(),
        None => prompt("Enter your email: ")?,
    };
    if email.is_empty() {
        return Err(AuthError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Email cannot be empty",
        )));
    }
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("Enter your password: ")?,
    };

    let client = api_client(config);
    let session = client
        .login(&LoginRequest {
            email,
            password,
            role,
        })
        .await?;

    // The backend hands back whatever account matched; a renter account
    // cannot manage properties, so refuse to store its token.
    if session.user.role != role {
        return Err(AuthError::RoleMismatch {
            expected: role,
            actual: session.user.role,
        });
    }

    let config_path = config_file_path(config, cli_config_path);
    save_access_token(&session.access_token, &config_path)?;

    let display_name = session
        .user
        .name
        .as_deref()
        .unwrap_or(&session.user.email)
        .to_string();
    println!("✓ Logged in as {}", display_name);
    Ok(())
}

fn prompt(label: &str) -> Result<String, io::Error> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Path the token should be written to: explicit --config beats the file
/// the config was loaded from, which beats the default location.
fn config_file_path(config: &Config, cli_config_path: Option<PathBuf>) -> PathBuf {
    cli_config_path
        .or_else(|| config.config_file.clone())
        .unwrap_or_else(Config::default_config_path)
}

/// Save access token to config file
fn save_access_token(token: &str, config_path: &Path) -> Result<(), AuthError> {
    // Read existing config or create new
    let mut config: serde_yaml::Value = if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| AuthError::Config(e.to_string()))?;
        serde_yaml::from_str(&contents).map_err(|e| AuthError::Config(e.to_string()))?
    } else {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    };

    let mapping = config
        .as_mapping_mut()
        .ok_or_else(|| AuthError::Config("Invalid config format".to_string()))?;
    mapping.insert(
        serde_yaml::Value::String("access_token".to_string()),
        serde_yaml::Value::String(token.to_string()),
    );

    // Create config directory if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AuthError::Config(e.to_string()))?;
    }

    let yaml = serde_yaml::to_string(&config).map_err(|e| AuthError::Config(e.to_string()))?;
    std::fs::write(config_path, yaml).map_err(|e| AuthError::Config(e.to_string()))?;

    Ok(())
}

/// Remove access token from config
fn logout(config: &Config, cli_config_path: Option<PathBuf>) -> Result<(), AuthError> {
    let config_path = config_file_path(config, cli_config_path);

    if !config_path.exists() {
        println!("Already logged out (no config file).");
        return Ok(());
    }

    let contents =
        std::fs::read_to_string(&config_path).map_err(|e| AuthError::Config(e.to_string()))?;
    let mut yaml: serde_yaml::Value =
        serde_yaml::from_str(&contents).map_err(|e| AuthError::Config(e.to_string()))?;

    if let Some(mapping) = yaml.as_mapping_mut() {
        mapping.remove(serde_yaml::Value::String("access_token".to_string()));
    }

    let yaml_str =
        serde_yaml::to_string(&yaml).map_err(|e| AuthError::Config(e.to_string()))?;
    std::fs::write(&config_path, yaml_str).map_err(|e| AuthError::Config(e.to_string()))?;

    println!("Logged out.");
    Ok(())
}

/// Show authentication status
fn status(config: &Config) -> Result<(), AuthError> {
    match &config.access_token {
        Some(token) => {
            // Mask the token for display
            let masked = if token.len() > 8 {
                format!("{}...{}", &token[..4], &token[token.len() - 4..])
            } else {
                "****".to_string()
            };
            println!("Logged in (token: {})", masked);
            println!("Server: {}", config.server_url.value);
        }
        None => {
            println!("Not logged in. Run 'rentora auth login' to authenticate.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_token_creates_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        save_access_token("token-123", &config_path).unwrap();

        let contents = std::fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("access_token: token-123"));
    }

    #[test]
    fn test_save_token_preserves_other_keys() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "server_url: https://api.example.com\n").unwrap();

        save_access_token("token-123", &config_path).unwrap();

        let contents = std::fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("server_url: https://api.example.com"));
        assert!(contents.contains("access_token: token-123"));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        save_access_token("token-456", &config_path).unwrap();
        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("token-456"));
    }
}
