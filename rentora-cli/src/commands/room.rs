//! Room management commands.
//!
//! Single-room operations map straight onto the backend endpoints. The
//! `apply` subcommand loads a room plan file and submits the whole batch
//! through the reconciliation workflow, then re-fetches the server's
//! list so the output reflects what actually landed.

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{Args, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use rentora_core::{
    reconcile, ApiClient, ApiError, ExistingRoom, ImageSource, ReconcileBatch, ReconcileError,
    Room, RoomDraft,
};

use crate::commands::api_client;
use crate::config::Config;

/// Image formats accepted for upload.
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Manage rooms for a property
#[derive(Args)]
pub struct RoomCommand {
    #[command(subcommand)]
    pub command: RoomSubcommand,
}

#[derive(Subcommand)]
pub enum RoomSubcommand {
    /// List rooms for a property
    List {
        /// Property id (defaults to the configured property)
        property: Option<i64>,
    },
    /// Create a single room
    Create {
        /// Room name
        name: String,
        /// Nightly base price
        #[arg(long)]
        price: i64,
        /// Room description
        #[arg(long, default_value = "")]
        description: String,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
        /// Property id (defaults to the configured property)
        #[arg(long, short)]
        property: Option<i64>,
    },
    /// Update an existing room
    Update {
        /// Room id
        room_id: i64,
        /// Room name
        #[arg(long)]
        name: String,
        /// Nightly base price
        #[arg(long)]
        price: i64,
        /// Room description
        #[arg(long, default_value = "")]
        description: String,
        /// Replacement image file; omit to keep the current image
        #[arg(long)]
        image: Option<PathBuf>,
        /// Property id (defaults to the configured property)
        #[arg(long, short)]
        property: Option<i64>,
    },
    /// Delete a room
    Delete {
        /// Room id
        room_id: i64,
    },
    /// Apply a room plan file (batched create/update/delete)
    Apply {
        /// Path to the plan file (YAML)
        plan: PathBuf,
        /// Property id (defaults to the configured property)
        #[arg(long, short)]
        property: Option<i64>,
    },
}

impl RoomCommand {
    pub fn run(&self, config: &Config) -> Result<(), RoomError> {
        let rt =
            tokio::runtime::Runtime::new().map_err(|e| RoomError::Runtime(e.to_string()))?;
        let client = api_client(config);

        match &self.command {
            RoomSubcommand::List { property } => {
                let property = resolve_property(*property, config)?;
                rt.block_on(list(&client, property))
            }
            RoomSubcommand::Create {
                name,
                price,
                description,
                image,
                property,
            } => {
                let property = resolve_property(*property, config)?;
                let draft = draft_from_flags(name, *price, description, image.as_deref())?;
                rt.block_on(create(&client, property, draft))
            }
            RoomSubcommand::Update {
                room_id,
                name,
                price,
                description,
                image,
                property,
            } => {
                let property = resolve_property(*property, config)?;
                let draft = draft_from_flags(name, *price, description, image.as_deref())?;
                rt.block_on(update(&client, property, *room_id, draft))
            }
            RoomSubcommand::Delete { room_id } => rt.block_on(delete(&client, *room_id)),
            RoomSubcommand::Apply { plan, property } => {
                let property = resolve_property(*property, config)?;
                rt.block_on(apply(&client, property, plan))
            }
        }
    }
}

/// Errors that can occur while managing rooms
#[derive(Debug)]
pub enum RoomError {
    /// No property id given and none configured
    NoProperty,
    /// Failed to read a local file
    Io(PathBuf, std::io::Error),
    /// Failed to parse a room plan file
    Plan(PathBuf, serde_yaml::Error),
    /// Image file with an extension the backend does not accept
    UnsupportedImage(PathBuf),
    /// Backend rejected the request
    Api(ApiError),
    /// Batch submission failed
    Reconcile(ReconcileError),
    /// Failed to start the async runtime
    Runtime(String),
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomError::NoProperty => write!(
                f,
                "No property id given. Pass one or set default_property in config."
            ),
            RoomError::Io(path, e) => write!(f, "Failed to read '{}': {}", path.display(), e),
            RoomError::Plan(path, e) => {
                write!(f, "Failed to parse plan file '{}': {}", path.display(), e)
            }
            RoomError::UnsupportedImage(path) => write!(
                f,
                "Unsupported image '{}'. Supported formats: {}",
                path.display(),
                SUPPORTED_FORMATS.join(", ")
            ),
            RoomError::Api(e) => write!(f, "{}", e),
            RoomError::Reconcile(e) => write!(f, "{}", e),
            RoomError::Runtime(e) => write!(f, "Failed to create runtime: {}", e),
        }
    }
}

impl std::error::Error for RoomError {}

impl From<ApiError> for RoomError {
    fn from(e: ApiError) -> Self {
        RoomError::Api(e)
    }
}

impl From<ReconcileError> for RoomError {
    fn from(e: ReconcileError) -> Self {
        RoomError::Reconcile(e)
    }
}

fn resolve_property(explicit: Option<i64>, config: &Config) -> Result<i64, RoomError> {
    explicit
        .or(config.default_property)
        .ok_or(RoomError::NoProperty)
}

async fn list(client: &ApiClient, property: i64) -> Result<(), RoomError> {
    let rooms = client.list_rooms(property).await?;
    print_rooms(&rooms);
    Ok(())
}

async fn create(client: &ApiClient, property: i64, draft: RoomDraft) -> Result<(), RoomError> {
    let image = rentora_core::encode_image(draft.image.as_ref())
        .map_err(|e| RoomError::Api(ApiError::Request(e.to_string())))?;
    client.create_room(property, &draft, image).await?;
    println!("✓ Room '{}' created successfully!", draft.name);
    Ok(())
}

async fn update(
    client: &ApiClient,
    property: i64,
    room_id: i64,
    draft: RoomDraft,
) -> Result<(), RoomError> {
    let image = rentora_core::encode_image(draft.image.as_ref())
        .map_err(|e| RoomError::Api(ApiError::Request(e.to_string())))?;
    client.update_room(room_id, property, &draft, image).await?;
    println!("✓ Room {} updated successfully!", room_id);
    Ok(())
}

async fn delete(client: &ApiClient, room_id: i64) -> Result<(), RoomError> {
    client.delete_room(room_id).await?;
    println!("✓ Room {} deleted successfully!", room_id);
    Ok(())
}

async fn apply(client: &ApiClient, property: i64, plan_path: &Path) -> Result<(), RoomError> {
    let contents = std::fs::read_to_string(plan_path)
        .map_err(|e| RoomError::Io(plan_path.to_path_buf(), e))?;
    let plan: RoomPlan = serde_yaml::from_str(&contents)
        .map_err(|e| RoomError::Plan(plan_path.to_path_buf(), e))?;
    let batch = plan.into_batch();

    if batch.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    println!("Submitting {} operation(s)...", batch.len());
    reconcile(client, property, &batch).await?;

    // The batch has no partial-success reporting, so the server's list is
    // the only source of truth afterwards.
    let rooms = client.list_rooms(property).await?;
    println!("✓ Rooms updated successfully!");
    println!();
    print_rooms(&rooms);
    Ok(())
}

fn print_rooms(rooms: &[Room]) {
    if rooms.is_empty() {
        println!("No rooms.");
        return;
    }
    println!("{:<6} {:<24} {:>10}  {}", "ID", "NAME", "PRICE", "IMAGE");
    for room in rooms {
        println!(
            "{:<6} {:<24} {:>10}  {}",
            room.id,
            room.name,
            room.price,
            room.room_image.as_deref().unwrap_or("-")
        );
    }
}

fn draft_from_flags(
    name: &str,
    price: i64,
    description: &str,
    image: Option<&Path>,
) -> Result<RoomDraft, RoomError> {
    let mut draft = RoomDraft::new(name, price).with_description(description);
    if let Some(path) = image {
        draft = draft.with_image(ImageSource::from(image_to_data_uri(path)?));
    }
    Ok(draft)
}

/// Reads a local image file into the data-URI form the upload encoder
/// expects.
fn image_to_data_uri(path: &Path) -> Result<String, RoomError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => return Err(RoomError::UnsupportedImage(path.to_path_buf())),
    };
    let bytes = std::fs::read(path).map_err(|e| RoomError::Io(path.to_path_buf(), e))?;
    Ok(format!("data:{};base64,{}", media_type, STANDARD.encode(&bytes)))
}

/// A room plan file: the three collections one form submission carries.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RoomPlan {
    new: Vec<RoomDraft>,
    existing: Vec<ExistingRoom>,
    deleted: Vec<i64>,
}

impl RoomPlan {
    fn into_batch(self) -> ReconcileBatch {
        ReconcileBatch {
            new_rooms: self.new,
            existing_rooms: self.existing,
            deleted_ids: self.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_plan_file_parses_all_sections() {
        let yaml = r#"
new:
  - name: A
    base_price: 100
existing:
  - id: 1
    name: B
    base_price: 200
    image: /static/b.png
deleted: [2]
"#;
        let plan: RoomPlan = serde_yaml::from_str(yaml).unwrap();
        let batch = plan.into_batch();
        assert_eq!(batch.new_rooms.len(), 1);
        assert_eq!(batch.existing_rooms.len(), 1);
        assert_eq!(batch.deleted_ids, vec![2]);
        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.existing_rooms[0].draft.image,
            Some(ImageSource::Remote("/static/b.png".into()))
        );
    }

    #[test]
    fn test_plan_file_sections_optional() {
        let plan: RoomPlan = serde_yaml::from_str("deleted: [4, 5]\n").unwrap();
        let batch = plan.into_batch();
        assert!(batch.new_rooms.is_empty());
        assert_eq!(batch.deleted_ids, vec![4, 5]);
    }

    #[test]
    fn test_plan_file_rejects_unknown_sections() {
        let result: Result<RoomPlan, _> = serde_yaml::from_str("removed: [1]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_image_to_data_uri() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("room.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x41]).unwrap();

        let uri = image_to_data_uri(&path).unwrap();
        assert_eq!(uri, "data:image/png;base64,QQ==");

        let payload = rentora_core::decode_data_uri(&uri).unwrap();
        assert_eq!(payload.bytes, vec![0x41]);
        assert_eq!(payload.content_type, "image/png");
    }

    #[test]
    fn test_unsupported_image_extension() {
        let err = image_to_data_uri(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, RoomError::UnsupportedImage(_)));
    }
}
