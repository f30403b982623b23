use serde::{Deserialize, Serialize};
use std::fmt;

/// A room record as persisted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    /// Server-side path of the room image, e.g. `/static/b.png`.
    #[serde(default)]
    pub room_image: Option<String>,
}

impl Room {
    /// Turns the persisted record into an editable draft. The image comes
    /// back as a remote path, so resubmitting without changes uploads
    /// nothing.
    pub fn to_draft(&self) -> RoomDraft {
        RoomDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            base_price: self.price,
            image: self.room_image.clone().map(ImageSource::from),
        }
    }

    pub fn to_existing(&self) -> ExistingRoom {
        ExistingRoom {
            id: self.id,
            draft: self.to_draft(),
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({})", self.id, self.name, self.price)?;
        if let Some(image) = &self.room_image {
            write!(f, " [{}]", image)?;
        }
        Ok(())
    }
}

/// A room as collected from user input, before the backend has assigned
/// an identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: i64,
    #[serde(default)]
    pub image: Option<ImageSource>,
}

impl RoomDraft {
    pub fn new(name: impl Into<String>, base_price: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            base_price,
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }
}

/// An edited room that already exists on the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExistingRoom {
    pub id: i64,
    #[serde(flatten)]
    pub draft: RoomDraft,
}

/// Where a room image comes from.
///
/// Form input arrives as a single string: freshly picked images are
/// `data:` URIs, images the server already holds are plain paths. The
/// distinction decides whether an upload is attached to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSource {
    /// A `data:<media-type>;base64,<payload>` string carrying new bytes.
    DataUri(String),
    /// A path already persisted on the server, kept as-is on update.
    Remote(String),
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::DataUri(s) | ImageSource::Remote(s) => s,
        }
    }

    pub fn is_data_uri(&self) -> bool {
        matches!(self, ImageSource::DataUri(_))
    }
}

impl From<String> for ImageSource {
    fn from(value: String) -> Self {
        if value.starts_with("data:") {
            ImageSource::DataUri(value)
        } else {
            ImageSource::Remote(value)
        }
    }
}

impl From<&str> for ImageSource {
    fn from(value: &str) -> Self {
        ImageSource::from(value.to_string())
    }
}

impl From<ImageSource> for String {
    fn from(value: ImageSource) -> Self {
        match value {
            ImageSource::DataUri(s) | ImageSource::Remote(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_json_shape() {
        let json = r#"{"id":1,"name":"B","description":"Twin","price":200,"roomImage":"/static/b.png"}"#;
        let room: Room = serde_json::from_str(json).unwrap();
        assert_eq!(room.id, 1);
        assert_eq!(room.price, 200);
        assert_eq!(room.room_image.as_deref(), Some("/static/b.png"));
    }

    #[test]
    fn test_room_without_image() {
        let json = r#"{"id":2,"name":"C","price":150}"#;
        let room: Room = serde_json::from_str(json).unwrap();
        assert!(room.room_image.is_none());
        assert!(room.description.is_empty());
    }

    #[test]
    fn test_to_draft_keeps_image_remote() {
        let room = Room {
            id: 1,
            name: "B".into(),
            description: String::new(),
            price: 200,
            room_image: Some("/static/b.png".into()),
        };
        let draft = room.to_draft();
        assert_eq!(draft.image, Some(ImageSource::Remote("/static/b.png".into())));
        assert!(!draft.image.unwrap().is_data_uri());
    }

    #[test]
    fn test_image_source_classification() {
        assert!(ImageSource::from("data:image/png;base64,QQ==").is_data_uri());
        assert!(!ImageSource::from("/static/b.png").is_data_uri());
        assert!(!ImageSource::from("uploads/room.jpg").is_data_uri());
    }

    #[test]
    fn test_image_source_string_roundtrip() {
        let source = ImageSource::from("data:image/png;base64,QQ==");
        let s: String = source.clone().into();
        assert_eq!(ImageSource::from(s), source);
    }

    #[test]
    fn test_draft_builder() {
        let draft = RoomDraft::new("A", 100)
            .with_description("Single bed")
            .with_image(ImageSource::from("data:image/png;base64,QQ=="));
        assert_eq!(draft.name, "A");
        assert_eq!(draft.base_price, 100);
        assert!(draft.image.unwrap().is_data_uri());
    }

    #[test]
    fn test_existing_room_flattens() {
        let json = r#"{"id":3,"name":"Deluxe","base_price":320,"image":"/static/deluxe.png"}"#;
        let existing: ExistingRoom = serde_json::from_str(json).unwrap();
        assert_eq!(existing.id, 3);
        assert_eq!(existing.draft.name, "Deluxe");
        assert_eq!(
            existing.draft.image,
            Some(ImageSource::Remote("/static/deluxe.png".into()))
        );
    }
}
