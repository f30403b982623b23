//! Image payload encoding for room uploads.
//!
//! Form input carries images as `data:` URIs; images the server already
//! holds are plain paths. Only data URIs produce an upload payload - a
//! remote path means the server keeps whatever it has.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::models::ImageSource;

/// Errors from turning a data URI into upload bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("data URI is missing the comma separator")]
    MissingSeparator,
    #[error("unsupported data URI header: {0}")]
    UnsupportedHeader(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Decoded image bytes ready for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    /// Media type taken from the data URI header, e.g. `image/png`.
    pub content_type: String,
}

impl ImagePayload {
    /// Filename for the multipart `file` part, derived from the content
    /// type.
    pub fn file_name(&self) -> String {
        let ext = match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        };
        format!("room.{ext}")
    }
}

/// Encodes an optional image source into an upload payload.
///
/// `None` and remote paths encode to `Ok(None)`: nothing to upload.
pub fn encode_image(source: Option<&ImageSource>) -> Result<Option<ImagePayload>, DecodeError> {
    match source {
        None | Some(ImageSource::Remote(_)) => Ok(None),
        Some(ImageSource::DataUri(uri)) => decode_data_uri(uri).map(Some),
    }
}

/// Splits a `data:<media-type>;base64,<payload>` string and decodes the
/// payload. The media type is read from the header rather than assumed.
pub fn decode_data_uri(uri: &str) -> Result<ImagePayload, DecodeError> {
    let (header, payload) = uri.split_once(',').ok_or(DecodeError::MissingSeparator)?;
    let content_type = content_type_of(header)?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    Ok(ImagePayload {
        bytes,
        content_type,
    })
}

fn content_type_of(header: &str) -> Result<String, DecodeError> {
    let unsupported = || DecodeError::UnsupportedHeader(header.to_string());
    let rest = header.strip_prefix("data:").ok_or_else(unsupported)?;
    let media_type = rest.strip_suffix(";base64").ok_or_else(unsupported)?;
    // Anything that would not survive as a MIME header is rejected here,
    // before it reaches the request builder.
    if media_type.is_empty()
        || !media_type.contains('/')
        || media_type.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(unsupported());
    }
    Ok(media_type.to_string())
}
