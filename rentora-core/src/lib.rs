//! Rentora Core Library
//!
//! Shared types and backend client for Rentora applications: domain
//! models, the typed API client, the image payload encoder, and the room
//! reconciliation workflow.

pub mod api;
pub mod image;
pub mod models;
pub mod reconcile;

pub use api::{ApiClient, ApiError};
pub use image::{decode_data_uri, encode_image, DecodeError, ImagePayload};
pub use models::{
    AuthSession, AuthUser, CategoryArea, ExistingRoom, ImageSource, LoginRequest, NewSpecialPrice,
    Role, Room, RoomDraft, RoomSpecialPrices, SpecialPrice, SpecialPriceUpdate,
};
pub use reconcile::{reconcile, ReconcileBatch, ReconcileError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
