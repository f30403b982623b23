//! Typed client for the Rentora backend REST API.
//!
//! The backend wraps payloads in a `{ data, message, accessToken }`
//! envelope and reports failures through a human-readable message field.
//! That field is not always present, so error extraction falls back
//! across the shapes the backend is known to produce.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;
