use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use super::error::{extract_message, ApiError};
use crate::image::ImagePayload;
use crate::models::{
    AuthSession, AuthUser, CategoryArea, LoginRequest, NewSpecialPrice, Room, RoomDraft,
    RoomSpecialPrices, SpecialPriceUpdate,
};

/// Response envelope the backend wraps every JSON payload in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(rename = "accessToken", default)]
    access_token: Option<String>,
}

/// Async client for the property-rental backend.
///
/// Holds a normalized base URL and an optional bearer token; each method
/// maps one endpoint the management screens use.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: None,
        }
    }

    /// Attaches a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.access_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    /// Executes a request and maps non-2xx responses to `ApiError::Server`
    /// with a defensively extracted message.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: extract_message(status.as_u16(), &body),
        })
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// `POST /auth/login`. The session token comes back on the envelope,
    /// next to the user record.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession, ApiError> {
        let response = self
            .send(self.request(Method::POST, "/auth/login").json(request))
            .await?;
        let envelope: Envelope<AuthUser> = Self::read_envelope(response).await?;
        let user = envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse("login response carried no user".into()))?;
        let access_token = envelope.access_token.ok_or_else(|| {
            ApiError::InvalidResponse("login response carried no access token".into())
        })?;
        Ok(AuthSession { user, access_token })
    }

    /// `GET /room/all/{propertyId}`.
    pub async fn list_rooms(&self, property_id: i64) -> Result<Vec<Room>, ApiError> {
        let response = self
            .send(self.request(Method::GET, &format!("/room/all/{property_id}")))
            .await?;
        let envelope: Envelope<Vec<Room>> = Self::read_envelope(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `POST /room/create`, multipart. Creates are tagged with an
    /// idempotency key so a re-submitted form cannot double-create.
    pub async fn create_room(
        &self,
        property_id: i64,
        draft: &RoomDraft,
        image: Option<ImagePayload>,
    ) -> Result<(), ApiError> {
        tracing::debug!(property_id, room = %draft.name, "creating room");
        let form = room_form(property_id, draft, image)?;
        self.send(
            self.request(Method::POST, "/room/create")
                .header("X-Idempotency-Key", Uuid::new_v4().to_string())
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    /// `PATCH /room/edit/{id}`, multipart. No `file` part means the server
    /// keeps the image it already has.
    pub async fn update_room(
        &self,
        room_id: i64,
        property_id: i64,
        draft: &RoomDraft,
        image: Option<ImagePayload>,
    ) -> Result<(), ApiError> {
        tracing::debug!(room_id, property_id, "updating room");
        let form = room_form(property_id, draft, image)?;
        self.send(
            self.request(Method::PATCH, &format!("/room/edit/{room_id}"))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    /// `DELETE /room/delete/{id}`.
    pub async fn delete_room(&self, room_id: i64) -> Result<(), ApiError> {
        tracing::debug!(room_id, "deleting room");
        self.send(self.request(Method::DELETE, &format!("/room/delete/{room_id}")))
            .await?;
        Ok(())
    }

    /// `GET /category-area/mine`.
    pub async fn list_category_areas(&self) -> Result<Vec<CategoryArea>, ApiError> {
        let response = self
            .send(self.request(Method::GET, "/category-area/mine"))
            .await?;
        let envelope: Envelope<Vec<CategoryArea>> = Self::read_envelope(response).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `POST /category-area/create`.
    pub async fn create_category_area(&self, name: &str) -> Result<(), ApiError> {
        let response = self
            .send(
                self.request(Method::POST, "/category-area/create")
                    .json(&serde_json::json!({ "categoryArea": name })),
            )
            .await?;
        confirm_success(response).await
    }

    /// `PATCH /category-area/edit/{id}`.
    pub async fn rename_category_area(&self, id: i64, new_name: &str) -> Result<(), ApiError> {
        let response = self
            .send(
                self.request(Method::PATCH, &format!("/category-area/edit/{id}"))
                    .json(&serde_json::json!({ "newName": new_name })),
            )
            .await?;
        confirm_success(response).await
    }

    /// `DELETE /category-area/delete/{id}`.
    pub async fn delete_category_area(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .send(self.request(Method::DELETE, &format!("/category-area/delete/{id}")))
            .await?;
        confirm_success(response).await
    }

    /// `GET /special-price/all/{propertyId}`. Each room's overrides come
    /// back most recently updated first.
    pub async fn list_special_prices(
        &self,
        property_id: i64,
    ) -> Result<Vec<RoomSpecialPrices>, ApiError> {
        let response = self
            .send(self.request(Method::GET, &format!("/special-price/all/{property_id}")))
            .await?;
        let envelope: Envelope<Vec<RoomSpecialPrices>> = Self::read_envelope(response).await?;
        let mut rooms = envelope.data.unwrap_or_default();
        for room in &mut rooms {
            room.sort_recent_first();
        }
        Ok(rooms)
    }

    /// `POST /special-price/create`.
    pub async fn create_special_price(&self, request: &NewSpecialPrice) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, "/special-price/create")
                .json(request),
        )
        .await?;
        Ok(())
    }

    /// `PATCH /special-price/edit/{id}`.
    pub async fn update_special_price(
        &self,
        id: i64,
        request: &SpecialPriceUpdate,
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/special-price/edit/{id}"))
                .json(request),
        )
        .await?;
        Ok(())
    }
}

/// Builds the multipart form shared by room create and edit.
fn room_form(
    property_id: i64,
    draft: &RoomDraft,
    image: Option<ImagePayload>,
) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("propId", property_id.to_string())
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("price", draft.base_price.to_string());
    if let Some(payload) = image {
        let file_name = payload.file_name();
        let content_type = payload.content_type.clone();
        let part = Part::bytes(payload.bytes)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| ApiError::Request(e.to_string()))?;
        form = form.part("file", part);
    }
    Ok(form)
}

/// Category-area mutations answer 2xx with an outcome message; anything
/// that does not read as a success is a rejection.
async fn confirm_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status().as_u16();
    let envelope: Envelope<serde_json::Value> = ApiClient::read_envelope(response).await?;
    let message = envelope.message.unwrap_or_default();
    if message.to_lowercase().contains("success") {
        return Ok(());
    }
    Err(ApiError::Server {
        status,
        message: if message.is_empty() {
            "server did not confirm the operation".to_string()
        } else {
            message
        },
    })
}
