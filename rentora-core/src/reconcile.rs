//! Room reconciliation: turning one submitted form into the backend
//! calls that realize it.
//!
//! A submission carries three collections - rooms added in the form,
//! edited rooms that already exist, and ids marked for deletion. Each
//! entry becomes one create, update, or delete request; all of them are
//! issued concurrently and the batch settles as a whole. There is no
//! rollback: operations that landed before a failure stay landed, and the
//! caller is expected to re-fetch the authoritative list afterwards.

use std::collections::HashSet;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::image::{encode_image, ImagePayload};
use crate::models::{ExistingRoom, ImageSource, RoomDraft};

/// Errors from submitting a reconciliation batch.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// An existing room id shows up in more than one of the update and
    /// delete target sets.
    #[error("room {0} is targeted by more than one operation in this batch")]
    ConflictingTargets(i64),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The create/update/delete work derived from one form submission.
///
/// Transient by design: built at submit time, consumed by [`reconcile`],
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileBatch {
    pub new_rooms: Vec<RoomDraft>,
    pub existing_rooms: Vec<ExistingRoom>,
    pub deleted_ids: Vec<i64>,
}

impl ReconcileBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.new_rooms.is_empty() && self.existing_rooms.is_empty() && self.deleted_ids.is_empty()
    }

    /// Number of network operations this batch will issue.
    pub fn len(&self) -> usize {
        self.new_rooms.len() + self.existing_rooms.len() + self.deleted_ids.len()
    }

    /// Every existing room id may appear in at most one of the update and
    /// delete target sets, and at most once in each.
    fn validate(&self) -> Result<(), ReconcileError> {
        let mut targets = HashSet::new();
        for room in &self.existing_rooms {
            if !targets.insert(room.id) {
                return Err(ReconcileError::ConflictingTargets(room.id));
            }
        }
        for &id in &self.deleted_ids {
            if !targets.insert(id) {
                return Err(ReconcileError::ConflictingTargets(id));
            }
        }
        Ok(())
    }
}

/// Submits a batch: all creates, updates, and deletes run concurrently
/// with no ordering guarantee, and the first failure rejects the whole
/// batch. An empty batch resolves immediately without touching the
/// network.
pub async fn reconcile(
    client: &ApiClient,
    property_id: i64,
    batch: &ReconcileBatch,
) -> Result<(), ReconcileError> {
    batch.validate()?;
    if batch.is_empty() {
        return Ok(());
    }

    let mut operations: Vec<BoxFuture<'_, Result<(), ApiError>>> =
        Vec::with_capacity(batch.len());

    for room in &batch.new_rooms {
        operations.push(
            async move {
                let image = encode_or_discard(&room.name, room.image.as_ref());
                client.create_room(property_id, room, image).await
            }
            .boxed(),
        );
    }
    for room in &batch.existing_rooms {
        operations.push(
            async move {
                let image = encode_or_discard(&room.draft.name, room.draft.image.as_ref());
                client
                    .update_room(room.id, property_id, &room.draft, image)
                    .await
            }
            .boxed(),
        );
    }
    for &id in &batch.deleted_ids {
        operations.push(async move { client.delete_room(id).await }.boxed());
    }

    try_join_all(operations).await?;
    Ok(())
}

/// A room whose image payload cannot be decoded is submitted without an
/// image instead of sinking the rest of the batch.
fn encode_or_discard(room: &str, source: Option<&ImageSource>) -> Option<ImagePayload> {
    match encode_image(source) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(room, "discarding unreadable image payload: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Multipart, Path};
    use axum::http::StatusCode;
    use axum::routing::{delete, patch, post};
    use axum::{Json, Router};

    #[derive(Clone, Default)]
    struct Counters {
        creates: Arc<AtomicUsize>,
        updates: Arc<AtomicUsize>,
        deletes: Arc<AtomicUsize>,
        files: Arc<AtomicUsize>,
    }

    impl Counters {
        fn total(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
                + self.updates.load(Ordering::SeqCst)
                + self.deletes.load(Ordering::SeqCst)
        }
    }

    async fn file_part_count(multipart: &mut Multipart) -> usize {
        let mut files = 0;
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("file") {
                files += 1;
            }
        }
        files
    }

    fn backend(counters: Counters) -> Router {
        let create = counters.clone();
        let update = counters.clone();
        let remove = counters.clone();
        Router::new()
            .route(
                "/room/create",
                post(move |mut multipart: Multipart| {
                    let counters = create.clone();
                    async move {
                        counters.creates.fetch_add(1, Ordering::SeqCst);
                        let files = file_part_count(&mut multipart).await;
                        counters.files.fetch_add(files, Ordering::SeqCst);
                        Json(serde_json::json!({ "message": "Room created" }))
                    }
                }),
            )
            .route(
                "/room/edit/{id}",
                patch(move |_id: Path<i64>, mut multipart: Multipart| {
                    let counters = update.clone();
                    async move {
                        counters.updates.fetch_add(1, Ordering::SeqCst);
                        let files = file_part_count(&mut multipart).await;
                        counters.files.fetch_add(files, Ordering::SeqCst);
                        Json(serde_json::json!({ "message": "Room updated" }))
                    }
                }),
            )
            .route(
                "/room/delete/{id}",
                delete(move |_id: Path<i64>| {
                    let counters = remove.clone();
                    async move {
                        counters.deletes.fetch_add(1, Ordering::SeqCst);
                        Json(serde_json::json!({ "message": "Room deleted" }))
                    }
                }),
            )
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn existing(id: i64, name: &str, price: i64, image: &str) -> ExistingRoom {
        ExistingRoom {
            id,
            draft: RoomDraft::new(name, price).with_image(ImageSource::from(image)),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_issues_no_calls() {
        // Unroutable base URL: any request would fail loudly.
        let client = ApiClient::new("http://127.0.0.1:1");
        let batch = ReconcileBatch::new();
        assert!(batch.is_empty());
        reconcile(&client, 7, &batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_conflicting_targets_fail_before_any_call() {
        let client = ApiClient::new("http://127.0.0.1:1");
        let batch = ReconcileBatch {
            new_rooms: Vec::new(),
            existing_rooms: vec![existing(1, "B", 200, "/static/b.png")],
            deleted_ids: vec![1],
        };
        let err = reconcile(&client, 7, &batch).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ConflictingTargets(1)));
    }

    #[tokio::test]
    async fn test_duplicate_delete_ids_rejected() {
        let client = ApiClient::new("http://127.0.0.1:1");
        let batch = ReconcileBatch {
            deleted_ids: vec![2, 2],
            ..ReconcileBatch::new()
        };
        let err = reconcile(&client, 7, &batch).await.unwrap_err();
        assert!(matches!(err, ReconcileError::ConflictingTargets(2)));
    }

    #[tokio::test]
    async fn test_mixed_batch_issues_one_call_per_entry() {
        let counters = Counters::default();
        let base = spawn(backend(counters.clone())).await;
        let client = ApiClient::new(base);

        // One create (no image), one update with a remote path (no upload),
        // one delete: the example scenario from the management form.
        let batch = ReconcileBatch {
            new_rooms: vec![RoomDraft::new("A", 100)],
            existing_rooms: vec![existing(1, "B", 200, "/static/b.png")],
            deleted_ids: vec![2],
        };
        reconcile(&client, 7, &batch).await.unwrap();

        assert_eq!(counters.creates.load(Ordering::SeqCst), 1);
        assert_eq!(counters.updates.load(Ordering::SeqCst), 1);
        assert_eq!(counters.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(counters.files.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_n_new_rooms_issue_n_creates() {
        let counters = Counters::default();
        let base = spawn(backend(counters.clone())).await;
        let client = ApiClient::new(base);

        let batch = ReconcileBatch {
            new_rooms: (0..5)
                .map(|i| RoomDraft::new(format!("Room {i}"), 100 + i))
                .collect(),
            ..ReconcileBatch::new()
        };
        reconcile(&client, 7, &batch).await.unwrap();
        assert_eq!(counters.creates.load(Ordering::SeqCst), 5);
        assert_eq!(counters.total(), 5);
    }

    #[tokio::test]
    async fn test_data_uri_image_is_uploaded() {
        let counters = Counters::default();
        let base = spawn(backend(counters.clone())).await;
        let client = ApiClient::new(base);

        let batch = ReconcileBatch {
            new_rooms: vec![
                RoomDraft::new("A", 100).with_image(ImageSource::from("data:image/png;base64,QQ==")),
            ],
            ..ReconcileBatch::new()
        };
        reconcile(&client, 7, &batch).await.unwrap();
        assert_eq!(counters.files.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_image_is_discarded_not_fatal() {
        let counters = Counters::default();
        let base = spawn(backend(counters.clone())).await;
        let client = ApiClient::new(base);

        let batch = ReconcileBatch {
            new_rooms: vec![
                RoomDraft::new("A", 100).with_image(ImageSource::from("data:image/png;base64")),
            ],
            ..ReconcileBatch::new()
        };
        reconcile(&client, 7, &batch).await.unwrap();
        assert_eq!(counters.creates.load(Ordering::SeqCst), 1);
        assert_eq!(counters.files.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_one_failure_rejects_the_batch() {
        let router = Router::new()
            .route(
                "/room/create",
                post(|mut multipart: Multipart| async move {
                    file_part_count(&mut multipart).await;
                    Json(serde_json::json!({ "message": "Room created" }))
                }),
            )
            .route(
                "/room/delete/{id}",
                delete(|_id: Path<i64>| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(serde_json::json!({ "message": "Room is still booked" })),
                    )
                }),
            );
        let base = spawn(router).await;
        let client = ApiClient::new(base);

        let batch = ReconcileBatch {
            new_rooms: vec![RoomDraft::new("A", 100)],
            existing_rooms: Vec::new(),
            deleted_ids: vec![2],
        };
        let err = reconcile(&client, 7, &batch).await.unwrap_err();
        assert!(err.to_string().contains("Room is still booked"));
    }
}
