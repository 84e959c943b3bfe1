//! Handlers for file-attachment endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/documents/:id/files` | Metadata, newest first |
//! | `POST`   | `/documents/:id/files?file_name=` | Raw body upload |
//! | `GET`    | `/files/:id` | Metadata only |
//! | `DELETE` | `/files/:id` | 204; removes metadata then bytes |
//! | `GET`    | `/files/:id/content` | The stored bytes |
//! | `GET`    | `/files/:id/integrity` | Re-hash and compare |
//! | `POST`   | `/files/:id/signature` | Sign the content hash |
//!
//! Uploads hash the bytes, write them to the blob store, and only then record
//! the metadata — a failed metadata write never leaves a dangling record.

use acta_core::{
  Error as CoreError,
  blob::BlobStore,
  file::{FileRecord, NewFileRecord},
  store::RecordStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

/// SHA-256 of `bytes` as lowercase hex.
fn sha256_hex(bytes: &[u8]) -> String {
  hex::encode(Sha256::digest(bytes))
}

// ─── List / upload ───────────────────────────────────────────────────────────

/// `GET /documents/:id/files`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<FileRecord>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let files = state
    .store
    .files_for_document(document_id)
    .await
    .map_err(store_err)?;
  Ok(Json(files))
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub file_name: String,
}

/// `POST /documents/:id/files?file_name=<name>` — body: the raw bytes.
///
/// `Content-Type` of the request is recorded as the attachment's media type.
pub async fn upload<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(document_id): Path<Uuid>,
  Query(params): Query<UploadParams>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  if params.file_name.trim().is_empty() {
    return Err(ApiError::BadRequest("file_name must not be empty".into()));
  }
  let content_type = headers
    .get(header::CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("application/octet-stream")
    .to_owned();

  let content_hash = sha256_hex(&body);
  let object_key = format!("{document_id}/{}", Uuid::new_v4());

  state
    .blobs
    .put(state.bucket.clone(), object_key.clone(), body.to_vec())
    .await
    .map_err(ApiError::blob)?;

  let record = state
    .store
    .add_file(NewFileRecord {
      document_id,
      file_name: params.file_name,
      file_size: body.len() as u64,
      content_type,
      bucket: state.bucket.clone(),
      object_key: object_key.clone(),
      content_hash,
    })
    .await;

  match record {
    Ok(record) => Ok((StatusCode::CREATED, Json(record))),
    Err(e) => {
      // Metadata write failed; the orphaned object is reclaimed here.
      let _ = state.blobs.delete(state.bucket.clone(), object_key).await;
      Err(store_err(e))
    }
  }
}

// ─── Single-file operations ──────────────────────────────────────────────────

async fn fetch_record<S, B>(
  state: &ApiState<S, B>,
  id: Uuid,
) -> Result<FileRecord, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  state
    .store
    .get_file(id)
    .await
    .map_err(store_err)?
    .ok_or(ApiError::Store(CoreError::FileNotFound(id)))
}

/// `GET /files/:id`
pub async fn get_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FileRecord>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  Ok(Json(fetch_record(&state, id).await?))
}

/// `DELETE /files/:id` — idempotent. Metadata goes first so a failed blob
/// delete can never resurrect a half-deleted attachment.
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let record = state.store.get_file(id).await.map_err(store_err)?;
  state.store.delete_file(id).await.map_err(store_err)?;
  if let Some(record) = record {
    state
      .blobs
      .delete(record.bucket, record.object_key)
      .await
      .map_err(ApiError::blob)?;
  }
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /files/:id/content`
pub async fn content<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let record = fetch_record(&state, id).await?;
  let bytes = state
    .blobs
    .get(record.bucket.clone(), record.object_key.clone())
    .await
    .map_err(ApiError::blob)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "object {}/{} is missing from storage",
        record.bucket, record.object_key
      ))
    })?;
  Ok(([(header::CONTENT_TYPE, record.content_type)], bytes))
}

// ─── Integrity ───────────────────────────────────────────────────────────────

/// Result of re-deriving an attachment's hash from the stored bytes.
#[derive(Debug, Serialize)]
pub struct IntegrityReport {
  pub file_id:       Uuid,
  pub content_hash:  String,
  pub computed_hash: String,
  pub valid:         bool,
}

/// `GET /files/:id/integrity`
pub async fn integrity<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<Json<IntegrityReport>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let record = fetch_record(&state, id).await?;
  let bytes = state
    .blobs
    .get(record.bucket.clone(), record.object_key.clone())
    .await
    .map_err(ApiError::blob)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "object {}/{} is missing from storage",
        record.bucket, record.object_key
      ))
    })?;

  let computed_hash = sha256_hex(&bytes);
  let valid = computed_hash == record.content_hash;
  Ok(Json(IntegrityReport {
    file_id: id,
    content_hash: record.content_hash,
    computed_hash,
    valid,
  }))
}

// ─── Signature ───────────────────────────────────────────────────────────────

/// `POST /files/:id/signature` — sign the stored content hash with the
/// configured external signer.
pub async fn sign<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FileRecord>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let record = fetch_record(&state, id).await?;
  let digest = hex::decode(&record.content_hash).map_err(|_| {
    ApiError::BadRequest("stored content hash is not valid hex".into())
  })?;

  let signature = state.signer.sign(&digest)?;
  let signed = state
    .store
    .set_file_signature(id, hex::encode(signature))
    .await
    .map_err(store_err)?;
  Ok(Json(signed))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sha256_hex_known_vector() {
    assert_eq!(
      sha256_hex(b"abc"),
      "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
  }

  #[test]
  fn sha256_hex_empty_input() {
    assert_eq!(
      sha256_hex(b""),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }
}
