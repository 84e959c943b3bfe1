//! File-attachment metadata.
//!
//! Only metadata lives in the record store; the bytes themselves are handed
//! to a [`crate::blob::BlobStore`] and addressed by `bucket` + `object_key`.
//! Deleting the metadata does not delete the bytes — cleanup ordering is the
//! caller's responsibility.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one binary attachment of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
  pub file_id:      Uuid,
  pub document_id:  Uuid,
  pub file_name:    String,
  pub file_size:    u64,
  pub content_type: String,
  pub bucket:       String,
  pub object_key:   String,
  /// SHA-256 hex digest of the bytes, computed at upload time. Integrity is
  /// checked by re-deriving the digest from the stored bytes and comparing.
  pub content_hash: String,
  /// Hex signature over `content_hash`, produced by the external signer.
  pub signature:    Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::add_file`]. Recorded only after the
/// bytes are uploaded and the object key is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileRecord {
  pub document_id:  Uuid,
  pub file_name:    String,
  pub file_size:    u64,
  pub content_type: String,
  pub bucket:       String,
  pub object_key:   String,
  pub content_hash: String,
}
