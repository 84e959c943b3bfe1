//! The `BlobStore` trait — the seam to external object storage.
//!
//! The record store holds only attachment metadata; the bytes live behind
//! this trait. Production deployments point it at an S3-compatible service;
//! [`MemoryBlobStore`] is the dev/test backend.

use std::{
  collections::HashMap,
  future::Future,
  sync::{Arc, Mutex},
  time::Duration,
};

use thiserror::Error;

/// Abstraction over object storage, addressed by `bucket` + `key`.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn put(
    &self,
    bucket: String,
    key: String,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `None` if the object does not exist.
  fn get(
    &self,
    bucket: String,
    key: String,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + '_;

  /// Idempotent.
  fn delete(
    &self,
    bucket: String,
    key: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// A URL from which the object can be fetched without credentials for
  /// `ttl`.
  fn presign_get(
    &self,
    bucket: String,
    key: String,
    ttl: Duration,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MemoryBlobError {
  #[error("blob store lock poisoned")]
  Poisoned,
}

/// Process-local object storage. Cloning is cheap; clones share contents.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
  objects: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
}

impl MemoryBlobStore {
  pub fn new() -> Self { Self::default() }
}

impl BlobStore for MemoryBlobStore {
  type Error = MemoryBlobError;

  async fn put(
    &self,
    bucket: String,
    key: String,
    bytes: Vec<u8>,
  ) -> Result<(), MemoryBlobError> {
    let mut objects =
      self.objects.lock().map_err(|_| MemoryBlobError::Poisoned)?;
    objects.insert((bucket, key), bytes);
    Ok(())
  }

  async fn get(
    &self,
    bucket: String,
    key: String,
  ) -> Result<Option<Vec<u8>>, MemoryBlobError> {
    let objects =
      self.objects.lock().map_err(|_| MemoryBlobError::Poisoned)?;
    Ok(objects.get(&(bucket, key)).cloned())
  }

  async fn delete(
    &self,
    bucket: String,
    key: String,
  ) -> Result<(), MemoryBlobError> {
    let mut objects =
      self.objects.lock().map_err(|_| MemoryBlobError::Poisoned)?;
    objects.remove(&(bucket, key));
    Ok(())
  }

  async fn presign_get(
    &self,
    bucket: String,
    key: String,
    _ttl: Duration,
  ) -> Result<String, MemoryBlobError> {
    // No signing for the in-process backend; the pseudo-URL is enough for
    // tests and local development.
    Ok(format!("memory://{bucket}/{key}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn put_get_delete_roundtrip() {
    let blobs = MemoryBlobStore::new();
    blobs
      .put("acta".into(), "a/b".into(), vec![1, 2, 3])
      .await
      .unwrap();

    let got = blobs.get("acta".into(), "a/b".into()).await.unwrap();
    assert_eq!(got, Some(vec![1, 2, 3]));

    blobs.delete("acta".into(), "a/b".into()).await.unwrap();
    assert!(blobs.get("acta".into(), "a/b".into()).await.unwrap().is_none());

    // Deleting again is a no-op.
    blobs.delete("acta".into(), "a/b".into()).await.unwrap();
  }
}
