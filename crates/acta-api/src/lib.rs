//! JSON REST API for Acta.
//!
//! Exposes an axum [`Router`] backed by any [`acta_core::store::RecordStore`]
//! plus a [`acta_core::blob::BlobStore`] for attachment bytes. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", acta_api::api_router(state))
//! ```

pub mod customers;
pub mod documents;
pub mod error;
pub mod files;
pub mod links;

use std::sync::Arc;

use acta_core::{
  blob::BlobStore, page::PageRequest, signing::Signer, store::RecordStore,
};
use axum::{
  Router,
  routing::{delete, get, post, put},
};
use serde::Deserialize;

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state of every handler.
pub struct ApiState<S, B> {
  pub store:  Arc<S>,
  pub blobs:  B,
  pub signer: Arc<dyn Signer>,
  /// Object-storage bucket attachments are written to.
  pub bucket: String,
}

impl<S, B: Clone> Clone for ApiState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      blobs:  self.blobs.clone(),
      signer: Arc::clone(&self.signer),
      bucket: self.bucket.clone(),
    }
  }
}

// ─── Pagination params ───────────────────────────────────────────────────────

/// `?page_number=&page_size=` — both optional, both validated.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
  pub page_number: Option<u32>,
  pub page_size:   Option<u32>,
}

impl PageParams {
  pub fn into_request(self) -> Result<PageRequest, ApiError> {
    PageRequest::new(
      self.page_number.unwrap_or(1),
      self.page_size.unwrap_or(PageRequest::DEFAULT_PAGE_SIZE),
    )
    .map_err(ApiError::Store)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B>(state: ApiState<S, B>) -> Router<()>
where
  S: RecordStore + 'static,
  B: BlobStore + Clone + 'static,
{
  Router::new()
    // Customers
    .route(
      "/customers",
      get(customers::list::<S, B>).post(customers::create::<S, B>),
    )
    .route("/customers/search", get(customers::search::<S, B>))
    .route("/customers/duplicates", get(customers::duplicates::<S, B>))
    .route(
      "/customers/{id}",
      get(customers::get_one::<S, B>)
        .put(customers::update::<S, B>)
        .delete(customers::delete_one::<S, B>),
    )
    .route("/customers/{id}/documents", get(customers::documents::<S, B>))
    // Documents
    .route(
      "/documents",
      get(documents::list::<S, B>).post(documents::create::<S, B>),
    )
    .route("/documents/search", get(documents::search::<S, B>))
    .route("/documents/by-date", get(documents::by_notary_date::<S, B>))
    .route("/documents/by-code/{code}", get(documents::by_code::<S, B>))
    .route(
      "/documents/cross-reference",
      get(documents::cross_reference::<S, B>),
    )
    .route(
      "/documents/{id}",
      get(documents::get_one::<S, B>)
        .put(documents::update::<S, B>)
        .delete(documents::delete_one::<S, B>),
    )
    // Party links
    .route(
      "/documents/{id}/parties",
      get(links::list::<S, B>).post(links::create::<S, B>),
    )
    .route(
      "/documents/{id}/parties/{customer_id}",
      delete(links::delete_one::<S, B>),
    )
    .route(
      "/documents/{id}/parties/{customer_id}/signature",
      put(links::set_signature::<S, B>),
    )
    // Files
    .route(
      "/documents/{id}/files",
      get(files::list::<S, B>).post(files::upload::<S, B>),
    )
    .route(
      "/files/{id}",
      get(files::get_one::<S, B>).delete(files::delete_one::<S, B>),
    )
    .route("/files/{id}/content", get(files::content::<S, B>))
    .route("/files/{id}/integrity", get(files::integrity::<S, B>))
    .route("/files/{id}/signature", post(files::sign::<S, B>))
    .with_state(state)
}
