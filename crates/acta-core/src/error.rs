//! Error taxonomy for the Acta record store.
//!
//! Every failure a store operation can surface falls into one of four kinds
//! (see [`ErrorKind`]): the transport layer maps kinds to HTTP statuses
//! without inspecting individual variants.

use thiserror::Error;
use uuid::Uuid;

use crate::{customer::NaturalKeyKind, link::PartyRole};

#[derive(Debug, Error)]
pub enum Error {
  // ── Not found ─────────────────────────────────────────────────────────
  #[error("customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("document not found: {0}")]
  DocumentNotFound(Uuid),

  #[error("party link not found: document {document_id}, customer {customer_id}")]
  LinkNotFound {
    document_id: Uuid,
    customer_id: Uuid,
  },

  #[error("file not found: {0}")]
  FileNotFound(Uuid),

  // ── Conflict ──────────────────────────────────────────────────────────
  #[error("another customer already holds {kind} {value:?}")]
  DuplicateNaturalKey {
    kind:  NaturalKeyKind,
    value: String,
  },

  #[error("transaction code already in use: {0:?}")]
  DuplicateTransactionCode(String),

  #[error("customer {customer_id} is already a party to document {document_id}")]
  DuplicateParty {
    document_id: Uuid,
    customer_id: Uuid,
  },

  /// A customer with live party links cannot be deleted.
  #[error("customer {0} still has party links")]
  CustomerInUse(Uuid),

  // ── Validation ────────────────────────────────────────────────────────
  #[error("referenced customer does not exist: {0}")]
  UnknownCustomer(Uuid),

  #[error("referenced document does not exist: {0}")]
  UnknownDocument(Uuid),

  #[error("document must declare at least one {0} party")]
  MissingRole(PartyRole),

  #[error("invalid page request: {0}")]
  InvalidPage(String),

  // ── Unavailable ───────────────────────────────────────────────────────
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("storage error: {0}")]
  Storage(String),
}

/// The four failure classes of the record store.
///
/// NotFound and Conflict map to 404/409, Validation to 400, Unavailable
/// to 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Validation,
  Unavailable,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::CustomerNotFound(_)
      | Self::DocumentNotFound(_)
      | Self::LinkNotFound { .. }
      | Self::FileNotFound(_) => ErrorKind::NotFound,

      Self::DuplicateNaturalKey { .. }
      | Self::DuplicateTransactionCode(_)
      | Self::DuplicateParty { .. }
      | Self::CustomerInUse(_) => ErrorKind::Conflict,

      Self::UnknownCustomer(_)
      | Self::UnknownDocument(_)
      | Self::MissingRole(_)
      | Self::InvalidPage(_) => ErrorKind::Validation,

      Self::Serialization(_) | Self::Storage(_) => ErrorKind::Unavailable,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
