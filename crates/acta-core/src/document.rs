//! Notarized-document records.
//!
//! The `transaction_code` is the unique business identifier for a document,
//! distinct from its internal UUID. The `created_date` is the business date
//! of the notarization event — distinct from the `created_at`/`updated_at`
//! audit timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  link::{PartyRole, SignatureStatus},
};

// ─── Document ────────────────────────────────────────────────────────────────

/// A notarized-document record. Party links and file attachments hang off it
/// and are cascade-deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub document_id:      Uuid,
  /// Unique across all documents; enforced by the storage layer.
  pub transaction_code: String,
  pub secretary:        Option<String>,
  pub notary_public:    Option<String>,
  pub document_type:    Option<String>,
  pub description:      Option<String>,
  /// Business date of the notarization event.
  pub created_date:     NaiveDate,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

// ─── Party declaration ───────────────────────────────────────────────────────

/// One party declared at document-creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartySpec {
  pub customer_id: Uuid,
  pub role:        PartyRole,
  /// Defaults to today (UTC) when unspecified.
  #[serde(default)]
  pub notary_date: Option<NaiveDate>,
  /// Defaults to [`SignatureStatus::Pending`].
  #[serde(default)]
  pub signature_status: Option<SignatureStatus>,
}

// ─── NewDocument ─────────────────────────────────────────────────────────────

/// Input to document creation. The store validates that every declared
/// customer exists and that the role quorum below is met before persisting
/// anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
  pub transaction_code: String,
  #[serde(default)]
  pub secretary:        Option<String>,
  #[serde(default)]
  pub notary_public:    Option<String>,
  #[serde(default)]
  pub document_type:    Option<String>,
  #[serde(default)]
  pub description:      Option<String>,
  /// Defaults to today (UTC) when unspecified.
  #[serde(default)]
  pub created_date:     Option<NaiveDate>,
  pub parties:          Vec<PartySpec>,
}

impl NewDocument {
  /// A document is only valid with at least one PartyA and one PartyB.
  ///
  /// This used to be a form-level rule in the consuming UI; it is enforced
  /// here so no caller can create a one-sided document.
  pub fn check_role_quorum(&self) -> Result<()> {
    for required in [PartyRole::PartyA, PartyRole::PartyB] {
      if !self.parties.iter().any(|p| p.role == required) {
        return Err(Error::MissingRole(required));
      }
    }
    Ok(())
  }
}

// ─── DocumentUpdate ──────────────────────────────────────────────────────────

/// Full overwrite of a document's mutable fields. Party links are managed
/// through the link operations, not through update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpdate {
  pub transaction_code: String,
  #[serde(default)]
  pub secretary:        Option<String>,
  #[serde(default)]
  pub notary_public:    Option<String>,
  #[serde(default)]
  pub document_type:    Option<String>,
  #[serde(default)]
  pub description:      Option<String>,
  pub created_date:     NaiveDate,
}
