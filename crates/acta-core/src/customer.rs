//! Customer identity records and their natural keys.
//!
//! A customer carries up to three real-world identifiers (national document
//! ID, passport ID, business registration number). These are the *natural
//! keys*: each non-empty value must be unique across the whole store, which
//! the storage layer enforces with unique indexes. The advisory duplicate
//! check ([`crate::store::RecordStore::find_duplicates`]) exists so callers
//! can surface matches before attempting a create.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Whether the customer is a private individual or a registered business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
  Individual,
  Business,
}

// ─── Natural keys ────────────────────────────────────────────────────────────

/// Discriminates the three natural-key fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaturalKeyKind {
  DocumentId,
  PassportId,
  BusinessRegistrationNumber,
}

impl fmt::Display for NaturalKeyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::DocumentId => "document id",
      Self::PassportId => "passport id",
      Self::BusinessRegistrationNumber => "business registration number",
    };
    f.write_str(s)
  }
}

/// The set of natural-key values carried by a customer (all optional; an
/// individual with no issued ID is legitimate).
///
/// Matching is exact and case-sensitive after [`NaturalKeys::normalized`]
/// trims surrounding whitespace. A value that is empty after trimming counts
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalKeys {
  pub document_id:                  Option<String>,
  pub passport_id:                  Option<String>,
  pub business_registration_number: Option<String>,
}

impl NaturalKeys {
  /// Trim each value; drop values that are empty after trimming.
  pub fn normalized(&self) -> Self {
    fn norm(v: &Option<String>) -> Option<String> {
      v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
    }
    Self {
      document_id:                  norm(&self.document_id),
      passport_id:                  norm(&self.passport_id),
      business_registration_number: norm(&self.business_registration_number),
    }
  }

  /// True when no key field carries a value.
  pub fn is_empty(&self) -> bool {
    self.document_id.is_none()
      && self.passport_id.is_none()
      && self.business_registration_number.is_none()
  }

  pub fn get(&self, kind: NaturalKeyKind) -> Option<&str> {
    match kind {
      NaturalKeyKind::DocumentId => self.document_id.as_deref(),
      NaturalKeyKind::PassportId => self.passport_id.as_deref(),
      NaturalKeyKind::BusinessRegistrationNumber => {
        self.business_registration_number.as_deref()
      }
    }
  }

  /// The populated `(kind, value)` pairs, in field order.
  pub fn populated(&self) -> impl Iterator<Item = (NaturalKeyKind, &str)> {
    [
      NaturalKeyKind::DocumentId,
      NaturalKeyKind::PassportId,
      NaturalKeyKind::BusinessRegistrationNumber,
    ]
    .into_iter()
    .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
  }
}

// ─── Customer ────────────────────────────────────────────────────────────────

/// A customer identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
  pub customer_id:   Uuid,
  pub full_name:     String,
  pub address:       Option<String>,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub kind:          CustomerKind,
  /// By convention present only for `CustomerKind::Business`; not enforced.
  pub business_name: Option<String>,
  #[serde(flatten)]
  pub keys:          NaturalKeys,
  /// Audit timestamps, set by the store on create/update.
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

// ─── NewCustomer ─────────────────────────────────────────────────────────────

/// Input to customer create and update operations. Updates are full-record
/// replaces: every mutable field is overwritten with the value given here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
  pub full_name:     String,
  #[serde(default)]
  pub address:       Option<String>,
  #[serde(default)]
  pub phone:         Option<String>,
  #[serde(default)]
  pub email:         Option<String>,
  pub kind:          CustomerKind,
  #[serde(default)]
  pub business_name: Option<String>,
  #[serde(flatten, default)]
  pub keys:          NaturalKeys,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_trims_and_drops_blank_values() {
    let keys = NaturalKeys {
      document_id:                  Some("  D-123  ".into()),
      passport_id:                  Some("   ".into()),
      business_registration_number: None,
    };
    let norm = keys.normalized();
    assert_eq!(norm.document_id.as_deref(), Some("D-123"));
    assert!(norm.passport_id.is_none());
    assert!(norm.business_registration_number.is_none());
  }

  #[test]
  fn populated_yields_only_present_keys() {
    let keys = NaturalKeys {
      document_id:                  None,
      passport_id:                  Some("P-9".into()),
      business_registration_number: Some("B-7".into()),
    };
    let pairs: Vec<_> = keys.populated().collect();
    assert_eq!(pairs, vec![
      (NaturalKeyKind::PassportId, "P-9"),
      (NaturalKeyKind::BusinessRegistrationNumber, "B-7"),
    ]);
  }

  #[test]
  fn empty_keys_are_empty() {
    assert!(NaturalKeys::default().is_empty());
    assert!(
      NaturalKeys {
        document_id: Some("  ".into()),
        ..Default::default()
      }
      .normalized()
      .is_empty()
    );
  }
}
