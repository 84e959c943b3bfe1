//! Party-to-document links.
//!
//! A link is the association edge between a customer and a document, tagged
//! with the capacity in which the customer participates and a per-party
//! signing state. Its identity is the composite `(document_id, customer_id)`;
//! there is no role-update path — changing a role is unlink + re-link.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{customer::Customer, document::Document};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The capacity in which a customer participates in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
  PartyA,
  PartyB,
  Witness,
}

impl fmt::Display for PartyRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::PartyA => "party A",
      Self::PartyB => "party B",
      Self::Witness => "witness",
    };
    f.write_str(s)
  }
}

// ─── Signature status ────────────────────────────────────────────────────────

/// Per-party signing state, independent of the document as a whole.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SignatureStatus {
  #[default]
  Pending,
  Signed,
  Declined,
}

// ─── PartyLink ───────────────────────────────────────────────────────────────

/// The persisted association edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyLink {
  pub document_id:      Uuid,
  pub customer_id:      Uuid,
  pub role:             PartyRole,
  pub signature_status: SignatureStatus,
  /// Date this party's participation was notarized.
  pub notary_date:      NaiveDate,
  pub created_at:       DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::link_party`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPartyLink {
  pub document_id: Uuid,
  pub customer_id: Uuid,
  pub role:        PartyRole,
  /// Defaults to today (UTC) when unspecified.
  #[serde(default)]
  pub notary_date: Option<NaiveDate>,
}

// ─── Read views ──────────────────────────────────────────────────────────────

/// A link joined with its customer — the per-document view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedParty {
  pub customer: Customer,
  pub link:     PartyLink,
}

/// A link joined with its document — the per-customer and cross-reference
/// view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyEngagement {
  pub document: Document,
  pub link:     PartyLink,
}
