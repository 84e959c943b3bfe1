//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Audit timestamps are stored as RFC 3339 strings; business dates as
//! `YYYY-MM-DD` (which sorts correctly as text). UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their snake_case
//! discriminants, chosen so that `ORDER BY role` yields PartyA, PartyB,
//! Witness.

use acta_core::{
  customer::{Customer, CustomerKind, NaturalKeys},
  document::Document,
  file::FileRecord,
  link::{PartyLink, PartyRole, SignatureStatus},
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_customer_kind(k: CustomerKind) -> &'static str {
  match k {
    CustomerKind::Individual => "individual",
    CustomerKind::Business => "business",
  }
}

pub fn decode_customer_kind(s: &str) -> Result<CustomerKind> {
  match s {
    "individual" => Ok(CustomerKind::Individual),
    "business" => Ok(CustomerKind::Business),
    other => Err(Error::Decode(format!("unknown customer kind: {other:?}"))),
  }
}

pub fn encode_role(r: PartyRole) -> &'static str {
  match r {
    PartyRole::PartyA => "party_a",
    PartyRole::PartyB => "party_b",
    PartyRole::Witness => "witness",
  }
}

pub fn decode_role(s: &str) -> Result<PartyRole> {
  match s {
    "party_a" => Ok(PartyRole::PartyA),
    "party_b" => Ok(PartyRole::PartyB),
    "witness" => Ok(PartyRole::Witness),
    other => Err(Error::Decode(format!("unknown party role: {other:?}"))),
  }
}

pub fn encode_status(s: SignatureStatus) -> &'static str {
  match s {
    SignatureStatus::Pending => "pending",
    SignatureStatus::Signed => "signed",
    SignatureStatus::Declined => "declined",
  }
}

pub fn decode_status(s: &str) -> Result<SignatureStatus> {
  match s {
    "pending" => Ok(SignatureStatus::Pending),
    "signed" => Ok(SignatureStatus::Signed),
    "declined" => Ok(SignatureStatus::Declined),
    other => {
      Err(Error::Decode(format!("unknown signature status: {other:?}")))
    }
  }
}

// ─── Column lists ────────────────────────────────────────────────────────────

// Every SELECT uses these lists so the Raw*::read index maps stay valid.

pub const CUSTOMER_COLS: &str = "customer_id, full_name, address, phone, \
   email, kind, business_name, document_id, passport_id, \
   business_registration_number, created_at, updated_at";

pub const DOCUMENT_COLS: &str = "document_id, transaction_code, secretary, \
   notary_public, document_type, description, created_date, created_at, \
   updated_at";

pub const LINK_COLS: &str = "document_id, customer_id, role, \
   signature_status, notary_date, created_at";

pub const FILE_COLS: &str = "file_id, document_id, file_name, file_size, \
   content_type, bucket, object_key, content_hash, signature, created_at";

/// Qualify a column list with a table alias for joined selects.
pub fn qualify(cols: &str, alias: &str) -> String {
  cols
    .split(',')
    .map(|c| format!("{alias}.{}", c.trim()))
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub struct RawCustomer {
  pub customer_id:                  String,
  pub full_name:                    String,
  pub address:                      Option<String>,
  pub phone:                        Option<String>,
  pub email:                        Option<String>,
  pub kind:                         String,
  pub business_name:                Option<String>,
  pub document_id:                  Option<String>,
  pub passport_id:                  Option<String>,
  pub business_registration_number: Option<String>,
  pub created_at:                   String,
  pub updated_at:                   String,
}

impl RawCustomer {
  /// Read [`CUSTOMER_COLS`] starting at column index `base`.
  pub fn read(row: &Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:                  row.get(base)?,
      full_name:                    row.get(base + 1)?,
      address:                      row.get(base + 2)?,
      phone:                        row.get(base + 3)?,
      email:                        row.get(base + 4)?,
      kind:                         row.get(base + 5)?,
      business_name:                row.get(base + 6)?,
      document_id:                  row.get(base + 7)?,
      passport_id:                  row.get(base + 8)?,
      business_registration_number: row.get(base + 9)?,
      created_at:                   row.get(base + 10)?,
      updated_at:                   row.get(base + 11)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      customer_id:   decode_uuid(&self.customer_id)?,
      full_name:     self.full_name,
      address:       self.address,
      phone:         self.phone,
      email:         self.email,
      kind:          decode_customer_kind(&self.kind)?,
      business_name: self.business_name,
      keys:          NaturalKeys {
        document_id:                  self.document_id,
        passport_id:                  self.passport_id,
        business_registration_number: self.business_registration_number,
      },
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawDocument {
  pub document_id:      String,
  pub transaction_code: String,
  pub secretary:        Option<String>,
  pub notary_public:    Option<String>,
  pub document_type:    Option<String>,
  pub description:      Option<String>,
  pub created_date:     String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawDocument {
  /// Read [`DOCUMENT_COLS`] starting at column index `base`.
  pub fn read(row: &Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:      row.get(base)?,
      transaction_code: row.get(base + 1)?,
      secretary:        row.get(base + 2)?,
      notary_public:    row.get(base + 3)?,
      document_type:    row.get(base + 4)?,
      description:      row.get(base + 5)?,
      created_date:     row.get(base + 6)?,
      created_at:       row.get(base + 7)?,
      updated_at:       row.get(base + 8)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      document_id:      decode_uuid(&self.document_id)?,
      transaction_code: self.transaction_code,
      secretary:        self.secretary,
      notary_public:    self.notary_public,
      document_type:    self.document_type,
      description:      self.description,
      created_date:     decode_date(&self.created_date)?,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub struct RawLink {
  pub document_id:      String,
  pub customer_id:      String,
  pub role:             String,
  pub signature_status: String,
  pub notary_date:      String,
  pub created_at:       String,
}

impl RawLink {
  /// Read [`LINK_COLS`] starting at column index `base`.
  pub fn read(row: &Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      document_id:      row.get(base)?,
      customer_id:      row.get(base + 1)?,
      role:             row.get(base + 2)?,
      signature_status: row.get(base + 3)?,
      notary_date:      row.get(base + 4)?,
      created_at:       row.get(base + 5)?,
    })
  }

  pub fn into_link(self) -> Result<PartyLink> {
    Ok(PartyLink {
      document_id:      decode_uuid(&self.document_id)?,
      customer_id:      decode_uuid(&self.customer_id)?,
      role:             decode_role(&self.role)?,
      signature_status: decode_status(&self.signature_status)?,
      notary_date:      decode_date(&self.notary_date)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawFile {
  pub file_id:      String,
  pub document_id:  String,
  pub file_name:    String,
  pub file_size:    i64,
  pub content_type: String,
  pub bucket:       String,
  pub object_key:   String,
  pub content_hash: String,
  pub signature:    Option<String>,
  pub created_at:   String,
}

impl RawFile {
  /// Read [`FILE_COLS`] starting at column index `base`.
  pub fn read(row: &Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      file_id:      row.get(base)?,
      document_id:  row.get(base + 1)?,
      file_name:    row.get(base + 2)?,
      file_size:    row.get(base + 3)?,
      content_type: row.get(base + 4)?,
      bucket:       row.get(base + 5)?,
      object_key:   row.get(base + 6)?,
      content_hash: row.get(base + 7)?,
      signature:    row.get(base + 8)?,
      created_at:   row.get(base + 9)?,
    })
  }

  pub fn into_file(self) -> Result<FileRecord> {
    Ok(FileRecord {
      file_id:      decode_uuid(&self.file_id)?,
      document_id:  decode_uuid(&self.document_id)?,
      file_name:    self.file_name,
      file_size:    u64::try_from(self.file_size)
        .map_err(|_| Error::Decode("negative file size".into()))?,
      content_type: self.content_type,
      bucket:       self.bucket,
      object_key:   self.object_key,
      content_hash: self.content_hash,
      signature:    self.signature,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
