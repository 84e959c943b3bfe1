//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `acta-store-sqlite`).
//! Higher layers (`acta-api`, `acta-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  customer::{Customer, NaturalKeyKind, NaturalKeys, NewCustomer},
  document::{Document, DocumentUpdate, NewDocument},
  file::{FileRecord, NewFileRecord},
  link::{LinkedParty, NewPartyLink, PartyEngagement, PartyLink, SignatureStatus},
  page::{Page, PageRequest},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::search_documents`].
///
/// `text` is a single substring filter applied across the document's own
/// fields (transaction code, notary, secretary, type, description) *and*
/// the names and natural keys of its linked customers — one logical search
/// spanning the join.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
  pub text: Option<String>,
  pub page: PageRequest,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Acta record store backend.
///
/// Uniform semantics across implementations:
/// - delete/unlink of a missing target is an idempotent no-op;
/// - update of a missing target raises a NotFound-kind error;
/// - uniqueness (natural keys, transaction codes, party edges) is enforced
///   by the backend itself and surfaces as a Conflict-kind error, never by
///   caller-side check-then-create;
/// - list/search results are newest-`created_date`-first unless a method
///   documents otherwise.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error
    + Into<crate::Error>
    + Send
    + Sync
    + 'static;

  // ── Customers ─────────────────────────────────────────────────────────

  /// Create and persist a customer. Natural keys are normalized before
  /// insert; a colliding non-empty key fails with a Conflict-kind error.
  fn create_customer(
    &self,
    input: NewCustomer,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  /// Retrieve a customer by ID. Returns `None` if not found.
  fn get_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// Point lookup by one natural-key kind. At most one match thanks to the
  /// storage-level uniqueness constraint.
  fn get_customer_by_natural_key(
    &self,
    kind: NaturalKeyKind,
    value: String,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// The advisory duplicate check: existing customers sharing at least one
  /// non-empty natural key with `keys`, deduplicated by customer ID. All
  /// keys empty is not an error — it returns the empty set.
  fn find_duplicates(
    &self,
    keys: NaturalKeys,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// Substring search across all three natural-key columns, union of the
  /// per-column matches.
  fn search_customers_by_identity(
    &self,
    needle: String,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// All customers, paginated, newest first.
  fn list_customers(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Customer>, Self::Error>> + Send + '_;

  /// Full overwrite of the mutable fields; bumps `updated_at`.
  fn update_customer(
    &self,
    id: Uuid,
    input: NewCustomer,
  ) -> impl Future<Output = Result<Customer, Self::Error>> + Send + '_;

  /// Idempotent. Fails with a Conflict-kind error while the customer still
  /// has party links — links are never silently orphaned.
  fn delete_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn customer_exists(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Create a document together with its declared party links.
  ///
  /// Preconditions, checked in order: every referenced customer exists; at
  /// least one PartyA and one PartyB are declared; the transaction code is
  /// not taken.
  fn create_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<(Document, Vec<PartyLink>), Self::Error>>
  + Send
  + '_;

  fn get_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  fn get_document_by_code(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Documents where a link exists for the customer, newest first.
  fn documents_for_customer(
    &self,
    customer_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Document>, Self::Error>> + Send + '_;

  /// See [`DocumentQuery`].
  fn search_documents(
    &self,
    query: DocumentQuery,
  ) -> impl Future<Output = Result<Page<Document>, Self::Error>> + Send + '_;

  /// Documents with at least one party link whose `notary_date` falls in
  /// `[from, to]` — the filter is on the links' dates, not the document's
  /// own `created_date`.
  fn documents_by_notary_date(
    &self,
    from: NaiveDate,
    to: NaiveDate,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Document>, Self::Error>> + Send + '_;

  fn list_documents(
    &self,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Document>, Self::Error>> + Send + '_;

  /// Full overwrite of the mutable fields; bumps `updated_at`. Changing the
  /// transaction code to a taken one fails with a Conflict-kind error.
  fn update_document(
    &self,
    id: Uuid,
    input: DocumentUpdate,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Idempotent. Cascades the document's party links and file metadata.
  fn delete_document(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Party links ───────────────────────────────────────────────────────

  /// Create one association edge. The customer and document must both
  /// exist (Validation-kind error otherwise); a second edge for the same
  /// pair fails with a Conflict-kind error.
  fn link_party(
    &self,
    input: NewPartyLink,
  ) -> impl Future<Output = Result<PartyLink, Self::Error>> + Send + '_;

  /// Delete one edge by composite key. The customer must still exist
  /// (Validation-kind error otherwise); a missing edge is a silent no-op.
  fn unlink_party(
    &self,
    document_id: Uuid,
    customer_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Edges of one document, ordered by role then customer name.
  fn links_for_document(
    &self,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LinkedParty>, Self::Error>> + Send + '_;

  /// Edges of one customer, ordered by `notary_date` descending then role.
  fn links_for_customer(
    &self,
    customer_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PartyEngagement>, Self::Error>>
  + Send
  + '_;

  /// Cross-reference search: the edges of every document jointly linked to
  /// two or more *distinct* customers from `customer_ids` (a customer
  /// appearing twice in the input counts once). Only edges belonging to
  /// customers in the input set are returned, ordered by `notary_date`
  /// descending then transaction code.
  fn cross_reference(
    &self,
    customer_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<PartyEngagement>, Self::Error>>
  + Send
  + '_;

  /// Update semantics: a missing edge raises a NotFound-kind error.
  fn set_signature_status(
    &self,
    document_id: Uuid,
    customer_id: Uuid,
    status: SignatureStatus,
  ) -> impl Future<Output = Result<PartyLink, Self::Error>> + Send + '_;

  // ── Files ─────────────────────────────────────────────────────────────

  /// Record attachment metadata. The document must exist (Validation-kind
  /// error otherwise). Call only after the bytes are in the blob store.
  fn add_file(
    &self,
    input: NewFileRecord,
  ) -> impl Future<Output = Result<FileRecord, Self::Error>> + Send + '_;

  fn get_file(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FileRecord>, Self::Error>> + Send + '_;

  /// Attachments of one document, newest first.
  fn files_for_document(
    &self,
    document_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FileRecord>, Self::Error>> + Send + '_;

  /// Idempotent. Removes metadata only; the bytes in the blob store are the
  /// caller's to clean up.
  fn delete_file(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Update semantics: a missing file raises a NotFound-kind error.
  fn set_file_signature(
    &self,
    id: Uuid,
    signature: String,
  ) -> impl Future<Output = Result<FileRecord, Self::Error>> + Send + '_;
}
