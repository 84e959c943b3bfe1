//! Integration tests for `SqliteStore` against an in-memory database.

use acta_core::{
  Error as CoreError,
  customer::{Customer, CustomerKind, NaturalKeyKind, NaturalKeys, NewCustomer},
  document::{DocumentUpdate, NewDocument, PartySpec},
  file::NewFileRecord,
  link::{NewPartyLink, PartyRole, SignatureStatus},
  page::PageRequest,
  store::{DocumentQuery, RecordStore},
};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn person(name: &str) -> NewCustomer {
  NewCustomer {
    full_name:     name.into(),
    address:       None,
    phone:         None,
    email:         None,
    kind:          CustomerKind::Individual,
    business_name: None,
    keys:          NaturalKeys::default(),
  }
}

fn person_with_keys(
  name: &str,
  document_id: Option<&str>,
  passport_id: Option<&str>,
  brn: Option<&str>,
) -> NewCustomer {
  NewCustomer {
    keys: NaturalKeys {
      document_id:                  document_id.map(str::to_owned),
      passport_id:                  passport_id.map(str::to_owned),
      business_registration_number: brn.map(str::to_owned),
    },
    ..person(name)
  }
}

fn party(customer_id: Uuid, role: PartyRole) -> PartySpec {
  PartySpec {
    customer_id,
    role,
    notary_date: None,
    signature_status: None,
  }
}

fn deed(code: &str, a: Uuid, b: Uuid) -> NewDocument {
  NewDocument {
    transaction_code: code.into(),
    secretary:        None,
    notary_public:    None,
    document_type:    None,
    description:      None,
    created_date:     None,
    parties:          vec![
      party(a, PartyRole::PartyA),
      party(b, PartyRole::PartyB),
    ],
  }
}

async fn two_customers(s: &SqliteStore) -> (Customer, Customer) {
  let a = s.create_customer(person("Alice Andersson")).await.unwrap();
  let b = s.create_customer(person("Bob Berg")).await.unwrap();
  (a, b)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ─── Customers ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_customer() {
  let s = store().await;

  let created = s
    .create_customer(person_with_keys(
      "Alice Andersson",
      Some("  D-100  "),
      None,
      None,
    ))
    .await
    .unwrap();
  // Natural keys come back trimmed.
  assert_eq!(created.keys.document_id.as_deref(), Some("D-100"));

  let fetched = s.get_customer(created.customer_id).await.unwrap().unwrap();
  assert_eq!(fetched.customer_id, created.customer_id);
  assert_eq!(fetched.full_name, "Alice Andersson");
  assert_eq!(fetched.kind, CustomerKind::Individual);
  assert_eq!(fetched.keys.document_id.as_deref(), Some("D-100"));
}

#[tokio::test]
async fn get_customer_missing_returns_none() {
  let s = store().await;
  assert!(s.get_customer(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_natural_key_conflicts() {
  let s = store().await;
  s.create_customer(person_with_keys("Alice", Some("D-1"), None, None))
    .await
    .unwrap();

  let err = s
    .create_customer(person_with_keys("Mallory", Some("D-1"), None, None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateNaturalKey {
      kind: NaturalKeyKind::DocumentId,
      ..
    })
  ));
}

#[tokio::test]
async fn duplicate_passport_conflicts_across_key_kinds() {
  let s = store().await;
  s.create_customer(person_with_keys("Alice", Some("D-1"), Some("P-1"), None))
    .await
    .unwrap();

  // Different document id, same passport: still a conflict.
  let err = s
    .create_customer(person_with_keys("Eve", Some("D-2"), Some("P-1"), None))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateNaturalKey {
      kind: NaturalKeyKind::PassportId,
      ..
    })
  ));
}

#[tokio::test]
async fn customers_without_keys_never_conflict() {
  let s = store().await;
  s.create_customer(person("Alice")).await.unwrap();
  s.create_customer(person("Bob")).await.unwrap();

  let all = s.list_customers(PageRequest::first()).await.unwrap();
  assert_eq!(all.total, 2);
}

#[tokio::test]
async fn lookup_by_natural_key() {
  let s = store().await;
  let alice = s
    .create_customer(person_with_keys("Alice", None, Some("P-77"), None))
    .await
    .unwrap();

  let found = s
    .get_customer_by_natural_key(NaturalKeyKind::PassportId, "P-77".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.customer_id, alice.customer_id);

  let missing = s
    .get_customer_by_natural_key(NaturalKeyKind::PassportId, "P-78".into())
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn find_duplicates_unions_key_matches() {
  let s = store().await;
  let by_doc = s
    .create_customer(person_with_keys("Alice", Some("D-1"), None, None))
    .await
    .unwrap();
  let by_brn = s
    .create_customer(person_with_keys("Acme", None, None, Some("B-9")))
    .await
    .unwrap();
  s.create_customer(person_with_keys("Carol", Some("D-2"), None, None))
    .await
    .unwrap();

  let hits = s
    .find_duplicates(NaturalKeys {
      document_id:                  Some("D-1".into()),
      passport_id:                  None,
      business_registration_number: Some("B-9".into()),
    })
    .await
    .unwrap();

  let ids: Vec<_> = hits.iter().map(|c| c.customer_id).collect();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&by_doc.customer_id));
  assert!(ids.contains(&by_brn.customer_id));
}

#[tokio::test]
async fn find_duplicates_reports_multi_key_match_once() {
  let s = store().await;
  let alice = s
    .create_customer(person_with_keys("Alice", Some("D-1"), Some("P-1"), None))
    .await
    .unwrap();

  // Both keys hit the same customer; one result, not two.
  let hits = s
    .find_duplicates(NaturalKeys {
      document_id:                  Some("D-1".into()),
      passport_id:                  Some("P-1".into()),
      business_registration_number: None,
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].customer_id, alice.customer_id);
}

#[tokio::test]
async fn find_duplicates_with_no_keys_returns_nothing() {
  let s = store().await;
  s.create_customer(person("Alice")).await.unwrap();

  let hits = s.find_duplicates(NaturalKeys::default()).await.unwrap();
  assert!(hits.is_empty());

  // Keyless customers are invisible to the duplicate check.
  let hits = s
    .find_duplicates(NaturalKeys {
      document_id: Some("D-404".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(hits.is_empty());
}

#[tokio::test]
async fn search_customers_by_identity_substring() {
  let s = store().await;
  let alice = s
    .create_customer(person_with_keys("Alice", Some("SE-1990-X"), None, None))
    .await
    .unwrap();
  let acme = s
    .create_customer(person_with_keys("Acme", None, None, Some("BRN-1990")))
    .await
    .unwrap();
  s.create_customer(person_with_keys("Carol", Some("SE-1985-Y"), None, None))
    .await
    .unwrap();

  let hits = s.search_customers_by_identity("1990".into()).await.unwrap();
  let ids: Vec<_> = hits.iter().map(|c| c.customer_id).collect();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&alice.customer_id));
  assert!(ids.contains(&acme.customer_id));
}

#[tokio::test]
async fn list_customers_paginates() {
  let s = store().await;
  for i in 0..5 {
    s.create_customer(person(&format!("Customer {i}"))).await.unwrap();
  }

  let page = s
    .list_customers(PageRequest::new(1, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.total, 5);
  assert_eq!(page.page_count(), 3);

  let last = s
    .list_customers(PageRequest::new(3, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(last.items.len(), 1);
  assert_eq!(last.total, 5);
}

#[tokio::test]
async fn update_customer_is_a_full_replace() {
  let s = store().await;
  let alice = s
    .create_customer(person_with_keys("Alice", Some("D-1"), Some("P-1"), None))
    .await
    .unwrap();

  let mut input = person_with_keys("Alice Andersson", Some("D-1"), None, None);
  input.email = Some("alice@example.com".into());
  let updated = s.update_customer(alice.customer_id, input).await.unwrap();

  assert_eq!(updated.full_name, "Alice Andersson");
  assert_eq!(updated.email.as_deref(), Some("alice@example.com"));
  // The passport key was omitted from the replace, so it is gone.
  assert!(updated.keys.passport_id.is_none());
  assert!(updated.updated_at >= alice.updated_at);
}

#[tokio::test]
async fn update_missing_customer_errors() {
  let s = store().await;
  let err = s
    .update_customer(Uuid::new_v4(), person("Nobody"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CustomerNotFound(_))));
}

#[tokio::test]
async fn update_customer_key_collision_conflicts() {
  let s = store().await;
  s.create_customer(person_with_keys("Alice", Some("D-1"), None, None))
    .await
    .unwrap();
  let bob = s
    .create_customer(person_with_keys("Bob", Some("D-2"), None, None))
    .await
    .unwrap();

  let err = s
    .update_customer(
      bob.customer_id,
      person_with_keys("Bob", Some("D-1"), None, None),
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateNaturalKey {
      kind: NaturalKeyKind::DocumentId,
      ..
    })
  ));
}

#[tokio::test]
async fn delete_customer_is_idempotent() {
  let s = store().await;
  let alice = s.create_customer(person("Alice")).await.unwrap();

  s.delete_customer(alice.customer_id).await.unwrap();
  assert!(s.get_customer(alice.customer_id).await.unwrap().is_none());

  // Second delete and a delete of a never-existing id are both no-ops.
  s.delete_customer(alice.customer_id).await.unwrap();
  s.delete_customer(Uuid::new_v4()).await.unwrap();
}

#[tokio::test]
async fn delete_customer_with_links_conflicts() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  s.create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s.delete_customer(a.customer_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::CustomerInUse(_))));
  assert!(s.customer_exists(a.customer_id).await.unwrap());
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_document_with_parties() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;

  let (doc, links) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  assert_eq!(doc.transaction_code, "TX-1");
  assert_eq!(links.len(), 2);

  let fetched = s.get_document(doc.document_id).await.unwrap().unwrap();
  assert_eq!(fetched.document_id, doc.document_id);

  let by_code = s.get_document_by_code("TX-1".into()).await.unwrap().unwrap();
  assert_eq!(by_code.document_id, doc.document_id);

  // Edges come back PartyA before PartyB.
  let parties = s.links_for_document(doc.document_id).await.unwrap();
  assert_eq!(parties.len(), 2);
  assert_eq!(parties[0].link.role, PartyRole::PartyA);
  assert_eq!(parties[0].customer.customer_id, a.customer_id);
  assert_eq!(parties[1].link.role, PartyRole::PartyB);
  assert_eq!(parties[1].link.signature_status, SignatureStatus::Pending);
}

#[tokio::test]
async fn create_document_requires_both_principal_roles() {
  let s = store().await;
  let (a, _) = two_customers(&s).await;

  let input = NewDocument {
    parties: vec![party(a.customer_id, PartyRole::PartyA)],
    ..deed("TX-1", a.customer_id, a.customer_id)
  };
  let err = s.create_document(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::MissingRole(PartyRole::PartyB))
  ));
  assert!(s.get_document_by_code("TX-1".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn create_document_with_unknown_customer_persists_nothing() {
  let s = store().await;
  let (a, _) = two_customers(&s).await;
  let ghost = Uuid::new_v4();

  let err = s
    .create_document(deed("TX-1", a.customer_id, ghost))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::UnknownCustomer(id)) if id == ghost
  ));

  // Neither the document nor any partial edge was written.
  assert!(s.get_document_by_code("TX-1".into()).await.unwrap().is_none());
  assert!(s.links_for_customer(a.customer_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_transaction_code_conflicts() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  s.create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .create_document(deed("TX-1", b.customer_id, a.customer_id))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateTransactionCode(ref code)) if code == "TX-1"
  ));
}

#[tokio::test]
async fn customer_declared_twice_conflicts() {
  let s = store().await;
  let (a, _) = two_customers(&s).await;

  let input = NewDocument {
    parties: vec![
      party(a.customer_id, PartyRole::PartyA),
      party(a.customer_id, PartyRole::PartyB),
    ],
    ..deed("TX-1", a.customer_id, a.customer_id)
  };
  let err = s.create_document(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateParty { customer_id, .. })
      if customer_id == a.customer_id
  ));
}

#[tokio::test]
async fn update_document_is_a_full_replace() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let updated = s
    .update_document(doc.document_id, DocumentUpdate {
      transaction_code: "TX-1-AMENDED".into(),
      secretary:        Some("S. Holm".into()),
      notary_public:    None,
      document_type:    Some("deed of sale".into()),
      description:      None,
      created_date:     ymd(2026, 3, 5),
    })
    .await
    .unwrap();

  assert_eq!(updated.transaction_code, "TX-1-AMENDED");
  assert_eq!(updated.secretary.as_deref(), Some("S. Holm"));
  assert_eq!(updated.created_date, ymd(2026, 3, 5));
  assert!(s.get_document_by_code("TX-1".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_missing_document_errors() {
  let s = store().await;
  let err = s
    .update_document(Uuid::new_v4(), DocumentUpdate {
      transaction_code: "TX-1".into(),
      secretary:        None,
      notary_public:    None,
      document_type:    None,
      description:      None,
      created_date:     ymd(2026, 1, 1),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DocumentNotFound(_))));
}

#[tokio::test]
async fn update_document_code_collision_conflicts() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  s.create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  let (second, _) = s
    .create_document(deed("TX-2", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .update_document(second.document_id, DocumentUpdate {
      transaction_code: "TX-1".into(),
      secretary:        None,
      notary_public:    None,
      document_type:    None,
      description:      None,
      created_date:     second.created_date,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::DuplicateTransactionCode(_))
  ));
}

#[tokio::test]
async fn delete_document_cascades_links_and_files() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  let file = s
    .add_file(NewFileRecord {
      document_id:  doc.document_id,
      file_name:    "deed.pdf".into(),
      file_size:    1024,
      content_type: "application/pdf".into(),
      bucket:       "acta".into(),
      object_key:   "deed.pdf".into(),
      content_hash: "ab".repeat(32),
    })
    .await
    .unwrap();

  s.delete_document(doc.document_id).await.unwrap();

  assert!(s.get_document(doc.document_id).await.unwrap().is_none());
  assert!(s.links_for_customer(a.customer_id).await.unwrap().is_empty());
  assert!(s.get_file(file.file_id).await.unwrap().is_none());
  // The customers themselves survive, now deletable.
  s.delete_customer(a.customer_id).await.unwrap();

  // Idempotent.
  s.delete_document(doc.document_id).await.unwrap();
}

#[tokio::test]
async fn documents_for_customer_paginates() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  for i in 0..3 {
    s.create_document(deed(&format!("TX-{i}"), a.customer_id, b.customer_id))
      .await
      .unwrap();
  }
  let (other, _) = s
    .create_document(deed("TX-OTHER", b.customer_id, a.customer_id))
    .await
    .unwrap();
  s.unlink_party(other.document_id, a.customer_id).await.unwrap();

  let page = s
    .documents_for_customer(a.customer_id, PageRequest::new(1, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(page.items.len(), 2);
  assert_eq!(page.total, 3);

  let rest = s
    .documents_for_customer(a.customer_id, PageRequest::new(2, 2).unwrap())
    .await
    .unwrap();
  assert_eq!(rest.items.len(), 1);
}

#[tokio::test]
async fn search_documents_spans_linked_customers() {
  let s = store().await;
  let alice = s
    .create_customer(person_with_keys(
      "Alice Andersson",
      Some("D-1990"),
      None,
      None,
    ))
    .await
    .unwrap();
  let bob = s.create_customer(person("Bob Berg")).await.unwrap();
  let carol = s.create_customer(person("Carol Crane")).await.unwrap();

  let (with_alice, _) = s
    .create_document(deed("TX-1", alice.customer_id, bob.customer_id))
    .await
    .unwrap();
  s.create_document(deed("TX-2", bob.customer_id, carol.customer_id))
    .await
    .unwrap();

  // Match on a linked customer's name.
  let by_name = s
    .search_documents(DocumentQuery {
      text: Some("Andersson".into()),
      page: PageRequest::first(),
    })
    .await
    .unwrap();
  assert_eq!(by_name.total, 1);
  assert_eq!(by_name.items[0].document_id, with_alice.document_id);

  // Match on a linked customer's natural key.
  let by_key = s
    .search_documents(DocumentQuery {
      text: Some("D-1990".into()),
      page: PageRequest::first(),
    })
    .await
    .unwrap();
  assert_eq!(by_key.total, 1);

  // Match on the document's own transaction code.
  let by_code = s
    .search_documents(DocumentQuery {
      text: Some("TX-2".into()),
      page: PageRequest::first(),
    })
    .await
    .unwrap();
  assert_eq!(by_code.total, 1);

  // Bob is on both documents; each appears once despite two join rows.
  let by_bob = s
    .search_documents(DocumentQuery {
      text: Some("Berg".into()),
      page: PageRequest::first(),
    })
    .await
    .unwrap();
  assert_eq!(by_bob.total, 2);
  assert_eq!(by_bob.items.len(), 2);
}

#[tokio::test]
async fn search_documents_blank_text_lists_all() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  s.create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let page = s
    .search_documents(DocumentQuery {
      text: Some("   ".into()),
      page: PageRequest::first(),
    })
    .await
    .unwrap();
  assert_eq!(page.total, 1);
}

#[tokio::test]
async fn documents_by_notary_date_filters_on_link_dates() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;

  let mut in_range = deed("TX-IN", a.customer_id, b.customer_id);
  in_range.parties[0].notary_date = Some(ymd(2026, 2, 10));
  in_range.parties[1].notary_date = Some(ymd(2026, 2, 20));
  let (wanted, _) = s.create_document(in_range).await.unwrap();

  let mut out_of_range = deed("TX-OUT", a.customer_id, b.customer_id);
  out_of_range.parties[0].notary_date = Some(ymd(2025, 12, 1));
  out_of_range.parties[1].notary_date = Some(ymd(2025, 12, 2));
  s.create_document(out_of_range).await.unwrap();

  let page = s
    .documents_by_notary_date(
      ymd(2026, 2, 1),
      ymd(2026, 2, 28),
      PageRequest::first(),
    )
    .await
    .unwrap();

  // Both links of TX-IN fall in the range; the document still counts once.
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].document_id, wanted.document_id);
}

// ─── Party links ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn link_and_unlink_party() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let carol = s.create_customer(person("Carol Crane")).await.unwrap();
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let link = s
    .link_party(NewPartyLink {
      document_id: doc.document_id,
      customer_id: carol.customer_id,
      role:        PartyRole::Witness,
      notary_date: Some(ymd(2026, 2, 14)),
    })
    .await
    .unwrap();
  assert_eq!(link.signature_status, SignatureStatus::Pending);
  assert_eq!(link.notary_date, ymd(2026, 2, 14));

  assert_eq!(s.links_for_document(doc.document_id).await.unwrap().len(), 3);

  s.unlink_party(doc.document_id, carol.customer_id).await.unwrap();
  assert_eq!(s.links_for_document(doc.document_id).await.unwrap().len(), 2);

  // Unlinking the already-missing edge is a no-op.
  s.unlink_party(doc.document_id, carol.customer_id).await.unwrap();
}

#[tokio::test]
async fn link_party_validates_both_ends() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .link_party(NewPartyLink {
      document_id: doc.document_id,
      customer_id: Uuid::new_v4(),
      role:        PartyRole::Witness,
      notary_date: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownCustomer(_))));

  let err = s
    .link_party(NewPartyLink {
      document_id: Uuid::new_v4(),
      customer_id: a.customer_id,
      role:        PartyRole::Witness,
      notary_date: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownDocument(_))));

  // Nothing was linked by the failed attempts.
  assert_eq!(s.links_for_document(doc.document_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn second_edge_for_same_pair_conflicts() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .link_party(NewPartyLink {
      document_id: doc.document_id,
      customer_id: a.customer_id,
      role:        PartyRole::Witness,
      notary_date: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateParty { .. })));
}

#[tokio::test]
async fn unlink_requires_a_known_customer() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .unlink_party(doc.document_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownCustomer(_))));
}

#[tokio::test]
async fn set_signature_status_updates_one_edge() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let link = s
    .set_signature_status(
      doc.document_id,
      a.customer_id,
      SignatureStatus::Signed,
    )
    .await
    .unwrap();
  assert_eq!(link.signature_status, SignatureStatus::Signed);

  // The other party's edge is untouched.
  let parties = s.links_for_document(doc.document_id).await.unwrap();
  let bob_edge = parties
    .iter()
    .find(|p| p.customer.customer_id == b.customer_id)
    .unwrap();
  assert_eq!(bob_edge.link.signature_status, SignatureStatus::Pending);
}

#[tokio::test]
async fn set_signature_status_on_missing_edge_errors() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let err = s
    .set_signature_status(
      doc.document_id,
      Uuid::new_v4(),
      SignatureStatus::Signed,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::LinkNotFound { .. })));
}

// ─── Cross-reference ─────────────────────────────────────────────────────────

#[tokio::test]
async fn cross_reference_finds_jointly_linked_documents() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let carol = s.create_customer(person("Carol Crane")).await.unwrap();

  // Shared by a and b; should qualify.
  let (shared, _) = s
    .create_document(deed("TX-SHARED", a.customer_id, b.customer_id))
    .await
    .unwrap();
  // Involves only a from the input set; should not.
  s.create_document(deed("TX-SOLO", a.customer_id, carol.customer_id))
    .await
    .unwrap();

  let hits = s
    .cross_reference(vec![a.customer_id, b.customer_id])
    .await
    .unwrap();

  assert_eq!(hits.len(), 2);
  assert!(hits.iter().all(|e| e.document.document_id == shared.document_id));
  let linked: Vec<_> = hits.iter().map(|e| e.link.customer_id).collect();
  assert!(linked.contains(&a.customer_id));
  assert!(linked.contains(&b.customer_id));
}

#[tokio::test]
async fn cross_reference_excludes_non_input_edges() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let carol = s.create_customer(person("Carol Crane")).await.unwrap();

  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  s.link_party(NewPartyLink {
    document_id: doc.document_id,
    customer_id: carol.customer_id,
    role:        PartyRole::Witness,
    notary_date: None,
  })
  .await
  .unwrap();

  let hits = s
    .cross_reference(vec![a.customer_id, b.customer_id])
    .await
    .unwrap();

  // Carol's edge exists but she was not in the input set.
  assert_eq!(hits.len(), 2);
  assert!(hits.iter().all(|e| e.link.customer_id != carol.customer_id));
}

#[tokio::test]
async fn cross_reference_needs_two_distinct_customers() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  s.create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  // The same customer listed twice counts once.
  let hits = s
    .cross_reference(vec![a.customer_id, a.customer_id])
    .await
    .unwrap();
  assert!(hits.is_empty());

  assert!(s.cross_reference(vec![a.customer_id]).await.unwrap().is_empty());
  assert!(s.cross_reference(Vec::new()).await.unwrap().is_empty());
}

// ─── Files ───────────────────────────────────────────────────────────────────

fn pdf(document_id: Uuid, name: &str) -> NewFileRecord {
  NewFileRecord {
    document_id,
    file_name: name.into(),
    file_size: 2048,
    content_type: "application/pdf".into(),
    bucket: "acta".into(),
    object_key: format!("objects/{name}"),
    content_hash: "cd".repeat(32),
  }
}

#[tokio::test]
async fn add_and_list_files() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();

  let first = s.add_file(pdf(doc.document_id, "deed.pdf")).await.unwrap();
  s.add_file(pdf(doc.document_id, "annex.pdf")).await.unwrap();

  let fetched = s.get_file(first.file_id).await.unwrap().unwrap();
  assert_eq!(fetched.file_name, "deed.pdf");
  assert_eq!(fetched.file_size, 2048);
  assert!(fetched.signature.is_none());

  let files = s.files_for_document(doc.document_id).await.unwrap();
  assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn add_file_requires_a_known_document() {
  let s = store().await;
  let err = s.add_file(pdf(Uuid::new_v4(), "ghost.pdf")).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UnknownDocument(_))));
}

#[tokio::test]
async fn delete_file_is_idempotent() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  let file = s.add_file(pdf(doc.document_id, "deed.pdf")).await.unwrap();

  s.delete_file(file.file_id).await.unwrap();
  assert!(s.get_file(file.file_id).await.unwrap().is_none());
  s.delete_file(file.file_id).await.unwrap();
}

#[tokio::test]
async fn set_file_signature() {
  let s = store().await;
  let (a, b) = two_customers(&s).await;
  let (doc, _) = s
    .create_document(deed("TX-1", a.customer_id, b.customer_id))
    .await
    .unwrap();
  let file = s.add_file(pdf(doc.document_id, "deed.pdf")).await.unwrap();

  let signed = s
    .set_file_signature(file.file_id, "deadbeef".into())
    .await
    .unwrap();
  assert_eq!(signed.signature.as_deref(), Some("deadbeef"));

  let err = s
    .set_file_signature(Uuid::new_v4(), "deadbeef".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::FileNotFound(_))));
}
