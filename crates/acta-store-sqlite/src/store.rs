//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::{collections::HashSet, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use acta_core::{
  Error as CoreError,
  customer::{Customer, NaturalKeyKind, NaturalKeys, NewCustomer},
  document::{Document, DocumentUpdate, NewDocument},
  file::{FileRecord, NewFileRecord},
  link::{
    LinkedParty, NewPartyLink, PartyEngagement, PartyLink, SignatureStatus,
  },
  page::{Page, PageRequest},
  store::{DocumentQuery, RecordStore},
};

use crate::{
  Error, Result,
  encode::{
    CUSTOMER_COLS, DOCUMENT_COLS, FILE_COLS, LINK_COLS, RawCustomer,
    RawDocument, RawFile, RawLink, encode_customer_kind, encode_date,
    encode_dt, encode_role, encode_status, encode_uuid, qualify,
  },
  schema::SCHEMA,
};

// ─── Conflict mapping ────────────────────────────────────────────────────────

/// The constraint message of a UNIQUE/PRIMARY KEY violation, if `err` is one.
fn unique_violation(err: &tokio_rusqlite::Error) -> Option<&str> {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    e,
    Some(msg),
  )) = err
    && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
      || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
  {
    return Some(msg.as_str());
  }
  None
}

/// Translate a natural-key index violation into the Conflict it represents.
fn map_customer_conflict(err: tokio_rusqlite::Error, keys: &NaturalKeys) -> Error {
  let constraint = unique_violation(&err).map(str::to_owned);
  let dup = |kind: NaturalKeyKind| {
    Error::Core(CoreError::DuplicateNaturalKey {
      kind,
      value: keys.get(kind).unwrap_or_default().to_owned(),
    })
  };
  match constraint.as_deref() {
    Some(m) if m.contains("customers.document_id") => {
      dup(NaturalKeyKind::DocumentId)
    }
    Some(m) if m.contains("customers.passport_id") => {
      dup(NaturalKeyKind::PassportId)
    }
    Some(m) if m.contains("customers.business_registration_number") => {
      dup(NaturalKeyKind::BusinessRegistrationNumber)
    }
    _ => Error::Database(err),
  }
}

/// Translate a transaction-code index violation into a Conflict.
fn map_document_conflict(err: tokio_rusqlite::Error, code: &str) -> Error {
  let constraint = unique_violation(&err).map(str::to_owned);
  match constraint.as_deref() {
    Some(m) if m.contains("documents.transaction_code") => {
      Error::Core(CoreError::DuplicateTransactionCode(code.to_owned()))
    }
    _ => Error::Database(err),
  }
}

/// Outcome of the existence checks that precede a link write.
enum LinkCheck {
  Ok,
  MissingCustomer,
  MissingDocument,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Acta record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — the reference backend for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn fetch_link(
    &self,
    document_id: Uuid,
    customer_id: Uuid,
  ) -> Result<Option<PartyLink>> {
    let doc_str = encode_uuid(document_id);
    let cust_str = encode_uuid(customer_id);

    let raw: Option<RawLink> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {LINK_COLS} FROM party_links
                 WHERE document_id = ?1 AND customer_id = ?2"
              ),
              rusqlite::params![doc_str, cust_str],
              |row| RawLink::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLink::into_link).transpose()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn create_customer(&self, input: NewCustomer) -> Result<Customer> {
    let now = Utc::now();
    let customer = Customer {
      customer_id:   Uuid::new_v4(),
      full_name:     input.full_name,
      address:       input.address,
      phone:         input.phone,
      email:         input.email,
      kind:          input.kind,
      business_name: input.business_name,
      keys:          input.keys.normalized(),
      created_at:    now,
      updated_at:    now,
    };

    let id_str    = encode_uuid(customer.customer_id);
    let full_name = customer.full_name.clone();
    let address   = customer.address.clone();
    let phone     = customer.phone.clone();
    let email     = customer.email.clone();
    let kind_str  = encode_customer_kind(customer.kind).to_owned();
    let business  = customer.business_name.clone();
    let keys      = customer.keys.clone();
    let key_row   = keys.clone();
    let at_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (
             customer_id, full_name, address, phone, email, kind,
             business_name, document_id, passport_id,
             business_registration_number, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
          rusqlite::params![
            id_str,
            full_name,
            address,
            phone,
            email,
            kind_str,
            business,
            key_row.document_id,
            key_row.passport_id,
            key_row.business_registration_number,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| map_customer_conflict(e, &keys))?;

    Ok(customer)
  }

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CUSTOMER_COLS} FROM customers WHERE customer_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| RawCustomer::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn get_customer_by_natural_key(
    &self,
    kind: NaturalKeyKind,
    value: String,
  ) -> Result<Option<Customer>> {
    let column = match kind {
      NaturalKeyKind::DocumentId => "document_id",
      NaturalKeyKind::PassportId => "passport_id",
      NaturalKeyKind::BusinessRegistrationNumber => {
        "business_registration_number"
      }
    };
    let value = value.trim().to_owned();
    if value.is_empty() {
      return Ok(None);
    }

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CUSTOMER_COLS} FROM customers WHERE {column} = ?1"
              ),
              rusqlite::params![value],
              |row| RawCustomer::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn find_duplicates(
    &self,
    keys: NaturalKeys,
  ) -> Result<Vec<Customer>> {
    let keys = keys.normalized();
    if keys.is_empty() {
      // No duplicate check possible; not an error.
      return Ok(Vec::new());
    }

    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        // A NULL parameter never compares equal, so absent keys match
        // nothing. One row per customer, even on a multi-key match.
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOMER_COLS} FROM customers
           WHERE document_id = ?1
              OR passport_id = ?2
              OR business_registration_number = ?3
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              keys.document_id,
              keys.passport_id,
              keys.business_registration_number,
            ],
            |row| RawCustomer::read(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomer::into_customer).collect()
  }

  async fn search_customers_by_identity(
    &self,
    needle: String,
  ) -> Result<Vec<Customer>> {
    let pattern = format!("%{}%", needle.trim());

    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOMER_COLS} FROM customers
           WHERE document_id LIKE ?1
              OR passport_id LIKE ?1
              OR business_registration_number LIKE ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| {
            RawCustomer::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomer::into_customer).collect()
  }

  async fn list_customers(
    &self,
    page: PageRequest,
  ) -> Result<Page<Customer>> {
    let limit  = i64::from(page.page_size());
    let offset = page.offset() as i64;

    let (total, raws): (i64, Vec<RawCustomer>) = self
      .conn
      .call(move |conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM customers", [], |r| r.get(0))?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {CUSTOMER_COLS} FROM customers
           ORDER BY created_at DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], |row| {
            RawCustomer::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawCustomer::into_customer)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total as u64, page))
  }

  async fn update_customer(
    &self,
    id: Uuid,
    input: NewCustomer,
  ) -> Result<Customer> {
    let keys    = input.keys.normalized();
    let id_str  = encode_uuid(id);
    let key_row = keys.clone();
    let at_str  = encode_dt(Utc::now());
    let kind_str = encode_customer_kind(input.kind).to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE customers SET
             full_name = ?2, address = ?3, phone = ?4, email = ?5,
             kind = ?6, business_name = ?7, document_id = ?8,
             passport_id = ?9, business_registration_number = ?10,
             updated_at = ?11
           WHERE customer_id = ?1",
          rusqlite::params![
            id_str,
            input.full_name,
            input.address,
            input.phone,
            input.email,
            kind_str,
            input.business_name,
            key_row.document_id,
            key_row.passport_id,
            key_row.business_registration_number,
            at_str,
          ],
        )?;
        Ok(n)
      })
      .await
      .map_err(|e| map_customer_conflict(e, &keys))?;

    if changed == 0 {
      return Err(Error::Core(CoreError::CustomerNotFound(id)));
    }
    self
      .get_customer(id)
      .await?
      .ok_or(Error::Core(CoreError::CustomerNotFound(id)))
  }

  async fn delete_customer(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let has_links = self
      .conn
      .call(move |conn| {
        let links: i64 = conn.query_row(
          "SELECT COUNT(*) FROM party_links WHERE customer_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        if links > 0 {
          return Ok(true);
        }
        conn.execute(
          "DELETE FROM customers WHERE customer_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(false)
      })
      .await?;

    if has_links {
      return Err(Error::Core(CoreError::CustomerInUse(id)));
    }
    Ok(())
  }

  async fn customer_exists(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM customers WHERE customer_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(()),
            )
            .optional()?
            .is_some(),
        )
      })
      .await?;
    Ok(found)
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn create_document(
    &self,
    input: NewDocument,
  ) -> Result<(Document, Vec<PartyLink>)> {
    input.check_role_quorum()?;

    let now   = Utc::now();
    let today = now.date_naive();

    let document = Document {
      document_id:      Uuid::new_v4(),
      transaction_code: input.transaction_code,
      secretary:        input.secretary,
      notary_public:    input.notary_public,
      document_type:    input.document_type,
      description:      input.description,
      created_date:     input.created_date.unwrap_or(today),
      created_at:       now,
      updated_at:       now,
    };

    // A customer may appear only once per document, whatever the roles.
    let mut seen = HashSet::new();
    let mut links = Vec::with_capacity(input.parties.len());
    for party in &input.parties {
      if !seen.insert(party.customer_id) {
        return Err(Error::Core(CoreError::DuplicateParty {
          document_id: document.document_id,
          customer_id: party.customer_id,
        }));
      }
      links.push(PartyLink {
        document_id:      document.document_id,
        customer_id:      party.customer_id,
        role:             party.role,
        signature_status: party.signature_status.unwrap_or_default(),
        notary_date:      party.notary_date.unwrap_or(today),
        created_at:       now,
      });
    }

    let doc_id_str = encode_uuid(document.document_id);
    let code       = document.transaction_code.clone();
    let code_param = code.clone();
    let secretary  = document.secretary.clone();
    let notary     = document.notary_public.clone();
    let doc_type   = document.document_type.clone();
    let descr      = document.description.clone();
    let date_str   = encode_date(document.created_date);
    let at_str     = encode_dt(now);
    let link_rows: Vec<[String; 6]> = links
      .iter()
      .map(|l| {
        [
          encode_uuid(l.document_id),
          encode_uuid(l.customer_id),
          encode_role(l.role).to_owned(),
          encode_status(l.signature_status).to_owned(),
          encode_date(l.notary_date),
          encode_dt(l.created_at),
        ]
      })
      .collect();

    let missing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          // Every referenced customer must exist before anything persists.
          let mut check =
            tx.prepare("SELECT 1 FROM customers WHERE customer_id = ?1")?;
          for row in &link_rows {
            let found = check
              .query_row(rusqlite::params![row[1]], |_| Ok(()))
              .optional()?;
            if found.is_none() {
              return Ok(Some(row[1].clone()));
            }
          }

          tx.execute(
            "INSERT INTO documents (
               document_id, transaction_code, secretary, notary_public,
               document_type, description, created_date, created_at,
               updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            rusqlite::params![
              doc_id_str, code_param, secretary, notary, doc_type, descr,
              date_str, at_str,
            ],
          )?;

          let mut insert = tx.prepare(
            "INSERT INTO party_links (
               document_id, customer_id, role, signature_status,
               notary_date, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for row in &link_rows {
            insert.execute(rusqlite::params![
              row[0], row[1], row[2], row[3], row[4], row[5],
            ])?;
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await
      .map_err(|e| map_document_conflict(e, &code))?;

    if let Some(id_str) = missing {
      let id = crate::encode::decode_uuid(&id_str)?;
      return Err(Error::Core(CoreError::UnknownCustomer(id)));
    }
    Ok((document, links))
  }

  async fn get_document(&self, id: Uuid) -> Result<Option<Document>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DOCUMENT_COLS} FROM documents WHERE document_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| RawDocument::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn get_document_by_code(
    &self,
    code: String,
  ) -> Result<Option<Document>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DOCUMENT_COLS} FROM documents
                 WHERE transaction_code = ?1"
              ),
              rusqlite::params![code],
              |row| RawDocument::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn documents_for_customer(
    &self,
    customer_id: Uuid,
    page: PageRequest,
  ) -> Result<Page<Document>> {
    let cust_str = encode_uuid(customer_id);
    let limit    = i64::from(page.page_size());
    let offset   = page.offset() as i64;
    let cols     = qualify(DOCUMENT_COLS, "d");

    let (total, raws): (i64, Vec<RawDocument>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM party_links WHERE customer_id = ?1",
          rusqlite::params![cust_str.clone()],
          |r| r.get(0),
        )?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {cols}
           FROM documents d
           JOIN party_links pl ON pl.document_id = d.document_id
           WHERE pl.customer_id = ?1
           ORDER BY d.created_date DESC, d.created_at DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![cust_str, limit, offset], |row| {
            RawDocument::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawDocument::into_document)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total as u64, page))
  }

  async fn search_documents(
    &self,
    query: DocumentQuery,
  ) -> Result<Page<Document>> {
    let pattern = query
      .text
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(|t| format!("%{t}%"));

    let Some(pattern) = pattern else {
      return self.list_documents(query.page).await;
    };

    let page   = query.page;
    let limit  = i64::from(page.page_size());
    let offset = page.offset() as i64;
    let cols   = qualify(DOCUMENT_COLS, "d");

    // One logical search spanning the join: the document's own fields plus
    // the names and natural keys of its linked customers.
    const CONDS: &str = "d.transaction_code LIKE ?1
        OR d.notary_public LIKE ?1
        OR d.secretary LIKE ?1
        OR d.document_type LIKE ?1
        OR d.description LIKE ?1
        OR c.full_name LIKE ?1
        OR c.document_id LIKE ?1
        OR c.passport_id LIKE ?1
        OR c.business_registration_number LIKE ?1";

    let (total, raws): (i64, Vec<RawDocument>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!(
            "SELECT COUNT(DISTINCT d.document_id)
             FROM documents d
             LEFT JOIN party_links pl ON pl.document_id = d.document_id
             LEFT JOIN customers c ON c.customer_id = pl.customer_id
             WHERE {CONDS}"
          ),
          rusqlite::params![pattern.clone()],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT {cols}
           FROM documents d
           LEFT JOIN party_links pl ON pl.document_id = d.document_id
           LEFT JOIN customers c ON c.customer_id = pl.customer_id
           WHERE {CONDS}
           ORDER BY d.created_date DESC, d.created_at DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, limit, offset], |row| {
            RawDocument::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawDocument::into_document)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total as u64, page))
  }

  async fn documents_by_notary_date(
    &self,
    from: NaiveDate,
    to: NaiveDate,
    page: PageRequest,
  ) -> Result<Page<Document>> {
    let from_str = encode_date(from);
    let to_str   = encode_date(to);
    let limit    = i64::from(page.page_size());
    let offset   = page.offset() as i64;
    let cols     = qualify(DOCUMENT_COLS, "d");

    let (total, raws): (i64, Vec<RawDocument>) = self
      .conn
      .call(move |conn| {
        // The range filter is on the party links' notary dates, not the
        // document's own created_date.
        let total: i64 = conn.query_row(
          "SELECT COUNT(DISTINCT d.document_id)
           FROM documents d
           JOIN party_links pl ON pl.document_id = d.document_id
           WHERE pl.notary_date >= ?1 AND pl.notary_date <= ?2",
          rusqlite::params![from_str.clone(), to_str.clone()],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT {cols}
           FROM documents d
           JOIN party_links pl ON pl.document_id = d.document_id
           WHERE pl.notary_date >= ?1 AND pl.notary_date <= ?2
           ORDER BY d.created_date DESC, d.created_at DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![from_str, to_str, limit, offset],
            |row| RawDocument::read(row, 0),
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawDocument::into_document)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total as u64, page))
  }

  async fn list_documents(
    &self,
    page: PageRequest,
  ) -> Result<Page<Document>> {
    let limit  = i64::from(page.page_size());
    let offset = page.offset() as i64;

    let (total, raws): (i64, Vec<RawDocument>) = self
      .conn
      .call(move |conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {DOCUMENT_COLS} FROM documents
           ORDER BY created_date DESC, created_at DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], |row| {
            RawDocument::read(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawDocument::into_document)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, total as u64, page))
  }

  async fn update_document(
    &self,
    id: Uuid,
    input: DocumentUpdate,
  ) -> Result<Document> {
    let id_str   = encode_uuid(id);
    let code     = input.transaction_code.clone();
    let date_str = encode_date(input.created_date);
    let at_str   = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE documents SET
             transaction_code = ?2, secretary = ?3, notary_public = ?4,
             document_type = ?5, description = ?6, created_date = ?7,
             updated_at = ?8
           WHERE document_id = ?1",
          rusqlite::params![
            id_str,
            input.transaction_code,
            input.secretary,
            input.notary_public,
            input.document_type,
            input.description,
            date_str,
            at_str,
          ],
        )?;
        Ok(n)
      })
      .await
      .map_err(|e| map_document_conflict(e, &code))?;

    if changed == 0 {
      return Err(Error::Core(CoreError::DocumentNotFound(id)));
    }
    self
      .get_document(id)
      .await?
      .ok_or(Error::Core(CoreError::DocumentNotFound(id)))
  }

  async fn delete_document(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        // Party links and file metadata go with it (ON DELETE CASCADE).
        conn.execute(
          "DELETE FROM documents WHERE document_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Party links ───────────────────────────────────────────────────────────

  async fn link_party(&self, input: NewPartyLink) -> Result<PartyLink> {
    let now  = Utc::now();
    let link = PartyLink {
      document_id:      input.document_id,
      customer_id:      input.customer_id,
      role:             input.role,
      signature_status: SignatureStatus::Pending,
      notary_date:      input.notary_date.unwrap_or_else(|| now.date_naive()),
      created_at:       now,
    };

    let doc_str    = encode_uuid(link.document_id);
    let cust_str   = encode_uuid(link.customer_id);
    let role_str   = encode_role(link.role).to_owned();
    let status_str = encode_status(link.signature_status).to_owned();
    let date_str   = encode_date(link.notary_date);
    let at_str     = encode_dt(now);

    let check = self
      .conn
      .call(move |conn| {
        let customer = conn
          .query_row(
            "SELECT 1 FROM customers WHERE customer_id = ?1",
            rusqlite::params![cust_str],
            |_| Ok(()),
          )
          .optional()?;
        if customer.is_none() {
          return Ok(LinkCheck::MissingCustomer);
        }

        let document = conn
          .query_row(
            "SELECT 1 FROM documents WHERE document_id = ?1",
            rusqlite::params![doc_str.clone()],
            |_| Ok(()),
          )
          .optional()?;
        if document.is_none() {
          return Ok(LinkCheck::MissingDocument);
        }

        conn.execute(
          "INSERT INTO party_links (
             document_id, customer_id, role, signature_status,
             notary_date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            doc_str, cust_str, role_str, status_str, date_str, at_str,
          ],
        )?;
        Ok(LinkCheck::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some() {
          Error::Core(CoreError::DuplicateParty {
            document_id: link.document_id,
            customer_id: link.customer_id,
          })
        } else {
          Error::Database(e)
        }
      })?;

    match check {
      LinkCheck::Ok => Ok(link),
      LinkCheck::MissingCustomer => {
        Err(Error::Core(CoreError::UnknownCustomer(link.customer_id)))
      }
      LinkCheck::MissingDocument => {
        Err(Error::Core(CoreError::UnknownDocument(link.document_id)))
      }
    }
  }

  async fn unlink_party(
    &self,
    document_id: Uuid,
    customer_id: Uuid,
  ) -> Result<()> {
    let doc_str  = encode_uuid(document_id);
    let cust_str = encode_uuid(customer_id);

    let customer_found = self
      .conn
      .call(move |conn| {
        let found = conn
          .query_row(
            "SELECT 1 FROM customers WHERE customer_id = ?1",
            rusqlite::params![cust_str.clone()],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if found {
          // A missing edge is a silent no-op.
          conn.execute(
            "DELETE FROM party_links
             WHERE document_id = ?1 AND customer_id = ?2",
            rusqlite::params![doc_str, cust_str],
          )?;
        }
        Ok(found)
      })
      .await?;

    if !customer_found {
      return Err(Error::Core(CoreError::UnknownCustomer(customer_id)));
    }
    Ok(())
  }

  async fn links_for_document(
    &self,
    document_id: Uuid,
  ) -> Result<Vec<LinkedParty>> {
    let doc_str    = encode_uuid(document_id);
    let link_cols  = qualify(LINK_COLS, "pl");
    let cust_cols  = qualify(CUSTOMER_COLS, "c");

    let raws: Vec<(RawLink, RawCustomer)> = self
      .conn
      .call(move |conn| {
        // 'party_a' < 'party_b' < 'witness', so ORDER BY role is the
        // role order the callers expect.
        let mut stmt = conn.prepare(&format!(
          "SELECT {link_cols}, {cust_cols}
           FROM party_links pl
           JOIN customers c ON c.customer_id = pl.customer_id
           WHERE pl.document_id = ?1
           ORDER BY pl.role, c.full_name"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![doc_str], |row| {
            Ok((RawLink::read(row, 0)?, RawCustomer::read(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(link, customer)| {
        Ok(LinkedParty {
          customer: customer.into_customer()?,
          link:     link.into_link()?,
        })
      })
      .collect()
  }

  async fn links_for_customer(
    &self,
    customer_id: Uuid,
  ) -> Result<Vec<PartyEngagement>> {
    let cust_str  = encode_uuid(customer_id);
    let link_cols = qualify(LINK_COLS, "pl");
    let doc_cols  = qualify(DOCUMENT_COLS, "d");

    let raws: Vec<(RawLink, RawDocument)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {link_cols}, {doc_cols}
           FROM party_links pl
           JOIN documents d ON d.document_id = pl.document_id
           WHERE pl.customer_id = ?1
           ORDER BY pl.notary_date DESC, pl.role"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![cust_str], |row| {
            Ok((RawLink::read(row, 0)?, RawDocument::read(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(link, document)| {
        Ok(PartyEngagement {
          document: document.into_document()?,
          link:     link.into_link()?,
        })
      })
      .collect()
  }

  async fn cross_reference(
    &self,
    customer_ids: Vec<Uuid>,
  ) -> Result<Vec<PartyEngagement>> {
    // Distinct-customer semantics start at the input: a customer listed
    // twice counts once.
    let distinct: HashSet<Uuid> = customer_ids.into_iter().collect();
    if distinct.len() < 2 {
      return Ok(Vec::new());
    }
    let ids: Vec<String> = distinct.into_iter().map(encode_uuid).collect();

    let link_cols = qualify(LINK_COLS, "pl");
    let doc_cols  = qualify(DOCUMENT_COLS, "d");
    let placeholders = (1..=ids.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");

    let raws: Vec<(RawLink, RawDocument)> = self
      .conn
      .call(move |conn| {
        // A document qualifies only when two or more distinct customers
        // from the input set are linked to it; only the input customers'
        // edges are returned.
        let mut stmt = conn.prepare(&format!(
          "SELECT {link_cols}, {doc_cols}
           FROM party_links pl
           JOIN documents d ON d.document_id = pl.document_id
           WHERE pl.customer_id IN ({placeholders})
             AND pl.document_id IN (
               SELECT document_id FROM party_links
               WHERE customer_id IN ({placeholders})
               GROUP BY document_id
               HAVING COUNT(DISTINCT customer_id) >= 2)
           ORDER BY pl.notary_date DESC, d.transaction_code"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((RawLink::read(row, 0)?, RawDocument::read(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(link, document)| {
        Ok(PartyEngagement {
          document: document.into_document()?,
          link:     link.into_link()?,
        })
      })
      .collect()
  }

  async fn set_signature_status(
    &self,
    document_id: Uuid,
    customer_id: Uuid,
    status: SignatureStatus,
  ) -> Result<PartyLink> {
    let doc_str    = encode_uuid(document_id);
    let cust_str   = encode_uuid(customer_id);
    let status_str = encode_status(status).to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE party_links SET signature_status = ?3
           WHERE document_id = ?1 AND customer_id = ?2",
          rusqlite::params![doc_str, cust_str, status_str],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(CoreError::LinkNotFound {
        document_id,
        customer_id,
      }));
    }
    self
      .fetch_link(document_id, customer_id)
      .await?
      .ok_or(Error::Core(CoreError::LinkNotFound {
        document_id,
        customer_id,
      }))
  }

  // ── Files ─────────────────────────────────────────────────────────────────

  async fn add_file(&self, input: NewFileRecord) -> Result<FileRecord> {
    let now  = Utc::now();
    let file = FileRecord {
      file_id:      Uuid::new_v4(),
      document_id:  input.document_id,
      file_name:    input.file_name,
      file_size:    input.file_size,
      content_type: input.content_type,
      bucket:       input.bucket,
      object_key:   input.object_key,
      content_hash: input.content_hash,
      signature:    None,
      created_at:   now,
    };

    let file_id_str = encode_uuid(file.file_id);
    let doc_str     = encode_uuid(file.document_id);
    let file_name   = file.file_name.clone();
    let file_size   = i64::try_from(file.file_size)
      .map_err(|_| Error::Decode("file size exceeds i64".into()))?;
    let content_type = file.content_type.clone();
    let bucket       = file.bucket.clone();
    let object_key   = file.object_key.clone();
    let content_hash = file.content_hash.clone();
    let at_str       = encode_dt(now);

    let document_found = self
      .conn
      .call(move |conn| {
        let found = conn
          .query_row(
            "SELECT 1 FROM documents WHERE document_id = ?1",
            rusqlite::params![doc_str.clone()],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !found {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO document_files (
             file_id, document_id, file_name, file_size, content_type,
             bucket, object_key, content_hash, signature, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9)",
          rusqlite::params![
            file_id_str, doc_str, file_name, file_size, content_type,
            bucket, object_key, content_hash, at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !document_found {
      return Err(Error::Core(CoreError::UnknownDocument(file.document_id)));
    }
    Ok(file)
  }

  async fn get_file(&self, id: Uuid) -> Result<Option<FileRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {FILE_COLS} FROM document_files WHERE file_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| RawFile::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFile::into_file).transpose()
  }

  async fn files_for_document(
    &self,
    document_id: Uuid,
  ) -> Result<Vec<FileRecord>> {
    let doc_str = encode_uuid(document_id);

    let raws: Vec<RawFile> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FILE_COLS} FROM document_files
           WHERE document_id = ?1
           ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![doc_str], |row| RawFile::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }

  async fn delete_file(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM document_files WHERE file_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_file_signature(
    &self,
    id: Uuid,
    signature: String,
  ) -> Result<FileRecord> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE document_files SET signature = ?2 WHERE file_id = ?1",
          rusqlite::params![id_str, signature],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(CoreError::FileNotFound(id)));
    }
    self
      .get_file(id)
      .await?
      .ok_or(Error::Core(CoreError::FileNotFound(id)))
  }
}
