//! Handlers for `/documents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/documents` | Paged |
//! | `POST`   | `/documents` | Body: [`NewDocument`] incl. declared parties |
//! | `GET`    | `/documents/search?text=` | Spans linked customers |
//! | `GET`    | `/documents/by-date?from=&to=` | Range over link notary dates |
//! | `GET`    | `/documents/by-code/:code` | Lookup by transaction code |
//! | `GET`    | `/documents/cross-reference?customers=a,b` | ≥ 2 shared parties |
//! | `GET`    | `/documents/:id` | 404 if not found |
//! | `PUT`    | `/documents/:id` | Full replace |
//! | `DELETE` | `/documents/:id` | 204; cascades links and file metadata |

use acta_core::{
  Error as CoreError,
  blob::BlobStore,
  document::{Document, DocumentUpdate, NewDocument},
  link::{PartyEngagement, PartyLink},
  page::Page,
  store::{DocumentQuery, RecordStore},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ApiState, PageParams,
  error::{ApiError, store_err},
};

// ─── List / create ───────────────────────────────────────────────────────────

/// `GET /documents[?page_number=&page_size=]`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<Document>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let page = state
    .store
    .list_documents(params.into_request()?)
    .await
    .map_err(store_err)?;
  Ok(Json(page))
}

/// Response body of `POST /documents`.
#[derive(Debug, Serialize)]
pub struct CreatedDocument {
  pub document: Document,
  pub parties:  Vec<PartyLink>,
}

/// `POST /documents` — body: [`NewDocument`]
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Json(body): Json<NewDocument>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let (document, parties) =
    state.store.create_document(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(CreatedDocument { document, parties })))
}

// ─── Search ──────────────────────────────────────────────────────────────────

// Pagination fields are inlined rather than `#[serde(flatten)]`-ed:
// serde_urlencoded cannot drive numeric fields through a flatten.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub text:        Option<String>,
  pub page_number: Option<u32>,
  pub page_size:   Option<u32>,
}

/// `GET /documents/search[?text=...]`
pub async fn search<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Page<Document>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let page = PageParams {
    page_number: params.page_number,
    page_size:   params.page_size,
  };
  let query = DocumentQuery { text: params.text, page: page.into_request()? };
  let page =
    state.store.search_documents(query).await.map_err(store_err)?;
  Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
  pub from:        NaiveDate,
  pub to:          NaiveDate,
  pub page_number: Option<u32>,
  pub page_size:   Option<u32>,
}

/// `GET /documents/by-date?from=YYYY-MM-DD&to=YYYY-MM-DD`
pub async fn by_notary_date<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<DateRangeParams>,
) -> Result<Json<Page<Document>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  if params.from > params.to {
    return Err(ApiError::BadRequest("from must not be after to".into()));
  }
  let page = PageParams {
    page_number: params.page_number,
    page_size:   params.page_size,
  };
  let page = state
    .store
    .documents_by_notary_date(params.from, params.to, page.into_request()?)
    .await
    .map_err(store_err)?;
  Ok(Json(page))
}

// ─── Cross-reference ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CrossReferenceParams {
  /// Comma-separated customer UUIDs.
  pub customers: String,
}

/// `GET /documents/cross-reference?customers=<id>,<id>[,...]`
pub async fn cross_reference<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<CrossReferenceParams>,
) -> Result<Json<Vec<PartyEngagement>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let ids = params
    .customers
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| {
      Uuid::parse_str(s)
        .map_err(|_| ApiError::BadRequest(format!("invalid customer id {s:?}")))
    })
    .collect::<Result<Vec<_>, _>>()?;

  let engagements =
    state.store.cross_reference(ids).await.map_err(store_err)?;
  Ok(Json(engagements))
}

// ─── Single-document operations ──────────────────────────────────────────────

/// `GET /documents/:id`
pub async fn get_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let document = state
    .store
    .get_document(id)
    .await
    .map_err(store_err)?
    .ok_or(ApiError::Store(CoreError::DocumentNotFound(id)))?;
  Ok(Json(document))
}

/// `GET /documents/by-code/:code`
pub async fn by_code<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(code): Path<String>,
) -> Result<Json<Document>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let document = state
    .store
    .get_document_by_code(code.clone())
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no document with code {code:?}"))
    })?;
  Ok(Json(document))
}

/// `PUT /documents/:id` — full replace, body: [`DocumentUpdate`]
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DocumentUpdate>,
) -> Result<Json<Document>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let document = state
    .store
    .update_document(id, body)
    .await
    .map_err(store_err)?;
  Ok(Json(document))
}

/// `DELETE /documents/:id` — idempotent; cascades links and file metadata.
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  state.store.delete_document(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}
