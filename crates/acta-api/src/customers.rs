//! Handlers for `/customers` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/customers` | Paged |
//! | `POST`   | `/customers` | Body: [`NewCustomer`] |
//! | `GET`    | `/customers/search?identity=` | Substring over natural keys |
//! | `GET`    | `/customers/duplicates?document_id=&passport_id=&business_registration_number=` | Advisory duplicate check |
//! | `GET`    | `/customers/:id` | 404 if not found |
//! | `PUT`    | `/customers/:id` | Full replace |
//! | `DELETE` | `/customers/:id` | 204; 409 while the customer is linked |
//! | `GET`    | `/customers/:id/documents` | Paged |

use acta_core::{
  Error as CoreError,
  blob::BlobStore,
  customer::{Customer, NaturalKeys, NewCustomer},
  document::Document,
  page::Page,
  store::RecordStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState, PageParams,
  error::{ApiError, store_err},
};

// ─── List / create ───────────────────────────────────────────────────────────

/// `GET /customers[?page_number=&page_size=]`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<Customer>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let page = state
    .store
    .list_customers(params.into_request()?)
    .await
    .map_err(store_err)?;
  Ok(Json(page))
}

/// `POST /customers` — body: [`NewCustomer`]
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Json(body): Json<NewCustomer>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let customer =
    state.store.create_customer(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(customer)))
}

// ─── Identity search / duplicates ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IdentityParams {
  pub identity: String,
}

/// `GET /customers/search?identity=<substring>`
pub async fn search<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(params): Query<IdentityParams>,
) -> Result<Json<Vec<Customer>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  if params.identity.trim().is_empty() {
    return Err(ApiError::BadRequest("identity must not be empty".into()));
  }
  let customers = state
    .store
    .search_customers_by_identity(params.identity)
    .await
    .map_err(store_err)?;
  Ok(Json(customers))
}

/// `GET /customers/duplicates?document_id=&passport_id=&business_registration_number=`
///
/// Advisory only — creation is still guarded by the storage-level
/// constraints.
pub async fn duplicates<S, B>(
  State(state): State<ApiState<S, B>>,
  Query(keys): Query<NaturalKeys>,
) -> Result<Json<Vec<Customer>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let matches =
    state.store.find_duplicates(keys).await.map_err(store_err)?;
  Ok(Json(matches))
}

// ─── Single-customer operations ──────────────────────────────────────────────

/// `GET /customers/:id`
pub async fn get_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Customer>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let customer = state
    .store
    .get_customer(id)
    .await
    .map_err(store_err)?
    .ok_or(ApiError::Store(CoreError::CustomerNotFound(id)))?;
  Ok(Json(customer))
}

/// `PUT /customers/:id` — full replace, body: [`NewCustomer`]
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewCustomer>,
) -> Result<Json<Customer>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let customer = state
    .store
    .update_customer(id, body)
    .await
    .map_err(store_err)?;
  Ok(Json(customer))
}

/// `DELETE /customers/:id` — idempotent; 409 while party links exist.
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  state.store.delete_customer(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /customers/:id/documents[?page_number=&page_size=]`
pub async fn documents<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Page<Document>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let page = state
    .store
    .documents_for_customer(id, params.into_request()?)
    .await
    .map_err(store_err)?;
  Ok(Json(page))
}
