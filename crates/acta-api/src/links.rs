//! Handlers for party-link endpoints under `/documents/:id/parties`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/documents/:id/parties` | Link + customer per edge |
//! | `POST`   | `/documents/:id/parties` | Body: role + customer |
//! | `DELETE` | `/documents/:id/parties/:customer_id` | 204; missing edge is a no-op |
//! | `PUT`    | `/documents/:id/parties/:customer_id/signature` | Body: `{"status":"signed"}` |
//!
//! There is no role-update route: changing a role is unlink + re-link.

use acta_core::{
  blob::BlobStore,
  link::{LinkedParty, NewPartyLink, PartyLink, PartyRole, SignatureStatus},
  store::RecordStore,
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::{ApiError, store_err},
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /documents/:id/parties`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(document_id): Path<Uuid>,
) -> Result<Json<Vec<LinkedParty>>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let parties = state
    .store
    .links_for_document(document_id)
    .await
    .map_err(store_err)?;
  Ok(Json(parties))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub customer_id: Uuid,
  pub role:        PartyRole,
  #[serde(default)]
  pub notary_date: Option<NaiveDate>,
}

/// `POST /documents/:id/parties` — body: [`LinkBody`]
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(document_id): Path<Uuid>,
  Json(body): Json<LinkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let link = state
    .store
    .link_party(NewPartyLink {
      document_id,
      customer_id: body.customer_id,
      role: body.role,
      notary_date: body.notary_date,
    })
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(link)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /documents/:id/parties/:customer_id`
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((document_id, customer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  state
    .store
    .unlink_party(document_id, customer_id)
    .await
    .map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Signature status ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignatureBody {
  pub status: SignatureStatus,
}

/// `PUT /documents/:id/parties/:customer_id/signature`
pub async fn set_signature<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((document_id, customer_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<SignatureBody>,
) -> Result<Json<PartyLink>, ApiError>
where
  S: RecordStore,
  B: BlobStore + Clone,
{
  let link = state
    .store
    .set_signature_status(document_id, customer_id, body.status)
    .await
    .map_err(store_err)?;
  Ok(Json(link))
}
