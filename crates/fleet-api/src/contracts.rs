//! Handlers for `/contracts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contracts` | Optional `?state=`, `?client_id=`, `?vehicle_id=` |
//! | `POST` | `/contracts` | Body: [`NewContract`]; 201 + stored contract |
//! | `GET`  | `/contracts/:id` | 404 if not found |
//! | `PUT`  | `/contracts/:id` | Body: [`ModifyBody`]; Pending contracts only |
//! | `POST` | `/contracts/:id/cancel` | Body: `{"reason":"..."}` |
//! | `POST` | `/contracts/:id/complete` | The vehicle came back |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use fleet_core::{
  contract::{Contract, ContractState, NewContract},
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub state:      Option<ContractState>,
  pub client_id:  Option<Uuid>,
  pub vehicle_id: Option<Uuid>,
}

/// `GET /contracts[?state=][&client_id=][&vehicle_id=]`
///
/// `client_id` and `vehicle_id` narrow to one party's history; `state`
/// filters the result. The party filters are mutually exclusive;
/// `client_id` wins if both are given.
pub async fn list<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contract>>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let store = service.store();
  let mut contracts = if let Some(client_id) = params.client_id {
    store
      .contracts_for_client(client_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
  } else if let Some(vehicle_id) = params.vehicle_id {
    store
      .contracts_for_vehicle(vehicle_id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
  } else {
    store
      .list_contracts(params.state)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
  };

  if params.client_id.is_some() || params.vehicle_id.is_some() {
    if let Some(state) = params.state {
      contracts.retain(|c| c.state == state);
    }
  }

  Ok(Json(contracts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /contracts`
pub async fn create<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Json(body): Json<NewContract>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let contract = service
    .create_contract(body, Utc::now().date_naive())
    .await?;
  Ok((StatusCode::CREATED, Json(contract)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contracts/:id`
pub async fn get_one<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let contract = service
    .store()
    .get_contract(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(fleet_core::Error::ContractNotFound(id))?;
  Ok(Json(contract))
}

// ─── Modify ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /contracts/:id`.
#[derive(Debug, Deserialize)]
pub struct ModifyBody {
  pub start: NaiveDate,
  pub end:   NaiveDate,
  pub note:  Option<String>,
}

/// `PUT /contracts/:id` — legal while Pending only.
pub async fn modify<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ModifyBody>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let contract = service
    .modify_contract(id, body.start, body.end, body.note)
    .await?;
  Ok(Json(contract))
}

// ─── Cancel / complete ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
  pub reason: Option<String>,
}

/// `POST /contracts/:id/cancel`
pub async fn cancel<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CancelBody>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let contract = service.cancel_contract(id, body.reason).await?;
  Ok(Json(contract))
}

/// `POST /contracts/:id/complete`
pub async fn complete<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Contract>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let contract = service.complete_contract(id).await?;
  Ok(Json(contract))
}
