//! Handlers for `/clients` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/clients` | All registered clients |
//! | `POST` | `/clients` | Body: [`NewClient`]; 201 + stored client |
//! | `GET`  | `/clients/:id` | 404 if not found |
//! | `PUT`  | `/clients/:id` | Body: [`NewClient`]; rewrites every field |
//! | `POST` | `/clients/:id/deactivate` | Blocks new contracts for the client |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use fleet_core::{
  client::{Client, NewClient},
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /clients`
pub async fn list<S>(
  State(service): State<Arc<LifecycleService<S>>>,
) -> Result<Json<Vec<Client>>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let clients = service
    .store()
    .list_clients()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(clients))
}

/// `POST /clients`
pub async fn create<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let client = service
    .register_client(body, Utc::now().date_naive())
    .await?;
  Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients/:id`
pub async fn get_one<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Client>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let client = service
    .store()
    .get_client(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(fleet_core::Error::ClientNotFound(id))?;
  Ok(Json(client))
}

/// `PUT /clients/:id`
pub async fn update<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewClient>,
) -> Result<Json<Client>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let client = service.update_client(id, body).await?;
  Ok(Json(client))
}

/// `POST /clients/:id/deactivate`
pub async fn deactivate<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Client>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let client = service.set_client_active(id, false).await?;
  Ok(Json(client))
}
