//! Handlers for `/vehicles` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/vehicles` | Optional `?state=available\|rented\|out_of_service` |
//! | `POST` | `/vehicles` | Body: [`NewVehicle`]; 201 + stored vehicle |
//! | `GET`  | `/vehicles/:id` | 404 if not found |
//! | `PUT`  | `/vehicles/:id` | Descriptive fields only; never the state |
//! | `POST` | `/vehicles/:id/state` | Body: `{"state":"out_of_service"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use fleet_core::{
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
  vehicle::{NewVehicle, Vehicle, VehicleState},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub state: Option<VehicleState>,
}

/// `GET /vehicles[?state=<state>]`
pub async fn list<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Vehicle>>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let vehicles = service
    .store()
    .list_vehicles(params.state)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(vehicles))
}

// ─── Create / read / update ───────────────────────────────────────────────────

/// `POST /vehicles`
pub async fn create<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Json(body): Json<NewVehicle>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let vehicle = service.register_vehicle(body).await?;
  Ok((StatusCode::CREATED, Json(vehicle)))
}

/// `GET /vehicles/:id`
pub async fn get_one<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let vehicle = service
    .store()
    .get_vehicle(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(fleet_core::Error::VehicleNotFound(id))?;
  Ok(Json(vehicle))
}

/// `PUT /vehicles/:id`
pub async fn update<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewVehicle>,
) -> Result<Json<Vehicle>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let vehicle = service.update_vehicle(id, body).await?;
  Ok(Json(vehicle))
}

// ─── State change ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetStateBody {
  pub state: VehicleState,
}

/// `POST /vehicles/:id/state`: operator state change. Rejected while the
/// vehicle is out under a live contract; `rented` is never accepted here.
pub async fn set_state<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SetStateBody>,
) -> Result<Json<Vehicle>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let vehicle = service.set_vehicle_state(id, body.state).await?;
  Ok(Json(vehicle))
}
