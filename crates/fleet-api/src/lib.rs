//! JSON REST API for the Fleet rental service.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! `fleet-core` store traits. Every mutating route goes through the
//! [`LifecycleService`]; reads hit the store directly. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", fleet_api::api_router(service.clone()))
//! ```

pub mod clients;
pub mod contracts;
pub mod error;
pub mod sweep;
pub mod vehicles;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use fleet_core::{
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<LifecycleService<S>>) -> Router<()>
where
  S: ContractStore + VehicleStore + ClientStore + 'static,
{
  Router::new()
    // Clients
    .route("/clients", get(clients::list::<S>).post(clients::create::<S>))
    .route(
      "/clients/{id}",
      get(clients::get_one::<S>).put(clients::update::<S>),
    )
    .route("/clients/{id}/deactivate", post(clients::deactivate::<S>))
    // Vehicles
    .route("/vehicles", get(vehicles::list::<S>).post(vehicles::create::<S>))
    .route(
      "/vehicles/{id}",
      get(vehicles::get_one::<S>).put(vehicles::update::<S>),
    )
    .route("/vehicles/{id}/state", post(vehicles::set_state::<S>))
    // Contracts
    .route(
      "/contracts",
      get(contracts::list::<S>).post(contracts::create::<S>),
    )
    .route(
      "/contracts/{id}",
      get(contracts::get_one::<S>).put(contracts::modify::<S>),
    )
    .route("/contracts/{id}/cancel", post(contracts::cancel::<S>))
    .route("/contracts/{id}/complete", post(contracts::complete::<S>))
    // Sweep
    .route("/sweep", post(sweep::run::<S>))
    .with_state(service)
}
