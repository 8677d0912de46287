//! Store traits implemented by storage backends.
//!
//! Higher layers (`fleet-api`, the service) depend on these abstractions,
//! not on any concrete backend. All methods return `Send` futures so the
//! traits can be used in multi-threaded async runtimes (e.g. tokio with
//! `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  client::Client,
  contract::{Contract, ContractState},
  vehicle::{Vehicle, VehicleState},
};

// ─── Contracts ───────────────────────────────────────────────────────────────

pub trait ContractStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a freshly created contract.
  fn insert_contract(
    &self,
    contract: Contract,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a state/field change to an existing contract.
  fn update_contract(
    &self,
    contract: Contract,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_contract(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contract>, Self::Error>> + Send + '_;

  /// All contracts, optionally restricted to one state, newest start first.
  fn list_contracts(
    &self,
    state: Option<ContractState>,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  fn contracts_for_client(
    &self,
    client_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  fn contracts_for_vehicle(
    &self,
    vehicle_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  /// Non-terminal (Pending/Active/Overdue) contracts on a vehicle: the
  /// conflict-detection input set.
  fn live_contracts_for_vehicle(
    &self,
    vehicle_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  /// Non-terminal contracts held by a client that overlap `[start, end]`.
  fn live_contracts_for_client(
    &self,
    client_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  /// Pending contracts whose start date equals `date` (sweep phase 1).
  fn pending_starting_on(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  /// Active contracts whose end date is strictly before `date` (phase 2).
  fn active_ending_before(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;

  /// Pending contracts whose start date is on or before `date` (phase 3).
  fn pending_starting_on_or_before(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Contract>, Self::Error>> + Send + '_;
}

// ─── Vehicles ────────────────────────────────────────────────────────────────

pub trait VehicleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_vehicle(
    &self,
    vehicle: Vehicle,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_vehicle(
    &self,
    vehicle: Vehicle,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_vehicle(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Vehicle>, Self::Error>> + Send + '_;

  fn list_vehicles(
    &self,
    state: Option<VehicleState>,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  fn registration_exists(
    &self,
    registration: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Clients ─────────────────────────────────────────────────────────────────

pub trait ClientStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_client(
    &self,
    client: Client,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn update_client(
    &self,
    client: Client,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_client(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  fn list_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<Client>, Self::Error>> + Send + '_;

  fn licence_exists(
    &self,
    licence_number: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Whether a client with this (last name, first name, birth date) triple
  /// is already registered.
  fn identity_exists(
    &self,
    last_name: String,
    first_name: String,
    birth_date: NaiveDate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
