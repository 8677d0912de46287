//! Error types for `fleet-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  contract::ContractState, machine::ContractEvent, validate::Rejection,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("contract not found: {0}")]
  ContractNotFound(Uuid),

  #[error("client not found: {0}")]
  ClientNotFound(Uuid),

  #[error("vehicle not found: {0}")]
  VehicleNotFound(Uuid),

  #[error(transparent)]
  Validation(#[from] Rejection),

  #[error("illegal transition: {event} on a {state} contract")]
  IllegalTransition {
    state: ContractState,
    event: ContractEvent,
  },

  #[error("a client with this name and birth date is already registered")]
  DuplicateClient,

  #[error("licence number already in use: {0}")]
  DuplicateLicence(String),

  #[error("registration plate already in use: {0}")]
  DuplicateRegistration(String),

  #[error("vehicle {0} is out under a live contract; its state cannot be changed")]
  VehicleRented(Uuid),

  #[error("the rented state is assigned by the lifecycle engine")]
  RentedIsManaged,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
