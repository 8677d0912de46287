//! Vehicle — a unit of the rental fleet.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operational state of a vehicle.
///
/// `Rented` is assigned only by the lifecycle engine, in step with contract
/// transitions. `Available` and `OutOfService` are operator-set, but never
/// while a live contract holds the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleState {
  Available,
  Rented,
  OutOfService,
}

impl fmt::Display for VehicleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Available => "available",
      Self::Rented => "rented",
      Self::OutOfService => "out of service",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
  pub vehicle_id:   Uuid,
  pub make:         String,
  pub model:        String,
  pub engine:       String,
  pub colour:       String,
  /// Registration plate; unique across the fleet.
  pub registration: String,
  pub acquired_on:  NaiveDate,
  pub state:        VehicleState,
  pub created_at:   DateTime<Utc>,
}

impl Vehicle {
  pub fn is_available(&self) -> bool {
    self.state == VehicleState::Available
  }

  pub fn is_out_of_service(&self) -> bool {
    self.state == VehicleState::OutOfService
  }
}

/// Input to vehicle registration. The id, state (`Available`), and creation
/// timestamp are assigned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
  pub make:         String,
  pub model:        String,
  pub engine:       String,
  pub colour:       String,
  pub registration: String,
  pub acquired_on:  NaiveDate,
}
