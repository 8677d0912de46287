//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Rental dates are ISO 8601 (`YYYY-MM-DD`), which compares correctly as
//! text. Record timestamps are RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use fleet_core::{
  client::Client,
  contract::{Contract, ContractState},
  vehicle::{Vehicle, VehicleState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── State discriminants ─────────────────────────────────────────────────────

pub fn encode_contract_state(s: ContractState) -> &'static str {
  match s {
    ContractState::Pending => "pending",
    ContractState::Active => "active",
    ContractState::Overdue => "overdue",
    ContractState::Completed => "completed",
    ContractState::Cancelled => "cancelled",
  }
}

pub fn decode_contract_state(s: &str) -> Result<ContractState> {
  match s {
    "pending" => Ok(ContractState::Pending),
    "active" => Ok(ContractState::Active),
    "overdue" => Ok(ContractState::Overdue),
    "completed" => Ok(ContractState::Completed),
    "cancelled" => Ok(ContractState::Cancelled),
    other => Err(Error::UnknownState(other.to_owned())),
  }
}

pub fn encode_vehicle_state(s: VehicleState) -> &'static str {
  match s {
    VehicleState::Available => "available",
    VehicleState::Rented => "rented",
    VehicleState::OutOfService => "out_of_service",
  }
}

pub fn decode_vehicle_state(s: &str) -> Result<VehicleState> {
  match s {
    "available" => Ok(VehicleState::Available),
    "rented" => Ok(VehicleState::Rented),
    "out_of_service" => Ok(VehicleState::OutOfService),
    other => Err(Error::UnknownState(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawContract::from_row`].
pub const CONTRACT_COLUMNS: &str = "contract_id, client_id, vehicle_id, \
   start_date, end_date, state, note, created_at, updated_at";

/// Raw strings read directly from a `contracts` row.
pub struct RawContract {
  pub contract_id: String,
  pub client_id:   String,
  pub vehicle_id:  String,
  pub start_date:  String,
  pub end_date:    String,
  pub state:       String,
  pub note:        Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawContract {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contract_id: row.get(0)?,
      client_id:   row.get(1)?,
      vehicle_id:  row.get(2)?,
      start_date:  row.get(3)?,
      end_date:    row.get(4)?,
      state:       row.get(5)?,
      note:        row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_contract(self) -> Result<Contract> {
    Ok(Contract {
      contract_id: decode_uuid(&self.contract_id)?,
      client_id:   decode_uuid(&self.client_id)?,
      vehicle_id:  decode_uuid(&self.vehicle_id)?,
      start:       decode_date(&self.start_date)?,
      end:         decode_date(&self.end_date)?,
      state:       decode_contract_state(&self.state)?,
      note:        self.note,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawClient::from_row`].
pub const CLIENT_COLUMNS: &str = "client_id, last_name, first_name, \
   birth_date, licence_number, address, active, created_at";

/// Raw strings read directly from a `clients` row.
pub struct RawClient {
  pub client_id:      String,
  pub last_name:      String,
  pub first_name:     String,
  pub birth_date:     String,
  pub licence_number: String,
  pub address:        String,
  pub active:         bool,
  pub created_at:     String,
}

impl RawClient {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      client_id:      row.get(0)?,
      last_name:      row.get(1)?,
      first_name:     row.get(2)?,
      birth_date:     row.get(3)?,
      licence_number: row.get(4)?,
      address:        row.get(5)?,
      active:         row.get(6)?,
      created_at:     row.get(7)?,
    })
  }

  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      client_id:      decode_uuid(&self.client_id)?,
      last_name:      self.last_name,
      first_name:     self.first_name,
      birth_date:     decode_date(&self.birth_date)?,
      licence_number: self.licence_number,
      address:        self.address,
      active:         self.active,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawVehicle::from_row`].
pub const VEHICLE_COLUMNS: &str = "vehicle_id, make, model, engine, colour, \
   registration, acquired_on, state, created_at";

/// Raw strings read directly from a `vehicles` row.
pub struct RawVehicle {
  pub vehicle_id:   String,
  pub make:         String,
  pub model:        String,
  pub engine:       String,
  pub colour:       String,
  pub registration: String,
  pub acquired_on:  String,
  pub state:        String,
  pub created_at:   String,
}

impl RawVehicle {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vehicle_id:   row.get(0)?,
      make:         row.get(1)?,
      model:        row.get(2)?,
      engine:       row.get(3)?,
      colour:       row.get(4)?,
      registration: row.get(5)?,
      acquired_on:  row.get(6)?,
      state:        row.get(7)?,
      created_at:   row.get(8)?,
    })
  }

  pub fn into_vehicle(self) -> Result<Vehicle> {
    Ok(Vehicle {
      vehicle_id:   decode_uuid(&self.vehicle_id)?,
      make:         self.make,
      model:        self.model,
      engine:       self.engine,
      colour:       self.colour,
      registration: self.registration,
      acquired_on:  decode_date(&self.acquired_on)?,
      state:        decode_vehicle_state(&self.state)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
