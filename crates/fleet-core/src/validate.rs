//! The ordered validation pipeline for contract creation.
//!
//! The rules run in a fixed order and the first rejection wins. Each rule is
//! an independent function over [`CandidateContract`]; adding, removing, or
//! reordering rules means editing [`PIPELINE`] and nothing else.

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
  client::Client,
  conflict,
  contract::Contract,
  vehicle::{Vehicle, VehicleState},
};

/// Default ceiling on `end - start`, in days.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 365;

/// A typed business rejection: a stable [`code`](Rejection::code) for
/// machines, `Display` for humans. Never a crash; every rejection is
/// recoverable by the caller correcting its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("the start date must not be after the end date")]
  InvalidDates,

  #[error("the start date must not be in the past")]
  StartInPast,

  #[error("the rental spans {days} days; the maximum is {max_days}")]
  ExcessiveDuration { days: i64, max_days: i64 },

  #[error("the referenced client does not exist")]
  ClientNotFound,

  #[error("the client is not active")]
  InactiveClient,

  #[error("the client must be at least {minimum} years old")]
  UnderAge { minimum: u32 },

  #[error("the referenced vehicle does not exist")]
  VehicleNotFound,

  #[error("the vehicle cannot be rented while {state}")]
  VehicleUnavailable { state: VehicleState },

  #[error("the vehicle is already booked over this period")]
  VehicleConflict,

  #[error("the client already holds a contract over this period")]
  ClientConflict,
}

impl Rejection {
  /// Stable machine-readable reason code.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidDates => "invalid_dates",
      Self::StartInPast => "start_in_past",
      Self::ExcessiveDuration { .. } => "excessive_duration",
      Self::ClientNotFound => "client_not_found",
      Self::InactiveClient => "inactive_client",
      Self::UnderAge { .. } => "under_age",
      Self::VehicleNotFound => "vehicle_not_found",
      Self::VehicleUnavailable { .. } => "vehicle_unavailable",
      Self::VehicleConflict => "vehicle_conflict",
      Self::ClientConflict => "client_conflict",
    }
  }
}

/// Everything the rules may inspect, assembled by the caller. The candidate
/// is not yet persisted; `client` and `vehicle` are `None` when the
/// referenced row does not exist.
pub struct CandidateContract<'a> {
  pub start: NaiveDate,
  pub end:   NaiveDate,
  /// The evaluation date the dates rule measures against.
  pub today: NaiveDate,
  pub max_span_days: i64,
  pub client:  Option<&'a Client>,
  pub vehicle: Option<&'a Vehicle>,
  /// Live contracts already booked on the candidate's vehicle.
  pub vehicle_contracts: &'a [Contract],
  /// Live contracts held by the candidate's client over the window.
  pub client_contracts: &'a [Contract],
}

/// A single validation rule.
pub type Rule = fn(&CandidateContract<'_>) -> Result<(), Rejection>;

/// The creation pipeline, in evaluation order.
pub const PIPELINE: &[Rule] = &[dates, client, vehicle, availability];

/// Run `candidate` through [`PIPELINE`], stopping at the first rejection.
pub fn validate(candidate: &CandidateContract<'_>) -> Result<(), Rejection> {
  PIPELINE.iter().try_for_each(|rule| rule(candidate))
}

/// Interval sanity shared by creation and modification: ordering and span.
/// The past-date rule applies only at creation.
pub fn check_interval(
  start: NaiveDate,
  end: NaiveDate,
  max_span_days: i64,
) -> Result<(), Rejection> {
  if start > end {
    return Err(Rejection::InvalidDates);
  }
  let days = (end - start).num_days();
  if days > max_span_days {
    return Err(Rejection::ExcessiveDuration { days, max_days: max_span_days });
  }
  Ok(())
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn dates(c: &CandidateContract<'_>) -> Result<(), Rejection> {
  if c.start > c.end {
    return Err(Rejection::InvalidDates);
  }
  if c.start < c.today {
    return Err(Rejection::StartInPast);
  }
  let days = (c.end - c.start).num_days();
  if days > c.max_span_days {
    return Err(Rejection::ExcessiveDuration {
      days,
      max_days: c.max_span_days,
    });
  }
  Ok(())
}

fn client(c: &CandidateContract<'_>) -> Result<(), Rejection> {
  let client = c.client.ok_or(Rejection::ClientNotFound)?;
  if !client.active {
    return Err(Rejection::InactiveClient);
  }
  Ok(())
}

fn vehicle(c: &CandidateContract<'_>) -> Result<(), Rejection> {
  let vehicle = c.vehicle.ok_or(Rejection::VehicleNotFound)?;
  if !vehicle.is_available() {
    return Err(Rejection::VehicleUnavailable { state: vehicle.state });
  }
  Ok(())
}

fn availability(c: &CandidateContract<'_>) -> Result<(), Rejection> {
  if conflict::has_conflict(c.start, c.end, c.vehicle_contracts) {
    return Err(Rejection::VehicleConflict);
  }
  if conflict::has_conflict(c.start, c.end, c.client_contracts) {
    return Err(Rejection::ClientConflict);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::contract::ContractState;

  fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + chrono::Days::new(day as u64)
  }

  fn client_row(active: bool) -> Client {
    Client {
      client_id:      Uuid::new_v4(),
      last_name:      "Liddell".into(),
      first_name:     "Alice".into(),
      birth_date:     NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
      licence_number: "B-1234".into(),
      address:        "1 Rabbit Hole Lane".into(),
      active,
      created_at:     Utc::now(),
    }
  }

  fn vehicle_row(state: VehicleState) -> Vehicle {
    Vehicle {
      vehicle_id:   Uuid::new_v4(),
      make:         "Renault".into(),
      model:        "Clio".into(),
      engine:       "1.0 TCe".into(),
      colour:       "blue".into(),
      registration: "AB-123-CD".into(),
      acquired_on:  NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
      state,
      created_at:   Utc::now(),
    }
  }

  fn booked(start: NaiveDate, end: NaiveDate) -> Contract {
    let now = Utc::now();
    Contract {
      contract_id: Uuid::new_v4(),
      client_id:   Uuid::new_v4(),
      vehicle_id:  Uuid::new_v4(),
      start,
      end,
      state:       ContractState::Pending,
      note:        None,
      created_at:  now,
      updated_at:  now,
    }
  }

  struct Fixture {
    client:  Client,
    vehicle: Vehicle,
  }

  impl Fixture {
    fn new() -> Self {
      Self {
        client:  client_row(true),
        vehicle: vehicle_row(VehicleState::Available),
      }
    }

    fn candidate<'a>(
      &'a self,
      start: NaiveDate,
      end: NaiveDate,
      vehicle_contracts: &'a [Contract],
      client_contracts: &'a [Contract],
    ) -> CandidateContract<'a> {
      CandidateContract {
        start,
        end,
        today: d(10),
        max_span_days: DEFAULT_MAX_SPAN_DAYS,
        client: Some(&self.client),
        vehicle: Some(&self.vehicle),
        vehicle_contracts,
        client_contracts,
      }
    }
  }

  #[test]
  fn clean_candidate_is_accepted() {
    let f = Fixture::new();
    let c = f.candidate(d(12), d(20), &[], &[]);
    assert_eq!(validate(&c), Ok(()));
  }

  #[test]
  fn start_after_end_is_rejected() {
    let f = Fixture::new();
    let c = f.candidate(d(20), d(12), &[], &[]);
    assert_eq!(validate(&c), Err(Rejection::InvalidDates));
  }

  #[test]
  fn start_in_past_is_rejected() {
    let f = Fixture::new();
    let c = f.candidate(d(9), d(20), &[], &[]);
    assert_eq!(validate(&c), Err(Rejection::StartInPast));
  }

  #[test]
  fn excessive_span_is_rejected() {
    let f = Fixture::new();
    let c = f.candidate(d(10), d(10 + 366), &[], &[]);
    assert!(matches!(
      validate(&c),
      Err(Rejection::ExcessiveDuration { days: 366, .. })
    ));
  }

  #[test]
  fn exactly_max_span_is_accepted() {
    let f = Fixture::new();
    let c = f.candidate(d(10), d(10 + 365), &[], &[]);
    assert_eq!(validate(&c), Ok(()));
  }

  #[test]
  fn inactive_client_is_rejected_before_vehicle_checks() {
    let mut f = Fixture::new();
    f.client = client_row(false);
    // The vehicle is also unavailable; the client rule still fires first.
    f.vehicle = vehicle_row(VehicleState::OutOfService);
    let c = f.candidate(d(12), d(20), &[], &[]);
    assert_eq!(validate(&c), Err(Rejection::InactiveClient));
  }

  #[test]
  fn missing_client_is_rejected() {
    let f = Fixture::new();
    let mut c = f.candidate(d(12), d(20), &[], &[]);
    c.client = None;
    assert_eq!(validate(&c), Err(Rejection::ClientNotFound));
  }

  #[test]
  fn unavailable_vehicle_is_rejected() {
    let mut f = Fixture::new();
    f.vehicle = vehicle_row(VehicleState::OutOfService);
    let c = f.candidate(d(12), d(20), &[], &[]);
    assert_eq!(
      validate(&c),
      Err(Rejection::VehicleUnavailable { state: VehicleState::OutOfService })
    );
  }

  #[test]
  fn vehicle_conflict_wins_over_client_conflict() {
    let f = Fixture::new();
    let vehicle_contracts = vec![booked(d(15), d(25))];
    let client_contracts = vec![booked(d(15), d(25))];
    let c = f.candidate(d(12), d(20), &vehicle_contracts, &client_contracts);
    assert_eq!(validate(&c), Err(Rejection::VehicleConflict));
  }

  #[test]
  fn client_conflict_is_detected() {
    let f = Fixture::new();
    let client_contracts = vec![booked(d(15), d(25))];
    let c = f.candidate(d(12), d(20), &[], &client_contracts);
    assert_eq!(validate(&c), Err(Rejection::ClientConflict));
  }
}
