//! The daily reconciliation sweep.
//!
//! [`plan`] is a pure function from an evaluation date plus a snapshot of
//! the relevant contracts to the list of transitions that must happen.
//! Three fixed phases, in order:
//!
//! 1. start contracts due today (or cancel them if the vehicle is gone);
//! 2. mark running contracts overdue once their end date has passed;
//! 3. cancel pending contracts stuck behind an overdue rental.
//!
//! Phase 1 runs before phase 2 so a contract starting today is never
//! re-evaluated as overdue in the same run; phase 3 sees the overdue set as
//! it stands after phase 2. Executing the plan, and surviving per-contract
//! store failures, is the lifecycle service's job.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  contract::{Contract, ContractState},
  machine::ContractEvent,
  vehicle::VehicleState,
};

pub const NOTE_VEHICLE_UNAVAILABLE: &str =
  "cancelled automatically: vehicle not available on the start date";
pub const NOTE_BLOCKED_BY_OVERDUE: &str =
  "cancelled automatically: vehicle blocked by an overdue rental";

/// One planned transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepAction {
  pub contract_id: Uuid,
  pub vehicle_id:  Uuid,
  pub event:       ContractEvent,
  /// Recorded on the contract when the action is applied.
  pub note:        Option<String>,
}

/// Snapshot of store state the planner works from, assembled by the caller.
#[derive(Debug, Default)]
pub struct SweepSnapshot {
  /// Pending contracts whose start date is today (phase 1).
  pub due_to_start: Vec<Contract>,
  /// Active contracts whose end date is strictly before today (phase 2).
  pub running_late: Vec<Contract>,
  /// Pending contracts whose start date is on or before today (phase 3).
  pub stale_pending: Vec<Contract>,
  /// Current state of every vehicle referenced above.
  pub vehicle_states: HashMap<Uuid, VehicleState>,
  /// Vehicles that already carry an Overdue contract.
  pub vehicles_with_overdue: HashSet<Uuid>,
}

/// Compute the transitions for `today`. Pure and deterministic; running the
/// resulting plan and planning again for the same date yields an empty plan.
pub fn plan(today: NaiveDate, snapshot: &SweepSnapshot) -> Vec<SweepAction> {
  let mut actions = Vec::new();
  let mut handled: HashSet<Uuid> = HashSet::new();

  // Phase 1 — start contracts due today. Claims are tracked locally so a
  // vehicle handed out earlier in the phase is no longer available later on.
  let mut vehicle_states = snapshot.vehicle_states.clone();
  for contract in &snapshot.due_to_start {
    if contract.state != ContractState::Pending || contract.start != today {
      continue;
    }
    handled.insert(contract.contract_id);
    let available = vehicle_states.get(&contract.vehicle_id)
      == Some(&VehicleState::Available);
    if available {
      vehicle_states.insert(contract.vehicle_id, VehicleState::Rented);
      actions.push(SweepAction {
        contract_id: contract.contract_id,
        vehicle_id:  contract.vehicle_id,
        event:       ContractEvent::Start,
        note:        None,
      });
    } else {
      actions.push(SweepAction {
        contract_id: contract.contract_id,
        vehicle_id:  contract.vehicle_id,
        event:       ContractEvent::Cancel,
        note:        Some(NOTE_VEHICLE_UNAVAILABLE.to_owned()),
      });
    }
  }

  // Phase 2 — mark overdue. The vehicles gaining an overdue contract here
  // feed phase 3's blocked check.
  let mut overdue_vehicles = snapshot.vehicles_with_overdue.clone();
  for contract in &snapshot.running_late {
    if contract.state != ContractState::Active || contract.end >= today {
      continue;
    }
    overdue_vehicles.insert(contract.vehicle_id);
    actions.push(SweepAction {
      contract_id: contract.contract_id,
      vehicle_id:  contract.vehicle_id,
      event:       ContractEvent::MarkOverdue,
      note:        Some(format!("overdue since {}", contract.end)),
    });
  }

  // Phase 3 — cancel pending contracts whose vehicle carries any overdue
  // contract. The blocking contract's interval is not consulted.
  for contract in &snapshot.stale_pending {
    if contract.state != ContractState::Pending || contract.start > today {
      continue;
    }
    if handled.contains(&contract.contract_id) {
      continue;
    }
    if overdue_vehicles.contains(&contract.vehicle_id) {
      actions.push(SweepAction {
        contract_id: contract.contract_id,
        vehicle_id:  contract.vehicle_id,
        event:       ContractEvent::Cancel,
        note:        Some(NOTE_BLOCKED_BY_OVERDUE.to_owned()),
      });
    }
  }

  actions
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// The outcome of one sweep run. Failures are per-contract; one bad record
/// never fails the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
  pub date:      NaiveDate,
  pub started:   usize,
  pub overdue:   usize,
  pub cancelled: usize,
  pub failed:    Vec<SweepFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
  pub contract_id: Uuid,
  pub reason:      String,
}

impl SweepReport {
  pub fn new(date: NaiveDate) -> Self {
    Self { date, started: 0, overdue: 0, cancelled: 0, failed: Vec::new() }
  }

  /// Count one successfully applied action.
  pub fn tally(&mut self, event: ContractEvent) {
    match event {
      ContractEvent::Start => self.started += 1,
      ContractEvent::MarkOverdue => self.overdue += 1,
      ContractEvent::Cancel => self.cancelled += 1,
      ContractEvent::Return | ContractEvent::Modify => {}
    }
  }

  /// Contracts acted on, successfully or not.
  pub fn processed(&self) -> usize {
    self.started + self.overdue + self.cancelled + self.failed.len()
  }
}
