//! The contract state machine.
//!
//! Every contract mutation in the crate goes through [`transition`]; there
//! is no other path from one [`ContractState`] to another. The match in
//! [`transition`] is the single source of truth for which edges exist and
//! what each one does to the vehicle.

use std::fmt;

use serde::Serialize;

use crate::{contract::ContractState, error::Error};

/// An event that may move a contract to a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractEvent {
  /// The rental begins: the start date is reached and the vehicle goes out.
  Start,
  /// The end date has passed without the vehicle coming back.
  MarkOverdue,
  /// The vehicle came back.
  Return,
  /// The contract is called off, explicitly or automatically.
  Cancel,
  /// A pending contract's interval or note is rewritten.
  Modify,
}

impl fmt::Display for ContractEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Start => "start",
      Self::MarkOverdue => "mark-overdue",
      Self::Return => "return",
      Self::Cancel => "cancel",
      Self::Modify => "modify",
    };
    f.write_str(s)
  }
}

/// What a transition does to the contract's vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleEffect {
  None,
  /// The vehicle goes out: it becomes `Rented`.
  Claim,
  /// The vehicle is given back: it becomes `Available` again.
  Release,
}

/// The outcome of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
  pub next:    ContractState,
  pub vehicle: VehicleEffect,
}

/// Look up `(state, event)` in the transition table.
///
/// `Completed` and `Cancelled` are terminal; nothing moves a contract out of
/// them. `Pending` never jumps straight to `Completed` or `Overdue`; both
/// pass through `Active`.
pub fn transition(
  state: ContractState,
  event: ContractEvent,
) -> Result<Transition, Error> {
  use ContractEvent::*;
  use ContractState::*;
  use VehicleEffect::{Claim, None as NoEffect, Release};

  match (state, event) {
    (Pending, Start) => Ok(Transition { next: Active, vehicle: Claim }),
    (Pending, Cancel) => Ok(Transition { next: Cancelled, vehicle: NoEffect }),
    (Pending, Modify) => Ok(Transition { next: Pending, vehicle: NoEffect }),
    (Active, MarkOverdue) => Ok(Transition { next: Overdue, vehicle: NoEffect }),
    (Active, Return) => Ok(Transition { next: Completed, vehicle: Release }),
    (Active, Cancel) => Ok(Transition { next: Cancelled, vehicle: Release }),
    (Overdue, Return) => Ok(Transition { next: Completed, vehicle: Release }),
    (Overdue, Cancel) => Ok(Transition { next: Cancelled, vehicle: Release }),
    (state, event) => Err(Error::IllegalTransition { state, event }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pending_start_claims_the_vehicle() {
    let t = transition(ContractState::Pending, ContractEvent::Start).unwrap();
    assert_eq!(t.next, ContractState::Active);
    assert_eq!(t.vehicle, VehicleEffect::Claim);
  }

  #[test]
  fn pending_cancel_leaves_the_vehicle_alone() {
    let t = transition(ContractState::Pending, ContractEvent::Cancel).unwrap();
    assert_eq!(t.next, ContractState::Cancelled);
    assert_eq!(t.vehicle, VehicleEffect::None);
  }

  #[test]
  fn active_mark_overdue_keeps_the_vehicle_out() {
    let t =
      transition(ContractState::Active, ContractEvent::MarkOverdue).unwrap();
    assert_eq!(t.next, ContractState::Overdue);
    assert_eq!(t.vehicle, VehicleEffect::None);
  }

  #[test]
  fn returning_releases_the_vehicle() {
    for state in [ContractState::Active, ContractState::Overdue] {
      let t = transition(state, ContractEvent::Return).unwrap();
      assert_eq!(t.next, ContractState::Completed);
      assert_eq!(t.vehicle, VehicleEffect::Release);
    }
  }

  #[test]
  fn pending_never_completes_or_goes_overdue_directly() {
    assert!(transition(ContractState::Pending, ContractEvent::Return).is_err());
    assert!(
      transition(ContractState::Pending, ContractEvent::MarkOverdue).is_err()
    );
  }

  #[test]
  fn terminal_states_reject_every_event() {
    let events = [
      ContractEvent::Start,
      ContractEvent::MarkOverdue,
      ContractEvent::Return,
      ContractEvent::Cancel,
      ContractEvent::Modify,
    ];
    for state in [ContractState::Completed, ContractState::Cancelled] {
      for event in events {
        let err = transition(state, event).unwrap_err();
        assert!(matches!(err, Error::IllegalTransition { .. }));
      }
    }
  }

  #[test]
  fn only_pending_contracts_are_modifiable() {
    assert!(transition(ContractState::Pending, ContractEvent::Modify).is_ok());
    for state in [
      ContractState::Active,
      ContractState::Overdue,
      ContractState::Completed,
      ContractState::Cancelled,
    ] {
      assert!(transition(state, ContractEvent::Modify).is_err());
    }
  }
}
