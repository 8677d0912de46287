//! Contract — a rental binding one client to one vehicle over a date
//! interval.
//!
//! Contracts are never deleted; the terminal states are kept as history.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a contract. Transitions happen only through
/// [`crate::machine::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
  Pending,
  Active,
  Overdue,
  Completed,
  Cancelled,
}

impl ContractState {
  /// Terminal contracts hold no claim on their vehicle and never change
  /// again.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Completed | Self::Cancelled)
  }

  /// Live (non-terminal) contracts still claim their booked interval.
  pub fn is_live(self) -> bool {
    !self.is_terminal()
  }

  /// States in which the vehicle is physically out with the client.
  pub fn holds_vehicle(self) -> bool {
    matches!(self, Self::Active | Self::Overdue)
  }
}

impl fmt::Display for ContractState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Pending => "pending",
      Self::Active => "active",
      Self::Overdue => "overdue",
      Self::Completed => "completed",
      Self::Cancelled => "cancelled",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
  pub contract_id: Uuid,
  pub client_id:   Uuid,
  pub vehicle_id:  Uuid,
  pub start:       NaiveDate,
  /// Inclusive; `end >= start` always (enforced at creation).
  pub end:         NaiveDate,
  pub state:       ContractState,
  /// Free text; automatic transitions record their reason here.
  pub note:        Option<String>,
  pub created_at:  DateTime<Utc>,
  /// Bumped on every state change.
  pub updated_at:  DateTime<Utc>,
}

impl Contract {
  /// Inclusive interval overlap; touching endpoints count.
  pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
    self.start <= end && self.end >= start
  }
}

/// Input to contract creation. The id, state, and timestamps are assigned by
/// the service after validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
  pub client_id:  Uuid,
  pub vehicle_id: Uuid,
  pub start:      NaiveDate,
  pub end:        NaiveDate,
  pub note:       Option<String>,
}
