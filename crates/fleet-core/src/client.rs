//! Client — a person who may rent vehicles.
//!
//! Clients are unique by (last name, first name, birth date) and by licence
//! number; both are enforced at registration and mirrored by store-level
//! constraints. The lifecycle engine itself only reads `active` and the age.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum age, in years, required to hold a rental contract.
pub const MINIMUM_RENTAL_AGE: u32 = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
  pub client_id:      Uuid,
  pub last_name:      String,
  pub first_name:     String,
  pub birth_date:     NaiveDate,
  pub licence_number: String,
  pub address:        String,
  /// Inactive clients keep their history but cannot open new contracts.
  pub active:         bool,
  pub created_at:     DateTime<Utc>,
}

impl Client {
  /// Whether the client has reached [`MINIMUM_RENTAL_AGE`] on `date`.
  /// A 29 February birthday rolls over to 1 March in non-leap years.
  pub fn is_of_age_on(&self, date: NaiveDate) -> bool {
    let year = self.birth_date.year() + MINIMUM_RENTAL_AGE as i32;
    let threshold = self
      .birth_date
      .with_year(year)
      .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1));
    matches!(threshold, Some(t) if t <= date)
  }
}

/// Input to client registration. The id, `active` flag, and creation
/// timestamp are assigned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct NewClient {
  pub last_name:      String,
  pub first_name:     String,
  pub birth_date:     NaiveDate,
  pub licence_number: String,
  pub address:        String,
}
