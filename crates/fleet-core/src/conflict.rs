//! Interval-conflict detection.
//!
//! A candidate `[start, end]` conflicts with an existing `[s, e]` when
//! `s <= end && e >= start`, inclusive on both ends, so two rentals that
//! merely touch (one ends the day the other starts) still conflict. The
//! caller restricts the input to one vehicle's or one client's contracts;
//! detection itself is a pure O(n) scan with no state of its own.

use chrono::NaiveDate;

use crate::contract::Contract;

/// All live contracts in `existing` whose interval overlaps `[start, end]`.
/// Terminal contracts never conflict.
pub fn find_conflicts<'a>(
  start: NaiveDate,
  end: NaiveDate,
  existing: &'a [Contract],
) -> Vec<&'a Contract> {
  existing
    .iter()
    .filter(|c| c.state.is_live() && c.overlaps(start, end))
    .collect()
}

/// Whether any live contract in `existing` overlaps `[start, end]`.
pub fn has_conflict(
  start: NaiveDate,
  end: NaiveDate,
  existing: &[Contract],
) -> bool {
  existing
    .iter()
    .any(|c| c.state.is_live() && c.overlaps(start, end))
}
