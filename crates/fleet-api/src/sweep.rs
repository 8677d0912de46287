//! Handler for the `/sweep` endpoint — the external daily trigger.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{NaiveDate, Utc};
use fleet_core::{
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
  sweep::SweepReport,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SweepParams {
  /// Evaluation date; defaults to today. Letting the caller pass a date
  /// keeps catch-up runs possible after missed days.
  pub date: Option<NaiveDate>,
}

/// `POST /sweep[?date=YYYY-MM-DD]`
///
/// Idempotent for a given date; returns the aggregate [`SweepReport`].
pub async fn run<S>(
  State(service): State<Arc<LifecycleService<S>>>,
  Query(params): Query<SweepParams>,
) -> Result<Json<SweepReport>, ApiError>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  let today = params.date.unwrap_or_else(|| Utc::now().date_naive());
  let report = service.run_daily_sweep(today).await?;
  Ok(Json(report))
}
