//! Integration tests for `SqliteStore` and the lifecycle service, against an
//! in-memory database.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use fleet_core::{
  client::NewClient,
  contract::{Contract, ContractState, NewContract},
  service::LifecycleService,
  store::{ClientStore, ContractStore, VehicleStore},
  sweep::{NOTE_BLOCKED_BY_OVERDUE, NOTE_VEHICLE_UNAVAILABLE},
  validate::Rejection,
  vehicle::{NewVehicle, VehicleState},
  Error,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn service(store: &SqliteStore) -> LifecycleService<SqliteStore> {
  LifecycleService::new(Arc::new(store.clone()))
}

/// Day `n` of the test calendar; day 0 is the evaluation date most tests
/// use as "today".
fn d(day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2026, 3, 1).unwrap() + chrono::Days::new(day as u64)
}

fn new_client(licence: &str) -> NewClient {
  NewClient {
    last_name:      "Liddell".into(),
    first_name:     "Alice".into(),
    birth_date:     NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
    licence_number: licence.into(),
    address:        "1 Rabbit Hole Lane".into(),
  }
}

fn new_vehicle(registration: &str) -> NewVehicle {
  NewVehicle {
    make:         "Renault".into(),
    model:        "Clio".into(),
    engine:       "1.0 TCe".into(),
    colour:       "blue".into(),
    registration: registration.into(),
    acquired_on:  NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(),
  }
}

fn booking(
  client_id: Uuid,
  vehicle_id: Uuid,
  start: NaiveDate,
  end: NaiveDate,
) -> NewContract {
  NewContract { client_id, vehicle_id, start, end, note: None }
}

// ─── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_client() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  assert!(client.active);

  let fetched = s.get_client(client.client_id).await.unwrap().unwrap();
  assert_eq!(fetched.client_id, client.client_id);
  assert_eq!(fetched.licence_number, "B-0001");
  assert_eq!(fetched.birth_date, client.birth_date);
}

#[tokio::test]
async fn duplicate_licence_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  svc.register_client(new_client("B-0001"), d(0)).await.unwrap();

  let mut other = new_client("B-0001");
  other.first_name = "Bob".into();
  let err = svc.register_client(other, d(0)).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateLicence(_)));
}

#[tokio::test]
async fn duplicate_identity_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  svc.register_client(new_client("B-0001"), d(0)).await.unwrap();

  // Same name and birth date, different licence.
  let err =
    svc.register_client(new_client("B-0002"), d(0)).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateClient));
}

#[tokio::test]
async fn under_age_client_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  let mut minor = new_client("B-0003");
  minor.birth_date = d(0) - chrono::Days::new(17 * 366);
  let err = svc.register_client(minor, d(0)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(Rejection::UnderAge { minimum: 18 })
  ));
}

#[tokio::test]
async fn update_client_checks_licence_uniqueness() {
  let s = store().await;
  let svc = service(&s);

  svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let mut input = new_client("B-0002");
  input.last_name = "Hargreaves".into();
  let victim = svc.register_client(input, d(0)).await.unwrap();

  let err = svc
    .update_client(victim.client_id, new_client("B-0001"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateLicence(_)));
}

// ─── Vehicles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_list_vehicles() {
  let s = store().await;
  let svc = service(&s);

  let v1 = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  svc.register_vehicle(new_vehicle("EF-456-GH")).await.unwrap();
  assert_eq!(v1.state, VehicleState::Available);

  let all = s.list_vehicles(None).await.unwrap();
  assert_eq!(all.len(), 2);

  svc
    .set_vehicle_state(v1.vehicle_id, VehicleState::OutOfService)
    .await
    .unwrap();
  let available =
    s.list_vehicles(Some(VehicleState::Available)).await.unwrap();
  assert_eq!(available.len(), 1);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let err =
    svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateRegistration(_)));
}

#[tokio::test]
async fn rented_state_cannot_be_set_by_hand() {
  let s = store().await;
  let svc = service(&s);

  let v = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let err = svc
    .set_vehicle_state(v.vehicle_id, VehicleState::Rented)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RentedIsManaged));
}

#[tokio::test]
async fn vehicle_under_live_rental_cannot_be_restated() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();

  let err = svc
    .set_vehicle_state(vehicle.vehicle_id, VehicleState::OutOfService)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::VehicleRented(_)));
}

#[tokio::test]
async fn out_of_service_cancels_pending_contracts() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(5), d(10)),
      d(0),
    )
    .await
    .unwrap();
  assert_eq!(contract.state, ContractState::Pending);

  svc
    .set_vehicle_state(vehicle.vehicle_id, VehicleState::OutOfService)
    .await
    .unwrap();

  let cancelled =
    s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(cancelled.state, ContractState::Cancelled);
  assert!(cancelled.note.unwrap().contains("out of service"));
}

// ─── Contract creation ───────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_no_double_booking() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  let first = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();
  assert_eq!(first.state, ContractState::Pending);

  let mut other = new_client("B-0002");
  other.last_name = "Hargreaves".into();
  let rival = svc.register_client(other, d(0)).await.unwrap();

  let err = svc
    .create_contract(
      booking(rival.client_id, vehicle.vehicle_id, d(15), d(25)),
      d(0),
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(Rejection::VehicleConflict)
  ));

  let third = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(21), d(25)),
      d(0),
    )
    .await
    .unwrap();
  assert_eq!(third.state, ContractState::Pending);
}

#[tokio::test]
async fn touching_intervals_conflict() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();

  let err = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(20), d(25)),
      d(0),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::VehicleConflict)));
}

#[tokio::test]
async fn client_cannot_hold_two_overlapping_rentals() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let v1 = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let v2 = svc.register_vehicle(new_vehicle("EF-456-GH")).await.unwrap();

  svc
    .create_contract(booking(client.client_id, v1.vehicle_id, d(10), d(20)), d(0))
    .await
    .unwrap();
  let err = svc
    .create_contract(booking(client.client_id, v2.vehicle_id, d(15), d(18)), d(0))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::ClientConflict)));
}

#[tokio::test]
async fn scenario_d_inactive_client_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  svc.set_client_active(client.client_id, false).await.unwrap();

  let err = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::InactiveClient)));
}

#[tokio::test]
async fn unknown_references_are_rejected() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  let err = svc
    .create_contract(
      booking(Uuid::new_v4(), vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::ClientNotFound)));

  let err = svc
    .create_contract(
      booking(client.client_id, Uuid::new_v4(), d(10), d(20)),
      d(0),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::VehicleNotFound)));
}

#[tokio::test]
async fn contract_starting_today_is_active_immediately() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();
  assert_eq!(contract.state, ContractState::Active);

  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Rented);
}

// ─── Modify / cancel / complete ──────────────────────────────────────────────

#[tokio::test]
async fn modify_pending_contract_reruns_availability() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();

  // Shifting within its own window: the contract's own booking is excluded
  // from the conflict set.
  let moved = svc
    .modify_contract(
      contract.contract_id,
      d(12),
      d(22),
      Some("pushed back two days".into()),
    )
    .await
    .unwrap();
  assert_eq!(moved.start, d(12));
  assert_eq!(moved.end, d(22));
  assert_eq!(moved.note.as_deref(), Some("pushed back two days"));

  // A second booking now blocks the old window.
  let mut other = new_client("B-0002");
  other.last_name = "Hargreaves".into();
  let rival = svc.register_client(other, d(0)).await.unwrap();
  svc
    .create_contract(
      booking(rival.client_id, vehicle.vehicle_id, d(23), d(30)),
      d(0),
    )
    .await
    .unwrap();

  let err = svc
    .modify_contract(contract.contract_id, d(12), d(25), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::VehicleConflict)));
}

#[tokio::test]
async fn modify_rejects_inverted_interval() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();

  let err = svc
    .modify_contract(contract.contract_id, d(20), d(10), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(Rejection::InvalidDates)));
}

#[tokio::test]
async fn only_pending_contracts_can_be_modified() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();
  assert_eq!(contract.state, ContractState::Active);

  let err = svc
    .modify_contract(contract.contract_id, d(1), d(6), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::IllegalTransition { .. }));
}

#[tokio::test]
async fn cancelling_a_pending_contract_leaves_the_vehicle_available() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();

  let cancelled = svc
    .cancel_contract(contract.contract_id, Some("change of plans".into()))
    .await
    .unwrap();
  assert_eq!(cancelled.state, ContractState::Cancelled);
  assert_eq!(cancelled.note.as_deref(), Some("change of plans"));

  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Available);
}

#[tokio::test]
async fn cancelling_an_active_contract_releases_the_vehicle() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();

  svc.cancel_contract(contract.contract_id, None).await.unwrap();

  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Available);
}

#[tokio::test]
async fn completing_a_rental_returns_the_vehicle() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();

  let done = svc.complete_contract(contract.contract_id).await.unwrap();
  assert_eq!(done.state, ContractState::Completed);

  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Available);
}

#[tokio::test]
async fn scenario_e_cancelling_a_completed_contract_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();
  svc.complete_contract(contract.contract_id).await.unwrap();

  let err = svc
    .cancel_contract(contract.contract_id, Some("too late".into()))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::IllegalTransition { .. }));

  // Contract and vehicle are untouched.
  let unchanged =
    s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(unchanged.state, ContractState::Completed);
  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Available);
}

#[tokio::test]
async fn completing_a_pending_contract_is_rejected() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(10), d(20)),
      d(0),
    )
    .await
    .unwrap();

  let err =
    svc.complete_contract(contract.contract_id).await.unwrap_err();
  assert!(matches!(err, Error::IllegalTransition { .. }));
}

// ─── Daily sweep ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn sweep_starts_contracts_due_today() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(2), d(8)),
      d(0),
    )
    .await
    .unwrap();

  let report = svc.run_daily_sweep(d(2)).await.unwrap();
  assert_eq!(report.started, 1);
  assert!(report.failed.is_empty());

  let started = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(started.state, ContractState::Active);
  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Rented);
}

#[tokio::test]
async fn scenario_b_overdue_contract_keeps_the_vehicle_rented() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(10)),
      d(0),
    )
    .await
    .unwrap();

  let report = svc.run_daily_sweep(d(11)).await.unwrap();
  assert_eq!(report.overdue, 1);

  let late = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(late.state, ContractState::Overdue);
  assert!(late.note.unwrap().contains("overdue since"));
  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Rented);
}

#[tokio::test]
async fn scenario_c_pending_blocked_by_overdue_is_cancelled() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let mut other = new_client("B-0002");
  other.last_name = "Hargreaves".into();
  let rival = svc.register_client(other, d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  // Running rental that will go overdue, and a later booking behind it.
  svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(5)),
      d(0),
    )
    .await
    .unwrap();
  let waiting = svc
    .create_contract(
      booking(rival.client_id, vehicle.vehicle_id, d(18), d(20)),
      d(0),
    )
    .await
    .unwrap();

  let report = svc.run_daily_sweep(d(19)).await.unwrap();
  assert_eq!(report.overdue, 1);
  assert_eq!(report.cancelled, 1);

  let cancelled = s.get_contract(waiting.contract_id).await.unwrap().unwrap();
  assert_eq!(cancelled.state, ContractState::Cancelled);
  assert_eq!(cancelled.note.as_deref(), Some(NOTE_BLOCKED_BY_OVERDUE));

  // The vehicle itself is unaffected: still out, still rented.
  let v = s.get_vehicle(vehicle.vehicle_id).await.unwrap().unwrap();
  assert_eq!(v.state, VehicleState::Rented);
}

#[tokio::test]
async fn sweep_cancels_start_when_vehicle_is_still_out() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let mut other = new_client("B-0002");
  other.last_name = "Hargreaves".into();
  let rival = svc.register_client(other, d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  // First rental runs d0–d2 but is never returned; the next booking is due
  // to start on d5 while the vehicle is still rented.
  svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(0), d(2)),
      d(0),
    )
    .await
    .unwrap();
  let waiting = svc
    .create_contract(
      booking(rival.client_id, vehicle.vehicle_id, d(5), d(8)),
      d(0),
    )
    .await
    .unwrap();

  let report = svc.run_daily_sweep(d(5)).await.unwrap();
  assert_eq!(report.overdue, 1);
  assert_eq!(report.cancelled, 1);

  let cancelled = s.get_contract(waiting.contract_id).await.unwrap().unwrap();
  assert_eq!(cancelled.state, ContractState::Cancelled);
  assert_eq!(cancelled.note.as_deref(), Some(NOTE_VEHICLE_UNAVAILABLE));
}

#[tokio::test]
async fn same_day_booking_survives_its_first_sweep() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();

  // One-day rental booked ahead of time: start == end == d3.
  let contract = svc
    .create_contract(
      booking(client.client_id, vehicle.vehicle_id, d(3), d(3)),
      d(0),
    )
    .await
    .unwrap();

  svc.run_daily_sweep(d(3)).await.unwrap();
  let after = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(after.state, ContractState::Active);

  // Only the next day's sweep may mark it overdue.
  svc.run_daily_sweep(d(4)).await.unwrap();
  let after = s.get_contract(contract.contract_id).await.unwrap().unwrap();
  assert_eq!(after.state, ContractState::Overdue);
}

#[tokio::test]
async fn sweep_is_idempotent_for_a_given_date() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let mut other = new_client("B-0002");
  other.last_name = "Hargreaves".into();
  let rival = svc.register_client(other, d(0)).await.unwrap();
  let v1 = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let v2 = svc.register_vehicle(new_vehicle("EF-456-GH")).await.unwrap();

  svc
    .create_contract(booking(client.client_id, v1.vehicle_id, d(0), d(3)), d(0))
    .await
    .unwrap();
  svc
    .create_contract(booking(rival.client_id, v2.vehicle_id, d(6), d(9)), d(0))
    .await
    .unwrap();

  let first = svc.run_daily_sweep(d(6)).await.unwrap();
  assert_eq!((first.started, first.overdue), (1, 1));

  let second = svc.run_daily_sweep(d(6)).await.unwrap();
  assert_eq!(second.processed(), 0);

  let contracts = s.list_contracts(None).await.unwrap();
  let states: Vec<ContractState> =
    contracts.iter().map(|c| c.state).collect();
  assert!(states.contains(&ContractState::Overdue));
  assert!(states.contains(&ContractState::Active));
}

// ─── Store queries ───────────────────────────────────────────────────────────

/// Insert a contract row directly, bypassing the service.
async fn raw_contract(
  s: &SqliteStore,
  client_id: Uuid,
  vehicle_id: Uuid,
  start: NaiveDate,
  end: NaiveDate,
  state: ContractState,
) -> Contract {
  let now = Utc::now();
  let contract = Contract {
    contract_id: Uuid::new_v4(),
    client_id,
    vehicle_id,
    start,
    end,
    state,
    note: None,
    created_at: now,
    updated_at: now,
  };
  s.insert_contract(contract.clone()).await.unwrap();
  contract
}

#[tokio::test]
async fn live_queries_exclude_terminal_contracts() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let (c, v) = (client.client_id, vehicle.vehicle_id);

  raw_contract(&s, c, v, d(1), d(2), ContractState::Completed).await;
  raw_contract(&s, c, v, d(3), d(4), ContractState::Cancelled).await;
  let live = raw_contract(&s, c, v, d(5), d(6), ContractState::Overdue).await;

  let by_vehicle = s.live_contracts_for_vehicle(v).await.unwrap();
  assert_eq!(by_vehicle.len(), 1);
  assert_eq!(by_vehicle[0].contract_id, live.contract_id);

  let by_client = s.live_contracts_for_client(c, d(1), d(10)).await.unwrap();
  assert_eq!(by_client.len(), 1);
  assert_eq!(by_client[0].contract_id, live.contract_id);
}

#[tokio::test]
async fn client_range_query_is_inclusive() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let (c, v) = (client.client_id, vehicle.vehicle_id);

  raw_contract(&s, c, v, d(10), d(20), ContractState::Pending).await;

  // Touching at either endpoint is inside the range.
  assert_eq!(s.live_contracts_for_client(c, d(20), d(25)).await.unwrap().len(), 1);
  assert_eq!(s.live_contracts_for_client(c, d(5), d(10)).await.unwrap().len(), 1);
  assert!(s.live_contracts_for_client(c, d(21), d(25)).await.unwrap().is_empty());
}

#[tokio::test]
async fn sweep_queries_filter_by_state_and_date() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let (c, v) = (client.client_id, vehicle.vehicle_id);

  let due = raw_contract(&s, c, v, d(10), d(12), ContractState::Pending).await;
  raw_contract(&s, c, v, d(14), d(16), ContractState::Pending).await;
  let late = raw_contract(&s, c, v, d(1), d(8), ContractState::Active).await;
  raw_contract(&s, c, v, d(2), d(11), ContractState::Active).await;

  let starting = s.pending_starting_on(d(10)).await.unwrap();
  assert_eq!(starting.len(), 1);
  assert_eq!(starting[0].contract_id, due.contract_id);

  let ending = s.active_ending_before(d(10)).await.unwrap();
  assert_eq!(ending.len(), 1);
  assert_eq!(ending[0].contract_id, late.contract_id);

  let stale = s.pending_starting_on_or_before(d(10)).await.unwrap();
  assert_eq!(stale.len(), 1);

  let all_pending =
    s.list_contracts(Some(ContractState::Pending)).await.unwrap();
  assert_eq!(all_pending.len(), 2);
}

#[tokio::test]
async fn contracts_are_listed_newest_start_first() {
  let s = store().await;
  let svc = service(&s);

  let client = svc.register_client(new_client("B-0001"), d(0)).await.unwrap();
  let vehicle = svc.register_vehicle(new_vehicle("AB-123-CD")).await.unwrap();
  let (c, v) = (client.client_id, vehicle.vehicle_id);

  raw_contract(&s, c, v, d(1), d(2), ContractState::Completed).await;
  raw_contract(&s, c, v, d(8), d(9), ContractState::Pending).await;
  raw_contract(&s, c, v, d(4), d(5), ContractState::Completed).await;

  let for_client = s.contracts_for_client(c).await.unwrap();
  let starts: Vec<NaiveDate> = for_client.iter().map(|x| x.start).collect();
  assert_eq!(starts, vec![d(8), d(4), d(1)]);

  let for_vehicle = s.contracts_for_vehicle(v).await.unwrap();
  assert_eq!(for_vehicle.len(), 3);
}
