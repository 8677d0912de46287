//! [`LifecycleService`] — the orchestrator behind every mutating operation.
//!
//! Validation, the state machine, and the sweep planner are pure; this
//! module wires them to the stores and serialises availability-check-then-
//! write per vehicle, so two concurrent creations cannot double-book.
//! Operations on distinct vehicles do not contend.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  client::{Client, NewClient, MINIMUM_RENTAL_AGE},
  conflict,
  contract::{Contract, ContractState, NewContract},
  error::{Error, Result},
  machine::{self, ContractEvent, VehicleEffect},
  store::{ClientStore, ContractStore, VehicleStore},
  sweep::{self, SweepAction, SweepFailure, SweepReport, SweepSnapshot},
  validate::{self, CandidateContract, Rejection, DEFAULT_MAX_SPAN_DAYS},
  vehicle::{NewVehicle, Vehicle, VehicleState},
};

pub const NOTE_OUT_OF_SERVICE: &str =
  "cancelled automatically: vehicle taken out of service";

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

// ─── Per-vehicle serialisation ───────────────────────────────────────────────

/// One async mutex per vehicle, created on first use. Held across the
/// availability-check-then-write window.
#[derive(Default)]
struct VehicleLocks {
  inner: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl VehicleLocks {
  fn get(&self, vehicle_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
    self
      .inner
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(vehicle_id)
      .or_default()
      .clone()
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct LifecycleService<S> {
  store:         Arc<S>,
  max_span_days: i64,
  locks:         VehicleLocks,
}

impl<S> LifecycleService<S>
where
  S: ContractStore + VehicleStore + ClientStore,
{
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      max_span_days: DEFAULT_MAX_SPAN_DAYS,
      locks: VehicleLocks::default(),
    }
  }

  /// Override the maximum rental span, in days.
  pub fn with_max_span_days(mut self, days: i64) -> Self {
    self.max_span_days = days;
    self
  }

  /// The underlying store, for read-only callers.
  pub fn store(&self) -> &S {
    &self.store
  }

  // ── Contracts ─────────────────────────────────────────────────────────────

  /// Validate and create a contract. A contract whose start date is `today`
  /// begins immediately: it is persisted as Active and claims its vehicle.
  pub async fn create_contract(
    &self,
    input: NewContract,
    today: NaiveDate,
  ) -> Result<Contract> {
    let lock = self.locks.get(input.vehicle_id);
    let _guard = lock.lock().await;

    let client =
      self.store.get_client(input.client_id).await.map_err(store_err)?;
    let vehicle =
      self.store.get_vehicle(input.vehicle_id).await.map_err(store_err)?;

    let vehicle_contracts = self
      .store
      .live_contracts_for_vehicle(input.vehicle_id)
      .await
      .map_err(store_err)?;
    let client_contracts = self
      .store
      .live_contracts_for_client(input.client_id, input.start, input.end)
      .await
      .map_err(store_err)?;

    validate::validate(&CandidateContract {
      start: input.start,
      end: input.end,
      today,
      max_span_days: self.max_span_days,
      client: client.as_ref(),
      vehicle: vehicle.as_ref(),
      vehicle_contracts: &vehicle_contracts,
      client_contracts: &client_contracts,
    })?;

    let now = Utc::now();
    let mut contract = Contract {
      contract_id: Uuid::new_v4(),
      client_id:   input.client_id,
      vehicle_id:  input.vehicle_id,
      start:       input.start,
      end:         input.end,
      state:       ContractState::Pending,
      note:        input.note,
      created_at:  now,
      updated_at:  now,
    };

    if contract.start == today {
      let t = machine::transition(contract.state, ContractEvent::Start)?;
      contract.state = t.next;
      self.apply_vehicle_effect(contract.vehicle_id, t.vehicle).await?;
    }

    self.store.insert_contract(contract.clone()).await.map_err(store_err)?;
    info!(
      contract_id = %contract.contract_id,
      state = %contract.state,
      "contract created"
    );
    Ok(contract)
  }

  /// Rewrite a Pending contract's interval and note. The availability check
  /// runs against the new interval, with the contract's own booking left
  /// out of the conflict set.
  pub async fn modify_contract(
    &self,
    id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    note: Option<String>,
  ) -> Result<Contract> {
    let Some(contract) =
      self.store.get_contract(id).await.map_err(store_err)?
    else {
      return Err(Error::ContractNotFound(id));
    };

    machine::transition(contract.state, ContractEvent::Modify)?;
    validate::check_interval(start, end, self.max_span_days)?;

    let lock = self.locks.get(contract.vehicle_id);
    let _guard = lock.lock().await;

    let Some(mut contract) =
      self.store.get_contract(id).await.map_err(store_err)?
    else {
      return Err(Error::ContractNotFound(id));
    };
    machine::transition(contract.state, ContractEvent::Modify)?;

    let vehicle_contracts: Vec<Contract> = self
      .store
      .live_contracts_for_vehicle(contract.vehicle_id)
      .await
      .map_err(store_err)?
      .into_iter()
      .filter(|c| c.contract_id != id)
      .collect();
    if conflict::has_conflict(start, end, &vehicle_contracts) {
      return Err(Error::Validation(Rejection::VehicleConflict));
    }

    let client_contracts: Vec<Contract> = self
      .store
      .live_contracts_for_client(contract.client_id, start, end)
      .await
      .map_err(store_err)?
      .into_iter()
      .filter(|c| c.contract_id != id)
      .collect();
    if conflict::has_conflict(start, end, &client_contracts) {
      return Err(Error::Validation(Rejection::ClientConflict));
    }

    contract.start = start;
    contract.end = end;
    contract.note = note;
    contract.updated_at = Utc::now();
    self.store.update_contract(contract.clone()).await.map_err(store_err)?;
    Ok(contract)
  }

  /// Cancel a live contract, releasing the vehicle if it was out.
  pub async fn cancel_contract(
    &self,
    id: Uuid,
    reason: Option<String>,
  ) -> Result<Contract> {
    self.apply_event(id, ContractEvent::Cancel, reason).await
  }

  /// Complete a contract: the vehicle came back.
  pub async fn complete_contract(&self, id: Uuid) -> Result<Contract> {
    self.apply_event(id, ContractEvent::Return, None).await
  }

  /// Fetch, transition, persist, all under the per-vehicle lock. The
  /// contract is re-read once the lock is held; its state may have moved.
  async fn apply_event(
    &self,
    id: Uuid,
    event: ContractEvent,
    note: Option<String>,
  ) -> Result<Contract> {
    let Some(contract) =
      self.store.get_contract(id).await.map_err(store_err)?
    else {
      return Err(Error::ContractNotFound(id));
    };

    let lock = self.locks.get(contract.vehicle_id);
    let _guard = lock.lock().await;

    let Some(mut contract) =
      self.store.get_contract(id).await.map_err(store_err)?
    else {
      return Err(Error::ContractNotFound(id));
    };
    let t = machine::transition(contract.state, event)?;
    contract.state = t.next;
    if let Some(note) = note {
      contract.note = Some(note);
    }
    contract.updated_at = Utc::now();

    self.apply_vehicle_effect(contract.vehicle_id, t.vehicle).await?;
    self.store.update_contract(contract.clone()).await.map_err(store_err)?;
    info!(
      contract_id = %contract.contract_id,
      event = %event,
      state = %contract.state,
      "contract transitioned"
    );
    Ok(contract)
  }

  /// Apply a transition's vehicle side effect. A release only touches a
  /// vehicle that is actually Rented; one taken out of service stays out
  /// of service when its contract closes.
  async fn apply_vehicle_effect(
    &self,
    vehicle_id: Uuid,
    effect: VehicleEffect,
  ) -> Result<()> {
    let target = match effect {
      VehicleEffect::None => return Ok(()),
      VehicleEffect::Claim => VehicleState::Rented,
      VehicleEffect::Release => VehicleState::Available,
    };
    let Some(mut vehicle) =
      self.store.get_vehicle(vehicle_id).await.map_err(store_err)?
    else {
      return Err(Error::VehicleNotFound(vehicle_id));
    };
    if effect == VehicleEffect::Release
      && vehicle.state != VehicleState::Rented
    {
      return Ok(());
    }
    vehicle.state = target;
    self.store.update_vehicle(vehicle).await.map_err(store_err)?;
    Ok(())
  }

  // ── Daily sweep ───────────────────────────────────────────────────────────

  /// Run the three-phase reconciliation sweep for `today`.
  ///
  /// Safe to re-run for the same date. Each action is applied on its own;
  /// a store failure on one contract is recorded in the report and the rest
  /// of the fleet is still processed.
  pub async fn run_daily_sweep(&self, today: NaiveDate) -> Result<SweepReport> {
    let snapshot = self.sweep_snapshot(today).await?;
    let actions = sweep::plan(today, &snapshot);

    let mut report = SweepReport::new(today);
    for action in actions {
      match self.apply_sweep_action(&action).await {
        Ok(()) => report.tally(action.event),
        Err(e) => {
          warn!(
            contract_id = %action.contract_id,
            error = %e,
            "sweep action failed"
          );
          report.failed.push(SweepFailure {
            contract_id: action.contract_id,
            reason:      e.to_string(),
          });
        }
      }
    }

    info!(
      date = %today,
      started = report.started,
      overdue = report.overdue,
      cancelled = report.cancelled,
      failed = report.failed.len(),
      "daily sweep finished"
    );
    Ok(report)
  }

  async fn sweep_snapshot(&self, today: NaiveDate) -> Result<SweepSnapshot> {
    let due_to_start =
      self.store.pending_starting_on(today).await.map_err(store_err)?;
    let running_late =
      self.store.active_ending_before(today).await.map_err(store_err)?;
    let stale_pending = self
      .store
      .pending_starting_on_or_before(today)
      .await
      .map_err(store_err)?;

    let mut vehicle_states = HashMap::new();
    for contract in
      due_to_start.iter().chain(&running_late).chain(&stale_pending)
    {
      if vehicle_states.contains_key(&contract.vehicle_id) {
        continue;
      }
      if let Some(v) =
        self.store.get_vehicle(contract.vehicle_id).await.map_err(store_err)?
      {
        vehicle_states.insert(contract.vehicle_id, v.state);
      }
    }

    let vehicles_with_overdue = self
      .store
      .list_contracts(Some(ContractState::Overdue))
      .await
      .map_err(store_err)?
      .into_iter()
      .map(|c| c.vehicle_id)
      .collect();

    Ok(SweepSnapshot {
      due_to_start,
      running_late,
      stale_pending,
      vehicle_states,
      vehicles_with_overdue,
    })
  }

  async fn apply_sweep_action(&self, action: &SweepAction) -> Result<()> {
    let lock = self.locks.get(action.vehicle_id);
    let _guard = lock.lock().await;

    let Some(mut contract) =
      self.store.get_contract(action.contract_id).await.map_err(store_err)?
    else {
      return Err(Error::ContractNotFound(action.contract_id));
    };
    let t = machine::transition(contract.state, action.event)?;
    contract.state = t.next;
    if let Some(note) = &action.note {
      contract.note = Some(note.clone());
    }
    contract.updated_at = Utc::now();

    self.apply_vehicle_effect(contract.vehicle_id, t.vehicle).await?;
    self.store.update_contract(contract).await.map_err(store_err)?;
    Ok(())
  }

  // ── Clients ───────────────────────────────────────────────────────────────

  /// Register a client, enforcing identity and licence uniqueness and the
  /// minimum rental age.
  pub async fn register_client(
    &self,
    input: NewClient,
    today: NaiveDate,
  ) -> Result<Client> {
    let taken = self
      .store
      .identity_exists(
        input.last_name.clone(),
        input.first_name.clone(),
        input.birth_date,
      )
      .await
      .map_err(store_err)?;
    if taken {
      return Err(Error::DuplicateClient);
    }
    if self
      .store
      .licence_exists(input.licence_number.clone())
      .await
      .map_err(store_err)?
    {
      return Err(Error::DuplicateLicence(input.licence_number));
    }

    let client = Client {
      client_id:      Uuid::new_v4(),
      last_name:      input.last_name,
      first_name:     input.first_name,
      birth_date:     input.birth_date,
      licence_number: input.licence_number,
      address:        input.address,
      active:         true,
      created_at:     Utc::now(),
    };
    if !client.is_of_age_on(today) {
      return Err(Error::Validation(Rejection::UnderAge {
        minimum: MINIMUM_RENTAL_AGE,
      }));
    }

    self.store.insert_client(client.clone()).await.map_err(store_err)?;
    Ok(client)
  }

  pub async fn update_client(
    &self,
    id: Uuid,
    input: NewClient,
  ) -> Result<Client> {
    let Some(mut client) =
      self.store.get_client(id).await.map_err(store_err)?
    else {
      return Err(Error::ClientNotFound(id));
    };

    if client.licence_number != input.licence_number
      && self
        .store
        .licence_exists(input.licence_number.clone())
        .await
        .map_err(store_err)?
    {
      return Err(Error::DuplicateLicence(input.licence_number));
    }

    client.last_name = input.last_name;
    client.first_name = input.first_name;
    client.birth_date = input.birth_date;
    client.licence_number = input.licence_number;
    client.address = input.address;
    self.store.update_client(client.clone()).await.map_err(store_err)?;
    Ok(client)
  }

  /// Activate or deactivate a client. Deactivation blocks new contracts
  /// only; running rentals are unaffected.
  pub async fn set_client_active(
    &self,
    id: Uuid,
    active: bool,
  ) -> Result<Client> {
    let Some(mut client) =
      self.store.get_client(id).await.map_err(store_err)?
    else {
      return Err(Error::ClientNotFound(id));
    };
    client.active = active;
    self.store.update_client(client.clone()).await.map_err(store_err)?;
    Ok(client)
  }

  // ── Vehicles ──────────────────────────────────────────────────────────────

  pub async fn register_vehicle(&self, input: NewVehicle) -> Result<Vehicle> {
    if self
      .store
      .registration_exists(input.registration.clone())
      .await
      .map_err(store_err)?
    {
      return Err(Error::DuplicateRegistration(input.registration));
    }

    let vehicle = Vehicle {
      vehicle_id:   Uuid::new_v4(),
      make:         input.make,
      model:        input.model,
      engine:       input.engine,
      colour:       input.colour,
      registration: input.registration,
      acquired_on:  input.acquired_on,
      state:        VehicleState::Available,
      created_at:   Utc::now(),
    };
    self.store.insert_vehicle(vehicle.clone()).await.map_err(store_err)?;
    Ok(vehicle)
  }

  /// Update a vehicle's descriptive fields. The state is not touched here;
  /// see [`set_vehicle_state`](Self::set_vehicle_state).
  pub async fn update_vehicle(
    &self,
    id: Uuid,
    input: NewVehicle,
  ) -> Result<Vehicle> {
    let Some(mut vehicle) =
      self.store.get_vehicle(id).await.map_err(store_err)?
    else {
      return Err(Error::VehicleNotFound(id));
    };

    if vehicle.registration != input.registration
      && self
        .store
        .registration_exists(input.registration.clone())
        .await
        .map_err(store_err)?
    {
      return Err(Error::DuplicateRegistration(input.registration));
    }

    vehicle.make = input.make;
    vehicle.model = input.model;
    vehicle.engine = input.engine;
    vehicle.colour = input.colour;
    vehicle.registration = input.registration;
    vehicle.acquired_on = input.acquired_on;
    self.store.update_vehicle(vehicle.clone()).await.map_err(store_err)?;
    Ok(vehicle)
  }

  /// Operator state change. `Rented` belongs to the lifecycle engine, and a
  /// vehicle out under a live contract cannot be re-stated from outside.
  /// Moving a vehicle out of service cancels its Pending contracts.
  pub async fn set_vehicle_state(
    &self,
    id: Uuid,
    state: VehicleState,
  ) -> Result<Vehicle> {
    if state == VehicleState::Rented {
      return Err(Error::RentedIsManaged);
    }

    let lock = self.locks.get(id);
    let _guard = lock.lock().await;

    let Some(mut vehicle) =
      self.store.get_vehicle(id).await.map_err(store_err)?
    else {
      return Err(Error::VehicleNotFound(id));
    };
    let live =
      self.store.live_contracts_for_vehicle(id).await.map_err(store_err)?;
    if live.iter().any(|c| c.state.holds_vehicle()) {
      return Err(Error::VehicleRented(id));
    }

    if state == VehicleState::OutOfService && !vehicle.is_out_of_service() {
      for pending in
        live.iter().filter(|c| c.state == ContractState::Pending)
      {
        let t = machine::transition(pending.state, ContractEvent::Cancel)?;
        let mut cancelled = pending.clone();
        cancelled.state = t.next;
        cancelled.note = Some(NOTE_OUT_OF_SERVICE.to_owned());
        cancelled.updated_at = Utc::now();
        self.store.update_contract(cancelled).await.map_err(store_err)?;
        info!(
          contract_id = %pending.contract_id,
          vehicle_id = %id,
          "pending contract cancelled with its vehicle"
        );
      }
    }

    vehicle.state = state;
    self.store.update_vehicle(vehicle.clone()).await.map_err(store_err)?;
    Ok(vehicle)
  }
}
