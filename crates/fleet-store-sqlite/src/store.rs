//! [`SqliteStore`] — the SQLite implementation of the Fleet store traits.

use std::path::Path;

use chrono::NaiveDate;
use fleet_core::{
  client::Client,
  contract::{Contract, ContractState},
  store::{ClientStore, ContractStore, VehicleStore},
  vehicle::{Vehicle, VehicleState},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{
    encode_contract_state, encode_date, encode_dt, encode_uuid,
    encode_vehicle_state, RawClient, RawContract, RawVehicle,
    CLIENT_COLUMNS, CONTRACT_COLUMNS, VEHICLE_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Contract states that still claim the vehicle, as a SQL tuple.
const LIVE_STATES: &str = "('pending', 'active', 'overdue')";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Fleet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a SELECT over `contracts` and decode every row.
  /// All parameters are text (UUIDs, ISO dates, state discriminants).
  async fn query_contracts(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Contract>> {
    let raws: Vec<RawContract> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params),
            RawContract::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContract::into_contract).collect()
  }

  async fn exists(&self, sql: String, params: Vec<String>) -> Result<bool> {
    let found = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let found = stmt.exists(rusqlite::params_from_iter(params))?;
        Ok(found)
      })
      .await?;
    Ok(found)
  }
}

// ─── ContractStore impl ──────────────────────────────────────────────────────

impl ContractStore for SqliteStore {
  type Error = Error;

  async fn insert_contract(&self, contract: Contract) -> Result<()> {
    let id_str         = encode_uuid(contract.contract_id);
    let client_id_str  = encode_uuid(contract.client_id);
    let vehicle_id_str = encode_uuid(contract.vehicle_id);
    let start_str      = encode_date(contract.start);
    let end_str        = encode_date(contract.end);
    let state_str      = encode_contract_state(contract.state).to_owned();
    let note           = contract.note.clone();
    let created_str    = encode_dt(contract.created_at);
    let updated_str    = encode_dt(contract.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contracts (
             contract_id, client_id, vehicle_id, start_date, end_date,
             state, note, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            client_id_str,
            vehicle_id_str,
            start_str,
            end_str,
            state_str,
            note,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_contract(&self, contract: Contract) -> Result<()> {
    let id_str      = encode_uuid(contract.contract_id);
    let start_str   = encode_date(contract.start);
    let end_str     = encode_date(contract.end);
    let state_str   = encode_contract_state(contract.state).to_owned();
    let note        = contract.note.clone();
    let updated_str = encode_dt(contract.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contracts
           SET start_date = ?2, end_date = ?3, state = ?4, note = ?5,
               updated_at = ?6
           WHERE contract_id = ?1",
          rusqlite::params![
            id_str, start_str, end_str, state_str, note, updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_contract(&self, id: Uuid) -> Result<Option<Contract>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE contract_id = ?1"
    );

    let raw: Option<RawContract> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawContract::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContract::into_contract).transpose()
  }

  async fn list_contracts(
    &self,
    state: Option<ContractState>,
  ) -> Result<Vec<Contract>> {
    match state {
      Some(s) => {
        self
          .query_contracts(
            format!(
              "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE state = ?1
               ORDER BY start_date DESC"
            ),
            vec![encode_contract_state(s).to_owned()],
          )
          .await
      }
      None => {
        self
          .query_contracts(
            format!(
              "SELECT {CONTRACT_COLUMNS} FROM contracts
               ORDER BY start_date DESC"
            ),
            vec![],
          )
          .await
      }
    }
  }

  async fn contracts_for_client(&self, client_id: Uuid) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE client_id = ?1
           ORDER BY start_date DESC"
        ),
        vec![encode_uuid(client_id)],
      )
      .await
  }

  async fn contracts_for_vehicle(
    &self,
    vehicle_id: Uuid,
  ) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE vehicle_id = ?1
           ORDER BY start_date DESC"
        ),
        vec![encode_uuid(vehicle_id)],
      )
      .await
  }

  async fn live_contracts_for_vehicle(
    &self,
    vehicle_id: Uuid,
  ) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE vehicle_id = ?1 AND state IN {LIVE_STATES}
           ORDER BY start_date ASC"
        ),
        vec![encode_uuid(vehicle_id)],
      )
      .await
  }

  async fn live_contracts_for_client(
    &self,
    client_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE client_id = ?1 AND state IN {LIVE_STATES}
             AND start_date <= ?2 AND end_date >= ?3
           ORDER BY start_date ASC"
        ),
        vec![encode_uuid(client_id), encode_date(end), encode_date(start)],
      )
      .await
  }

  async fn pending_starting_on(&self, date: NaiveDate) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE state = 'pending' AND start_date = ?1"
        ),
        vec![encode_date(date)],
      )
      .await
  }

  async fn active_ending_before(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE state = 'active' AND end_date < ?1"
        ),
        vec![encode_date(date)],
      )
      .await
  }

  async fn pending_starting_on_or_before(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<Contract>> {
    self
      .query_contracts(
        format!(
          "SELECT {CONTRACT_COLUMNS} FROM contracts
           WHERE state = 'pending' AND start_date <= ?1"
        ),
        vec![encode_date(date)],
      )
      .await
  }
}

// ─── VehicleStore impl ───────────────────────────────────────────────────────

impl VehicleStore for SqliteStore {
  type Error = Error;

  async fn insert_vehicle(&self, vehicle: Vehicle) -> Result<()> {
    let id_str       = encode_uuid(vehicle.vehicle_id);
    let acquired_str = encode_date(vehicle.acquired_on);
    let state_str    = encode_vehicle_state(vehicle.state).to_owned();
    let created_str  = encode_dt(vehicle.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO vehicles (
             vehicle_id, make, model, engine, colour, registration,
             acquired_on, state, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            vehicle.make,
            vehicle.model,
            vehicle.engine,
            vehicle.colour,
            vehicle.registration,
            acquired_str,
            state_str,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_vehicle(&self, vehicle: Vehicle) -> Result<()> {
    let id_str       = encode_uuid(vehicle.vehicle_id);
    let acquired_str = encode_date(vehicle.acquired_on);
    let state_str    = encode_vehicle_state(vehicle.state).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE vehicles
           SET make = ?2, model = ?3, engine = ?4, colour = ?5,
               registration = ?6, acquired_on = ?7, state = ?8
           WHERE vehicle_id = ?1",
          rusqlite::params![
            id_str,
            vehicle.make,
            vehicle.model,
            vehicle.engine,
            vehicle.colour,
            vehicle.registration,
            acquired_str,
            state_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE vehicle_id = ?1"
    );

    let raw: Option<RawVehicle> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawVehicle::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVehicle::into_vehicle).transpose()
  }

  async fn list_vehicles(
    &self,
    state: Option<VehicleState>,
  ) -> Result<Vec<Vehicle>> {
    let state_str = state.map(encode_vehicle_state).map(str::to_owned);

    let raws: Vec<RawVehicle> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = state_str {
          let sql = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE state = ?1"
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![s], RawVehicle::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles");
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], RawVehicle::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVehicle::into_vehicle).collect()
  }

  async fn registration_exists(&self, registration: String) -> Result<bool> {
    self
      .exists(
        "SELECT 1 FROM vehicles WHERE registration = ?1".to_owned(),
        vec![registration],
      )
      .await
  }
}

// ─── ClientStore impl ────────────────────────────────────────────────────────

impl ClientStore for SqliteStore {
  type Error = Error;

  async fn insert_client(&self, client: Client) -> Result<()> {
    let id_str      = encode_uuid(client.client_id);
    let birth_str   = encode_date(client.birth_date);
    let created_str = encode_dt(client.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clients (
             client_id, last_name, first_name, birth_date, licence_number,
             address, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            client.last_name,
            client.first_name,
            birth_str,
            client.licence_number,
            client.address,
            client.active,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_client(&self, client: Client) -> Result<()> {
    let id_str    = encode_uuid(client.client_id);
    let birth_str = encode_date(client.birth_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE clients
           SET last_name = ?2, first_name = ?3, birth_date = ?4,
               licence_number = ?5, address = ?6, active = ?7
           WHERE client_id = ?1",
          rusqlite::params![
            id_str,
            client.last_name,
            client.first_name,
            birth_str,
            client.licence_number,
            client.address,
            client.active,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE client_id = ?1");

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawClient::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn list_clients(&self) -> Result<Vec<Client>> {
    let raws: Vec<RawClient> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY last_name ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawClient::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClient::into_client).collect()
  }

  async fn licence_exists(&self, licence_number: String) -> Result<bool> {
    self
      .exists(
        "SELECT 1 FROM clients WHERE licence_number = ?1".to_owned(),
        vec![licence_number],
      )
      .await
  }

  async fn identity_exists(
    &self,
    last_name: String,
    first_name: String,
    birth_date: NaiveDate,
  ) -> Result<bool> {
    self
      .exists(
        "SELECT 1 FROM clients
         WHERE last_name = ?1 AND first_name = ?2 AND birth_date = ?3"
          .to_owned(),
        vec![last_name, first_name, encode_date(birth_date)],
      )
      .await
  }
}
