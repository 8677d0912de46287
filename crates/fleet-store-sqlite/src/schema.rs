//! SQL schema for the Fleet SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    client_id      TEXT PRIMARY KEY,
    last_name      TEXT NOT NULL,
    first_name     TEXT NOT NULL,
    birth_date     TEXT NOT NULL,      -- ISO 8601 date
    licence_number TEXT NOT NULL,
    address        TEXT NOT NULL,
    active         INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL,      -- RFC 3339 UTC
    UNIQUE (licence_number),
    UNIQUE (last_name, first_name, birth_date)
);

CREATE TABLE IF NOT EXISTS vehicles (
    vehicle_id   TEXT PRIMARY KEY,
    make         TEXT NOT NULL,
    model        TEXT NOT NULL,
    engine       TEXT NOT NULL,
    colour       TEXT NOT NULL,
    registration TEXT NOT NULL,
    acquired_on  TEXT NOT NULL,
    state        TEXT NOT NULL DEFAULT 'available',
    created_at   TEXT NOT NULL,
    UNIQUE (registration)
);

-- Contracts are never deleted. Terminal rows ('completed', 'cancelled')
-- stay behind as history.
CREATE TABLE IF NOT EXISTS contracts (
    contract_id TEXT PRIMARY KEY,
    client_id   TEXT NOT NULL REFERENCES clients(client_id),
    vehicle_id  TEXT NOT NULL REFERENCES vehicles(vehicle_id),
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    state       TEXT NOT NULL,
    note        TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    CHECK (start_date <= end_date)
);

CREATE INDEX IF NOT EXISTS contracts_client_idx  ON contracts(client_id);
CREATE INDEX IF NOT EXISTS contracts_vehicle_idx ON contracts(vehicle_id);
CREATE INDEX IF NOT EXISTS contracts_dates_idx   ON contracts(start_date, end_date);
CREATE INDEX IF NOT EXISTS contracts_state_idx   ON contracts(state);

PRAGMA user_version = 1;
";
