//! Territory Storage Layer
//!
//! Implements the `TerritoryStore` trait on SQLite and provides the
//! SQLite-backed postal-code gazetteer.
//!
//! # Architecture
//!
//! - `territory_checks` table for parsed and unparsed broker statements
//! - `postal_codes` table (usually a separate database file) for the gazetteer
//!
//! # Examples
//!
//! ```no_run
//! use territory_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for check operations
//! ```

#![warn(missing_docs)]

mod gazetteer;

pub use gazetteer::SqliteGazetteer;

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use territory_domain::traits::{CheckQuery, TerritoryStore};
use territory_domain::{AvailabilityStatus, CheckId, LocationFact, TerritoryCheck};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error (gazetteer import)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Duplicate check id
    #[error("Duplicate check: {0}")]
    Duplicate(String),

    /// Backing database could not be opened
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

const CHECK_COLUMNS: &str = "id, franchise_id, location_raw, country, state_code, county, city, \
     postal_code, radius_miles, is_resale, latitude, longitude, availability_status, check_date, parsed";

/// SQLite-based implementation of TerritoryStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;

        // Databases created before parse runs marked their rows
        if self.conn.prepare("SELECT parsed FROM territory_checks LIMIT 0").is_err() {
            debug!("Adding parsed column to territory_checks");
            self.conn.execute_batch(
                "ALTER TABLE territory_checks ADD COLUMN parsed INTEGER NOT NULL DEFAULT 0",
            )?;
        }
        Ok(())
    }

    /// Total number of stored checks
    pub fn count_checks(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM territory_checks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Convert CheckId to bytes for storage
    ///
    /// Big-endian so that SQLite's BLOB ordering matches id ordering.
    fn check_id_to_bytes(id: CheckId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to CheckId
    fn bytes_to_check_id(bytes: &[u8]) -> Result<CheckId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for CheckId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(CheckId::from_value(u128::from_be_bytes(arr)))
    }

    /// Map a row selected with `CHECK_COLUMNS` to a TerritoryCheck
    fn row_to_check(row: &Row<'_>) -> rusqlite::Result<TerritoryCheck> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_check_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;

        let status_str: String = row.get(12)?;
        let availability_status = AvailabilityStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                12,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(format!("Unknown status: {}", status_str))),
            )
        })?;

        let check_date: Option<i64> = row.get(13)?;

        Ok(TerritoryCheck {
            id,
            franchise_id: row.get(1)?,
            location_raw: row.get(2)?,
            location: LocationFact {
                country: row.get(3)?,
                state_code: row.get(4)?,
                county: row.get(5)?,
                city: row.get(6)?,
                postal_code: row.get(7)?,
                radius_miles: row.get(8)?,
                is_resale: row.get::<_, i64>(9)? != 0,
                latitude: row.get(10)?,
                longitude: row.get(11)?,
            },
            availability_status,
            check_date: check_date.map(|d| d as u64),
            parsed: row.get::<_, i64>(14)? != 0,
        })
    }
}

impl TerritoryStore for SqliteStore {
    type Error = StoreError;

    fn insert_check(&mut self, check: &TerritoryCheck) -> Result<CheckId, Self::Error> {
        let id_bytes = Self::check_id_to_bytes(check.id);

        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM territory_checks WHERE id = ?1",
                params![&id_bytes],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            return Err(StoreError::Duplicate(check.id.to_string()));
        }

        let loc = &check.location;
        self.conn.execute(
            &format!(
                "INSERT INTO territory_checks ({})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                CHECK_COLUMNS
            ),
            params![
                &id_bytes,
                &check.franchise_id,
                &check.location_raw,
                &loc.country,
                &loc.state_code,
                &loc.county,
                &loc.city,
                &loc.postal_code,
                loc.radius_miles,
                loc.is_resale as i64,
                loc.latitude,
                loc.longitude,
                check.availability_status.as_str(),
                check.check_date.map(|d| d as i64),
                check.parsed as i64,
            ],
        )?;

        Ok(check.id)
    }

    fn get_check(&self, id: CheckId) -> Result<Option<TerritoryCheck>, Self::Error> {
        let id_bytes = Self::check_id_to_bytes(id);

        let check = self
            .conn
            .query_row(
                &format!("SELECT {} FROM territory_checks WHERE id = ?1", CHECK_COLUMNS),
                params![&id_bytes],
                Self::row_to_check,
            )
            .optional()?;

        Ok(check)
    }

    fn query_checks(&self, query: &CheckQuery) -> Result<Vec<TerritoryCheck>, Self::Error> {
        let mut sql = format!("SELECT {} FROM territory_checks WHERE 1=1", CHECK_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(franchise_id) = &query.franchise_id {
            sql.push_str(" AND franchise_id = ?");
            params.push(Box::new(franchise_id.clone()));
        }

        if query.missing_geography {
            sql.push_str(" AND parsed = 0 AND city IS NULL AND county IS NULL AND postal_code IS NULL");
        }

        if query.needs_enrichment {
            sql.push_str(
                " AND postal_code IS NOT NULL AND (city IS NULL OR state_code IS NULL \
                 OR latitude IS NULL OR longitude IS NULL \
                 OR (county IS NULL AND country = 'US'))",
            );
        }

        if let Some(after) = query.after {
            sql.push_str(" AND id > ?");
            params.push(Box::new(Self::check_id_to_bytes(after)));
        }

        sql.push_str(" ORDER BY id");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let checks = stmt
            .query_map(&param_refs[..], Self::row_to_check)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(checks)
    }

    fn update_check(&mut self, check: &TerritoryCheck) -> Result<bool, Self::Error> {
        let loc = &check.location;
        let changed = self.conn.execute(
            "UPDATE territory_checks SET
                country = ?2, state_code = ?3, county = ?4, city = ?5, postal_code = ?6,
                radius_miles = ?7, is_resale = ?8, latitude = ?9, longitude = ?10, parsed = ?11
             WHERE id = ?1",
            params![
                Self::check_id_to_bytes(check.id),
                &loc.country,
                &loc.state_code,
                &loc.county,
                &loc.city,
                &loc.postal_code,
                loc.radius_miles,
                loc.is_resale as i64,
                loc.latitude,
                loc.longitude,
                check.parsed as i64,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_checks(&mut self, ids: &[CheckId]) -> Result<usize, Self::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut stmt = self.conn.prepare("DELETE FROM territory_checks WHERE id = ?1")?;
        let mut deleted = 0;
        for id in ids {
            deleted += stmt.execute(params![Self::check_id_to_bytes(*id)])?;
        }
        Ok(deleted)
    }

    fn franchises_with_multiple_checks(&self) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT franchise_id FROM territory_checks
             GROUP BY franchise_id HAVING COUNT(*) > 1
             ORDER BY franchise_id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_id_bytes_round_trip() {
        let id = CheckId::new();
        let bytes = SqliteStore::check_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_check_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_bytes_to_check_id_rejects_bad_length() {
        assert!(SqliteStore::bytes_to_check_id(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_byte_order_matches_id_order() {
        let low = SqliteStore::check_id_to_bytes(CheckId::from_value(1));
        let high = SqliteStore::check_id_to_bytes(CheckId::from_value(1 << 100));
        assert!(low < high);
    }
}
