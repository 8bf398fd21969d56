//! SQLite-backed postal-code gazetteer
//!
//! The connection is opened on first use and kept for the life of the
//! process. A database that cannot be opened makes every lookup a miss.

use crate::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use territory_domain::{normalize_postal_code, Gazetteer, PostalRecord};
use tracing::{debug, info, warn};

/// Postal-code gazetteer stored in a `postal_codes` table
pub struct SqliteGazetteer {
    path: PathBuf,
    conn: OnceLock<Option<Mutex<Connection>>>,
}

impl SqliteGazetteer {
    /// Create a gazetteer that opens `path` on first lookup
    pub fn open_lazy<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            conn: OnceLock::new(),
        }
    }

    /// Open the database immediately, failing if it cannot be initialized
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Self::connect(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            conn: OnceLock::from(Some(Mutex::new(conn))),
        })
    }

    fn connect(path: &Path) -> Result<Connection, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("gazetteer.sql"))?;
        Ok(conn)
    }

    fn connection(&self) -> Option<&Mutex<Connection>> {
        self.conn
            .get_or_init(|| match Self::connect(&self.path) {
                Ok(conn) => {
                    debug!("Opened gazetteer at {}", self.path.display());
                    Some(Mutex::new(conn))
                }
                Err(e) => {
                    warn!("Gazetteer unavailable at {}: {}", self.path.display(), e);
                    None
                }
            })
            .as_ref()
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let lock = self
            .connection()
            .ok_or_else(|| StoreError::Unavailable(self.path.display().to_string()))?;
        let mut conn = lock
            .lock()
            .map_err(|_| StoreError::Unavailable("gazetteer lock poisoned".to_string()))?;
        f(&mut conn)
    }

    /// Insert or replace one record; malformed postal codes are rejected
    pub fn insert(&self, record: &PostalRecord) -> Result<(), StoreError> {
        let country = record.country.trim().to_ascii_uppercase();
        let code = normalize_postal_code(&record.postal_code, &country).ok_or_else(|| {
            StoreError::InvalidData(format!("Bad postal code: {}", record.postal_code))
        })?;
        self.with_conn(|conn| {
            insert_record(conn, &code, &country, record)?;
            Ok(())
        })
    }

    /// Number of stored postal codes
    pub fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM postal_codes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    /// Load a CSV file with columns
    /// `postal_code,country,city,county,state_code,latitude,longitude`.
    ///
    /// A header row is optional. Rows with a malformed postal code are
    /// skipped. Returns the number of rows imported.
    pub fn import_csv<P: AsRef<Path>>(&self, csv_path: P) -> Result<usize, StoreError> {
        let content = fs::read_to_string(csv_path.as_ref())?;
        let records: Vec<PostalRecord> = content
            .lines()
            .enumerate()
            .filter_map(|(line_no, line)| {
                let parsed = parse_csv_line(line);
                if parsed.is_none() && !line.trim().is_empty() && !is_header(line) {
                    warn!("Skipping malformed gazetteer line {}", line_no + 1);
                }
                parsed
            })
            .collect();

        let imported = self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut imported = 0;
            for record in &records {
                let country = record.country.trim().to_ascii_uppercase();
                match normalize_postal_code(&record.postal_code, &country) {
                    Some(code) => {
                        insert_record(&tx, &code, &country, record)?;
                        imported += 1;
                    }
                    None => warn!("Skipping bad postal code {}", record.postal_code),
                }
            }
            tx.commit()?;
            Ok(imported)
        })?;

        info!(
            "Imported {} postal codes from {}",
            imported,
            csv_path.as_ref().display()
        );
        Ok(imported)
    }
}

impl Gazetteer for SqliteGazetteer {
    fn lookup(&self, postal_code: &str, country: &str) -> Option<PostalRecord> {
        let country = country.trim().to_ascii_uppercase();
        let code = normalize_postal_code(postal_code, &country)?;

        let result = self.with_conn(|conn| {
            let record = conn
                .query_row(
                    "SELECT postal_code, country, city, county, state_code, latitude, longitude
                     FROM postal_codes WHERE country = ?1 AND postal_code = ?2",
                    params![&country, &code],
                    |row| {
                        Ok(PostalRecord {
                            postal_code: row.get(0)?,
                            country: row.get(1)?,
                            city: row.get(2)?,
                            county: row.get(3)?,
                            state_code: row.get(4)?,
                            latitude: row.get(5)?,
                            longitude: row.get(6)?,
                        })
                    },
                )
                .optional()?;
            Ok(record)
        });

        match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Gazetteer lookup failed for {} {}: {}", country, code, e);
                None
            }
        }
    }
}

fn insert_record(
    conn: &Connection,
    code: &str,
    country: &str,
    record: &PostalRecord,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO postal_codes
            (postal_code, country, city, county, state_code, latitude, longitude)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            code,
            country,
            &record.city,
            &record.county,
            record.state_code.as_ref().map(|s| s.to_ascii_uppercase()),
            record.latitude,
            record.longitude,
        ],
    )?;
    Ok(())
}

fn is_header(line: &str) -> bool {
    split_csv_fields(line)
        .first()
        .is_some_and(|f| f.eq_ignore_ascii_case("postal_code"))
}

/// Split one CSV line; quoted fields may hold commas and `""` escapes
fn split_csv_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

fn parse_csv_line(line: &str) -> Option<PostalRecord> {
    if line.trim().is_empty() || is_header(line) {
        return None;
    }
    let fields = split_csv_fields(line);
    if fields.len() < 5 {
        return None;
    }
    let text = |i: usize| {
        fields
            .get(i)
            .filter(|f| !f.is_empty())
            .map(|f| f.to_string())
    };
    let number = |i: usize| fields.get(i).and_then(|f| f.parse::<f64>().ok());

    Some(PostalRecord {
        postal_code: fields[0].to_string(),
        country: text(1).unwrap_or_else(|| "US".to_string()),
        city: text(2),
        county: text(3),
        state_code: text(4),
        latitude: number(5),
        longitude: number(6),
    })
}
