//! medkg Storage Layer
//!
//! Implements the [`DataSource`] trait over SQLite with rusqlite.
//!
//! # Architecture
//!
//! One `SqliteSource` handle per batch run, passed explicitly to every unit
//! of work; no process-global connection state. The schema ships with the
//! crate and is applied idempotently on open, so a fresh database file is
//! immediately queryable (and empty tables simply yield empty results).
//!
//! # Examples
//!
//! ```no_run
//! use medkg_store::SqliteSource;
//!
//! let source = SqliteSource::open("population.db").unwrap();
//! // Source is now ready for patient and literature queries
//! ```

#![warn(missing_docs)]

use chrono::NaiveDate;
use medkg_domain::traits::DataSource;
use medkg_domain::{DiagnosisEvent, DiseaseDiseaseAssoc, DrugDiseaseAssoc, DrugEvent, PatientId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during data-source queries.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data in a row (bad date format, etc.)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-backed implementation of [`DataSource`].
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each worker should open its own
/// `SqliteSource`.
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open (or create) a database at the given path and apply the schema.
    ///
    /// Use [`SqliteSource::open_in_memory`] for tests.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let source = Self { conn };
        source.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(source)
    }

    /// Parse an ISO date column value.
    fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|e| StoreError::InvalidData(format!("bad date '{value}': {e}")))
    }

    fn label_from(
        &self,
        sql: &str,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let label = self
            .conn
            .query_row(sql, params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(label)
    }
}

impl DataSource for SqliteSource {
    type Error = StoreError;

    fn drug_events(&self, patient: PatientId) -> Result<Vec<DrugEvent>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT rx_cui, prescription_date FROM patient_drugs
             WHERE patient_id = ?1 ORDER BY prescription_date",
        )?;

        let rows = stmt.query_map(params![patient.value()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (code, date) = row?;
            events.push(DrugEvent::new(code, Self::parse_date(&date)?));
        }
        Ok(events)
    }

    fn diagnosis_events(&self, patient: PatientId) -> Result<Vec<DiagnosisEvent>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT icd_code, diagnosis_date FROM patient_diagnoses
             WHERE patient_id = ?1 ORDER BY diagnosis_date",
        )?;

        let rows = stmt.query_map(params![patient.value()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (code, date) = row?;
            events.push(DiagnosisEvent::new(code, Self::parse_date(&date)?));
        }
        Ok(events)
    }

    fn drug_disease_associations(&self) -> Result<Vec<DrugDiseaseAssoc>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT rx_cui, icd_code FROM drug_disease_associations")?;

        let assocs = stmt
            .query_map([], |row| {
                Ok(DrugDiseaseAssoc::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(assocs)
    }

    fn disease_disease_associations(&self) -> Result<Vec<DiseaseDiseaseAssoc>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT disease1, disease2 FROM disease_disease_associations")?;

        let assocs = stmt
            .query_map([], |row| {
                Ok(DiseaseDiseaseAssoc::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(assocs)
    }

    fn phenotype_diagnoses(&self, phenotype_code: &str) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT icd_code FROM phenotype_mappings WHERE phenotype_code = ?1",
        )?;

        let codes = stmt
            .query_map(params![phenotype_code], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(codes)
    }

    fn patients_with_diagnosis(
        &self,
        diagnosis_code: &str,
    ) -> Result<Vec<PatientId>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT patient_id FROM patient_diagnoses
             WHERE icd_code = ?1 ORDER BY patient_id",
        )?;

        let patients = stmt
            .query_map(params![diagnosis_code], |row| {
                Ok(PatientId::new(row.get::<_, i64>(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(patients)
    }

    fn node_label(&self, code: &str) -> Result<Option<String>, Self::Error> {
        // Drug name, then diagnosis name, then external disease name.
        if let Some(label) =
            self.label_from("SELECT drug_name FROM drug_labels WHERE rx_cui = ?1", code)?
        {
            return Ok(Some(label));
        }

        if let Some(label) = self.label_from(
            "SELECT diagnosis_name FROM diagnosis_labels WHERE icd_code = ?1",
            code,
        )? {
            return Ok(Some(label));
        }

        let external = self.label_from(
            "SELECT dl.disease_name FROM disease_mappings dm
             JOIN disease_labels dl ON dl.disease_id = dm.disease_id
             WHERE dm.icd_code = ?1",
            code,
        )?;
        if external.is_none() {
            tracing::debug!(code, "no label available, caller falls back to code");
        }
        Ok(external)
    }
}
