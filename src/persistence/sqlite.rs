//! SQLite assignment sink.
//!
//! Only this file talks to the database. Hours are stored as decimal text so
//! they round-trip exactly; shift and contract values use the table labels.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AssignmentEvent, ContractMode, ShiftType};
use crate::summary::{MonthlySummary, SummaryKey, SummaryTotals};

use super::AssignmentSink;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS asignaciones (
    Fecha   TEXT NOT NULL,
    Unidad  TEXT NOT NULL,
    Turno   TEXT NOT NULL,
    ID      TEXT NOT NULL,
    Jornada TEXT NOT NULL,
    Horas   TEXT NOT NULL,
    PRIMARY KEY (Fecha, Unidad, Turno, ID)
);

CREATE TABLE IF NOT EXISTS resumen_mensual (
    ID                 TEXT    NOT NULL,
    Unidad             TEXT    NOT NULL,
    Turno              TEXT    NOT NULL,
    Jornada            TEXT    NOT NULL,
    "Año"              INTEGER NOT NULL,
    Mes                INTEGER NOT NULL,
    Horas_Asignadas    TEXT    NOT NULL,
    Jornadas_Asignadas INTEGER NOT NULL,
    PRIMARY KEY (ID, Unidad, Turno, Jornada, "Año", Mes)
);
"#;

const DROP: &str = r#"
DROP TABLE IF EXISTS asignaciones;
DROP TABLE IF EXISTS resumen_mensual;
"#;

/// Assignment sink backed by a SQLite database.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database at `path` and ensures the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::with_connection(conn)
    }

    /// An in-memory database.
    pub fn in_memory() -> EngineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> EngineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Drops every stored assignment and summary row.
    pub fn reset(&mut self) -> EngineResult<()> {
        self.conn.execute_batch(DROP)?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Number of stored assignment events.
    pub fn event_count(&self) -> EngineResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM asignaciones", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl AssignmentSink for SqliteSink {
    fn append_events(&mut self, events: &[AssignmentEvent]) -> EngineResult<Vec<AssignmentEvent>> {
        let tx = self.conn.transaction()?;
        let mut inserted = Vec::with_capacity(events.len());
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO asignaciones (Fecha, Unidad, Turno, ID, Jornada, Horas)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for event in events {
                let changed = stmt.execute(params![
                    event.date.format("%Y-%m-%d").to_string(),
                    event.unit,
                    event.shift_type.label(),
                    event.staff_id,
                    event.contract_mode.label(),
                    event.hours.to_string(),
                ])?;
                if changed > 0 {
                    inserted.push(event.clone());
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn load_events(&self) -> EngineResult<Vec<AssignmentEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT Fecha, Unidad, Turno, ID, Jornada, Horas
             FROM asignaciones ORDER BY Fecha, Unidad, Turno, ID",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(date, unit, shift, staff_id, mode, hours)| {
                Ok(AssignmentEvent {
                    date: parse_date(&date)?,
                    unit,
                    shift_type: parse_shift(&shift)?,
                    staff_id,
                    contract_mode: parse_mode(&mode)?,
                    hours: parse_decimal(&hours)?,
                })
            })
            .collect()
    }

    fn load_summary(&self) -> EngineResult<MonthlySummary> {
        let mut stmt = self.conn.prepare(
            r#"SELECT ID, Unidad, Turno, Jornada, "Año", Mes, Horas_Asignadas, Jornadas_Asignadas
               FROM resumen_mensual"#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i32>(4)?,
                    row.get::<_, u32>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, u32>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(staff_id, unit, shift, mode, year, month, hours, shifts)| {
                Ok((
                    SummaryKey {
                        staff_id,
                        unit,
                        shift_type: parse_shift(&shift)?,
                        contract_mode: parse_mode(&mode)?,
                        year,
                        month,
                    },
                    SummaryTotals {
                        hours: parse_decimal(&hours)?,
                        shifts,
                    },
                ))
            })
            .collect()
    }

    fn replace_summary(&mut self, summary: &MonthlySummary) -> EngineResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM resumen_mensual", [])?;
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO resumen_mensual
                   (ID, Unidad, Turno, Jornada, "Año", Mes, Horas_Asignadas, Jornadas_Asignadas)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            )?;
            for (key, totals) in summary.iter() {
                stmt.execute(params![
                    key.staff_id,
                    key.unit,
                    key.shift_type.label(),
                    key.contract_mode.label(),
                    key.year,
                    key.month,
                    totals.hours.to_string(),
                    totals.shifts,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn event_count(&self) -> EngineResult<u64> {
        SqliteSink::event_count(self)
    }
}

fn corrupt(column: &str, value: &str) -> EngineError {
    EngineError::Persistence {
        message: format!("stored value '{}' in column {} is unreadable", value, column),
    }
}

fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| corrupt("Fecha", value))
}

fn parse_shift(value: &str) -> EngineResult<ShiftType> {
    value.parse().map_err(|_: String| corrupt("Turno", value))
}

fn parse_mode(value: &str) -> EngineResult<ContractMode> {
    value.parse().map_err(|_: String| corrupt("Jornada", value))
}

fn parse_decimal(value: &str) -> EngineResult<Decimal> {
    value.parse().map_err(|_| corrupt("Horas", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(day: &str, staff: &str) -> AssignmentEvent {
        AssignmentEvent {
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            unit: "Oncología".to_string(),
            shift_type: ShiftType::Morning,
            staff_id: staff.to_string(),
            contract_mode: ContractMode::Partial,
            hours: Decimal::new(75, 1),
        }
    }

    #[test]
    fn test_events_round_trip_through_database() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let events = vec![event("2025-01-02", "N002"), event("2025-01-01", "N001")];

        let inserted = sink.append_events(&events).unwrap();
        assert_eq!(inserted.len(), 2);

        let loaded = sink.load_events().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], events[1]);
        assert_eq!(loaded[1].hours, Decimal::new(75, 1));
    }

    #[test]
    fn test_duplicate_keys_are_ignored_without_error() {
        let mut sink = SqliteSink::in_memory().unwrap();
        sink.append_events(&[event("2025-01-01", "N001")]).unwrap();

        let inserted = sink
            .append_events(&[event("2025-01-01", "N001"), event("2025-01-02", "N001")])
            .unwrap();
        assert_eq!(inserted, vec![event("2025-01-02", "N001")]);
        assert_eq!(sink.event_count().unwrap(), 2);
    }

    #[test]
    fn test_summary_is_replaced_not_appended() {
        let mut sink = SqliteSink::in_memory().unwrap();
        let summary = MonthlySummary::rebuild(&[event("2025-01-01", "N001")]);

        sink.replace_summary(&summary).unwrap();
        sink.replace_summary(&summary).unwrap();

        assert_eq!(sink.load_summary().unwrap(), summary);
    }

    #[test]
    fn test_reset_clears_tables() {
        let mut sink = SqliteSink::in_memory().unwrap();
        sink.append_events(&[event("2025-01-01", "N001")]).unwrap();
        sink.replace_summary(&MonthlySummary::rebuild(&[event("2025-01-01", "N001")]))
            .unwrap();

        sink.reset().unwrap();

        assert_eq!(sink.event_count().unwrap(), 0);
        assert!(sink.load_summary().unwrap().is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let path = std::env::temp_dir().join(format!("shift-allocator-{}.db", uuid::Uuid::new_v4()));
        {
            let mut sink = SqliteSink::open(&path).unwrap();
            sink.append_events(&[event("2025-01-01", "N001")]).unwrap();
        }
        let sink = SqliteSink::open(&path).unwrap();
        assert_eq!(sink.event_count().unwrap(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
