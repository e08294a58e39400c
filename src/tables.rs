//! Flat-table import and export.
//!
//! Reads roster and demand tables from CSV, checking that every required
//! column is present before any row is decoded, and writes assignments,
//! uncovered slots, generated demand and monthly summaries back out as CSV
//! with the same column names.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::demand::{self, DemandRecord, DemandStream, Headcount};
use crate::error::{EngineError, EngineResult};
use crate::models::{AssignmentEvent, UncoveredSlot};
use crate::roster::{self, StaffRecord, Unavailability};
use crate::summary::MonthlySummary;

const ROSTER_TABLE: &str = "roster";
const DEMAND_TABLE: &str = "demand";

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "ID", default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(rename = "Unidad_Asignada", default, deserialize_with = "empty_string_as_none")]
    unit: Option<String>,
    #[serde(rename = "Jornada", default, deserialize_with = "empty_string_as_none")]
    contract_mode: Option<String>,
    #[serde(rename = "Turno_Contrato", default, deserialize_with = "empty_string_as_none")]
    shift_type: Option<String>,
    #[serde(
        rename = "Fechas_No_Disponibilidad",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    unavailable: Option<String>,
}

impl From<RosterRow> for StaffRecord {
    fn from(row: RosterRow) -> Self {
        StaffRecord {
            id: row.id,
            unit: row.unit,
            contract_mode: row.contract_mode,
            shift_type: row.shift_type,
            unavailable: row.unavailable.map(Unavailability::Text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    #[serde(rename = "Fecha", default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(rename = "Unidad", default, deserialize_with = "empty_string_as_none")]
    unit: Option<String>,
    #[serde(rename = "Turno", default, deserialize_with = "empty_string_as_none")]
    shift_type: Option<String>,
    #[serde(
        rename = "Personal_Requerido",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    required: Option<String>,
}

impl From<DemandRow> for DemandRecord {
    fn from(row: DemandRow) -> Self {
        DemandRecord {
            date: row.date,
            unit: row.unit,
            shift_type: row.shift_type,
            required: row.required.map(|text| headcount(&text)),
        }
    }
}

#[derive(Debug, Serialize)]
struct AssignmentRow<'a> {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "Unidad")]
    unit: &'a str,
    #[serde(rename = "Turno")]
    shift_type: &'static str,
    #[serde(rename = "ID")]
    staff_id: &'a str,
    #[serde(rename = "Jornada")]
    contract_mode: &'static str,
    #[serde(rename = "Horas")]
    hours: Decimal,
}

#[derive(Debug, Serialize)]
struct UncoveredRow<'a> {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "Unidad")]
    unit: &'a str,
    #[serde(rename = "Turno")]
    shift_type: &'static str,
    #[serde(rename = "Faltan")]
    shortfall: u32,
}

#[derive(Debug, Serialize)]
struct DemandOutRow<'a> {
    #[serde(rename = "Fecha")]
    date: String,
    #[serde(rename = "Unidad")]
    unit: &'a str,
    #[serde(rename = "Turno")]
    shift_type: &'static str,
    #[serde(rename = "Personal_Requerido")]
    required: u32,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn headcount(text: &str) -> Headcount {
    let text = text.trim();
    if let Ok(count) = text.parse::<i64>() {
        Headcount::Count(count)
    } else if let Ok(number) = text.parse::<f64>() {
        Headcount::Number(number)
    } else {
        Headcount::Text(text.to_string())
    }
}

/// Reads roster rows from CSV.
///
/// # Errors
///
/// - `MissingColumn` if the header lacks one of the roster columns
/// - `MalformedTable` if the CSV cannot be decoded
pub fn read_roster<R: Read>(reader: R) -> EngineResult<Vec<StaffRecord>> {
    read_rows::<R, RosterRow, StaffRecord>(reader, ROSTER_TABLE, &roster::REQUIRED_COLUMNS)
}

/// Reads roster rows from a CSV file.
pub fn read_roster_file<P: AsRef<Path>>(path: P) -> EngineResult<Vec<StaffRecord>> {
    read_roster(open(path.as_ref(), ROSTER_TABLE)?)
}

/// Reads demand rows from CSV.
///
/// # Errors
///
/// - `MissingColumn` if the header lacks one of the demand columns
/// - `MalformedTable` if the CSV cannot be decoded
pub fn read_demand<R: Read>(reader: R) -> EngineResult<Vec<DemandRecord>> {
    read_rows::<R, DemandRow, DemandRecord>(reader, DEMAND_TABLE, &demand::REQUIRED_COLUMNS)
}

/// Reads demand rows from a CSV file.
pub fn read_demand_file<P: AsRef<Path>>(path: P) -> EngineResult<Vec<DemandRecord>> {
    read_demand(open(path.as_ref(), DEMAND_TABLE)?)
}

fn open(path: &Path, table: &str) -> EngineResult<File> {
    File::open(path).map_err(|err| EngineError::MalformedTable {
        table: table.to_string(),
        message: format!("cannot open {}: {}", path.display(), err),
    })
}

fn read_rows<R, Row, Record>(reader: R, table: &str, columns: &[&str]) -> EngineResult<Vec<Record>>
where
    R: Read,
    Row: for<'de> Deserialize<'de>,
    Record: From<Row>,
{
    let malformed = |err: csv::Error| EngineError::MalformedTable {
        table: table.to_string(),
        message: err.to_string(),
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(malformed)?.clone();
    if let Some(column) = columns
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(EngineError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        });
    }

    csv_reader
        .deserialize::<Row>()
        .map(|row| row.map(Record::from).map_err(malformed))
        .collect()
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> EngineResult<()> {
    let failed = |err: csv::Error| EngineError::Persistence {
        message: format!("failed to write table: {}", err),
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).map_err(failed)?;
    }
    csv_writer.flush().map_err(|err| EngineError::Persistence {
        message: format!("failed to write table: {}", err),
    })
}

/// Writes assignment events as `Fecha, Unidad, Turno, ID, Jornada, Horas`.
pub fn write_assignments<W: Write>(writer: W, events: &[AssignmentEvent]) -> EngineResult<()> {
    write_rows(
        writer,
        events.iter().map(|event| AssignmentRow {
            date: event.date.format("%Y-%m-%d").to_string(),
            unit: &event.unit,
            shift_type: event.shift_type.label(),
            staff_id: &event.staff_id,
            contract_mode: event.contract_mode.label(),
            hours: event.hours,
        }),
    )
}

/// Writes uncovered slots as `Fecha, Unidad, Turno, Faltan`.
pub fn write_uncovered<W: Write>(writer: W, uncovered: &[UncoveredSlot]) -> EngineResult<()> {
    write_rows(
        writer,
        uncovered.iter().map(|slot| UncoveredRow {
            date: slot.date.format("%Y-%m-%d").to_string(),
            unit: &slot.unit,
            shift_type: slot.shift_type.label(),
            shortfall: slot.shortfall,
        }),
    )
}

/// Writes demand slots as `Fecha, Unidad, Turno, Personal_Requerido`.
pub fn write_demand<W: Write>(writer: W, demand: &DemandStream) -> EngineResult<()> {
    write_rows(
        writer,
        demand.slots().iter().map(|slot| DemandOutRow {
            date: slot.date.format("%Y-%m-%d").to_string(),
            unit: &slot.unit,
            shift_type: slot.shift_type.label(),
            required: slot.required,
        }),
    )
}

/// Writes summary rows with the summary table's column names.
pub fn write_summary<W: Write>(writer: W, summary: &MonthlySummary) -> EngineResult<()> {
    write_rows(writer, summary.rows())
}
