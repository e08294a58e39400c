//! Roster model.
//!
//! Turns raw staff rows into validated [`StaffMember`]s. Unavailability is
//! normalised to a set of dates, contract labels are checked against the
//! accepted values and each member's annual ceilings are computed once from
//! the [`ContractPolicy`].

mod record;

use std::collections::HashMap;

use tracing::debug;

use crate::config::ContractPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{ContractMode, ShiftType, StaffMember};

pub use record::{
    COLUMN_CONTRACT_MODE, COLUMN_ID, COLUMN_SHIFT_TYPE, COLUMN_UNAVAILABLE, COLUMN_UNIT,
    REQUIRED_COLUMNS, StaffRecord, Unavailability, parse_unavailability,
};

const TABLE: &str = "roster";

/// The validated staff roster for one planning run.
///
/// Members keep the order of the source rows.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<StaffMember>,
    index: HashMap<String, usize>,
}

impl Roster {
    /// Validates raw rows and builds the roster.
    ///
    /// # Errors
    ///
    /// - `MissingField` when a row lacks an ID, unit, contract mode or shift type
    /// - `InvalidField` for an unknown contract mode or shift type, or a
    ///   malformed unavailable date
    /// - `DuplicateStaff` when an ID appears twice
    ///
    /// # Example
    ///
    /// ```
    /// use shift_allocator::config::ContractPolicy;
    /// use shift_allocator::roster::{Roster, StaffRecord, Unavailability};
    /// use rust_decimal::Decimal;
    ///
    /// let record = StaffRecord {
    ///     id: Some("N001".to_string()),
    ///     unit: Some("UCI".to_string()),
    ///     contract_mode: Some("Parcial".to_string()),
    ///     shift_type: Some("Noche".to_string()),
    ///     unavailable: Some(Unavailability::Text("2025-01-01".to_string())),
    /// };
    ///
    /// let roster = Roster::from_records(vec![record], &ContractPolicy::default()).unwrap();
    /// let member = roster.get("N001").unwrap();
    /// assert_eq!(member.ceilings.hours, Decimal::from(1176));
    /// ```
    pub fn from_records(
        records: Vec<StaffRecord>,
        policy: &ContractPolicy,
    ) -> EngineResult<Self> {
        let members = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| validate_record(row, record, policy))
            .collect::<EngineResult<Vec<_>>>()?;

        let roster = Self::from_members(members)?;
        debug!(members = roster.len(), "Roster validated");
        Ok(roster)
    }

    /// Builds a roster from already validated members.
    ///
    /// Returns `DuplicateStaff` if two members share an ID.
    pub fn from_members(members: Vec<StaffMember>) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(members.len());
        for (position, member) in members.iter().enumerate() {
            if index.insert(member.id.clone(), position).is_some() {
                return Err(EngineError::DuplicateStaff {
                    id: member.id.clone(),
                });
            }
        }
        Ok(Self { members, index })
    }

    /// All members in source order.
    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    /// Looks up a member by ID.
    pub fn get(&self, id: &str) -> Option<&StaffMember> {
        self.index.get(id).map(|&position| &self.members[position])
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the roster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn validate_record(
    row: usize,
    record: StaffRecord,
    policy: &ContractPolicy,
) -> EngineResult<StaffMember> {
    let id = required(row, COLUMN_ID, record.id)?;
    let unit = required(row, COLUMN_UNIT, record.unit)?;

    let mode_label = required(row, COLUMN_CONTRACT_MODE, record.contract_mode)?;
    let contract_mode: ContractMode = mode_label
        .parse()
        .map_err(|message| invalid(row, COLUMN_CONTRACT_MODE, &mode_label, message))?;

    let shift_label = required(row, COLUMN_SHIFT_TYPE, record.shift_type)?;
    let shift_type: ShiftType = shift_label
        .parse()
        .map_err(|message| invalid(row, COLUMN_SHIFT_TYPE, &shift_label, message))?;

    let unavailable = match record.unavailable {
        Some(raw) => raw.to_dates().map_err(|token| {
            invalid(
                row,
                COLUMN_UNAVAILABLE,
                &token,
                "expected dates formatted YYYY-MM-DD".to_string(),
            )
        })?,
        None => Default::default(),
    };

    Ok(StaffMember {
        id,
        unit,
        shift_type,
        contract_mode,
        unavailable,
        ceilings: policy.ceilings(shift_type, contract_mode),
    })
}

fn required(row: usize, field: &str, value: Option<String>) -> EngineResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::MissingField {
            table: TABLE.to_string(),
            row,
            field: field.to_string(),
        })
}

fn invalid(row: usize, field: &str, value: &str, message: String) -> EngineError {
    EngineError::InvalidField {
        table: TABLE.to_string(),
        row,
        field: field.to_string(),
        value: value.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(id: &str, mode: &str, shift: &str) -> StaffRecord {
        StaffRecord {
            id: Some(id.to_string()),
            unit: Some("Medicina Interna".to_string()),
            contract_mode: Some(mode.to_string()),
            shift_type: Some(shift.to_string()),
            unavailable: None,
        }
    }

    #[test]
    fn test_valid_records_build_roster_in_order() {
        let roster = Roster::from_records(
            vec![
                record("N002", "Completa", "Mañana"),
                record("N001", "Parcial", "Tarde"),
            ],
            &ContractPolicy::default(),
        )
        .unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.members()[0].id, "N002");
        assert_eq!(roster.members()[1].shift_type, ShiftType::Afternoon);
        assert_eq!(roster.get("N001").unwrap().contract_mode, ContractMode::Partial);
        assert!(roster.get("N999").is_none());
    }

    #[test]
    fn test_ceilings_full_and_partial() {
        let roster = Roster::from_records(
            vec![
                record("F", "Completa", "Mañana"),
                record("P", "Parcial", "Mañana"),
                record("NF", "Completa", "Noche"),
                record("NP", "Parcial", "Noche"),
            ],
            &ContractPolicy::default(),
        )
        .unwrap();

        let full = roster.get("F").unwrap().ceilings;
        assert_eq!(full.hours, Decimal::new(16425, 1));
        assert_eq!(full.shifts, Decimal::from(219));

        let partial = roster.get("P").unwrap().ceilings;
        assert_eq!(partial.hours, Decimal::from(1314));
        assert_eq!(partial.shifts, Decimal::new(1752, 1));

        let night_partial = roster.get("NP").unwrap().ceilings;
        assert_eq!(night_partial.hours, Decimal::from(1176));
        assert_eq!(night_partial.shifts, Decimal::new(1176, 1));

        assert_eq!(roster.get("NF").unwrap().ceilings.shifts, Decimal::from(147));
    }

    #[test]
    fn test_unknown_shift_type_is_rejected_with_field_name() {
        let result = Roster::from_records(
            vec![record("N001", "Completa", "Guardia")],
            &ContractPolicy::default(),
        );

        match result {
            Err(EngineError::InvalidField { field, value, row, .. }) => {
                assert_eq!(field, COLUMN_SHIFT_TYPE);
                assert_eq!(value, "Guardia");
                assert_eq!(row, 0);
            }
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_contract_mode_is_rejected() {
        let result = Roster::from_records(
            vec![record("N001", "Temporal", "Mañana")],
            &ContractPolicy::default(),
        );
        let error = result.unwrap_err();
        assert_eq!(error.field(), Some(COLUMN_CONTRACT_MODE));
    }

    #[test]
    fn test_missing_value_names_column() {
        let mut row = record("N001", "Completa", "Mañana");
        row.unit = Some("   ".to_string());

        let result = Roster::from_records(vec![row], &ContractPolicy::default());
        match result {
            Err(EngineError::MissingField { field, .. }) => assert_eq!(field, COLUMN_UNIT),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_unavailable_date_is_rejected() {
        let mut row = record("N001", "Completa", "Mañana");
        row.unavailable = Some(Unavailability::Text("2025-01-01, 01/02/2025".to_string()));

        let error = Roster::from_records(vec![row], &ContractPolicy::default()).unwrap_err();
        assert_eq!(error.field(), Some(COLUMN_UNAVAILABLE));
    }

    #[test]
    fn test_overlong_unavailable_date_is_not_truncated() {
        let mut row = record("N001", "Completa", "Mañana");
        row.unavailable = Some(Unavailability::Text("2025-01-011".to_string()));

        match Roster::from_records(vec![row], &ContractPolicy::default()) {
            Err(EngineError::InvalidField { field, value, .. }) => {
                assert_eq!(field, COLUMN_UNAVAILABLE);
                assert_eq!(value, "2025-01-011");
            }
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_dates_are_normalised() {
        let mut row = record("N001", "Completa", "Mañana");
        row.unavailable = Some(Unavailability::Text("['2025-01-05', '2025-01-04']".to_string()));

        let roster = Roster::from_records(vec![row], &ContractPolicy::default()).unwrap();
        let member = roster.get("N001").unwrap();
        assert!(member.is_unavailable_on(NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()));
        assert!(member.is_unavailable_on(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()));
        assert_eq!(member.unavailable.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = Roster::from_records(
            vec![
                record("N001", "Completa", "Mañana"),
                record("N001", "Parcial", "Noche"),
            ],
            &ContractPolicy::default(),
        );
        assert!(matches!(result, Err(EngineError::DuplicateStaff { id }) if id == "N001"));
    }

    #[test]
    fn test_identifiers_are_trimmed() {
        let mut row = record(" N001 ", "Completa", "Mañana");
        row.unit = Some(" UCI ".to_string());
        let roster = Roster::from_records(vec![row], &ContractPolicy::default()).unwrap();
        let member = roster.get("N001").unwrap();
        assert_eq!(member.unit, "UCI");
    }
}
