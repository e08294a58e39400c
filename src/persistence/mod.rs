//! Assignment sink.
//!
//! Durable storage for committed assignment events and the monthly summary
//! derived from them. A run is written only after allocation has finished,
//! so a failed allocation never leaves partial rows behind; a failed write
//! surfaces as a `Persistence` error while the caller keeps the in-memory
//! result.

mod sqlite;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::allocation::AllocationResult;
use crate::error::EngineResult;
use crate::models::AssignmentEvent;
use crate::summary::MonthlySummary;

pub use sqlite::SqliteSink;

/// Write-side store for assignment events and monthly summaries.
pub trait AssignmentSink {
    /// Appends events, ignoring any whose (date, unit, shift, staff) key is
    /// already stored. Returns the events actually inserted.
    fn append_events(&mut self, events: &[AssignmentEvent]) -> EngineResult<Vec<AssignmentEvent>>;

    /// Every stored event.
    fn load_events(&self) -> EngineResult<Vec<AssignmentEvent>>;

    /// The stored monthly summary.
    fn load_summary(&self) -> EngineResult<MonthlySummary>;

    /// Replaces the stored monthly summary.
    fn replace_summary(&mut self, summary: &MonthlySummary) -> EngineResult<()>;

    /// Number of stored events.
    fn event_count(&self) -> EngineResult<u64> {
        Ok(self.load_events()?.len() as u64)
    }
}

/// How the stored summary is refreshed after a run is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStrategy {
    /// Recompute from the full stored event log.
    #[default]
    Rebuild,
    /// Add the newly inserted events to the stored summary.
    Incremental,
}

impl fmt::Display for SummaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryStrategy::Rebuild => f.write_str("rebuild"),
            SummaryStrategy::Incremental => f.write_str("incremental"),
        }
    }
}

impl FromStr for SummaryStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "rebuild" => Ok(SummaryStrategy::Rebuild),
            "incremental" => Ok(SummaryStrategy::Incremental),
            other => Err(format!("unknown summary strategy '{}'", other)),
        }
    }
}

/// Writes a finished run and refreshes the stored summary.
///
/// Events that were already stored are skipped, so persisting the same run
/// twice leaves both tables unchanged. Returns the summary now stored.
///
/// # Example
///
/// ```
/// use shift_allocator::allocation::{Allocator, RosterOrder};
/// use shift_allocator::config::ContractPolicy;
/// use shift_allocator::demand::DemandStream;
/// use shift_allocator::persistence::{persist_run, SqliteSink, SummaryStrategy};
/// use shift_allocator::roster::Roster;
///
/// let policy = ContractPolicy::default();
/// let roster = Roster::from_members(Vec::new()).unwrap();
/// let result = Allocator::new(&roster, &policy, RosterOrder).run(&DemandStream::default());
///
/// let mut sink = SqliteSink::in_memory().unwrap();
/// let summary = persist_run(&mut sink, &result, SummaryStrategy::Rebuild).unwrap();
/// assert!(summary.is_empty());
/// ```
pub fn persist_run<S: AssignmentSink + ?Sized>(
    sink: &mut S,
    result: &AllocationResult,
    strategy: SummaryStrategy,
) -> EngineResult<MonthlySummary> {
    let inserted = sink.append_events(&result.assignments)?;

    let summary = match strategy {
        SummaryStrategy::Rebuild => MonthlySummary::rebuild(&sink.load_events()?),
        SummaryStrategy::Incremental => {
            let summary = MonthlySummary::incremental(&sink.load_summary()?, &inserted);
            let stored = sink.event_count()?;
            // A run whose events landed but whose summary write failed leaves
            // the stored summary behind the event log.
            if u64::from(summary.grand_total().shifts) == stored {
                summary
            } else {
                warn!(
                    run_id = %result.run_id,
                    summary_shifts = summary.grand_total().shifts,
                    stored_events = stored,
                    "Stored summary out of step with events, rebuilding"
                );
                MonthlySummary::rebuild(&sink.load_events()?)
            }
        }
    };
    sink.replace_summary(&summary)?;

    info!(
        run_id = %result.run_id,
        events = result.assignments.len(),
        inserted = inserted.len(),
        skipped = result.assignments.len() - inserted.len(),
        strategy = %strategy,
        summary_rows = summary.len(),
        "Allocation run persisted"
    );
    Ok(summary)
}
