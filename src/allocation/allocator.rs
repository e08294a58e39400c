//! Greedy allocator.
//!
//! Walks the demand stream one slot at a time. For every slot the eligible
//! candidates are computed against the current ledger, arranged by the
//! tie-breaker, ranked by cumulative hours and assigned in that order until
//! the headcount is met. Assignments are never revisited.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::config::ContractPolicy;
use crate::demand::DemandStream;
use crate::models::{AssignmentEvent, CoverageStats, ShiftSlot, ShiftType, UncoveredSlot};
use crate::roster::Roster;

use super::{Rejection, SeededShuffle, TieBreaker, WorkLedger, WorkState, evaluate};

/// Candidate accounting for one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAudit {
    /// Date of the slot.
    pub date: NaiveDate,
    /// Unit of the slot.
    pub unit: String,
    /// Shift type of the slot.
    pub shift_type: ShiftType,
    /// Required headcount.
    pub required: u32,
    /// Roster members working this unit and shift type.
    pub in_scope: u32,
    /// In-scope members that passed every check.
    pub eligible: u32,
    /// Members assigned.
    pub assigned: u32,
    /// How many in-scope members each check excluded.
    pub rejections: BTreeMap<Rejection, u32>,
}

impl SlotAudit {
    fn new(slot: &ShiftSlot, in_scope: usize) -> Self {
        Self {
            date: slot.date,
            unit: slot.unit.clone(),
            shift_type: slot.shift_type,
            required: slot.required,
            in_scope: count(in_scope),
            eligible: 0,
            assigned: 0,
            rejections: BTreeMap::new(),
        }
    }

    /// Required minus assigned.
    pub fn shortfall(&self) -> u32 {
        self.required.saturating_sub(self.assigned)
    }
}

/// Per-slot audit of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationAudit {
    /// One entry per slot, in allocation order.
    pub slots: Vec<SlotAudit>,
    /// Wall-clock duration of the allocation phase.
    pub duration_us: u64,
}

impl AllocationAudit {
    /// Rejection counts summed over every slot.
    pub fn rejection_totals(&self) -> BTreeMap<Rejection, u32> {
        let mut totals = BTreeMap::new();
        for slot in &self.slots {
            for (rejection, n) in &slot.rejections {
                *totals.entry(*rejection).or_insert(0) += n;
            }
        }
        totals
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// Seed of the tie-breaker, when it has one.
    pub seed: Option<u64>,
    /// Committed assignments in allocation order.
    pub assignments: Vec<AssignmentEvent>,
    /// Slots left short, in allocation order.
    pub uncovered: Vec<UncoveredSlot>,
    /// Headcount accounting.
    pub coverage: CoverageStats,
    /// Final work state of every member that was assigned or seeded.
    pub ledger: WorkLedger,
    /// Per-slot candidate accounting.
    pub audit: AllocationAudit,
}

impl AllocationResult {
    /// Returns true if no slot was left short.
    pub fn is_fully_covered(&self) -> bool {
        self.uncovered.is_empty()
    }

    /// Assignments of one staff member.
    pub fn assignments_for<'a>(
        &'a self,
        staff_id: &'a str,
    ) -> impl Iterator<Item = &'a AssignmentEvent> + 'a {
        self.assignments
            .iter()
            .filter(move |event| event.staff_id == staff_id)
    }
}

/// Drives a demand stream through the eligibility filter.
///
/// # Example
///
/// ```
/// use shift_allocator::allocation::{Allocator, RosterOrder};
/// use shift_allocator::config::ContractPolicy;
/// use shift_allocator::demand::{DemandStream, WeeklyPattern};
/// use shift_allocator::roster::{Roster, StaffRecord};
/// use chrono::NaiveDate;
///
/// let policy = ContractPolicy::default();
/// let record = StaffRecord {
///     id: Some("N001".to_string()),
///     unit: Some("UCI".to_string()),
///     contract_mode: Some("Completa".to_string()),
///     shift_type: Some("Mañana".to_string()),
///     unavailable: None,
/// };
/// let roster = Roster::from_records(vec![record], &policy).unwrap();
/// let demand = DemandStream::generate_range(
///     "UCI",
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
///     &WeeklyPattern::uniform(1),
/// )
/// .unwrap();
///
/// let result = Allocator::new(&roster, &policy, RosterOrder).run(&demand);
/// assert_eq!(result.assignments.len(), 3);
/// assert_eq!(result.uncovered.len(), 6);
/// assert!(result.coverage.is_balanced());
/// ```
pub struct Allocator<'a, T> {
    roster: &'a Roster,
    policy: &'a ContractPolicy,
    tie_breaker: T,
    ledger: WorkLedger,
}

impl<'a, T: TieBreaker> Allocator<'a, T> {
    /// An allocator starting from an empty ledger.
    pub fn new(roster: &'a Roster, policy: &'a ContractPolicy, tie_breaker: T) -> Self {
        Self {
            roster,
            policy,
            tie_breaker,
            ledger: WorkLedger::new(),
        }
    }

    /// Starts from a ledger seeded with prior work, so ceilings and streaks
    /// account for it.
    pub fn with_ledger(mut self, ledger: WorkLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Runs the allocation to completion.
    pub fn run(mut self, demand: &DemandStream) -> AllocationResult {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let roster = self.roster;
        let policy = self.policy;
        let members = roster.members();
        let pools = scope_pools(roster);
        let idle = WorkState::default();

        let mut assignments = Vec::new();
        let mut uncovered = Vec::new();
        let mut coverage = CoverageStats::default();
        let mut slot_audits = Vec::with_capacity(demand.len());

        for slot in demand.slots() {
            let pool: &[usize] = pools
                .get(&(slot.unit.as_str(), slot.shift_type))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let mut audit = SlotAudit::new(slot, pool.len());

            let mut candidates = Vec::with_capacity(pool.len());
            for &position in pool {
                let member = &members[position];
                let state = self.ledger.get(&member.id).unwrap_or(&idle);
                match evaluate(slot, member, state, policy) {
                    Ok(()) => candidates.push(position),
                    Err(rejection) => {
                        trace!(
                            staff_id = %member.id,
                            date = %slot.date,
                            reason = rejection.describe(),
                            "Candidate rejected"
                        );
                        *audit.rejections.entry(rejection).or_insert(0) += 1;
                    }
                }
            }
            audit.eligible = count(candidates.len());

            self.tie_breaker.arrange(&mut candidates);
            candidates.sort_by_key(|&position| self.ledger.hours(&members[position].id));

            let hours = policy.shift_hours(slot.shift_type);
            for &position in candidates.iter().take(slot.required as usize) {
                let member = &members[position];
                self.ledger.record(&member.id, slot.date, hours);
                assignments.push(AssignmentEvent {
                    date: slot.date,
                    unit: slot.unit.clone(),
                    shift_type: slot.shift_type,
                    staff_id: member.id.clone(),
                    contract_mode: member.contract_mode,
                    hours,
                });
                audit.assigned += 1;
            }

            coverage.required += u64::from(slot.required);
            coverage.assigned += u64::from(audit.assigned);

            let shortfall = audit.shortfall();
            if shortfall > 0 {
                coverage.shortfall += u64::from(shortfall);
                uncovered.push(UncoveredSlot {
                    date: slot.date,
                    unit: slot.unit.clone(),
                    shift_type: slot.shift_type,
                    shortfall,
                });
            }

            debug!(
                date = %slot.date,
                unit = %slot.unit,
                shift = %slot.shift_type,
                required = slot.required,
                eligible = audit.eligible,
                assigned = audit.assigned,
                shortfall,
                "Slot allocated"
            );
            slot_audits.push(audit);
        }

        let duration_us = start_time.elapsed().as_micros() as u64;
        info!(
            run_id = %run_id,
            slots = demand.len(),
            staff = members.len(),
            required = coverage.required,
            assigned = coverage.assigned,
            shortfall = coverage.shortfall,
            duration_us,
            "Allocation run completed"
        );

        AllocationResult {
            run_id,
            seed: self.tie_breaker.seed(),
            assignments,
            uncovered,
            coverage,
            ledger: self.ledger,
            audit: AllocationAudit {
                slots: slot_audits,
                duration_us,
            },
        }
    }
}

/// Runs an allocation with the production tie-breaker.
///
/// A given seed makes the run reproducible; without one a seed is drawn and
/// reported on the result.
pub fn allocate(
    roster: &Roster,
    demand: &DemandStream,
    policy: &ContractPolicy,
    seed: Option<u64>,
) -> AllocationResult {
    let tie_breaker = seed.map_or_else(SeededShuffle::from_entropy, SeededShuffle::new);
    Allocator::new(roster, policy, tie_breaker).run(demand)
}

/// Roster positions grouped by (unit, shift type), each group in roster order.
fn scope_pools(roster: &Roster) -> HashMap<(&str, ShiftType), Vec<usize>> {
    let mut pools: HashMap<(&str, ShiftType), Vec<usize>> = HashMap::new();
    for (position, member) in roster.members().iter().enumerate() {
        pools
            .entry((member.unit.as_str(), member.shift_type))
            .or_default()
            .push(position);
    }
    pools
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
