use std::collections::BTreeSet;
use std::time::Duration;
use rand::Rng;
use serde::Serialize;
use crate::error::{Error, Result};
use super::availability::{build_availability_table, prune_unavailable_slots};
use super::fill::fill_students;
use super::search::{search_leader_assignments, SearchSettings};
use super::slot_utils::SlotCatalog;
use super::types::{AvailabilityTable, PersonId, Roster, Schedule};
use super::validate::check_schedule;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub restarts: u64,
    pub best_uncovered: usize,
    pub tied_candidates: usize,
    pub elapsed: Duration,
}

/// Everything a run produces: the validated schedule plus everyone who
/// could not be placed, grouped by why.
#[derive(Debug, Clone, Default)]
pub struct SchedulingOutcome {
    pub schedule: Schedule,
    pub table: AvailabilityTable, // after pruning
    pub unavailable_leaders: BTreeSet<PersonId>,
    pub unavailable_students: BTreeSet<PersonId>,
    pub unplaced_students: BTreeSet<PersonId>,
    pub idle_leaders: BTreeSet<PersonId>,
    pub search: SearchStats,
}

/// Runs the whole scheduling pass: availability table, pruning, leader
/// search, student fill and the final validity gate.
pub fn run_scheduler<R: Rng + ?Sized>(
    roster: &Roster,
    leader_ids: &BTreeSet<PersonId>,
    student_ids: &BTreeSet<PersonId>,
    catalog: &SlotCatalog,
    settings: &SearchSettings,
    rng: &mut R,
) -> Result<SchedulingOutcome> {
    log::info!(
        "Scheduling {} leader(s) and {} student(s) over {} slot(s)",
        leader_ids.len(),
        student_ids.len(),
        catalog.len()
    );

    let table = build_availability_table(roster, leader_ids, student_ids, catalog)?;
    let pruned = prune_unavailable_slots(&table, leader_ids, student_ids);
    for id in &pruned.unavailable_leaders {
        log::warn!("Leader '{}' shares no slot with any student", id);
    }
    for id in &pruned.unavailable_students {
        log::warn!("Student '{}' shares no slot with any leader", id);
    }

    let search = search_leader_assignments(&pruned.table, &pruned.leader_ids, &pruned.student_ids, settings, rng);
    let fill = fill_students(&pruned.table, &pruned.student_ids, &search.candidates);

    if let Err(violation) = check_schedule(&fill.schedule, &pruned.table) {
        log::error!("Generated schedule is invalid: {}", violation);
        return Err(Error::InvalidSchedule(violation));
    }

    // Leaders whose group stayed empty, plus those the chosen assignment never placed
    let mut idle_leaders = fill.idle_leaders;
    if let Some(chosen) = search.candidates.get(fill.chosen_candidate) {
        let assigned: BTreeSet<&PersonId> = chosen.values().collect();
        idle_leaders.extend(pruned.leader_ids.iter().filter(|id| !assigned.contains(id)).cloned());
    }

    Ok(SchedulingOutcome {
        schedule: fill.schedule,
        table: pruned.table,
        unavailable_leaders: pruned.unavailable_leaders,
        unavailable_students: pruned.unavailable_students,
        unplaced_students: fill.unplaced_students,
        idle_leaders,
        search: SearchStats {
            restarts: search.restarts,
            best_uncovered: search.best_score,
            tied_candidates: search.candidates.len(),
            elapsed: search.elapsed,
        },
    })
}
