use std::collections::{BTreeMap, BTreeSet};
use super::types::{AvailabilityTable, LeaderAssignment, PersonId, Schedule, ScheduledGroup, TimeSlot};

/// Schedule produced from one leader assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFill {
    pub schedule: Schedule,
    pub conflicts: BTreeSet<PersonId>,    // students left without a group
    pub idle_leaders: BTreeSet<PersonId>, // leaders whose group stayed empty
}

#[derive(Debug, Clone, Default)]
pub struct FillOutcome {
    pub schedule: Schedule,
    pub unplaced_students: BTreeSet<PersonId>,
    pub idle_leaders: BTreeSet<PersonId>,
    pub chosen_candidate: usize,
    pub candidate_conflicts: Vec<usize>, // conflict count per candidate, in input order
}

/// Slots of this assignment the student can attend, in slot order
fn reachable_slots(assignment: &LeaderAssignment, table: &AvailabilityTable, student_id: &str) -> Vec<TimeSlot> {
    assignment
        .keys()
        .filter(|slot| table.student_available(slot, student_id))
        .copied()
        .collect()
}

/// Places students into the slots of a single leader assignment.
///
/// Students with the fewest options go first. A student with one option
/// always gets it; with several, the currently smallest group wins, the
/// earliest slot breaking ties. Groups that end up with no students are
/// removed and their leaders reported as idle.
pub fn fill_candidate(
    table: &AvailabilityTable,
    student_ids: &BTreeSet<PersonId>,
    assignment: &LeaderAssignment,
) -> CandidateFill {
    let mut groups: BTreeMap<TimeSlot, ScheduledGroup> = assignment
        .iter()
        .map(|(slot, leader)| (*slot, ScheduledGroup::led_by(leader)))
        .collect();

    let mut options: Vec<(&PersonId, Vec<TimeSlot>)> = student_ids
        .iter()
        .map(|student| (student, reachable_slots(assignment, table, student)))
        .collect();
    // Stable, so equal option counts keep ID order
    options.sort_by_key(|(_, slots)| slots.len());

    let mut conflicts = BTreeSet::new();
    for (student, slots) in options {
        let target = match slots.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => slots
                .iter()
                .min_by_key(|slot| groups.get(*slot).map(|g| g.student_ids.len()).unwrap_or(usize::MAX))
                .copied(),
        };
        match target.and_then(|slot| groups.get_mut(&slot)) {
            Some(group) => {
                group.student_ids.insert(student.clone());
            }
            None => {
                conflicts.insert(student.clone());
            }
        }
    }

    let mut idle_leaders = BTreeSet::new();
    groups.retain(|_, group| {
        if group.student_ids.is_empty() {
            idle_leaders.extend(group.leader_ids.iter().cloned());
            false
        } else {
            true
        }
    });

    CandidateFill {
        schedule: Schedule { groups },
        conflicts,
        idle_leaders,
    }
}

/// Fills every candidate and keeps the one leaving the fewest students
/// unplaced; the earliest candidate wins ties.
pub fn fill_students(
    table: &AvailabilityTable,
    student_ids: &BTreeSet<PersonId>,
    candidates: &[LeaderAssignment],
) -> FillOutcome {
    let empty = [LeaderAssignment::new()];
    let candidates = if candidates.is_empty() { &empty[..] } else { candidates };

    let mut best: Option<(usize, CandidateFill)> = None;
    let mut candidate_conflicts = Vec::with_capacity(candidates.len());

    for (index, assignment) in candidates.iter().enumerate() {
        let fill = fill_candidate(table, student_ids, assignment);
        candidate_conflicts.push(fill.conflicts.len());
        let better = match &best {
            Some((_, current)) => fill.conflicts.len() < current.conflicts.len(),
            None => true,
        };
        if better {
            best = Some((index, fill));
        }
    }

    let (chosen_candidate, fill) = best.unwrap_or_default();
    log::info!(
        "Filled {} candidate(s); best is #{} with {} group(s) and {} unplaced student(s)",
        candidates.len(),
        chosen_candidate,
        fill.schedule.groups.len(),
        fill.conflicts.len()
    );

    FillOutcome {
        schedule: fill.schedule,
        unplaced_students: fill.conflicts,
        idle_leaders: fill.idle_leaders,
        chosen_candidate,
        candidate_conflicts,
    }
}
