use std::collections::BTreeSet;
use thiserror::Error;
use super::types::{AvailabilityTable, PersonId, Schedule, TimeSlot};

/// The first broken rule found in a schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("slot {slot} has {count} leaders instead of exactly one")]
    LeaderCount { slot: TimeSlot, count: usize },

    #[error("leader in slot {slot} has no students")]
    LeaderAlone { slot: TimeSlot },

    #[error("'{person}' is scheduled more than once (again in slot {slot})")]
    DuplicatePerson { slot: TimeSlot, person: PersonId },

    #[error("student '{person}' is not available for slot {slot}")]
    StudentUnavailable { slot: TimeSlot, person: PersonId },

    #[error("leader '{person}' is not available for slot {slot}")]
    LeaderUnavailable { slot: TimeSlot, person: PersonId },
}

/// Checks the schedule in one pass and returns the first violation.
pub fn check_schedule(schedule: &Schedule, table: &AvailabilityTable) -> Result<(), ScheduleViolation> {
    let mut already_placed: BTreeSet<&PersonId> = BTreeSet::new();

    for (slot, group) in &schedule.groups {
        if group.leader_ids.len() != 1 {
            return Err(ScheduleViolation::LeaderCount { slot: *slot, count: group.leader_ids.len() });
        }
        if group.student_ids.is_empty() {
            return Err(ScheduleViolation::LeaderAlone { slot: *slot });
        }
        for person in group.leader_ids.iter().chain(group.student_ids.iter()) {
            if !already_placed.insert(person) {
                return Err(ScheduleViolation::DuplicatePerson { slot: *slot, person: person.clone() });
            }
        }
        if let Some(student) = group.student_ids.iter().find(|s| !table.student_available(slot, s)) {
            return Err(ScheduleViolation::StudentUnavailable { slot: *slot, person: student.clone() });
        }
        if let Some(leader) = group.leader_ids.iter().find(|l| !table.leader_available(slot, l)) {
            return Err(ScheduleViolation::LeaderUnavailable { slot: *slot, person: leader.clone() });
        }
    }

    Ok(())
}

/// True only if every slot keeps every schedule rule
pub fn is_valid_schedule(schedule: &Schedule, table: &AvailabilityTable) -> bool {
    check_schedule(schedule, table).is_ok()
}
