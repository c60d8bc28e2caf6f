use std::collections::BTreeSet;
use crate::error::{Error, Result};
use super::slot_utils::SlotCatalog;
use super::types::{AvailabilityTable, PersonId, Roster, SlotAvailability};

/// Result of removing slots nobody can actually meet in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrunedAvailability {
    pub table: AvailabilityTable,
    pub leader_ids: BTreeSet<PersonId>,  // leaders still reachable through some slot
    pub student_ids: BTreeSet<PersonId>, // students still reachable through some slot
    pub unavailable_leaders: BTreeSet<PersonId>,
    pub unavailable_students: BTreeSet<PersonId>,
}

/// Splits the roster into leader and student ID sets by role
pub fn split_roles(roster: &Roster) -> (BTreeSet<PersonId>, BTreeSet<PersonId>) {
    let mut leader_ids = BTreeSet::new();
    let mut student_ids = BTreeSet::new();
    for (id, person) in roster {
        if person.is_leader() {
            leader_ids.insert(id.clone());
        } else {
            student_ids.insert(id.clone());
        }
    }
    (leader_ids, student_ids)
}

/// Builds the slot -> (leaders, students) table for every slot in the catalog.
///
/// Slots nobody is free for are still present with empty sets. Fails if a
/// listed person is missing from the roster or marks a slot the catalog
/// doesn't know about.
pub fn build_availability_table(
    roster: &Roster,
    leader_ids: &BTreeSet<PersonId>,
    student_ids: &BTreeSet<PersonId>,
    catalog: &SlotCatalog,
) -> Result<AvailabilityTable> {
    let mut table = AvailabilityTable::default();
    for slot in catalog.slots() {
        table.slots.insert(slot, SlotAvailability::default());
    }

    // Leaders first, then students
    for (ids, is_leader) in [(leader_ids, true), (student_ids, false)] {
        for id in ids {
            let person = roster.get(id).ok_or_else(|| Error::UnknownPerson { person: id.clone() })?;
            for (slot, &available) in &person.availability {
                if !catalog.contains(slot) {
                    return Err(Error::UnknownSlot {
                        person: id.clone(),
                        slot: slot.to_string(),
                    });
                }
                if !available {
                    continue;
                }
                if let Some(bucket) = table.slots.get_mut(slot) {
                    if is_leader {
                        bucket.leader_ids.insert(id.clone());
                    } else {
                        bucket.student_ids.insert(id.clone());
                    }
                }
            }
        }
    }

    Ok(table)
}

/// Drops every slot without at least one leader and one student, and works
/// out who is left with no usable slot at all.
///
/// Running it again on its own output changes nothing.
pub fn prune_unavailable_slots(
    table: &AvailabilityTable,
    leader_ids: &BTreeSet<PersonId>,
    student_ids: &BTreeSet<PersonId>,
) -> PrunedAvailability {
    let mut pruned = AvailabilityTable::default();
    let mut reachable_leaders: BTreeSet<PersonId> = BTreeSet::new();
    let mut reachable_students: BTreeSet<PersonId> = BTreeSet::new();

    for (slot, bucket) in &table.slots {
        // Only people in the working sets count towards keeping a slot
        let leaders: BTreeSet<PersonId> = bucket.leader_ids.intersection(leader_ids).cloned().collect();
        let students: BTreeSet<PersonId> = bucket.student_ids.intersection(student_ids).cloned().collect();
        if leaders.is_empty() || students.is_empty() {
            continue;
        }
        reachable_leaders.extend(leaders.iter().cloned());
        reachable_students.extend(students.iter().cloned());
        pruned.slots.insert(*slot, SlotAvailability {
            leader_ids: leaders,
            student_ids: students,
        });
    }

    let unavailable_leaders: BTreeSet<PersonId> = leader_ids.difference(&reachable_leaders).cloned().collect();
    let unavailable_students: BTreeSet<PersonId> = student_ids.difference(&reachable_students).cloned().collect();

    log::info!(
        "Pruned {} of {} slots; {} leader(s) and {} student(s) have no usable slot",
        table.len() - pruned.len(),
        table.len(),
        unavailable_leaders.len(),
        unavailable_students.len()
    );

    PrunedAvailability {
        table: pruned,
        leader_ids: reachable_leaders,
        student_ids: reachable_students,
        unavailable_leaders,
        unavailable_students,
    }
}
