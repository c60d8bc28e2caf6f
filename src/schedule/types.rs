use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

pub type PersonId = String;

/// A single time slot, identified by its day and interval index within the
/// slot catalog. Ordering follows the catalog: day first, then interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: u8,
    pub interval: u8,
}

impl TimeSlot {
    pub fn new(day: u8, interval: u8) -> Self {
        TimeSlot { day, interval }
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} interval {}", self.day, self.interval)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Student,
}

/// One roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub availability: BTreeMap<TimeSlot, bool>,
}

impl Person {
    pub fn new(id: &str, name: &str, email: &str, role: Role) -> Self {
        Person {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            availability: BTreeMap::new(),
        }
    }

    /// Marks the given slots as available
    pub fn available_in(mut self, slots: &[TimeSlot]) -> Self {
        for slot in slots {
            self.availability.insert(*slot, true);
        }
        self
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    pub fn is_available(&self, slot: &TimeSlot) -> bool {
        self.availability.get(slot).copied().unwrap_or(false)
    }
}

pub type Roster = BTreeMap<PersonId, Person>;

/// Leaders and students free in one slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub leader_ids: BTreeSet<PersonId>,
    pub student_ids: BTreeSet<PersonId>,
}

/// Slot -> who can make it. Built once from the roster, narrowed once by the pruner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityTable {
    pub slots: BTreeMap<TimeSlot, SlotAvailability>,
}

impl AvailabilityTable {
    pub fn get(&self, slot: &TimeSlot) -> Option<&SlotAvailability> {
        self.slots.get(slot)
    }

    pub fn leader_available(&self, slot: &TimeSlot, leader_id: &str) -> bool {
        self.slots.get(slot).map(|s| s.leader_ids.contains(leader_id)).unwrap_or(false)
    }

    pub fn student_available(&self, slot: &TimeSlot, student_id: &str) -> bool {
        self.slots.get(slot).map(|s| s.student_ids.contains(student_id)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Slot -> the single leader picked for it by one search restart
pub type LeaderAssignment = BTreeMap<TimeSlot, PersonId>;

/// People placed in one slot of the final schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGroup {
    pub leader_ids: BTreeSet<PersonId>,
    pub student_ids: BTreeSet<PersonId>,
}

impl ScheduledGroup {
    pub fn led_by(leader_id: &str) -> Self {
        ScheduledGroup {
            leader_ids: BTreeSet::from([leader_id.to_string()]),
            student_ids: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub groups: BTreeMap<TimeSlot, ScheduledGroup>, // slot -> group
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn student_count(&self) -> usize {
        self.groups.values().map(|g| g.student_ids.len()).sum()
    }
}
