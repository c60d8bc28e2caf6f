pub mod types;
pub mod slot_utils;
pub mod availability;
pub mod search;
pub mod fill;
pub mod validate;
pub mod pipeline;

pub use types::{AvailabilityTable, LeaderAssignment, Person, PersonId, Role, Roster, Schedule, ScheduledGroup, TimeSlot};
pub use slot_utils::SlotCatalog;
pub use availability::{build_availability_table, prune_unavailable_slots, split_roles, PrunedAvailability};
pub use search::{search_leader_assignments, SearchOutcome, SearchSettings};
pub use fill::{fill_students, FillOutcome};
pub use validate::{check_schedule, is_valid_schedule, ScheduleViolation};
pub use pipeline::{run_scheduler, SchedulingOutcome};
