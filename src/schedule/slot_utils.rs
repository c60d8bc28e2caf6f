use crate::error::{Error, Result};
use super::types::TimeSlot;

pub const DEFAULT_DAY_NAMES: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
pub const DEFAULT_INTERVAL_BOUNDS: [&str; 9] = ["8am", "9am", "10am", "11am", "12pm", "1pm", "2pm", "3pm", "4pm"];

/// The canonical, ordered set of time slots.
///
/// Every day gets one interval per pair of consecutive bounds, so `n` bounds
/// produce `n - 1` slots per day. Slots are labelled `"<day> <start> - <end>"`,
/// which is also the column header the roster loader looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    day_names: Vec<String>,
    interval_bounds: Vec<String>,
}

impl SlotCatalog {
    pub fn new(day_names: Vec<String>, interval_bounds: Vec<String>) -> Result<Self> {
        if day_names.is_empty() {
            return Err(Error::ConfigError("at least one day is required".to_string()));
        }
        if interval_bounds.len() < 2 {
            return Err(Error::ConfigError("at least two interval bounds are required".to_string()));
        }
        if day_names.len() > u8::MAX as usize || interval_bounds.len() > u8::MAX as usize {
            return Err(Error::ConfigError("too many days or intervals".to_string()));
        }
        Ok(SlotCatalog { day_names, interval_bounds })
    }

    pub fn days(&self) -> usize {
        self.day_names.len()
    }

    pub fn intervals_per_day(&self) -> usize {
        self.interval_bounds.len() - 1
    }

    pub fn len(&self) -> usize {
        self.days() * self.intervals_per_day()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, slot: &TimeSlot) -> bool {
        (slot.day as usize) < self.days() && (slot.interval as usize) < self.intervals_per_day()
    }

    /// All slots in canonical order
    pub fn slots(&self) -> Vec<TimeSlot> {
        let mut slots = Vec::with_capacity(self.len());
        for day in 0..self.days() {
            for interval in 0..self.intervals_per_day() {
                slots.push(TimeSlot::new(day as u8, interval as u8));
            }
        }
        slots
    }

    /// Converts a slot to its display label, e.g. "Monday 8am - 9am".
    /// Slots outside the catalog fall back to their numeric form.
    pub fn label(&self, slot: &TimeSlot) -> String {
        if !self.contains(slot) {
            return slot.to_string();
        }
        let day = &self.day_names[slot.day as usize];
        let start = &self.interval_bounds[slot.interval as usize];
        let end = &self.interval_bounds[slot.interval as usize + 1];
        format!("{} {} - {}", day, start, end)
    }

    /// Maps a label back to its slot
    pub fn slot_for_label(&self, label: &str) -> Option<TimeSlot> {
        let label = label.trim();
        self.slots().into_iter().find(|slot| self.label(slot) == label)
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        SlotCatalog {
            day_names: DEFAULT_DAY_NAMES.iter().map(|d| d.to_string()).collect(),
            interval_bounds: DEFAULT_INTERVAL_BOUNDS.iter().map(|b| b.to_string()).collect(),
        }
    }
}
