use csv::{Reader, StringRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use crate::config::RosterColumns;
use crate::error::{Error, Result};
use crate::schedule::{Person, PersonId, Role, Roster, SlotCatalog, TimeSlot};

/// Roster plus the two role sets derived from it
#[derive(Debug, Clone, Default)]
pub struct LoadedRoster {
    pub roster: Roster,
    pub leader_ids: BTreeSet<PersonId>,
    pub student_ids: BTreeSet<PersonId>,
}

/// Finds a column by exact (trimmed) header name
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name.trim())
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| Error::ConfigError(format!("roster has no '{}' column", name)))
}

fn cell<'r>(record: &'r StringRecord, col: usize) -> &'r str {
    record.get(col).unwrap_or("").trim()
}

/// Loads the roster from a CSV file
pub fn load_roster<P: AsRef<Path>>(csv_path: P, catalog: &SlotCatalog, columns: &RosterColumns) -> Result<LoadedRoster> {
    let file = std::fs::File::open(csv_path)?;
    read_roster(file, catalog, columns)
}

/// Reads a roster from any CSV source.
///
/// One row per person. Every header matching a slot label of the catalog is
/// an availability column; other unknown columns are ignored. Empty IDs or
/// names and repeated IDs abort the load.
pub fn read_roster<R: Read>(source: R, catalog: &SlotCatalog, columns: &RosterColumns) -> Result<LoadedRoster> {
    let mut reader = Reader::from_reader(source);
    let headers = reader.headers()?.clone();

    let id_col = require_column(&headers, &columns.id)?;
    let name_col = require_column(&headers, &columns.name)?;
    let leader_col = require_column(&headers, &columns.leader_flag)?;
    let email_col = find_column(&headers, &columns.email);

    let slot_cols: Vec<(usize, TimeSlot)> = headers
        .iter()
        .enumerate()
        .filter_map(|(col, header)| catalog.slot_for_label(header).map(|slot| (col, slot)))
        .collect();
    if slot_cols.is_empty() {
        return Err(Error::ConfigError("roster has no column matching a known time slot".to_string()));
    }
    log::debug!("Found {} availability column(s)", slot_cols.len());

    let mut loaded = LoadedRoster::default();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = record.position().map(|p| p.line() as usize).unwrap_or(index + 2);

        let id = cell(&record, id_col).to_string();
        if id.is_empty() {
            return Err(Error::MissingField { row, field: columns.id.clone() });
        }
        let name = cell(&record, name_col).to_string();
        if name.is_empty() {
            return Err(Error::MissingField { row, field: columns.name.clone() });
        }
        if loaded.roster.contains_key(&id) {
            return Err(Error::DuplicatePerson(id));
        }

        let email = email_col.map(|col| cell(&record, col).to_string()).unwrap_or_default();
        let role = if cell(&record, leader_col) == columns.leader_value {
            Role::Leader
        } else {
            Role::Student
        };
        let availability: BTreeMap<TimeSlot, bool> = slot_cols
            .iter()
            .map(|(col, slot)| (*slot, cell(&record, *col) == columns.available_value))
            .collect();

        match role {
            Role::Leader => loaded.leader_ids.insert(id.clone()),
            Role::Student => loaded.student_ids.insert(id.clone()),
        };
        loaded.roster.insert(id.clone(), Person { id, name, email, role, availability });
    }

    log::info!(
        "Loaded {} people ({} leader(s), {} student(s))",
        loaded.roster.len(),
        loaded.leader_ids.len(),
        loaded.student_ids.len()
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
RUID,Name,Email,Group leader?,Monday 8am - 9am,Monday 9am - 10am,Notes
100,Ada,ada@example.com,Yes,Available,Unavailable,
200,Ben,ben@example.com,No,Available,Available,likes mornings
300,Cy,,No,,Available,
";

    fn read(csv: &str) -> Result<LoadedRoster> {
        read_roster(csv.as_bytes(), &SlotCatalog::default(), &RosterColumns::default())
    }

    #[test]
    fn reads_people_roles_and_availability() {
        let loaded = read(ROSTER).unwrap();
        let monday_8 = TimeSlot::new(0, 0);
        let monday_9 = TimeSlot::new(0, 1);

        assert_eq!(loaded.roster.len(), 3);
        assert_eq!(loaded.leader_ids, BTreeSet::from(["100".to_string()]));
        assert_eq!(loaded.student_ids.len(), 2);

        let ada = &loaded.roster["100"];
        assert_eq!(ada.name, "Ada");
        assert_eq!(ada.email, "ada@example.com");
        assert!(ada.is_available(&monday_8));
        assert!(!ada.is_available(&monday_9));

        let cy = &loaded.roster["300"];
        assert_eq!(cy.role, Role::Student);
        assert!(!cy.is_available(&monday_8));
        assert!(cy.is_available(&monday_9));
    }

    #[test]
    fn missing_name_is_fatal() {
        let csv = "RUID,Name,Group leader?,Monday 8am - 9am\n1,,Yes,Available\n";
        assert!(matches!(read(csv), Err(Error::MissingField { row: 2, .. })));
    }

    #[test]
    fn duplicate_id_is_fatal() {
        let csv = "RUID,Name,Group leader?,Monday 8am - 9am\n1,A,Yes,Available\n1,B,No,Available\n";
        assert!(matches!(read(csv), Err(Error::DuplicatePerson(id)) if id == "1"));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "Name,Group leader?,Monday 8am - 9am\nA,Yes,Available\n";
        assert!(matches!(read(csv), Err(Error::ConfigError(_))));
    }

    #[test]
    fn roster_without_slot_columns_is_fatal() {
        let csv = "RUID,Name,Group leader?,Saturday\n1,A,Yes,Available\n";
        assert!(matches!(read(csv), Err(Error::ConfigError(_))));
    }

    #[test]
    fn leader_flag_must_match_exactly() {
        let csv = "RUID,Name,Group leader?,Monday 8am - 9am\n1,A,yes,Available\n2,B,Yes,Available\n";
        let loaded = read(csv).unwrap();
        assert_eq!(loaded.leader_ids, BTreeSet::from(["2".to_string()]));
        assert_eq!(loaded.student_ids, BTreeSet::from(["1".to_string()]));
    }

    #[test]
    fn custom_column_names() {
        let columns = RosterColumns {
            id: "netid".to_string(),
            leader_flag: "role".to_string(),
            leader_value: "leader".to_string(),
            available_value: "x".to_string(),
            ..RosterColumns::default()
        };
        let csv = "netid,Name,role,Monday 8am - 9am\nab1,A,leader,x\n";
        let loaded = read_roster(csv.as_bytes(), &SlotCatalog::default(), &columns).unwrap();
        assert!(loaded.leader_ids.contains("ab1"));
        assert!(loaded.roster["ab1"].is_available(&TimeSlot::new(0, 0)));
    }
}
