use csv::Writer;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::schedule::pipeline::SearchStats;
use crate::schedule::{PersonId, Roster, SchedulingOutcome, SlotCatalog};

const EXPORT_HEADERS: [&str; 6] = [
    "Time slot",
    "Leader",
    "Leader email",
    "Student count",
    "Students",
    "Student emails",
];

/// Formats a person as "Name (id)", or just the ID if they are not in the roster
pub fn format_person(roster: &Roster, id: &str) -> String {
    match roster.get(id) {
        Some(person) => format!("{} ({})", person.name, id),
        None => id.to_string(),
    }
}

fn names<'a, I: IntoIterator<Item = &'a PersonId>>(roster: &Roster, ids: I) -> Vec<String> {
    ids.into_iter()
        .map(|id| roster.get(id).map(|p| p.name.clone()).unwrap_or_else(|| id.clone()))
        .collect()
}

fn emails<'a, I: IntoIterator<Item = &'a PersonId>>(roster: &Roster, ids: I) -> Vec<String> {
    // One entry per person, empty when unknown, so the list lines up with `names`
    ids.into_iter()
        .map(|id| roster.get(id).map(|p| p.email.clone()).unwrap_or_default())
        .collect()
}

/// One exported schedule row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
    pub slot: String,
    pub leader: String,
    pub leader_email: String,
    pub student_count: usize,
    pub students: Vec<String>,
    pub student_emails: Vec<String>,
}

/// Flattens the schedule to one row per slot, in slot order
pub fn schedule_rows(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog) -> Vec<ScheduleRow> {
    outcome
        .schedule
        .groups
        .iter()
        .map(|(slot, group)| ScheduleRow {
            slot: catalog.label(slot),
            leader: names(roster, &group.leader_ids).join("; "),
            leader_email: emails(roster, &group.leader_ids).join("; "),
            student_count: group.student_ids.len(),
            students: names(roster, &group.student_ids),
            student_emails: emails(roster, &group.student_ids),
        })
        .collect()
}

fn print_people(title: &str, ids: &BTreeSet<PersonId>, roster: &Roster, out: &mut impl Write) -> std::io::Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{} ({}):", title, ids.len())?;
    for id in ids {
        writeln!(out, "  - {}", format_person(roster, id))?;
    }
    Ok(())
}

/// Writes a human-readable report of the run
pub fn write_report(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "=== Study Group Schedule ===")?;
    writeln!(
        out,
        "Groups: {}, students placed: {}",
        outcome.schedule.groups.len(),
        outcome.schedule.student_count()
    )?;

    for (slot, group) in &outcome.schedule.groups {
        let leaders: Vec<String> = group.leader_ids.iter().map(|id| format_person(roster, id)).collect();
        writeln!(out, "\n{} -> {} [{} student(s)]", catalog.label(slot), leaders.join(", "), group.student_ids.len())?;
        for id in &group.student_ids {
            writeln!(out, "    {}", format_person(roster, id))?;
        }
    }

    print_people("Leaders with no usable slot", &outcome.unavailable_leaders, roster, out)?;
    print_people("Students with no usable slot", &outcome.unavailable_students, roster, out)?;
    print_people("Students left unplaced", &outcome.unplaced_students, roster, out)?;
    print_people("Leaders without a group", &outcome.idle_leaders, roster, out)?;
    Ok(())
}

/// Prints the report to stdout
pub fn print_schedule(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_report(outcome, roster, catalog, &mut handle)
}

/// Writes the schedule as CSV, one row per slot
pub fn write_schedule_csv<W: Write>(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog, out: W) -> Result<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(EXPORT_HEADERS)?;
    for row in schedule_rows(outcome, roster, catalog) {
        wtr.write_record([
            row.slot,
            row.leader,
            row.leader_email,
            row.student_count.to_string(),
            row.students.join("; "),
            row.student_emails.join("; "),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_schedule_csv_file<P: AsRef<Path>>(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_schedule_csv(outcome, roster, catalog, file)
}

#[derive(Serialize)]
struct OutcomeExport<'a> {
    schedule: Vec<ScheduleRow>,
    unavailable_leaders: &'a BTreeSet<PersonId>,
    unavailable_students: &'a BTreeSet<PersonId>,
    unplaced_students: &'a BTreeSet<PersonId>,
    idle_leaders: &'a BTreeSet<PersonId>,
    search: &'a SearchStats,
}

/// Writes the whole outcome as pretty JSON
pub fn write_outcome_json<W: Write>(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog, out: W) -> Result<()> {
    let export = OutcomeExport {
        schedule: schedule_rows(outcome, roster, catalog),
        unavailable_leaders: &outcome.unavailable_leaders,
        unavailable_students: &outcome.unavailable_students,
        unplaced_students: &outcome.unplaced_students,
        idle_leaders: &outcome.idle_leaders,
        search: &outcome.search,
    };
    serde_json::to_writer_pretty(out, &export)?;
    Ok(())
}

pub fn write_outcome_json_file<P: AsRef<Path>>(outcome: &SchedulingOutcome, roster: &Roster, catalog: &SlotCatalog, path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_outcome_json(outcome, roster, catalog, file)
}
