use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use rand::seq::SliceRandom;
use rand::Rng;
use super::types::{AvailabilityTable, LeaderAssignment, PersonId, TimeSlot};

pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CANDIDATES: usize = 256;

/// Limits for the randomized leader search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Wall-clock budget, checked between restarts
    pub time_budget: Duration,
    /// Stop after this many restarts even if time is left
    pub max_restarts: Option<u64>,
    /// How many equally good assignments to keep for the fill stage
    pub max_candidates: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            time_budget: DEFAULT_TIME_BUDGET,
            max_restarts: None,
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Improved,
    Tied,
    Rejected,
}

/// Every assignment sharing the lowest score seen so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestCandidates {
    pub best_score: usize,
    pub candidates: Vec<LeaderAssignment>,
    max_candidates: usize,
}

impl BestCandidates {
    pub fn new(baseline_score: usize, baseline: LeaderAssignment, max_candidates: usize) -> Self {
        BestCandidates {
            best_score: baseline_score,
            candidates: vec![baseline],
            max_candidates: max_candidates.max(1),
        }
    }

    /// A strictly lower score replaces the list, an equal score joins it
    /// (unless already present or the list is full), a higher one is dropped.
    pub fn offer(&mut self, score: usize, assignment: LeaderAssignment) -> Offer {
        if score < self.best_score {
            self.best_score = score;
            self.candidates.clear();
            self.candidates.push(assignment);
            Offer::Improved
        } else if score == self.best_score {
            if self.candidates.len() < self.max_candidates && !self.candidates.contains(&assignment) {
                self.candidates.push(assignment);
            }
            Offer::Tied
        } else {
            Offer::Rejected
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub candidates: Vec<LeaderAssignment>, // never empty
    pub best_score: usize,
    pub restarts: u64,
    pub score_history: Vec<(u64, usize)>, // (restart, new best score) at each improvement
    pub elapsed: Duration,
}

/// Counts the students no assigned leader can reach
pub fn uncovered_students(
    assignment: &LeaderAssignment,
    table: &AvailabilityTable,
    student_ids: &BTreeSet<PersonId>,
) -> usize {
    let mut covered: BTreeSet<&PersonId> = BTreeSet::new();
    for slot in assignment.keys() {
        if let Some(bucket) = table.get(slot) {
            covered.extend(bucket.student_ids.iter());
        }
    }
    student_ids.iter().filter(|id| !covered.contains(id)).count()
}

/// One randomized pass: walk the slots in random order and give each the
/// first still-unused leader (in random pool order) who can make it.
fn run_restart<R: Rng + ?Sized>(
    slots: &[TimeSlot],
    leaders: &[PersonId],
    table: &AvailabilityTable,
    rng: &mut R,
) -> LeaderAssignment {
    let mut slot_order = slots.to_vec();
    slot_order.shuffle(rng);
    let mut pool = leaders.to_vec();
    pool.shuffle(rng);

    let mut assignment = LeaderAssignment::new();
    for slot in slot_order {
        if pool.is_empty() {
            break;
        }
        let Some(bucket) = table.get(&slot) else { continue };
        if let Some(pos) = pool.iter().position(|leader| bucket.leader_ids.contains(leader)) {
            let leader = pool.remove(pos);
            assignment.insert(slot, leader);
        }
    }
    assignment
}

/// Randomized restart search for leader-to-slot assignments that leave as
/// few students as possible without a reachable leader.
///
/// Stops as soon as every student is covered, otherwise when the time budget
/// (or the optional restart cap) runs out. A restart already underway always
/// finishes, so the budget can be overshot by one restart.
pub fn search_leader_assignments<R: Rng + ?Sized>(
    table: &AvailabilityTable,
    leader_ids: &BTreeSet<PersonId>,
    student_ids: &BTreeSet<PersonId>,
    settings: &SearchSettings,
    rng: &mut R,
) -> SearchOutcome {
    let started = Instant::now();
    let slots: Vec<TimeSlot> = table.slots.keys().copied().collect();
    let leaders: Vec<PersonId> = leader_ids.iter().cloned().collect();

    // Nobody assigned anywhere is always a valid fallback
    let mut best = BestCandidates::new(student_ids.len(), LeaderAssignment::new(), settings.max_candidates);
    let mut restarts: u64 = 0;
    let mut score_history = Vec::new();

    while best.best_score > 0 {
        if started.elapsed() >= settings.time_budget {
            break;
        }
        if settings.max_restarts.map(|max| restarts >= max).unwrap_or(false) {
            break;
        }

        let assignment = run_restart(&slots, &leaders, table, rng);
        let score = uncovered_students(&assignment, table, student_ids);
        restarts += 1;

        if best.offer(score, assignment) == Offer::Improved {
            log::debug!("Restart {}: {} student(s) uncovered", restarts, score);
            score_history.push((restarts, score));
        }
    }

    let elapsed = started.elapsed();
    log::info!(
        "Leader search finished after {} restart(s) in {:.2?}: {} student(s) uncovered, {} candidate(s)",
        restarts,
        elapsed,
        best.best_score,
        best.candidates.len()
    );

    SearchOutcome {
        candidates: best.candidates,
        best_score: best.best_score,
        restarts,
        score_history,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::SlotAvailability;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(list: &[&str]) -> BTreeSet<PersonId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[(TimeSlot, &[&str], &[&str])]) -> AvailabilityTable {
        let mut table = AvailabilityTable::default();
        for (slot, leaders, students) in rows {
            table.slots.insert(*slot, SlotAvailability {
                leader_ids: ids(leaders),
                student_ids: ids(students),
            });
        }
        table
    }

    fn assignment(pairs: &[(TimeSlot, &str)]) -> LeaderAssignment {
        pairs.iter().map(|(slot, leader)| (*slot, leader.to_string())).collect()
    }

    fn limited(max_restarts: u64) -> SearchSettings {
        SearchSettings {
            time_budget: Duration::from_secs(3600),
            max_restarts: Some(max_restarts),
            max_candidates: DEFAULT_MAX_CANDIDATES,
        }
    }

    #[test]
    fn offer_resets_on_improvement_and_collects_ties() {
        let x = TimeSlot::new(0, 0);
        let mut best = BestCandidates::new(5, LeaderAssignment::new(), 10);

        assert_eq!(best.offer(3, assignment(&[(x, "a")])), Offer::Improved);
        assert_eq!(best.candidates.len(), 1);

        assert_eq!(best.offer(3, assignment(&[(x, "b")])), Offer::Tied);
        assert_eq!(best.offer(3, assignment(&[(x, "b")])), Offer::Tied);
        assert_eq!(best.candidates.len(), 2);

        assert_eq!(best.offer(4, assignment(&[(x, "c")])), Offer::Rejected);
        assert_eq!(best.best_score, 3);
        assert_eq!(best.candidates.len(), 2);
    }

    #[test]
    fn offer_respects_candidate_cap() {
        let x = TimeSlot::new(0, 0);
        let mut best = BestCandidates::new(1, LeaderAssignment::new(), 2);
        best.offer(1, assignment(&[(x, "a")]));
        best.offer(1, assignment(&[(x, "b")]));
        assert_eq!(best.candidates.len(), 2);
    }

    #[test]
    fn counts_uncovered_students() {
        let (x, y) = (TimeSlot::new(0, 0), TimeSlot::new(0, 1));
        let table = table(&[(x, &["l1"], &["s1", "s2"]), (y, &["l1"], &["s3"])]);
        let students = ids(&["s1", "s2", "s3"]);
        assert_eq!(uncovered_students(&LeaderAssignment::new(), &table, &students), 3);
        assert_eq!(uncovered_students(&assignment(&[(x, "l1")]), &table, &students), 1);
        assert_eq!(uncovered_students(&assignment(&[(y, "l1")]), &table, &students), 2);
    }

    #[test]
    fn restart_never_reuses_a_leader_or_picks_an_unavailable_one() {
        let slots: Vec<TimeSlot> = (0..6).map(|i| TimeSlot::new(0, i)).collect();
        let (both, student): (&[&str], &[&str]) = (&["l1", "l2"], &["s1"]);
        let rows: Vec<(TimeSlot, &[&str], &[&str])> = slots.iter().map(|slot| (*slot, both, student)).collect();
        let table = table(&rows);
        let leaders: Vec<PersonId> = vec!["l1".into(), "l2".into(), "l3".into()];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let result = run_restart(&slots, &leaders, &table, &mut rng);
            assert_eq!(result.len(), 2);
            let used: BTreeSet<&PersonId> = result.values().collect();
            assert_eq!(used.len(), 2);
            for (slot, leader) in &result {
                assert!(table.leader_available(slot, leader));
            }
        }
    }

    #[test]
    fn stops_at_first_perfect_restart() {
        let (x, y) = (TimeSlot::new(0, 0), TimeSlot::new(0, 1));
        let table = table(&[(x, &["l1"], &["s1", "s2"]), (y, &["l2"], &["s3", "s4"])]);
        let settings = SearchSettings {
            time_budget: Duration::from_secs(3600),
            ..SearchSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = search_leader_assignments(&table, &ids(&["l1", "l2"]), &ids(&["s1", "s2", "s3", "s4"]), &settings, &mut rng);

        assert_eq!(outcome.best_score, 0);
        assert_eq!(outcome.restarts, 1);
        assert_eq!(outcome.candidates, vec![assignment(&[(x, "l1"), (y, "l2")])]);
    }

    #[test]
    fn best_score_history_never_increases() {
        // Twelve slots, four leaders with overlapping availability, students spread around
        let mut rows: Vec<(TimeSlot, Vec<String>, Vec<String>)> = Vec::new();
        for i in 0..12u8 {
            let leaders: Vec<String> = (0..4).filter(|l| (i as usize + l) % 3 == 0).map(|l| format!("l{}", l)).collect();
            let students: Vec<String> = (0..20).filter(|s| (s * 7 + i as usize) % 5 == 0).map(|s| format!("s{}", s)).collect();
            rows.push((TimeSlot::new(i / 4, i % 4), leaders, students));
        }
        let mut table = AvailabilityTable::default();
        let mut students = BTreeSet::new();
        for (slot, leaders, slot_students) in rows {
            students.extend(slot_students.iter().cloned());
            table.slots.insert(slot, SlotAvailability {
                leader_ids: leaders.into_iter().collect(),
                student_ids: slot_students.into_iter().collect(),
            });
        }
        let leaders = ids(&["l0", "l1", "l2", "l3"]);
        let mut rng = StdRng::seed_from_u64(42);

        let outcome = search_leader_assignments(&table, &leaders, &students, &limited(200), &mut rng);

        assert!(outcome.score_history.len() as u64 <= outcome.restarts);
        assert!(outcome.score_history.windows(2).all(|w| w[0].0 < w[1].0 && w[1].1 < w[0].1));
        assert_eq!(outcome.score_history.last().map(|&(_, score)| score), Some(outcome.best_score));
        assert!(!outcome.candidates.is_empty());
        for candidate in &outcome.candidates {
            assert_eq!(uncovered_students(candidate, &table, &students), outcome.best_score);
        }
    }

    #[test]
    fn same_seed_gives_same_candidates() {
        let slots: Vec<TimeSlot> = (0..5).map(|i| TimeSlot::new(0, i)).collect();
        let rows: [(TimeSlot, &[&str], &[&str]); 5] = [
            (slots[0], &["a", "b"], &["s1"]),
            (slots[1], &["a"], &["s2"]),
            (slots[2], &["b", "c"], &["s3", "s1"]),
            (slots[3], &["c"], &["s4"]),
            (slots[4], &["a", "c"], &["s5"]),
        ];
        let table = table(&rows);
        let leaders = ids(&["a", "b", "c"]);
        let students = ids(&["s1", "s2", "s3", "s4", "s5"]);

        let first = search_leader_assignments(&table, &leaders, &students, &limited(50), &mut StdRng::seed_from_u64(9));
        let second = search_leader_assignments(&table, &leaders, &students, &limited(50), &mut StdRng::seed_from_u64(9));

        assert_eq!(first.candidates, second.candidates);
        assert_eq!(first.score_history, second.score_history);
    }

    #[test]
    fn zero_budget_returns_baseline() {
        let x = TimeSlot::new(0, 0);
        let table = table(&[(x, &["l1"], &["s1"])]);
        let settings = SearchSettings {
            time_budget: Duration::ZERO,
            ..SearchSettings::default()
        };
        let outcome = search_leader_assignments(&table, &ids(&["l1"]), &ids(&["s1"]), &settings, &mut StdRng::seed_from_u64(3));

        assert_eq!(outcome.restarts, 0);
        assert_eq!(outcome.best_score, 1);
        assert_eq!(outcome.candidates, vec![LeaderAssignment::new()]);
    }

    #[test]
    fn history_stays_small_when_budget_expires() {
        // One leader, two students in different slots: someone always stays uncovered
        let (x, y) = (TimeSlot::new(0, 0), TimeSlot::new(0, 1));
        let table = table(&[(x, &["l1"], &["s1"]), (y, &["l1"], &["s2"])]);
        let settings = SearchSettings {
            time_budget: Duration::from_millis(200),
            max_restarts: None,
            ..SearchSettings::default()
        };
        let started = Instant::now();
        let outcome = search_leader_assignments(&table, &ids(&["l1"]), &ids(&["s1", "s2"]), &settings, &mut StdRng::seed_from_u64(4));

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(outcome.restarts > 1);
        assert_eq!(outcome.best_score, 1);
        assert_eq!(outcome.score_history, vec![(1, 1)]);
        assert_eq!(outcome.candidates.len(), 2);
    }
}
