use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::generator::{MAX_TABLE, MIN_TABLE};

/// Stars for mastering a table for the first time.
pub const FIRST_MASTERY_STARS: u32 = 20;
/// Stars for passing a table that was already mastered.
pub const REPEAT_PASS_STARS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableStatus {
    Locked,
    Unlocked,
    Mastered,
}

/// Unlock/mastery/star state of the learner.
///
/// Every table above 1 is unlocked only because the table below it was
/// mastered, so a consistent value always has `masteredTables = 1..k` and
/// `unlockedTables = 1..=min(k + 1, 10)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub unlocked_tables: BTreeSet<u32>,
    pub mastered_tables: BTreeSet<u32>,
    pub stars: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked_tables: BTreeSet::from([MIN_TABLE]),
            mastered_tables: BTreeSet::new(),
            stars: 0,
        }
    }
}

impl Progress {
    pub fn is_unlocked(&self, table: u32) -> bool {
        self.unlocked_tables.contains(&table)
    }

    pub fn is_mastered(&self, table: u32) -> bool {
        self.mastered_tables.contains(&table)
    }

    pub fn table_status(&self, table: u32) -> TableStatus {
        if self.is_mastered(table) {
            TableStatus::Mastered
        } else if self.is_unlocked(table) {
            TableStatus::Unlocked
        } else {
            TableStatus::Locked
        }
    }

    pub fn mastered_count(&self) -> usize {
        self.mastered_tables.len()
    }

    pub fn mastered_ratio(&self) -> f64 {
        self.mastered_count() as f64 / MAX_TABLE as f64
    }

    /// Highest unlocked table.
    pub fn frontier(&self) -> u32 {
        self.unlocked_tables.last().copied().unwrap_or(MIN_TABLE)
    }

    /// Table 1 is unlocked, mastered is a subset of unlocked, and every
    /// unlocked `n > 1` has `n - 1` mastered.
    pub fn is_consistent(&self) -> bool {
        let in_range = |t: &u32| (MIN_TABLE..=MAX_TABLE).contains(t);
        self.unlocked_tables.contains(&MIN_TABLE)
            && self.unlocked_tables.iter().all(in_range)
            && self.mastered_tables.is_subset(&self.unlocked_tables)
            && self
                .unlocked_tables
                .iter()
                .filter(|&&t| t > MIN_TABLE)
                .all(|t| self.mastered_tables.contains(&(t - 1)))
    }

    /// Rebuild a consistent value from whatever was deserialized. Mastery
    /// is kept up to the first gap; stars are kept as-is.
    pub fn normalized(&self) -> Self {
        let mastered: BTreeSet<u32> = (MIN_TABLE..=MAX_TABLE)
            .take_while(|t| self.mastered_tables.contains(t))
            .collect();
        let top = mastered.last().map_or(MIN_TABLE, |&k| (k + 1).min(MAX_TABLE));
        Self {
            unlocked_tables: (MIN_TABLE..=top).collect(),
            mastered_tables: mastered,
            stars: self.stars,
        }
    }
}

/// The single transition rule for progress. Failure leaves the value
/// untouched; success masters `table`, unlocks `table + 1` and awards stars.
pub fn apply_quiz_result(progress: &Progress, table: u32, success: bool) -> Progress {
    if !success {
        return progress.clone();
    }

    let already_mastered = progress.is_mastered(table);

    let mut mastered_tables = progress.mastered_tables.clone();
    mastered_tables.insert(table);

    let mut unlocked_tables = progress.unlocked_tables.clone();
    let next_table = table + 1;
    if next_table <= MAX_TABLE {
        unlocked_tables.insert(next_table);
    }

    let award = if already_mastered {
        REPEAT_PASS_STARS
    } else {
        FIRST_MASTERY_STARS
    };

    Progress {
        unlocked_tables,
        mastered_tables,
        stars: progress.stars.saturating_add(award),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(unlocked: &[u32], mastered: &[u32], stars: u32) -> Progress {
        Progress {
            unlocked_tables: unlocked.iter().copied().collect(),
            mastered_tables: mastered.iter().copied().collect(),
            stars,
        }
    }

    #[test]
    fn test_default_progress() {
        let p = Progress::default();
        assert_eq!(p, progress(&[1], &[], 0));
        assert!(p.is_consistent());
        assert_eq!(p.table_status(1), TableStatus::Unlocked);
        assert_eq!(p.table_status(2), TableStatus::Locked);
    }

    #[test]
    fn test_first_mastery_of_table_one() {
        let next = apply_quiz_result(&Progress::default(), 1, true);
        assert_eq!(next, progress(&[1, 2], &[1], 20));
        assert_eq!(next.table_status(1), TableStatus::Mastered);
    }

    #[test]
    fn test_failure_is_identity() {
        let samples = [
            Progress::default(),
            progress(&[1, 2, 3], &[1, 2], 45),
            progress(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10], 500),
        ];
        for p in &samples {
            for table in 1..=10 {
                assert_eq!(&apply_quiz_result(p, table, false), p);
            }
        }
    }

    #[test]
    fn test_repeat_pass_awards_five() {
        let p = progress(&[1, 2, 3], &[1, 2], 40);
        let next = apply_quiz_result(&p, 1, true);
        assert_eq!(next.stars, 45);
        assert_eq!(next.unlocked_tables, p.unlocked_tables);
        assert_eq!(next.mastered_tables, p.mastered_tables);
    }

    #[test]
    fn test_frontier_advances_by_one() {
        let mut p = Progress::default();
        for table in 1..=9 {
            assert_eq!(p.frontier(), table);
            p = apply_quiz_result(&p, table, true);
            assert!(p.is_unlocked(table + 1));
            assert!(p.is_consistent());
        }
        assert_eq!(p.frontier(), 10);
        assert_eq!(p.stars, 9 * 20);
    }

    #[test]
    fn test_mastering_ten_never_unlocks_eleven() {
        let all: Vec<u32> = (1..=10).collect();
        let p = progress(&all, &all[..9], 180);
        let next = apply_quiz_result(&p, 10, true);
        assert!(!next.is_unlocked(11));
        assert_eq!(next.unlocked_tables.len(), 10);
        assert_eq!(next.mastered_count(), 10);
        assert_eq!(next.stars, 200);
        assert!((next.mastered_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stars_saturate() {
        let p = progress(&[1], &[], u32::MAX - 3);
        assert_eq!(apply_quiz_result(&p, 1, true).stars, u32::MAX);
    }

    #[test]
    fn test_inconsistent_values_detected() {
        assert!(!progress(&[], &[], 0).is_consistent());
        assert!(!progress(&[1, 3], &[1], 0).is_consistent());
        assert!(!progress(&[1], &[2], 0).is_consistent());
        assert!(!progress(&[1, 11], &[1], 0).is_consistent());
    }

    #[test]
    fn test_normalized_keeps_contiguous_prefix() {
        let broken = progress(&[1, 5, 7], &[1, 2, 4], 60);
        let fixed = broken.normalized();
        assert_eq!(fixed, progress(&[1, 2, 3], &[1, 2], 60));
        assert!(fixed.is_consistent());
    }

    #[test]
    fn test_normalized_is_identity_on_consistent() {
        let p = progress(&[1, 2, 3], &[1, 2], 40);
        assert_eq!(p.normalized(), p);
        assert_eq!(progress(&[], &[], 7).normalized(), progress(&[1], &[], 7));
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&progress(&[1, 2], &[1], 20)).unwrap();
        assert_eq!(json, r#"{"unlockedTables":[1,2],"masteredTables":[1],"stars":20}"#);
    }
}
