use serde::{Deserialize, Serialize};
use treecmp_common::{EntryKind, FullComparison, PairComparison};

/// Match count against the number of pairs where a match was possible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTally {
    pub matches: u64,
    pub possible: u64,
}

/// Per-kind match totals for a comparison run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub files: KindTally,
    pub directories: KindTally,
    pub symlinks: KindTally,
}

impl Totals {
    pub fn from_comparisons(comparisons: &[FullComparison]) -> Self {
        comparisons.iter().fold(Totals::default(), |mut totals, comparison| {
            totals.update(&comparison.pair);
            totals
        })
    }

    /// Fold one pair into the counters.
    ///
    /// A kind's possible count goes up once if either side is of that kind,
    /// so a type mismatch counts towards both of its kinds. A match is
    /// credited to the first side's kind, which both sides share.
    pub fn update(&mut self, pair: &PairComparison) {
        for kind in EntryKind::ALL {
            if pair.involves(kind) {
                self.tally_mut(kind).possible += 1;
            }
        }

        if pair.is_match() {
            if let Some(kind) = pair.first_kind {
                self.tally_mut(kind).matches += 1;
            }
        }
    }

    pub fn tally(&self, kind: EntryKind) -> KindTally {
        match kind {
            EntryKind::RegularFile => self.files,
            EntryKind::Directory => self.directories,
            EntryKind::SymbolicLink => self.symlinks,
        }
    }

    fn tally_mut(&mut self, kind: EntryKind) -> &mut KindTally {
        match kind {
            EntryKind::RegularFile => &mut self.files,
            EntryKind::Directory => &mut self.directories,
            EntryKind::SymbolicLink => &mut self.symlinks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treecmp_common::ComparisonOutcome;

    #[test]
    fn test_match_counts_once() {
        let mut totals = Totals::default();
        totals.update(&PairComparison::both(
            ComparisonOutcome::Match,
            EntryKind::RegularFile,
            EntryKind::RegularFile,
        ));

        assert_eq!(totals.files, KindTally { matches: 1, possible: 1 });
        assert_eq!(totals.directories, KindTally::default());
        assert_eq!(totals.symlinks, KindTally::default());
    }

    #[test]
    fn test_type_mismatch_counts_both_kinds() {
        let mut totals = Totals::default();
        totals.update(&PairComparison::both(
            ComparisonOutcome::TypeMismatch,
            EntryKind::Directory,
            EntryKind::SymbolicLink,
        ));

        assert_eq!(totals.directories, KindTally { matches: 0, possible: 1 });
        assert_eq!(totals.symlinks, KindTally { matches: 0, possible: 1 });
        assert_eq!(totals.files, KindTally::default());
    }

    #[test]
    fn test_one_sided_and_missing() {
        let mut totals = Totals::default();
        totals.update(&PairComparison::only_second(EntryKind::SymbolicLink));
        totals.update(&PairComparison::only_first(EntryKind::Directory));
        totals.update(&PairComparison::neither());

        assert_eq!(totals.symlinks, KindTally { matches: 0, possible: 1 });
        assert_eq!(totals.directories, KindTally { matches: 0, possible: 1 });
        assert_eq!(totals.files, KindTally::default());
    }

    #[test]
    fn test_content_mismatch_is_possible_not_actual() {
        let mut totals = Totals::default();
        totals.update(&PairComparison::both(
            ComparisonOutcome::ContentMismatch,
            EntryKind::RegularFile,
            EntryKind::RegularFile,
        ));
        assert_eq!(totals.tally(EntryKind::RegularFile), KindTally { matches: 0, possible: 1 });
    }

    #[test]
    fn test_empty_run_is_zero() {
        assert_eq!(Totals::from_comparisons(&[]), Totals::default());
    }

    #[test]
    fn test_invariants_over_a_real_run() {
        use crate::ComparisonEngine;
        use std::fs;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        fs::create_dir_all(first.join("shared")).unwrap();
        fs::create_dir_all(second.join("shared")).unwrap();
        fs::write(first.join("shared/same.txt"), "same").unwrap();
        fs::write(second.join("shared/same.txt"), "same").unwrap();
        fs::write(first.join("changed.txt"), "one").unwrap();
        fs::write(second.join("changed.txt"), "two").unwrap();
        fs::create_dir(first.join("flip")).unwrap();
        fs::write(second.join("flip"), "file").unwrap();
        fs::write(first.join("lonely.txt"), "x").unwrap();

        let results = ComparisonEngine::new().compare_trees(&first, &second).unwrap();
        let totals = Totals::from_comparisons(&results);

        assert_eq!(totals.files, KindTally { matches: 1, possible: 4 });
        assert_eq!(totals.directories, KindTally { matches: 1, possible: 2 });

        let possible_sum: u64 = EntryKind::ALL.iter().map(|k| totals.tally(*k).possible).sum();
        let type_mismatches = results
            .iter()
            .filter(|c| c.outcome() == ComparisonOutcome::TypeMismatch)
            .count() as u64;
        assert_eq!(possible_sum, results.len() as u64 + type_mismatches);

        for kind in EntryKind::ALL {
            let tally = totals.tally(kind);
            assert!(tally.matches <= tally.possible);
        }
    }
}
