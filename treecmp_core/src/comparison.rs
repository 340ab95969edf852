use crate::classify::entry_kind;
use crate::content::{regular_files_match, symlinks_match};
use crate::scanner::{merge_path_sets, FolderScanner};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};
use treecmp_common::{
    CompareConfig, ComparisonOutcome, EntryKind, FullComparison, PairComparison, RelativePath,
    TreeCmpError,
};

/// Comparison engine for comparing two directory trees
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    shallow: bool,
    parallel: bool,
}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CompareConfig) -> Self {
        Self::new()
            .with_shallow(config.shallow)
            .with_parallelism(config.parallel)
    }

    /// Accept equal-size regular files without reading them
    pub fn with_shallow(mut self, enabled: bool) -> Self {
        self.shallow = enabled;
        self
    }

    /// Scan and compare on the rayon pool. Output order is unaffected.
    pub fn with_parallelism(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Scan both roots, merge the path sets and compare every path.
    pub fn compare_trees(
        &self,
        first_root: &Path,
        second_root: &Path,
    ) -> Result<Vec<FullComparison>, TreeCmpError> {
        let scanner = FolderScanner::new().with_parallelism(self.parallel);

        info!("Scanning first tree {:?}", first_root);
        let first_paths = scanner.scan(first_root)?;
        info!("Scanning second tree {:?}", second_root);
        let second_paths = scanner.scan(second_root)?;

        info!(
            "Comparing {} first entries with {} second entries",
            first_paths.len(),
            second_paths.len()
        );
        let all_paths = merge_path_sets(first_paths, second_paths);

        self.compare(first_root, second_root, &all_paths)
    }

    /// Compare each relative path under both roots, keeping the order of `paths`.
    pub fn compare(
        &self,
        first_root: &Path,
        second_root: &Path,
        paths: &[RelativePath],
    ) -> Result<Vec<FullComparison>, TreeCmpError> {
        let compare_one = |relative_path: &RelativePath| -> Result<FullComparison, TreeCmpError> {
            let first_path = relative_path.under(first_root);
            let second_path = relative_path.under(second_root);
            let pair = self.compare_paths(&first_path, &second_path)?;
            Ok(FullComparison {
                relative_path: relative_path.clone(),
                first_path,
                second_path,
                pair,
            })
        };

        let results = if self.parallel {
            paths.par_iter().map(compare_one).collect::<Result<Vec<_>, _>>()?
        } else {
            paths.iter().map(compare_one).collect::<Result<Vec<_>, _>>()?
        };

        debug!("Generated {} comparisons", results.len());
        Ok(results)
    }

    /// Compare two entries: existence first, then kind, then substance.
    pub fn compare_paths(&self, first: &Path, second: &Path) -> Result<PairComparison, TreeCmpError> {
        let pair = match (entry_kind(first)?, entry_kind(second)?) {
            (None, None) => PairComparison::neither(),
            (Some(kind), None) => PairComparison::only_first(kind),
            (None, Some(kind)) => PairComparison::only_second(kind),
            (Some(first_kind), Some(second_kind)) if first_kind != second_kind => {
                PairComparison::both(ComparisonOutcome::TypeMismatch, first_kind, second_kind)
            }
            (Some(kind), Some(_)) => {
                let same = match kind {
                    // Children are separate entries in the path set
                    EntryKind::Directory => true,
                    EntryKind::RegularFile => regular_files_match(first, second, self.shallow)?,
                    EntryKind::SymbolicLink => symlinks_match(first, second)?,
                };
                let outcome = if same {
                    ComparisonOutcome::Match
                } else {
                    ComparisonOutcome::ContentMismatch
                };
                PairComparison::both(outcome, kind, kind)
            }
        };

        debug!("{:?} vs {:?}: {:?}", first, second, pair.outcome);
        Ok(pair)
    }
}

/// True when every comparison in the run is a match (an empty run included)
pub fn all_match(comparisons: &[FullComparison]) -> bool {
    comparisons.iter().all(|c| c.pair.is_match())
}
