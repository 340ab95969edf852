pub mod classify;
pub mod comparison;
pub mod content;
pub mod report;
pub mod scanner;
pub mod totals;

pub use classify::{classify, entry_kind};
pub use comparison::{all_match, ComparisonEngine};
pub use report::{render_comparison, render_totals, write_report, Palette, ReportOptions};
pub use scanner::{merge_path_sets, FolderScanner};
pub use totals::{KindTally, Totals};
