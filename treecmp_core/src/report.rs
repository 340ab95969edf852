use crate::totals::Totals;
use std::io::{self, Write};
use treecmp_common::{CompareConfig, ComparisonOutcome, FullComparison};

/// Escape sequences wrapped around rendered lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mismatch: &'static str,
    pub matched: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const PLAIN: Palette = Palette {
        mismatch: "",
        matched: "",
        reset: "",
    };

    pub const ANSI: Palette = Palette {
        mismatch: "\x1b[1m\x1b[31m", // Bold red
        matched: "\x1b[1m\x1b[32m",  // Bold green
        reset: "\x1b[0m",
    };

    pub fn for_colorize(colorize: bool) -> Self {
        if colorize {
            Self::ANSI
        } else {
            Self::PLAIN
        }
    }
}

/// What the renderer prints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub show_matches: bool,
    pub colorize: bool,
    pub show_totals: bool,
    /// Suppress per-path lines; an explicitly requested totals block still prints
    pub silent: bool,
}

impl From<&CompareConfig> for ReportOptions {
    fn from(config: &CompareConfig) -> Self {
        Self {
            show_matches: config.matches,
            colorize: config.pretty,
            show_totals: config.totals,
            silent: config.silent,
        }
    }
}

/// Plain description of one comparison, without color
pub fn describe(comparison: &FullComparison) -> String {
    let first = comparison.first_path.display();
    let second = comparison.second_path.display();

    match comparison.outcome() {
        ComparisonOutcome::Match => format!("\"{}\" == \"{}\"", first, second),
        ComparisonOutcome::TypeMismatch => {
            format!("\"{}\" is not of the same type as \"{}\"", first, second)
        }
        ComparisonOutcome::ContentMismatch => format!("\"{}\" differs from \"{}\"", first, second),
        ComparisonOutcome::OnlyFirstExists => {
            format!("\"{}\" exists, but \"{}\" does NOT exist", first, second)
        }
        ComparisonOutcome::OnlySecondExists => {
            format!("\"{}\" does NOT exist, but \"{}\" does exist", first, second)
        }
        ComparisonOutcome::NeitherExists => {
            format!("\"{}\" does NOT exist, nor does \"{}\"", first, second)
        }
    }
}

/// Render one comparison to a line, or `None` if it should not be shown.
pub fn render_comparison(comparison: &FullComparison, options: &ReportOptions) -> Option<String> {
    if options.silent {
        return None;
    }

    let palette = Palette::for_colorize(options.colorize);
    let color = if comparison.pair.is_match() {
        if !options.show_matches {
            return None;
        }
        palette.matched
    } else {
        palette.mismatch
    };

    Some(format!("{}{}{}", color, describe(comparison), palette.reset))
}

pub fn render_totals(totals: &Totals) -> String {
    format!(
        "All done!\n\
         File byte-for-byte matches: {}/{}\n\
         Directory matches: {}/{}\n\
         Symbolic link matches: {}/{}\n",
        totals.files.matches,
        totals.files.possible,
        totals.directories.matches,
        totals.directories.possible,
        totals.symlinks.matches,
        totals.symlinks.possible,
    )
}

/// Write every rendered line, then the totals block if requested.
pub fn write_report<W: Write>(
    out: &mut W,
    comparisons: &[FullComparison],
    options: &ReportOptions,
) -> io::Result<()> {
    for comparison in comparisons {
        if let Some(line) = render_comparison(comparison, options) {
            writeln!(out, "{}", line)?;
        }
    }

    if options.show_totals {
        write!(out, "{}", render_totals(&Totals::from_comparisons(comparisons)))?;
    }

    out.flush()
}
