use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use treecmp_common::{load_config, CompareConfig, ComparisonOutcome, FullComparison};
use treecmp_core::{all_match, write_report, ComparisonEngine, ReportOptions, Totals};

const EXIT_ALL_MATCH: i32 = 0;
const EXIT_MISMATCH: i32 = 1;
const EXIT_FAILURE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "treecmp")]
#[command(author = "treecmp Contributors")]
#[command(version)]
#[command(about = "Compare two directory trees path by path", long_about = None)]
struct Cli {
    /// First directory tree
    first: PathBuf,

    /// Second directory tree
    second: PathBuf,

    /// Also print paths that match
    #[arg(short, long)]
    matches: bool,

    /// Colorize output
    #[arg(short, long)]
    pretty: bool,

    /// Print per-kind match totals at the end
    #[arg(short, long)]
    totals: bool,

    /// Print no per-path lines; the exit status carries the result
    #[arg(short, long)]
    silent: bool,

    /// Treat regular files of equal size as identical without reading them
    #[arg(long)]
    shallow: bool,

    /// Scan and compare on multiple threads
    #[arg(short = 'M', long)]
    parallel: bool,

    /// Output results as JSON
    #[arg(long, conflicts_with = "silent")]
    json: bool,

    /// Read options from this TOML file instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the report
    let default_filter = if cli.silent { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let code = match run(&cli) {
        Ok(true) => EXIT_ALL_MATCH,
        Ok(false) => EXIT_MISMATCH,
        Err(e) => {
            error!("Comparison failed: {:#}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

/// Returns whether every path matched.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    check_root("first", &cli.first)?;
    check_root("second", &cli.second)?;

    let loaded = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if loaded.exists {
        info!("Using configuration from {}", loaded.path.display());
    }
    let config = apply_flags(loaded.config, cli);

    info!("Comparing {} with {}", cli.first.display(), cli.second.display());
    let comparisons = ComparisonEngine::from_config(&config).compare_trees(&cli.first, &cli.second)?;

    let stdout = io::stdout();
    print_report(&mut stdout.lock(), cli, &config, &comparisons)?;

    Ok(all_match(&comparisons))
}

/// Write the report to `out`. A reader that hangs up early (`treecmp a b | head`)
/// does not turn a finished comparison into a failure.
fn print_report<W: Write>(
    out: &mut W,
    cli: &Cli,
    config: &CompareConfig,
    comparisons: &[FullComparison],
) -> anyhow::Result<()> {
    match write_output(out, cli, config, comparisons) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("Output closed early, rest of the report dropped");
            Ok(())
        }
        other => other.context("Failed to write report"),
    }
}

fn write_output<W: Write>(
    out: &mut W,
    cli: &Cli,
    config: &CompareConfig,
    comparisons: &[FullComparison],
) -> io::Result<()> {
    let options = ReportOptions::from(config);
    if cli.json {
        let report = build_json_report(&cli.first, &cli.second, comparisons, &options);
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        out.flush()
    } else {
        write_report(out, comparisons, &options)
    }
}

fn check_root(label: &str, root: &Path) -> anyhow::Result<()> {
    if !root.is_dir() {
        bail!(
            "the {} directory tree {} does not exist or could not be accessed",
            label,
            root.display()
        );
    }
    Ok(())
}

/// Command-line flags switch options on; they never turn off what the config file enables.
fn apply_flags(mut config: CompareConfig, cli: &Cli) -> CompareConfig {
    config.matches |= cli.matches;
    config.pretty |= cli.pretty;
    config.totals |= cli.totals;
    config.silent |= cli.silent;
    config.shallow |= cli.shallow;
    config.parallel |= cli.parallel;
    config
}

#[derive(Serialize)]
struct JsonReport<'a> {
    first: String,
    second: String,
    summary: JsonSummary,
    totals: Totals,
    entries: Vec<&'a FullComparison>,
}

#[derive(Serialize, Default)]
struct JsonSummary {
    total: usize,
    matches: usize,
    type_mismatches: usize,
    content_mismatches: usize,
    only_first: usize,
    only_second: usize,
    neither: usize,
}

fn build_json_report<'a>(
    first: &Path,
    second: &Path,
    comparisons: &'a [FullComparison],
    options: &ReportOptions,
) -> JsonReport<'a> {
    let mut summary = JsonSummary {
        total: comparisons.len(),
        ..JsonSummary::default()
    };

    for comparison in comparisons {
        match comparison.outcome() {
            ComparisonOutcome::Match => summary.matches += 1,
            ComparisonOutcome::TypeMismatch => summary.type_mismatches += 1,
            ComparisonOutcome::ContentMismatch => summary.content_mismatches += 1,
            ComparisonOutcome::OnlyFirstExists => summary.only_first += 1,
            ComparisonOutcome::OnlySecondExists => summary.only_second += 1,
            ComparisonOutcome::NeitherExists => summary.neither += 1,
        }
    }

    // Silent keeps the summary and totals but lists no paths, as in the text report
    let entries = comparisons
        .iter()
        .filter(|c| !options.silent && (options.show_matches || !c.pair.is_match()))
        .collect();

    JsonReport {
        first: first.to_string_lossy().to_string(),
        second: second.to_string_lossy().to_string(),
        summary,
        totals: Totals::from_comparisons(comparisons),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treecmp_common::{EntryKind, PairComparison, RelativePath};

    fn comparison(path: &str, pair: PairComparison) -> FullComparison {
        FullComparison {
            relative_path: RelativePath::new(path).unwrap(),
            first_path: Path::new("/first").join(path),
            second_path: Path::new("/second").join(path),
            pair,
        }
    }

    fn sample() -> Vec<FullComparison> {
        vec![
            comparison(
                "same.txt",
                PairComparison::both(
                    ComparisonOutcome::Match,
                    EntryKind::RegularFile,
                    EntryKind::RegularFile,
                ),
            ),
            comparison("orphan", PairComparison::only_first(EntryKind::Directory)),
            comparison(
                "flip",
                PairComparison::both(
                    ComparisonOutcome::TypeMismatch,
                    EntryKind::Directory,
                    EntryKind::SymbolicLink,
                ),
            ),
        ]
    }

    #[test]
    fn test_cli_parses_short_flags() {
        let cli = Cli::try_parse_from(["treecmp", "-m", "-p", "-t", "-s", "-M", "a", "b"]).unwrap();
        assert!(cli.matches && cli.pretty && cli.totals && cli.silent && cli.parallel);
        assert!(!cli.shallow);
        assert_eq!(cli.first, PathBuf::from("a"));
        assert_eq!(cli.second, PathBuf::from("b"));
    }

    #[test]
    fn test_cli_requires_two_roots() {
        assert!(Cli::try_parse_from(["treecmp", "only_one"]).is_err());
    }

    #[test]
    fn test_flags_extend_config() {
        let cli = Cli::try_parse_from(["treecmp", "--shallow", "a", "b"]).unwrap();
        let file_config = CompareConfig {
            totals: true,
            ..CompareConfig::default()
        };

        let config = apply_flags(file_config, &cli);
        assert!(config.totals);
        assert!(config.shallow);
        assert!(!config.matches);
    }

    fn options(show_matches: bool, silent: bool) -> ReportOptions {
        ReportOptions::from(&CompareConfig {
            matches: show_matches,
            silent,
            ..CompareConfig::default()
        })
    }

    /// Writer whose reader has gone away
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader closed"))
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cli_rejects_silent_json() {
        assert!(Cli::try_parse_from(["treecmp", "-s", "--json", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["treecmp", "--json", "a", "b"]).is_ok());
    }

    #[test]
    fn test_print_report_ignores_closed_pipe() {
        let comparisons = sample();
        for args in [["treecmp", "a", "b", "-m"], ["treecmp", "a", "b", "--json"]] {
            let cli = Cli::try_parse_from(args).unwrap();
            let config = apply_flags(CompareConfig::default(), &cli);
            assert!(print_report(&mut ClosedPipe, &cli, &config, &comparisons).is_ok());
        }
    }

    #[test]
    fn test_print_report_surfaces_other_write_errors() {
        let comparisons = sample();
        let cli = Cli::try_parse_from(["treecmp", "a", "b"]).unwrap();
        let err = print_report(&mut FullDisk, &cli, &CompareConfig::default(), &comparisons)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to write report"));
    }

    #[test]
    fn test_print_report_writes_text_lines() {
        let comparisons = sample();
        let cli = Cli::try_parse_from(["treecmp", "a", "b"]).unwrap();
        let mut out = Vec::new();
        print_report(&mut out, &cli, &CompareConfig::default(), &comparisons).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("is not of the same type as"));
    }

    #[test]
    fn test_build_json_report_counts_everything() {
        let comparisons = sample();
        let report = build_json_report(
            Path::new("/first"),
            Path::new("/second"),
            &comparisons,
            &options(false, false),
        );

        assert_eq!(report.first, "/first");
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.matches, 1);
        assert_eq!(report.summary.only_first, 1);
        assert_eq!(report.summary.type_mismatches, 1);
        // Matches are listed only on request
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.totals.directories.possible, 2);
    }

    #[test]
    fn test_build_json_report_with_matches() {
        let comparisons = sample();
        let report = build_json_report(
            Path::new("/first"),
            Path::new("/second"),
            &comparisons,
            &options(true, false),
        );
        assert_eq!(report.entries.len(), 3);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["entries"][0]["relative_path"], "same.txt");
        assert_eq!(value["entries"][0]["pair"]["outcome"], "Match");
        assert_eq!(value["entries"][1]["pair"]["second_kind"], serde_json::Value::Null);
    }

    #[test]
    fn test_build_json_report_silent_lists_nothing() {
        let comparisons = sample();
        let report = build_json_report(
            Path::new("/first"),
            Path::new("/second"),
            &comparisons,
            &options(true, true),
        );
        assert!(report.entries.is_empty());
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.totals.files.possible, 1);
    }

    #[test]
    fn test_check_root_rejects_missing() {
        assert!(check_root("first", Path::new("/definitely/not/here")).is_err());
    }
}
