//! # CLI Module
//!
//! Command-line interface for the image similarity engine.
//!
//! ## Usage
//! ```bash
//! # Find similar images under a directory
//! cuttle scan ~/Pictures
//!
//! # Check a new folder against a reference folder (no intra-folder pairs)
//! cuttle scan ~/incoming ~/archive --threshold 0.9
//!
//! # JSON output
//! cuttle scan ~/Pictures --output json
//!
//! # Score two files directly
//! cuttle compare a.jpg b.jpg
//! ```

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use cuttle::core::fingerprint::{DefaultCodec, FingerprintGenerator, FingerprintRecord, ImageCodec};
use cuttle::core::processor::{Processor, ResultSet, DEFAULT_RESOLUTION, DEFAULT_THRESHOLD};
use cuttle::core::reporter::{PairReport, Relation};
use cuttle::core::scanner::ScanRoot;
use cuttle::core::similarity::SimilarityEngine;
use cuttle::core::{MatchEntry, ProcessorState, RecordId};
use cuttle::error::Result;
use cuttle::events::{Event, EventChannel, LifecycleEvent, ProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// cuttle - find visually similar images and rank them for review
#[derive(Parser, Debug)]
#[command(name = "cuttle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan directories and list similar images
    Scan {
        /// Directories to scan. With several, files are only compared across directories.
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Only look at the top level of each directory
        #[arg(long)]
        no_recurse: bool,

        /// Side of the comparison grid
        #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: u16,

        /// Minimum similarity to report (0.0-1.0)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        workers: Option<usize>,

        /// Try every file, not just known image extensions
        #[arg(long)]
        all_files: bool,

        /// Include hidden files
        #[arg(long)]
        include_hidden: bool,
    },

    /// Compare two image files
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Side of the comparison grid
        #[arg(short, long, default_value_t = DEFAULT_RESOLUTION)]
        resolution: u16,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (score and paths, tab separated)
    Minimal,
}

/// One reported pair
struct Match<'a> {
    first: &'a FingerprintRecord,
    second: &'a FingerprintRecord,
    entry: MatchEntry,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            roots,
            no_recurse,
            resolution,
            threshold,
            output,
            workers,
            all_files,
            include_hidden,
        } => {
            let roots = roots
                .into_iter()
                .map(|path| ScanRoot::new(path, !no_recurse))
                .collect();
            let options = ScanOptions {
                resolution,
                workers,
                all_files,
                include_hidden,
            };
            run_scan(roots, options, threshold, output)
        }
        Commands::Compare {
            first,
            second,
            resolution,
        } => run_compare(first, second, resolution),
    }
}

struct ScanOptions {
    resolution: u16,
    workers: Option<usize>,
    all_files: bool,
    include_hidden: bool,
}

fn run_scan(
    roots: Vec<ScanRoot>,
    options: ScanOptions,
    threshold: f32,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();

    // Print header
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("cuttle").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();

    let mut builder = Processor::builder()
        .resolution(options.resolution)
        .all_files(options.all_files)
        .include_hidden(options.include_hidden)
        .events(sender);
    if let Some(workers) = options.workers {
        builder = builder.workers(workers);
    }
    let mut processor = builder.build()?;

    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        if let Ok(template) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(template.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread until the run finishes
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                if event == Event::Lifecycle(LifecycleEvent::Finished) {
                    break;
                }
                continue;
            };
            match event {
                Event::Progress(ProgressEvent::Stage(stage)) => {
                    pb.set_message(stage.label().replace(" %p%", ""));
                }
                Event::Progress(ProgressEvent::Max { max }) => pb.set_length(max),
                Event::Progress(ProgressEvent::Value { value }) => pb.set_position(value),
                Event::Lifecycle(LifecycleEvent::Finished) => {
                    pb.finish_and_clear();
                    break;
                }
                Event::Lifecycle(LifecycleEvent::Started) => {}
            }
        }
    });

    let state = processor.run(roots)?;
    event_thread.join().ok();

    if state != ProcessorState::Completed {
        term.write_line(&format!("{} Scan stopped", style("✗").red().bold()))
            .ok();
        return Ok(());
    }

    let Some(results) = processor.results() else {
        return Ok(());
    };
    let matches = collect_matches(&results, threshold);

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &results, &matches, threshold),
        OutputFormat::Json => print_json_results(&results, &matches, threshold)?,
        OutputFormat::Minimal => print_minimal_results(&matches),
    }

    Ok(())
}

/// Every live pair at or above `threshold`, best first
fn collect_matches(results: &ResultSet, threshold: f32) -> Vec<Match<'_>> {
    let mut matches = Vec::new();
    for anchor in results.sets_above_threshold(threshold) {
        let Ok(partners) = results.sets_above_threshold_for(anchor, threshold) else {
            continue;
        };
        for partner in partners.into_iter().filter(|&p| p > anchor) {
            if let Some(m) = make_match(results, anchor, partner) {
                matches.push(m);
            }
        }
    }
    matches.sort_by(|a, b| b.entry.value.total_cmp(&a.entry.value));
    matches
}

fn make_match(results: &ResultSet, a: RecordId, b: RecordId) -> Option<Match<'_>> {
    Some(Match {
        first: results.record(a)?,
        second: results.record(b)?,
        entry: results.match_score(a, b).ok()?,
    })
}

fn print_pretty_results(term: &Term, results: &ResultSet, matches: &[Match<'_>], threshold: f32) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} images compared",
        style(results.live_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} pairs at or above {:.0}%",
        style(matches.len()).cyan(),
        threshold * 100.0
    ))
    .ok();
    let identical = matches.iter().filter(|m| m.entry.identical).count();
    if identical > 0 {
        term.write_line(&format!(
            "  {} identical pairs",
            style(identical).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    if matches.is_empty() {
        term.write_line(&format!("  {}", style("No similar images found.").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Matches:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for m in matches {
            let score = if m.entry.identical {
                style("identical".to_string()).green().bold()
            } else {
                style(format!("{:.1}%", m.entry.value * 100.0)).yellow()
            };
            term.write_line(&format!("  {}", score)).ok();
            term.write_line(&format!("    {}", m.first.path().display()))
                .ok();
            term.write_line(&format!("    {}", m.second.path().display()))
                .ok();
            term.write_line("").ok();
        }
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style("Remember: No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn print_json_results(results: &ResultSet, matches: &[Match<'_>], threshold: f32) -> Result<()> {
    let output = serde_json::json!({
        "images": results.live_count(),
        "threshold": threshold,
        "matches": matches.iter().map(|m| {
            serde_json::json!({
                "first": m.first.path(),
                "second": m.second.path(),
                "score": m.entry.value,
                "identical": m.entry.identical,
            })
        }).collect::<Vec<_>>()
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_minimal_results(matches: &[Match<'_>]) {
    for m in matches {
        println!(
            "{:.4}\t{}\t{}",
            m.entry.value,
            m.first.path().display(),
            m.second.path().display()
        );
    }
}

fn run_compare(first: PathBuf, second: PathBuf, resolution: u16) -> Result<()> {
    let term = Term::stdout();
    let codec: Arc<dyn ImageCodec> = Arc::new(DefaultCodec);
    let generator = FingerprintGenerator::new(codec.clone());
    let engine = SimilarityEngine::new(codec.clone());

    let mut a = FingerprintRecord::new(first, 0);
    let mut b = FingerprintRecord::new(second, 0);
    generator.generate(&mut a, resolution)?;
    generator.generate(&mut b, resolution)?;

    let entry = engine.compare(&a, &b);
    let report = PairReport::build(codec.as_ref(), &a, &b);

    let score = if entry.identical {
        style("identical".to_string()).green().bold()
    } else {
        style(format!("{:.1}%", entry.value * 100.0)).yellow().bold()
    };
    term.write_line(&format!("Similarity: {}", score)).ok();
    term.write_line("").ok();

    for (record, side) in [(&a, &report.first), (&b, &report.second)] {
        term.write_line(&format!("{}", style(record.path().display()).bold()))
            .ok();
        if let Some((w, h)) = record.dimensions() {
            term.write_line(&format!("  {}×{} {}", w, h, relation(side.area)))
                .ok();
        }
        if let Some(size) = record.file_size() {
            term.write_line(&format!("  {} {}", format_bytes(size), relation(side.size)))
                .ok();
        }
        if let Some(modified) = record.modified() {
            let modified: DateTime<Local> = modified.into();
            term.write_line(&format!(
                "  modified {} {}",
                modified.format("%Y-%m-%d %H:%M"),
                relation(side.modified)
            ))
            .ok();
        }
    }

    if report.pixels_equal {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Pixels are identical.").green()))
            .ok();
    }

    Ok(())
}

fn relation(relation: Option<Relation>) -> String {
    match relation {
        Some(Relation::Higher) => style("(higher)").green().to_string(),
        Some(Relation::Same) => style("(same)").dim().to_string(),
        Some(Relation::Lower) => style("(lower)").red().to_string(),
        None => String::new(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn cli_parses_scan_flags() {
        let cli = Cli::try_parse_from([
            "cuttle", "scan", "/a", "/b", "--no-recurse", "-r", "16", "-t", "0.9", "-o", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Scan {
                roots,
                no_recurse,
                resolution,
                threshold,
                ..
            } => {
                assert_eq!(roots.len(), 2);
                assert!(no_recurse);
                assert_eq!(resolution, 16);
                assert_eq!(threshold, 0.9);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
