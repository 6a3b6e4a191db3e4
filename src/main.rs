use chrono::Local;
use clap::Parser;
use ductband::{report, PathEngine, PathRequest, PathResult, Verdict};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "ductband")]
#[command(author, version, about = "Octave-band noise propagation and NC ratings for HVAC duct paths")]
struct Args {
    /// Path-description JSON file, or a directory of them
    path: PathBuf,

    /// Output report file (.csv, .json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for auto-generated reports
    #[arg(long, default_value = "ductband-reports")]
    report_dir: PathBuf,

    /// Don't auto-generate CSV report
    #[arg(long)]
    no_report: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Design NC target paths are judged against
    #[arg(long, default_value = "35")]
    nc_limit: u8,

    /// Show per-band terminal levels and warnings
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    // Collect path-description files
    let files: Vec<PathBuf> = if args.path.is_dir() {
        WalkDir::new(&args.path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect()
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("No path-description files found (expected .json)");
        std::process::exit(1);
    }

    // Load requests; unreadable files are reported and skipped
    let mut requests: Vec<PathRequest> = Vec::new();
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(data) => match ductband::parse_requests(&data) {
                Ok(parsed) => requests.extend(parsed),
                Err(e) => eprintln!("Skipping {}: {}", file.display(), e),
            },
            Err(e) => eprintln!("Skipping {}: {}", file.display(), e),
        }
    }

    if requests.is_empty() {
        eprintln!("No calculable paths found in {} file(s)", files.len());
        std::process::exit(1);
    }

    if !args.quiet {
        eprintln!("\x1b[1mDuctband - HVAC Path Noise Calculator\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} path(s) in {} file(s)\n", requests.len(), files.len());
    }

    // Set up progress bar
    let pb = if !args.quiet && requests.len() > 1 {
        let pb = ProgressBar::new(requests.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let engine = PathEngine::new().with_nc_target(args.nc_limit);

    // Calculate paths in parallel
    let results: Vec<PathResult> = requests
        .par_iter()
        .map(|request| {
            let result = engine.calculate(request);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(result.path_id.clone());
            }
            result
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    // Print results
    if !args.quiet {
        for r in &results {
            let color = match r.verdict {
                Verdict::Pass => "\x1b[32m",     // Green
                Verdict::Marginal => "\x1b[33m", // Yellow
                Verdict::Exceed => "\x1b[31m",   // Red
                Verdict::Error => "\x1b[90m",    // Gray
            };
            let reset = "\x1b[0m";

            let note = if let Some(ref error) = r.error {
                error.clone()
            } else if r.warnings.is_empty() {
                "-".to_string()
            } else {
                r.warnings.join(",")
            };

            println!(
                "{}{:<10}{} {:>6}  {:>6.1}dB(A)  {:<30}  {}",
                color,
                format!("[{}]", r.verdict),
                reset,
                r.nc.to_string(),
                r.a_weighted_db,
                truncate(&note, 30),
                &r.path_id
            );

            if args.verbose && r.error.is_none() {
                let bands: Vec<String> = r
                    .terminal_spectrum
                    .levels
                    .iter()
                    .map(|l| format!("{:5.1}", l))
                    .collect();
                eprintln!("    Bands 63Hz..8kHz: {}", bands.join(" "));
                for warning in &r.warnings {
                    eprintln!("    Warning: {}", warning);
                }
            }
        }
    }

    // Summary
    let summary = report::Summary::from_results(&results);

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary (target NC-{}):\x1b[0m", args.nc_limit);
        eprintln!("  \x1b[32m✓ Pass:\x1b[0m     {}", summary.pass);
        eprintln!("  \x1b[33m? Marginal:\x1b[0m {}", summary.marginal);
        eprintln!("  \x1b[31m✗ Exceed:\x1b[0m   {}", summary.exceed);
        if summary.error > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m     {}", summary.error);
        }
    }

    // Determine report path
    let report_path = if let Some(ref output) = args.output {
        Some(output.clone())
    } else if !args.no_report {
        // Auto-generate report
        std::fs::create_dir_all(&args.report_dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("ductband_report_{}.csv", timestamp);
        Some(args.report_dir.join(filename))
    } else {
        None
    };

    // Generate report
    if let Some(ref output_path) = report_path {
        if let Err(e) = report::generate(output_path, &results) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
        }
    }

    if !args.quiet {
        eprintln!("\n\x1b[90mCalculation complete.\x1b[0m");
    }

    // Exit with appropriate code
    if summary.exceed + summary.error > 0 {
        std::process::exit(2);
    } else if summary.marginal > 0 {
        std::process::exit(1);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
