//! Detailed per-element trace tool for investigating a single path
//!
//! Prints the band-by-band story of a calculation: what each element
//! attenuated, what it generated, and the running spectrum after it.
//! The fastest way to answer "why did this path come out NC-45?".

use ductband::{PathEngine, BAND_CENTERS_HZ};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: path_trace <request.json> [path_id]");
        std::process::exit(1);
    }

    let data = match std::fs::read_to_string(&args[1]) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let requests = match ductband::parse_requests(&data) {
        Ok(requests) => requests,
        Err(e) => {
            eprintln!("Failed to parse {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let filter = args.get(2);
    let engine = PathEngine::new();

    for request in requests
        .iter()
        .filter(|r| filter.map_or(true, |id| &r.path_id == id))
    {
        println!("\n{}", "=".repeat(70));
        println!("PATH: {}", request.path_id);
        println!("{}", "=".repeat(70));
        trace_path(&engine, request);
    }
}

fn trace_path(engine: &PathEngine, request: &ductband::PathRequest) {
    let result = engine.calculate(request);

    if let Some(error) = &result.error {
        println!("ERROR: {}", error);
        return;
    }

    let header: Vec<String> = BAND_CENTERS_HZ
        .iter()
        .map(|hz| format!("{:>6}", hz))
        .collect();
    println!("\n{:<24} {}", "band (Hz)", header.join(" "));

    for trace in &result.elements {
        println!(
            "\n{} ({})  flow {:.0} CFM, {:.0} fpm",
            trace.id, trace.kind, trace.flow_cfm, trace.velocity_fpm
        );
        print_row("  attenuation", &trace.attenuation.levels);
        print_row("  generated", &trace.generated.levels);
        print_row("  spectrum after", &trace.after.levels);
    }

    println!("\n{}", "-".repeat(70));
    print_row("terminal spectrum", &result.terminal_spectrum.levels);
    println!(
        "\nResult: {} at {:.1} dB(A), verdict {}",
        result.nc, result.a_weighted_db, result.verdict
    );
    if !result.warnings.is_empty() {
        println!("Warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}

fn print_row(label: &str, levels: &[f64]) {
    let cells: Vec<String> = levels.iter().map(|l| format!("{:>6.1}", l)).collect();
    println!("{:<24} {}", label, cells.join(" "));
}
