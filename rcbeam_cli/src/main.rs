//! # rcbeam CLI
//!
//! Command-line front end for `rcbeam_core`.
//!
//! ```text
//! rcbeam check beam.json
//! rcbeam design search.json --output best.json
//! rcbeam parity corpus.json --tolerance 1e-6
//! rcbeam tables
//! ```
//!
//! Every command prints a short human summary followed by the JSON result.

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use rcbeam_core::checks::CheckResult;
use rcbeam_core::code_tables::TableSet;
use rcbeam_core::compliance::ComplianceVerdict;
use rcbeam_core::config::EngineConfig;
use rcbeam_core::file_io::{load_check_request, load_design_request, load_parity_corpus, save_record};
use rcbeam_core::optimizer::{Completeness, SearchOutcome, SearchReport};
use rcbeam_core::parity::{run_corpus, ParityReport, Tolerance};
use rcbeam_core::request::RunRecord;

#[derive(Parser)]
#[command(name = "rcbeam")]
#[command(about = "Reinforced concrete beam checks and section optimization")]
#[command(version)]
struct Cli {
    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Save the run record as JSON (atomic write)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Print only the JSON result
    #[arg(long, global = true)]
    json: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a fully specified beam against every design rule
    Check {
        /// Check request (JSON)
        request: PathBuf,
    },

    /// Search a grid of sections for the cheapest compliant design
    Design {
        /// Design request (JSON)
        request: PathBuf,
    },

    /// Compare this engine against a corpus of expected results
    Parity {
        /// Parity corpus (JSON)
        corpus: PathBuf,

        /// Relative tolerance
        #[arg(short, long, default_value = "1e-6")]
        tolerance: f64,

        /// Absolute tolerance
        #[arg(long, default_value = "1e-9")]
        absolute: f64,
    },

    /// Dump the design tables in use
    Tables,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match &cli.command {
        Commands::Check { request } => {
            let request = load_check_request(request).with_context(|| format!("loading {}", request.display()))?;
            let verdict = request.run(&config);
            if !cli.json {
                print_verdict(&verdict);
            }
            emit(&cli, &RunRecord::new(request.label.clone(), verdict))?;
        }
        Commands::Design { request } => {
            let request =
                load_design_request(request).with_context(|| format!("loading {}", request.display()))?;
            let report = request.run(&config)?;
            if !cli.json {
                print_search(&report);
            }
            emit(&cli, &RunRecord::new(request.label.clone(), report))?;
        }
        Commands::Parity {
            corpus,
            tolerance,
            absolute,
        } => {
            let corpus = load_parity_corpus(corpus).with_context(|| format!("loading {}", corpus.display()))?;
            let tolerance = Tolerance {
                relative: *tolerance,
                absolute: *absolute,
            };
            let report = run_corpus(&corpus.cases, &config, tolerance);
            if !cli.json {
                print_parity(&report);
            }
            emit(&cli, &RunRecord::new(None, report.clone()))?;
            if !report.is_clean() {
                bail!("{} parity mismatch(es)", report.mismatches.len());
            }
        }
        Commands::Tables => {
            emit(&cli, &RunRecord::new(None, TableSet::snapshot().with_shear_config(&config.shear)))?;
        }
    }
    Ok(())
}

/// Print the record as JSON and save it when requested.
fn emit<T: Serialize>(cli: &Cli, record: &RunRecord<T>) -> Result<()> {
    if !cli.json {
        println!();
        println!("JSON Output:");
    }
    println!("{}", serde_json::to_string_pretty(record)?);
    if let Some(path) = &cli.output {
        save(record, path)?;
    }
    Ok(())
}

fn save<T: Serialize>(record: &RunRecord<T>, path: &Path) -> Result<()> {
    save_record(record, path).with_context(|| format!("saving {}", path.display()))?;
    tracing::info!(path = %path.display(), run_id = %record.run_id, "run record saved");
    Ok(())
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}

fn print_result(result: &CheckResult) {
    println!(
        "  {:<24} {:>6.3} {}",
        result.check.display_name(),
        result.ratio,
        status_icon(result.passed)
    );
    if let Some(reason) = &result.reason {
        println!("      {}", reason);
    }
}

fn print_verdict(verdict: &ComplianceVerdict) {
    println!("═══════════════════════════════════════");
    println!("  COMPLIANCE CHECK");
    println!("═══════════════════════════════════════");
    for result in &verdict.results {
        print_result(result);
    }
    println!("═══════════════════════════════════════");
    let governing = verdict.governing().map_or("none", |r| r.check.display_name());
    println!(
        "  RESULT: {} (governs: {})",
        if verdict.passed { "PASS" } else { "FAIL" },
        governing
    );
}

fn print_search(report: &SearchReport) {
    println!("═══════════════════════════════════════");
    println!("  DESIGN SEARCH");
    println!("═══════════════════════════════════════");
    println!("  Grid points: {}", report.grid_size);
    println!("  Evaluated:   {}", report.evaluated);
    println!("  Compliant:   {}", report.compliant);
    if let Completeness::Truncated { budget, .. } = report.completeness {
        println!("  Search cut short by {:?} budget", budget);
    }
    match &report.outcome {
        SearchOutcome::Designed { candidates } => {
            for (rank, c) in candidates.iter().enumerate() {
                println!(
                    "  #{:<2} {:>4.0}×{:<4.0} {} {}  cost {:>10.2}  weight {:>8.1} kg",
                    rank + 1,
                    c.section.width_mm(),
                    c.section.overall_depth_mm(),
                    c.section.concrete(),
                    c.section.steel(),
                    c.cost.total_cost,
                    c.cost.weight_kg
                );
            }
        }
        SearchOutcome::NoCompliant { reason } => {
            println!("  No compliant design: {}", reason.description());
        }
    }
}

fn print_parity(report: &ParityReport) {
    println!(
        "Parity: {}/{} cases agree (rel {:e}, abs {:e})",
        report.agreeing, report.cases, report.tolerance.relative, report.tolerance.absolute
    );
    for m in &report.mismatches {
        println!("  {}: {} expected {} got {}", m.case, m.field, m.expected, m.actual);
    }
}
