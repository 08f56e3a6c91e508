use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use valrun::cli::{CompareArgs, RunArgs};
use valrun::compare::annotate_line_diff;
use valrun::{
    build_compare_options, build_run_config, compare_files, run_validation, Args,
    CategoryOutcome, Command, ValidationSummary,
};

fn print_summary(summary: &ValidationSummary) {
    println!();
    println!("== valrun: Summary ==");
    for result in &summary.results {
        match &result.outcome {
            CategoryOutcome::Identical => println!("{:<14} identical", result.category),
            CategoryOutcome::Mismatched { count } => {
                println!("{:<14} {count} mismatch(es)", result.category)
            }
            CategoryOutcome::Failed { error } => {
                println!("{:<14} failed: {error}", result.category)
            }
        }
    }
    println!();
    if summary.all_identical() {
        println!("Identical values!");
    } else {
        println!("Mismatches ({} total)", summary.total_mismatches());
    }
}

fn run(args: &RunArgs) -> Result<bool> {
    let config = build_run_config(args).context("Invalid run configuration")?;
    let summary = run_validation(&config).context("Validation run failed")?;
    print_summary(&summary);
    if let Some(path) = &config.json_report {
        println!("Report at:            {:?}", path);
    }
    Ok(summary.all_identical())
}

fn compare(args: &CompareArgs) -> Result<bool> {
    let opts = build_compare_options(&args.compare)?;
    let comparison = compare_files(&args.reference, &args.candidate, &opts)
        .with_context(|| format!("Cannot compare {:?} with {:?}", args.reference, args.candidate))?;

    for m in &comparison.mismatches {
        println!("{m}");
    }
    if args.show_diff && !comparison.is_identical() {
        print!("{}", annotate_line_diff(&args.reference, &args.candidate)?);
    }
    println!("Mismatches: {}", comparison.count());
    Ok(comparison.is_identical())
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let outcome = match &args.command {
        Command::Run(run_args) => run(run_args),
        Command::Compare(compare_args) => compare(compare_args),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
