use std::env;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::compare::{CompareOptions, Tolerance};
use crate::error::{Result, ValidationError};
use crate::filter::{LineFilter, DEFAULT_IGNORE_PATTERN};
use crate::launcher::LaunchMode;
use crate::plugin::OutputCategory;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run two simulation builds with identical inputs and compare their outputs
    Run(RunArgs),
    /// Compare two output files field by field
    Compare(CompareArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct CompareFlags {
    /// Number of leading header lines to ignore in both files
    #[arg(long = "skip-header", default_value_t = 0)]
    pub skip_header: usize,

    /// Absolute tolerance for numeric fields (exact comparison when unset)
    #[arg(long)]
    pub abs_tol: Option<f64>,

    /// Relative tolerance for numeric fields (exact comparison when unset)
    #[arg(long)]
    pub rel_tol: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Candidate simulation binary
    #[arg(short = 'n', long)]
    pub new_binary: PathBuf,

    /// Reference simulation binary; without it, existing reference output is reused
    #[arg(short = 'o', long)]
    pub old_binary: Option<PathBuf>,

    /// Configuration file passed to both runs
    #[arg(short = 'c', long)]
    pub cfg: PathBuf,

    /// Input (phase space) file referenced by the configuration
    #[arg(short = 'i', long)]
    pub inp: PathBuf,

    /// Number of MPI ranks; runs sequentially when omitted
    #[arg(short = 'm', long)]
    pub mpi: Option<u32>,

    /// Program used to start parallel runs
    #[arg(long, default_value = "mpirun")]
    pub mpi_launcher: String,

    /// Output plugin to compare (repeatable): ResultWriter, GammaWriter, RDF
    #[arg(short = 'p', long = "plugin")]
    pub plugins: Vec<String>,

    /// Number of simulation timesteps
    #[arg(short = 'I', long, default_value_t = 25)]
    pub iterations: u64,

    /// Regex for output lines to drop before comparing (repeatable)
    #[arg(long = "ignore-line", default_value = DEFAULT_IGNORE_PATTERN)]
    pub ignore_lines: Vec<String>,

    /// Directory holding the `new` and `reference` run directories
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Write the per-plugin summary as JSON
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    #[command(flatten)]
    pub compare: CompareFlags,
}

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Reference file (A)
    pub reference: PathBuf,

    /// Candidate file (B)
    pub candidate: PathBuf,

    /// Also print a line diff of the two files
    #[arg(long)]
    pub show_diff: bool,

    #[command(flatten)]
    pub compare: CompareFlags,
}

/// Everything a validation run needs, resolved once from the command line.
#[derive(Debug)]
pub struct RunConfig {
    pub new_binary: PathBuf,
    pub old_binary: Option<PathBuf>,
    pub cfg: PathBuf,
    pub inp: PathBuf,
    pub iterations: u64,
    pub launch: LaunchMode,
    pub categories: Vec<OutputCategory>,
    pub filter: LineFilter,
    pub compare: CompareOptions,
    pub work_dir: PathBuf,
    pub json_report: Option<PathBuf>,
}

impl RunConfig {
    pub fn has_reference_run(&self) -> bool {
        self.old_binary.is_some()
    }
}

fn require_file(path: &Path, what: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ValidationError::configuration(format!(
            "{what} not found: {}",
            path.display()
        )))
    }
}

pub fn build_compare_options(flags: &CompareFlags) -> Result<CompareOptions> {
    let tolerance = match (flags.abs_tol, flags.rel_tol) {
        (None, None) => Tolerance::Exact,
        (abs, rel) => {
            let abs = abs.unwrap_or(0.0);
            let rel = rel.unwrap_or(0.0);
            if !(abs >= 0.0 && rel >= 0.0) {
                return Err(ValidationError::configuration(
                    "tolerances must be non-negative numbers",
                ));
            }
            Tolerance::Within { abs, rel }
        }
    };

    Ok(CompareOptions {
        skip_header_lines: flags.skip_header,
        tolerance,
    })
}

pub fn parse_categories(names: &[String]) -> Result<Vec<OutputCategory>> {
    if names.is_empty() {
        return Ok(OutputCategory::ALL.to_vec());
    }
    let mut categories = Vec::new();
    for name in names {
        let category: OutputCategory = name.parse()?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

pub fn build_run_config(args: &RunArgs) -> Result<RunConfig> {
    require_file(&args.new_binary, "New binary")?;
    if let Some(old) = &args.old_binary {
        require_file(old, "Reference binary")?;
    }
    require_file(&args.cfg, "Configuration file")?;
    require_file(&args.inp, "Input file")?;

    let launch = match args.mpi {
        None => LaunchMode::Sequential,
        Some(0) => {
            return Err(ValidationError::configuration(
                "MPI rank count must be at least 1",
            ))
        }
        Some(ranks) => LaunchMode::Parallel {
            launcher: args.mpi_launcher.clone(),
            ranks,
        },
    };

    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };

    Ok(RunConfig {
        new_binary: args.new_binary.clone(),
        old_binary: args.old_binary.clone(),
        cfg: args.cfg.clone(),
        inp: args.inp.clone(),
        iterations: args.iterations,
        launch,
        categories: parse_categories(&args.plugins)?,
        filter: LineFilter::new(&args.ignore_lines)?,
        compare: build_compare_options(&args.compare)?,
        work_dir,
        json_report: args.json_report.clone(),
    })
}
