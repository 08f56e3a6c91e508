use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::cli::RunConfig;
use crate::error::{Result, ValidationError};
use crate::filter::LineFilter;
use crate::plugin::OutputCategory;
use crate::utils::newest_matching;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    New,
    Reference,
}

impl RunKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            RunKind::New => "new",
            RunKind::Reference => "reference",
        }
    }
}

/// Root directory holding one working directory per run.
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    pub root: PathBuf,
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ValidationError::configuration(format!("not a file path: {}", path.display()))
        })
}

/// Removes everything inside `dir`, keeping `dir` itself.
pub fn clear_dir(dir: &Path) -> Result<()> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

impl RunWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn run_dir(&self, kind: RunKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn output_path(&self, kind: RunKind, category: OutputCategory) -> PathBuf {
        self.run_dir(kind).join(category.comparison_file_name())
    }

    /// Cleans the run directories and stages inputs for every run that will execute.
    pub fn prepare(&self, config: &RunConfig) -> Result<()> {
        for kind in [RunKind::New, RunKind::Reference] {
            fs::create_dir_all(self.run_dir(kind))?;
        }

        clear_dir(&self.run_dir(RunKind::New))?;
        self.stage(RunKind::New, &config.new_binary, config)?;

        match &config.old_binary {
            Some(old) => {
                clear_dir(&self.run_dir(RunKind::Reference))?;
                self.stage(RunKind::Reference, old, config)?;
            }
            None => log::info!(
                "no reference binary given; reusing existing output in {}",
                self.run_dir(RunKind::Reference).display()
            ),
        }
        Ok(())
    }

    fn stage(&self, kind: RunKind, binary: &Path, config: &RunConfig) -> Result<()> {
        let dir = self.run_dir(kind);
        for src in [binary, config.cfg.as_path(), config.inp.as_path()] {
            let dst = dir.join(file_name_of(src)?);
            fs::copy(src, &dst).map_err(|e| {
                ValidationError::configuration(format!("cannot stage {}: {e}", src.display()))
            })?;
        }

        let cfg_copy = dir.join(file_name_of(&config.cfg)?);
        let mut cfg = OpenOptions::new().append(true).open(&cfg_copy)?;
        writeln!(cfg)?;
        for category in &config.categories {
            for line in category.config_lines() {
                writeln!(cfg, "{line}")?;
            }
        }

        log::debug!("staged {} run in {}", kind.dir_name(), dir.display());
        Ok(())
    }

    /// Brings a finished run's outputs into comparable form.
    ///
    /// Timestep-suffixed outputs are reduced to their newest file, then
    /// ignored lines are stripped. Missing outputs are left for the
    /// comparison step to report.
    pub fn collect_outputs(
        &self,
        kind: RunKind,
        categories: &[OutputCategory],
        filter: &LineFilter,
    ) -> Result<()> {
        let dir = self.run_dir(kind);

        for category in categories {
            let target = dir.join(category.comparison_file_name());

            if let Some(pattern) = category.timestep_glob() {
                if let Some(newest) = newest_matching(&dir, &pattern)? {
                    if newest != target {
                        fs::rename(&newest, &target)?;
                    }
                }
            }

            if target.is_file() {
                filter.strip_file(&target)?;
            } else {
                log::debug!("{} produced no {}", kind.dir_name(), target.display());
            }
        }
        Ok(())
    }
}
