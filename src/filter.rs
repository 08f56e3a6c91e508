use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, ValidationError};
use crate::utils::{read_text_best_effort, split_newline};

/// Banner and timestamp lines written by the simulation.
pub const DEFAULT_IGNORE_PATTERN: &str = "[Mm]ar[Dd]yn";

/// Drops lines matching any of a set of patterns.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    patterns: Vec<Regex>,
}

impl LineFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                if p.is_empty() {
                    // an empty regex matches every line
                    return Err(ValidationError::configuration(
                        "empty ignore pattern would drop every line",
                    ));
                }
                Ok(Regex::new(p)?)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(line))
    }

    /// Returns `text` without ignored lines, plus how many were removed.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut kept = String::with_capacity(text.len());
        let mut removed = 0;
        for line in text.split_inclusive('\n') {
            let (content, _) = split_newline(line);
            if self.is_ignored(content) {
                removed += 1;
            } else {
                kept.push_str(line);
            }
        }
        (kept, removed)
    }

    /// Rewrites `path` in place, keeping the original as `<path>.bak`.
    pub fn strip_file(&self, path: &Path) -> Result<usize> {
        let text = read_text_best_effort(path)?;
        let (kept, removed) = self.apply(&text);

        fs::copy(path, backup_path(path))?;
        fs::write(path, kept)?;

        log::debug!("removed {removed} ignored line(s) from {}", path.display());
        Ok(removed)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}
