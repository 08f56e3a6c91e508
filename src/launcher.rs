use std::fs;
use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    Sequential,
    Parallel { launcher: String, ranks: u32 },
}

/// Program and arguments for one simulation run, relative to the run directory.
pub fn command_line(
    mode: &LaunchMode,
    binary_name: &str,
    cfg_name: &str,
    iterations: u64,
) -> Vec<String> {
    let mut cmd = Vec::new();
    if let LaunchMode::Parallel { launcher, ranks } = mode {
        cmd.extend([launcher.clone(), "-n".to_string(), ranks.to_string()]);
    }
    cmd.extend([
        format!("./{binary_name}"),
        "--final-checkpoint=0".to_string(),
        cfg_name.to_string(),
        iterations.to_string(),
    ]);
    cmd
}

/// Runs the simulation inside `run_dir`, saving its output as `run.stdout` / `run.stderr`.
pub fn launch(run_dir: &Path, cmd: &[String]) -> Result<ExitStatus> {
    let (program, args) = cmd
        .split_first()
        .ok_or_else(|| ValidationError::execution("empty command line"))?;

    log::info!("{}$ {}", run_dir.display(), cmd.join(" "));

    let output = Command::new(program)
        .args(args)
        .current_dir(run_dir)
        .output()
        .map_err(|e| ValidationError::execution(format!("failed to start {program}: {e}")))?;

    fs::write(run_dir.join("run.stdout"), &output.stdout)?;
    fs::write(run_dir.join("run.stderr"), &output.stderr)?;

    if !output.status.success() {
        log::warn!(
            "{program} exited with {} in {} (see run.stderr)",
            output.status,
            run_dir.display()
        );
    }
    Ok(output.status)
}
