use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use sha2::{Digest, Sha256};

use crate::error::{Result, ValidationError};

fn open_error(path: &Path, err: io::Error) -> ValidationError {
    if err.kind() == ErrorKind::NotFound {
        ValidationError::missing_output(path)
    } else {
        ValidationError::Io(err)
    }
}

/// Reads a text file, falling back to Windows-1252 when it is not UTF-8.
pub fn read_text_best_effort(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| open_error(path, e))?;
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            let bytes = err.into_bytes();
            let (res, _, _) = WINDOWS_1252.decode(&bytes);
            res.into_owned()
        }
    };
    Ok(content)
}

pub fn file_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

pub fn file_bytes_equal(p1: &Path, p2: &Path) -> Result<bool> {
    Ok(file_digest(p1)? == file_digest(p2)?)
}

/// Most recently modified file matching `pattern` inside `dir`, if any.
pub fn newest_matching(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let full = Path::new(&glob::Pattern::escape(&dir.to_string_lossy())).join(pattern);
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    // glob yields paths in order, so ties go to the later timestep name
    for entry in glob::glob(&full.to_string_lossy())? {
        let path = match entry {
            Ok(p) => p,
            Err(err) => {
                log::debug!("skipping unreadable glob entry: {err}");
                continue;
            }
        };
        let modified = fs::metadata(&path)?.modified()?;
        match &newest {
            Some((t, _)) if *t > modified => {}
            _ => newest = Some((modified, path)),
        }
    }

    Ok(newest.map(|(_, p)| p))
}

pub fn split_newline(s: &str) -> (&str, &str) {
    if let Some(stripped) = s.strip_suffix('\n') {
        (stripped, "\n")
    } else {
        (s, "")
    }
}
