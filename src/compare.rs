use std::fmt;
use std::path::Path;

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::error::Result;
use crate::utils::{file_bytes_equal, read_text_best_effort, split_newline};

/// How two numeric fields that differ textually are judged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Tolerance {
    #[default]
    Exact,
    /// Equal when either the absolute or the relative difference is small enough.
    Within { abs: f64, rel: f64 },
}

impl Tolerance {
    pub fn accepts(&self, a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        match *self {
            Tolerance::Exact => false,
            Tolerance::Within { abs, rel } => {
                let delta = (a - b).abs();
                delta <= abs || delta <= rel * a.abs().max(b.abs())
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    /// Leading lines whose fields are not compared.
    pub skip_header_lines: usize,
    pub tolerance: Tolerance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MismatchKind {
    Field {
        column: usize,
        left: String,
        right: String,
    },
    FieldCount {
        left: usize,
        right: usize,
    },
    /// Line present only on `side`.
    MissingLine { side: Side, content: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    /// 1-based line number in the original files (header lines included).
    pub line: usize,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MismatchKind::Field {
                column,
                left,
                right,
            } => write!(
                f,
                "line {}, field {}: {} != {}",
                self.line, column, left, right
            ),
            MismatchKind::FieldCount { left, right } => write!(
                f,
                "line {}: {} fields vs {} fields",
                self.line, left, right
            ),
            MismatchKind::MissingLine { side, content } => {
                let which = match side {
                    Side::Left => "first",
                    Side::Right => "second",
                };
                write!(f, "line {}: only in {} file: {}", self.line, which, content)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    pub fn count(&self) -> usize {
        self.mismatches.len()
    }

    pub fn is_identical(&self) -> bool {
        self.mismatches.is_empty()
    }
}

fn fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|s| !s.is_empty())
        .collect()
}

fn fields_match(a: &str, b: &str, tolerance: Tolerance) -> bool {
    if a == b {
        return true;
    }
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => tolerance.accepts(x, y),
        _ => false,
    }
}

fn compare_lines(
    line_no: usize,
    a: &str,
    b: &str,
    tolerance: Tolerance,
    out: &mut Vec<Mismatch>,
) {
    let fa = fields(a);
    let fb = fields(b);

    if fa.len() != fb.len() {
        out.push(Mismatch {
            line: line_no,
            kind: MismatchKind::FieldCount {
                left: fa.len(),
                right: fb.len(),
            },
        });
    }

    for (column, (x, y)) in fa.iter().zip(fb.iter()).enumerate() {
        if !fields_match(x, y, tolerance) {
            out.push(Mismatch {
                line: line_no,
                kind: MismatchKind::Field {
                    column: column + 1,
                    left: x.to_string(),
                    right: y.to_string(),
                },
            });
        }
    }
}

/// Compares two texts line by line and field by field.
///
/// Header lines are not compared, but a header line present in only one
/// text still counts as a missing line.
pub fn compare_text(a_text: &str, b_text: &str, opts: &CompareOptions) -> Comparison {
    let a_lines: Vec<&str> = a_text.lines().collect();
    let b_lines: Vec<&str> = b_text.lines().collect();

    let mut mismatches = Vec::new();
    let longest = a_lines.len().max(b_lines.len());

    for i in 0..longest {
        let line_no = i + 1;
        let (a, b) = match (a_lines.get(i), b_lines.get(i)) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => {
                mismatches.push(Mismatch {
                    line: line_no,
                    kind: MismatchKind::MissingLine {
                        side: Side::Left,
                        content: a.to_string(),
                    },
                });
                continue;
            }
            (None, Some(b)) => {
                mismatches.push(Mismatch {
                    line: line_no,
                    kind: MismatchKind::MissingLine {
                        side: Side::Right,
                        content: b.to_string(),
                    },
                });
                continue;
            }
            (None, None) => break,
        };
        if i >= opts.skip_header_lines {
            compare_lines(line_no, a, b, opts.tolerance, &mut mismatches);
        }
    }

    Comparison { mismatches }
}

/// Compares two output files. Missing files surface as `MissingOutput`.
pub fn compare_files(a_path: &Path, b_path: &Path, opts: &CompareOptions) -> Result<Comparison> {
    if file_bytes_equal(a_path, b_path)? {
        log::debug!("{} and {} are byte-identical", a_path.display(), b_path.display());
        return Ok(Comparison::default());
    }

    let a_text = read_text_best_effort(a_path)?;
    let b_text = read_text_best_effort(b_path)?;
    let comparison = compare_text(&a_text, &b_text, opts);

    for m in &comparison.mismatches {
        log::debug!("{}: {}", b_path.display(), m);
    }
    Ok(comparison)
}

/// Line diff for human inspection: `< ` marks lines only in A, `> ` lines only in B.
pub fn annotate_line_diff(a_path: &Path, b_path: &Path) -> Result<String> {
    let a_text = read_text_best_effort(a_path)?;
    let b_text = read_text_best_effort(b_path)?;

    let diff = TextDiff::from_lines(&a_text, &b_text);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let marker = match change.tag() {
            ChangeTag::Equal => continue,
            ChangeTag::Delete => "< ",
            ChangeTag::Insert => "> ",
        };
        let (content, _) = split_newline(change.value());
        output.push_str(marker);
        output.push_str(content);
        output.push('\n');
    }
    Ok(output)
}
