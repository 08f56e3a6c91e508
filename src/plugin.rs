use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;

/// Prefix every compared output file is written under.
pub const COMPARISON_PREFIX: &str = "val.comparison";

/// Output plugins whose files are compared between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputCategory {
    ResultWriter,
    GammaWriter,
    #[serde(rename = "RDF")]
    Rdf,
}

impl OutputCategory {
    pub const ALL: [OutputCategory; 3] = [
        OutputCategory::ResultWriter,
        OutputCategory::GammaWriter,
        OutputCategory::Rdf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputCategory::ResultWriter => "ResultWriter",
            OutputCategory::GammaWriter => "GammaWriter",
            OutputCategory::Rdf => "RDF",
        }
    }

    pub fn postfix(&self) -> &'static str {
        match self {
            OutputCategory::ResultWriter => ".res",
            OutputCategory::GammaWriter => ".gamma",
            OutputCategory::Rdf => ".rdf",
        }
    }

    pub fn comparison_file_name(&self) -> String {
        format!("{COMPARISON_PREFIX}{}", self.postfix())
    }

    /// Lines appended to the staged cfg to enable this output.
    pub fn config_lines(&self) -> Vec<String> {
        match self {
            // RDF is not configured through the generic `output` directive
            OutputCategory::Rdf => vec![
                "initStatistics 0".into(),
                "RDF 0.003 1000".into(),
                "RDFOutputTimesteps 10".into(),
                format!("RDFOutputPrefix {COMPARISON_PREFIX}"),
            ],
            other => vec![format!("output {} 1 {COMPARISON_PREFIX}", other.name())],
        }
    }

    /// RDF writes one file per output timestep; only the newest is compared.
    pub fn timestep_glob(&self) -> Option<String> {
        match self {
            OutputCategory::Rdf => Some(format!("{COMPARISON_PREFIX}*{}", self.postfix())),
            _ => None,
        }
    }
}

impl fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputCategory::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| {
                ValidationError::configuration(format!(
                    "Plugin {s} not supported yet (supported: ResultWriter, GammaWriter, RDF)"
                ))
            })
    }
}
