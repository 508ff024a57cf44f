//! Types for the filter efficiency module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::error::FilterEffError;

/// Run 2 Ultra-Legacy data-taking periods with their own signal sample lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    #[serde(rename = "2016preVFP")]
    Y2016PreVfp,
    #[serde(rename = "2016postVFP")]
    Y2016PostVfp,
    #[serde(rename = "2017")]
    Y2017,
    #[serde(rename = "2018")]
    Y2018,
}

impl Era {
    pub const ALL: [Era; 4] = [Era::Y2016PreVfp, Era::Y2016PostVfp, Era::Y2017, Era::Y2018];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Y2016PreVfp => "2016preVFP",
            Self::Y2016PostVfp => "2016postVFP",
            Self::Y2017 => "2017",
            Self::Y2018 => "2018",
        }
    }

    /// Expands an era selector; `all` yields every era in chronological order.
    pub fn parse_selection(selector: &str) -> Result<Vec<Era>, FilterEffError> {
        if selector == "all" {
            Ok(Self::ALL.to_vec())
        } else {
            selector.parse().map(|era| vec![era])
        }
    }
}

impl FromStr for Era {
    type Err = FilterEffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|era| era.as_str() == s)
            .ok_or_else(|| FilterEffError::InvalidEra(s.to_string()))
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a worker count: a positive integer or `auto` (available parallelism).
pub fn parse_jobs(value: &str) -> Result<usize, FilterEffError> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1));
    }

    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(FilterEffError::InvalidJobs(value.to_string())),
    }
}

/// Measured efficiency for one signal process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRecord {
    pub filter_efficiency: f64,
    pub filter_efficiency_error: Option<f64>,
    /// Cross section in pb.
    pub cross_section: Option<f64>,
    pub cross_section_error: Option<f64>,
    pub total_files: usize,
    pub total_events: Option<u64>,
}

/// A dataset that could not be measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFailure {
    pub dataset: String,
    pub process: Option<String>,
    pub reason: String,
}

/// Outcome of one era or single-dataset run.
#[derive(Debug, Clone, Default)]
pub struct CalculationReport {
    /// Process name to measured efficiency.
    pub results: BTreeMap<String, EfficiencyRecord>,
    pub failures: Vec<DatasetFailure>,
    /// Number of datasets considered.
    pub total: usize,
    /// File the results were written to, if any were written.
    pub output_file: Option<PathBuf>,
    /// Commands that would have run (dry run only).
    pub planned: Vec<String>,
}

impl CalculationReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
