//! Parsing of GenXsecAnalyzer summaries and dataset names.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

/// Signal process prefix: mass point up to and including the `MA` value.
static PROCESS_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(TTToHcToWAToMuMu_MHc-\d+_MA-?\d+)").unwrap());

static FILTER_EFF_EVENT_LEVEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Filter efficiency \(event-level\)\s*=\s*\([^)]+\)\s*/\s*\([^)]+\)\s*=\s*([\d.eE+-]+)\s*\+-\s*([\d.eE+-]+)",
    )
    .unwrap()
});

static FILTER_EFF_ANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Filter efficiency.*?=\s*([\d.eE+-]+)\s*\+-\s*([\d.eE+-]+)").unwrap()
});

static XSEC_AFTER_FILTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)After filter:\s*(?:final\s+)?(?:total\s+)?cross section\s*=\s*([\d.eE+-]+)\s*\+-\s*([\d.eE+-]+)\s*pb",
    )
    .unwrap()
});

static XSEC_BEFORE_MATCHING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Before matching:\s*(?:total\s+)?cross section\s*=\s*([\d.eE+-]+)\s*\+-\s*([\d.eE+-]+)\s*pb",
    )
    .unwrap()
});

static XSEC_ANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)cross section\s*=\s*([\d.eE+-]+)\s*\+-\s*([\d.eE+-]+)\s*pb").unwrap()
});

static TOTAL_EVENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Total\s+(?:number\s+of\s+)?events\s*[=:]\s*(\d+)").unwrap()
});

/// Values extracted from a GenXsecAnalyzer run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenXsecSummary {
    pub filter_efficiency: Option<f64>,
    pub filter_efficiency_error: Option<f64>,
    /// Cross section in pb.
    pub cross_section: Option<f64>,
    pub cross_section_error: Option<f64>,
    pub total_events: Option<u64>,
}

/// Process name of a signal dataset path, e.g.
/// `/TTToHcToWAToMuMu_MHc-100_MA-15_MultiLepFilter_.../RunIISummer20UL16MiniAODAPVv2-.../MINIAODSIM`
/// gives `TTToHcToWAToMuMu_MHc-100_MA-15`.
pub fn extract_process_name(dataset: &str) -> Option<String> {
    let primary = dataset.split('/').nth(1)?;
    PROCESS_NAME
        .captures(primary)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn value_pair(caps: &Captures<'_>) -> Option<(f64, f64)> {
    let value = caps.get(1)?.as_str().parse().ok()?;
    let error = caps.get(2)?.as_str().parse().ok()?;
    Some((value, error))
}

fn first_pair(output: &str, patterns: &[&Regex]) -> Option<(f64, f64)> {
    patterns
        .iter()
        .find_map(|re| re.captures(output))
        .and_then(|caps| value_pair(&caps))
}

/// Parses the summary GenXsecAnalyzer prints at the end of a job.
///
/// Examples of lines understood:
///
/// ```text
/// Filter efficiency (event-level)= (58) / (5000) = 1.160e-02 +- 1.514e-03
/// Before matching: total cross section = 1.234e+02 +- 5.678e+00 pb
/// After filter: final cross section = 1.234e+02 +- 5.678e+00 pb
/// ```
///
/// Returns `None` for empty output. Patterns are tried most specific first.
pub fn parse_genxsec_output(output: &str) -> Option<GenXsecSummary> {
    if output.trim().is_empty() {
        return None;
    }

    let mut summary = GenXsecSummary::default();

    if let Some((eff, err)) = first_pair(output, &[&FILTER_EFF_EVENT_LEVEL, &FILTER_EFF_ANY]) {
        summary.filter_efficiency = Some(eff);
        summary.filter_efficiency_error = Some(err);
    }

    if let Some((xsec, err)) = first_pair(
        output,
        &[&XSEC_AFTER_FILTER, &XSEC_BEFORE_MATCHING, &XSEC_ANY],
    ) {
        summary.cross_section = Some(xsec);
        summary.cross_section_error = Some(err);
    }

    summary.total_events = TOTAL_EVENTS
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    Some(summary)
}
