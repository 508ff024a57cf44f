//! Filter efficiency summary of an McM request.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Write;

use super::types::McmRequest;

/// Generator parameter keys copied into the summary.
const GENERATOR_KEYS: [&str; 6] = [
    "filter_efficiency",
    "filter_efficiency_error",
    "match_efficiency",
    "match_efficiency_error",
    "cross_section",
    "negative_weights_fraction",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyInfo {
    pub prepid: String,
    pub dataset_name: String,
    pub filter_efficiency: Option<f64>,
    pub filter_efficiency_error: Option<f64>,
    pub generator_parameters: Map<String, Value>,
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
}

impl EfficiencyInfo {
    /// Whether a filter efficiency was found, at top level or among the
    /// generator parameters.
    pub fn has_efficiency(&self) -> bool {
        self.filter_efficiency.is_some()
            || self
                .generator_parameters
                .get("filter_efficiency")
                .map(|v| !v.is_null())
                .unwrap_or(false)
    }

    /// Human readable block; `verbose` adds generator parameters and notes.
    pub fn render(&self, verbose: bool) -> String {
        let rule = "=".repeat(60);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "PrepID: {}", self.prepid);
        let _ = writeln!(out, "Dataset: {}", self.dataset_name);
        let _ = writeln!(out, "{}", "-".repeat(60));

        match self.filter_efficiency {
            Some(eff) => {
                let _ = writeln!(out, "Filter Efficiency: {:.4}", eff);
                if let Some(err) = self.filter_efficiency_error {
                    let _ = writeln!(out, "Filter Efficiency Error: {:.4}", err);
                }
            }
            None => {
                let _ = writeln!(out, "Filter Efficiency: Not found in request");
            }
        }

        if verbose && !self.generator_parameters.is_empty() {
            let _ = writeln!(out, "\nGenerator Parameters:");
            for (key, value) in &self.generator_parameters {
                let _ = writeln!(out, "  {}: {}", key, value);
            }
        }

        if let Some(pct) = self.completion_percentage {
            let _ = writeln!(out, "\nCompletion: {:.1}%", pct);
        }

        if verbose && !self.notes.is_empty() {
            let _ = writeln!(out, "\nNotes:");
            for note in &self.notes {
                let _ = writeln!(out, "  - {}", note);
            }
        }

        out.push_str(&rule);
        out
    }
}

/// Summarises the filter efficiency information of a request.
///
/// Top-level values win; generator parameter values fill in whatever is
/// missing there.
pub fn extract_filter_efficiency(request: &McmRequest) -> EfficiencyInfo {
    let mut info = EfficiencyInfo {
        prepid: request.prepid.clone(),
        dataset_name: request.dataset_name.clone(),
        filter_efficiency: request.number("filter_efficiency"),
        filter_efficiency_error: None,
        generator_parameters: Map::new(),
        notes: Vec::new(),
        completion_percentage: None,
    };
    if info.filter_efficiency.is_some() {
        info.filter_efficiency_error = request.number("filter_efficiency_error");
    }

    if let Some(params) = request.latest_generator_parameters() {
        for key in GENERATOR_KEYS {
            let Some(value) = params.get(key).filter(|v| !v.is_null()) else {
                continue;
            };
            info.generator_parameters
                .insert(key.to_string(), value.clone());

            match key {
                "filter_efficiency" if info.filter_efficiency.is_none() => {
                    info.filter_efficiency = value.as_f64();
                }
                "filter_efficiency_error" if info.filter_efficiency_error.is_none() => {
                    info.filter_efficiency_error = value.as_f64();
                }
                _ => {}
            }
        }
    }

    info.notes = request
        .sequence_steps()
        .into_iter()
        .filter(|step| step.to_lowercase().contains("filter"))
        .map(|step| format!("Filter step found: {}", step))
        .collect();

    let total = request.number("total_events").unwrap_or(0.0);
    if total > 0.0 {
        let completed = request.number("completed_events").unwrap_or(0.0);
        info.completion_percentage = Some(completed / total * 100.0);
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_efficiency() {
        let request = McmRequest::new("HIG-Run3Summer22EEwmLHEGS-00123", "/A/B/GEN")
            .with_field("filter_efficiency", json!(0.25))
            .with_field("filter_efficiency_error", json!(0.01))
            .with_field("total_events", json!(1000))
            .with_field("completed_events", json!(250));

        let info = extract_filter_efficiency(&request);
        assert_eq!(info.filter_efficiency, Some(0.25));
        assert_eq!(info.filter_efficiency_error, Some(0.01));
        assert_eq!(info.completion_percentage, Some(25.0));
        assert!(info.has_efficiency());
    }

    #[test]
    fn test_promotes_generator_parameters() {
        let request = McmRequest::new("HIG-RunIISummer20UL17wmLHEGEN-01153", "X")
            .with_field(
                "generator_parameters",
                json!([
                    {"filter_efficiency": 0.5, "cross_section": 1.0},
                    {"filter_efficiency": 0.0116, "filter_efficiency_error": 0.0015,
                     "match_efficiency": 1.0, "cross_section": 53.2, "version": 1}
                ]),
            )
            .with_field(
                "sequences",
                json!([{"step": "LHE,GEN"}, {"step": "GEN,SIM,MultiLepFilter"}]),
            );

        let info = extract_filter_efficiency(&request);
        assert_eq!(info.filter_efficiency, Some(0.0116));
        assert_eq!(info.filter_efficiency_error, Some(0.0015));
        assert_eq!(info.generator_parameters.len(), 4);
        assert!(!info.generator_parameters.contains_key("version"));
        assert_eq!(info.notes, vec!["Filter step found: GEN,SIM,MultiLepFilter"]);
        assert_eq!(info.completion_percentage, None);
    }

    #[test]
    fn test_zero_efficiency_counts_as_found() {
        let request =
            McmRequest::new("X", "Y").with_field("filter_efficiency", json!(0.0));
        assert!(extract_filter_efficiency(&request).has_efficiency());
        assert!(!extract_filter_efficiency(&McmRequest::new("X", "Y")).has_efficiency());
    }

    #[test]
    fn test_render() {
        let request = McmRequest::new("HIG-X-1", "/A/B/GEN")
            .with_field("filter_efficiency", json!(0.0116))
            .with_field("generator_parameters", json!([{"cross_section": 53.2}]));
        let info = extract_filter_efficiency(&request);

        let brief = info.render(false);
        assert!(brief.contains("PrepID: HIG-X-1"));
        assert!(brief.contains("Filter Efficiency: 0.0116"));
        assert!(!brief.contains("Generator Parameters"));

        let verbose = info.render(true);
        assert!(verbose.contains("  cross_section: 53.2"));
    }

    #[test]
    fn test_render_missing_efficiency() {
        let info = extract_filter_efficiency(&McmRequest::new("X", "Y"));
        assert!(info.render(false).contains("Filter Efficiency: Not found in request"));
    }
}
