//! McM request documents.
//!
//! McM documents carry dozens of fields whose shapes vary between campaigns,
//! so only the identifiers are typed; everything else stays as JSON and is
//! read through accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One McM request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McmRequest {
    #[serde(default)]
    pub prepid: String,
    #[serde(default)]
    pub dataset_name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl McmRequest {
    pub fn new(prepid: impl Into<String>, dataset_name: impl Into<String>) -> Self {
        Self {
            prepid: prepid.into(),
            dataset_name: dataset_name.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field (builder style, mostly for tests and fixtures).
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.field(key).and_then(Value::as_f64)
    }

    /// Most recent `generator_parameters` entry.
    pub fn latest_generator_parameters(&self) -> Option<&Map<String, Value>> {
        match self.field("generator_parameters")? {
            Value::Array(entries) => entries.last().and_then(Value::as_object),
            Value::Object(params) => Some(params),
            _ => None,
        }
    }

    /// `step` strings of every sequence.
    pub fn sequence_steps(&self) -> Vec<&str> {
        self.field("sequences")
            .and_then(Value::as_array)
            .map(|seqs| {
                seqs.iter()
                    .filter_map(|seq| seq.get("step").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Workflow names from `reqmgr_name` (objects with `name`, or strings).
    pub fn reqmgr_names(&self) -> Vec<String> {
        self.field("reqmgr_name")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| match entry {
                        Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                        Value::String(s) => Some(s.as_str()),
                        _ => None,
                    })
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Chained requests this request is a member of.
    pub fn member_of_chain(&self) -> Vec<String> {
        string_list(self.field("member_of_chain"))
    }

    /// Explicit PrepID chain (`Chain` or `chain`), when present and non-empty.
    pub fn chain_prepids(&self) -> Option<Vec<String>> {
        ["Chain", "chain"]
            .iter()
            .map(|key| string_list(self.field(key)))
            .find(|ids| !ids.is_empty())
    }

    /// How to reach the rest of this request's production chain.
    pub fn chain_reference(&self) -> Option<ChainReference> {
        if let Some(prepids) = self.chain_prepids() {
            return Some(ChainReference::Prepids(prepids));
        }
        self.member_of_chain()
            .into_iter()
            .next()
            .map(ChainReference::ChainId)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A chained request: the ordered PrepIDs of one production chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedRequest {
    #[serde(default)]
    pub prepid: String,
    #[serde(default)]
    pub chain: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainReference {
    /// The request listed the chain's PrepIDs itself.
    Prepids(Vec<String>),
    /// Only the chained request's id is known.
    ChainId(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keeps_unknown_fields() {
        let request: McmRequest = serde_json::from_value(json!({
            "prepid": "HIG-RunIISummer20UL17MiniAODv2-01153",
            "dataset_name": "TTToHcToWAToMuMu_MHc-100_MA-15",
            "total_events": 500000,
            "member_of_chain": ["HIG-chain_A-01153"],
        }))
        .unwrap();

        assert_eq!(request.number("total_events"), Some(500000.0));
        assert_eq!(request.member_of_chain(), vec!["HIG-chain_A-01153"]);
    }

    #[test]
    fn test_latest_generator_parameters() {
        let request = McmRequest::new("X", "Y").with_field(
            "generator_parameters",
            json!([{"filter_efficiency": 0.1}, {"filter_efficiency": 0.2}]),
        );
        let params = request.latest_generator_parameters().unwrap();
        assert_eq!(params["filter_efficiency"], 0.2);

        let single = McmRequest::new("X", "Y")
            .with_field("generator_parameters", json!({"cross_section": 1.5}));
        assert!(single.latest_generator_parameters().is_some());
    }

    #[test]
    fn test_reqmgr_names_mixed_shapes() {
        let request = McmRequest::new("X", "Y").with_field(
            "reqmgr_name",
            json!([{"name": "a"}, "b", {"content": {}}, 3, {"name": ""}]),
        );
        assert_eq!(request.reqmgr_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_chain_reference_prefers_explicit_chain() {
        let request = McmRequest::new("X", "Y")
            .with_field("Chain", json!([]))
            .with_field("chain", json!(["HIG-wmLHEGEN-1", "HIG-SIM-1"]))
            .with_field("member_of_chain", json!(["HIG-chain_A-1"]));
        assert_eq!(
            request.chain_reference(),
            Some(ChainReference::Prepids(vec![
                "HIG-wmLHEGEN-1".to_string(),
                "HIG-SIM-1".to_string()
            ]))
        );

        let member_only =
            McmRequest::new("X", "Y").with_field("member_of_chain", json!(["HIG-chain_A-1"]));
        assert_eq!(
            member_only.chain_reference(),
            Some(ChainReference::ChainId("HIG-chain_A-1".to_string()))
        );

        assert_eq!(McmRequest::new("X", "Y").chain_reference(), None);
    }
}
