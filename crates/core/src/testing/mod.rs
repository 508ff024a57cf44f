//! Testing utilities and mock implementations.
//!
//! The mocks stand in for the two external seams of the crate, child
//! processes and the McM API, so workflows can be driven end to end without
//! CMSSW, DAS or network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use cmsprod_core::testing::{MockMcm, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.set_exit_code("cmsRun", 8001).await;
//!
//! let mcm = MockMcm::new();
//! mcm.add_request(fixtures::wmlhegen_request()).await;
//! ```

mod mock_mcm;
mod mock_runner;

pub use mock_mcm::MockMcm;
pub use mock_runner::MockRunner;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::json;

    use crate::mcm::McmRequest;

    pub const SIGNAL_DATASET: &str = "/TTToHcToWAToMuMu_MHc-100_MA-15_MultiLepFilter_TuneCP5_13TeV-madgraph-pythia8/RunIISummer20UL17MiniAODv2-106X_mc2017_realistic_v9-v2/MINIAODSIM";

    pub const SIGNAL_PROCESS: &str = "TTToHcToWAToMuMu_MHc-100_MA-15";

    pub const MINIAOD_PREPID: &str = "HIG-RunIISummer20UL17MiniAODv2-01153";

    pub const WMLHEGEN_PREPID: &str = "HIG-RunIISummer20UL17wmLHEGEN-01153";

    pub const CHAIN_PREPID: &str = "HIG-chain_RunIISummer20UL17wmLHEGEN_flowRunIISummer20UL17SIM_flowRunIISummer20UL17MiniAODv2-01153";

    /// Tail of a GenXsecAnalyzer job as MessageLogger prints it.
    pub const GENXSEC_OUTPUT: &str = "\
------------------------------------
GenXsecAnalyzer:
------------------------------------
Before Filter: total cross section = 5.321e+01 +- 1.100e-01 pb
Filter efficiency (taking into account weights)= (58) / (5000) = 1.160e-02 +- 1.514e-03
Filter efficiency (event-level)= (58) / (5000) = 1.160e-02 +- 1.514e-03    [TO BE USED IN MCM]

After filter: final cross section = 6.172e-01 +- 8.056e-02 pb
After filter: final fraction of events with negative weights = 0.000e+00 +- 0.000e+00
Total number of events = 5000
";

    /// MiniAOD request whose ReqMgr workflows name the generator request.
    pub fn miniaod_request() -> McmRequest {
        McmRequest::new(MINIAOD_PREPID, SIGNAL_DATASET)
            .with_field("total_events", json!(500000))
            .with_field("completed_events", json!(500000))
            .with_field(
                "reqmgr_name",
                json!([{
                    "name": format!("pdmvserv_task_{}__v1_T_220301_101010_1234", WMLHEGEN_PREPID)
                }]),
            )
            .with_field("member_of_chain", json!([CHAIN_PREPID]))
    }

    /// MiniAOD request known only through its chain membership.
    pub fn miniaod_request_without_reqmgr() -> McmRequest {
        McmRequest::new(MINIAOD_PREPID, SIGNAL_DATASET)
            .with_field("member_of_chain", json!([CHAIN_PREPID]))
    }

    pub fn wmlhegen_request() -> McmRequest {
        McmRequest::new(
            WMLHEGEN_PREPID,
            "TTToHcToWAToMuMu_MHc-100_MA-15_MultiLepFilter_TuneCP5_13TeV-madgraph-pythia8",
        )
        .with_field(
            "generator_parameters",
            json!([{
                "filter_efficiency": 0.0116,
                "filter_efficiency_error": 0.0015,
                "match_efficiency": 1.0,
                "cross_section": 53.21,
                "negative_weights_fraction": 0.0
            }]),
        )
        .with_field("sequences", json!([{"step": "LHE,GEN,MultiLepFilter"}]))
    }

    pub fn sim_request() -> McmRequest {
        McmRequest::new("HIG-RunIISummer20UL17SIM-01153", "/A/B/GEN-SIM")
    }
}
