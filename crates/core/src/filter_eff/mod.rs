//! Filter efficiency calculator for the charged Higgs signal samples.
//!
//! For each dataset of an era's sample list the file list is fetched from
//! DAS, GenXsecAnalyzer is run over all files with `cmsRun`, and the filter
//! efficiency and cross section are parsed from its summary. Results are
//! written to `FilterEff/results_<era>.json` after every success so an
//! interrupted run keeps what it measured.

mod calculator;
mod config;
mod error;
mod parser;
mod sample_list;
mod store;
mod types;

pub use calculator::FilterEffCalculator;
pub use config::FilterEffConfig;
pub use error::FilterEffError;
pub use parser::{extract_process_name, parse_genxsec_output, GenXsecSummary};
pub use sample_list::{parse_sample_list, read_sample_list};
pub use store::{merge_results, save_results, ResultMap};
pub use types::{parse_jobs, CalculationReport, DatasetFailure, EfficiencyRecord, Era};
