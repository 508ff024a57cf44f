pub mod config;
pub mod crab;
pub mod exec;
pub mod filter_eff;
pub mod mcm;
pub mod testing;
pub mod workflow;

pub use config::{
    load, load_config, load_config_from_str, validate_config, Config, ConfigError, ToolsConfig,
};
pub use crab::{CrabBatch, CrabBatchReport, CrabCommand, CrabError, ResubmitOptions};
pub use exec::{CommandOutput, CommandRunner, ExecError, ExitOutcome, Invocation, ProcessRunner};
pub use filter_eff::{
    CalculationReport, EfficiencyRecord, Era, FilterEffCalculator, FilterEffConfig,
    FilterEffError,
};
pub use mcm::{
    DatasetLookup, EfficiencyInfo, GeneratorStatus, McmApi, McmClient, McmConfig, McmError,
    McmLookup,
};
pub use workflow::{
    RunOption, WorkflowConfig, WorkflowError, WorkflowPlan, WorkflowReport, WorkflowRunner,
};
