use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cmsprod",
    version,
    about = "NanoAOD production, CRAB task handling and filter efficiencies for CMS analyses"
)]
pub struct Cli {
    /// Configuration file (default: $CMSPROD_CONFIG, then ./cmsprod.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Produce NanoAOD with cmsDriver.py and cmsRun (run option 2, 3 or local)
    Nano(NanoArgs),

    /// Submit and monitor CRAB tasks
    Crab {
        #[command(subcommand)]
        action: CrabAction,
    },

    /// Measure signal filter efficiencies with GenXsecAnalyzer
    FilterEff(FilterEffArgs),

    /// Look up filter efficiencies recorded in McM
    Mcm(McmArgs),
}

#[derive(Args)]
pub struct NanoArgs {
    /// Run option: 2, 3 or local
    #[arg(allow_hyphen_values = true)]
    pub run: Option<String>,

    /// Print the commands without running them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum CrabAction {
    /// Submit a task from a CRAB configuration
    Submit {
        /// CRAB configuration file
        #[arg(short = 'c', long = "crab-config", default_value = "crabConfig.py")]
        crab_config: PathBuf,
    },

    /// Show task status
    Status {
        #[command(flatten)]
        target: TaskTarget,

        /// Per-job details
        #[arg(long, default_value_t = false)]
        long: bool,
    },

    /// Resubmit failed jobs
    Resubmit {
        #[command(flatten)]
        target: TaskTarget,

        /// Memory limit per job in MB
        #[arg(long)]
        max_memory: Option<u32>,

        /// Runtime limit per job in minutes
        #[arg(long)]
        max_job_runtime: Option<u32>,

        /// Jobs to resubmit, e.g. 1,4-7
        #[arg(long)]
        job_ids: Option<String>,

        /// Sites to allow, comma separated
        #[arg(long)]
        site_whitelist: Option<String>,
    },

    /// Kill a task
    Kill {
        #[command(flatten)]
        target: TaskTarget,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct TaskTarget {
    /// CRAB task directory
    #[arg(short = 'd', long = "dir", value_name = "TASK_DIR")]
    pub task_dir: Option<PathBuf>,

    /// Every crab_* task under this projects directory
    #[arg(long, value_name = "PROJECTS_DIR")]
    pub all: Option<PathBuf>,
}

#[derive(Args)]
pub struct FilterEffArgs {
    #[command(flatten)]
    pub target: FilterEffTarget,

    /// Log what would run without querying DAS or running cmsRun
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Parallel workers: a number or "auto"
    #[arg(short = 'j', long)]
    pub jobs: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct FilterEffTarget {
    /// Era to process: 2016preVFP, 2016postVFP, 2017, 2018 or all
    #[arg(long)]
    pub era: Option<String>,

    /// Process a single dataset
    #[arg(long, value_name = "DATASET")]
    pub sample: Option<String>,
}

#[derive(Args)]
pub struct McmArgs {
    #[command(flatten)]
    pub target: McmTarget,

    /// Save the results as JSON
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Use the development McM instance
    #[arg(long, default_value_t = false)]
    pub dev: bool,

    /// Show generator parameters and notes
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct McmTarget {
    /// McM PrepID of a request
    #[arg(long)]
    pub prepid: Option<String>,

    /// Dataset name
    #[arg(long)]
    pub dataset: Option<String>,

    /// Chained request PrepID
    #[arg(long)]
    pub chain: Option<String>,
}
