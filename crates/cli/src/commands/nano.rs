use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::error;

use cmsprod_core::{ProcessRunner, RunOption, WorkflowRunner};

use crate::cli::NanoArgs;
use crate::report;

pub async fn run(args: NanoArgs, config_path: Option<&Path>) -> Result<i32> {
    // A missing option is as invalid as a wrong one.
    let option: RunOption = match args.run.as_deref().unwrap_or_default().parse() {
        Ok(option) => option,
        Err(e) => {
            println!("{}", e);
            return Ok(e.exit_code());
        }
    };

    let config = super::load_config(config_path)?;
    let plan = config.workflow.plan(option, &config.tools);

    if args.dry_run {
        report::print_plan(&plan);
        return Ok(0);
    }

    let runner = WorkflowRunner::new(Arc::new(ProcessRunner::new()));
    match runner.execute(&plan).await {
        Ok(workflow) => {
            report::print_workflow_report(&workflow);
            Ok(0)
        }
        Err(e) => {
            error!("{}", e);
            Ok(e.exit_code())
        }
    }
}
