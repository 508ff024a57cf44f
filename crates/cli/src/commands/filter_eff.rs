use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use cmsprod_core::filter_eff::parse_jobs;
use cmsprod_core::{Era, FilterEffCalculator, ProcessRunner};

use crate::cli::FilterEffArgs;
use crate::report;

pub async fn run(args: FilterEffArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = super::load_config(config_path)?;

    let jobs = match &args.jobs {
        Some(value) => parse_jobs(value)?,
        None => config.filter_eff.jobs,
    };

    let calculator = FilterEffCalculator::new(
        Arc::new(ProcessRunner::new()),
        &config.tools,
        config.filter_eff.clone(),
    )
    .with_dry_run(args.dry_run);

    if let Some(dataset) = &args.target.sample {
        info!("Single dataset mode: {}", dataset);
        let calc_report = calculator
            .run_sample(dataset)
            .await
            .with_context(|| format!("Failed to process sample {}", dataset))?;
        report::print_sample_report(&calc_report)?;
        return Ok(if calc_report.is_complete() { 0 } else { 1 });
    }

    let selector = args.target.era.as_deref().unwrap_or_default();
    let eras = Era::parse_selection(selector)?;

    let mut era_errors = 0;
    let mut measured = 0;
    for era in eras {
        info!(era = %era, dry_run = args.dry_run, jobs, "Filter efficiency calculation");
        match calculator.run_era(era, jobs).await {
            Ok(calc_report) => {
                measured += calc_report.results.len();
                report::print_era_report(era, &calc_report);
            }
            Err(e) => {
                error!("Error processing era {}: {}", era, e);
                era_errors += 1;
            }
        }
    }

    if era_errors > 0 || (measured == 0 && !args.dry_run) {
        return Ok(1);
    }
    Ok(0)
}
