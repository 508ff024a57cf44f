//! Human readable reports printed to stdout.

use anyhow::Result;

use cmsprod_core::{CalculationReport, CrabBatchReport, Era, WorkflowPlan, WorkflowReport};

fn rule() -> String {
    "=".repeat(80)
}

pub fn print_plan(plan: &WorkflowPlan) {
    println!("# run option {} ({})", plan.option, plan.dataset);
    for line in plan.command_lines() {
        println!("{}", line);
    }
}

pub fn print_workflow_report(report: &WorkflowReport) {
    println!(
        "Run option {}: {} step(s) completed in {:.1}s",
        report.option,
        report.steps_completed,
        report.duration_ms as f64 / 1000.0
    );
}

pub fn print_crab_report(action: &str, report: &CrabBatchReport) {
    println!("{}", rule());
    println!(
        "crab {}: {} succeeded, {} failed",
        action,
        report.succeeded.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  {}: {}", failure.task_dir.display(), failure.reason);
    }
    println!("{}", rule());
}

fn print_planned(report: &CalculationReport) {
    for line in &report.planned {
        println!("[DRY RUN] {}", line);
    }
}

fn print_failures(report: &CalculationReport) {
    if report.failures.is_empty() {
        return;
    }

    println!("\n{}", rule());
    println!("FAILED DATASETS ({}):", report.failures.len());
    println!("{}", rule());
    for failure in &report.failures {
        println!("\n  Dataset: {}", failure.dataset);
        if let Some(process) = &failure.process {
            println!("  Process: {}", process);
        }
        println!("  Error: {}", failure.reason);
    }
    println!("\n{}", rule());
}

pub fn print_era_report(era: Era, report: &CalculationReport) {
    print_planned(report);

    println!("\n{}", rule());
    println!("Era {}: {}/{} datasets measured", era, report.results.len(), report.total);
    for (process, record) in &report.results {
        print!("  {}: filter efficiency {:.6}", process, record.filter_efficiency);
        if let Some(xsec) = record.cross_section {
            print!(", cross section {:.6} pb", xsec);
        }
        println!(" ({} files)", record.total_files);
    }
    if let Some(path) = &report.output_file {
        println!("Results saved to: {}", path.display());
    }
    println!("{}", rule());

    print_failures(report);
}

pub fn print_sample_report(report: &CalculationReport) -> Result<()> {
    print_planned(report);

    if !report.results.is_empty() {
        println!("\n{}", rule());
        println!("Result for single dataset:");
        println!("{}", serde_json::to_string_pretty(&report.results)?);
        if let Some(path) = &report.output_file {
            println!("\nSaved to: {}", path.display());
        }
        println!("{}", rule());
    }

    print_failures(report);
    Ok(())
}
