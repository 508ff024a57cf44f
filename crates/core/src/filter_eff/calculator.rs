//! Filter efficiency measurement: DAS file lookup, GenXsecAnalyzer run, parse.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::FilterEffConfig;
use super::error::FilterEffError;
use super::parser::{extract_process_name, parse_genxsec_output};
use super::sample_list::read_sample_list;
use super::store::{merge_results, save_results};
use super::types::{CalculationReport, DatasetFailure, EfficiencyRecord, Era};
use crate::config::ToolsConfig;
use crate::exec::{CommandRunner, Invocation};

/// Characters of cmsRun stderr kept when a job fails.
const STDERR_TAIL_CHARS: usize = 2000;

/// Measures filter efficiencies for signal datasets.
///
/// Every external call goes through the [`CommandRunner`], so the whole
/// pipeline can be driven by a mock in tests.
pub struct FilterEffCalculator {
    runner: Arc<dyn CommandRunner>,
    dasgoclient: String,
    cms_run: String,
    config: FilterEffConfig,
    dry_run: bool,
}

impl FilterEffCalculator {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: &ToolsConfig, config: FilterEffConfig) -> Self {
        Self {
            runner,
            dasgoclient: tools.dasgoclient.clone(),
            cms_run: tools.cms_run.clone(),
            config,
            dry_run: false,
        }
    }

    /// In dry-run mode nothing is queried, run or written.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &FilterEffConfig {
        &self.config
    }

    pub fn das_invocation(&self, dataset: &str) -> Invocation {
        Invocation::new(&self.dasgoclient)
            .arg("--query")
            .arg(format!("file dataset={}", dataset))
    }

    pub fn cmsrun_invocation(&self, files: &[String]) -> Invocation {
        Invocation::new(&self.cms_run)
            .arg(self.config.analyzer_config().display().to_string())
            .arg(format!("inputFiles={}", files.join(",")))
            .arg("maxEvents=-1")
    }

    /// Files of `dataset` according to DAS. Any failure yields no files.
    pub async fn query_das_files(&self, dataset: &str) -> Vec<String> {
        let invocation = self.das_invocation(dataset);
        debug!("{}", invocation.command_line());

        match self
            .runner
            .capture(&invocation, self.config.das_timeout())
            .await
        {
            Ok(output) if output.success() => output
                .stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Ok(output) => {
                warn!(
                    "DAS query failed for {} (exit code {}): {}",
                    dataset,
                    output.exit.code,
                    output.stderr.trim()
                );
                Vec::new()
            }
            Err(e) => {
                warn!("DAS query failed for {}: {}", dataset, e);
                Vec::new()
            }
        }
    }

    /// Runs the full measurement for one dataset.
    pub async fn measure(&self, dataset: &str) -> Result<(String, EfficiencyRecord), FilterEffError> {
        let process = extract_process_name(dataset).ok_or_else(|| FilterEffError::NoProcessName {
            dataset: dataset.to_string(),
        })?;
        info!(process = %process, "Processing {}", dataset);

        let files = self.query_das_files(dataset).await;
        if files.is_empty() {
            return Err(FilterEffError::NoFiles { process });
        }
        info!(process = %process, "Found {} files", files.len());

        let analyzer = self.config.analyzer_config();
        if !analyzer.exists() {
            return Err(FilterEffError::AnalyzerConfigMissing { path: analyzer });
        }

        let invocation = self.cmsrun_invocation(&files);
        info!(process = %process, "Running cmsRun with {} files", files.len());
        let output = self
            .runner
            .capture(&invocation, self.config.cmsrun_timeout())
            .await
            .map_err(|source| FilterEffError::CmsRunExec {
                process: process.clone(),
                source,
            })?;

        if !output.success() {
            return Err(FilterEffError::CmsRunFailed {
                process,
                exit_code: output.exit.code,
                stderr_tail: output.stderr_tail(STDERR_TAIL_CHARS),
            });
        }

        let combined = output.combined();
        debug!(process = %process, "cmsRun output:\n{}", combined);

        let summary = parse_genxsec_output(&combined)
            .filter(|s| s.filter_efficiency.is_some())
            .ok_or_else(|| FilterEffError::ParseFailed {
                process: process.clone(),
            })?;

        let record = EfficiencyRecord {
            filter_efficiency: summary.filter_efficiency.unwrap_or_default(),
            filter_efficiency_error: summary.filter_efficiency_error,
            cross_section: summary.cross_section,
            cross_section_error: summary.cross_section_error,
            total_files: files.len(),
            total_events: summary.total_events,
        };
        Ok((process, record))
    }

    /// Processes every dataset of an era with up to `jobs` concurrent
    /// workers, rewriting `results_<era>.json` after each success.
    pub async fn run_era(&self, era: Era, jobs: usize) -> Result<CalculationReport, FilterEffError> {
        let list = self.config.sample_list_path(era);
        let datasets = read_sample_list(&list).await?;
        info!("Found {} datasets in {}", datasets.len(), list.display());

        if self.dry_run {
            return Ok(self.plan(&datasets));
        }

        let output_file = self.config.era_results_path(era);
        let total = datasets.len();
        let jobs = jobs.max(1);
        if jobs > 1 {
            info!("Processing {} datasets with {} parallel workers", total, jobs);
        }

        let mut report = CalculationReport {
            total,
            ..Default::default()
        };

        let mut outcomes = stream::iter(datasets)
            .map(|dataset| async move {
                let outcome = self.measure(&dataset).await;
                (dataset, outcome)
            })
            .buffer_unordered(jobs);

        let mut completed = 0;
        while let Some((dataset, outcome)) = outcomes.next().await {
            completed += 1;
            match outcome {
                Ok((process, record)) => {
                    info!(
                        "[{}/{}] SUCCESS: {} (filter efficiency {:.6})",
                        completed, total, process, record.filter_efficiency
                    );
                    report.results.insert(process, record);
                    save_results(&output_file, &report.results).await?;
                    report.output_file = Some(output_file.clone());
                }
                Err(e) if e.is_dataset_failure() => {
                    warn!("[{}/{}] FAILED: {}", completed, total, e);
                    report.failures.push(failure(&dataset, &e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Measures a single dataset and merges the result into
    /// `sample_<process>.json`.
    pub async fn run_sample(&self, dataset: &str) -> Result<CalculationReport, FilterEffError> {
        if self.dry_run {
            return Ok(self.plan(&[dataset.to_string()]));
        }

        let mut report = CalculationReport {
            total: 1,
            ..Default::default()
        };

        match self.measure(dataset).await {
            Ok((process, record)) => {
                let output_file = self.config.sample_results_path(&process);
                report.results.insert(process, record);
                merge_results(&output_file, &report.results).await?;
                report.output_file = Some(output_file);
            }
            Err(e) if e.is_dataset_failure() => {
                if let FilterEffError::CmsRunFailed { stderr_tail, .. } = &e {
                    warn!("cmsRun stderr:\n{}", stderr_tail);
                }
                report.failures.push(failure(dataset, &e));
            }
            Err(e) => return Err(e),
        }

        Ok(report)
    }

    fn plan(&self, datasets: &[String]) -> CalculationReport {
        let mut report = CalculationReport {
            total: datasets.len(),
            ..Default::default()
        };

        for dataset in datasets {
            if extract_process_name(dataset).is_none() {
                let e = FilterEffError::NoProcessName {
                    dataset: dataset.clone(),
                };
                report.failures.push(failure(dataset, &e));
                continue;
            }

            let das = self.das_invocation(dataset).command_line();
            let cmsrun = format!(
                "{} {} inputFiles=<files of {}> maxEvents=-1",
                self.cms_run,
                self.config.analyzer_config().display(),
                dataset
            );
            info!("[DRY RUN] Would execute: {}", das);
            info!("[DRY RUN] Would execute: {}", cmsrun);
            report.planned.push(das);
            report.planned.push(cmsrun);
        }

        report
    }
}

fn failure(dataset: &str, error: &FilterEffError) -> DatasetFailure {
    DatasetFailure {
        dataset: dataset.to_string(),
        process: extract_process_name(dataset),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ExitOutcome};
    use crate::testing::{fixtures, MockRunner};
    use tempfile::TempDir;

    const DATASET: &str = "/TTToHcToWAToMuMu_MHc-100_MA-15_MultiLepFilter_TuneCP5_13TeV-madgraph-pythia8/RunIISummer20UL17MiniAODv2-106X_mc2017_realistic_v9-v2/MINIAODSIM";

    fn workspace(with_analyzer: bool) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("FilterEff")).unwrap();
        if with_analyzer {
            std::fs::write(dir.path().join("FilterEff/ana.py"), "# analyzer\n").unwrap();
        }
        dir
    }

    fn calculator(mock: &MockRunner, dir: &TempDir) -> FilterEffCalculator {
        FilterEffCalculator::new(
            Arc::new(mock.clone()),
            &ToolsConfig::default(),
            FilterEffConfig::default().with_base_dir(dir.path()),
        )
    }

    #[test]
    fn test_invocations() {
        let dir = workspace(true);
        let calc = calculator(&MockRunner::new(), &dir);

        let das = calc.das_invocation(DATASET);
        assert_eq!(das.program, "dasgoclient");
        assert_eq!(das.args, vec!["--query".to_string(), format!("file dataset={}", DATASET)]);

        let files = vec!["/store/a.root".to_string(), "/store/b.root".to_string()];
        let run = calc.cmsrun_invocation(&files);
        assert_eq!(run.program, "cmsRun");
        assert!(run.args[0].ends_with("FilterEff/ana.py"));
        assert_eq!(run.args[1], "inputFiles=/store/a.root,/store/b.root");
        assert_eq!(run.args[2], "maxEvents=-1");
    }

    #[tokio::test]
    async fn test_query_das_files_trims_lines() {
        let dir = workspace(true);
        let mock = MockRunner::new();
        mock.set_capture_stdout("dasgoclient", None, "  /store/a.root\n\n/store/b.root  \n")
            .await;

        let files = calculator(&mock, &dir).query_das_files(DATASET).await;
        assert_eq!(files, vec!["/store/a.root", "/store/b.root"]);
    }

    #[tokio::test]
    async fn test_query_das_files_failure_is_empty() {
        let dir = workspace(true);
        let mock = MockRunner::new();
        mock.set_timeout("dasgoclient").await;
        assert!(calculator(&mock, &dir).query_das_files(DATASET).await.is_empty());
    }

    #[tokio::test]
    async fn test_measure_success() {
        let dir = workspace(true);
        let mock = MockRunner::new();
        mock.set_capture_stdout("dasgoclient", None, "/store/a.root\n/store/b.root\n")
            .await;
        mock.set_capture_output(
            "cmsRun",
            None,
            CommandOutput {
                exit: ExitOutcome::new(0),
                stdout: String::new(),
                stderr: fixtures::GENXSEC_OUTPUT.to_string(),
            },
        )
        .await;

        let (process, record) = calculator(&mock, &dir).measure(DATASET).await.unwrap();
        assert_eq!(process, "TTToHcToWAToMuMu_MHc-100_MA-15");
        assert_eq!(record.filter_efficiency, 1.160e-02);
        assert_eq!(record.total_files, 2);
        assert_eq!(record.total_events, Some(5000));
    }

    #[tokio::test]
    async fn test_measure_requires_analyzer() {
        let dir = workspace(false);
        let mock = MockRunner::new();
        mock.set_capture_stdout("dasgoclient", None, "/store/a.root\n").await;

        let err = calculator(&mock, &dir).measure(DATASET).await.unwrap_err();
        assert!(matches!(err, FilterEffError::AnalyzerConfigMissing { .. }));
        assert_eq!(mock.capture_count().await, 1);
    }

    #[tokio::test]
    async fn test_measure_cmsrun_failure() {
        let dir = workspace(true);
        let mock = MockRunner::new();
        mock.set_capture_stdout("dasgoclient", None, "/store/a.root\n").await;
        mock.set_capture_output(
            "cmsRun",
            None,
            CommandOutput {
                exit: ExitOutcome::new(65),
                stdout: String::new(),
                stderr: "Fatal Exception".to_string(),
            },
        )
        .await;

        let err = calculator(&mock, &dir).measure(DATASET).await.unwrap_err();
        match err {
            FilterEffError::CmsRunFailed {
                exit_code,
                stderr_tail,
                ..
            } => {
                assert_eq!(exit_code, 65);
                assert_eq!(stderr_tail, "Fatal Exception");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_measure_unparsable_output() {
        let dir = workspace(true);
        let mock = MockRunner::new();
        mock.set_capture_stdout("dasgoclient", None, "/store/a.root\n").await;
        mock.set_capture_stdout("cmsRun", None, "Begin processing the 1st record\n")
            .await;

        let err = calculator(&mock, &dir).measure(DATASET).await.unwrap_err();
        assert!(matches!(err, FilterEffError::ParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let dir = workspace(true);
        std::fs::create_dir_all(dir.path().join("SampleLists")).unwrap();
        std::fs::write(
            dir.path().join("SampleLists/SignalMC_2017.txt"),
            format!("{}\n/Unrelated/Sample/MINIAODSIM\n", DATASET),
        )
        .unwrap();
        let mock = MockRunner::new();

        let report = calculator(&mock, &dir)
            .with_dry_run(true)
            .run_era(Era::Y2017, 4)
            .await
            .unwrap();

        assert_eq!(mock.capture_count().await, 0);
        assert_eq!(report.total, 2);
        assert_eq!(report.planned.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.output_file.is_none());
        assert!(!dir.path().join("FilterEff/results_2017.json").exists());
    }

    #[tokio::test]
    async fn test_run_sample_failure_writes_nothing() {
        let dir = workspace(true);
        let mock = MockRunner::new();

        let report = calculator(&mock, &dir).run_sample(DATASET).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("No files found"));
        assert!(report.output_file.is_none());
    }
}
