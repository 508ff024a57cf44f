//! End-to-end tests of the `cmsprod` binary.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const INVALID_OPTION: &str = "Invalid run option. Please use 2, 3, or local.";

fn cmsprod(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmsprod"))
        .args(args)
        .current_dir(workdir)
        .env_remove("CMSPROD_CONFIG")
        .env("RUST_LOG", "error")
        .output()
        .expect("failed to launch cmsprod")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("cmsprod.toml");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_invalid_option_message_and_exit_code() {
    let dir = TempDir::new().unwrap();

    for option in ["4", "LOCAL", "run2", ""] {
        let output = cmsprod(dir.path(), &["nano", option]);
        assert_eq!(output.status.code(), Some(1), "option {option:?}");
        assert_eq!(stdout(&output).trim_end(), INVALID_OPTION, "option {option:?}");
    }
}

#[test]
fn test_hyphenated_option_is_invalid() {
    let dir = TempDir::new().unwrap();

    for option in ["-1", "--local", "-x"] {
        let output = cmsprod(dir.path(), &["nano", option]);
        assert_eq!(output.status.code(), Some(1), "option {option:?}");
        assert_eq!(stdout(&output).trim_end(), INVALID_OPTION, "option {option:?}");
    }
}

#[test]
fn test_missing_option_is_invalid() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(dir.path(), &["nano"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim_end(), INVALID_OPTION);
}

#[test]
fn test_invalid_option_checked_before_config() {
    // The option is rejected even when the config file does not exist.
    let dir = TempDir::new().unwrap();
    let output = cmsprod(
        dir.path(),
        &["--config", "/nonexistent/cmsprod.toml", "nano", "5"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output).trim_end(), INVALID_OPTION);
}

#[test]
fn test_dry_run_prints_commands() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(dir.path(), &["nano", "2", "--dry-run"]);
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    assert!(out.contains("cmsDriver.py --python_filename NanoAOD_Run2_cfg.py"));
    assert!(out.contains("--conditions 106X_upgrade2018_realistic_v16_L1v1"));
    assert!(out.contains("cmsRun NanoAOD_Run2_cfg.py"));
    assert!(!out.contains("nano_postproc.py"));
}

#[test]
fn test_dry_run_local_includes_postproc() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(dir.path(), &["nano", "local", "--dry-run"]);
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    assert!(out.contains("cmsRun NanoAOD_local_cfg.py"));
    assert!(out.contains("nano_postproc.py postproc_local NanoAOD_local.root -s _Skim"));
}

#[test]
fn test_dry_run_reads_config_in_workdir() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
[tools]
cms_driver = "/opt/cmssw/bin/cmsDriver.py"

[workflow.run3]
conditions = "CUSTOM_GT"
"#,
    );

    let output = cmsprod(dir.path(), &["nano", "3", "--dry-run"]);
    assert_eq!(output.status.code(), Some(0));

    let out = stdout(&output);
    assert!(out.contains("/opt/cmssw/bin/cmsDriver.py"));
    assert!(out.contains("--conditions CUSTOM_GT"));
    assert!(out.contains("--era Run3"));
}

#[cfg(unix)]
#[test]
fn test_failing_step_exit_code_propagates() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("NanoAOD_Run2_cfg.sh");
    std::fs::write(&script, "exit 3\n").unwrap();

    let config = write_config(
        &dir,
        &format!(
            r#"
[tools]
cms_driver = "true"
cms_run = "sh"

[workflow.run2]
python_filename = "{}"
"#,
            script.display()
        ),
    );

    let output = cmsprod(dir.path(), &["--config", &config, "nano", "2"]);
    assert_eq!(output.status.code(), Some(3));
}

#[cfg(unix)]
#[test]
fn test_first_failure_stops_sequence() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("ran.txt");
    let script = dir.path().join("cfg.sh");
    std::fs::write(&script, format!("touch {}\n", marker.display())).unwrap();

    let config = write_config(
        &dir,
        &format!(
            r#"
[tools]
cms_driver = "false"
cms_run = "sh"

[workflow.run3]
python_filename = "{}"
"#,
            script.display()
        ),
    );

    let output = cmsprod(dir.path(), &["--config", &config, "nano", "3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!marker.exists(), "cmsRun must not run after cmsDriver.py fails");
}

#[cfg(unix)]
#[test]
fn test_step_killed_by_signal_exits_128_plus_signal() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("cfg.sh");
    std::fs::write(&script, "kill -TERM $$\n").unwrap();

    let config = write_config(
        &dir,
        &format!(
            r#"
[tools]
cms_driver = "true"
cms_run = "sh"

[workflow.run2]
python_filename = "{}"
"#,
            script.display()
        ),
    );

    let output = cmsprod(dir.path(), &["--config", &config, "nano", "2"]);
    assert_eq!(output.status.code(), Some(143));
}

#[cfg(unix)]
#[test]
fn test_local_success_with_stand_in_tools() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
[tools]
cms_driver = "true"
cms_run = "true"
nano_postproc = "true"
"#,
    );

    let output = cmsprod(dir.path(), &["--config", &config, "nano", "local"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Run option local: 3 step(s) completed"));
}

#[test]
fn test_missing_tool_exits_127() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
[tools]
cms_driver = "/nonexistent/bin/cmsDriver.py"
"#,
    );

    let output = cmsprod(dir.path(), &["--config", &config, "nano", "2"]);
    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(
        dir.path(),
        &["--config", "/nonexistent/cmsprod.toml", "nano", "2", "--dry-run"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_filter_eff_invalid_era() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(dir.path(), &["filter-eff", "--era", "2019"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_filter_eff_dry_run_with_sample_list() {
    let dir = TempDir::new().unwrap();
    let lists = dir.path().join("SampleLists");
    std::fs::create_dir(&lists).unwrap();
    std::fs::write(
        lists.join("SignalMC_2017.txt"),
        "# signal\n/TTToHcToWAToMuMu_MHc-100_MA-15_TuneCP5/RunIISummer20UL17MiniAODv2-v1/MINIAODSIM\n",
    )
    .unwrap();

    let output = cmsprod(dir.path(), &["filter-eff", "--era", "2017", "--dry-run"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("[DRY RUN]"));
    assert!(!dir.path().join("FilterEff").join("results_2017.json").exists());
}

#[test]
fn test_crab_requires_target() {
    let dir = TempDir::new().unwrap();
    let output = cmsprod(dir.path(), &["crab", "status"]);
    assert_eq!(output.status.code(), Some(2));
}
