//! Parameter tables for the NanoAOD workflow.
//!
//! Each run option maps to a literal tuple of dataset label, global tag, era,
//! input and output file. The built-in tables below are what `cmsprod nano`
//! runs when no config file overrides them.

use serde::{Deserialize, Serialize};

use super::types::{RunOption, WorkflowPlan};
use crate::config::ToolsConfig;
use crate::exec::Invocation;

/// One `cmsDriver.py` + `cmsRun` production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NanoProfile {
    /// Free-form label of the sample being processed (for logs only).
    pub dataset: String,
    /// Global tag passed as `--conditions`.
    pub conditions: String,
    /// Era modifier chain passed as `--era`.
    pub era: String,
    /// Input file (`--filein`), e.g. `file:MiniAOD.root` or an LFN.
    pub filein: String,
    /// Output file (`--fileout`).
    pub fileout: String,
    /// Name of the configuration `cmsDriver.py` writes and `cmsRun` executes.
    pub python_filename: String,
    #[serde(default = "default_step")]
    pub step: String,
    #[serde(default = "default_eventcontent")]
    pub eventcontent: String,
    #[serde(default = "default_datatier")]
    pub datatier: String,
    /// Simulation (`--mc`) or collision data (`--data`).
    #[serde(default = "default_mc")]
    pub mc: bool,
    /// Event count passed as `-n`; `-1` processes everything.
    #[serde(default = "default_events")]
    pub events: i64,
    #[serde(default)]
    pub customise: Vec<String>,
    /// Appended after the generated flags, before `--no_exec`.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_step() -> String {
    "NANO".to_string()
}

fn default_eventcontent() -> String {
    "NANOAODSIM".to_string()
}

fn default_datatier() -> String {
    "NANOAODSIM".to_string()
}

fn default_mc() -> bool {
    true
}

fn default_events() -> i64 {
    -1
}

impl NanoProfile {
    /// Arguments for `cmsDriver.py`, in the order McM-generated scripts use.
    pub fn cms_driver_args(&self) -> Vec<String> {
        let mut args = vec![
            "--python_filename".to_string(),
            self.python_filename.clone(),
            "--eventcontent".to_string(),
            self.eventcontent.clone(),
        ];

        for customise in &self.customise {
            args.extend(["--customise".to_string(), customise.clone()]);
        }

        args.extend([
            "--datatier".to_string(),
            self.datatier.clone(),
            "--fileout".to_string(),
            self.fileout.clone(),
            "--conditions".to_string(),
            self.conditions.clone(),
            "--step".to_string(),
            self.step.clone(),
            "--filein".to_string(),
            self.filein.clone(),
            "--era".to_string(),
            self.era.clone(),
        ]);

        args.extend(self.extra_args.iter().cloned());

        args.extend([
            "--no_exec".to_string(),
            if self.mc { "--mc" } else { "--data" }.to_string(),
            "-n".to_string(),
            self.events.to_string(),
        ]);

        args
    }

    /// The configuration-generation and execution steps.
    pub fn invocations(&self, tools: &ToolsConfig) -> Vec<Invocation> {
        vec![
            Invocation::new(&tools.cms_driver).args(self.cms_driver_args()),
            Invocation::new(&tools.cms_run).arg(&self.python_filename),
        ]
    }

    /// Output file as a filesystem path (the `file:` scheme stripped).
    pub fn output_path(&self) -> &str {
        self.fileout.strip_prefix("file:").unwrap_or(&self.fileout)
    }
}

/// `nano_postproc.py` settings applied to a local production's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcProfile {
    pub output_dir: String,
    /// Suffix appended to the output file name (`-s`).
    #[serde(default = "default_postfix")]
    pub postfix: String,
    /// Keep/drop file applied to input and output branches (`--bi`/`--bo`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_selection: Option<String>,
    /// Entry cap (`-N`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<u64>,
}

fn default_postfix() -> String {
    "_Skim".to_string()
}

impl PostProcProfile {
    pub fn invocation(&self, tools: &ToolsConfig, input: &str) -> Invocation {
        let mut inv = Invocation::new(&tools.nano_postproc)
            .arg(&self.output_dir)
            .arg(input)
            .args(["-s", self.postfix.as_str()]);

        if let Some(selection) = &self.branch_selection {
            inv = inv.args(["--bi", selection.as_str(), "--bo", selection.as_str()]);
        }
        if let Some(entries) = self.max_entries {
            inv = inv.args(["-N".to_string(), entries.to_string()]);
        }

        inv
    }
}

/// Local test production: a small NanoAOD production then post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProfile {
    #[serde(flatten)]
    pub nano: NanoProfile,
    pub postproc: PostProcProfile,
}

impl Default for LocalProfile {
    fn default() -> Self {
        Self {
            nano: NanoProfile {
                dataset: "local test sample (Run 3)".to_string(),
                conditions: "130X_mcRun3_2022_realistic_v5".to_string(),
                era: "Run3".to_string(),
                filein: "file:MiniAOD_local.root".to_string(),
                fileout: "file:NanoAOD_local.root".to_string(),
                python_filename: "NanoAOD_local_cfg.py".to_string(),
                step: default_step(),
                eventcontent: default_eventcontent(),
                datatier: default_datatier(),
                mc: true,
                events: 1000,
                customise: Vec::new(),
                extra_args: Vec::new(),
            },
            postproc: PostProcProfile {
                output_dir: "postproc_local".to_string(),
                postfix: default_postfix(),
                branch_selection: None,
                max_entries: None,
            },
        }
    }
}

/// The `[workflow]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_run2")]
    pub run2: NanoProfile,
    #[serde(default = "default_run3")]
    pub run3: NanoProfile,
    #[serde(default)]
    pub local: LocalProfile,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            run2: default_run2(),
            run3: default_run3(),
            local: LocalProfile::default(),
        }
    }
}

fn default_run2() -> NanoProfile {
    NanoProfile {
        dataset: "RunIISummer20UL18 MiniAODv2 (2018 UL)".to_string(),
        conditions: "106X_upgrade2018_realistic_v16_L1v1".to_string(),
        era: "Run2_2018,run2_nanoAOD_106Xv2".to_string(),
        filein: "file:MiniAOD_Run2.root".to_string(),
        fileout: "file:NanoAOD_Run2.root".to_string(),
        python_filename: "NanoAOD_Run2_cfg.py".to_string(),
        step: default_step(),
        eventcontent: default_eventcontent(),
        datatier: default_datatier(),
        mc: true,
        events: -1,
        customise: vec!["Configuration/DataProcessing/Utils.addMonitoring".to_string()],
        extra_args: Vec::new(),
    }
}

fn default_run3() -> NanoProfile {
    NanoProfile {
        dataset: "Run3Summer22 MiniAODv4 (2022)".to_string(),
        conditions: "130X_mcRun3_2022_realistic_v5".to_string(),
        era: "Run3".to_string(),
        filein: "file:MiniAOD_Run3.root".to_string(),
        fileout: "file:NanoAOD_Run3.root".to_string(),
        python_filename: "NanoAOD_Run3_cfg.py".to_string(),
        step: default_step(),
        eventcontent: default_eventcontent(),
        datatier: default_datatier(),
        mc: true,
        events: -1,
        customise: vec!["Configuration/DataProcessing/Utils.addMonitoring".to_string()],
        extra_args: Vec::new(),
    }
}

impl WorkflowConfig {
    /// The profile whose `cmsDriver.py`/`cmsRun` pair a run option starts with.
    pub fn profile(&self, option: RunOption) -> &NanoProfile {
        match option {
            RunOption::Run2 => &self.run2,
            RunOption::Run3 => &self.run3,
            RunOption::Local => &self.local.nano,
        }
    }

    /// Builds the fixed, ordered sequence of calls for a run option.
    pub fn plan(&self, option: RunOption, tools: &ToolsConfig) -> WorkflowPlan {
        let profile = self.profile(option);
        let mut steps = profile.invocations(tools);

        if option == RunOption::Local {
            steps.push(
                self.local
                    .postproc
                    .invocation(tools, profile.output_path()),
            );
        }

        WorkflowPlan {
            option,
            dataset: profile.dataset.clone(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run2_plan_order() {
        let config = WorkflowConfig::default();
        let plan = config.plan(RunOption::Run2, &ToolsConfig::default());

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].program, "cmsDriver.py");
        assert_eq!(plan.steps[1].program, "cmsRun");
        assert_eq!(plan.steps[1].args, vec!["NanoAOD_Run2_cfg.py"]);

        let args = &plan.steps[0].args;
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--conditions") + 1], "106X_upgrade2018_realistic_v16_L1v1");
        assert_eq!(args[pos("--era") + 1], "Run2_2018,run2_nanoAOD_106Xv2");
        assert_eq!(args[pos("--filein") + 1], "file:MiniAOD_Run2.root");
        assert_eq!(args[pos("--fileout") + 1], "file:NanoAOD_Run2.root");
        assert!(pos("--era") < pos("--no_exec"));
        assert_eq!(&args[args.len() - 4..], ["--no_exec", "--mc", "-n", "-1"]);
    }

    #[test]
    fn test_run3_plan_uses_run3_tag() {
        let config = WorkflowConfig::default();
        let plan = config.plan(RunOption::Run3, &ToolsConfig::default());
        let line = plan.steps[0].command_line();
        assert!(line.contains("--conditions 130X_mcRun3_2022_realistic_v5"));
        assert!(line.contains("--era Run3"));
        assert_eq!(plan.steps[1].command_line(), "cmsRun NanoAOD_Run3_cfg.py");
    }

    #[test]
    fn test_local_plan_ends_with_postproc() {
        let config = WorkflowConfig::default();
        let plan = config.plan(RunOption::Local, &ToolsConfig::default());

        assert_eq!(plan.steps.len(), 3);
        let postproc = &plan.steps[2];
        assert_eq!(postproc.program, "nano_postproc.py");
        assert_eq!(
            postproc.args,
            vec!["postproc_local", "NanoAOD_local.root", "-s", "_Skim"]
        );
        assert!(plan.steps[0].args.contains(&"1000".to_string()));
    }

    #[test]
    fn test_postproc_optional_flags() {
        let profile = PostProcProfile {
            output_dir: "out".to_string(),
            postfix: "_Friend".to_string(),
            branch_selection: Some("keep_and_drop.txt".to_string()),
            max_entries: Some(500),
        };
        let inv = profile.invocation(&ToolsConfig::default(), "in.root");
        assert_eq!(
            inv.command_line(),
            "nano_postproc.py out in.root -s _Friend --bi keep_and_drop.txt --bo keep_and_drop.txt -N 500"
        );
    }

    #[test]
    fn test_data_profile_and_custom_tools() {
        let mut config = WorkflowConfig::default();
        config.run2.mc = false;
        config.run2.customise.clear();
        config.run2.extra_args = vec!["--nThreads".to_string(), "4".to_string()];

        let tools = ToolsConfig {
            cms_driver: "/opt/cmssw/bin/cmsDriver.py".to_string(),
            ..ToolsConfig::default()
        };
        let plan = config.plan(RunOption::Run2, &tools);
        let args = &plan.steps[0].args;

        assert_eq!(plan.steps[0].program, "/opt/cmssw/bin/cmsDriver.py");
        assert!(args.contains(&"--data".to_string()));
        assert!(!args.contains(&"--customise".to_string()));
        let threads = args.iter().position(|a| a == "--nThreads").unwrap();
        assert!(threads < args.iter().position(|a| a == "--no_exec").unwrap());
    }

    #[test]
    fn test_partial_toml_profile_uses_field_defaults() {
        let toml = r#"
dataset = "custom"
conditions = "GT"
era = "ERA"
filein = "file:in.root"
fileout = "file:out.root"
python_filename = "cfg.py"
"#;
        let profile: NanoProfile = toml::from_str(toml).unwrap();
        assert_eq!(profile.step, "NANO");
        assert_eq!(profile.events, -1);
        assert!(profile.mc);
        assert!(profile.customise.is_empty());
    }
}
