use super::{types::Config, ConfigError};
use crate::workflow::NanoProfile;

fn require(value: &str, key: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("{} cannot be empty", key)));
    }
    Ok(())
}

fn validate_profile(profile: &NanoProfile, section: &str) -> Result<(), ConfigError> {
    require(&profile.conditions, &format!("{}.conditions", section))?;
    require(&profile.era, &format!("{}.era", section))?;
    require(&profile.filein, &format!("{}.filein", section))?;
    require(&profile.fileout, &format!("{}.fileout", section))?;
    require(&profile.python_filename, &format!("{}.python_filename", section))?;
    require(&profile.step, &format!("{}.step", section))?;
    Ok(())
}

/// Validate configuration
/// Currently validates:
/// - Tool paths are not empty
/// - Every workflow profile names conditions, era, files and config name
/// - Timeouts are not 0 and the default job count is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let tools = &config.tools;
    require(&tools.cms_driver, "tools.cms_driver")?;
    require(&tools.cms_run, "tools.cms_run")?;
    require(&tools.nano_postproc, "tools.nano_postproc")?;
    require(&tools.dasgoclient, "tools.dasgoclient")?;
    require(&tools.crab, "tools.crab")?;

    validate_profile(&config.workflow.run2, "workflow.run2")?;
    validate_profile(&config.workflow.run3, "workflow.run3")?;
    validate_profile(&config.workflow.local.nano, "workflow.local")?;
    require(
        &config.workflow.local.postproc.output_dir,
        "workflow.local.postproc.output_dir",
    )?;

    let filter_eff = &config.filter_eff;
    if filter_eff.das_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "filter_eff.das_timeout_secs cannot be 0".to_string(),
        ));
    }
    if filter_eff.cmsrun_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "filter_eff.cmsrun_timeout_secs cannot be 0".to_string(),
        ));
    }
    if filter_eff.jobs == 0 {
        return Err(ConfigError::ValidationError(
            "filter_eff.jobs must be at least 1".to_string(),
        ));
    }

    if config.mcm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "mcm.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
