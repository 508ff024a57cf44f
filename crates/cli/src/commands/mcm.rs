use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use cmsprod_core::{EfficiencyInfo, GeneratorStatus, McmClient, McmLookup};

use crate::cli::McmArgs;

pub async fn run(args: McmArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = super::load_config(config_path)?;

    let mut mcm_config = config.mcm.clone();
    mcm_config.dev |= args.dev;

    let client = McmClient::new(&mcm_config).context("Failed to create McM client")?;
    let lookup = McmLookup::new(Arc::new(client));

    let results = if let Some(prepid) = &args.target.prepid {
        println!("Fetching request: {}", prepid);
        lookup.by_prepid(prepid).await
    } else if let Some(dataset) = &args.target.dataset {
        println!("Searching for dataset: {}", dataset);
        let found = lookup.by_dataset(dataset).await;
        print_generator_status(&found.generator);
        found.results
    } else if let Some(chain) = &args.target.chain {
        println!("Fetching chain: {}", chain);
        lookup.by_chain(chain).await
    } else {
        Vec::new()
    };

    for info in &results {
        println!("\n{}", info.render(args.verbose));
    }

    if results.is_empty() {
        println!("No results found");
        return Ok(1);
    }

    if let Some(output) = &args.output {
        save(&results, output)?;
        println!("\nResults saved to: {}", output.display());
    }

    Ok(0)
}

/// Writes one object for a single result, a list otherwise.
fn save(results: &[EfficiencyInfo], output: &Path) -> Result<()> {
    let json = match results {
        [single] => serde_json::to_string_pretty(single)?,
        many => serde_json::to_string_pretty(many)?,
    };
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))
}

fn print_generator_status(status: &GeneratorStatus) {
    match status {
        GeneratorStatus::Found { prepid } => {
            println!("Filter efficiency from generator request {}", prepid);
        }
        GeneratorStatus::NoEfficiency { prepid } => {
            println!("No filter efficiency found in generator request {}", prepid);
        }
        GeneratorStatus::FetchFailed { prepid } => {
            println!("Failed to fetch generator request: {}", prepid);
        }
        GeneratorStatus::NotInChain => println!("No wmLHEGEN request found in chain"),
        GeneratorStatus::ChainUnresolved => println!(
            "Failed to resolve the generator request via the chain. \
             Consider using --prepid or authenticating."
        ),
        GeneratorStatus::DatasetNotFound => {
            println!("\nHint: If the dataset search fails, try:");
            println!("1. Find the PrepID in the McM web interface: https://cms-pdmv.cern.ch/mcm");
            println!("2. Use the PrepID directly: --prepid <PREPID>");
            println!("3. Check if your cookie is still valid");
        }
    }
}
