//! From PrepIDs, datasets and chains to filter efficiencies.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::sync::Arc;
use tracing::{info, warn};

use super::efficiency::{extract_filter_efficiency, EfficiencyInfo};
use super::types::{ChainReference, McmRequest};
use super::McmApi;

/// Generator request PrepID inside a ReqMgr workflow name, e.g.
/// `pdmvserv_task_B2G-RunIISummer20UL16wmLHEGENAPV-07713__v1_T_...`.
static REQMGR_WMLHE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z]{2,3}-Run(?:II|3)\w*wmLHEG(?:EN|S)(?:APV)?-\d+)").unwrap()
});

static CHAIN_WMLHEGEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Run(?:II|3)\w+wmLHEGEN)").unwrap());

static CHAIN_WMLHEGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(Run(?:II|3)\w+wmLHEGS)").unwrap());

/// wmLHEGEN/wmLHEGS PrepID named in the request's ReqMgr workflows.
pub fn wmlhe_prepid_from_reqmgr(request: &McmRequest) -> Option<String> {
    request.reqmgr_names().iter().find_map(|name| {
        REQMGR_WMLHE
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Guesses the generator PrepID from a chained request id.
///
/// `HIG-chain_RunIISummer20UL16wmLHEGEN_flow..._flowRunIISummer20UL16MiniAODv2-01153`
/// becomes `HIG-RunIISummer20UL16wmLHEGEN-01153`. The guess assumes the
/// generator request shares the chain's serial number, which is not always
/// true.
pub fn infer_wmlhe_prepid_from_chain(chain_id: &str) -> Option<String> {
    let (group, _) = chain_id.split_once('-')?;
    let (_, number) = chain_id.rsplit_once('-')?;

    let campaign_re = if chain_id.contains("wmLHEGEN") {
        &CHAIN_WMLHEGEN
    } else if chain_id.contains("wmLHEGS") {
        &CHAIN_WMLHEGS
    } else {
        return None;
    };

    let campaign = campaign_re.captures(chain_id)?.get(1)?.as_str();
    Some(format!("{}-{}-{}", group, campaign, number))
}

/// The generator request of a chain: by PrepID first, then by a `/GEN`
/// output dataset.
pub fn find_wmlhe_in_chain(requests: &[McmRequest]) -> Option<&McmRequest> {
    requests
        .iter()
        .find(|r| r.prepid.contains("wmLHEGEN") || r.prepid.contains("wmLHEGS"))
        .or_else(|| requests.iter().find(|r| r.dataset_name.ends_with("/GEN")))
}

/// What happened while looking for the generator request of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorStatus {
    /// Generator request found and it carries a filter efficiency.
    Found { prepid: String },
    /// Generator request found without a filter efficiency.
    NoEfficiency { prepid: String },
    /// A generator PrepID was derived but could not be fetched.
    FetchFailed { prepid: String },
    /// The chain was fetched but holds no generator request.
    NotInChain,
    /// No route to the chain (usually missing authentication).
    ChainUnresolved,
    /// McM knows no request producing the dataset.
    DatasetNotFound,
}

#[derive(Debug, Clone)]
pub struct DatasetLookup {
    /// MiniAOD request summary first, then the generator request's.
    pub results: Vec<EfficiencyInfo>,
    pub generator: GeneratorStatus,
}

/// Lookup strategies over an [`McmApi`].
///
/// API errors are logged and treated like missing data, so a failed
/// authenticated fallback never hides what the public API returned.
pub struct McmLookup {
    api: Arc<dyn McmApi>,
}

impl McmLookup {
    pub fn new(api: Arc<dyn McmApi>) -> Self {
        Self { api }
    }

    async fn fetch(&self, prepid: &str) -> Option<McmRequest> {
        match self.api.get_request(prepid).await {
            Ok(request) => request,
            Err(e) => {
                warn!("Error fetching request {}: {}", prepid, e);
                None
            }
        }
    }

    async fn fetch_all(&self, prepids: &[String]) -> Vec<McmRequest> {
        let mut requests = Vec::new();
        for prepid in prepids {
            if let Some(request) = self.fetch(prepid).await {
                requests.push(request);
            }
        }
        requests
    }

    /// Every request of a chained request, in chain order.
    pub async fn chain_requests(&self, chain_prepid: &str) -> Vec<McmRequest> {
        let chained = match self.api.get_chained_request(chain_prepid).await {
            Ok(Some(chained)) => chained,
            Ok(None) => {
                info!("No results found for chain PrepID: {}", chain_prepid);
                return Vec::new();
            }
            Err(e) => {
                warn!("Error fetching chain request {}: {}", chain_prepid, e);
                return Vec::new();
            }
        };

        if chained.chain.is_empty() {
            info!("No chain PrepIDs found in {}", chain_prepid);
            return Vec::new();
        }

        info!("Found {} requests in chain", chained.chain.len());
        self.fetch_all(&chained.chain).await
    }

    pub async fn by_prepid(&self, prepid: &str) -> Vec<EfficiencyInfo> {
        self.fetch(prepid)
            .await
            .map(|request| vec![extract_filter_efficiency(&request)])
            .unwrap_or_default()
    }

    pub async fn by_chain(&self, chain_prepid: &str) -> Vec<EfficiencyInfo> {
        self.chain_requests(chain_prepid)
            .await
            .iter()
            .map(extract_filter_efficiency)
            .collect()
    }

    /// Resolves a MiniAOD dataset to its generator request.
    ///
    /// The generator PrepID is read from the MiniAOD request's ReqMgr
    /// workflow names when possible; otherwise the production chain is
    /// fetched and searched.
    pub async fn by_dataset(&self, dataset: &str) -> DatasetLookup {
        let requests = match self.api.search_requests(dataset).await {
            Ok(requests) => requests,
            Err(e) => {
                warn!("Error searching for dataset {}: {}", dataset, e);
                Vec::new()
            }
        };

        let Some(miniaod) = requests.into_iter().next() else {
            return DatasetLookup {
                results: Vec::new(),
                generator: GeneratorStatus::DatasetNotFound,
            };
        };

        let mut results = vec![extract_filter_efficiency(&miniaod)];

        let generator = match wmlhe_prepid_from_reqmgr(&miniaod) {
            Some(prepid) => {
                info!("Derived generator PrepID from reqmgr_name: {}", prepid);
                match self.fetch(&prepid).await {
                    Some(request) => accept_generator(&request, &mut results),
                    None => GeneratorStatus::FetchFailed { prepid },
                }
            }
            None => self.generator_from_chain(&miniaod, &mut results).await,
        };

        DatasetLookup { results, generator }
    }

    async fn generator_from_chain(
        &self,
        miniaod: &McmRequest,
        results: &mut Vec<EfficiencyInfo>,
    ) -> GeneratorStatus {
        let chain = match miniaod.chain_reference() {
            Some(ChainReference::Prepids(prepids)) => {
                info!("Found chain with {} PrepIDs directly", prepids.len());
                self.fetch_all(&prepids).await
            }
            Some(ChainReference::ChainId(chain_id)) => {
                info!("Fetching chain: {}", chain_id);
                let requests = self.chain_requests(&chain_id).await;
                if requests.is_empty() {
                    self.inferred_generator(&chain_id).await
                } else {
                    requests
                }
            }
            None => Vec::new(),
        };

        if chain.is_empty() {
            return GeneratorStatus::ChainUnresolved;
        }

        match find_wmlhe_in_chain(&chain) {
            Some(request) => accept_generator(request, results),
            None => GeneratorStatus::NotInChain,
        }
    }

    async fn inferred_generator(&self, chain_id: &str) -> Vec<McmRequest> {
        let Some(prepid) = infer_wmlhe_prepid_from_chain(chain_id) else {
            return Vec::new();
        };
        info!("Inferred generator PrepID: {}", prepid);
        self.fetch(&prepid).await.into_iter().collect()
    }
}

fn accept_generator(request: &McmRequest, results: &mut Vec<EfficiencyInfo>) -> GeneratorStatus {
    let info = extract_filter_efficiency(request);
    let prepid = request.prepid.clone();
    if info.has_efficiency() {
        results.push(info);
        GeneratorStatus::Found { prepid }
    } else {
        GeneratorStatus::NoEfficiency { prepid }
    }
}
