use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use shared::{ActivityItem, RepoId};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ItemType {
    PullRequest,
    Issue,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::PullRequest => "pull_request",
            ItemType::Issue => "issue",
        }
    }
}

impl EncodeLabelValue for ItemType {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        EncodeLabelValue::encode(&self.as_str(), encoder)
    }
}

impl From<&ActivityItem> for ItemType {
    fn from(item: &ActivityItem) -> Self {
        if item.is_pull_request() {
            ItemType::PullRequest
        } else {
            ItemType::Issue
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct IngestedItem {
    pub repository: String,
    pub kind: ItemType,
}

pub struct PrometheusClient {
    registry: Registry,
    ingested_items: Family<IngestedItem, Counter>,

    // Counted locally, one per request this run sent
    github_api_read_request: Counter,
    // Taken from the rate-limit endpoint, so it includes other clients using the same token
    github_api_rate_limit_used: Gauge,
}

impl Default for PrometheusClient {
    fn default() -> Self {
        let mut registry = Registry::default();
        let ingested_items = Family::default();
        let github_api_read_request = Counter::default();
        let github_api_rate_limit_used = Gauge::default();

        registry.register(
            "github_api_read_requests",
            "Total github read requests sent by this run",
            github_api_read_request.clone(),
        );
        registry.register(
            "github_api_rate_limit_used",
            "Used github core rate limit at a metric time",
            github_api_rate_limit_used.clone(),
        );
        registry.register(
            "analyzer_ingested_items",
            "Pull requests and issues read per repository",
            ingested_items.clone(),
        );

        Self {
            registry,
            ingested_items,
            github_api_read_request,
            github_api_rate_limit_used,
        }
    }
}

impl PrometheusClient {
    pub fn record_items(&self, repository: &RepoId, items: &[ActivityItem]) {
        for item in items {
            self.ingested_items
                .get_or_create(&IngestedItem {
                    repository: repository.full_id(),
                    kind: item.into(),
                })
                .inc();
        }
    }

    pub fn add_read_request(&self) {
        self.github_api_read_request.inc();
    }

    pub fn set_rate_limit_used(&self, value: i64) {
        self.github_api_rate_limit_used.set(value);
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}
