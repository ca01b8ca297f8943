//! The console session: one controller per feature area.
//!
//! A [`Console`] is an ordinary value built from [`Config`]. Nothing is
//! global; tests build as many isolated consoles as they need.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use serde::Serialize;

use seo_console_core::controller::{OperationResult, ResourceController};
use seo_console_core::metric::{DisplayMetric, MetricCache};
use seo_console_core::operation::Operation;
use seo_console_core::resource::Resource;
use seo_console_core::service::memory::InMemoryService;
use seo_console_core::service::{Collaborator, FnCollaborator, ResourceService};
use seo_console_core::slice::ResourceSlice;
use seo_console_core::store::SliceStore;

use crate::config::{Config, FeatureConfig};
use crate::http::{ActionCollaborator, RestClient, RestResource, RestService};
use crate::models::{AiRequest, Audit, ContentItem, Keyword, Ranking, TrafficReport};

pub const RERUN_AUDIT: Operation = Operation::Custom("rerun");
pub const RETRY_AI_REQUEST: Operation = Operation::Custom("retry");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Keywords,
    Content,
    Audits,
    AiRequests,
    Rankings,
    Traffic,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Keywords => "keywords",
            Feature::Content => "content",
            Feature::Audits => "audits",
            Feature::AiRequests => "ai_requests",
            Feature::Rankings => "rankings",
            Feature::Traffic => "traffic",
        }
    }

    pub fn settings(self, config: &Config) -> &FeatureConfig {
        let f = &config.features;
        match self {
            Feature::Keywords => &f.keywords,
            Feature::Content => &f.content,
            Feature::Audits => &f.audits,
            Feature::AiRequests => &f.ai_requests,
            Feature::Rankings => &f.rankings,
            Feature::Traffic => &f.traffic,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records to preload into an offline console.
#[derive(Debug, Default)]
pub struct OfflineData {
    pub keywords: Vec<Keyword>,
    pub content: Vec<ContentItem>,
    pub audits: Vec<Audit>,
    pub ai_requests: Vec<AiRequest>,
    pub rankings: Vec<Ranking>,
    pub traffic: Vec<TrafficReport>,
}

pub struct Console {
    pub keywords: ResourceController<Keyword>,
    pub content: ResourceController<ContentItem>,
    pub audits: ResourceController<Audit>,
    pub ai_requests: ResourceController<AiRequest>,
    pub rankings: ResourceController<Ranking>,
    pub traffic: ResourceController<TrafficReport>,
    rerun_audit: Arc<dyn Collaborator<String, Audit>>,
    retry_ai_request: Arc<dyn Collaborator<String, AiRequest>>,
    metrics: Mutex<MetricCache>,
}

fn controller<T: Resource>(
    config: &Config,
    feature: Feature,
    service: Arc<dyn ResourceService<T>>,
) -> ResourceController<T> {
    let settings = feature.settings(config);
    let slice = ResourceSlice::new(settings.create_policy, config.limit_for(settings))
        .with_max_limit(config.pagination.max_limit);
    ResourceController::new(Arc::new(SliceStore::from_slice(slice)), service)
}

fn rest<T: RestResource>(client: &Arc<RestClient>) -> Arc<dyn ResourceService<T>> {
    Arc::new(RestService::<T>::new(Arc::clone(client)))
}

impl Console {
    /// Console backed by the REST API in `config.api`.
    pub fn connect(config: &Config) -> Result<Self> {
        let client = Arc::new(RestClient::new(&config.api)?);
        Ok(Self {
            keywords: controller(config, Feature::Keywords, rest(&client)),
            content: controller(config, Feature::Content, rest(&client)),
            audits: controller(config, Feature::Audits, rest(&client)),
            ai_requests: controller(config, Feature::AiRequests, rest(&client)),
            rankings: controller(config, Feature::Rankings, rest(&client)),
            traffic: controller(config, Feature::Traffic, rest(&client)),
            rerun_audit: Arc::new(ActionCollaborator::<Audit>::new(Arc::clone(&client), "rerun")),
            retry_ai_request: Arc::new(ActionCollaborator::<AiRequest>::new(client, "retry")),
            metrics: Mutex::new(MetricCache::new()),
        })
    }

    /// Console backed by empty in-memory collections.
    pub fn offline(config: &Config) -> Self {
        Self::offline_with(config, OfflineData::default())
    }

    pub fn offline_with(config: &Config, data: OfflineData) -> Self {
        let audits = Arc::new(InMemoryService::with_records(data.audits));
        let ai_requests = Arc::new(InMemoryService::with_records(data.ai_requests));

        let audit_store = Arc::clone(&audits);
        let rerun: FnCollaborator<_, String, Audit> = FnCollaborator::new(move |id: String| {
            let store = Arc::clone(&audit_store);
            async move {
                store.modify(&id, |audit| {
                    audit.status = "pending".to_string();
                    audit.score = None;
                    audit.issues = None;
                    audit.completed_at = None;
                })
            }
        });

        let ai_store = Arc::clone(&ai_requests);
        let retry: FnCollaborator<_, String, AiRequest> = FnCollaborator::new(move |id: String| {
            let store = Arc::clone(&ai_store);
            async move {
                store.modify(&id, |request| {
                    request.status = "queued".to_string();
                    request.output = None;
                })
            }
        });

        Self {
            keywords: controller(
                config,
                Feature::Keywords,
                Arc::new(InMemoryService::with_records(data.keywords)),
            ),
            content: controller(
                config,
                Feature::Content,
                Arc::new(InMemoryService::with_records(data.content)),
            ),
            audits: controller(config, Feature::Audits, audits),
            ai_requests: controller(config, Feature::AiRequests, ai_requests),
            rankings: controller(
                config,
                Feature::Rankings,
                Arc::new(InMemoryService::with_records(data.rankings)),
            ),
            traffic: controller(
                config,
                Feature::Traffic,
                Arc::new(InMemoryService::with_records(data.traffic)),
            ),
            rerun_audit: Arc::new(rerun),
            retry_ai_request: Arc::new(retry),
            metrics: Mutex::new(MetricCache::new()),
        }
    }

    /// Queue an audit to run again. The updated audit replaces the loaded one.
    pub async fn rerun_audit(&self, id: &str) -> OperationResult<Audit> {
        self.audits
            .perform(RERUN_AUDIT, self.rerun_audit.as_ref(), id.to_string())
            .await
    }

    pub async fn retry_ai_request(&self, id: &str) -> OperationResult<AiRequest> {
        self.ai_requests
            .perform(RETRY_AI_REQUEST, self.retry_ai_request.as_ref(), id.to_string())
            .await
    }

    /// Display metrics for every loaded audit, in list order.
    ///
    /// Completed audits show their real result; the rest show the
    /// placeholder derived from their id. Each call is one rendering pass
    /// and starts from an empty cache.
    pub fn audit_metrics(&self) -> Vec<(String, DisplayMetric)> {
        let snapshot = self.audits.snapshot();
        let mut cache = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        cache.clear();
        snapshot
            .items()
            .iter()
            .map(|audit| (audit.id.clone(), audit.display_metric(&mut cache)))
            .collect()
    }

    /// Placeholder metric for any identifier, memoized until the next
    /// [`Console::audit_metrics`] pass.
    pub fn placeholder_metric(&self, source_id: &str) -> seo_console_core::metric::PseudoMetric {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_derive(source_id)
    }

    /// Reset every feature's state, e.g. on sign-out.
    pub fn clear_all(&self) {
        self.keywords.clear();
        self.content.clear();
        self.audits.clear();
        self.ai_requests.clear();
        self.rankings.clear();
        self.traffic.clear();
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuditDraft;
    use seo_console_core::metric::{derive_metric, MetricSource};
    use seo_console_core::operation::OperationStatus;
    use seo_console_core::resource::LocalResource;
    use seo_console_core::slice::CreatePolicy;

    fn audit(id: &str) -> Audit {
        Audit::from_draft(
            id.to_string(),
            &AuditDraft {
                project_id: "p1".into(),
                url: "https://example.com".into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_policies_follow_config() {
        let console = Console::offline(&Config::minimal());
        assert_eq!(
            console.keywords.snapshot().create_policy(),
            CreatePolicy::Append
        );
        assert_eq!(
            console.content.snapshot().create_policy(),
            CreatePolicy::Refetch
        );
        assert_eq!(console.traffic.snapshot().pagination().limit, 20);
    }

    #[tokio::test]
    async fn test_rerun_audit_offline() {
        let mut done = audit("a1");
        done.status = "completed".into();
        done.score = Some(88);
        done.issues = Some(Default::default());
        let console = Console::offline_with(
            &Config::minimal(),
            OfflineData {
                audits: vec![done],
                ..Default::default()
            },
        );
        console.audits.fetch_list().await.unwrap();
        assert_eq!(
            console.audit_metrics()[0].1.source,
            MetricSource::Authoritative
        );

        let rerun = console.rerun_audit("a1").await.unwrap();
        assert_eq!(rerun.status, "pending");
        let snap = console.audits.snapshot();
        assert_eq!(snap.status(RERUN_AUDIT), OperationStatus::Succeeded);
        assert_eq!(snap.item("a1").unwrap().status, "pending");

        let metrics = console.audit_metrics();
        assert_eq!(metrics[0].1.source, MetricSource::Placeholder);
        assert_eq!(metrics[0].1.metric, derive_metric("a1"));
    }

    #[tokio::test]
    async fn test_metric_cache_scoped_to_pass() {
        let console = Console::offline_with(
            &Config::minimal(),
            OfflineData {
                audits: vec![audit("a1")],
                ..Default::default()
            },
        );
        console.audits.fetch_list().await.unwrap();
        assert_eq!(console.placeholder_metric("x1"), derive_metric("x1"));
        console.placeholder_metric("x2");
        assert_eq!(console.metrics.lock().unwrap().len(), 2);

        console.audit_metrics();
        assert_eq!(console.metrics.lock().unwrap().len(), 1);
        console.audit_metrics();
        assert_eq!(console.metrics.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_unknown_request_records_error() {
        let console = Console::offline(&Config::minimal());
        let err = console.retry_ai_request("missing").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
        let snap = console.ai_requests.snapshot();
        assert_eq!(snap.status(RETRY_AI_REQUEST), OperationStatus::Failed);
        assert!(snap.error(RETRY_AI_REQUEST).unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let console = Console::offline_with(
            &Config::minimal(),
            OfflineData {
                audits: vec![audit("a1"), audit("a2")],
                ..Default::default()
            },
        );
        console.audits.fetch_list().await.unwrap();
        assert_eq!(console.audit_metrics().len(), 2);
        console.clear_all();
        assert!(console.audits.snapshot().items().is_empty());
        assert!(console.audit_metrics().is_empty());
    }
}
