//! Feature records managed by the console.
//!
//! Each feature area has a record type plus typed create (`*Draft`) and
//! update (`*Patch`) requests. Requests validate themselves before they are
//! dispatched; patches only serialize the fields that are set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use seo_console_core::metric::{
    resolve_metric, DisplayMetric, IssueBreakdown, MetricCache, MetricSource, PseudoMetric,
};
use seo_console_core::resource::{
    require_range, require_text, LocalResource, Resource, SortKey, Validate, ValidationError,
};

pub const KEYWORD_STATUSES: &[&str] = &["tracking", "paused", "archived"];
pub const CONTENT_STATUSES: &[&str] = &["draft", "scheduled", "published"];
pub const AI_TOOLS: &[&str] = &[
    "meta-description",
    "title-ideas",
    "blog-outline",
    "content-brief",
    "keyword-clusters",
];

fn require_one_of(
    field: &'static str,
    value: &str,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be one of: {}", allowed.join(", ")),
        ))
    }
}

fn require_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ValidationError::new(field, "must be an http(s) URL")),
    }
}

fn opt_int<N: Into<i64>>(value: Option<N>) -> Option<SortKey> {
    value.map(|v| SortKey::Int(v.into()))
}

fn ts(value: &DateTime<Utc>) -> Option<SortKey> {
    Some(SortKey::Int(value.timestamp()))
}

// ═══════════════════════════════════════════════════════════════════════
// Keywords
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub project_id: String,
    pub keyword: String,
    #[serde(default)]
    pub search_volume: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default = "default_keyword_status")]
    pub status: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_keyword_status() -> String {
    "tracking".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDraft {
    pub project_id: String,
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

impl Validate for KeywordDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("project_id", &self.project_id, 64)?;
        require_text("keyword", &self.keyword, 200)?;
        if let Some(d) = self.difficulty {
            require_range("difficulty", d, 0, 100)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

impl Validate for KeywordPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref s) = self.status {
            require_one_of("status", s, KEYWORD_STATUSES)?;
        }
        if let Some(d) = self.difficulty {
            require_range("difficulty", d, 0, 100)?;
        }
        Ok(())
    }
}

impl Resource for Keyword {
    type Draft = KeywordDraft;
    type Patch = KeywordPatch;
    const SINGULAR: &'static str = "keyword";
    const PLURAL: &'static str = "keywords";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for Keyword {
    fn from_draft(id: String, draft: &KeywordDraft) -> Self {
        Keyword {
            id,
            project_id: draft.project_id.clone(),
            keyword: draft.keyword.trim().to_string(),
            search_volume: draft.search_volume,
            difficulty: draft.difficulty,
            cpc: None,
            position: None,
            status: default_keyword_status(),
            category: draft.category.clone(),
            created_at: Utc::now(),
        }
    }

    fn apply_patch(&mut self, patch: &KeywordPatch) {
        if let Some(ref s) = patch.status {
            self.status = s.clone();
        }
        if let Some(ref c) = patch.category {
            self.category = Some(c.clone());
        }
        if let Some(d) = patch.difficulty {
            self.difficulty = Some(d);
        }
    }

    fn search_text(&self) -> String {
        self.keyword.clone()
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "keyword" => Some(SortKey::Text(self.keyword.to_lowercase())),
            "search_volume" | "volume" => opt_int(self.search_volume),
            "difficulty" => opt_int(self.difficulty),
            "cpc" => self.cpc.map(SortKey::Float),
            "position" => opt_int(self.position),
            "created_at" => ts(&self.created_at),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Content
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_content_status")]
    pub status: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_keyword: Option<String>,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_content_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDraft {
    pub project_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Validate for ContentDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("project_id", &self.project_id, 64)?;
        require_text("title", &self.title, 300)?;
        if let Some(ref url) = self.url {
            require_url("url", url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_keyword: Option<String>,
}

impl Validate for ContentPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref t) = self.title {
            require_text("title", t, 300)?;
        }
        if let Some(ref url) = self.url {
            require_url("url", url)?;
        }
        if let Some(ref s) = self.status {
            require_one_of("status", s, CONTENT_STATUSES)?;
        }
        Ok(())
    }
}

impl Resource for ContentItem {
    type Draft = ContentDraft;
    type Patch = ContentPatch;
    const SINGULAR: &'static str = "content item";
    const PLURAL: &'static str = "content items";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for ContentItem {
    fn from_draft(id: String, draft: &ContentDraft) -> Self {
        ContentItem {
            id,
            project_id: draft.project_id.clone(),
            title: draft.title.trim().to_string(),
            url: draft.url.clone(),
            status: default_content_status(),
            category: draft.category.clone(),
            target_keyword: draft.target_keyword.clone(),
            word_count: draft
                .body
                .as_deref()
                .map(|b| b.split_whitespace().count() as u32)
                .unwrap_or(0),
            updated_at: Utc::now(),
        }
    }

    fn apply_patch(&mut self, patch: &ContentPatch) {
        if let Some(ref t) = patch.title {
            self.title = t.clone();
        }
        if let Some(ref u) = patch.url {
            self.url = Some(u.clone());
        }
        if let Some(ref s) = patch.status {
            self.status = s.clone();
        }
        if let Some(ref c) = patch.category {
            self.category = Some(c.clone());
        }
        if let Some(ref k) = patch.target_keyword {
            self.target_keyword = Some(k.clone());
        }
        self.updated_at = Utc::now();
    }

    fn search_text(&self) -> String {
        match self.target_keyword {
            Some(ref k) => format!("{} {}", self.title, k),
            None => self.title.clone(),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "title" => Some(SortKey::Text(self.title.to_lowercase())),
            "word_count" => opt_int(Some(self.word_count)),
            "updated_at" => ts(&self.updated_at),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Audits
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: String,
    pub project_id: String,
    pub url: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_audit_status")]
    pub status: String,
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Set by the backend once the crawl completes.
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub issues: Option<IssueBreakdown>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_audit_status() -> String {
    "pending".to_string()
}

impl Audit {
    /// The backend's result, once both score and issues are present.
    pub fn authoritative_metric(&self) -> Option<PseudoMetric> {
        match (self.score, self.issues) {
            (Some(score), Some(issue_breakdown)) => Some(PseudoMetric {
                score,
                issue_breakdown,
            }),
            _ => None,
        }
    }

    /// Metric to show for this audit: the real result when available,
    /// otherwise a stable placeholder derived from the audit id.
    pub fn display_metric(&self, cache: &mut MetricCache) -> DisplayMetric {
        match self.authoritative_metric() {
            Some(real) => resolve_metric(Some(real), &self.id),
            None => DisplayMetric {
                metric: cache.get_or_derive(&self.id),
                source: MetricSource::Placeholder,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub project_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl Validate for AuditDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("project_id", &self.project_id, 64)?;
        require_url("url", &self.url)?;
        if let Some(n) = self.max_pages {
            require_range("max_pages", n, 1, 10_000)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
}

impl Validate for AuditPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(n) = self.max_pages {
            require_range("max_pages", n, 1, 10_000)?;
        }
        Ok(())
    }
}

impl Resource for Audit {
    type Draft = AuditDraft;
    type Patch = AuditPatch;
    const SINGULAR: &'static str = "audit";
    const PLURAL: &'static str = "audits";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for Audit {
    fn from_draft(id: String, draft: &AuditDraft) -> Self {
        Audit {
            id,
            project_id: draft.project_id.clone(),
            url: draft.url.clone(),
            label: draft.label.clone(),
            status: default_audit_status(),
            max_pages: draft.max_pages,
            score: None,
            issues: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn apply_patch(&mut self, patch: &AuditPatch) {
        if let Some(ref l) = patch.label {
            self.label = Some(l.clone());
        }
        if let Some(n) = patch.max_pages {
            self.max_pages = Some(n);
        }
    }

    fn search_text(&self) -> String {
        match self.label {
            Some(ref l) => format!("{} {}", self.url, l),
            None => self.url.clone(),
        }
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "url" => Some(SortKey::Text(self.url.clone())),
            "score" => opt_int(self.score),
            "created_at" => ts(&self.created_at),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// AI requests
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRequest {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub tool: String,
    pub prompt: String,
    #[serde(default = "default_ai_status")]
    pub status: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<u32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_ai_status() -> String {
    "queued".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiRequestDraft {
    pub tool: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Validate for AiRequestDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_one_of("tool", &self.tool, AI_TOOLS)?;
        require_text("prompt", &self.prompt, 4000)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiRequestPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl Validate for AiRequestPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.prompt {
            Some(ref p) => require_text("prompt", p, 4000),
            None => Ok(()),
        }
    }
}

impl Resource for AiRequest {
    type Draft = AiRequestDraft;
    type Patch = AiRequestPatch;
    const SINGULAR: &'static str = "AI request";
    const PLURAL: &'static str = "AI requests";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for AiRequest {
    fn from_draft(id: String, draft: &AiRequestDraft) -> Self {
        AiRequest {
            id,
            project_id: draft.project_id.clone(),
            tool: draft.tool.clone(),
            prompt: draft.prompt.clone(),
            status: default_ai_status(),
            output: None,
            tokens_used: None,
            created_at: Utc::now(),
        }
    }

    fn apply_patch(&mut self, patch: &AiRequestPatch) {
        if let Some(ref p) = patch.prompt {
            self.prompt = p.clone();
        }
    }

    fn search_text(&self) -> String {
        self.prompt.clone()
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    /// Requests are categorized by tool.
    fn category(&self) -> Option<&str> {
        Some(&self.tool)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "tool" => Some(SortKey::Text(self.tool.clone())),
            "tokens_used" => opt_int(self.tokens_used),
            "created_at" => ts(&self.created_at),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Rankings
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: String,
    pub keyword_id: String,
    pub keyword: String,
    pub url: String,
    #[serde(default = "default_engine")]
    pub search_engine: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub previous_position: Option<u32>,
    #[serde(default = "Utc::now")]
    pub checked_at: DateTime<Utc>,
}

fn default_engine() -> String {
    "google".to_string()
}
fn default_country() -> String {
    "us".to_string()
}

impl Ranking {
    /// Places gained since the previous check; negative means the page dropped.
    pub fn position_change(&self) -> Option<i64> {
        match (self.previous_position, self.position) {
            (Some(prev), Some(now)) => Some(i64::from(prev) - i64::from(now)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingDraft {
    pub keyword_id: String,
    pub keyword: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

fn require_country(value: &str) -> Result<(), ValidationError> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "country",
            "must be a two-letter country code",
        ))
    }
}

impl Validate for RankingDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("keyword_id", &self.keyword_id, 64)?;
        require_text("keyword", &self.keyword, 200)?;
        require_url("url", &self.url)?;
        if let Some(ref c) = self.country {
            require_country(c)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Validate for RankingPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref u) = self.url {
            require_url("url", u)?;
        }
        if let Some(ref c) = self.country {
            require_country(c)?;
        }
        Ok(())
    }
}

impl Resource for Ranking {
    type Draft = RankingDraft;
    type Patch = RankingPatch;
    const SINGULAR: &'static str = "ranking";
    const PLURAL: &'static str = "rankings";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for Ranking {
    fn from_draft(id: String, draft: &RankingDraft) -> Self {
        Ranking {
            id,
            keyword_id: draft.keyword_id.clone(),
            keyword: draft.keyword.clone(),
            url: draft.url.clone(),
            search_engine: draft.search_engine.clone().unwrap_or_else(default_engine),
            country: draft
                .country
                .as_deref()
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(default_country),
            position: None,
            previous_position: None,
            checked_at: Utc::now(),
        }
    }

    fn apply_patch(&mut self, patch: &RankingPatch) {
        if let Some(ref u) = patch.url {
            self.url = u.clone();
        }
        if let Some(ref c) = patch.country {
            self.country = c.to_ascii_lowercase();
        }
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.keyword, self.url)
    }

    /// Rankings are grouped by search engine.
    fn category(&self) -> Option<&str> {
        Some(&self.search_engine)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "keyword" => Some(SortKey::Text(self.keyword.to_lowercase())),
            "position" => opt_int(self.position),
            "change" => self.position_change().map(SortKey::Int),
            "checked_at" => ts(&self.checked_at),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Traffic reports
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReport {
    pub id: String,
    pub project_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_report_status")]
    pub status: String,
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub pageviews: u64,
    #[serde(default)]
    pub bounce_rate: f64,
}

fn default_report_status() -> String {
    "generating".to_string()
}

impl TrafficReport {
    pub fn pages_per_session(&self) -> f64 {
        if self.sessions == 0 {
            0.0
        } else {
            self.pageviews as f64 / self.sessions as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReportDraft {
    pub project_id: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Validate for TrafficReportDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("project_id", &self.project_id, 64)?;
        if self.period_end < self.period_start {
            return Err(ValidationError::new(
                "period_end",
                "must not be before period_start",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficReportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Validate for TrafficReportPatch {}

impl Resource for TrafficReport {
    type Draft = TrafficReportDraft;
    type Patch = TrafficReportPatch;
    const SINGULAR: &'static str = "traffic report";
    const PLURAL: &'static str = "traffic reports";

    fn id(&self) -> &str {
        &self.id
    }
}

impl LocalResource for TrafficReport {
    fn from_draft(id: String, draft: &TrafficReportDraft) -> Self {
        TrafficReport {
            id,
            project_id: draft.project_id.clone(),
            period_start: draft.period_start,
            period_end: draft.period_end,
            label: draft.label.clone(),
            status: default_report_status(),
            sessions: 0,
            users: 0,
            pageviews: 0,
            bounce_rate: 0.0,
        }
    }

    fn apply_patch(&mut self, patch: &TrafficReportPatch) {
        if let Some(ref l) = patch.label {
            self.label = Some(l.clone());
        }
    }

    fn search_text(&self) -> String {
        self.label.clone().unwrap_or_default()
    }

    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "period_start" => Some(SortKey::Text(self.period_start.to_string())),
            "sessions" => Some(SortKey::Int(self.sessions as i64)),
            "pageviews" => Some(SortKey::Int(self.pageviews as i64)),
            "bounce_rate" => Some(SortKey::Float(self.bounce_rate)),
            _ => None,
        }
    }
}
