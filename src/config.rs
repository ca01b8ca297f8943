use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use seo_console_core::slice::CreatePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_token_env() -> String {
    "SEO_CONSOLE_TOKEN".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u32 {
    20
}
fn default_max_limit() -> u32 {
    100
}

/// Per-feature settings. Each feature picks one create policy.
#[derive(Debug, Deserialize, Clone)]
pub struct FeaturesConfig {
    #[serde(default = "append")]
    pub keywords: FeatureConfig,
    #[serde(default = "refetch")]
    pub content: FeatureConfig,
    #[serde(default = "append")]
    pub audits: FeatureConfig,
    #[serde(default = "append")]
    pub ai_requests: FeatureConfig,
    #[serde(default = "refetch")]
    pub rankings: FeatureConfig,
    #[serde(default = "refetch")]
    pub traffic: FeatureConfig,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            keywords: append(),
            content: refetch(),
            audits: append(),
            ai_requests: append(),
            rankings: refetch(),
            traffic: refetch(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeatureConfig {
    pub create_policy: CreatePolicy,
    /// Overrides `pagination.default_limit` for this feature.
    #[serde(default)]
    pub limit: Option<u32>,
}

fn append() -> FeatureConfig {
    FeatureConfig {
        create_policy: CreatePolicy::Append,
        limit: None,
    }
}
fn refetch() -> FeatureConfig {
    FeatureConfig {
        create_policy: CreatePolicy::Refetch,
        limit: None,
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Settings for commands that can run without a config file
    /// (offline mode, metric derivation).
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8080/api".to_string(),
                timeout_secs: default_timeout_secs(),
                token_env: default_token_env(),
            },
            pagination: PaginationConfig::default(),
            features: FeaturesConfig::default(),
            notifications: NotificationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Page size for a feature, clamped to `pagination.max_limit`.
    pub fn limit_for(&self, feature: &FeatureConfig) -> u32 {
        feature
            .limit
            .unwrap_or(self.pagination.default_limit)
            .min(self.pagination.max_limit)
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Loads `path`, or falls back to [`Config::minimal`] when `allow_missing`
/// is set and no file exists. A file that exists must parse and validate.
pub fn load_config_or_minimal(path: &Path, allow_missing: bool) -> Result<Config> {
    if allow_missing && !path.exists() {
        return Ok(Config::minimal());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    // Validate api
    let url = reqwest::Url::parse(&config.api.base_url)
        .with_context(|| format!("api.base_url is not a valid URL: {}", config.api.base_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("api.base_url must use http or https, got '{}'", url.scheme());
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    // Validate pagination
    if config.pagination.default_limit == 0 {
        anyhow::bail!("pagination.default_limit must be > 0");
    }
    if config.pagination.max_limit < config.pagination.default_limit {
        anyhow::bail!("pagination.max_limit must be >= pagination.default_limit");
    }

    let features = &config.features;
    for (name, feature) in [
        ("keywords", &features.keywords),
        ("content", &features.content),
        ("audits", &features.audits),
        ("ai_requests", &features.ai_requests),
        ("rankings", &features.rankings),
        ("traffic", &features.traffic),
    ] {
        if feature.limit == Some(0) {
            anyhow::bail!("features.{}.limit must be > 0", name);
        }
    }

    // Validate logging
    match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
        other => anyhow::bail!(
            "Unknown logging.level: '{}'. Must be trace, debug, info, warn, error, or off.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_gets_defaults() {
        let cfg = parse_config(
            r#"
[api]
base_url = "https://api.example.com/v1"
"#,
        )
        .unwrap();
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.api.token_env, "SEO_CONSOLE_TOKEN");
        assert_eq!(cfg.pagination.default_limit, 20);
        assert_eq!(cfg.features.keywords.create_policy, CreatePolicy::Append);
        assert_eq!(cfg.features.content.create_policy, CreatePolicy::Refetch);
        assert_eq!(cfg.notifications.ttl_secs, 5);
    }

    #[test]
    fn test_feature_override() {
        let cfg = parse_config(
            r#"
[api]
base_url = "http://localhost:3000"

[pagination]
default_limit = 25
max_limit = 50

[features.keywords]
create_policy = "refetch"
limit = 200
"#,
        )
        .unwrap();
        assert_eq!(cfg.features.keywords.create_policy, CreatePolicy::Refetch);
        assert_eq!(cfg.limit_for(&cfg.features.keywords), 50);
        assert_eq!(cfg.limit_for(&cfg.features.audits), 25);
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = parse_config("[api]\nbase_url = \"ftp://example.com\"\n").unwrap_err();
        assert!(err.to_string().contains("http or https"));
        assert!(parse_config("[api]\nbase_url = \"not a url\"\n").is_err());
    }

    #[test]
    fn test_rejects_inverted_limits() {
        let err = parse_config(
            r#"
[api]
base_url = "http://localhost"

[pagination]
default_limit = 50
max_limit = 10
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_limit"));
    }

    #[test]
    fn test_rejects_unknown_level() {
        let err = parse_config(
            r#"
[api]
base_url = "http://localhost"

[logging]
level = "loud"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_example_config_parses() {
        let cfg = parse_config(include_str!("../config/seoc.example.toml")).unwrap();
        assert_eq!(cfg.limit_for(&cfg.features.audits), 10);
        assert_eq!(cfg.features.rankings.create_policy, CreatePolicy::Refetch);
    }

    #[test]
    fn test_offline_fallback_only_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let cfg = load_config_or_minimal(&missing, true).unwrap();
        assert_eq!(cfg.features.content.create_policy, CreatePolicy::Refetch);
        assert!(load_config_or_minimal(&missing, false).is_err());

        let bad = dir.path().join("bad.toml");
        std::fs::write(
            &bad,
            "[api]\nbase_url = \"http://localhost\"\n\n[features.keywords]\ncreate_policy = \"refetsh\"\n",
        )
        .unwrap();
        assert!(load_config_or_minimal(&bad, true).is_err());

        let zero = dir.path().join("zero.toml");
        std::fs::write(
            &zero,
            "[api]\nbase_url = \"http://localhost\"\n\n[features.audits]\ncreate_policy = \"append\"\nlimit = 0\n",
        )
        .unwrap();
        let err = load_config_or_minimal(&zero, true).unwrap_err();
        assert!(err.to_string().contains("features.audits.limit"));
    }

    #[test]
    fn test_minimal_is_valid() {
        assert!(validate(&Config::minimal()).is_ok());
    }
}
