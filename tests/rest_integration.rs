//! Integration tests for the REST collaborator.
//!
//! Each test starts a fake backend on a free port and drives it through a
//! real `Console` built from a config file, so requests, error bodies, and
//! notifications travel the same path they do in the CLI.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;

use seo_console::commands::ListArgs;
use seo_console::config::{load_config, Config};
use seo_console::console::{Console, Feature};
use seo_console::models::{Audit, AuditDraft, Keyword, KeywordDraft, KeywordPatch};
use seo_console::notify::Notifier;
use seo_console_core::operation::{Operation, OperationStatus};
use seo_console_core::resource::{FilterPatch, LocalResource, SortOrder};

// ─── Fake backend ───────────────────────────────────────────────────

#[derive(Default)]
struct Backend {
    keywords: Vec<Keyword>,
    last_query: HashMap<String, String>,
    last_auth: Option<String>,
    request_ids: Vec<String>,
    bulk_deleted: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

fn record_headers(backend: &mut Backend, headers: &HeaderMap) {
    backend.last_auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        backend.request_ids.push(id.to_string());
    }
}

async fn list_keywords(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut backend = state.lock().unwrap();
    record_headers(&mut backend, &headers);
    backend.last_query = query.clone();

    let needle = query.get("search").map(|s| s.to_lowercase());
    let items: Vec<Keyword> = backend
        .keywords
        .iter()
        .filter(|k| match needle {
            Some(ref n) => k.keyword.to_lowercase().contains(n),
            None => true,
        })
        .cloned()
        .collect();
    let total = items.len();
    // the backend answers with `data` / `totalPages`
    Json(json!({
        "data": items,
        "total": total,
        "page": 1,
        "limit": 20,
        "totalPages": 1,
    }))
}

async fn create_keyword(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(draft): Json<KeywordDraft>,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    record_headers(&mut backend, &headers);
    if backend.keywords.iter().any(|k| k.keyword == draft.keyword) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Keyword already exists" })),
        );
    }
    let id = format!("kw-{}", backend.keywords.len() + 1);
    let keyword = Keyword::from_draft(id, &draft);
    backend.keywords.push(keyword.clone());
    (StatusCode::CREATED, Json(json!(keyword)))
}

async fn update_keyword(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(patch): Json<KeywordPatch>,
) -> (StatusCode, Json<Value>) {
    let mut backend = state.lock().unwrap();
    match backend.keywords.iter_mut().find(|k| k.id == id) {
        Some(keyword) => {
            keyword.apply_patch(&patch);
            (StatusCode::OK, Json(json!(keyword)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "message": "Keyword not found" } })),
        ),
    }
}

async fn delete_keyword(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    let mut backend = state.lock().unwrap();
    backend.keywords.retain(|k| k.id != id);
    StatusCode::NO_CONTENT
}

async fn bulk_delete_keywords(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    let ids: Vec<String> = body["ids"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    let mut backend = state.lock().unwrap();
    backend.keywords.retain(|k| !ids.contains(&k.id));
    backend.bulk_deleted.extend(ids);
    StatusCode::OK
}

async fn rerun_audit(Path(id): Path<String>) -> Json<Value> {
    let mut audit = Audit::from_draft(
        id,
        &AuditDraft {
            project_id: "p1".into(),
            url: "https://example.com".into(),
            ..Default::default()
        },
    );
    audit.status = "running".into();
    Json(json!(audit))
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

async fn start_backend() -> (u16, Shared) {
    let state: Shared = Arc::new(Mutex::new(Backend::default()));
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/keywords", get(list_keywords).post(create_keyword))
        .route("/api/keywords/bulk-delete", post(bulk_delete_keywords))
        .route(
            "/api/keywords/{id}",
            patch(update_keyword).delete(delete_keyword),
        )
        // always fails, with no body to mine
        .route(
            "/api/audits",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route("/api/audits/{id}/rerun", post(rerun_audit))
        .with_state(Arc::clone(&state));

    let port = find_free_port();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    wait_for_server(port).await;
    (port, state)
}

fn write_config(dir: &TempDir, port: u16) -> Config {
    std::env::set_var("SEOC_IT_TOKEN", "it-token");
    let path = dir.path().join("seoc.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[api]
base_url = "http://127.0.0.1:{}/api"
token_env = "SEOC_IT_TOKEN"
timeout_secs = 5

[features.keywords]
create_policy = "append"
"#,
            port
        ),
    )
    .unwrap();
    load_config(&path).unwrap()
}

fn seed(state: &Shared, words: &[&str]) {
    let mut backend = state.lock().unwrap();
    for w in words {
        let id = format!("kw-{}", backend.keywords.len() + 1);
        let draft = KeywordDraft {
            project_id: "p1".into(),
            keyword: w.to_string(),
            ..Default::default()
        };
        backend.keywords.push(Keyword::from_draft(id, &draft));
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_sends_filters_and_credentials() {
    let (port, state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);
    seed(&state, &["running shoes", "rain jacket", "trail shoes"]);

    let console = Console::connect(&cfg).unwrap();
    let page = console
        .keywords
        .apply_filters(FilterPatch {
            search: Some("Shoes".into()),
            sort_by: Some("position".into()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let snap = console.keywords.snapshot();
    assert_eq!(snap.items().len(), 2);
    assert_eq!(snap.pagination().total_pages, 1);
    assert_eq!(snap.status(Operation::FetchList), OperationStatus::Succeeded);

    let backend = state.lock().unwrap();
    assert_eq!(backend.last_query.get("search").map(String::as_str), Some("Shoes"));
    assert_eq!(backend.last_query.get("page").map(String::as_str), Some("1"));
    assert_eq!(backend.last_query.get("limit").map(String::as_str), Some("20"));
    assert_eq!(backend.last_query.get("sort_by").map(String::as_str), Some("position"));
    assert_eq!(backend.last_query.get("sort_order").map(String::as_str), Some("desc"));
    assert!(!backend.last_query.contains_key("status"));
    assert_eq!(backend.last_auth.as_deref(), Some("Bearer it-token"));
    assert_eq!(backend.request_ids.len(), 1);
}

#[tokio::test]
async fn test_create_appends_and_conflict_message_surfaces() {
    let (port, state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);
    seed(&state, &["seo audit"]);

    let console = Console::connect(&cfg).unwrap();
    let notifier = Notifier::for_console(&cfg.notifications, &console);
    console.keywords.fetch_list().await.unwrap();

    let created = console
        .keywords
        .create(KeywordDraft {
            project_id: "p1".into(),
            keyword: "link building".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let snap = console.keywords.snapshot();
    assert!(snap.item(&created.id).is_some());
    assert_eq!(snap.total(), 2);

    let err = console
        .keywords
        .create(KeywordDraft {
            project_id: "p1".into(),
            keyword: "seo audit".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Keyword already exists (status 409)");

    let snap = console.keywords.snapshot();
    assert_eq!(snap.error(Operation::Create), Some("Keyword already exists"));
    assert_eq!(snap.items().len(), 2);

    let pending = notifier.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].feature, Feature::Keywords);
    assert_eq!(pending[0].message, "Keyword already exists");
}

#[tokio::test]
async fn test_update_reads_nested_error_message() {
    let (port, state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);
    seed(&state, &["local seo"]);

    let console = Console::connect(&cfg).unwrap();
    console.keywords.fetch_list().await.unwrap();

    let updated = console
        .keywords
        .update(
            "kw-1",
            KeywordPatch {
                status: Some("paused".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "paused");
    assert_eq!(
        console.keywords.snapshot().item("kw-1").unwrap().status,
        "paused"
    );

    let err = console
        .keywords
        .update("kw-404", KeywordPatch::default())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Keyword not found"));
    assert_eq!(
        console.keywords.snapshot().error(Operation::Update),
        Some("Keyword not found")
    );
}

#[tokio::test]
async fn test_failure_without_body_uses_fallback() {
    let (port, _state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);

    let console = Console::connect(&cfg).unwrap();
    let notifier = Notifier::for_console(&cfg.notifications, &console);
    let err = console.audits.fetch_list().await.unwrap_err();
    assert_eq!(err.to_string(), "request failed with status 500");

    assert_eq!(
        console.audits.snapshot().error(Operation::FetchList),
        Some("Failed to fetch audits")
    );
    let pending = notifier.pending();
    assert_eq!(pending[0].message, "Failed to fetch audits");

    assert!(notifier.dismiss(pending[0].id));
    assert_eq!(console.audits.snapshot().error(Operation::FetchList), None);
}

#[tokio::test]
async fn test_delete_single_and_bulk() {
    let (port, state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);
    seed(&state, &["a", "b", "c", "d"]);

    let console = Console::connect(&cfg).unwrap();
    let commands = console.feature(Feature::Keywords);
    commands.list_json(ListArgs::default()).await.unwrap();

    assert_eq!(commands.delete_ids(vec!["kw-1".into()]).await.unwrap(), 1);
    console.keywords.select_all();
    console.keywords.delete_selected().await.unwrap();

    let snap = console.keywords.snapshot();
    assert!(snap.items().is_empty());
    assert!(snap.selected().is_empty());
    assert_eq!(snap.total(), 0);

    let backend = state.lock().unwrap();
    assert!(backend.keywords.is_empty());
    assert_eq!(backend.bulk_deleted, vec!["kw-2", "kw-3", "kw-4"]);
}

#[tokio::test]
async fn test_rerun_audit_action() {
    let (port, _state) = start_backend().await;
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);

    let console = Console::connect(&cfg).unwrap();
    let audit = console.rerun_audit("audit-7").await.unwrap();
    assert_eq!(audit.id, "audit-7");
    assert_eq!(audit.status, "running");
    assert_eq!(
        console
            .audits
            .snapshot()
            .status(seo_console::console::RERUN_AUDIT),
        OperationStatus::Succeeded
    );
}

#[tokio::test]
async fn test_unreachable_backend() {
    let port = find_free_port();
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, port);

    let console = Console::connect(&cfg).unwrap();
    assert!(console.rankings.fetch_list().await.is_err());
    let snap = console.rankings.snapshot();
    assert_eq!(snap.status(Operation::FetchList), OperationStatus::Failed);
    assert!(snap.error(Operation::FetchList).is_some());
}
