use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use event_permalinks::config::load_config;
use event_permalinks::rewrite::links::Post;
use event_permalinks::web_server::{reload_now, WebServer};
use event_permalinks::{Config, QueryVars, ViewLink};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};
use tokio::sync::RwLock;
use tower::ServiceExt;

fn demo_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/config.yaml")
}

fn demo_config() -> Config {
    load_config(&demo_config_path()).unwrap()
}

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", yaml).unwrap();
    file
}

#[test]
fn test_demo_config_loads() -> Result<()> {
    let config = demo_config();

    assert_eq!(config.site.locale, "de_DE");
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.taxonomies["tribe_events_cat"].len(), 3);
    assert!(config.base_dir.is_some());
    Ok(())
}

#[test]
fn test_localized_rule_table() -> Result<()> {
    let rewriter = demo_config().build_rewriter()?;
    let table = rewriter.generate()?;

    // One configured rule ahead of the core catalogue.
    assert_eq!(table.len(), 74);
    let first = table.iter().next().unwrap();
    assert_eq!(first.source, r"(?:events|veranstaltungen)/(?:venue|ort)/([^/]+)/?$");

    assert!(table
        .lines()
        .iter()
        .any(|line| line.starts_with("(?:events|veranstaltungen)/(?:list|liste)/?$")));
    Ok(())
}

#[test]
fn test_both_languages_resolve() -> Result<()> {
    let rewriter = demo_config().build_rewriter()?;

    for url in [
        "/events/category/music/list/page/2/",
        "/veranstaltungen/kategorie/music/liste/seite/2/",
        "http://localhost:9990/veranstaltungen/kategorie/arts/music/liste/seite/2/",
    ] {
        let query = rewriter
            .parse_request(url, &QueryVars::new())
            .unwrap_or_else(|| panic!("{} did not resolve", url));
        assert_eq!(query["post_type"], "tribe_events");
        assert_eq!(query["tribe_events_cat"], "music");
        assert_eq!(query["eventDisplay"], "list");
        assert_eq!(query["paged"], "2");
    }
    Ok(())
}

#[test]
fn test_canonical_links_are_localized() -> Result<()> {
    let rewriter = demo_config().build_rewriter()?;

    assert_eq!(rewriter.archive_url(), "http://localhost:9990/veranstaltungen/");
    assert_eq!(
        rewriter.view_link(&ViewLink::display("list")),
        "http://localhost:9990/veranstaltungen/liste/"
    );
    assert_eq!(
        rewriter.view_link(&ViewLink {
            display: Some("list".to_string()),
            categories: vec!["jazz".to_string()],
            page: Some(2),
            ..ViewLink::default()
        }),
        "http://localhost:9990/veranstaltungen/kategorie/arts/music/jazz/liste/seite/2/"
    );
    assert_eq!(
        rewriter.event_link(&Post::event("sommerfest")),
        "http://localhost:9990/veranstaltung/sommerfest/"
    );
    assert_eq!(rewriter.pagination_base(true), "seite");
    assert_eq!(rewriter.pagination_base(false), "page");
    Ok(())
}

#[test]
fn test_venue_rule_from_config() -> Result<()> {
    let rewriter = demo_config().build_rewriter()?;

    let query = rewriter
        .parse_request("/veranstaltungen/ort/stadthalle/", &QueryVars::new())
        .unwrap();
    assert_eq!(query["tribe_venue"], "stadthalle");
    assert_eq!(
        rewriter.canonical_url(&query).unwrap(),
        "http://localhost:9990/veranstaltungen/ort/stadthalle/"
    );
    Ok(())
}

#[test]
fn test_broken_rule_is_rejected() {
    let file = write_config(
        r#"
rules:
  - kind: archive
    segments: ["(unclosed"]
    query:
      eventDisplay: list
"#,
    );

    let result = load_config(file.path()).and_then(|config| {
        config.build_rewriter()?.generate()?;
        Ok(())
    });
    assert!(result.is_err());
}

#[test]
fn test_invalid_yaml() {
    let file = write_config("site: [unclosed");

    let result = load_config(file.path());
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("parse"));
}

#[test]
fn test_translation_directory_relative_to_config() -> Result<()> {
    let dir = tempdir()?;
    std::fs::create_dir(dir.path().join("lang"))?;
    std::fs::write(
        dir.path().join("lang/the-events-calendar-fr_FR.yaml"),
        "messages:\n  events: Agenda\n  list: Liste\n",
    )?;
    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        "site:\n  home: \"http://example.fr\"\n  locale: fr_FR\ni18n:\n  domains:\n    the-events-calendar: lang\n",
    )?;

    let rewriter = load_config(&config_path)?.build_rewriter()?;
    assert_eq!(
        rewriter.view_link(&ViewLink::display("list")),
        "http://example.fr/agenda/liste/"
    );
    assert!(rewriter
        .parse_request("/agenda/liste/", &QueryVars::new())
        .is_some());
    Ok(())
}

#[tokio::test]
async fn test_dispatcher_round_trip() -> Result<()> {
    let shared = Arc::new(RwLock::new(demo_config().build_rewriter()?));
    let app = WebServer::new(0, "localhost".to_string(), shared).create_app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/_rewrite/link?eventDisplay=list&category=music").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    let url = body["url"].as_str().unwrap().to_string();
    assert_eq!(url, "http://localhost:9990/veranstaltungen/kategorie/arts/music/liste/");

    let response = app
        .oneshot(Request::builder().uri(url.as_str()).body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
    assert_eq!(body["query_vars"]["tribe_events_cat"], "music");
    assert_eq!(body["query_vars"]["eventDisplay"], "list");
    Ok(())
}

#[tokio::test]
async fn test_reload_picks_up_new_slug() -> Result<()> {
    let file = write_config("site:\n  home: \"http://example.com\"\n");
    let shared = Arc::new(RwLock::new(load_config(file.path())?.build_rewriter()?));
    assert_eq!(shared.read().await.archive_url(), "http://example.com/events/");

    std::fs::write(
        file.path(),
        "site:\n  home: \"http://example.com\"\noptions:\n  eventsSlug: calendar\n",
    )?;
    reload_now(&shared, file.path()).await?;

    let rewriter = shared.read().await;
    assert_eq!(rewriter.archive_url(), "http://example.com/calendar/");
    assert!(rewriter
        .parse_request("/calendar/list/", &QueryVars::new())
        .is_some());
    Ok(())
}
