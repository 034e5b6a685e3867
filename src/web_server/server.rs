use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, RwLockReadGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

use crate::rewrite::flush::is_truthy;
use crate::rewrite::{QueryVars, Rewriter, ViewLink};

/// The rewriter shared between requests and the config reloader.
pub type SharedRewriter = Arc<RwLock<Rewriter>>;

#[derive(Debug, Default, Deserialize)]
pub struct LinkParams {
    #[serde(rename = "eventDisplay")]
    pub event_display: Option<String>,
    #[serde(rename = "eventDate")]
    pub event_date: Option<String>,
    pub featured: Option<String>,
    /// Comma-separated category slugs.
    pub category: Option<String>,
    pub paged: Option<u32>,
}

impl From<LinkParams> for ViewLink {
    fn from(params: LinkParams) -> Self {
        ViewLink {
            display: params.event_display.filter(|display| !display.is_empty()),
            date: params.event_date.filter(|date| !date.is_empty()),
            featured: params.featured.as_deref().map(is_truthy).unwrap_or(false),
            categories: params
                .category
                .map(|categories| {
                    categories
                        .split(',')
                        .map(str::trim)
                        .filter(|slug| !slug.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            page: params.paged,
        }
    }
}

#[derive(Serialize)]
struct LinkResponse {
    url: String,
}

#[derive(Serialize)]
struct ResolveResponse {
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_vars: Option<QueryVars>,
}

#[derive(Clone)]
pub struct WebServer {
    pub port: u16,
    pub host: String,
    pub rewriter: SharedRewriter,
}

impl WebServer {
    pub fn new(port: u16, host: String, rewriter: SharedRewriter) -> Self {
        Self {
            port,
            host,
            rewriter,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let app = self.create_app();
        // Convert localhost to 127.0.0.1 for proper parsing
        let host = if self.host == "localhost" {
            "127.0.0.1"
        } else {
            &self.host
        };
        let addr: SocketAddr = format!("{}:{}", host, self.port).parse()?;

        info!("🌐 Starting rewrite dispatcher on http://{}:{}", self.host, self.port);

        let listener = TcpListener::bind(addr).await?;
        println!("✅ Dispatcher listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }

    pub fn create_app(&self) -> Router {
        Router::new()
            .route("/_rewrite/rules", get(list_rules))
            .route("/_rewrite/link", get(build_link))
            .route("/_rewrite/health", get(health))
            .fallback(resolve_request)
            .with_state(self.rewriter.clone())
            .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
    }
}

/// Read access for one request, after honouring a pending delayed flush.
async fn current_rewriter(shared: &SharedRewriter) -> RwLockReadGuard<'_, Rewriter> {
    let rewriter = shared.read().await;
    rewriter.maybe_delayed_flush();
    rewriter
}

async fn list_rules(State(shared): State<SharedRewriter>) -> Response {
    let rewriter = current_rewriter(&shared).await;

    match rewriter.generate() {
        Ok(table) => {
            let etag = format!("\"{}\"", table.fingerprint());
            ([(header::ETAG, etag)], Json(table.rows())).into_response()
        }
        Err(e) => {
            error!("❌ Failed to generate rewrite rules: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate rewrite rules: {}", e),
            )
                .into_response()
        }
    }
}

async fn build_link(
    State(shared): State<SharedRewriter>,
    Query(params): Query<LinkParams>,
) -> Json<LinkResponse> {
    let rewriter = current_rewriter(&shared).await;
    let url = rewriter.view_link(&ViewLink::from(params));
    Json(LinkResponse { url })
}

async fn health() -> &'static str {
    "ok"
}

async fn resolve_request(State(shared): State<SharedRewriter>, uri: Uri) -> Response {
    let rewriter = current_rewriter(&shared).await;
    let target = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or_else(|| uri.path());

    match rewriter.parse_request(target, &QueryVars::new()) {
        Some(query_vars) => {
            debug!("📨 {} resolved to {:?}", target, query_vars);
            Json(ResolveResponse {
                matched: true,
                query_vars: Some(query_vars),
            })
            .into_response()
        }
        None => {
            debug!("📨 {} declined", target);
            (
                StatusCode::NOT_FOUND,
                Json(ResolveResponse {
                    matched: false,
                    query_vars: None,
                }),
            )
                .into_response()
        }
    }
}
