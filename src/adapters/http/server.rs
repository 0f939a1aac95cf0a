//! HTTP transport for the clustering service.
//!
//! Routes:
//! - `GET /` landing page
//! - `GET /health`
//! - `GET /getAlgorithms` registry listing, JSON or XML by `Accept`
//! - `GET|POST /runAlgorithm?algorithmType=&id=&table=&options=` encoded envelope

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::domain::models::{AlgorithmEntry, FailureKind, ResultEnvelope, ServerConfig};
use crate::services::{envelope_codec, RunRequest, RunService};

const INDEX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>clusterhub</title></head>
<body>
<h1>clusterhub</h1>
<ul>
<li><a href="getAlgorithms">getAlgorithms</a>: registered clustering algorithms</li>
<li>runAlgorithm?algorithmType=&lt;code&gt;&amp;id=&lt;id&gt;
&amp;table=&lt;table&gt;&amp;options=&lt;options&gt;</li>
</ul>
</body>
</html>
"#;

/// Clustering HTTP server.
pub struct ClusterHttpServer {
    config: ServerConfig,
    service: Arc<RunService>,
}

impl ClusterHttpServer {
    pub fn new(service: Arc<RunService>, config: ServerConfig) -> Self {
        Self { config, service }
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        let app = Router::new()
            .route("/", get(index))
            .route("/health", get(health_check))
            .route("/getAlgorithms", get(get_algorithms))
            .route("/runAlgorithm", get(run_algorithm).post(run_algorithm))
            .with_state(Arc::clone(&self.service));

        let app = if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app.layer(cors)
        } else {
            app
        };
        app.layer(TraceLayer::new_for_http())
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = self.router();

        tracing::info!("clusterhub HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_algorithms(State(service): State<Arc<RunService>>, headers: HeaderMap) -> Response {
    let entries = service.list_algorithms();
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if prefers_xml(accept) {
        ([(header::CONTENT_TYPE, "application/xml")], algorithms_xml(&entries)).into_response()
    } else {
        Json(entries).into_response()
    }
}

async fn run_algorithm(
    State(service): State<Arc<RunService>>,
    query: Result<Query<RunRequest>, QueryRejection>,
) -> Response {
    let envelope = match query {
        Ok(Query(request)) => service.run(request).await,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::warn!("{message}");
            ResultEnvelope::diagnostic(FailureKind::InvalidParameter, message)
        }
    };
    match envelope_codec::encode(&envelope) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            tracing::error!(run_id = %envelope.run_id, error = %err, "failed to encode envelope");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// True when `accept` lists an XML type ahead of JSON.
pub fn prefers_xml(accept: &str) -> bool {
    let position = |needle: &str| accept.find(needle);
    let xml = [position("application/xml"), position("text/xml")]
        .into_iter()
        .flatten()
        .min();
    match (xml, position("application/json")) {
        (Some(x), Some(j)) => x < j,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Registry listing in the legacy SOAP-style XML shape.
pub fn algorithms_xml(entries: &[AlgorithmEntry]) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><getAlgorithmsResponse>"#);
    for entry in entries {
        let _ = write!(
            out,
            "<return><code>{}</code><name>{}</name></return>",
            entry.code,
            escape_xml(&entry.name)
        );
    }
    out.push_str("</getAlgorithmsResponse>");
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
