//! HTTP server for lookup requests.
//!
//! Each lookup route takes a multipart form with the two CSV files and the
//! function text, runs the pipeline and answers with a
//! [`ValidationResponse`].
//!
//! # API Endpoints
//!
//! | Method | Path                 | Form fields                                               |
//! |--------|----------------------|-----------------------------------------------------------|
//! | GET    | `/health`            | none                                                      |
//! | POST   | `/api/lookup`        | `sourceCsvPath`, `lookupCsvPath`, `lookupFunction`        |
//! | POST   | `/api/random_lookup` | `sourceCsvPath`, `lookupCsvPath`, `randomLookupFunction`  |
//! | POST   | `/api/hash_lookup`   | `sourceCsvPath`, `lookupCsvPath`, `hashLookupFunction`    |
//! | GET    | `/api/logs`          | SSE stream of pipeline logs                               |
//!
//! `SUCCESS` → 200, `FAILED` → 400, `ERROR` → 500.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{Status, ValidationResponse};
use crate::config::Config;
use crate::error::ServerResult;
use crate::transform::dsl::Dialect;
use crate::transform::pipeline::{run_lookup, RunOptions, TableSource};

const SOURCE_FIELD: &str = "sourceCsvPath";
const LOOKUP_FIELD: &str = "lookupCsvPath";

#[derive(Debug, Clone)]
struct AppState {
    options: Arc<RunOptions>,
}

/// Build the router; split out so it can be exercised without a socket.
pub fn router(config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let state = AppState {
        options: Arc::new(RunOptions::from(config)),
    };

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/lookup", post(lookup))
        .route("/api/random_lookup", post(random_lookup))
        .route("/api/hash_lookup", post(hash_lookup))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> ServerResult<()> {
    let app = router(&config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    println!("🚀 Lookupmask server running on http://localhost:{}", config.port);
    println!("   POST /api/lookup         - Exact-match lookup");
    println!("   POST /api/random_lookup  - Random-sample lookup");
    println!("   POST /api/hash_lookup    - Hash-mediated lookup");
    println!("   GET  /api/logs           - SSE log stream");
    println!("   GET  /health             - Health check");
    println!();
    println!("📁 Output directory: {}", config.output_dir.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "lookupmask",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "lookup": "POST /api/lookup",
            "randomLookup": "POST /api/random_lookup",
            "hashLookup": "POST /api/hash_lookup",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged receivers skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

type ApiResponse = (StatusCode, Json<ValidationResponse>);

async fn lookup(State(state): State<AppState>, multipart: Multipart) -> ApiResponse {
    handle(Dialect::Exact, "lookupFunction", &state, multipart).await
}

async fn random_lookup(State(state): State<AppState>, multipart: Multipart) -> ApiResponse {
    handle(Dialect::Random, "randomLookupFunction", &state, multipart).await
}

async fn hash_lookup(State(state): State<AppState>, multipart: Multipart) -> ApiResponse {
    handle(Dialect::Hash, "hashLookupFunction", &state, multipart).await
}

async fn handle(
    dialect: Dialect,
    function_field: &'static str,
    state: &AppState,
    multipart: Multipart,
) -> ApiResponse {
    let form = match LookupForm::read(multipart, function_field).await {
        Ok(form) => form,
        Err(response) => return reply(response),
    };

    log_info(format!(
        "📄 {} upload: {} ({} bytes), {} ({} bytes)",
        dialect,
        form.source.0,
        form.source.1.len(),
        form.lookup.0,
        form.lookup.1.len()
    ));

    let response = run_lookup(
        dialect,
        &form.function,
        TableSource::bytes(form.source.0, form.source.1),
        TableSource::bytes(form.lookup.0, form.lookup.1),
        &state.options,
    )
    .await;

    reply(response)
}

fn reply(response: ValidationResponse) -> ApiResponse {
    let status = match response.status {
        Status::Success => StatusCode::OK,
        Status::Failed => StatusCode::BAD_REQUEST,
        Status::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(response))
}

/// The three multipart fields of a lookup request.
struct LookupForm {
    /// (file name, body)
    source: (String, Vec<u8>),
    lookup: (String, Vec<u8>),
    function: String,
}

impl LookupForm {
    async fn read(
        mut multipart: Multipart,
        function_field: &'static str,
    ) -> Result<Self, ValidationResponse> {
        let mut source = None;
        let mut lookup = None;
        let mut function = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ValidationResponse::failed(vec![format!("Multipart error: {}", e)]))?
        {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().unwrap_or(&name).to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ValidationResponse::failed(vec![format!("Read error on {}: {}", name, e)]))?;

            if name == SOURCE_FIELD {
                source = Some((file_name, data.to_vec()));
            } else if name == LOOKUP_FIELD {
                lookup = Some((file_name, data.to_vec()));
            } else if name == function_field {
                function = Some(String::from_utf8_lossy(&data).into_owned());
            }
        }

        let missing: Vec<String> = [
            (SOURCE_FIELD, source.is_none()),
            (LOOKUP_FIELD, lookup.is_none()),
            (function_field, function.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(field, _)| format!("Missing form field: {}", field))
        .collect();

        match (source, lookup, function) {
            (Some(source), Some(lookup), Some(function)) => Ok(Self {
                source,
                lookup,
                function,
            }),
            _ => Err(ValidationResponse::failed(missing)),
        }
    }
}
