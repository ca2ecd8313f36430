//! HTTP server for the matcher API.
//!
//! # API Endpoints
//!
//! | Method | Path                 | Description                               |
//! |--------|----------------------|-------------------------------------------|
//! | GET    | `/health`            | Health check                              |
//! | POST   | `/api/process`       | Upload sheets, run the pipeline           |
//! | GET    | `/api/download`      | Download one generated file               |
//! | GET    | `/api/download-zip`  | Download several generated files as a ZIP |
//! | GET    | `/api/logs`          | SSE stream for real-time logs             |
//!
//! Generated files live in `uploads/` under timestamp-qualified names and
//! are renamed to their human-readable display names on the way out.

use axum::{
    extract::{Multipart, Query, RawQuery},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::Value;
use std::{convert::Infallible, net::SocketAddr, path::Path, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, ProcessResponse, SchemaFiles};
use crate::archive;
use crate::error::PipelineError;
use crate::export::manifest::NamedBlob;
use crate::export::{Schema, AUDIT, CURRENT_PRODUCTS, INVENTORY, SCHEMAS};
use crate::pipeline::compare_bytes;

/// Directory generated files are written to, relative to the working dir.
const UPLOAD_DIR: &str = "uploads";

/// Timestamp-prefix to display-name table applied by the download endpoints.
const DISPLAY_NAMES: [(&str, &str); 3] = [
    ("estoque-lista-", "Estoque lista.txt"),
    ("conferencia-ok-", "Conferência Ok.txt"),
    ("lista-produtos-atuais-", "Lista de Produtos ATUAIS.txt"),
];

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/process", post(process))
        .route("/api/download", get(download))
        .route("/api/download-zip", get(download_zip))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 excel-matcher server running on http://localhost:{}", port);
    println!("   POST /api/process      - Upload sheets for comparison");
    println!("   GET  /api/download     - Download a generated file");
    println!("   GET  /api/download-zip - Download generated files as ZIP");
    println!("   GET  /api/logs         - SSE log stream");
    println!("   GET  /health           - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "excel-matcher",
        "version": env!("CARGO_PKG_VERSION"),
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
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: decode, match and write the generated files.
async fn process(
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, (StatusCode, Json<Value>)> {
    let mut primary: Option<Vec<u8>> = None;
    let mut catalog: Option<Vec<u8>> = None;
    let mut locations: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e))),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(error_response(&format!("Read error: {}", e))),
                )
            })?
            .to_vec();

        match name.as_str() {
            "primary" => primary = Some(bytes),
            "catalog" => catalog = Some(bytes),
            "locations" => locations = Some(bytes),
            _ => {}
        }
    }

    let primary = primary.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("Primary file not provided")),
        )
    })?;
    let catalog = catalog.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("Catalog file not provided")),
        )
    })?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: primary {} bytes, catalog {} bytes{}",
        primary.len(),
        catalog.len(),
        match &locations {
            Some(l) => format!(", locations {} bytes", l.len()),
            None => String::new(),
        }
    );
    println!("{}\n", "=".repeat(70));

    let result = compare_bytes(&primary, &catalog, locations.as_deref()).map_err(|e| {
        eprintln!("❌ Processing error: {}", e);
        let status = match e {
            PipelineError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&e.to_string())))
    })?;

    std::fs::create_dir_all(UPLOAD_DIR).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&format!("Failed to create upload dir: {}", e))),
        )
    })?;

    let timestamp = Utc::now().timestamp_millis();
    for schema in SCHEMAS {
        let path = Path::new(UPLOAD_DIR).join(upload_filename(schema, timestamp));
        std::fs::write(&path, result.export(schema)).map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&format!("Failed to write output: {}", e))),
            )
        })?;
    }

    let files = SchemaFiles {
        estoque: upload_filename(&INVENTORY, timestamp),
        conferencia: upload_filename(&AUDIT, timestamp),
        produtos: upload_filename(&CURRENT_PRODUCTS, timestamp),
    };

    println!("📊 {} matches, files written with timestamp {}", result.match_count(), timestamp);

    Ok(Json(ProcessResponse::from_result(&result, files)))
}

#[derive(Debug, Deserialize)]
struct DownloadParams {
    file: String,
}

/// Stream one generated file as an attachment.
async fn download(Query(params): Query<DownloadParams>) -> Result<Response, (StatusCode, String)> {
    if is_unsafe(&params.file) {
        return Err((StatusCode::BAD_REQUEST, "Invalid filename".to_string()));
    }

    let path = Path::new(UPLOAD_DIR).join(&params.file);
    if !path.exists() {
        return Err((StatusCode::NOT_FOUND, "File not found".to_string()));
    }

    let content = tokio::fs::read(&path)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to read file: {}", e)))?;

    let display = display_filename(&params.file);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", display),
            ),
        ],
        content,
    )
        .into_response())
}

/// Bundle several generated files into one ZIP attachment.
///
/// Unsafe and missing names are silently skipped, mirroring the individual
/// download endpoint's checks without failing the whole bundle.
async fn download_zip(RawQuery(query): RawQuery) -> Result<Response, (StatusCode, String)> {
    let names = file_params(query.as_deref().unwrap_or(""));
    if names.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No files specified".to_string()));
    }

    let mut blobs = Vec::new();
    for name in names {
        if is_unsafe(&name) {
            continue;
        }
        let path = Path::new(UPLOAD_DIR).join(&name);
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            eprintln!("File not found, skipping: {}", name);
            continue;
        };
        blobs.push(NamedBlob {
            filename: display_filename(&name),
            content,
        });
    }

    let bytes = archive::bundle(&blobs)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to build archive: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"arquivos_convertidos.zip\"".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Timestamped name a schema's combined output is written under.
fn upload_filename(schema: &Schema, timestamp: i64) -> String {
    let prefix = match schema.name {
        "estoque" => "estoque-lista-",
        "conferencia" => "conferencia-ok-",
        _ => "lista-produtos-atuais-",
    };
    format!("{}{}.txt", prefix, timestamp)
}

/// Rename well-known timestamped files to their display names.
fn display_filename(name: &str) -> String {
    for (prefix, display) in DISPLAY_NAMES {
        if name.starts_with(prefix) {
            return display.to_string();
        }
    }
    name.to_string()
}

/// Reject names that could escape the uploads directory.
fn is_unsafe(name: &str) -> bool {
    name.contains("..") || name.contains('/')
}

/// Extract repeated `file=` parameters from a raw query string.
fn file_params(query: &str) -> Vec<String> {
    query
        .split('&')
        .filter_map(|pair| pair.strip_prefix("file="))
        .filter(|v| !v.is_empty())
        .map(|v| v.replace('+', " "))
        .collect()
}
