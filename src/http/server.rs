//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Feed request bodies and upstream responses into a per-request pool
//! - Run the image pipeline through the stream adapter
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use futures_util::StreamExt;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::error::HandlerError;
use crate::http::query::QueryArgs;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::ResponseHead;
use crate::observability::metrics;
use crate::pipeline::{OutputMode, Pipeline};
use crate::pool::{Chain, ChainBuilder, RequestPool};
use crate::stream::{ByteSink, ByteSource, ResponseContext, ResponseFinalizer, UpstreamContext};
use crate::upstream::{normalize_url, FetchError, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub pipeline: Arc<Pipeline>,
    pub finalizer: ResponseFinalizer,
    pub upstream: UpstreamClient,
}

/// HTTP server for the image service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server that passes images through unchanged.
    pub fn new(config: ServiceConfig) -> Result<Self, FetchError> {
        Self::with_pipeline(config, Pipeline::new())
    }

    /// Create a server running `pipeline` on every image.
    pub fn with_pipeline(config: ServiceConfig, pipeline: Pipeline) -> Result<Self, FetchError> {
        let state = AppState {
            config: Arc::new(config.clone()),
            pipeline: Arc::new(pipeline),
            finalizer: ResponseFinalizer::from_config(&config.cache),
            upstream: UpstreamClient::new(&config.upstream)?,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(fetch_handler).post(upload_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// `GET /?url=...`: fetch a remote image and deliver it.
async fn fetch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, HandlerError> {
    let args = QueryArgs::from_uri(&uri);
    let raw = args
        .get("url")
        .ok_or(HandlerError::BadRequest("missing url argument"))?;
    let url = normalize_url(raw)?;

    tracing::debug!(request_id = %request_id(&headers), url = %url, "Fetching source image");

    let mut pool = RequestPool::new(&state.config.pool);
    let chain = state.upstream.fetch(&url, &mut pool).await?;
    render(&state, pool, chain, &args, Some(UpstreamContext::new(url)))
}

/// `POST /`: deliver the uploaded image.
async fn upload_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Body,
) -> Result<Response, HandlerError> {
    let args = QueryArgs::from_uri(&uri);
    let mut pool = RequestPool::new(&state.config.pool);
    let chain = collect_body(body, &mut pool).await?;

    tracing::debug!(
        request_id = %request_id(&headers),
        bytes = pool.allocated_bytes(),
        "Received uploaded image"
    );
    render(&state, pool, chain, &args, None)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Append each body frame to the pool as its own segment.
async fn collect_body(body: Body, pool: &mut RequestPool) -> Result<Chain, HandlerError> {
    let mut frames = body.into_data_stream();
    let mut chain = ChainBuilder::new();
    while let Some(frame) = frames.next().await {
        let data = frame.map_err(HandlerError::Body)?;
        chain.push(pool, &data)?;
    }
    Ok(chain.seal(pool))
}

/// Drive the pipeline over `chain` and finalize the response.
fn render(
    state: &AppState,
    mut pool: RequestPool,
    chain: Chain,
    args: &QueryArgs,
    upstream: Option<UpstreamContext>,
) -> Result<Response, HandlerError> {
    let image = state.pipeline.load(ByteSource::new(&mut pool, chain))?;
    let image = state.pipeline.process(image);

    let mut sink = ByteSink::new(&mut pool);
    let extension = state
        .pipeline
        .save(&image, OutputMode::from_query(args), &mut sink)?;

    let ctx = ResponseContext::from_query(extension, args, upstream);
    let mut head = ResponseHead::new();
    let output = state.finalizer.finalize(sink, &ctx, &mut head);

    let body = pool.copy_chain(&output);
    metrics::record_response(extension, body.len() as u64);
    Ok(head.into_response(Body::from(body)))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
