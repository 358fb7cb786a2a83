//! REST API server for linkchain
//!
//! Exposes the five ledger operations over HTTP. `GET /chain` doubles as
//! the endpoint peers fetch during conflict resolution, so its body is the
//! wire form of [`ChainSnapshot`].

use axum::{
    extract::{Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::blockchain::{Block, ChainSnapshot};
use crate::ledger::Ledger;
use crate::sync::PeerFetch;
use crate::transaction::Transaction;

/// Shared handler state: the ledger, the peer fetcher and this node's
/// reward identifier.
pub struct Node<F> {
    pub ledger: Arc<Ledger>,
    pub fetch: Arc<F>,
    pub node_identifier: String,
    stats: Arc<ApiStats>,
}

impl<F: PeerFetch + 'static> Node<F> {
    pub fn new(ledger: Arc<Ledger>, fetch: Arc<F>, node_identifier: impl Into<String>) -> Self {
        Self {
            ledger,
            fetch,
            node_identifier: node_identifier.into(),
            stats: Arc::new(ApiStats::new()),
        }
    }
}

/// Request counters reported by `/health`
#[derive(Debug)]
struct ApiStats {
    total_requests: AtomicU64,
    failed_requests: AtomicU64,
    blocks_mined: AtomicU64,
    transactions_submitted: AtomicU64,
    start_time: Instant,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            total_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            blocks_mined: AtomicU64::new(0),
            transactions_submitted: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    InvalidInput(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        MineResponse {
            message: "New Block Forged".to_string(),
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewTransactionRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub message: String,
    pub chain: Vec<Block>,
}

// ============================================================================
// Middleware
// ============================================================================

async fn stats_middleware(State(stats): State<Arc<ApiStats>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    stats.record_request(response.status().is_success());
    response
}

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints
pub fn build_api_router<F: PeerFetch + 'static>(node: Arc<Node<F>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/mine", get(mine::<F>))
        .route("/transactions/new", post(new_transaction::<F>))
        .route("/chain", get(full_chain::<F>))
        .route("/nodes/register", post(register_nodes::<F>))
        .route("/nodes/resolve", get(resolve_nodes::<F>))
        .route("/health", get(health_check::<F>))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn_with_state(
            node.stats.clone(),
            stats_middleware,
        ))
        .with_state(node)
        .layer(cors)
}

/// Serve the API on `0.0.0.0:port` until the process stops.
pub async fn run_api_server<F: PeerFetch + 'static>(
    node: Arc<Node<F>>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(node);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(addr = %addr, "API server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn mine<F: PeerFetch + 'static>(
    State(node): State<Arc<Node<F>>>,
) -> Result<Json<MineResponse>, ApiError> {
    let ledger = node.ledger.clone();
    let miner = node.node_identifier.clone();

    // The proof search is CPU-bound; keep it off the async workers.
    let block = tokio::task::spawn_blocking(move || ledger.mine(&miner))
        .await
        .map_err(|e| ApiError::InternalError(format!("Mining task failed: {}", e)))?;

    node.stats.blocks_mined.fetch_add(1, Ordering::Relaxed);
    Ok(Json(block.into()))
}

async fn new_transaction<F: PeerFetch + 'static>(
    State(node): State<Arc<Node<F>>>,
    Json(req): Json<NewTransactionRequest>,
) -> Json<MessageResponse> {
    let index = node
        .ledger
        .submit_transaction(req.sender, req.recipient, req.amount);
    node.stats
        .transactions_submitted
        .fetch_add(1, Ordering::Relaxed);

    Json(MessageResponse {
        message: format!("Transaction will be added to Block {}", index),
    })
}

async fn full_chain<F: PeerFetch + 'static>(
    State(node): State<Arc<Node<F>>>,
) -> Json<ChainSnapshot> {
    Json(node.ledger.get_chain())
}

async fn register_nodes<F: PeerFetch + 'static>(
    State(node): State<Arc<Node<F>>>,
    Json(req): Json<RegisterNodesRequest>,
) -> Result<Json<RegisterNodesResponse>, ApiError> {
    if req.nodes.is_empty() {
        return Err(ApiError::InvalidInput(
            "Please supply a valid list of nodes".to_string(),
        ));
    }

    for address in &req.nodes {
        if let Err(e) = node.ledger.register_node(address) {
            warn!(address = %address, error = %e, "Skipping peer address");
        }
    }

    Ok(Json(RegisterNodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes: node.ledger.nodes(),
    }))
}

async fn resolve_nodes<F: PeerFetch + 'static>(
    State(node): State<Arc<Node<F>>>,
) -> Json<ResolveResponse> {
    let replaced = node.ledger.resolve_conflicts(node.fetch.as_ref()).await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };

    Json(ResolveResponse {
        message: message.to_string(),
        chain: node.ledger.get_chain().chain,
    })
}

async fn health_check<F: PeerFetch + 'static>(State(node): State<Arc<Node<F>>>) -> impl IntoResponse {
    let stats = &node.stats;
    Json(serde_json::json!({
        "status": "healthy",
        "node_identifier": node.node_identifier,
        "chain_length": node.ledger.chain_len(),
        "peers": node.ledger.nodes().len(),
        "total_requests": stats.total_requests.load(Ordering::Relaxed),
        "failed_requests": stats.failed_requests.load(Ordering::Relaxed),
        "blocks_mined": stats.blocks_mined.load(Ordering::Relaxed),
        "transactions_submitted": stats.transactions_submitted.load(Ordering::Relaxed),
        "uptime_seconds": stats.start_time.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
