//! HTTP trade API
//!
//! Exposes the same trading actions as the CLI for a separate client:
//! the universe listing, price history, the wallet view and buy/sell.
//! Rejections map to status codes with a machine-readable error body
//! `{error, code}`. CORS is wide open; this is a single-user simulator,
//! not a guarded service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::desk::{StockListing, TradingDesk};
use crate::errors::TradeError;
use crate::feed::{Candle, HistoryRange};
use crate::ledger::TradeRecord;
use crate::valuation::{PositionRow, ValuationReport};

#[derive(Clone)]
pub struct AppState {
    desk: Arc<TradingDesk>,
}

/// Body of POST /wallet/buy and /wallet/sell
///
/// The quantity is deserialized signed so that a negative number is
/// rejected as an invalid quantity instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub quantity: i64,
}

impl TradeRequest {
    fn shares(&self) -> Result<u64, TradeError> {
        u64::try_from(self.quantity)
            .ok()
            .filter(|&q| q > 0)
            .ok_or(TradeError::InvalidQuantity)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Error wrapper mapping the trade taxonomy onto HTTP statuses
enum ApiError {
    Trade(TradeError),
    BadRequest { message: String, code: &'static str },
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        Self::Trade(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Trade(TradeError::Persistence(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Trade(err) => {
                let status = match &err {
                    TradeError::UnknownSymbol { .. } | TradeError::PriceUnavailable { .. } => {
                        StatusCode::NOT_FOUND
                    }
                    TradeError::InvalidQuantity
                    | TradeError::InsufficientFunds { .. }
                    | TradeError::InsufficientShares { .. } => StatusCode::BAD_REQUEST,
                    TradeError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    ErrorBody {
                        error: err.to_string(),
                        code: err.code(),
                    },
                )
            }
            ApiError::BadRequest { message, code } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: message,
                    code,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// GET /wallet response: cash plus the valuation report
#[derive(Debug, Serialize)]
struct WalletResponse {
    cash: Decimal,
    equity: Decimal,
    positions: Vec<PositionRow>,
    skipped: Vec<String>,
    total_value: Decimal,
    total_cost: Decimal,
    total_profit: Decimal,
    total_profit_percent: Decimal,
}

impl From<ValuationReport> for WalletResponse {
    fn from(report: ValuationReport) -> Self {
        Self {
            cash: report.cash,
            equity: report.equity(),
            positions: report.rows,
            skipped: report.skipped,
            total_value: report.total_value,
            total_cost: report.total_cost,
            total_profit: report.total_profit,
            total_profit_percent: report.total_profit_percent,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    range: Option<String>,
}

async fn get_stocks(State(state): State<AppState>) -> Json<Vec<StockListing>> {
    Json(state.desk.listings().await)
}

async fn get_stock_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Candle>>, ApiError> {
    let range = query
        .range
        .as_deref()
        .unwrap_or("3mo")
        .parse::<HistoryRange>()
        .map_err(|e| ApiError::BadRequest {
            message: e.to_string(),
            code: "invalid_range",
        })?;
    let candles = state.desk.history(&symbol, range).await?;
    Ok(Json(candles))
}

async fn get_wallet(State(state): State<AppState>) -> Result<Json<WalletResponse>, ApiError> {
    let (_, report) = state.desk.wallet_report().await?;
    Ok(Json(WalletResponse::from(report)))
}

async fn get_wallet_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<TradeRecord>>, ApiError> {
    Ok(Json(state.desk.trade_log().await?))
}

async fn post_buy(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeRecord>, ApiError> {
    let record = state.desk.buy(&request.symbol, request.shares()?).await?;
    Ok(Json(record))
}

async fn post_sell(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeRecord>, ApiError> {
    let record = state.desk.sell(&request.symbol, request.shares()?).await?;
    Ok(Json(record))
}

/// Build the router with CORS and request tracing
pub fn router(desk: Arc<TradingDesk>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/stocks", get(get_stocks))
        .route("/stocks/{symbol}/history", get(get_stock_history))
        .route("/wallet", get(get_wallet))
        .route("/wallet/history", get(get_wallet_history))
        .route("/wallet/buy", post(post_buy))
        .route("/wallet/sell", post(post_sell))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { desk })
}

/// Serve the API until ctrl-c
pub async fn serve(config: &ServerConfig, desk: Arc<TradingDesk>) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address {}:{}: {e}", config.host, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("trade API listening on {addr}");

    axum::serve(listener, router(desk))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
