//! Venue Client M: off-chain CLOB, adapted from the existing
//! `infrastructure::client::clob::TradingClient` / `RestClient` stack.
//!
//! EIP-712 signing, HMAC-SHA256 L2 auth, and neg-risk domain selection are
//! all grounded on `order_builder` and `auth` as-is; this module only adds
//! the `VenueClientM` trait surface the Task Executor needs (IOC order
//! type, order status by id, cancel-with-timeout) on top of them.

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Duration;

use super::client::clob::{OrderType, Side as ClobSide, TradingClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MSide {
    Buy,
    Sell,
}

impl From<MSide> for ClobSide {
    fn from(s: MSide) -> Self {
        match s {
            MSide::Buy => ClobSide::Buy,
            MSide::Sell => ClobSide::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MOrderType {
    Gtc,
    Ioc,
}

impl From<MOrderType> for OrderType {
    fn from(t: MOrderType) -> Self {
        match t {
            // venue M exposes GTC/FOK/GTD/FAK; IOC is modeled here as FAK
            // (partial fills allowed, remainder killed).
            MOrderType::Gtc => OrderType::GTC,
            MOrderType::Ioc => OrderType::FAK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MOrderStatus {
    Live,
    Matched,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MPlaceOrderRequest {
    pub token_id: String,
    pub side: MSide,
    pub price: f64,
    pub quantity: f64,
    pub order_type: MOrderType,
    pub neg_risk: bool,
}

#[derive(Debug, Clone)]
pub struct MPlaceOrderResponse {
    pub order_id: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MOrderStatusResponse {
    pub status: MOrderStatus,
    pub filled_qty: f64,
    pub remaining_qty: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Default)]
pub struct MOrderbook {
    /// (price, size) sorted descending.
    pub bids: Vec<(f64, f64)>,
    /// (price, size) sorted ascending.
    pub asks: Vec<(f64, f64)>,
}

impl MOrderbook {
    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.asks.first().copied()
    }
}

#[derive(Debug, Clone)]
pub struct MMarketInfo {
    pub tick_size: f64,
    pub neg_risk: bool,
}

#[derive(Debug, Error)]
pub enum VenueMError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("venue rejection: {0}")]
    VenueRejection(String),
    #[error("signature/domain error: {0}")]
    SignatureDomain(String),
}

pub type Result<T> = std::result::Result<T, VenueMError>;

/// Required operations for venue M. Wire bit-exactness (EIP-712
/// typed data, HMAC URL-safe base64) is required only at the concrete
/// `TradingClient`-backed implementation, not at this trait boundary.
#[async_trait]
pub trait VenueClientM: Send + Sync {
    async fn place_order(&self, req: MPlaceOrderRequest) -> Result<MPlaceOrderResponse>;

    async fn get_order_status(&self, order_id: &str) -> Result<MOrderStatusResponse>;

    async fn cancel_order(&self, order_id: &str, timeout: Duration) -> Result<bool>;

    async fn get_orderbook(&self, token_id: &str) -> Result<MOrderbook>;

    async fn get_market_info(&self, condition_id: &str) -> Result<MMarketInfo>;

    async fn get_balance(&self) -> Result<f64>;
}

/// Parse the flexible `OpenOrder` (`serde_json::Value`) shape returned by
/// `GET /data/order/{id}` into an `MOrderStatusResponse`, the same tolerant
/// field access `reconciliation.rs` uses for the open-orders list.
fn parse_order_status(order: &serde_json::Value) -> Result<MOrderStatusResponse> {
    let status_str = order
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("LIVE")
        .to_ascii_uppercase();

    let original_size: f64 = order
        .get("original_size")
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_f64().map(|n| n.to_string())))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let size_matched: f64 = order
        .get("size_matched")
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_f64().map(|n| n.to_string())))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let avg_price: f64 = order
        .get("price")
        .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_f64().map(|n| n.to_string())))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let status = match status_str.as_str() {
        "MATCHED" => MOrderStatus::Matched,
        "CANCELED" | "CANCELLED" => MOrderStatus::Cancelled,
        _ => MOrderStatus::Live,
    };

    Ok(MOrderStatusResponse {
        status,
        filled_qty: size_matched,
        remaining_qty: (original_size - size_matched).max(0.0),
        avg_price,
    })
}

/// Concrete adapter over the existing `TradingClient`.
pub struct PolymarketVenueM {
    trading: TradingClient,
}

impl PolymarketVenueM {
    pub fn new(trading: TradingClient) -> Self {
        Self { trading }
    }
}

#[async_trait]
impl VenueClientM for PolymarketVenueM {
    async fn place_order(&self, req: MPlaceOrderRequest) -> Result<MPlaceOrderResponse> {
        let resp = self
            .trading
            .place_order(
                &req.token_id,
                req.price,
                req.quantity,
                req.side.into(),
                req.order_type.into(),
            )
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))?;

        Ok(MPlaceOrderResponse {
            order_id: resp.order_id,
            success: resp.success,
            error: resp.error_msg,
        })
    }

    async fn get_order_status(&self, order_id: &str) -> Result<MOrderStatusResponse> {
        let order = self
            .trading
            .get_order(order_id)
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))?;
        parse_order_status(&order)
    }

    async fn cancel_order(&self, order_id: &str, _timeout: Duration) -> Result<bool> {
        let resp = self
            .trading
            .cancel_order(order_id)
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))?;
        Ok(resp.canceled.iter().any(|id| id == order_id))
    }

    async fn get_orderbook(&self, token_id: &str) -> Result<MOrderbook> {
        let book = self
            .trading
            .rest()
            .get_orderbook(token_id)
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))?;

        Ok(MOrderbook {
            bids: book.bids.iter().map(|l| (l.price_f64(), l.size_f64())).collect(),
            asks: book.asks.iter().map(|l| (l.price_f64(), l.size_f64())).collect(),
        })
    }

    async fn get_market_info(&self, condition_id: &str) -> Result<MMarketInfo> {
        let market = self
            .trading
            .rest()
            .get_market(condition_id)
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))?;
        let neg_risk = market
            .outcomes
            .first()
            .map(|o| o.id.clone())
            .map(|token_id| self.trading.rest().get_neg_risk(&token_id));
        let neg_risk = match neg_risk {
            Some(fut) => fut.await.unwrap_or(false),
            None => false,
        };

        Ok(MMarketInfo {
            tick_size: 0.01,
            neg_risk,
        })
    }

    async fn get_balance(&self) -> Result<f64> {
        self.trading
            .get_usd_balance()
            .await
            .map_err(|e| VenueMError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ioc_maps_to_fill_and_kill() {
        let ot: OrderType = MOrderType::Ioc.into();
        assert_eq!(ot, OrderType::FAK);
    }
}
