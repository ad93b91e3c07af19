//! BingX perpetual-swap implementation.

use std::sync::Arc;

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::market::dispatcher::PriceCallback;
use crate::market::market_data::{PriceUpdate, RawMarketFrame};
use crate::market::message_parser::MessageParser;
use crate::market::subscription::SubscriptionRequest;
use crate::market::websocket_client::WebSocketClient;

pub const BINGX_SWAP_WSS_ENDPOINT: &str = "wss://open-api-swap.bingx.com/swap-market";

/// Parser for the BingX swap push stream.
///
/// Subscribe requests go out as `{"id":..,"reqType":"sub","dataType":..}`;
/// data frames arrive as `{"dataType":..,"data":{"p":..}}` once gunzipped.
#[derive(Debug, Clone, Default)]
pub struct BingxParser;

impl BingxParser {
    pub fn new() -> Self {
        Self
    }
}

impl MessageParser for BingxParser {
    fn endpoint(&self) -> &str {
        BINGX_SWAP_WSS_ENDPOINT
    }

    fn name(&self) -> &'static str {
        "BingX"
    }

    fn format_subscribe(&self, request: &SubscriptionRequest) -> Result<String, StreamError> {
        Ok(serde_json::to_string(request)?)
    }

    fn parse_message(&self, payload: &[u8]) -> Result<RawMarketFrame, StreamError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

pub type BingxClient = WebSocketClient<BingxParser>;

/// Builds a BingX client that hands every price update to `callback`.
pub fn new_bingx_client<F>(config: StreamConfig, callback: F) -> BingxClient
where
    F: Fn(PriceUpdate) + Send + Sync + 'static,
{
    let callback: PriceCallback = Arc::new(callback);
    WebSocketClient::new(BingxParser::new(), config, Some(callback))
}
