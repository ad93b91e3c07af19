//! MessageParser trait for exchange-specific message handling.

use crate::error::StreamError;
use crate::market::market_data::RawMarketFrame;
use crate::market::subscription::SubscriptionRequest;

/// Exchange-specific endpoint, request formatting and payload parsing.
/// [`WebSocketClient`](crate::market::WebSocketClient) handles everything else.
pub trait MessageParser: Send + Sync + 'static {
    /// Push-data endpoint used when the config does not override it.
    fn endpoint(&self) -> &str;

    fn name(&self) -> &'static str;

    fn format_subscribe(&self, request: &SubscriptionRequest) -> Result<String, StreamError>;

    /// Parses a decompressed, non-control payload.
    fn parse_message(&self, payload: &[u8]) -> Result<RawMarketFrame, StreamError>;
}
