//! Streaming client for BingX perpetual-swap market data.
//!
//! The client keeps one WebSocket connection to the exchange push endpoint,
//! subscribes to a fixed list of channels, answers `Ping` heartbeats and
//! reconnects on its own when the transport fails.

pub mod config;
pub mod error;
pub mod market;

pub use config::StreamConfig;
pub use error::StreamError;
pub use market::{
    BingxClient, BingxParser, ConnectionState, MessageParser, PriceCallback, PriceUpdate,
    StatsSnapshot, Stream, SubscriptionRequest, WebSocketClient, new_bingx_client,
};
