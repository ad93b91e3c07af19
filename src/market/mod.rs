//! Market data streaming: codec, subscriptions, dispatch and the client.

pub mod codec;
pub mod dispatcher;
pub mod market_data;
pub mod message_parser;
pub mod providers;
pub mod stats;
pub mod streams;
pub mod subscription;
pub mod websocket_client;

// Re-exports for convenience
pub use dispatcher::{Dispatcher, PriceCallback};
pub use market_data::{PriceUpdate, RawMarketFrame};
pub use message_parser::MessageParser;
pub use stats::StatsSnapshot;
pub use streams::Stream;
pub use subscription::{SubscriptionRequest, build_requests};
pub use websocket_client::{ConnectionState, WebSocketClient};

pub use providers::bingx::{BingxClient, BingxParser, new_bingx_client};
