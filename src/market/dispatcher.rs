//! Turns decoded frames into [`PriceUpdate`]s and hands them to the consumer.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::error::StreamError;
use crate::market::market_data::{PriceUpdate, RawMarketFrame};
use crate::market::stats::ClientStats;

/// Consumer callback, fixed at construction and never replaced.
pub type PriceCallback = Arc<dyn Fn(PriceUpdate) + Send + Sync>;

pub struct Dispatcher {
    callback: Option<PriceCallback>,
    stats: Arc<ClientStats>,
}

impl Dispatcher {
    pub fn new(callback: Option<PriceCallback>, stats: Arc<ClientStats>) -> Self {
        Self { callback, stats }
    }

    /// Normalizes `frame` and delivers it to the callback.
    ///
    /// Frames with an empty channel or price are keep-alive artifacts and are
    /// dropped without a diagnostic. An unparseable price is logged, counted
    /// and dropped. The callback runs synchronously on the caller's task; a
    /// panic inside it is caught and logged.
    pub fn dispatch(&self, frame: &RawMarketFrame) -> Option<PriceUpdate> {
        let price_text = frame.price_text();
        if frame.channel.is_empty() || price_text.is_empty() {
            trace!(channel = %frame.channel, "dropping frame without price");
            return None;
        }

        let price = match parse_price(price_text) {
            Ok(price) => price,
            Err(e) => {
                self.stats.record_malformed_price();
                warn!(channel = %frame.channel, "dropping frame: {e}");
                return None;
            }
        };

        let update = PriceUpdate::new(parse_symbol(&frame.channel), price);
        self.stats.record_price_update();

        if let Some(callback) = &self.callback {
            let delivery = update.clone();
            if panic::catch_unwind(AssertUnwindSafe(|| callback(delivery))).is_err() {
                error!(symbol = %update.symbol(), "price callback panicked");
            }
        }

        Some(update)
    }
}

/// Instrument part of a channel: everything before the first `@`, unless
/// the `@` is the first character or absent.
pub fn parse_symbol(channel: &str) -> &str {
    match channel.find('@') {
        Some(idx) if idx > 0 => &channel[..idx],
        _ => channel,
    }
}

/// Parses a finite decimal price. Surrounding whitespace is not accepted.
pub fn parse_price(text: &str) -> Result<f64, StreamError> {
    match text.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(StreamError::MalformedPrice(text.to_string())),
    }
}
