//! Market data types carried over the stream.

use serde::{Deserialize, Serialize};

pub const PRICE_UPDATE_KIND: &str = "priceUpdate";

/// Normalized price event handed to the consumer callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceUpdate {
    #[serde(rename = "type")]
    kind: &'static str,
    symbol: String,
    price: f64,
}

impl PriceUpdate {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            kind: PRICE_UPDATE_KIND,
            symbol: symbol.into(),
            price,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

/// Decoded data frame before normalization.
///
/// Subscription acknowledgements carry `"data": null`, so every field
/// defaults to empty and the dispatcher drops them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMarketFrame {
    /// `<instrument>@<stream>`, e.g. `BTC-USDT@trade`.
    #[serde(rename = "dataType", default)]
    pub channel: String,
    #[serde(rename = "data", default)]
    pub payload: Option<PricePayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PricePayload {
    #[serde(rename = "p", default)]
    pub price_text: String,
}

impl RawMarketFrame {
    pub fn new(channel: impl Into<String>, price_text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: Some(PricePayload {
                price_text: price_text.into(),
            }),
        }
    }

    pub fn price_text(&self) -> &str {
        self.payload
            .as_ref()
            .map(|p| p.price_text.as_str())
            .unwrap_or_default()
    }
}
