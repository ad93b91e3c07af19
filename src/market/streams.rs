//! Stream types for WebSocket subscriptions.

use std::fmt;

/// Typed builder for BingX swap channel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stream {
    /// Real-time trade stream
    Trades { symbol: String },
    /// Latest traded price
    LastPrice { symbol: String },
    /// Mark price stream
    MarkPrice { symbol: String },
    /// Order book depth stream (5, 10, 20, 50 or 100 levels)
    Depth { symbol: String, levels: u32 },
    /// Candlestick/Kline data stream
    Candles { symbol: String, interval: String },
}

impl Stream {
    pub fn trades(symbol: impl Into<String>) -> Self {
        Self::Trades {
            symbol: symbol.into(),
        }
    }

    pub fn last_price(symbol: impl Into<String>) -> Self {
        Self::LastPrice {
            symbol: symbol.into(),
        }
    }

    pub fn mark_price(symbol: impl Into<String>) -> Self {
        Self::MarkPrice {
            symbol: symbol.into(),
        }
    }

    pub fn depth(symbol: impl Into<String>, levels: u32) -> Self {
        Self::Depth {
            symbol: symbol.into(),
            levels,
        }
    }

    pub fn candles(symbol: impl Into<String>, interval: impl Into<String>) -> Self {
        Self::Candles {
            symbol: symbol.into(),
            interval: interval.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Stream::Trades { symbol }
            | Stream::LastPrice { symbol }
            | Stream::MarkPrice { symbol }
            | Stream::Depth { symbol, .. }
            | Stream::Candles { symbol, .. } => symbol,
        }
    }

    /// Channel string as sent in `dataType`.
    pub fn channel(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Trades { symbol } => write!(f, "{symbol}@trade"),
            Stream::LastPrice { symbol } => write!(f, "{symbol}@lastPrice"),
            Stream::MarkPrice { symbol } => write!(f, "{symbol}@markPrice"),
            Stream::Depth { symbol, levels } => write!(f, "{symbol}@depth{levels}"),
            Stream::Candles { symbol, interval } => write!(f, "{symbol}@kline_{interval}"),
        }
    }
}

impl From<Stream> for String {
    fn from(stream: Stream) -> Self {
        stream.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names() {
        assert_eq!(Stream::trades("BTC-USDT").channel(), "BTC-USDT@trade");
        assert_eq!(Stream::last_price("BTC-USDT").channel(), "BTC-USDT@lastPrice");
        assert_eq!(Stream::mark_price("ETH-USDT").channel(), "ETH-USDT@markPrice");
        assert_eq!(Stream::depth("SOL-USDT", 20).channel(), "SOL-USDT@depth20");
        assert_eq!(Stream::candles("BTC-USDT", "1m").channel(), "BTC-USDT@kline_1m");
    }

    #[test]
    fn test_symbol() {
        assert_eq!(Stream::candles("BTC-USDT", "5m").symbol(), "BTC-USDT");
        assert_eq!(Stream::depth("ETH-USDT", 5).symbol(), "ETH-USDT");
    }

    #[test]
    fn test_into_string() {
        let channel: String = Stream::trades("DOGE-USDT").into();
        assert_eq!(channel, "DOGE-USDT@trade");
    }
}
