//! Exchange provider implementations.

pub mod bingx;

pub use bingx::{BINGX_SWAP_WSS_ENDPOINT, BingxClient, BingxParser, new_bingx_client};
