//! Gzip frame codec and control-frame recognition.

use std::io::{self, Read, Write};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::error::StreamError;

pub const PING_TEXT: &str = "Ping";
pub const PONG_TEXT: &str = "Pong";
pub const PING: &[u8] = PING_TEXT.as_bytes();
pub const PONG: &[u8] = PONG_TEXT.as_bytes();

/// A decompressed inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Ping,
    Pong,
    Data(Vec<u8>),
}

/// Decompresses one whole frame. Concatenated gzip members are joined;
/// trailing bytes that are not a gzip member fail the frame.
pub fn decode(raw: &[u8]) -> Result<Vec<u8>, StreamError> {
    if raw.is_empty() {
        return Err(StreamError::Codec(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty frame",
        )));
    }

    let mut decoder = MultiGzDecoder::new(raw);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).map_err(StreamError::Codec)?;
    Ok(decoded)
}

/// Decompresses a frame, then classifies it. Control payloads are only
/// recognized after decompression, by exact byte match.
pub fn decode_frame(raw: &[u8]) -> Result<Frame, StreamError> {
    let decoded = decode(raw)?;
    Ok(match decoded.as_slice() {
        PING => Frame::Ping,
        PONG => Frame::Pong,
        _ => Frame::Data(decoded),
    })
}

/// Gzip-compresses a payload the way the exchange does.
pub fn encode(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_frames() {
        assert_eq!(decode_frame(&encode(b"Ping").unwrap()).unwrap(), Frame::Ping);
        assert_eq!(decode_frame(&encode(b"Pong").unwrap()).unwrap(), Frame::Pong);
    }

    #[test]
    fn test_control_match_is_exact() {
        for payload in [&b"ping"[..], b"PING", b"Ping ", b"Pings"] {
            let frame = decode_frame(&encode(payload).unwrap()).unwrap();
            assert_eq!(frame, Frame::Data(payload.to_vec()));
        }
    }

    #[test]
    fn test_data_frame() {
        let json = br#"{"dataType":"BTC-USDT@trade","data":{"p":"100.50"}}"#;
        let frame = decode_frame(&encode(json).unwrap()).unwrap();
        assert_eq!(frame, Frame::Data(json.to_vec()));
    }

    #[test]
    fn test_uncompressed_ping_is_not_a_control_frame() {
        let err = decode_frame(b"Ping").unwrap_err();
        assert!(matches!(err, StreamError::Codec(_)));
    }

    #[test]
    fn test_corrupt_frames() {
        assert!(matches!(decode(b""), Err(StreamError::Codec(_))));
        assert!(matches!(decode(b"not gzip at all"), Err(StreamError::Codec(_))));

        let full = encode(br#"{"dataType":"BTC-USDT@trade","data":{"p":"100.50"}}"#).unwrap();
        let truncated = &full[..full.len() / 2];
        assert!(matches!(decode(truncated), Err(StreamError::Codec(_))));
    }

    #[test]
    fn test_trailing_garbage_fails_frame() {
        let mut raw = encode(b"Ping").unwrap();
        raw.extend_from_slice(b"GARBAGE TRAILER");
        assert!(matches!(decode_frame(&raw), Err(StreamError::Codec(_))));
    }

    #[test]
    fn test_concatenated_members_are_joined() {
        let mut raw = encode(b"Pi").unwrap();
        raw.extend(encode(b"ng").unwrap());
        assert_eq!(decode_frame(&raw).unwrap(), Frame::Ping);
    }
}
