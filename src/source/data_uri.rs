//! `data:` URI decoding for embedded glTF buffers and images.

use crate::error::{EncoderError, Result};
use base64::{prelude::BASE64_STANDARD, Engine};

/// Check whether a URI carries its payload inline.
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// Decode a `data:[<mediatype>][;base64],<data>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| EncoderError::Format("Not a data URI".to_string()))?;
    let comma = rest
        .find(',')
        .ok_or_else(|| EncoderError::Format("Invalid data URI: no comma".to_string()))?;

    let header = &rest[..comma];
    let payload = &rest[comma + 1..];

    if header.ends_with(";base64") {
        decode_base64(payload)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Media type declared by a data URI, if any.
pub fn media_type(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let end = rest.find([';', ','])?;
    let media = &rest[..end];
    (!media.is_empty()).then_some(media)
}

/// Decode a standard-alphabet base64 payload; whitespace is skipped.
fn decode_base64(input: &str) -> Result<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| EncoderError::Format(format!("Invalid base64 payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_decode() {
        assert_eq!(decode_base64("SGVsbG8=").unwrap(), b"Hello");
        assert_eq!(decode_base64("SGVsbG8gV29ybGQ=").unwrap(), b"Hello World");
        assert_eq!(decode_base64("YQ==").unwrap(), b"a");
        assert_eq!(decode_base64("YWI=").unwrap(), b"ab");
        assert_eq!(decode_base64("YWJj").unwrap(), b"abc");
        assert_eq!(decode_base64("YWJj\nZA==").unwrap(), b"abcd");
        assert!(decode_base64("YW*j").is_err());
        // A lone trailing character cannot encode a byte.
        assert!(decode_base64("YWJjZ").is_err());
    }

    #[test]
    fn test_decode_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AAECAw==").unwrap();
        assert_eq!(bytes, vec![0, 1, 2, 3]);
        assert_eq!(decode_data_uri("data:,hi").unwrap(), b"hi");
        assert!(decode_data_uri("data:nocomma").is_err());
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("data:image/png;base64,AAAA"), Some("image/png"));
        assert_eq!(media_type("data:;base64,AAAA"), None);
        assert_eq!(media_type("texture.png"), None);
    }
}
