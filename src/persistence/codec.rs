//! Value encoding for size-limited backends
//!
//! A value is serialized to JSON, percent-escaped exactly like the
//! browser's `encodeURIComponent`, then base64 encoded. The result is
//! byte-for-byte what `btoa(encodeURIComponent(JSON.stringify(v)))`
//! produces, so data written by older clients stays readable.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Characters `encodeURIComponent` leaves alone
pub(crate) const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
#[error("value cannot be serialized: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("escaped payload is not valid UTF-8")]
    Utf8,
    #[error("payload is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a value into the printable base64 alphabet
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    let json = serde_json::to_string(value)?;
    let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
    Ok(STANDARD.encode(escaped))
}

/// Exact inverse of [`encode`]
pub fn decode<T: DeserializeOwned>(encoded: &str) -> Result<T, DecodeError> {
    let bytes = STANDARD.decode(encoded)?;
    let escaped = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;
    let json = percent_decode_str(&escaped)
        .decode_utf8()
        .map_err(|_| DecodeError::Utf8)?;
    Ok(serde_json::from_str(&json)?)
}

/// Split into contiguous pieces of at most `max_len` characters.
///
/// # Panics
/// If `max_len` is zero.
pub fn split_into_chunks(s: &str, max_len: usize) -> Vec<&str> {
    assert!(max_len > 0, "chunk length must be positive");

    let mut chunks = Vec::with_capacity(s.len().div_ceil(max_len));
    let mut rest = s;
    while !rest.is_empty() {
        let end = rest
            .char_indices()
            .nth(max_len)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}

/// Concatenate chunks in order
pub fn join_chunks<I, S>(chunks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    chunks.into_iter().fold(String::new(), |mut joined, chunk| {
        joined.push_str(chunk.as_ref());
        joined
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_matches_browser_encoding() {
        assert_eq!(
            encode("aa|2s|5.00s").unwrap(),
            "JTIyYWElN0MycyU3QzUuMDBzJTIy"
        );
        // Non-ASCII goes through UTF-8 percent escapes
        assert_eq!(encode("점수").unwrap(), "JTIyJUVDJUEwJTkwJUVDJTg4JTk4JTIy");
    }

    #[test]
    fn test_decode_struct() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Sample {
            k: Vec<u32>,
        }
        let decoded: Sample = decode("JTdCJTIyayUyMiUzQSU1QjElMkMyJTVEJTdE").unwrap();
        assert_eq!(decoded, Sample { k: vec![1, 2] });
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode::<String>("not base64!"), Err(DecodeError::Base64(_))));
        // Valid base64 of "%22unterminated"
        let encoded = STANDARD.encode("%22unterminated");
        assert!(matches!(decode::<String>(&encoded), Err(DecodeError::Json(_))));
        // Percent escape of an invalid UTF-8 byte
        let encoded = STANDARD.encode("%FF");
        assert!(matches!(decode::<String>(&encoded), Err(DecodeError::Utf8)));
    }

    #[test]
    fn test_split_sizes() {
        let chunks = split_into_chunks("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
        assert!(split_into_chunks("", 3).is_empty());
        assert_eq!(split_into_chunks("abc", 10), vec!["abc"]);
    }

    #[test]
    fn test_split_counts_characters() {
        let chunks = split_into_chunks("가나다라", 3);
        assert_eq!(chunks, vec!["가나다", "라"]);
    }

    #[test]
    #[should_panic]
    fn test_split_zero_panics() {
        split_into_chunks("abc", 0);
    }

    #[test]
    fn test_join() {
        assert_eq!(join_chunks(["ab", "c", "", "d"]), "abcd");
        assert_eq!(join_chunks(Vec::<String>::new()), "");
    }
}
