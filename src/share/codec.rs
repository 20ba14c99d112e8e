use std::io::{Read, Write};

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::NO_PAD;
use base64::engine::GeneralPurpose;
use base64::Engine as _;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::portfolio::Holding;

/// Base64 alphabet used before the `+` -> `_` substitution: standard base64
/// with `/` swapped for `-`. Published tokens therefore use only
/// `[A-Za-z0-9_-]` and can never contain `/`, `?`, `#`, space, or `%`.
const TOKEN_ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+-") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("token alphabet must be 64 unique ASCII characters"),
    };

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(&TOKEN_ALPHABET, NO_PAD);

/// Serialize a holdings list to a compact token safe to embed directly in a
/// URL path segment.
pub fn encode(holdings: &[Holding]) -> Result<String> {
    let payload = serde_json::to_vec(holdings)?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&payload)?;
    let compressed = encoder.finish()?;
    Ok(TOKEN_ENGINE.encode(compressed).replace('+', "_"))
}

/// Decode a token back into the exact holdings list it was built from.
///
/// Returns `None` for an empty token, for anything that fails base64 or
/// deflate decoding, and for payloads that are not a holdings list. Never
/// panics and never surfaces an error to the caller.
pub fn decode(token: &str) -> Option<Vec<Holding>> {
    if token.is_empty() {
        return None;
    }

    let normalized = normalize_token(token);

    let compressed = match TOKEN_ENGINE.decode(&normalized) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("failed to decode portfolio token: {err}");
            return None;
        }
    };

    let mut payload = Vec::new();
    if let Err(err) = DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut payload) {
        log::warn!("failed to decompress portfolio token: {err}");
        return None;
    }

    match serde_json::from_slice(&payload) {
        Ok(holdings) => Some(holdings),
        Err(err) => {
            log::warn!("portfolio token payload is not a holdings list: {err}");
            return None;
        }
    }
}

/// Reverse the transport manglings an unescaped `+` is known to suffer: form
/// decoding turns it into a space, our own published form substitutes `_`,
/// and a second percent-encoding layer leaves a literal `%20`. A given token
/// only ever suffered one of these, and none of the three patterns can occur
/// in a legitimate token, so reversing all of them is safe.
fn normalize_token(token: &str) -> String {
    token.replace(' ', "+").replace('_', "+").replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_holdings() -> Vec<Holding> {
        vec![
            Holding::new("AAPL", 3),
            Holding::new("7203.T", 5),
            Holding::new("MSFT", 12),
        ]
    }

    #[test]
    fn round_trips_holdings() {
        let holdings = sample_holdings();
        let token = encode(&holdings).expect("encode");
        assert_eq!(decode(&token), Some(holdings));
    }

    #[test]
    fn round_trips_empty_list() {
        let token = encode(&[]).expect("encode");
        assert!(!token.is_empty());
        assert_eq!(decode(&token), Some(Vec::new()));
    }

    #[test]
    fn tokens_stay_path_safe() {
        let token = encode(&sample_holdings()).expect("encode");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "unexpected character in token: {token}"
        );
    }

    #[test]
    fn survives_known_transport_manglings() {
        let holdings = sample_holdings();
        // The pre-substitution compressed form is the published token with
        // the `_` substitution undone.
        let raw = encode(&holdings).expect("encode").replace('_', "+");

        assert_eq!(decode(&raw), Some(holdings.clone()));
        assert_eq!(decode(&raw.replace('+', " ")), Some(holdings.clone()));
        assert_eq!(decode(&raw.replace('+', "_")), Some(holdings.clone()));
        assert_eq!(decode(&raw.replace('+', "%20")), Some(holdings));
    }

    #[test]
    fn normalizes_each_mangling_independently() {
        assert_eq!(normalize_token("a b_c%20d"), "a+b+c+d");
        assert_eq!(normalize_token("untouched"), "untouched");
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("not-a-valid-token!!!"), None);
        assert_eq!(decode("%20%20"), None);
        // Valid base64, not a deflate stream.
        assert_eq!(decode("AAAA"), None);
    }

    #[test]
    fn rejects_payloads_that_are_not_holdings() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(br#"{"symbol":"AAPL"}"#)
            .expect("write payload");
        let bytes = encoder.finish().expect("finish");
        let token = TOKEN_ENGINE.encode(bytes).replace('+', "_");

        assert_eq!(decode(&token), None);
    }
}
