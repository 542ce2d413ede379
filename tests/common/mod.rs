//! Common test helpers.
#![allow(dead_code)]

use jwe::jwk::JsonWebKey;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// The plaintext of the RFC 7520 encryption examples.
pub const FRODO: &str = "You can trust us to stick with you through thick and thin\u{2013}to the \
bitter end. And you can trust us to keep any secret of yours\u{2013}closer than you keep it \
yourself. But you cannot trust us to let you face trouble alone, and go off without a word. We \
are your friends, Frodo.";

fn vector(path: &str) -> TestResult<String> {
    let content =
        std::fs::read_to_string(format!("{}/tests/vectors/{path}", env!("CARGO_MANIFEST_DIR")))?;
    Ok(content)
}

/// Reads a key file from the `tests/vectors/jwk` directory.
pub fn read_jwk(name: &str) -> TestResult<JsonWebKey> {
    let json = vector(&format!("jwk/{name}.json"))?;
    let key: JsonWebKey = serde_json::from_str(&json)?;

    Ok(key)
}

/// Reads a serialized message from the `tests/vectors/rfc7520` directory.
pub fn read_rfc7520(name: &str) -> TestResult<String> {
    vector(&format!("rfc7520/{name}"))
}
