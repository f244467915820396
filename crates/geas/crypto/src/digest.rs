//! SHA-256 digests in the ledger's tagged text form (`sha256:<hex>`).

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// Algorithm tag prefixed to every rendered digest.
pub const HASH_ALGORITHM: &str = "sha256";

/// A SHA-256 digest. Displays and serializes as `sha256:<lowercase hex>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; 32]);

impl Digest {
    /// SHA-256 of `bytes`.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// The raw 32-byte digest, without the `sha256:` tag.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Bare lowercase hex, no algorithm tag.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse either the tagged form or bare hex.
    pub fn parse(text: &str) -> Result<Self, CryptoError> {
        let hex_part = strip_tag(text);
        let bytes = hex::decode(hex_part).map_err(|_| CryptoError::InvalidDigest(text.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidDigest(text.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", HASH_ALGORITHM, self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.to_string()
    }
}

/// Drop a leading `sha256:` tag if present.
pub fn strip_tag(text: &str) -> &str {
    text.strip_prefix("sha256:").unwrap_or(text)
}

/// Hash arbitrary bytes.
pub fn sha256_digest(bytes: &[u8]) -> Digest {
    Digest::of(bytes)
}

/// Hash arbitrary bytes and return bare hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Digest::of(bytes).to_hex()
}

/// Raw whole-file content hash. Used when sealing documents and when
/// re-checking them, so the two always agree byte for byte.
pub fn file_digest(content: &[u8]) -> Digest {
    Digest::of(content)
}

/// Trim surrounding whitespace, then hash. Untagged hex.
///
/// Only for slug and short string inputs. Never use this for sealed files:
/// a sealed hash computed this way would not match [`file_digest`].
pub fn normalized_text_digest(text: &str) -> String {
    sha256_hex(text.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn empty_input_known_vector() {
        assert_eq!(sha256_hex(b""), EMPTY);
        assert_eq!(sha256_digest(b"").to_string(), format!("sha256:{EMPTY}"));
    }

    #[test]
    fn parse_accepts_tagged_and_bare() {
        let tagged: Digest = format!("sha256:{EMPTY}").parse().unwrap();
        let bare = Digest::parse(EMPTY).unwrap();
        assert_eq!(tagged, bare);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Digest::parse("sha256:zz").is_err());
        assert!(Digest::parse("sha256:abcd").is_err());
    }

    #[test]
    fn serde_uses_tagged_string() {
        let d = file_digest(b"A");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.starts_with("\"sha256:"));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn raw_and_normalized_conventions_differ() {
        let content = "# Title\n";
        assert_ne!(file_digest(content.as_bytes()).to_hex(), normalized_text_digest(content));
        assert_eq!(normalized_text_digest("  slug \n"), sha256_hex(b"slug"));
    }

    #[test]
    fn strip_tag_is_noop_on_bare() {
        assert_eq!(strip_tag("abc"), "abc");
        assert_eq!(strip_tag("sha256:abc"), "abc");
    }
}
