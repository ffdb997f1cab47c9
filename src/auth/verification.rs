//! Email verification codes.
//!
//! The raw code only ever travels in the emailed link (hex encoded). The users
//! table stores its SHA-256 digest, which is recomputed from the link on
//! verification. The digest is unsalted so it can be looked up directly.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

const CODE_LEN: usize = 16;

pub struct VerificationCode {
    raw: [u8; CODE_LEN],
}

impl VerificationCode {
    pub fn generate() -> Self {
        let mut raw = [0u8; CODE_LEN];
        OsRng.fill_bytes(&mut raw);
        Self { raw }
    }

    /// URL-safe form placed in the verification link.
    pub fn to_hex(&self) -> String {
        hex::encode(self.raw)
    }

    /// Value persisted on the user row.
    pub fn digest(&self) -> String {
        digest(&self.raw)
    }
}

pub fn digest(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}

/// Digest of the code carried by a verification link, or `None` if the
/// path segment is not valid hex.
pub fn digest_from_hex(token_hex: &str) -> Option<String> {
    let raw = hex::decode(token_hex.trim()).ok()?;
    if raw.is_empty() {
        return None;
    }
    Some(digest(&raw))
}

pub fn verification_url(public_base_url: &str, token_hex: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!("{base}/api/v1/auth/verifyemail/{token_hex}")
}
