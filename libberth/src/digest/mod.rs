//! Content digests for blobs fetched from a registry.
//!
//! Wraps `oci_spec::image::Digest` so parsing errors surface as
//! [`BerthError`] and downloaded content can be verified in one call.

use crate::error::{Result, BerthError};
use oci_spec::image::Digest as OciDigest;
use sha2::{Digest as Sha2Digest, Sha256};
use std::fmt;
use std::str::FromStr;


/// A content digest such as `sha256:7173b8...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = BerthError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s).map_err(|e| BerthError::Validation {
            message: format!("Invalid digest format: {}", e),
            source: Some(Box::new(e)),
        })?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Digest {
    /// Algorithm name, e.g. "sha256".
    pub fn algorithm(&self) -> String {
        self.0.algorithm().to_string()
    }

    /// Encoded hash part after the colon.
    pub fn hex(&self) -> &str {
        self.0.digest()
    }

    /// Checks that `content` hashes to this digest.
    ///
    /// Only sha256 content can be verified.
    pub fn verify(&self, content: &[u8]) -> Result<()> {
        if self.algorithm() != "sha256" {
            return Err(BerthError::validation(format!(
                "Unsupported digest algorithm: {}",
                self.algorithm()
            )));
        }

        let computed = format!("{:x}", Sha256::digest(content));
        if computed != self.hex() {
            return Err(BerthError::validation(format!(
                "Blob digest mismatch: expected {}, computed sha256:{}",
                self, computed
            )));
        }
        Ok(())
    }
}
