//! # Certificate Chain Parser
//!
//! Splits the PEM contents of a `tls.crt` field into individual certificate blocks.
//!
//! The parser is purely syntactic: it never decodes the base64 payload and never
//! checks header lines. A block ends at a line that is exactly the certificate
//! footer marker; any content left over after the last footer makes the whole
//! chain invalid.
//!
//! Blocks are ordered as they appear in the input, which by convention is
//! leaf first and top-most issuer last.

use std::fmt;
use thiserror::Error;

/// Footer line that closes a PEM certificate block (matched exactly, case-sensitive)
pub const PEM_CERTIFICATE_FOOTER: &[u8] = b"-----END CERTIFICATE-----";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The chain does not segment into whole PEM certificate blocks,
    /// or segments into none at all
    #[error("failed to parse certificate chain in tls.crt")]
    InvalidChain,
}

/// A single PEM certificate block, kept byte-for-byte as it appeared in the
/// chain (header line, body lines, footer line, each newline terminated)
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Body lines are noise in logs; the header is enough to identify the block
        let first_line = self.0.split(|b| *b == b'\n').next().unwrap_or_default();
        f.debug_struct("Certificate")
            .field("header", &String::from_utf8_lossy(first_line))
            .field("len", &self.0.len())
            .finish()
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Ordered certificate chain: index 0 is the leaf, the last entry is the
/// top-most issuer present in the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    certs: Vec<Certificate>,
}

impl CertificateChain {
    #[must_use]
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }

    /// Last certificate in the chain.
    ///
    /// This is the structurally final block supplied by whoever populated the
    /// chain. It is not checked to be self-signed or a trust root.
    #[must_use]
    pub fn top(&self) -> Option<&Certificate> {
        self.certs.last()
    }

    /// Consume the chain and return its last certificate
    #[must_use]
    pub fn into_top(mut self) -> Option<Certificate> {
        self.certs.pop()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}

/// A line holding nothing but whitespace, Unicode spaces such as
/// U+000B, U+0085 and U+00A0 included
fn is_blank(line: &[u8]) -> bool {
    String::from_utf8_lossy(line).trim().is_empty()
}

/// Parse a PEM certificate chain into its individual blocks.
///
/// Blank lines (after trimming whitespace) are skipped so chains assembled
/// with separators between blocks parse cleanly. Empty input yields an empty
/// chain.
///
/// # Errors
///
/// Returns [`ChainError::InvalidChain`] when content follows the last footer
/// line, e.g. a truncated final block. Certificates parsed before that point
/// are discarded.
pub fn parse_cert_chain(chain: &[u8]) -> Result<CertificateChain, ChainError> {
    let mut certs = Vec::new();
    if chain.is_empty() {
        return Ok(CertificateChain { certs });
    }

    let mut current = Vec::new();
    for line in chain.split(|b| *b == b'\n') {
        if is_blank(line) {
            continue;
        }
        current.extend_from_slice(line);
        current.push(b'\n');
        if line == PEM_CERTIFICATE_FOOTER {
            certs.push(Certificate(std::mem::take(&mut current)));
        }
    }

    if !current.is_empty() {
        return Err(ChainError::InvalidChain);
    }
    Ok(CertificateChain { certs })
}
