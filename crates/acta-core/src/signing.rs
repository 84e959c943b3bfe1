//! The `Signer` trait — the seam to the external digital-signature service.
//!
//! The service signs SHA-256 digests and verifies signatures against its
//! public key; no algorithmic detail leaks into this crate. The trait is
//! object-safe so the transport layer can hold an `Arc<dyn Signer>`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
  #[error("signing service unavailable: {0}")]
  Unavailable(String),

  #[error("malformed signature")]
  Malformed,
}

/// An external signer. `digest` is always a SHA-256 hash of the content
/// being signed, never the content itself.
pub trait Signer: Send + Sync {
  fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, SigningError>;

  fn verify(
    &self,
    digest: &[u8],
    signature: &[u8],
  ) -> Result<bool, SigningError>;

  fn public_key(&self) -> Result<Vec<u8>, SigningError>;
}

/// Placeholder used until a real signer is configured; every call reports
/// the service as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSigner;

impl Signer for DisabledSigner {
  fn sign(&self, _digest: &[u8]) -> Result<Vec<u8>, SigningError> {
    Err(SigningError::Unavailable("no signer configured".into()))
  }

  fn verify(
    &self,
    _digest: &[u8],
    _signature: &[u8],
  ) -> Result<bool, SigningError> {
    Err(SigningError::Unavailable("no signer configured".into()))
  }

  fn public_key(&self) -> Result<Vec<u8>, SigningError> {
    Err(SigningError::Unavailable("no signer configured".into()))
  }
}
