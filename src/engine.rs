//! Hash engine collaborator (component 4.8, ambient to the core budget).
//!
//! Stands in for the distilled spec's abstract `HashNew`/`HashInit`/
//! `HashUpdate`/`HashFinal`/`HashReset`/`HashFree` contract: each operation
//! below reports success with a `bool`/`Option`, mirroring the C-shaped
//! contract, even though the bundled [`DigestEngine`] adapter (backed by
//! RustCrypto's `digest` crate) can never actually fail.

use digest::Digest;

/// Object-safe hash primitive used by the DRBG core.
///
/// `HashFree` has no explicit method — it is realized by `Drop`, which every
/// implementor gets for free.
pub trait HashEngine: Send {
    /// Discard any buffered input and start a fresh digest.
    fn reset(&mut self) -> bool;
    /// Absorb more input into the digest.
    fn update(&mut self, data: &[u8]) -> bool;
    /// Finalize the digest into `out` (truncated to `out.len()` if shorter
    /// than the digest's native output), then reset for reuse. Returns the
    /// number of bytes written, or `None` on failure.
    fn finalize_into(&mut self, out: &mut [u8]) -> Option<usize>;
    /// Native output length of the underlying hash, in bytes.
    fn output_size(&self) -> usize;
}

/// Adapts any RustCrypto [`Digest`] implementation to [`HashEngine`].
pub struct DigestEngine<D> {
    inner: D,
}

impl<D: Digest + Clone> DigestEngine<D> {
    pub fn new() -> Self {
        Self { inner: D::new() }
    }
}

impl<D: Digest + Clone + Send> HashEngine for DigestEngine<D> {
    fn reset(&mut self) -> bool {
        self.inner = D::new();
        true
    }

    fn update(&mut self, data: &[u8]) -> bool {
        Digest::update(&mut self.inner, data);
        true
    }

    fn finalize_into(&mut self, out: &mut [u8]) -> Option<usize> {
        let finished = std::mem::replace(&mut self.inner, D::new());
        let digest = finished.finalize();
        let n = digest.len().min(out.len());
        out[..n].copy_from_slice(&digest[..n]);
        Some(n)
    }

    fn output_size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Identifies one of the five hash variants this core supports (§4.5).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AlgorithmId {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl AlgorithmId {
    /// Construct a fresh hash engine for this algorithm.
    pub fn new_engine(self) -> Box<dyn HashEngine> {
        match self {
            AlgorithmId::Sha1 => Box::new(DigestEngine::<sha1::Sha1>::new()),
            AlgorithmId::Sha224 => Box::new(DigestEngine::<sha2::Sha224>::new()),
            AlgorithmId::Sha256 => Box::new(DigestEngine::<sha2::Sha256>::new()),
            AlgorithmId::Sha384 => Box::new(DigestEngine::<sha2::Sha384>::new()),
            AlgorithmId::Sha512 => Box::new(DigestEngine::<sha2::Sha512>::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmId::Sha1 => "SHA-1",
            AlgorithmId::Sha224 => "SHA-224",
            AlgorithmId::Sha256 => "SHA-256",
            AlgorithmId::Sha384 => "SHA-384",
            AlgorithmId::Sha512 => "SHA-512",
        }
    }
}
