//! DRBG instance and state machine (component 4.4, data model §3).

use crate::accumulator::Accumulator;
use crate::arith::add_assign_mod;
use crate::descriptor::Descriptor;
use crate::engine::HashEngine;
use zeroize::Zeroize;

/// Lifecycle state of a [`DrbgInstance`] (§3).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
    Error,
    Terminated,
}

/// Status returned by every lifecycle operation (§6, §7).
///
/// Errors are state, not exceptions: every call site gets back the
/// instance's post-call condition instead of a `Result`/panic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DrbgStatus {
    Ready,
    Error,
    Terminated,
    InputError,
    ReseedRequired,
}

/// A DRBG instance, owned by the caller and mutated only through
/// [`DrbgInstance::reseed`], [`DrbgInstance::generate`], and
/// [`DrbgInstance::uninstantiate`].
pub struct DrbgInstance {
    v: Vec<u8>,
    c: Vec<u8>,
    reseed_counter: u32,
    error_reason: Option<String>,
    state: LifecycleState,
    engine: Option<Box<dyn HashEngine>>,
    t: Vec<u8>,
    descriptor: &'static Descriptor,
    strength: u32,
}

impl DrbgInstance {
    /// Instantiate (§4.4 "Instantiate"). Preconditions (strength supported,
    /// input lengths within bounds) are the caller's responsibility here —
    /// `crate::dispatch` enforces them before calling this.
    pub(crate) fn instantiate_with(
        descriptor: &'static Descriptor,
        strength: u32,
        mut engine: Box<dyn HashEngine>,
        entropy_in: &[u8],
        nonce: &[u8],
        personalization: &[u8],
    ) -> Self {
        let seedlen = descriptor.seedlen;
        let mut v = vec![0u8; seedlen];

        // Step 2-3: V <- Hash_df(entropy_in || nonce || personalization, seedlen)
        let mut s = Accumulator::new();
        s.append(entropy_in);
        s.append(nonce);
        s.append(personalization);
        match crate::hashdf::hash_df(engine.as_mut(), &mut s, seedlen) {
            Some(derived) => v.copy_from_slice(&derived),
            None => {
                return Self::poisoned(
                    descriptor,
                    strength,
                    engine,
                    "hash primitive failed during Instantiate step V <- Hash_df(S, seedlen)",
                );
            }
        }

        // Step 4-5: C <- Hash_df(0x00 || V, seedlen)
        let mut c = vec![0u8; seedlen];
        let mut s2 = Accumulator::new();
        s2.append(&[0x00u8][..]);
        s2.append(v.as_slice());
        match crate::hashdf::hash_df(engine.as_mut(), &mut s2, seedlen) {
            Some(derived) => c.copy_from_slice(&derived),
            None => {
                v.zeroize();
                return Self::poisoned(
                    descriptor,
                    strength,
                    engine,
                    "hash primitive failed during Instantiate step C <- Hash_df(0x00 || V, seedlen)",
                );
            }
        }

        Self {
            v,
            c,
            reseed_counter: 1,
            error_reason: None,
            state: LifecycleState::Ready,
            engine: Some(engine),
            t: vec![0u8; seedlen],
            descriptor,
            strength,
        }
    }

    fn poisoned(
        descriptor: &'static Descriptor,
        strength: u32,
        engine: Box<dyn HashEngine>,
        reason: &str,
    ) -> Self {
        let seedlen = descriptor.seedlen;
        Self {
            v: vec![0u8; seedlen],
            c: vec![0u8; seedlen],
            reseed_counter: 0,
            error_reason: Some(reason.to_string()),
            state: LifecycleState::Error,
            engine: Some(engine),
            t: vec![0u8; seedlen],
            descriptor,
            strength,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn strength(&self) -> u32 {
        self.strength
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    pub fn reseed_counter(&self) -> u32 {
        self.reseed_counter
    }

    /// Diagnostic text set when `state() == LifecycleState::Error` (§6).
    pub fn error_reason(&self) -> Option<&str> {
        self.error_reason.as_deref()
    }

    /// Force `reseed_counter` to an arbitrary value, for exercising the
    /// boundary-exhaustion ceiling (I2, P10) without looping millions of
    /// real Generate calls in a test.
    #[cfg(test)]
    pub(crate) fn force_reseed_counter(&mut self, value: u32) {
        self.reseed_counter = value;
    }

    fn fail(&mut self, reason: &str) -> DrbgStatus {
        self.state = LifecycleState::Error;
        self.error_reason = Some(reason.to_string());
        self.v.zeroize();
        self.c.zeroize();
        self.t.zeroize();
        DrbgStatus::Error
    }

    /// Reseed (§4.4 "Reseed"). Preconditions (state, input lengths) are
    /// enforced by `crate::dispatch` before this is called.
    pub(crate) fn reseed(&mut self, entropy_in: &[u8], additional_input: &[u8]) -> DrbgStatus {
        if self.state != LifecycleState::Ready {
            return DrbgStatus::InputError;
        }
        let Some(engine) = self.engine.as_mut() else {
            return self.fail("hash engine unavailable during Reseed");
        };

        // Step 1-2: C <- Hash_df(0x01 || V || entropy_in || additional_input, seedlen)
        let mut s = Accumulator::new();
        s.append(&[0x01u8][..]);
        s.append(self.v.as_slice());
        s.append(entropy_in);
        s.append(additional_input);
        let derived_v = match crate::hashdf::hash_df(engine.as_mut(), &mut s, self.descriptor.seedlen) {
            Some(v) => v,
            None => return self.fail("hash primitive failed during Reseed step C <- Hash_df(S, seedlen)"),
        };
        self.c.copy_from_slice(&derived_v);

        // Step 3: V <- C
        self.v.copy_from_slice(&self.c);

        // Step 4-5: C <- Hash_df(0x00 || V, seedlen)
        let mut s2 = Accumulator::new();
        s2.append(&[0x00u8][..]);
        s2.append(self.v.as_slice());
        let derived_c = match crate::hashdf::hash_df(engine.as_mut(), &mut s2, self.descriptor.seedlen) {
            Some(c) => c,
            None => {
                return self.fail("hash primitive failed during Reseed step C <- Hash_df(0x00 || V, seedlen)")
            }
        };
        self.c.copy_from_slice(&derived_c);

        self.reseed_counter = 1;
        DrbgStatus::Ready
    }

    /// Generate (§4.4 "Generate"). Preconditions (state, `blen`,
    /// `reseed_counter` ceiling, additional input length) are enforced by
    /// `crate::dispatch` before this is called — boundary exhaustion
    /// (`RESEED_REQUIRED`) is checked there since it does not mutate state.
    pub(crate) fn generate(&mut self, out: &mut [u8], additional_input: &[u8]) -> DrbgStatus {
        if self.state != LifecycleState::Ready {
            return DrbgStatus::InputError;
        }
        let seedlen = self.descriptor.seedlen;
        let outlen = self.descriptor.outlen;
        let Some(engine) = self.engine.as_mut() else {
            return self.fail("hash engine unavailable during Generate");
        };

        // Step 1: if additional_input non-empty, V <- V + Hash(0x02 || V || additional_input)
        if !additional_input.is_empty() {
            if !engine.reset() {
                return self.fail("hash primitive failed resetting before Generate additional-input mix");
            }
            let ok = engine.update(&[0x02u8]) && engine.update(&self.v) && engine.update(additional_input);
            if !ok {
                return self.fail("hash primitive failed absorbing Generate additional input");
            }
            let mut w = vec![0u8; outlen];
            match engine.finalize_into(&mut w) {
                Some(_) => {
                    add_assign_mod(&mut self.v, &w);
                    w.zeroize();
                }
                None => {
                    w.zeroize();
                    return self.fail("hash primitive failed finalizing Generate additional-input mix");
                }
            }
        }

        // Step 2: T <- V
        self.t.copy_from_slice(&self.v);

        // Step 3: emit blocks of Hash(T), T <- T + 1, until out is full.
        let mut emitted = 0usize;
        let mut block = vec![0u8; outlen];
        while emitted < out.len() {
            if !engine.reset() {
                block.zeroize();
                return self.fail("hash primitive failed resetting during Generate output loop");
            }
            if !engine.update(&self.t) {
                block.zeroize();
                return self.fail("hash primitive failed absorbing T during Generate output loop");
            }
            match engine.finalize_into(&mut block) {
                Some(written) => {
                    let take = written.min(out.len() - emitted);
                    out[emitted..emitted + take].copy_from_slice(&block[..take]);
                    emitted += take;
                }
                None => {
                    block.zeroize();
                    return self.fail("hash primitive failed finalizing Generate output block");
                }
            }
            add_assign_mod(&mut self.t, &[0x01u8]);
        }
        block.zeroize();

        // Step 4-5: V <- V + Hash(0x03 || V)
        if !engine.reset() {
            return self.fail("hash primitive failed resetting before Generate state-update hash");
        }
        let ok = engine.update(&[0x03u8]) && engine.update(&self.v);
        if !ok {
            return self.fail("hash primitive failed absorbing Generate state-update hash");
        }
        let mut h = vec![0u8; outlen];
        match engine.finalize_into(&mut h) {
            Some(_) => {
                add_assign_mod(&mut self.v, &h);
                h.zeroize();
            }
            None => {
                h.zeroize();
                return self.fail("hash primitive failed finalizing Generate state-update hash");
            }
        }

        // Step 6: V <- V + C
        let c = self.c.clone();
        add_assign_mod(&mut self.v, &c);

        // Step 7: V <- V + reseed_counter (4-byte big-endian, right-aligned)
        let ctr_bytes = self.reseed_counter.to_be_bytes();
        add_assign_mod(&mut self.v, &ctr_bytes);

        // Step 8: reseed_counter += 1
        self.reseed_counter = self.reseed_counter.wrapping_add(1);

        // Step 9: wipe T (already holds V + (emitted/outlen) increments; not
        // secret beyond this call, but wipe per §4.4/I5 regardless).
        self.t.zeroize();
        debug_assert_eq!(self.v.len(), seedlen);

        DrbgStatus::Ready
    }

    /// Uninstantiate (§4.4 "Uninstantiate"). Idempotent on an already
    /// `Terminated` instance (P7).
    pub fn uninstantiate(&mut self) -> DrbgStatus {
        if self.state == LifecycleState::Terminated {
            return DrbgStatus::Terminated;
        }
        self.v.zeroize();
        self.c.zeroize();
        self.t.zeroize();
        self.engine = None;
        self.state = LifecycleState::Terminated;
        DrbgStatus::Terminated
    }
}

impl Drop for DrbgInstance {
    fn drop(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.t.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::descriptor_for;
    use crate::engine::{fault_injection::FaultyEngine, AlgorithmId};

    fn fresh_sha256() -> DrbgInstance {
        let descriptor = descriptor_for(AlgorithmId::Sha256);
        DrbgInstance::instantiate_with(
            descriptor,
            112,
            AlgorithmId::Sha256.new_engine(),
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        )
    }

    // P2: |V| = |C| = seedlen after Instantiate, Reseed, and Generate.
    #[test]
    fn seedlen_invariant_holds_through_lifecycle() {
        let mut instance = fresh_sha256();
        assert_eq!(instance.v.len(), 55);
        assert_eq!(instance.c.len(), 55);

        assert_eq!(instance.reseed(b"more-entropy", b""), DrbgStatus::Ready);
        assert_eq!(instance.v.len(), 55);
        assert_eq!(instance.c.len(), 55);

        let mut out = [0u8; 32];
        assert_eq!(instance.generate(&mut out, b""), DrbgStatus::Ready);
        assert_eq!(instance.v.len(), 55);
        assert_eq!(instance.c.len(), 55);
    }

    // P8: Reseed immediately after Instantiate with empty entropy/additional
    // input is a deterministic function of the initial (V, C).
    #[test]
    fn reseed_with_empty_inputs_is_deterministic() {
        let mut a = fresh_sha256();
        let mut b = fresh_sha256();
        assert_eq!(a.reseed(b"", b""), DrbgStatus::Ready);
        assert_eq!(b.reseed(b"", b""), DrbgStatus::Ready);
        assert_eq!(a.v, b.v);
        assert_eq!(a.c, b.c);
    }

    // P3: repeating Generate from a cloned state yields identical bytes.
    #[test]
    fn generate_is_deterministic_given_same_entry_state() {
        let mut a = fresh_sha256();
        let mut b = fresh_sha256();
        let mut out_a = [0u8; 40];
        let mut out_b = [0u8; 40];
        assert_eq!(a.generate(&mut out_a, b"ctx"), DrbgStatus::Ready);
        assert_eq!(b.generate(&mut out_b, b"ctx"), DrbgStatus::Ready);
        assert_eq!(out_a, out_b);
    }

    // P6: Uninstantiate zeroizes V, C, T.
    #[test]
    fn uninstantiate_zeroizes_state() {
        let mut instance = fresh_sha256();
        assert_eq!(instance.uninstantiate(), DrbgStatus::Terminated);
        assert!(instance.v.iter().all(|&b| b == 0));
        assert!(instance.c.iter().all(|&b| b == 0));
        assert!(instance.t.iter().all(|&b| b == 0));
    }

    // P7: Uninstantiate is idempotent on an already-Terminated instance.
    #[test]
    fn uninstantiate_is_idempotent() {
        let mut instance = fresh_sha256();
        assert_eq!(instance.uninstantiate(), DrbgStatus::Terminated);
        assert_eq!(instance.uninstantiate(), DrbgStatus::Terminated);
        assert_eq!(instance.state(), LifecycleState::Terminated);
    }

    // P11: a primitive-hash failure injected mid-Generate leaves the
    // instance in Error and does not report Ready.
    #[test]
    fn faulty_engine_failure_mid_generate_poisons_instance() {
        let descriptor = descriptor_for(AlgorithmId::Sha256);
        // Succeed through Instantiate (2 Hash_df rounds, 1 block each = 2
        // engine finalize cycles plus resets/updates), then fail inside
        // Generate's output loop.
        let engine = FaultyEngine::new(AlgorithmId::Sha256.new_engine(), 64);
        let mut instance = DrbgInstance::instantiate_with(
            descriptor,
            112,
            Box::new(engine),
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        );
        assert_eq!(instance.state(), LifecycleState::Ready);

        let mut out = [0u8; 64];
        let status = instance.generate(&mut out, b"");
        assert_eq!(status, DrbgStatus::Error);
        assert_eq!(instance.state(), LifecycleState::Error);
        assert!(instance.error_reason().is_some());
    }

    #[test]
    fn instantiate_failure_poisons_instance_without_panicking() {
        let descriptor = descriptor_for(AlgorithmId::Sha256);
        // calls_until_failure = 0 fails on the very first engine call.
        let engine = FaultyEngine::new(AlgorithmId::Sha256.new_engine(), 0);
        let instance = DrbgInstance::instantiate_with(
            descriptor,
            112,
            Box::new(engine),
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        );
        assert_eq!(instance.state(), LifecycleState::Error);
        assert!(instance.error_reason().is_some());
    }
}
