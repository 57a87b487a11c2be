//! Outer lifecycle / dispatch (component 4.7).
//!
//! Validates caller inputs against descriptor boundaries before entering
//! the state machine in [`crate::state`], drives the self-test harness on
//! schedule, and exposes the four operations named in §6.

use crate::descriptor::{descriptor_for, Descriptor};
use crate::engine::AlgorithmId;
use crate::errors::DrbgError;
use crate::selftest::run_self_test;
use crate::state::{DrbgInstance, DrbgStatus};
use std::sync::atomic::{AtomicU32, Ordering};

/// Per-descriptor count of Instantiate calls since the last self-test
/// (§4.7's "health-check counter"). Keyed by [`AlgorithmId`] since the
/// counter must outlive any one descriptor reference and is not itself part
/// of the (mostly-`const`) [`Descriptor`] table.
struct HealthCounters {
    sha1: AtomicU32,
    sha224: AtomicU32,
    sha256: AtomicU32,
    sha384: AtomicU32,
    sha512: AtomicU32,
}

static HEALTH_COUNTERS: HealthCounters = HealthCounters {
    sha1: AtomicU32::new(0),
    sha224: AtomicU32::new(0),
    sha256: AtomicU32::new(0),
    sha384: AtomicU32::new(0),
    sha512: AtomicU32::new(0),
};

fn health_counter(algorithm: AlgorithmId) -> &'static AtomicU32 {
    match algorithm {
        AlgorithmId::Sha1 => &HEALTH_COUNTERS.sha1,
        AlgorithmId::Sha224 => &HEALTH_COUNTERS.sha224,
        AlgorithmId::Sha256 => &HEALTH_COUNTERS.sha256,
        AlgorithmId::Sha384 => &HEALTH_COUNTERS.sha384,
        AlgorithmId::Sha512 => &HEALTH_COUNTERS.sha512,
    }
}

/// Run the self-test if this call lands on the descriptor's interval
/// boundary (including the very first call, realizing "at power-up").
fn maybe_run_self_test(descriptor: &'static Descriptor) {
    let counter = health_counter(descriptor.algorithm);
    let previous = counter.fetch_add(1, Ordering::SeqCst);
    if previous % descriptor.self_test_interval == 0 {
        run_self_test(descriptor);
    }
}

fn check_len(actual: usize, max: usize, field: &'static str) -> Result<(), DrbgStatus> {
    if actual > max {
        return Err(DrbgStatus::InputError);
    }
    let _ = field;
    Ok(())
}

fn check_construction_len(
    actual: usize,
    max: usize,
    field: &'static str,
) -> Result<(), DrbgError> {
    if actual > max {
        return Err(DrbgError::InputTooLarge { field, max });
    }
    Ok(())
}

/// Instantiate (§6). Runs the scheduled self-test before validating inputs,
/// so a freshly-demoted descriptor is reflected in this call's outcome.
///
/// Returns `Err(DrbgError)` without constructing an instance when a
/// precondition is violated (§4.7, §7 "precondition violation"), following
/// the teacher's convention of a dedicated error enum for fallible
/// construction. Otherwise returns `Ok(instance)`; `instance.state()`
/// distinguishes a successful instantiation from one poisoned by a
/// primitive hash failure.
pub fn instantiate(
    algorithm: AlgorithmId,
    strength: u32,
    entropy_in: &[u8],
    nonce: &[u8],
    personalization: &[u8],
) -> Result<DrbgInstance, DrbgError> {
    let descriptor = descriptor_for(algorithm);
    maybe_run_self_test(descriptor);

    if !descriptor.supports_strength(strength) {
        return Err(DrbgError::UnsupportedStrength(strength));
    }
    check_construction_len(entropy_in.len(), descriptor.limits.max_entropy_input, "entropy_in")?;
    check_construction_len(nonce.len(), descriptor.limits.max_nonce, "nonce")?;
    check_construction_len(
        personalization.len(),
        descriptor.limits.max_personalization,
        "personalization",
    )?;

    let engine = algorithm.new_engine();
    Ok(DrbgInstance::instantiate_with(
        descriptor,
        strength,
        engine,
        entropy_in,
        nonce,
        personalization,
    ))
}

/// Reseed (§6). Validates lengths and lifecycle state before mutating
/// `instance`.
pub fn reseed(instance: &mut DrbgInstance, entropy_in: &[u8], additional_input: &[u8]) -> DrbgStatus {
    let descriptor = instance.descriptor();
    if check_len(entropy_in.len(), descriptor.limits.max_entropy_input, "entropy_in").is_err()
        || check_len(
            additional_input.len(),
            descriptor.limits.max_additional_input,
            "additional_input",
        )
        .is_err()
    {
        return DrbgStatus::InputError;
    }
    instance.reseed(entropy_in, additional_input)
}

/// Generate (§6). Enforces `blen`, additional-input length, and the
/// `reseed_counter` ceiling (I2, P9, P10) before mutating `instance`.
pub fn generate(instance: &mut DrbgInstance, out: &mut [u8], additional_input: &[u8]) -> DrbgStatus {
    let descriptor = instance.descriptor();

    if out.len() > descriptor.limits.max_bytes_per_request {
        return DrbgStatus::InputError;
    }
    if check_len(
        additional_input.len(),
        descriptor.limits.max_additional_input,
        "additional_input",
    )
    .is_err()
    {
        return DrbgStatus::InputError;
    }
    if instance.reseed_counter() > descriptor.limits.max_calls_between_reseeds {
        return DrbgStatus::ReseedRequired;
    }

    instance.generate(out, additional_input)
}

/// Uninstantiate (§6).
pub fn uninstantiate(instance: &mut DrbgInstance) -> DrbgStatus {
    instance.uninstantiate()
}

/// Whether a FIPS-gated caller may instantiate against this algorithm right
/// now: `descriptor.fips_capable` AND the last self-test run passed (§4.7).
pub fn is_fips_approved(algorithm: AlgorithmId) -> bool {
    descriptor_for(algorithm).is_fips_approved()
}

#[cfg(test)]
mod tests {
    use super::*;

    // P9: Generate at exactly max_bytes_per_request succeeds; max+1 is
    // rejected without mutating state.
    #[test]
    fn generate_boundary_exactly_at_max_succeeds_one_past_rejected() {
        let mut instance = instantiate(
            AlgorithmId::Sha256,
            112,
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        )
        .expect("instantiate succeeds");

        let max = instance.descriptor().limits.max_bytes_per_request;
        let mut at_max = vec![0u8; max];
        assert_eq!(generate(&mut instance, &mut at_max, b""), DrbgStatus::Ready);

        let counter_before = instance.reseed_counter();
        let mut over_max = vec![0u8; max + 1];
        assert_eq!(generate(&mut instance, &mut over_max, b""), DrbgStatus::InputError);
        assert_eq!(instance.reseed_counter(), counter_before);
    }

    #[test]
    fn instantiate_rejects_unsupported_strength() {
        let result = instantiate(
            AlgorithmId::Sha1,
            256, // SHA-1 only supports 112/128
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        );
        assert_eq!(result, Err(DrbgError::UnsupportedStrength(256)));
    }

    #[test]
    fn instantiate_rejects_oversized_inputs_without_mutating() {
        let descriptor = descriptor_for(AlgorithmId::Sha256);
        let too_much = vec![0u8; descriptor.limits.max_nonce + 1];
        let result = instantiate(AlgorithmId::Sha256, 112, b"entropy", &too_much, b"");
        assert_eq!(
            result,
            Err(DrbgError::InputTooLarge {
                field: "nonce",
                max: descriptor.limits.max_nonce
            })
        );
    }

    // P10: after max_calls_between_reseeds Generates, the next Generate
    // returns RESEED_REQUIRED without emitting bytes, and a Reseed clears it.
    #[test]
    fn reseed_counter_ceiling_triggers_reseed_required() {
        let mut instance = instantiate(
            AlgorithmId::Sha256,
            112,
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        )
        .expect("instantiate succeeds");

        // Force the counter past the ceiling directly rather than looping
        // millions of real Generate calls.
        let ceiling = instance.descriptor().limits.max_calls_between_reseeds;
        instance.force_reseed_counter(ceiling + 1);

        let mut out = [0u8; 1];
        assert_eq!(generate(&mut instance, &mut out, b""), DrbgStatus::ReseedRequired);
        assert_eq!(out, [0u8]);

        assert_eq!(reseed(&mut instance, b"fresh-entropy", b""), DrbgStatus::Ready);
        assert_eq!(generate(&mut instance, &mut out, b""), DrbgStatus::Ready);
    }

    #[test]
    fn fips_gate_reflects_descriptor_capability() {
        assert!(is_fips_approved(AlgorithmId::Sha256));
        assert!(!is_fips_approved(AlgorithmId::Sha1));
    }

    #[test]
    fn uninstantiate_transitions_to_terminated() {
        let mut instance = instantiate(
            AlgorithmId::Sha256,
            112,
            b"entropy-entropy-entropy-entropy",
            b"nonce-nonce",
            b"",
        )
        .expect("instantiate succeeds");
        assert_eq!(uninstantiate(&mut instance), DrbgStatus::Terminated);
    }
}
