//! Self-test harness (component 4.6).
//!
//! Drives Instantiate→(optional Reseed)→Generate against each of a
//! descriptor's four strength slots and byte-compares against the embedded
//! expected output. A mismatch on any populated slot permanently demotes
//! the descriptor (§5's monotonic `AtomicBool`); empty sentinel slots are
//! skipped entirely.

use crate::descriptor::Descriptor;
use crate::state::DrbgInstance;

/// Run the full self-test regimen for `descriptor`, updating its
/// self-test-passed flag, and return the resulting pass/fail outcome.
pub fn run_self_test(descriptor: &'static Descriptor) -> bool {
    let mut all_passed = true;

    for vector in descriptor.vectors.iter() {
        if vector.is_empty() {
            continue;
        }

        let engine = descriptor.algorithm.new_engine();
        let mut instance = DrbgInstance::instantiate_with(
            descriptor,
            vector.strength,
            engine,
            vector.entropy_in,
            vector.nonce,
            vector.personalization,
        );

        if !vector.reseed_entropy.is_empty() {
            instance.reseed(vector.reseed_entropy, vector.reseed_additional);
        }

        let mut actual = vec![0u8; vector.expected_output.len()];
        instance.generate(&mut actual, vector.gen_additional);
        instance.uninstantiate();

        if actual != vector.expected_output {
            all_passed = false;
        }
    }

    descriptor.set_self_test_passed(all_passed);
    all_passed
}
