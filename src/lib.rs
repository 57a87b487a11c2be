//! A Rust implementation of the NIST SP 800-90A Hash_DRBG.
//!
//! Provides a deterministic random bit generator built on an approved
//! cryptographic hash function (SHA-1, SHA-224, SHA-256, SHA-384, or
//! SHA-512), realizing the four lifecycle operations Instantiate, Reseed,
//! Generate, and Uninstantiate against a per-instance state of `(V, C,
//! reseed_counter)`, plus the Hash_df derivation function and a power-up /
//! scheduled known-answer self-test regimen that gates FIPS-approved
//! operation per hash.
//!
//! # Features
//! - Five supported hash variants, each with its own `seedlen`/`outlen` and
//!   set of admissible security strengths.
//! - Errors modeled as state, not exceptions: every lifecycle call returns
//!   the instance's resulting [`DrbgStatus`] rather than panicking.
//! - Self-test demotion: a descriptor whose known-answer vector fails is
//!   marked non-FIPS-approved for the remainder of the process.
//! - Secure memory zeroization of `V`, `C`, and working state at every
//!   operation and lifecycle boundary.
//!
//! # Example
//! ```
//! use hash_drbg::{generate, instantiate, AlgorithmId, DrbgStatus};
//!
//! fn main() {
//!     let entropy_in = hex_literal::hex!(
//!         "d9 56 ca a2 40 39 e7 6f 58 61 6e 09 69 af a2 d7 b7 08 74 01 ee 2d 87 77"
//!     );
//!     let nonce = hex_literal::hex!("32 a2 ef 15 98 3e 3c 1f 66 e6 03 2a");
//!     let additional_input = hex_literal::hex!(
//!         "7b a5 a5 22 58 0b 41 e1 a4 f5 40 f9 fe 3d aa f9 5d f7 72 74 0a 19 96 51"
//!     );
//!
//!     let mut drbg = instantiate(AlgorithmId::Sha256, 112, &entropy_in, &nonce, &[])
//!         .expect("inputs are within bounds");
//!
//!     let mut output = [0u8; 32];
//!     let status = generate(&mut drbg, &mut output, &additional_input);
//!     assert_eq!(status, DrbgStatus::Ready);
//! }
//! ```

pub mod accumulator;
pub mod arith;
pub mod descriptor;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod hashdf;
pub mod selftest;
pub mod state;

pub use descriptor::{descriptor_for, Descriptor, Limits, SelfTestVector};
pub use dispatch::{generate, instantiate, is_fips_approved, reseed, uninstantiate};
pub use engine::AlgorithmId;
pub use errors::DrbgError;
pub use state::{DrbgInstance, DrbgStatus, LifecycleState};
