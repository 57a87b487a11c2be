//! Hash_df derivation function (component 4.3, SP 800-90A §10.3.1).
//!
//! Produces `outl` bytes from the concatenation of records in an
//! accumulator, via counter-prefixed, length-labeled iterated hashing.

use crate::accumulator::Accumulator;
use crate::engine::HashEngine;
use zeroize::Zeroize;

/// Run Hash_df, writing exactly `outl` bytes derived from `input`.
///
/// `input`'s records are replayed once per counter value (`reset`/`next`);
/// the one-byte counter and four-byte bit-length `L` are fed directly ahead
/// of each replay rather than materialized as accumulator records, since
/// they change every iteration (see DESIGN.md / SPEC_FULL.md §9).
///
/// Returns `None` on a hash-primitive failure, per §4.3's "on any
/// hash-primitive failure ... return without writing further output bytes".
pub fn hash_df(engine: &mut dyn HashEngine, input: &mut Accumulator, outl: usize) -> Option<Vec<u8>> {
    let mut output = Vec::with_capacity(outl);
    if outl == 0 {
        return Some(output);
    }

    let l = ((outl as u32) * 8).to_be_bytes();
    let outlen = engine.output_size();
    let mut block = vec![0u8; outlen];
    let mut ctr: u8 = 1;

    while output.len() < outl {
        if !engine.reset() {
            block.zeroize();
            return None;
        }
        if !engine.update(&[ctr]) || !engine.update(&l) {
            block.zeroize();
            return None;
        }
        input.reset();
        while let Some(record) = input.next() {
            if !engine.update(record) {
                block.zeroize();
                return None;
            }
        }
        let Some(written) = engine.finalize_into(&mut block) else {
            block.zeroize();
            return None;
        };
        let take = written.min(outl - output.len());
        output.extend_from_slice(&block[..take]);
        ctr = ctr.wrapping_add(1);
    }

    block.zeroize();
    Some(output)
}
