//! Byte-string accumulator (component 4.1).
//!
//! An append-and-enumerate queue of labeled byte ranges, fed to a hash in
//! insertion order. Records borrowed from the caller are never copied;
//! records the core synthesizes itself (single status bytes) own their
//! storage since nothing outside the accumulator's lifetime holds them.

use std::borrow::Cow;
use std::collections::VecDeque;

/// Ordered sequence of byte-string records with a rewindable enumeration
/// cursor.
///
/// `append` pushes at the tail, `insert` pushes at the head; `reset`/`next`
/// replay the sequence head-first without consuming it, so the same
/// accumulator can be enumerated multiple times (as [`crate::hashdf::hash_df`]
/// does once per counter value).
#[derive(Default)]
pub struct Accumulator<'a> {
    records: VecDeque<Cow<'a, [u8]>>,
    cursor: usize,
}

impl<'a> Accumulator<'a> {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            cursor: 0,
        }
    }

    /// Push a record at the tail.
    pub fn append(&mut self, bytes: impl Into<Cow<'a, [u8]>>) {
        self.records.push_back(bytes.into());
    }

    /// Push a record at the head.
    pub fn insert(&mut self, bytes: impl Into<Cow<'a, [u8]>>) {
        self.records.push_front(bytes.into());
    }

    /// Rewind the enumeration cursor to the head.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Return the next record in insertion order, advancing the cursor, or
    /// `None` once the tail is reached.
    pub fn next(&mut self) -> Option<&[u8]> {
        let record = self.records.get(self.cursor)?;
        self.cursor += 1;
        Some(record.as_ref())
    }

    /// Total bytes across all records, regardless of cursor position.
    pub fn total(&self) -> usize {
        self.records.iter().map(|r| r.len()).sum()
    }
}
