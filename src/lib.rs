#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A map keyed by byte spans, built on the linear-probing `HashTable`.
///
/// This module provides `ByteMap`, which hashes each key's bytes with the
/// shift-add hash and compares keys by length and content.
pub mod byte_map;

/// Error types for allocation failures and invalid load policies.
pub mod error;

/// The 32-bit shift-add byte hash, plus a `Hasher`/`BuildHasher` pair for
/// use with other containers.
pub mod hash;

pub mod hash_table;

/// Load thresholds controlling when a table grows and shrinks.
pub mod policy;

cfg_if::cfg_if! {
    if #[cfg(any(test, feature = "stats"))] {
        /// Probe-length and memory statistics, for tuning and debugging.
        ///
        /// Compiled with `cfg(test)` or the `stats` feature.
        pub mod stats;

        pub use stats::DebugStats;
        pub use stats::ProbeHistogram;
    }
}

pub use byte_map::ByteMap;
pub use error::PolicyError;
pub use error::TryReserveError;
pub use hash::hash_bytes;
pub use hash_table::HashTable;
pub use policy::LoadPolicy;
