#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A HashMap implementation using separate chaining.
///
/// This module provides a `HashMap` that wraps the `ChainTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The separate-chaining table underneath the map and the set.
///
/// `ChainTable` takes a caller-computed hash and an equality predicate for
/// every operation, and owns the capacity rounding and growth policy.
pub mod chain_table;

/// A hash set implementation using separate chaining.
///
/// This module provides a `HashSet` that wraps the `ChainTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

mod error;

pub use chain_table::ChainTable;
pub use chain_table::Growth;
pub use chain_table::LoadFactor;
pub use error::MapError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is named: foldhash's randomly
        /// seeded fast hasher.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is named: the standard library's
        /// randomly seeded SipHash.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder for builds without a default hasher. It cannot be
        /// constructed, so maps and sets must be given a hasher explicitly.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
