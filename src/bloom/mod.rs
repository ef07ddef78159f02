//! Bloom filter and the alternating cascade built from two disjoint key sets.

mod bloom_filter;
mod cascade;

pub use self::bloom_filter::BloomFilter;
pub use self::cascade::{BloomCascade, CascadeError};

/// False positive probability of each cascade level.
const CASCADE_LEVEL_FPP: f64 = 0.001;
