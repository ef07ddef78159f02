//! Exact and approximate set-membership structures based on bucketed cuckoo hashing.
//!
//! Two addressing policies are provided: the plain cuckoo scheme (power-of-two bucket array,
//! XOR-multiply alternate index) and the vacuum scheme (segmented alternate ranges that bound the
//! maximum bucket load more tightly). Each policy backs both an approximate filter storing bare
//! fingerprints and an exact staging hashtable storing full keys. The hashtable acts as a
//! convergence oracle: it perturbs per-bucket hash seeds until no key of the query set collides
//! with a stored fingerprint, then exports its layout into a filter with zero false positives
//! against that query set.

mod addressing;
mod filter;
mod hashtable;
mod key_table;
mod pair;
mod tag_table;

/// Number of slots per bucket for every table variant.
pub const SLOTS_PER_BUCKET: usize = 4;

const MAX_EVICTION_STEPS: usize = 500;
const MAX_BFS_PATH_LEN: usize = 5;
const BATCH_SIZE: usize = 128;
const DEFAULT_FINGERPRINT_BIT_COUNT: usize = 12;
const MAX_REHASH_ROUNDS: usize = 128;

pub use self::addressing::{AddressingScheme, SegmentedAddressing, UniformAddressing};
pub use self::filter::{CuckooFilter, Filter, FilterError, VacuumFilter};
pub use self::hashtable::{CuckooHashtable, Hashtable, TableError, VacuumHashtable};
pub use self::pair::{CuckooPair, FilterPair, PairError, VacuumPair};
