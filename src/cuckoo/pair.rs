//! Pairing of an exact hashtable with the filter it converges.
//!
//! The pair is built from two disjoint key sets: the revoked set, whose members are stored, and
//! the unrevoked set, which must never be falsely reported as stored. The hashtable perturbs
//! per-bucket seeds until no unrevoked key collides with a stored fingerprint, then its layout is
//! exported into a compact filter. The resulting filter answers `contains` with no false
//! negatives over the revoked set and no false positives over the unrevoked set.

use crate::cuckoo::addressing::{AddressingScheme, SegmentedAddressing, UniformAddressing};
use crate::cuckoo::filter::Filter;
use crate::cuckoo::hashtable::{Hashtable, TableError};
use crate::cuckoo::{DEFAULT_FINGERPRINT_BIT_COUNT, MAX_REHASH_ROUNDS};
use crate::util::{HashFamily, SipHasherBuilder};
use std::error;
use std::fmt;
use std::hash::Hash;

/// Errors returned when building a filter pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PairError {
    /// Staging the revoked set in the hashtable failed.
    Table(TableError),
    /// Seed perturbation did not eliminate every collision within the round budget.
    ConvergenceFailed {
        /// Number of lookup rounds that ran before giving up.
        rounds: usize,
    },
}

impl fmt::Display for PairError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairError::Table(err) => write!(f, "failed to stage revoked keys: {}", err),
            PairError::ConvergenceFailed { rounds } => {
                write!(f, "fingerprints still collide after {} rehash rounds", rounds)
            }
        }
    }
}

impl error::Error for PairError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            PairError::Table(err) => Some(err),
            PairError::ConvergenceFailed { .. } => None,
        }
    }
}

impl From<TableError> for PairError {
    fn from(err: TableError) -> Self {
        PairError::Table(err)
    }
}

/// An exact hashtable and the fingerprint filter exported from its converged layout.
///
/// # Examples
///
/// ```
/// use revocation_filters::cuckoo::VacuumPair;
///
/// let revoked = (0u64..100).map(|key| key * 2).collect::<Vec<_>>();
/// let unrevoked = (0u64..100).map(|key| key * 2 + 1).collect::<Vec<_>>();
///
/// let pair = VacuumPair::new(revoked.clone(), &unrevoked).unwrap();
///
/// assert!(revoked.iter().all(|key| pair.contains(key)));
/// assert!(unrevoked.iter().all(|key| !pair.contains(key)));
/// ```
#[derive(Clone, Debug)]
pub struct FilterPair<T, A, H = SipHasherBuilder> {
    filter: Filter<T, A, H>,
    table: Hashtable<T, A, H>,
    rehash_rounds: usize,
}

/// A [`FilterPair`] with plain cuckoo addressing.
pub type CuckooPair<T, H = SipHasherBuilder> = FilterPair<T, UniformAddressing, H>;

/// A [`FilterPair`] with vacuum (segmented) addressing.
pub type VacuumPair<T, H = SipHasherBuilder> = FilterPair<T, SegmentedAddressing, H>;

impl<T> FilterPair<T, UniformAddressing>
where
    T: Hash + PartialEq,
{
    /// Builds a `CuckooPair` from the revoked and unrevoked key sets with the default 12-bit
    /// fingerprints.
    pub fn new(revoked: Vec<T>, unrevoked: &[T]) -> Result<Self, PairError> {
        Self::from_parameters(revoked, unrevoked, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Builds a `CuckooPair` with `fingerprint_bit_count`-bit fingerprints.
    pub fn from_parameters(
        revoked: Vec<T>,
        unrevoked: &[T],
        fingerprint_bit_count: usize,
    ) -> Result<Self, PairError> {
        Self::with_hasher(
            revoked,
            unrevoked,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> FilterPair<T, UniformAddressing, H>
where
    T: Hash + PartialEq,
    H: HashFamily + Clone,
{
    /// Builds a `CuckooPair` with a specific hash builder.
    pub fn with_hasher(
        revoked: Vec<T>,
        unrevoked: &[T],
        fingerprint_bit_count: usize,
        hash_builder: H,
    ) -> Result<Self, PairError> {
        let addressing = UniformAddressing::new(sized_for(revoked.len()));
        Self::build(addressing, hash_builder, fingerprint_bit_count, revoked, unrevoked)
    }
}

impl<T> FilterPair<T, SegmentedAddressing>
where
    T: Hash + PartialEq,
{
    /// Builds a `VacuumPair` from the revoked and unrevoked key sets with the default 12-bit
    /// fingerprints.
    pub fn new(revoked: Vec<T>, unrevoked: &[T]) -> Result<Self, PairError> {
        Self::from_parameters(revoked, unrevoked, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Builds a `VacuumPair` with `fingerprint_bit_count`-bit fingerprints.
    pub fn from_parameters(
        revoked: Vec<T>,
        unrevoked: &[T],
        fingerprint_bit_count: usize,
    ) -> Result<Self, PairError> {
        Self::with_hasher(
            revoked,
            unrevoked,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> FilterPair<T, SegmentedAddressing, H>
where
    T: Hash + PartialEq,
    H: HashFamily + Clone,
{
    /// Builds a `VacuumPair` with a specific hash builder.
    pub fn with_hasher(
        revoked: Vec<T>,
        unrevoked: &[T],
        fingerprint_bit_count: usize,
        hash_builder: H,
    ) -> Result<Self, PairError> {
        let addressing = SegmentedAddressing::new(sized_for(revoked.len()));
        Self::build(addressing, hash_builder, fingerprint_bit_count, revoked, unrevoked)
    }
}

// Table capacity for a 95% target load over the revoked set.
fn sized_for(revoked_len: usize) -> usize {
    revoked_len.max(1) * 20 / 19
}

impl<T, A, H> FilterPair<T, A, H>
where
    T: Hash + PartialEq,
    A: AddressingScheme,
    H: HashFamily + Clone,
{
    /// Builds a pair over an explicit addressing scheme.
    pub fn build(
        addressing: A,
        hash_builder: H,
        fingerprint_bit_count: usize,
        revoked: Vec<T>,
        unrevoked: &[T],
    ) -> Result<Self, PairError> {
        let mut table =
            Hashtable::with_parts(addressing, hash_builder.clone(), fingerprint_bit_count);
        for key in revoked {
            table.insert(key)?;
        }

        let mut rehash_rounds = 0;
        loop {
            table.start_lookup();
            let mut collisions = 0;
            for key in unrevoked {
                let (first, second) = table.lookup(key);
                if first.is_some() || second.is_some() {
                    collisions += 1;
                }
            }
            if collisions == 0 {
                break;
            }
            rehash_rounds += 1;
            if rehash_rounds >= MAX_REHASH_ROUNDS {
                return Err(PairError::ConvergenceFailed {
                    rounds: rehash_rounds,
                });
            }
        }

        let mut filter = Filter::from_seed_table(
            table.addressing().clone(),
            hash_builder,
            fingerprint_bit_count,
            table.seeds().to_vec(),
        );
        for (bucket, tags) in table.export_fingerprints().into_iter().enumerate() {
            for (slot, &tag) in tags.iter().enumerate() {
                if tag != 0 {
                    filter.copy_insert(bucket, slot, tag);
                }
            }
        }

        Ok(FilterPair {
            filter,
            table,
            rehash_rounds,
        })
    }

    /// Returns `true` if the filter reports `key` as revoked.
    pub fn contains<U>(&self, key: &U) -> bool
    where
        T: std::borrow::Borrow<U>,
        U: Hash + ?Sized,
    {
        self.filter.contains(key)
    }

    /// Returns the exported filter.
    pub fn filter(&self) -> &Filter<T, A, H> {
        &self.filter
    }

    /// Consumes the pair, returning only the compact filter for distribution.
    pub fn into_filter(self) -> Filter<T, A, H> {
        self.filter
    }

    /// Returns the staging hashtable.
    pub fn table(&self) -> &Hashtable<T, A, H> {
        &self.table
    }

    /// Returns the number of lookup rounds that bumped at least one bucket seed.
    pub fn rehash_rounds(&self) -> usize {
        self.rehash_rounds
    }
}

#[cfg(test)]
mod tests {
    use super::{CuckooPair, PairError, VacuumPair};
    use crate::cuckoo::hashtable::TableError;
    use crate::util::tests::{hash_builder_1, hash_builder_2};

    #[test]
    fn test_vacuum_pair_separates_sets() {
        let revoked = (0u64..500).map(|key| key * 2).collect::<Vec<_>>();
        let unrevoked = (0u64..2000).map(|key| key * 2 + 1).collect::<Vec<_>>();

        let pair =
            VacuumPair::with_hasher(revoked.clone(), &unrevoked, 8, hash_builder_1()).unwrap();

        assert_eq!(pair.table().len(), 500);
        for key in &revoked {
            assert!(pair.contains(key));
            assert!(pair.table().contains(key));
        }
        for key in &unrevoked {
            assert!(!pair.contains(key));
        }
        assert!(pair.rehash_rounds() < 64);
    }

    #[test]
    fn test_cuckoo_pair_separates_sets() {
        let revoked = (0u64..200).map(|key| key * 3).collect::<Vec<_>>();
        let unrevoked = (0u64..1000).map(|key| key * 3 + 1).collect::<Vec<_>>();

        let pair =
            CuckooPair::with_hasher(revoked.clone(), &unrevoked, 8, hash_builder_2()).unwrap();

        for key in &revoked {
            assert!(pair.contains(key));
        }
        for key in &unrevoked {
            assert!(!pair.contains(key));
        }
    }

    #[test]
    fn test_filter_matches_table_layout() {
        let revoked = (0u64..300).collect::<Vec<_>>();
        let unrevoked = (1000u64..2000).collect::<Vec<_>>();

        let pair =
            VacuumPair::with_hasher(revoked, &unrevoked, 12, hash_builder_1()).unwrap();

        assert_eq!(pair.filter().len(), pair.table().len());
        assert_eq!(pair.filter().num_buckets(), pair.table().num_buckets());
    }

    #[test]
    fn test_duplicate_revoked_key() {
        let revoked = vec![1u64, 2, 3, 2];
        let unrevoked = vec![10u64, 11];

        let err =
            VacuumPair::with_hasher(revoked, &unrevoked, 12, hash_builder_1()).unwrap_err();
        assert_eq!(err, PairError::Table(TableError::DuplicateKey));
    }

    #[test]
    fn test_into_filter() {
        let revoked = (0u64..50).collect::<Vec<_>>();
        let unrevoked = (100u64..200).collect::<Vec<_>>();

        let pair =
            CuckooPair::with_hasher(revoked.clone(), &unrevoked, 12, hash_builder_1()).unwrap();
        let filter = pair.into_filter();

        for key in &revoked {
            assert!(filter.contains(key));
        }
        for key in &unrevoked {
            assert!(!filter.contains(key));
        }
    }
}
