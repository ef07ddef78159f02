//! Alternating bloom filter cascade over two disjoint key sets.

use crate::bloom::{BloomFilter, CASCADE_LEVEL_FPP};
use crate::SipHasherBuilder;
use std::borrow::Borrow;
use std::error;
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// Errors returned when building a cascade.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CascadeError {
    /// Every key checked against the level was a false positive, so the next level would insert
    /// and check the same sets again and the cascade cannot terminate. This only happens when
    /// the two key sets are not disjoint.
    DegenerateLevel {
        /// Index of the level whose false positive ratio reached 1.
        level: usize,
    },
}

impl fmt::Display for CascadeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeError::DegenerateLevel { level } => {
                write!(f, "cascade level {} rejected no keys", level)
            }
        }
    }
}

impl error::Error for CascadeError {}

/// A cascade of bloom filters classifying every key of two disjoint sets exactly.
///
/// Level 0 stores the revoked set and is checked against the unrevoked set; its false positives
/// become the keys stored in level 1, which is checked against the revoked set, and so on with
/// roles alternating until a level produces no false positives. A lookup walks the levels and
/// classifies at the first level the key is absent from: absent from an even level means
/// unrevoked, absent from an odd level means revoked. A key present in every level takes the
/// class of the keys stored in the last level.
///
/// Keys outside both sets get no exactness guarantee; they classify as unrevoked with high
/// probability.
///
/// # Examples
///
/// ```
/// use revocation_filters::bloom::BloomCascade;
///
/// let revoked = (0u64..100).map(|key| key * 2).collect::<Vec<_>>();
/// let unrevoked = (0u64..100).map(|key| key * 2 + 1).collect::<Vec<_>>();
///
/// let cascade = BloomCascade::from_sets(&revoked, &unrevoked).unwrap();
///
/// assert!(revoked.iter().all(|key| cascade.contains(key)));
/// assert!(unrevoked.iter().all(|key| !cascade.contains(key)));
/// ```
#[derive(Clone, Debug)]
pub struct BloomCascade<T, B = SipHasherBuilder> {
    levels: Vec<BloomFilter<T, B>>,
}

impl<T> BloomCascade<T>
where
    T: Hash,
{
    /// Builds a cascade from the revoked and unrevoked key sets, seeding every level's hash
    /// builders from entropy.
    pub fn from_sets(revoked: &[T], unrevoked: &[T]) -> Result<Self, CascadeError> {
        Self::from_sets_with_hashers(
            revoked,
            unrevoked,
            [
                SipHasherBuilder::from_entropy(),
                SipHasherBuilder::from_entropy(),
            ],
        )
    }
}

impl<T, B> BloomCascade<T, B>
where
    T: Hash,
    B: BuildHasher + Clone,
{
    /// Builds a cascade with a specific pair of hash builders shared by every level. Levels
    /// differ in bit count, so the double-hashed probe sequences stay distinct across levels.
    pub fn from_sets_with_hashers(
        revoked: &[T],
        unrevoked: &[T],
        hash_builders: [B; 2],
    ) -> Result<Self, CascadeError> {
        let mut levels = Vec::new();
        let mut stored = revoked.iter().collect::<Vec<_>>();
        let mut checked = unrevoked.iter().collect::<Vec<_>>();
        loop {
            let mut filter = BloomFilter::with_hashers(
                stored.len().max(1),
                CASCADE_LEVEL_FPP,
                hash_builders.clone(),
            );
            for item in &stored {
                filter.insert(*item);
            }
            let false_positives = checked
                .iter()
                .filter(|item| filter.contains(**item))
                .copied()
                .collect::<Vec<_>>();
            let degenerate = !checked.is_empty() && false_positives.len() == checked.len();
            levels.push(filter);
            if degenerate {
                return Err(CascadeError::DegenerateLevel {
                    level: levels.len() - 1,
                });
            }
            if false_positives.is_empty() {
                break;
            }
            // The next level stores this level's false positives and is checked against the keys
            // this level stored.
            checked = std::mem::replace(&mut stored, false_positives);
        }
        Ok(BloomCascade { levels })
    }

    /// Returns `true` if the cascade classifies `item` as revoked.
    pub fn contains<U>(&self, item: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        for (level, filter) in self.levels.iter().enumerate() {
            if !filter.contains(item) {
                return level % 2 == 1;
            }
        }
        self.levels.len() % 2 == 1
    }

    /// Returns the number of levels in the cascade.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Returns the per-level filters.
    pub fn levels(&self) -> &[BloomFilter<T, B>] {
        &self.levels
    }

    /// Returns the total number of bytes of bit storage across all levels.
    pub fn size_in_bytes(&self) -> usize {
        self.levels.iter().map(BloomFilter::size_in_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{BloomCascade, CascadeError};
    use crate::util::tests::{hash_builder_1, hash_builder_2};

    fn builders() -> [crate::SipHasherBuilder; 2] {
        [hash_builder_1(), hash_builder_2()]
    }

    #[test]
    fn test_exact_classification() {
        let revoked = (0u64..500).map(|key| key * 2).collect::<Vec<_>>();
        let unrevoked = (0u64..5000).map(|key| key * 2 + 1).collect::<Vec<_>>();

        let cascade = BloomCascade::from_sets_with_hashers(&revoked, &unrevoked, builders())
            .unwrap();

        for key in &revoked {
            assert!(cascade.contains(key));
        }
        for key in &unrevoked {
            assert!(!cascade.contains(key));
        }
        assert!(cascade.level_count() >= 1);
    }

    #[test]
    fn test_tiny_sets() {
        let cascade =
            BloomCascade::from_sets_with_hashers(&[1u64], &[2u64], builders()).unwrap();
        assert!(cascade.contains(&1u64));
        assert!(!cascade.contains(&2u64));
    }

    #[test]
    fn test_empty_revoked_set() {
        let unrevoked = (0u64..100).collect::<Vec<_>>();
        let cascade =
            BloomCascade::from_sets_with_hashers(&[], &unrevoked, builders()).unwrap();

        assert_eq!(cascade.level_count(), 1);
        for key in &unrevoked {
            assert!(!cascade.contains(key));
        }
    }

    #[test]
    fn test_overlapping_sets_are_degenerate() {
        let keys = (0u64..50).collect::<Vec<_>>();
        let err = BloomCascade::from_sets_with_hashers(&keys, &keys, builders()).unwrap_err();
        assert_eq!(err, CascadeError::DegenerateLevel { level: 0 });
    }

    #[test]
    fn test_size_in_bytes_sums_levels() {
        let revoked = (0u64..100).collect::<Vec<_>>();
        let unrevoked = (1000u64..2000).collect::<Vec<_>>();
        let cascade = BloomCascade::from_sets_with_hashers(&revoked, &unrevoked, builders())
            .unwrap();

        let total = cascade
            .levels()
            .iter()
            .map(|filter| filter.size_in_bytes())
            .sum::<usize>();
        assert_eq!(cascade.size_in_bytes(), total);
        assert!(total > 0);
    }
}
