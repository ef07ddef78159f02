use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use siphasher::sip::SipHasher;
use std::borrow::Borrow;
use std::hash::BuildHasher;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::{cmp, fmt};

// Odd 64-bit multiplier (MurmurHash2) used to derive independent sip keys from
// small per-bucket seeds.
const SEED_STRIDE: u64 = 0xc6a4_a793_5bd1_e995;

/// The default hash builder for all collections.
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy)]
pub struct SipHasherBuilder {
    k0: u64,
    k1: u64,
    hasher: SipHasher,
}

impl SipHasherBuilder {
    /// Constructs a new `SipHasherBuilder` that uses the thread-local RNG to seed itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_entropy();
    /// ```
    pub fn from_entropy() -> Self {
        let mut rng = rand::thread_rng();
        Self::from_seed(rng.gen(), rng.gen())
    }

    /// Constructs a new `SipHasherBuilder` that is seeded with the given keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::SipHasherBuilder;
    ///
    /// let hash_builder = SipHasherBuilder::from_seed(0, 0);
    /// ```
    pub fn from_seed(k0: u64, k1: u64) -> Self {
        SipHasherBuilder {
            k0,
            k1,
            hasher: SipHasher::new_with_keys(k0, k1),
        }
    }
}

impl fmt::Debug for SipHasherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SipHasherBuilder")
            .field("k0", &self.k0)
            .field("k1", &self.k1)
            .finish()
    }
}

impl cmp::PartialEq for SipHasherBuilder {
    fn eq(&self, other: &SipHasherBuilder) -> bool {
        self.k0 == other.k0 && self.k1 == other.k1
    }
}

impl BuildHasher for SipHasherBuilder {
    type Hasher = SipHasher;

    #[inline]
    fn build_hasher(&self) -> SipHasher {
        self.hasher
    }
}

/// A family of keyed hash functions indexed by a small per-bucket seed.
///
/// The staging hashtables re-derive fingerprints under incremented bucket seeds until no query
/// from the unrevoked set collides with a stored fingerprint, so every structure that stores or
/// checks fingerprints hashes through this trait. Seed 0 must produce the same value as the
/// unseeded hash.
pub trait HashFamily {
    /// Returns the hash of `item` under the hash function selected by `seed`.
    fn hash_seeded<U>(&self, item: &U, seed: u8) -> u64
    where
        U: Hash + ?Sized;

    /// Returns the hash of `item` under the base (seed 0) hash function.
    fn hash<U>(&self, item: &U) -> u64
    where
        U: Hash + ?Sized,
    {
        self.hash_seeded(item, 0)
    }
}

impl HashFamily for SipHasherBuilder {
    fn hash_seeded<U>(&self, item: &U, seed: u8) -> u64
    where
        U: Hash + ?Sized,
    {
        let mut hasher =
            SipHasher::new_with_keys(self.k0 ^ u64::from(seed).wrapping_mul(SEED_STRIDE), self.k1);
        item.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct DoubleHasher<T, B = SipHasherBuilder> {
    hash_builders: [B; 2],
    _marker: PhantomData<T>,
}

impl<T> DoubleHasher<T> {
    pub fn new() -> Self {
        Self::with_hashers([
            SipHasherBuilder::from_entropy(),
            SipHasherBuilder::from_entropy(),
        ])
    }
}

impl<T, B> DoubleHasher<T, B>
where
    B: BuildHasher,
{
    pub fn with_hashers(hash_builders: [B; 2]) -> Self {
        DoubleHasher {
            hash_builders,
            _marker: PhantomData,
        }
    }

    pub fn hash<U>(&self, item: &U) -> HashIter
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        HashIter {
            a: hash(&self.hash_builders[0], &item),
            b: hash(&self.hash_builders[1], &item),
            c: 0,
        }
    }

    pub fn hashers(&self) -> &[B; 2] {
        &self.hash_builders
    }
}

pub fn hash(hash_builder: &impl BuildHasher, item: &impl Hash) -> u64 {
    let mut hasher = hash_builder.build_hasher();
    item.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, Copy)]
pub struct HashIter {
    a: u64,
    b: u64,
    c: u64,
}

impl Iterator for HashIter {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let ret = self.a;
        self.a = self.a.wrapping_add(self.b);
        self.b = self.b.wrapping_add(self.c);
        self.c += 1;
        Some(ret)
    }
}

#[cfg(test)]
pub mod tests {
    use super::{HashFamily, SipHasherBuilder};

    pub fn hash_builder_1() -> SipHasherBuilder {
        SipHasherBuilder::from_seed(0, 0)
    }

    pub fn hash_builder_2() -> SipHasherBuilder {
        SipHasherBuilder::from_seed(1, 1)
    }

    #[test]
    fn test_seed_zero_matches_base_hash() {
        let builder = hash_builder_1();
        assert_eq!(builder.hash(&42u64), builder.hash_seeded(&42u64, 0));
    }

    #[test]
    fn test_seeds_give_distinct_hashes() {
        let builder = hash_builder_1();
        let base = builder.hash_seeded(&42u64, 0);
        assert!((1..=8u8).any(|seed| builder.hash_seeded(&42u64, seed) != base));
    }
}
