use crate::bit_vec::BitVec;
use crate::util::DoubleHasher;
use crate::SipHasherBuilder;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// A bloom filter is a bit array where `K` hash functions map each element to `K` bits. An
/// element definitely does not exist in the filter if any of its `K` bits are unset, and
/// possibly exists if all of them are set. Two hash functions simulate the `K` hash functions
/// through double hashing. Used standalone and as the per-level filter of
/// [`BloomCascade`](crate::bloom::BloomCascade).
///
/// # Examples
///
/// ```
/// use revocation_filters::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::<u64>::new(10, 0.01);
///
/// assert!(!filter.contains(&42));
/// filter.insert(&42);
/// assert!(filter.contains(&42));
///
/// filter.clear();
/// assert!(!filter.contains(&42));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
pub struct BloomFilter<T, B = SipHasherBuilder> {
    bit_vec: BitVec,
    hasher: DoubleHasher<T, B>,
    hasher_count: usize,
    _marker: PhantomData<T>,
}

impl<T> BloomFilter<T> {
    /// Constructs a new, empty `BloomFilter` with an estimated max capacity of `item_count`
    /// items and a maximum false positive probability of `fpp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::<u64>::new(10, 0.01);
    /// ```
    pub fn new(item_count: usize, fpp: f64) -> Self {
        Self::with_hashers(
            item_count,
            fpp,
            [
                SipHasherBuilder::from_entropy(),
                SipHasherBuilder::from_entropy(),
            ],
        )
    }
}

impl<T, B> BloomFilter<T, B>
where
    B: BuildHasher,
{
    fn get_hasher_count(bit_count: usize, item_count: usize) -> usize {
        ((bit_count as f64) / (item_count as f64) * 2f64.ln()).ceil() as usize
    }

    /// Constructs a new, empty `BloomFilter` with an estimated max capacity of `item_count`
    /// items, a maximum false positive probability of `fpp`, and two hasher builders for double
    /// hashing.
    ///
    /// # Panics
    ///
    /// Panics if `item_count` is 0, or if `fpp` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::bloom::BloomFilter;
    /// use revocation_filters::SipHasherBuilder;
    ///
    /// let filter = BloomFilter::<u64>::with_hashers(
    ///     10,
    ///     0.01,
    ///     [SipHasherBuilder::from_seed(0, 0), SipHasherBuilder::from_seed(1, 1)],
    /// );
    /// ```
    pub fn with_hashers(item_count: usize, fpp: f64, hash_builders: [B; 2]) -> Self {
        assert!(item_count > 0);
        assert!(fpp > 0.0 && fpp < 1.0);
        let bit_count = (-fpp.log2() * (item_count as f64) / 2f64.ln()).ceil() as usize;
        BloomFilter {
            bit_vec: BitVec::new(bit_count),
            hasher: DoubleHasher::with_hashers(hash_builders),
            hasher_count: Self::get_hasher_count(bit_count, item_count),
            _marker: PhantomData,
        }
    }

    /// Inserts an element into the bloom filter.
    pub fn insert<U>(&mut self, item: &U)
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        self.hasher
            .hash(item)
            .take(self.hasher_count)
            .for_each(|hash| {
                let offset = hash % self.bit_vec.len() as u64;
                self.bit_vec.set(offset as usize, true);
            })
    }

    /// Checks if an element is possibly in the bloom filter.
    pub fn contains<U>(&self, item: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        self.hasher.hash(item).take(self.hasher_count).all(|hash| {
            let offset = hash % self.bit_vec.len() as u64;
            self.bit_vec[offset as usize]
        })
    }

    /// Returns the number of bits in the bloom filter.
    pub fn len(&self) -> usize {
        self.bit_vec.len()
    }

    /// Returns `true` if the bloom filter has no bits.
    pub fn is_empty(&self) -> bool {
        self.bit_vec.is_empty()
    }

    /// Returns the number of hash functions used by the bloom filter.
    pub fn hasher_count(&self) -> usize {
        self.hasher_count
    }

    /// Clears the bloom filter, removing all elements.
    pub fn clear(&mut self) {
        self.bit_vec.set_all(false)
    }

    /// Returns the number of set bits in the bloom filter.
    pub fn count_ones(&self) -> usize {
        self.bit_vec.count_ones()
    }

    /// Returns the number of unset bits in the bloom filter.
    pub fn count_zeros(&self) -> usize {
        self.bit_vec.count_zeros()
    }

    /// Returns the estimated false positive probability of the bloom filter. This value will
    /// increase as more items are added.
    pub fn estimated_fpp(&self) -> f64 {
        let single_fpp = self.bit_vec.count_ones() as f64 / self.bit_vec.len() as f64;
        single_fpp.powi(self.hasher_count as i32)
    }

    /// Returns the number of bytes of bit storage.
    pub fn size_in_bytes(&self) -> usize {
        self.bit_vec.size_in_bytes()
    }

    /// Returns a reference to the bloom filter's hasher builders.
    pub fn hashers(&self) -> &[B; 2] {
        self.hasher.hashers()
    }
}
