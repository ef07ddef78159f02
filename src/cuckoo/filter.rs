//! Approximate membership filters storing fingerprint tags in cuckoo buckets.

use crate::cuckoo::addressing::{AddressingScheme, SegmentedAddressing, UniformAddressing};
use crate::cuckoo::tag_table::{TagInsert, TagTable};
use crate::cuckoo::{BATCH_SIZE, DEFAULT_FINGERPRINT_BIT_COUNT, MAX_EVICTION_STEPS, SLOTS_PER_BUCKET};
use crate::util::{HashFamily, SipHasherBuilder};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::error;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Errors returned by filter insertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterError {
    /// The filter is at capacity: the eviction walk already parked one displaced fingerprint in
    /// the victim cache and no further item can be stored.
    NotEnoughSpace,
    /// The operation is not available on this filter. Filters reconstructed from an exported
    /// seed table are read-only; their layout must stay bit-identical to the oracle that
    /// produced it.
    NotSupported,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::NotEnoughSpace => write!(f, "filter does not have enough space"),
            FilterError::NotSupported => write!(f, "operation not supported by this filter"),
        }
    }
}

impl error::Error for FilterError {}

#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
struct Victim {
    index: usize,
    tag: u32,
}

/// An approximate set-membership filter generic over the bucket addressing policy.
///
/// Items are reduced to small nonzero fingerprint tags stored in one of two candidate buckets.
/// A full bucket triggers a bounded random eviction walk; if the walk exhausts its step budget
/// the last displaced tag is parked in a one-entry victim cache and the next insertion fails
/// with [`FilterError::NotEnoughSpace`]. Lookups may return false positives but never false
/// negatives, and `remove` only removes items that were actually inserted.
///
/// Two instantiations are exported: [`CuckooFilter`] over a power-of-two bucket array and
/// [`VacuumFilter`] over segmented alternate ranges, which sustains a ~95% load factor.
///
/// # Examples
///
/// ```
/// use revocation_filters::cuckoo::VacuumFilter;
///
/// let mut filter = VacuumFilter::<u64>::new(100);
///
/// filter.insert(&42).unwrap();
/// assert!(filter.contains(&42));
///
/// filter.remove(&42);
/// assert!(!filter.contains(&42));
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug)]
pub struct Filter<T, A, H = SipHasherBuilder> {
    tags: TagTable,
    addressing: A,
    hash_builder: H,
    fingerprint_bit_count: usize,
    seeds: Option<Vec<u8>>,
    victim: Option<Victim>,
    #[cfg_attr(feature = "serde", serde(skip, default = "XorShiftRng::from_entropy"))]
    rng: XorShiftRng,
    _marker: PhantomData<T>,
}

/// A [`Filter`] with plain cuckoo addressing.
pub type CuckooFilter<T, H = SipHasherBuilder> = Filter<T, UniformAddressing, H>;

/// A [`Filter`] with vacuum (segmented) addressing.
pub type VacuumFilter<T, H = SipHasherBuilder> = Filter<T, SegmentedAddressing, H>;

impl<T> Filter<T, UniformAddressing> {
    /// Constructs a new, empty `CuckooFilter` sized for `max_num_keys` items with the default
    /// 12-bit fingerprints. The bucket count is rounded up to a power of two.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::cuckoo::CuckooFilter;
    ///
    /// let filter = CuckooFilter::<u64>::new(100);
    /// assert_eq!(filter.capacity(), 128);
    /// ```
    pub fn new(max_num_keys: usize) -> Self {
        Self::from_parameters(max_num_keys, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Constructs a new, empty `CuckooFilter` sized for `max_num_keys` items with
    /// `fingerprint_bit_count`-bit fingerprints.
    ///
    /// # Panics
    ///
    /// Panics if `fingerprint_bit_count` is 0 or greater than 32.
    pub fn from_parameters(max_num_keys: usize, fingerprint_bit_count: usize) -> Self {
        Self::with_hasher(
            max_num_keys,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> Filter<T, UniformAddressing, H>
where
    H: HashFamily,
{
    /// Constructs a new, empty `CuckooFilter` with a specific hash builder.
    pub fn with_hasher(max_num_keys: usize, fingerprint_bit_count: usize, hash_builder: H) -> Self {
        Self::with_parts(
            UniformAddressing::new(max_num_keys),
            hash_builder,
            fingerprint_bit_count,
        )
    }
}

impl<T> Filter<T, SegmentedAddressing> {
    /// Constructs a new, empty `VacuumFilter` sized for `max_num_keys` items with the default
    /// 12-bit fingerprints. The bucket count is rounded up to a multiple of the base alternate
    /// range.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::cuckoo::VacuumFilter;
    ///
    /// let filter = VacuumFilter::<u64>::new(100);
    /// assert!(filter.is_empty());
    /// ```
    pub fn new(max_num_keys: usize) -> Self {
        Self::from_parameters(max_num_keys, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Constructs a new, empty `VacuumFilter` sized for `max_num_keys` items with
    /// `fingerprint_bit_count`-bit fingerprints.
    ///
    /// # Panics
    ///
    /// Panics if `fingerprint_bit_count` is 0 or greater than 32.
    pub fn from_parameters(max_num_keys: usize, fingerprint_bit_count: usize) -> Self {
        Self::with_hasher(
            max_num_keys,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> Filter<T, SegmentedAddressing, H>
where
    H: HashFamily,
{
    /// Constructs a new, empty `VacuumFilter` with a specific hash builder.
    pub fn with_hasher(max_num_keys: usize, fingerprint_bit_count: usize, hash_builder: H) -> Self {
        Self::with_parts(
            SegmentedAddressing::new(max_num_keys),
            hash_builder,
            fingerprint_bit_count,
        )
    }
}

impl<T, A, H> Filter<T, A, H>
where
    A: AddressingScheme,
    H: HashFamily,
{
    /// Constructs a filter from an addressing scheme and hash builder directly.
    pub fn with_parts(addressing: A, hash_builder: H, fingerprint_bit_count: usize) -> Self {
        Filter {
            tags: TagTable::new(addressing.num_buckets(), fingerprint_bit_count),
            addressing,
            hash_builder,
            fingerprint_bit_count,
            seeds: None,
            victim: None,
            rng: XorShiftRng::from_entropy(),
            _marker: PhantomData,
        }
    }

    /// Constructs a read-only filter whose fingerprints are derived under per-bucket seeds
    /// exported by a staging hashtable. The tag layout is filled in by `copy_insert`.
    pub(crate) fn from_seed_table(
        addressing: A,
        hash_builder: H,
        fingerprint_bit_count: usize,
        seeds: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(seeds.len(), addressing.num_buckets());
        Filter {
            tags: TagTable::new(addressing.num_buckets(), fingerprint_bit_count),
            addressing,
            hash_builder,
            fingerprint_bit_count,
            seeds: Some(seeds),
            victim: None,
            rng: XorShiftRng::from_entropy(),
            _marker: PhantomData,
        }
    }

    #[inline]
    fn fingerprint(&self, hash: u64) -> u32 {
        let mask = ((1u64 << self.fingerprint_bit_count) - 1) as u32;
        let tag = hash as u32 & mask;
        // 0 marks an empty slot.
        tag + (tag == 0) as u32
    }

    #[inline]
    fn seeded_hash<U>(&self, item: &U, base_hash: u64, seed: u8) -> u64
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        if seed == 0 {
            base_hash
        } else {
            self.hash_builder.hash_seeded(item, seed)
        }
    }

    /// Inserts `item` into the filter.
    ///
    /// Returns [`FilterError::NotEnoughSpace`] if the victim cache is already occupied, and
    /// [`FilterError::NotSupported`] on a filter reconstructed from a seed table.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::cuckoo::CuckooFilter;
    ///
    /// let mut filter = CuckooFilter::<u64>::new(100);
    ///
    /// filter.insert(&1).unwrap();
    /// assert_eq!(filter.len(), 1);
    /// ```
    pub fn insert<U>(&mut self, item: &U) -> Result<(), FilterError>
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        if self.seeds.is_some() {
            return Err(FilterError::NotSupported);
        }
        if self.victim.is_some() {
            return Err(FilterError::NotEnoughSpace);
        }
        let hash = self.hash_builder.hash(item);
        let index = self.addressing.primary_index(hash);
        let tag = self.fingerprint(hash);
        self.insert_impl(index, tag);
        Ok(())
    }

    /// Inserts a batch of items, hashing each chunk up front before touching the table.
    ///
    /// Stops at the first item that cannot be stored.
    pub fn insert_many<U>(&mut self, items: &[U]) -> Result<(), FilterError>
    where
        T: Borrow<U>,
        U: Hash,
    {
        if self.seeds.is_some() {
            return Err(FilterError::NotSupported);
        }
        for chunk in items.chunks(BATCH_SIZE) {
            let prepared = chunk
                .iter()
                .map(|item| {
                    let hash = self.hash_builder.hash(item);
                    (self.addressing.primary_index(hash), self.fingerprint(hash))
                })
                .collect::<Vec<_>>();
            for (index, tag) in prepared {
                if self.victim.is_some() {
                    return Err(FilterError::NotEnoughSpace);
                }
                self.insert_impl(index, tag);
            }
        }
        Ok(())
    }

    // The eviction walk. The first bucket is tried without kicking; afterwards every full bucket
    // evicts a random occupant, which moves to its own alternate bucket. If the step budget runs
    // out the displaced tag is parked in the victim cache, which still counts as stored.
    fn insert_impl(&mut self, index: usize, tag: u32) {
        let mut cur_index = index;
        let mut cur_tag = tag;
        for step in 0..=MAX_EVICTION_STEPS {
            let kickout = step > 0;
            if A::BUCKET_LOOKAHEAD && kickout {
                self.relocate_from(cur_index);
            }
            match self.tags.insert_tag(cur_index, cur_tag, kickout, &mut self.rng) {
                TagInsert::Inserted => return,
                TagInsert::Kicked(old_tag) => cur_tag = old_tag,
                TagInsert::Full => {}
            }
            cur_index = self.addressing.alternate_index(cur_index, u64::from(cur_tag));
        }
        self.victim = Some(Victim {
            index: cur_index,
            tag: cur_tag,
        });
    }

    // Tries to free a slot in `bucket` by moving one occupant to its alternate bucket. Returns
    // `true` if a slot is available afterwards.
    fn relocate_from(&mut self, bucket: usize) -> bool {
        let tags = self.tags.read_bucket(bucket);
        for (slot, &tag) in tags.iter().enumerate() {
            if tag == 0 {
                return true;
            }
            let alternate = self.addressing.alternate_index(bucket, u64::from(tag));
            if alternate == bucket {
                continue;
            }
            if let TagInsert::Inserted = self.tags.insert_tag(alternate, tag, false, &mut self.rng)
            {
                self.tags.write_slot(bucket, slot, 0);
                return true;
            }
        }
        false
    }

    /// Returns `true` if the filter may contain `item`.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::cuckoo::VacuumFilter;
    ///
    /// let mut filter = VacuumFilter::<u64>::new(100);
    ///
    /// filter.insert(&7).unwrap();
    /// assert!(filter.contains(&7));
    /// ```
    pub fn contains<U>(&self, item: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash(item);
        self.contains_hashed(item, hash)
    }

    /// Returns one membership answer per item, hashing each chunk up front.
    pub fn contains_many<U>(&self, items: &[U]) -> Vec<bool>
    where
        T: Borrow<U>,
        U: Hash,
    {
        let mut results = Vec::with_capacity(items.len());
        for chunk in items.chunks(BATCH_SIZE) {
            let hashes = chunk
                .iter()
                .map(|item| self.hash_builder.hash(item))
                .collect::<Vec<_>>();
            results.extend(
                chunk
                    .iter()
                    .zip(hashes)
                    .map(|(item, hash)| self.contains_hashed(item, hash)),
            );
        }
        results
    }

    fn contains_hashed<U>(&self, item: &U, hash: u64) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let i1 = self.addressing.primary_index(hash);
        match &self.seeds {
            None => {
                let tag = self.fingerprint(hash);
                let i2 = self.addressing.alternate_index(i1, u64::from(tag));
                if let Some(victim) = self.victim {
                    if victim.tag == tag && (victim.index == i1 || victim.index == i2) {
                        return true;
                    }
                }
                self.tags.find_tag_in_either(i1, i2, tag, tag)
            }
            Some(seeds) => {
                // Alternate index is keyed on the full hash so bucket placement is stable under
                // per-bucket reseeding; the candidate tags may differ between the two buckets.
                let i2 = self.addressing.alternate_index(i1, hash);
                let tag_1 = self.fingerprint(self.seeded_hash(item, hash, seeds[i1]));
                let tag_2 = self.fingerprint(self.seeded_hash(item, hash, seeds[i2]));
                self.tags.find_tag_in_either(i1, i2, tag_1, tag_2)
            }
        }
    }

    /// Removes `item` from the filter, returning `true` if a matching fingerprint was removed.
    ///
    /// Removing an item that was never inserted may evict the fingerprint of a colliding item;
    /// callers must only remove items they previously inserted. A successful removal frees a
    /// slot, so a parked victim is given a chance to re-enter the table.
    pub fn remove<U>(&mut self, item: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash(item);
        self.remove_hashed(item, hash)
    }

    /// Removes a batch of items, returning one result per item.
    pub fn remove_many<U>(&mut self, items: &[U]) -> Vec<bool>
    where
        T: Borrow<U>,
        U: Hash,
    {
        let mut results = Vec::with_capacity(items.len());
        for chunk in items.chunks(BATCH_SIZE) {
            let hashes = chunk
                .iter()
                .map(|item| self.hash_builder.hash(item))
                .collect::<Vec<_>>();
            for (item, hash) in chunk.iter().zip(hashes) {
                results.push(self.remove_hashed(item, hash));
            }
        }
        results
    }

    fn remove_hashed<U>(&mut self, item: &U, hash: u64) -> bool
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let i1 = self.addressing.primary_index(hash);
        let removed = match &self.seeds {
            None => {
                let tag = self.fingerprint(hash);
                let i2 = self.addressing.alternate_index(i1, u64::from(tag));
                let victim_hit = self.victim.map_or(false, |victim| {
                    victim.tag == tag && (victim.index == i1 || victim.index == i2)
                });
                if victim_hit {
                    self.victim = None;
                    return true;
                }
                self.tags.delete_tag(i1, tag) || self.tags.delete_tag(i2, tag)
            }
            Some(seeds) => {
                let i2 = self.addressing.alternate_index(i1, hash);
                let tag_1 = self.fingerprint(self.seeded_hash(item, hash, seeds[i1]));
                let tag_2 = self.fingerprint(self.seeded_hash(item, hash, seeds[i2]));
                self.tags.delete_tag(i1, tag_1) || self.tags.delete_tag(i2, tag_2)
            }
        };
        if removed {
            if let Some(victim) = self.victim.take() {
                self.insert_impl(victim.index, victim.tag);
            }
        }
        removed
    }

    /// Writes a fingerprint tag directly into `(bucket, slot)`, preserving an exported table
    /// layout. Returns `false` if the slot is already occupied.
    pub(crate) fn copy_insert(&mut self, bucket: usize, slot: usize, tag: u32) -> bool {
        self.tags.copy_to_slot(bucket, slot, tag)
    }

    /// Clears the filter, removing all items.
    pub fn clear(&mut self) {
        self.tags.clear();
        self.victim = None;
    }

    /// Returns the number of items in the filter, counting a parked victim.
    pub fn len(&self) -> usize {
        self.tags.occupied_len() + self.victim.is_some() as usize
    }

    /// Returns `true` if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fingerprint slots in the filter.
    pub fn capacity(&self) -> usize {
        self.tags.num_buckets() * SLOTS_PER_BUCKET
    }

    /// Returns the number of buckets in the filter.
    pub fn num_buckets(&self) -> usize {
        self.tags.num_buckets()
    }

    /// Returns the fraction of occupied slots.
    pub fn load_factor(&self) -> f64 {
        self.tags.occupied_len() as f64 / self.capacity() as f64
    }

    /// Returns the number of bits of table storage per stored item, or 0.0 if the filter is
    /// empty.
    pub fn bits_per_item(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.size_in_bytes() * 8) as f64 / self.len() as f64
        }
    }

    /// Returns the number of bits in each fingerprint.
    pub fn fingerprint_bit_count(&self) -> usize {
        self.fingerprint_bit_count
    }

    /// Returns `true` if the victim cache holds a displaced fingerprint.
    pub fn has_victim(&self) -> bool {
        self.victim.is_some()
    }

    /// Returns the number of bytes of fingerprint storage.
    pub fn size_in_bytes(&self) -> usize {
        self.tags.size_in_bytes()
    }

    /// Returns a reference to the filter's hash builder.
    pub fn hasher(&self) -> &H {
        &self.hash_builder
    }
}
