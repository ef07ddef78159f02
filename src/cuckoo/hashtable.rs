//! Exact cuckoo hashtables that drive fingerprint convergence.
//!
//! The hashtable stores whole keys, so fingerprints can be re-derived at any time under new
//! per-bucket seeds. Building a zero-false-positive filter alternates lookup rounds over the
//! query set, which bump the seed of every colliding bucket, with rehash passes until no query
//! key collides with a stored fingerprint. The final layout is exported with
//! [`Hashtable::export_fingerprints`] and [`Hashtable::seeds`].

use crate::cuckoo::addressing::{AddressingScheme, SegmentedAddressing, UniformAddressing};
use crate::cuckoo::key_table::KeyTable;
use crate::cuckoo::{
    DEFAULT_FINGERPRINT_BIT_COUNT, MAX_BFS_PATH_LEN, MAX_EVICTION_STEPS, SLOTS_PER_BUCKET,
};
use crate::util::{HashFamily, SipHasherBuilder};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::borrow::Borrow;
use std::collections::{BTreeMap, VecDeque};
use std::error;
use std::fmt;
use std::hash::Hash;

/// Errors returned by hashtable insertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableError {
    /// The key is already present. The table stores each key exactly once.
    DuplicateKey,
    /// No eviction sequence could free a slot for the key. The table contents are unspecified
    /// after this error; callers building a filter pair abort the build.
    NotEnoughSpace,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::DuplicateKey => write!(f, "key is already in the table"),
            TableError::NotEnoughSpace => write!(f, "table does not have enough space"),
        }
    }
}

impl error::Error for TableError {}

// BFS node for the uniform path search: `pathcode` encodes the root bucket and the slot chosen
// at each level in base SLOTS_PER_BUCKET.
#[derive(Clone, Copy)]
struct PathSlot {
    bucket: usize,
    pathcode: usize,
    depth: usize,
}

/// An exact cuckoo hashtable storing full keys, generic over the bucket addressing policy.
///
/// Besides exact membership, the table maintains one small seed per bucket and can answer
/// whether a query key's seeded fingerprint collides with any stored key's fingerprint in the
/// query's candidate buckets. Colliding buckets have their seed bumped, which re-derives every
/// fingerprint in the bucket; iterating this to a fixed point yields a fingerprint layout with
/// zero false positives over the query set.
///
/// The alternate bucket index is keyed on the key's unseeded hash, never on a fingerprint, so
/// placement is stable while seeds change.
///
/// # Examples
///
/// ```
/// use revocation_filters::cuckoo::VacuumHashtable;
///
/// let mut table = VacuumHashtable::<u64>::new(100);
///
/// table.insert(42).unwrap();
/// assert!(table.contains(&42));
/// assert!(!table.contains(&43));
/// ```
#[derive(Clone, Debug)]
pub struct Hashtable<T, A, H = SipHasherBuilder> {
    keys: KeyTable<T>,
    seeds: Vec<u8>,
    addressing: A,
    hash_builder: H,
    fingerprint_bit_count: usize,
    round: u8,
    rng: XorShiftRng,
}

/// A [`Hashtable`] with plain cuckoo addressing. Insertion resolves full buckets with a
/// breadth-first search for a short eviction path.
pub type CuckooHashtable<T, H = SipHasherBuilder> = Hashtable<T, UniformAddressing, H>;

/// A [`Hashtable`] with vacuum (segmented) addressing. Insertion resolves full buckets with a
/// bounded random eviction walk.
pub type VacuumHashtable<T, H = SipHasherBuilder> = Hashtable<T, SegmentedAddressing, H>;

impl<T> Hashtable<T, UniformAddressing>
where
    T: Hash + PartialEq,
{
    /// Constructs a new, empty `CuckooHashtable` sized for `max_num_keys` keys with the default
    /// 12-bit fingerprints.
    pub fn new(max_num_keys: usize) -> Self {
        Self::from_parameters(max_num_keys, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Constructs a new, empty `CuckooHashtable` with `fingerprint_bit_count`-bit fingerprints.
    pub fn from_parameters(max_num_keys: usize, fingerprint_bit_count: usize) -> Self {
        Self::with_hasher(
            max_num_keys,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> Hashtable<T, UniformAddressing, H>
where
    T: Hash + PartialEq,
    H: HashFamily,
{
    /// Constructs a new, empty `CuckooHashtable` with a specific hash builder.
    pub fn with_hasher(max_num_keys: usize, fingerprint_bit_count: usize, hash_builder: H) -> Self {
        Self::with_parts(
            UniformAddressing::new(max_num_keys),
            hash_builder,
            fingerprint_bit_count,
        )
    }
}

impl<T> Hashtable<T, SegmentedAddressing>
where
    T: Hash + PartialEq,
{
    /// Constructs a new, empty `VacuumHashtable` sized for `max_num_keys` keys with the default
    /// 12-bit fingerprints.
    pub fn new(max_num_keys: usize) -> Self {
        Self::from_parameters(max_num_keys, DEFAULT_FINGERPRINT_BIT_COUNT)
    }

    /// Constructs a new, empty `VacuumHashtable` with `fingerprint_bit_count`-bit fingerprints.
    pub fn from_parameters(max_num_keys: usize, fingerprint_bit_count: usize) -> Self {
        Self::with_hasher(
            max_num_keys,
            fingerprint_bit_count,
            SipHasherBuilder::from_entropy(),
        )
    }
}

impl<T, H> Hashtable<T, SegmentedAddressing, H>
where
    T: Hash + PartialEq,
    H: HashFamily,
{
    /// Constructs a new, empty `VacuumHashtable` with a specific hash builder.
    pub fn with_hasher(max_num_keys: usize, fingerprint_bit_count: usize, hash_builder: H) -> Self {
        Self::with_parts(
            SegmentedAddressing::new(max_num_keys),
            hash_builder,
            fingerprint_bit_count,
        )
    }
}

impl<T, A, H> Hashtable<T, A, H>
where
    T: Hash + PartialEq,
    A: AddressingScheme,
    H: HashFamily,
{
    /// Constructs a hashtable from an addressing scheme and hash builder directly.
    pub fn with_parts(addressing: A, hash_builder: H, fingerprint_bit_count: usize) -> Self {
        Hashtable {
            keys: KeyTable::new(addressing.num_buckets()),
            seeds: vec![0; addressing.num_buckets()],
            addressing,
            hash_builder,
            fingerprint_bit_count,
            round: 0,
            rng: XorShiftRng::from_entropy(),
        }
    }

    #[inline]
    fn fingerprint(&self, hash: u64) -> u32 {
        let mask = ((1u64 << self.fingerprint_bit_count) - 1) as u32;
        let tag = hash as u32 & mask;
        tag + (tag == 0) as u32
    }

    #[inline]
    fn seeded_tag<U>(&self, item: &U, base_hash: u64, seed: u8) -> u32
    where
        U: Hash + ?Sized,
    {
        if seed == 0 {
            self.fingerprint(base_hash)
        } else {
            self.fingerprint(self.hash_builder.hash_seeded(item, seed))
        }
    }

    #[inline]
    fn candidate_buckets(&self, hash: u64) -> (usize, usize) {
        let i1 = self.addressing.primary_index(hash);
        (i1, self.addressing.alternate_index(i1, hash))
    }

    /// Inserts `key` into the table, returning the bucket and slot it landed in.
    ///
    /// Full candidate buckets are resolved by displacing stored keys along an eviction path.
    /// Returns [`TableError::DuplicateKey`] if the key is already present and
    /// [`TableError::NotEnoughSpace`] if no path frees a slot.
    pub fn insert(&mut self, key: T) -> Result<(usize, usize), TableError> {
        let hash = self.hash_builder.hash(&key);
        let (i1, i2) = self.candidate_buckets(hash);
        if self.keys.find_key(i1, &key).is_some() || self.keys.find_key(i2, &key).is_some() {
            return Err(TableError::DuplicateKey);
        }
        let key = match self.keys.insert_in_empty_slot(i1, key) {
            Ok(slot) => return Ok((i1, slot)),
            Err(key) => key,
        };
        let key = match self.keys.insert_in_empty_slot(i2, key) {
            Ok(slot) => return Ok((i2, slot)),
            Err(key) => key,
        };
        if A::BUCKET_LOOKAHEAD {
            self.walk_insert(i1, key)
        } else {
            self.path_insert(i1, i2, key)
        }
    }

    // Shifts keys along a breadth-first eviction path ending in an empty slot, then places the
    // new key at the head of the path.
    fn path_insert(&mut self, i1: usize, i2: usize, key: T) -> Result<(usize, usize), TableError> {
        let path = match self.find_eviction_path(i1, i2) {
            Some(path) => path,
            None => return Err(TableError::NotEnoughSpace),
        };
        for level in (1..path.len()).rev() {
            let (from_bucket, from_slot) = path[level - 1];
            let (to_bucket, to_slot) = path[level];
            if let Some(moved) = self.keys.erase_slot(from_bucket, from_slot) {
                self.keys.replace_slot(to_bucket, to_slot, moved);
            }
        }
        let (bucket, slot) = path[0];
        self.keys.replace_slot(bucket, slot, key);
        Ok((bucket, slot))
    }

    fn find_eviction_path(&self, i1: usize, i2: usize) -> Option<Vec<(usize, usize)>> {
        let mut queue = VecDeque::new();
        queue.push_back(PathSlot {
            bucket: i1,
            pathcode: 0,
            depth: 0,
        });
        queue.push_back(PathSlot {
            bucket: i2,
            pathcode: 1,
            depth: 0,
        });
        while let Some(node) = queue.pop_front() {
            for slot in 0..SLOTS_PER_BUCKET {
                let pathcode = node.pathcode * SLOTS_PER_BUCKET + slot;
                match self.keys.slot(node.bucket, slot) {
                    None => {
                        let found = PathSlot {
                            bucket: node.bucket,
                            pathcode,
                            depth: node.depth,
                        };
                        return self.decode_path(found, i1, i2);
                    }
                    Some(stored) => {
                        if node.depth + 1 < MAX_BFS_PATH_LEN {
                            let hash = self.hash_builder.hash(stored);
                            queue.push_back(PathSlot {
                                bucket: self.addressing.alternate_index(node.bucket, hash),
                                pathcode,
                                depth: node.depth + 1,
                            });
                        }
                    }
                }
            }
        }
        None
    }

    // Unpacks a pathcode into the (bucket, slot) sequence it encodes. The digits are the slot
    // chosen at each level; what remains after stripping them is the root bucket selector.
    fn decode_path(&self, found: PathSlot, i1: usize, i2: usize) -> Option<Vec<(usize, usize)>> {
        let mut slots = vec![0; found.depth + 1];
        let mut code = found.pathcode;
        for slot in slots.iter_mut().rev() {
            *slot = code % SLOTS_PER_BUCKET;
            code /= SLOTS_PER_BUCKET;
        }
        let mut bucket = if code == 0 { i1 } else { i2 };
        let mut path = Vec::with_capacity(found.depth + 1);
        for (level, &slot) in slots.iter().enumerate() {
            path.push((bucket, slot));
            if level < found.depth {
                let stored = self.keys.slot(bucket, slot)?;
                bucket = self
                    .addressing
                    .alternate_index(bucket, self.hash_builder.hash(stored));
            }
        }
        Some(path)
    }

    // Bounded random eviction walk with bucket lookahead, for the segmented scheme. Returns the
    // position the new key landed in; later steps of the same walk can move the new key again
    // (by relocating it or kicking it back into hand), so `placement` is kept current the whole
    // walk. On failure the last displaced key is dropped, leaving the table contents
    // unspecified.
    fn walk_insert(&mut self, index: usize, key: T) -> Result<(usize, usize), TableError> {
        let mut cur_index = index;
        let mut cur_key = key;
        let mut placement = None;
        let mut holding_new_key = true;
        for _ in 0..=MAX_EVICTION_STEPS {
            cur_key = match self.keys.insert_in_empty_slot(cur_index, cur_key) {
                Ok(slot) => {
                    return Ok(if holding_new_key {
                        (cur_index, slot)
                    } else {
                        placement.unwrap_or((cur_index, slot))
                    });
                }
                Err(key) => key,
            };
            if let Some((freed, moved_to)) = self.relocate_key_from(cur_index) {
                if let Some(moved_to) = moved_to {
                    if placement == Some((cur_index, freed)) {
                        placement = Some(moved_to);
                    }
                }
                self.keys.replace_slot(cur_index, freed, cur_key);
                return Ok(if holding_new_key {
                    (cur_index, freed)
                } else {
                    placement.unwrap_or((cur_index, freed))
                });
            }
            let slot = self.rng.gen_range(0, SLOTS_PER_BUCKET);
            cur_key = match self.keys.replace_slot(cur_index, slot, cur_key) {
                Some(displaced) => displaced,
                None => {
                    return Ok(if holding_new_key {
                        (cur_index, slot)
                    } else {
                        placement.unwrap_or((cur_index, slot))
                    });
                }
            };
            if holding_new_key {
                placement = Some((cur_index, slot));
                holding_new_key = false;
            } else if placement == Some((cur_index, slot)) {
                // The walk kicked the new key itself; it is back in hand.
                placement = None;
                holding_new_key = true;
            }
            let hash = self.hash_builder.hash(&cur_key);
            cur_index = self.addressing.alternate_index(cur_index, hash);
        }
        Err(TableError::NotEnoughSpace)
    }

    // Tries to free a slot in `bucket` by moving one occupant to its alternate bucket. Reports
    // the freed slot and, when an occupant was moved, where it went.
    fn relocate_key_from(&mut self, bucket: usize) -> Option<(usize, Option<(usize, usize)>)> {
        for slot in 0..SLOTS_PER_BUCKET {
            let hash = match self.keys.slot(bucket, slot) {
                Some(stored) => self.hash_builder.hash(stored),
                None => return Some((slot, None)),
            };
            let alternate = self.addressing.alternate_index(bucket, hash);
            if alternate == bucket {
                continue;
            }
            let has_room = (0..SLOTS_PER_BUCKET).any(|s| self.keys.slot(alternate, s).is_none());
            if has_room {
                if let Some(stored) = self.keys.erase_slot(bucket, slot) {
                    match self.keys.insert_in_empty_slot(alternate, stored) {
                        Ok(to_slot) => return Some((slot, Some((alternate, to_slot)))),
                        Err(stored) => {
                            self.keys.replace_slot(bucket, slot, stored);
                        }
                    }
                }
            }
        }
        None
    }

    /// Returns the bucket and slot holding `key`, if present.
    pub fn find<U>(&self, key: &U) -> Option<(usize, usize)>
    where
        T: Borrow<U>,
        U: Hash + PartialEq + ?Sized,
    {
        let hash = self.hash_builder.hash(key);
        let (i1, i2) = self.candidate_buckets(hash);
        if let Some(slot) = self.keys.find_key(i1, key) {
            return Some((i1, slot));
        }
        self.keys.find_key(i2, key).map(|slot| (i2, slot))
    }

    /// Returns `true` if the table contains `key`.
    pub fn contains<U>(&self, key: &U) -> bool
    where
        T: Borrow<U>,
        U: Hash + PartialEq + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Begins a new lookup round. Each bucket's seed can be bumped at most once per round, so a
    /// burst of colliding queries against the same bucket does not race the seed past the
    /// fingerprints' ability to separate.
    ///
    /// The round counter saturates at `u8::max_value()`; a wrapped counter would fall behind
    /// every seed and silently stop all seed bumps.
    pub fn start_lookup(&mut self) {
        self.round = self.round.saturating_add(1);
    }

    /// Checks `key` (which must not be stored in the table) against the fingerprints of its two
    /// candidate buckets and bumps the seed of each colliding bucket, at most once per round.
    ///
    /// Returns the colliding slot in the primary and alternate bucket, or `None` for a bucket
    /// with no collision under its current seed.
    pub fn lookup<U>(&mut self, key: &U) -> (Option<usize>, Option<usize>)
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash(key);
        let (i1, i2) = self.candidate_buckets(hash);
        let first = self.lookup_in_bucket(key, hash, i1);
        let second = if i2 == i1 {
            None
        } else {
            self.lookup_in_bucket(key, hash, i2)
        };
        (first, second)
    }

    fn lookup_in_bucket<U>(&mut self, key: &U, hash: u64, bucket: usize) -> Option<usize>
    where
        T: Borrow<U>,
        U: Hash + ?Sized,
    {
        let seed = self.seeds[bucket];
        let query_tag = self.seeded_tag(key, hash, seed);
        let slot = (0..SLOTS_PER_BUCKET).find(|&slot| {
            self.keys.slot(bucket, slot).map_or(false, |stored| {
                let stored_hash = self.hash_builder.hash(stored);
                self.seeded_tag(stored, stored_hash, seed) == query_tag
            })
        })?;
        if seed < self.round {
            self.seeds[bucket] += 1;
        }
        Some(slot)
    }

    /// Returns the number of buckets whose seed was bumped in the current round. The caller's
    /// convergence loop is done when a whole lookup round reports no collisions.
    pub fn rehashed_buckets(&self) -> usize {
        self.seeds.iter().filter(|&&seed| seed == self.round).count()
    }

    /// Exports the fingerprint of every slot under its bucket's final seed, 0 for empty slots.
    pub fn export_fingerprints(&self) -> Vec<[u32; SLOTS_PER_BUCKET]> {
        (0..self.num_buckets())
            .map(|bucket| {
                let seed = self.seeds[bucket];
                let mut tags = [0; SLOTS_PER_BUCKET];
                for (slot, tag) in tags.iter_mut().enumerate() {
                    if let Some(key) = self.keys.slot(bucket, slot) {
                        let hash = self.hash_builder.hash(key);
                        *tag = self.seeded_tag(key, hash, seed);
                    }
                }
                tags
            })
            .collect()
    }

    /// Returns the per-bucket seeds.
    pub fn seeds(&self) -> &[u8] {
        &self.seeds
    }

    /// Returns how many buckets ended up at each seed value.
    pub fn seed_histogram(&self) -> BTreeMap<u8, usize> {
        let mut histogram = BTreeMap::new();
        for &seed in &self.seeds {
            *histogram.entry(seed).or_insert(0) += 1;
        }
        histogram
    }

    /// Returns the current lookup round.
    pub fn lookup_round(&self) -> u8 {
        self.round
    }

    /// Returns the number of keys in the table.
    pub fn len(&self) -> usize {
        self.keys.occupied_len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of key slots in the table.
    pub fn capacity(&self) -> usize {
        self.num_buckets() * SLOTS_PER_BUCKET
    }

    /// Returns the number of buckets in the table.
    pub fn num_buckets(&self) -> usize {
        self.keys.num_buckets()
    }

    /// Returns the fraction of occupied slots.
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.capacity() as f64
    }

    /// Returns the number of bits in each exported fingerprint.
    pub fn fingerprint_bit_count(&self) -> usize {
        self.fingerprint_bit_count
    }

    /// Returns a reference to the table's addressing scheme.
    pub fn addressing(&self) -> &A {
        &self.addressing
    }

    /// Returns a reference to the table's hash builder.
    pub fn hasher(&self) -> &H {
        &self.hash_builder
    }
}

#[cfg(test)]
mod tests {
    use super::{CuckooHashtable, TableError, VacuumHashtable};
    use crate::cuckoo::addressing::AddressingScheme;
    use crate::util::tests::{hash_builder_1, hash_builder_2};
    use crate::util::HashFamily;

    #[test]
    fn test_default_constructors() {
        let mut cuckoo = CuckooHashtable::<u64>::new(64);
        assert!(cuckoo.insert(17).is_ok());
        assert!(cuckoo.contains(&17));

        let mut vacuum = VacuumHashtable::<u64>::from_parameters(64, 8);
        assert!(vacuum.insert(17).is_ok());
        assert!(vacuum.contains(&17));
        assert_eq!(vacuum.fingerprint_bit_count(), 8);
    }

    #[test]
    fn test_insert_find_duplicate() {
        let mut table = CuckooHashtable::<u64, _>::with_hasher(64, 12, hash_builder_1());

        for key in 0u64..32 {
            table.insert(key).unwrap();
        }
        assert_eq!(table.len(), 32);
        for key in 0u64..32 {
            assert!(table.find(&key).is_some());
            assert!(table.contains(&key));
        }
        assert!(!table.contains(&99u64));

        assert_eq!(table.insert(0), Err(TableError::DuplicateKey));
        assert_eq!(table.len(), 32);
    }

    #[test]
    fn test_bfs_displacement_reaches_high_load() {
        // 16 buckets, 64 slots; filling to 90% forces eviction paths.
        let mut table = CuckooHashtable::<u64, _>::with_hasher(64, 12, hash_builder_1());

        for key in 0u64..58 {
            table.insert(key).unwrap();
        }
        assert_eq!(table.len(), 58);
        for key in 0u64..58 {
            assert!(table.contains(&key));
        }
    }

    #[test]
    fn test_walk_displacement_reaches_high_load() {
        let mut table = VacuumHashtable::<u64, _>::with_hasher(4096, 12, hash_builder_2());
        let item_count = table.capacity() * 92 / 100;

        for key in 0..item_count as u64 {
            table.insert(key).unwrap();
        }
        assert_eq!(table.len(), item_count);
        for key in 0..item_count as u64 {
            assert!(table.contains(&key));
        }
    }

    #[test]
    fn test_insert_reports_final_position() {
        // High load makes long eviction walks, which can revisit and move an already-placed
        // key; the reported position must track it to the end of the walk.
        let mut table = VacuumHashtable::<u64, _>::with_hasher(4096, 12, hash_builder_1());
        let item_count = table.capacity() * 92 / 100;

        for key in 0..item_count as u64 {
            let (bucket, slot) = table.insert(key).unwrap();
            assert_eq!(table.keys.slot(bucket, slot), Some(&key));
        }
    }

    #[test]
    fn test_lookup_round_saturates() {
        let mut table = VacuumHashtable::<u64, _>::with_hasher(64, 8, hash_builder_1());
        table.round = u8::max_value() - 1;

        table.start_lookup();
        assert_eq!(table.lookup_round(), u8::max_value());
        table.start_lookup();
        assert_eq!(table.lookup_round(), u8::max_value());
    }

    #[test]
    fn test_initial_seeds_are_zero() {
        let table = VacuumHashtable::<u64, _>::with_hasher(100, 12, hash_builder_1());
        assert!(table.seeds().iter().all(|&seed| seed == 0));
        assert_eq!(table.seed_histogram()[&0], table.num_buckets());
        assert_eq!(table.lookup_round(), 0);
    }

    #[test]
    fn test_lookup_convergence() {
        let mut table = VacuumHashtable::<u64, _>::with_hasher(1024, 8, hash_builder_1());
        let stored = (0u64..300).map(|key| key * 2).collect::<Vec<_>>();
        let queries = (0u64..1000).map(|key| key * 2 + 1).collect::<Vec<_>>();

        for &key in &stored {
            table.insert(key).unwrap();
        }

        let mut rounds = 0;
        loop {
            table.start_lookup();
            let mut collisions = 0;
            for query in &queries {
                let (first, second) = table.lookup(query);
                if first.is_some() || second.is_some() {
                    collisions += 1;
                }
            }
            if collisions == 0 {
                break;
            }
            rounds += 1;
            assert!(rounds < 64, "seed perturbation failed to converge");
        }

        // Re-derive every query's candidate tags against the exported layout; none may match.
        let fingerprints = table.export_fingerprints();
        let seeds = table.seeds();
        for query in &queries {
            let hash = table.hasher().hash(query);
            let i1 = table.addressing().primary_index(hash);
            let i2 = table.addressing().alternate_index(i1, hash);
            for &bucket in &[i1, i2] {
                let tag = {
                    let seeded = if seeds[bucket] == 0 {
                        hash
                    } else {
                        table.hasher().hash_seeded(query, seeds[bucket])
                    };
                    let tag = seeded as u32 & 0xFF;
                    tag + (tag == 0) as u32
                };
                assert!(fingerprints[bucket].iter().all(|&stored| stored != tag));
            }
        }

        // Stored keys keep their exported fingerprints by construction.
        for &key in &stored {
            let (bucket, slot) = table.find(&key).unwrap();
            assert_ne!(fingerprints[bucket][slot], 0);
        }
        assert!(table.rehashed_buckets() == 0);
    }
}
