//! Fingerprint-only bucket storage shared by the filter variants.

use crate::bit_array_vec::BitArrayVec;
use crate::cuckoo::SLOTS_PER_BUCKET;
use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Outcome of inserting a tag into one bucket.
pub(crate) enum TagInsert {
    /// The tag was written into an empty slot.
    Inserted,
    /// The bucket was full; a uniformly random occupant was swapped out and returned.
    Kicked(u32),
    /// The bucket was full and kickout was not permitted.
    Full,
}

/// A fixed array of 4-slot buckets storing packed fingerprint tags. Tag value 0 marks an empty
/// slot; callers must only store nonzero tags.
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TagTable {
    slots: BitArrayVec,
    num_buckets: usize,
}

impl TagTable {
    pub fn new(num_buckets: usize, bit_count: usize) -> Self {
        TagTable {
            slots: BitArrayVec::new(bit_count, num_buckets * SLOTS_PER_BUCKET),
            num_buckets,
        }
    }

    #[inline]
    fn slot_index(&self, bucket: usize, slot: usize) -> usize {
        bucket * SLOTS_PER_BUCKET + slot
    }

    pub fn read_bucket(&self, bucket: usize) -> [u32; SLOTS_PER_BUCKET] {
        let mut tags = [0; SLOTS_PER_BUCKET];
        for (slot, tag) in tags.iter_mut().enumerate() {
            *tag = self.slots.get(self.slot_index(bucket, slot)) as u32;
        }
        tags
    }

    pub fn write_slot(&mut self, bucket: usize, slot: usize, tag: u32) {
        self.slots.set(self.slot_index(bucket, slot), u64::from(tag));
    }

    pub fn find_tag(&self, bucket: usize, tag: u32) -> bool {
        (0..SLOTS_PER_BUCKET)
            .any(|slot| self.slots.get(self.slot_index(bucket, slot)) == u64::from(tag))
    }

    pub fn find_tag_in_either(&self, i1: usize, i2: usize, tag1: u32, tag2: u32) -> bool {
        self.find_tag(i1, tag1) || self.find_tag(i2, tag2)
    }

    /// Inserts `tag` into the first empty slot of `bucket`. When the bucket is full and
    /// `kickout` is set, a random occupant is replaced and returned for re-insertion elsewhere.
    pub fn insert_tag<R>(&mut self, bucket: usize, tag: u32, kickout: bool, rng: &mut R) -> TagInsert
    where
        R: Rng,
    {
        for slot in 0..SLOTS_PER_BUCKET {
            if self.slots.get(self.slot_index(bucket, slot)) == 0 {
                self.write_slot(bucket, slot, tag);
                return TagInsert::Inserted;
            }
        }
        if kickout {
            let slot = rng.gen_range(0, SLOTS_PER_BUCKET);
            let old_tag = self.slots.get(self.slot_index(bucket, slot)) as u32;
            self.write_slot(bucket, slot, tag);
            TagInsert::Kicked(old_tag)
        } else {
            TagInsert::Full
        }
    }

    pub fn delete_tag(&mut self, bucket: usize, tag: u32) -> bool {
        for slot in 0..SLOTS_PER_BUCKET {
            if self.slots.get(self.slot_index(bucket, slot)) == u64::from(tag) {
                self.write_slot(bucket, slot, 0);
                return true;
            }
        }
        false
    }

    /// Writes `tag` directly into `(bucket, slot)` for table reconstruction from an exported
    /// layout. Fails if the slot is already occupied.
    pub fn copy_to_slot(&mut self, bucket: usize, slot: usize, tag: u32) -> bool {
        if self.slots.get(self.slot_index(bucket, slot)) != 0 {
            return false;
        }
        self.write_slot(bucket, slot, tag);
        true
    }

    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    pub fn occupied_len(&self) -> usize {
        self.slots.occupied_len()
    }

    pub fn capacity(&self) -> usize {
        self.num_buckets * SLOTS_PER_BUCKET
    }

    pub fn bit_count(&self) -> usize {
        self.slots.bit_count()
    }

    pub fn size_in_bytes(&self) -> usize {
        self.slots.size_in_bytes()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{TagInsert, TagTable};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn rng() -> XorShiftRng {
        XorShiftRng::seed_from_u64(7)
    }

    #[test]
    fn test_insert_find_delete() {
        let mut table = TagTable::new(8, 12);
        let mut rng = rng();

        assert!(matches!(
            table.insert_tag(3, 0xABC, false, &mut rng),
            TagInsert::Inserted
        ));
        assert!(table.find_tag(3, 0xABC));
        assert!(!table.find_tag(3, 0xABD));
        assert!(!table.find_tag(2, 0xABC));

        assert!(table.delete_tag(3, 0xABC));
        assert!(!table.delete_tag(3, 0xABC));
        assert_eq!(table.occupied_len(), 0);
    }

    #[test]
    fn test_full_bucket_without_kickout() {
        let mut table = TagTable::new(2, 8);
        let mut rng = rng();
        for tag in 1..=4 {
            assert!(matches!(
                table.insert_tag(0, tag, false, &mut rng),
                TagInsert::Inserted
            ));
        }
        assert!(matches!(
            table.insert_tag(0, 5, false, &mut rng),
            TagInsert::Full
        ));
        assert_eq!(table.occupied_len(), 4);
    }

    #[test]
    fn test_kickout_returns_existing_tag() {
        let mut table = TagTable::new(2, 8);
        let mut rng = rng();
        for tag in 1..=4 {
            table.insert_tag(0, tag, false, &mut rng);
        }
        match table.insert_tag(0, 9, true, &mut rng) {
            TagInsert::Kicked(old_tag) => {
                assert!((1..=4).contains(&old_tag));
                assert!(table.find_tag(0, 9));
                assert!(!table.find_tag(0, old_tag));
            }
            _ => panic!("expected a kicked tag"),
        }
    }

    #[test]
    fn test_read_bucket_and_write_slot() {
        let mut table = TagTable::new(2, 12);
        table.write_slot(1, 0, 7);
        table.write_slot(1, 2, 8);
        assert_eq!(table.read_bucket(1), [7, 0, 8, 0]);
        assert_eq!(table.read_bucket(0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_copy_to_slot_rejects_occupied() {
        let mut table = TagTable::new(2, 12);
        assert!(table.copy_to_slot(0, 1, 42));
        assert!(!table.copy_to_slot(0, 1, 43));
        assert_eq!(table.read_bucket(0), [0, 42, 0, 0]);
    }

    #[test]
    fn test_find_tag_in_either() {
        let mut table = TagTable::new(4, 12);
        table.write_slot(2, 0, 5);
        assert!(table.find_tag_in_either(1, 2, 9, 5));
        assert!(table.find_tag_in_either(2, 1, 5, 9));
        assert!(!table.find_tag_in_either(1, 3, 5, 5));
    }
}
