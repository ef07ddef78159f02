//! Full-key bucket storage for the exact staging hashtables.

use crate::cuckoo::SLOTS_PER_BUCKET;
use std::borrow::Borrow;

/// A fixed array of 4-slot buckets storing whole keys. Unlike `TagTable` this keeps the original
/// items, so the staging hashtables can re-derive fingerprints under new per-bucket seeds.
#[derive(Clone, Debug)]
pub(crate) struct KeyTable<T> {
    buckets: Vec<[Option<T>; SLOTS_PER_BUCKET]>,
    occupied_len: usize,
}

impl<T> KeyTable<T> {
    pub fn new(num_buckets: usize) -> Self {
        KeyTable {
            buckets: (0..num_buckets).map(|_| Default::default()).collect(),
            occupied_len: 0,
        }
    }

    pub fn slot(&self, bucket: usize, slot: usize) -> Option<&T> {
        self.buckets[bucket][slot].as_ref()
    }

    /// Returns the slot holding `key` in `bucket`, if present.
    pub fn find_key<U>(&self, bucket: usize, key: &U) -> Option<usize>
    where
        T: Borrow<U>,
        U: PartialEq + ?Sized,
    {
        self.buckets[bucket]
            .iter()
            .position(|slot| slot.as_ref().map_or(false, |item| item.borrow() == key))
    }

    /// Places `key` in the first empty slot of `bucket`, returning the slot. A full bucket hands
    /// the key back unchanged.
    pub fn insert_in_empty_slot(&mut self, bucket: usize, key: T) -> Result<usize, T> {
        match self.buckets[bucket].iter().position(Option::is_none) {
            Some(slot) => {
                self.buckets[bucket][slot] = Some(key);
                self.occupied_len += 1;
                Ok(slot)
            }
            None => Err(key),
        }
    }

    /// Swaps `key` into `(bucket, slot)` and returns the previous occupant, if any.
    pub fn replace_slot(&mut self, bucket: usize, slot: usize, key: T) -> Option<T> {
        let old = self.buckets[bucket][slot].replace(key);
        if old.is_none() {
            self.occupied_len += 1;
        }
        old
    }

    pub fn erase_slot(&mut self, bucket: usize, slot: usize) -> Option<T> {
        let old = self.buckets[bucket][slot].take();
        if old.is_some() {
            self.occupied_len -= 1;
        }
        old
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn occupied_len(&self) -> usize {
        self.occupied_len
    }
}
