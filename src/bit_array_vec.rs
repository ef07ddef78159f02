//! Packed list of fixed-width unsigned values.

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

const BLOCK_BIT_COUNT: usize = 64;

/// A fixed-length list of unsigned values, each `bit_count` bits wide, packed into `u64` blocks.
///
/// Backs the fingerprint slots of the cuckoo and vacuum filters: one entry per slot, value 0
/// reserved as the empty-slot sentinel, so fingerprints stored here are nonzero by construction.
///
/// # Examples
///
/// ```
/// use revocation_filters::bit_array_vec::BitArrayVec;
///
/// let mut bav = BitArrayVec::new(12, 8);
///
/// bav.set(3, 0xABC);
/// assert_eq!(bav.get(3), 0xABC);
/// assert_eq!(bav.occupied_len(), 1);
///
/// bav.set(3, 0);
/// assert_eq!(bav.occupied_len(), 0);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct BitArrayVec {
    blocks: Vec<u64>,
    bit_count: usize,
    occupied_len: usize,
    len: usize,
}

impl BitArrayVec {
    /// Constructs a new `BitArrayVec` holding `len` values of `bit_count` bits each, all
    /// initialized to zero.
    ///
    /// # Panics
    ///
    /// Panics if `bit_count` is 0 or greater than 32.
    pub fn new(bit_count: usize, len: usize) -> Self {
        assert!(bit_count > 0 && bit_count <= 32);
        BitArrayVec {
            blocks: vec![0; (bit_count * len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT],
            bit_count,
            occupied_len: 0,
            len,
        }
    }

    #[inline]
    fn value_mask(&self) -> u64 {
        (1 << self.bit_count) - 1
    }

    /// Returns the value at index `index`.
    ///
    /// # Panics
    ///
    /// Panics if attempt to get an index out-of-bounds.
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.len);
        let bit_offset = index * self.bit_count;
        let block = bit_offset / BLOCK_BIT_COUNT;
        let offset = bit_offset % BLOCK_BIT_COUNT;
        let mut value = self.blocks[block] >> offset;
        if offset + self.bit_count > BLOCK_BIT_COUNT {
            value |= self.blocks[block + 1] << (BLOCK_BIT_COUNT - offset);
        }
        value & self.value_mask()
    }

    /// Sets the value at index `index` to the low `bit_count` bits of `value`.
    ///
    /// # Panics
    ///
    /// Panics if attempt to set an index out-of-bounds, or if `value` does not fit in
    /// `bit_count` bits.
    pub fn set(&mut self, index: usize, value: u64) {
        assert!(index < self.len);
        assert!(value <= self.value_mask());
        let prev = self.get(index);
        let bit_offset = index * self.bit_count;
        let block = bit_offset / BLOCK_BIT_COUNT;
        let offset = bit_offset % BLOCK_BIT_COUNT;
        self.blocks[block] &= !(self.value_mask() << offset);
        self.blocks[block] |= value << offset;
        if offset + self.bit_count > BLOCK_BIT_COUNT {
            let spill = BLOCK_BIT_COUNT - offset;
            self.blocks[block + 1] &= !(self.value_mask() >> spill);
            self.blocks[block + 1] |= value >> spill;
        }
        if prev == 0 && value != 0 {
            self.occupied_len += 1;
        } else if prev != 0 && value == 0 {
            self.occupied_len -= 1;
        }
    }

    /// Resets every value to zero.
    pub fn clear(&mut self) {
        self.occupied_len = 0;
        for block in &mut self.blocks {
            *block = 0;
        }
    }

    /// Returns the number of values in the `BitArrayVec`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the `BitArrayVec` holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of nonzero values.
    pub fn occupied_len(&self) -> usize {
        self.occupied_len
    }

    /// Returns the width in bits of each value.
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Returns the number of bytes used by the underlying block storage.
    pub fn size_in_bytes(&self) -> usize {
        self.blocks.len() * 8
    }
}

#[cfg(test)]
mod tests {
    use super::BitArrayVec;

    #[test]
    fn test_bit_count_12() {
        let mut bav = BitArrayVec::new(12, 16);
        assert_eq!(bav.len(), 16);
        assert_eq!(bav.bit_count(), 12);

        for i in 0..16 {
            bav.set(i, (i + 1) as u64);
            assert_eq!(bav.occupied_len(), i + 1);
        }
        for i in 0..16 {
            assert_eq!(bav.get(i), (i + 1) as u64);
        }

        bav.set(0, 0xFFF);
        assert_eq!(bav.get(0), 0xFFF);
        assert_eq!(bav.get(1), 2);
        assert_eq!(bav.occupied_len(), 16);

        for i in 0..16 {
            bav.set(i, 0);
            assert_eq!(bav.occupied_len(), 16 - i - 1);
        }
    }

    #[test]
    fn test_values_spanning_blocks() {
        // 13-bit values straddle the u64 boundary at index 4 (bits 52..65)
        let mut bav = BitArrayVec::new(13, 10);
        for i in 0..10 {
            bav.set(i, 0x1000 | i as u64);
        }
        for i in 0..10 {
            assert_eq!(bav.get(i), 0x1000 | i as u64);
        }
    }

    #[test]
    fn test_clear() {
        let mut bav = BitArrayVec::new(8, 4);
        bav.set(0, 1);
        bav.set(3, 255);
        bav.clear();

        assert_eq!(bav.occupied_len(), 0);
        assert_eq!(bav.get(0), 0);
        assert_eq!(bav.get(3), 0);
    }

    #[test]
    #[should_panic]
    fn test_set_value_too_wide() {
        let mut bav = BitArrayVec::new(8, 4);
        bav.set(0, 256);
    }

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(BitArrayVec::new(12, 16).size_in_bytes(), 24);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_ser_de() {
        let mut bav = BitArrayVec::new(12, 16);
        bav.set(5, 77);

        let serialized_bav = bincode::serialize(&bav).unwrap();
        let de_bav: BitArrayVec = bincode::deserialize(&serialized_bav).unwrap();

        assert_eq!(bav, de_bav);
    }
}
