//! Fixed-length sequence of bits.

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};
use std::mem;
use std::ops::Index;

const BLOCK_BIT_COUNT: usize = mem::size_of::<u8>() * 8;

/// A fixed-length sequence of bits implemented using a `Vec<u8>`.
///
/// Backs one level of a bloom filter cascade: each level owns one `BitVec` sized for its own
/// insertion set.
///
/// # Examples
///
/// ```
/// use revocation_filters::bit_vec::BitVec;
///
/// let mut bv = BitVec::new(10);
///
/// assert!(!bv[0]);
/// bv.set(0, true);
/// assert!(bv[0]);
///
/// assert_eq!(bv.count_ones(), 1);
/// assert_eq!(bv.count_zeros(), 9);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct BitVec {
    blocks: Vec<u8>,
    len: usize,
}

impl BitVec {
    /// Constructs a new `BitVec` with `len` bits, all initialized to zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::bit_vec::BitVec;
    ///
    /// let bv = BitVec::new(10);
    /// assert_eq!(bv.len(), 10);
    /// ```
    pub fn new(len: usize) -> Self {
        BitVec {
            blocks: vec![0; (len + BLOCK_BIT_COUNT - 1) / BLOCK_BIT_COUNT],
            len,
        }
    }

    /// Sets the bit at index `index` to `bit`.
    ///
    /// # Panics
    ///
    /// Panics if attempt to set an index out-of-bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(10);
    /// bv.set(1, true);
    ///
    /// assert!(bv[1]);
    /// ```
    pub fn set(&mut self, index: usize, bit: bool) {
        assert!(index < self.len);
        let mask = 1 << (index % BLOCK_BIT_COUNT);
        if bit {
            self.blocks[index / BLOCK_BIT_COUNT] |= mask;
        } else {
            self.blocks[index / BLOCK_BIT_COUNT] &= !mask;
        }
    }

    /// Returns the bit at index `index`, or `None` if the index is out-of-bounds.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.blocks[index / BLOCK_BIT_COUNT] & (1 << (index % BLOCK_BIT_COUNT)) != 0)
    }

    /// Sets all bits to `bit`.
    ///
    /// # Examples
    ///
    /// ```
    /// use revocation_filters::bit_vec::BitVec;
    ///
    /// let mut bv = BitVec::new(10);
    /// bv.set_all(true);
    ///
    /// assert_eq!(bv.count_ones(), 10);
    /// ```
    pub fn set_all(&mut self, bit: bool) {
        let block = if bit { !0 } else { 0 };
        for existing_block in &mut self.blocks {
            *existing_block = block;
        }
        self.clear_extra_bits();
    }

    // Bits past `len` in the last block must stay zero so the popcounts are exact.
    fn clear_extra_bits(&mut self) {
        let extra_bits = self.len % BLOCK_BIT_COUNT;
        if extra_bits > 0 {
            if let Some(last_block) = self.blocks.last_mut() {
                *last_block &= (1 << extra_bits) - 1;
            }
        }
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| block.count_ones() as usize)
            .sum()
    }

    /// Returns the number of unset bits.
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// Returns the number of bits in the `BitVec`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the `BitVec` has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes used by the underlying block storage.
    pub fn size_in_bytes(&self) -> usize {
        self.blocks.len()
    }
}

impl Index<usize> for BitVec {
    type Output = bool;

    fn index(&self, index: usize) -> &Self::Output {
        assert!(index < self.len);
        let value = self.blocks[index / BLOCK_BIT_COUNT] & (1 << (index % BLOCK_BIT_COUNT)) != 0;
        if value {
            &true
        } else {
            &false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BitVec;

    #[test]
    fn test_new() {
        let bv = BitVec::new(10);
        assert_eq!(bv.len(), 10);
        assert!(!bv.is_empty());
        assert_eq!(bv.count_ones(), 0);
        assert_eq!(bv.count_zeros(), 10);
    }

    #[test]
    fn test_set_get() {
        let mut bv = BitVec::new(10);
        bv.set(3, true);
        bv.set(9, true);

        assert!(bv[3]);
        assert!(bv[9]);
        assert!(!bv[0]);
        assert_eq!(bv.get(3), Some(true));
        assert_eq!(bv.get(10), None);
        assert_eq!(bv.count_ones(), 2);

        bv.set(3, false);
        assert!(!bv[3]);
        assert_eq!(bv.count_ones(), 1);
    }

    #[test]
    fn test_set_all() {
        let mut bv = BitVec::new(13);
        bv.set_all(true);
        assert_eq!(bv.count_ones(), 13);
        assert_eq!(bv.count_zeros(), 0);

        bv.set_all(false);
        assert_eq!(bv.count_ones(), 0);
    }

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(BitVec::new(8).size_in_bytes(), 1);
        assert_eq!(BitVec::new(9).size_in_bytes(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_ser_de() {
        let mut bv = BitVec::new(10);
        bv.set(4, true);

        let serialized_bv = bincode::serialize(&bv).unwrap();
        let de_bv: BitVec = bincode::deserialize(&serialized_bv).unwrap();

        assert_eq!(bv, de_bv);
    }
}
