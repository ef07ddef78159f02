//! Bucket addressing policies for the cuckoo-style tables.

use crate::cuckoo::SLOTS_PER_BUCKET;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

// 64-bit MurmurHash2 mixing constant; the XOR-multiply below forms a permutation modulo a power
// of two because the multiplier is odd.
const MURMUR_ODD_64: u64 = 0xc6a4_a793_5bd1_e995;
// 32-bit MurmurHash2 constant used by the segmented scheme's offset transform.
const MURMUR_ODD_32: u64 = 0x5bd1_e995;

/// Number of graduated alternate-range classes in the segmented scheme.
pub(crate) const ALT_RANGE_CLASSES: usize = 4;

const MIN_SEGMENT_LEN: usize = 1024;
const TARGET_SLOT_LOAD: f64 = 0.95;
const MAX_LOAD_THRESHOLD: f64 = 0.97;
const NEWTON_TOLERANCE: f64 = 0.01;
const NEWTON_MAX_ITERS: usize = 64;

/// Maps hashes to bucket indices and pairs every bucket with an alternate partner bucket.
///
/// `partner` is the keying material for the alternate index: filters pass the stored fingerprint,
/// the staging hashtables pass the key's unseeded hash so that bucket placement is stable across
/// fingerprint reseeding. Both schemes satisfy the involution property
/// `alternate_index(alternate_index(i, x), x) == i`.
pub trait AddressingScheme: Clone {
    /// Whether the eviction walk should try the alternate buckets of all four occupants of a full
    /// bucket before kicking a random one. The segmented scheme relies on this lookahead to reach
    /// high load factors.
    const BUCKET_LOOKAHEAD: bool;

    /// Returns the number of buckets in the table.
    fn num_buckets(&self) -> usize;

    /// Returns the primary bucket index for a key's 64-bit hash.
    fn primary_index(&self, hash: u64) -> usize;

    /// Returns the partner bucket of `index` under `partner`.
    fn alternate_index(&self, index: usize, partner: u64) -> usize;
}

/// Plain cuckoo addressing over a power-of-two bucket array.
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct UniformAddressing {
    index_mask: usize,
}

impl UniformAddressing {
    /// Constructs an addressing scheme sized for `max_num_keys` keys at an associativity of 4.
    /// The bucket count is the next power of two above `max_num_keys / 4`.
    pub fn new(max_num_keys: usize) -> Self {
        let num_buckets = (max_num_keys.max(1) + SLOTS_PER_BUCKET - 1) / SLOTS_PER_BUCKET;
        UniformAddressing {
            index_mask: num_buckets.next_power_of_two() - 1,
        }
    }

    /// Constructs an addressing scheme with exactly `num_buckets` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `num_buckets` is not a power of two.
    pub fn with_buckets(num_buckets: usize) -> Self {
        assert!(num_buckets.is_power_of_two());
        UniformAddressing {
            index_mask: num_buckets - 1,
        }
    }
}

impl AddressingScheme for UniformAddressing {
    const BUCKET_LOOKAHEAD: bool = false;

    fn num_buckets(&self) -> usize {
        self.index_mask + 1
    }

    fn primary_index(&self, hash: u64) -> usize {
        (hash >> 32) as usize & self.index_mask
    }

    fn alternate_index(&self, index: usize, partner: u64) -> usize {
        (index ^ partner.wrapping_mul(MURMUR_ODD_64) as usize) & self.index_mask
    }
}

/// Vacuum addressing: the bucket array is a multiple of a base segment length and alternate
/// buckets are chosen within one of four graduated ranges, keeping the expected maximum bucket
/// load under 97% of capacity at a 95% target load factor.
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentedAddressing {
    num_buckets: usize,
    segment_masks: [usize; ALT_RANGE_CLASSES],
}

impl SegmentedAddressing {
    /// Constructs an addressing scheme sized for `max_num_keys` keys at an associativity of 4.
    /// The bucket count is `max_num_keys / 4` rounded up to a multiple of the base segment
    /// length, which is itself at least 1024.
    pub fn new(max_num_keys: usize) -> Self {
        let capacity = (max_num_keys.max(1) + SLOTS_PER_BUCKET - 1) / SLOTS_PER_BUCKET;
        let base_segment = proper_alt_range(capacity, 0)
            .unwrap_or(0)
            .max(MIN_SEGMENT_LEN);
        let num_buckets = (capacity + base_segment - 1) / base_segment * base_segment;
        Self::with_segments(num_buckets, base_segment)
    }

    /// Constructs an addressing scheme for a table whose bucket count is already known (for
    /// example from the length of an exported seed table). `max_num_keys` is the capacity the
    /// table was originally sized for and determines the base segment length.
    pub fn for_buckets(max_num_keys: usize, num_buckets: usize) -> Self {
        let capacity = (max_num_keys.max(1) + SLOTS_PER_BUCKET - 1) / SLOTS_PER_BUCKET;
        let base_segment = proper_alt_range(capacity, 0)
            .unwrap_or(0)
            .max(MIN_SEGMENT_LEN);
        Self::with_segments(num_buckets, base_segment)
    }

    fn with_segments(num_buckets: usize, base_segment: usize) -> Self {
        let mut segment_masks = [base_segment - 1; ALT_RANGE_CLASSES];
        for class in 1..ALT_RANGE_CLASSES {
            segment_masks[class] = match proper_alt_range(num_buckets, class) {
                Some(range) => range - 1,
                None => base_segment - 1,
            };
        }
        // The last (smallest) range is doubled; every range is clamped to the base segment so an
        // XOR offset can never escape the segment containing the bucket.
        segment_masks[ALT_RANGE_CLASSES - 1] =
            (segment_masks[ALT_RANGE_CLASSES - 1] + 1) * 2 - 1;
        for mask in &mut segment_masks[1..] {
            *mask = (*mask).min(base_segment - 1);
        }
        SegmentedAddressing {
            num_buckets,
            segment_masks,
        }
    }

    #[cfg(test)]
    pub(crate) fn segment_masks(&self) -> [usize; ALT_RANGE_CLASSES] {
        self.segment_masks
    }
}

impl AddressingScheme for SegmentedAddressing {
    const BUCKET_LOOKAHEAD: bool = true;

    fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    fn primary_index(&self, hash: u64) -> usize {
        // Multiply-shift range reduction; the bucket count is not a power of two.
        (((hash >> 32) * self.num_buckets as u64) >> 32) as usize
    }

    fn alternate_index(&self, index: usize, partner: u64) -> usize {
        let class = (partner & (ALT_RANGE_CLASSES as u64 - 1)) as usize;
        let offset = partner.wrapping_mul(MURMUR_ODD_32) as usize & self.segment_masks[class];
        index ^ offset
    }
}

// Solves 1 + x(ln c - ln x + 1) - c = 0 by Newton iteration. The 0.01 tolerance matches the
// load estimator this is lifted from; iterations are capped and the last estimate is returned
// if the tolerance was not reached.
fn solve_equation(c: f64) -> f64 {
    let f = |x: f64| 1.0 + x * (c.ln() - x.ln() + 1.0) - c;
    let f_d = |x: f64| c.ln() - x.ln();
    let mut x = c + 0.1;
    for _ in 0..NEWTON_MAX_ITERS {
        if f(x).abs() <= NEWTON_TOLERANCE {
            break;
        }
        x -= f(x) / f_d(x);
    }
    x
}

// Expected maximum bucket load when `balls` items are thrown uniformly into `bins` buckets.
// Newton estimate in the sparse regime, normal approximation otherwise.
fn balls_in_bins_max_load(balls: f64, bins: f64) -> f64 {
    let c = balls / (bins * bins.ln());
    if c < 5.0 {
        (solve_equation(c) + 1.0) * bins.ln()
    } else {
        balls / bins + 1.5 * (2.0 * balls / bins * bins.ln()).sqrt()
    }
}

// Smallest power-of-two alternate range for range class `class` that keeps the expected maximum
// bucket occupancy below 97% of slot capacity. `num_buckets` is the table size the range is
// being chosen for. Returns `None` when even the full table fails the bound (tiny tables).
fn proper_alt_range(num_buckets: usize, class: usize) -> Option<usize> {
    let slots = SLOTS_PER_BUCKET as f64;
    let m = num_buckets as f64;
    let mut alt_range = 8;
    while alt_range < num_buckets {
        let fraction = (ALT_RANGE_CLASSES - class) as f64 / ALT_RANGE_CLASSES as f64;
        let load = balls_in_bins_max_load(
            fraction * slots * TARGET_SLOT_LOAD * m,
            m / alt_range as f64,
        );
        if load < MAX_LOAD_THRESHOLD * slots * alt_range as f64 {
            return Some(alt_range);
        }
        alt_range <<= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{
        balls_in_bins_max_load, proper_alt_range, AddressingScheme, SegmentedAddressing,
        UniformAddressing, ALT_RANGE_CLASSES,
    };

    #[test]
    fn test_uniform_bucket_count_power_of_two() {
        for &keys in &[1, 4, 100, 1000, 1 << 20] {
            let scheme = UniformAddressing::new(keys);
            assert!(scheme.num_buckets().is_power_of_two());
            assert!(scheme.num_buckets() * 4 >= keys);
        }
    }

    #[test]
    fn test_uniform_involution() {
        let scheme = UniformAddressing::new(1 << 16);
        for key in 0..1000u64 {
            let hash = key.wrapping_mul(0x9E37_79B9_7F4A_7C15);
            let i1 = scheme.primary_index(hash);
            let i2 = scheme.alternate_index(i1, hash & 0xFFF);
            assert!(i2 < scheme.num_buckets());
            assert_eq!(scheme.alternate_index(i2, hash & 0xFFF), i1);
        }
    }

    #[test]
    fn test_segmented_bucket_count_is_segment_multiple() {
        let scheme = SegmentedAddressing::new(1 << 20);
        let base_segment = scheme.segment_masks()[0] + 1;
        assert!(base_segment >= 1024);
        assert_eq!(scheme.num_buckets() % base_segment, 0);
        assert!(scheme.num_buckets() * 4 >= 1 << 20);
    }

    #[test]
    fn test_segmented_small_capacity_uses_min_segment() {
        let scheme = SegmentedAddressing::new(100);
        assert_eq!(scheme.num_buckets(), 1024);
    }

    #[test]
    fn test_segmented_involution_and_range() {
        let scheme = SegmentedAddressing::new(1 << 18);
        for key in 0..2000u64 {
            let hash = key.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0x5555;
            let i1 = scheme.primary_index(hash);
            assert!(i1 < scheme.num_buckets());
            let i2 = scheme.alternate_index(i1, hash);
            assert!(i2 < scheme.num_buckets());
            assert_eq!(scheme.alternate_index(i2, hash), i1);
        }
    }

    #[test]
    fn test_segmented_ranges_graduated() {
        let scheme = SegmentedAddressing::new(1 << 22);
        let masks = scheme.segment_masks();
        for class in 0..ALT_RANGE_CLASSES {
            assert!((masks[class] + 1).is_power_of_two());
            assert!(masks[class] <= masks[0]);
        }
    }

    #[test]
    fn test_for_buckets_matches_new() {
        let scheme = SegmentedAddressing::new(1 << 18);
        let rebuilt = SegmentedAddressing::for_buckets(1 << 18, scheme.num_buckets());
        assert_eq!(scheme, rebuilt);
    }

    #[test]
    fn test_max_load_estimator_is_finite() {
        let load = balls_in_bins_max_load(4.0 * 0.95 * 65536.0, 65536.0 / 1024.0);
        assert!(load.is_finite());
        assert!(load > 0.0);
    }

    #[test]
    fn test_proper_alt_range_small_table() {
        assert_eq!(proper_alt_range(8, 0), None);
    }

    #[test]
    fn test_proper_alt_range_grows_with_class() {
        let range_0 = proper_alt_range(1 << 20, 0).unwrap();
        let range_3 = proper_alt_range(1 << 20, 3).unwrap();
        assert!(range_3 <= range_0);
    }
}
