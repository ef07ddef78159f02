//! # revocation-filters
//!
//! `revocation-filters` implements exact and approximate set-membership structures for
//! classifying 64-bit identifiers into two disjoint universes, conventionally called the revoked
//! and unrevoked sets. Every structure guarantees no false negatives over the revoked set; the
//! pairing and cascade constructions additionally drive false positives over the unrevoked set
//! to zero:
//!
//! - [`cuckoo::CuckooFilter`] and [`cuckoo::VacuumFilter`]: approximate filters storing small
//!   fingerprint tags in bucketed cuckoo tables, with plain power-of-two and segmented
//!   alternate-range addressing respectively.
//! - [`cuckoo::CuckooHashtable`] and [`cuckoo::VacuumHashtable`]: exact staging hashtables that
//!   store whole keys and perturb per-bucket hash seeds until no key of a query set collides
//!   with a stored fingerprint.
//! - [`cuckoo::CuckooPair`] and [`cuckoo::VacuumPair`]: a staging hashtable plus the compact
//!   filter exported from its converged layout, answering membership with zero false positives
//!   over the query set.
//! - [`bloom::BloomCascade`]: a cascade of bloom filters with alternating roles that classifies
//!   every key of both sets exactly.
//!
//! ## References
//!
//!  - [Cuckoo Filter: Practically Better Than Bloom](https://dl.acm.org/citation.cfm?id=2674994)
//!  > Fan, Bin, Dave G. Andersen, Michael Kaminsky, and Michael D. Mitzenmacher. 2014. “Cuckoo
//!  > Filter: Practically Better Than Bloom.” In *Proceedings of the 10th Acm International on
//!  > Conference on Emerging Networking Experiments and Technologies*, 75–88. CoNEXT ’14. New
//!  > York, NY, USA: ACM. doi:[10.1145/2674005.2674994](https://doi.org/10.1145/2674005.2674994).
//!  - [Vacuum Filters: More Space-Efficient and Faster Replacement for Bloom and Cuckoo
//!    Filters](https://doi.org/10.14778/3364324.3364333)
//!  > Wang, Minmei, Mingxun Zhou, Shouqian Shi, and Chen Qian. 2019. “Vacuum Filters: More
//!  > Space-Efficient and Faster Replacement for Bloom and Cuckoo Filters.” *Proc. VLDB Endow.*
//!  > 13 (2): 197–210. doi:[10.14778/3364324.3364333](https://doi.org/10.14778/3364324.3364333).
//!  - [CRLite: A Scalable System for Pushing All TLS Revocations to All
//!    Browsers](https://doi.org/10.1109/SP.2017.17)
//!  > Larisch, James, David Choffnes, Dave Levin, Bruce M. Maggs, Alan Mislove, and Christo
//!  > Wilson. 2017. “CRLite: A Scalable System for Pushing All TLS Revocations to All Browsers.”
//!  > In *2017 IEEE Symposium on Security and Privacy*, 539–56. doi:[10.1109/SP.2017.17](https://doi.org/10.1109/SP.2017.17).

#![warn(missing_docs)]

pub mod bit_array_vec;
pub mod bit_vec;
pub mod bloom;
pub mod cuckoo;
pub mod keyset;
mod util;

pub use crate::util::{HashFamily, SipHasherBuilder};
