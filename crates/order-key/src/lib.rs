//! Order Keys
//!
//! Lexicographic fractional indexing for sibling ordering.
//! Keys are lowercase `a`-`z` strings compared byte-wise, so a new key can
//! always be synthesized between two existing ones without renumbering.
//!
//! - mid: a single key between two bounds
//! - spread: N evenly spaced keys for rebalancing a whole collection
//! - placement: the key directly before or after an anchor

mod mid;
mod placement;
mod spread;

pub use mid::{is_strictly_ordered, is_valid_key, mid_key};
pub use placement::{key_beside, Placement};
pub use spread::{spread_keys, Spread};

/// One below `'a'`: what a position past the end of the lower bound reads as
pub(crate) const BELOW_A: u8 = b'a' - 1;

/// One above `'z'`: what a position past the end of the upper bound reads as
pub(crate) const ABOVE_Z: u8 = b'z' + 1;
