//! Anchor Placement
//!
//! Keys for dropping an item directly before or after an anchor sibling.

use crate::{is_strictly_ordered, mid_key};

/// Which side of the anchor a dropped item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
}

impl Placement {
    /// Side implied by the drag direction.
    ///
    /// Moving down within the same collection lands after the anchor;
    /// moving up, or arriving from another collection, lands before it.
    pub fn from_drag(source_index: Option<usize>, anchor_index: usize) -> Self {
        match source_index {
            Some(source) if source < anchor_index => Placement::After,
            _ => Placement::Before,
        }
    }
}

/// Key directly before or after `keys[anchor]`.
///
/// `keys` must be sorted and must not contain the item being placed.
/// Returns `None` when the anchor is out of range or the bounding keys are
/// not strictly ordered (a stale view of the siblings).
pub fn key_beside<S: AsRef<str>>(keys: &[S], anchor: usize, placement: Placement) -> Option<String> {
    let anchor_key = keys.get(anchor)?.as_ref();
    let (prev, next) = match placement {
        Placement::Before => {
            let prev = match anchor.checked_sub(1) {
                Some(i) => keys[i].as_ref(),
                None => "",
            };
            (prev, anchor_key)
        }
        Placement::After => {
            let next = keys.get(anchor + 1).map(|k| k.as_ref()).unwrap_or("");
            (anchor_key, next)
        }
    };
    if !is_strictly_ordered(prev, next) || (prev.is_empty() && next.is_empty()) {
        return None;
    }
    Some(mid_key(prev, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_from_drag() {
        assert_eq!(Placement::from_drag(Some(0), 2), Placement::After);
        assert_eq!(Placement::from_drag(Some(3), 1), Placement::Before);
        assert_eq!(Placement::from_drag(None, 0), Placement::Before);
    }

    #[test]
    fn test_key_beside() {
        let keys = ["g", "n", "t"];
        assert_eq!(key_beside(&keys, 0, Placement::Before).as_deref(), Some("d"));
        assert_eq!(key_beside(&keys, 1, Placement::Before).as_deref(), Some("k"));
        assert_eq!(key_beside(&keys, 1, Placement::After).as_deref(), Some("q"));
        assert_eq!(key_beside(&keys, 2, Placement::After).as_deref(), Some("x"));
    }

    #[test]
    fn test_key_beside_rejects_bad_input() {
        assert_eq!(key_beside(&["g"], 3, Placement::After), None);
        assert_eq!(key_beside(&["n", "n"], 1, Placement::Before), None);
        assert_eq!(key_beside(&["t", "g"], 0, Placement::After), None);
    }
}
