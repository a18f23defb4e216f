//! Midpoint Keys
//!
//! Produces a key strictly between two keys, treating empty bounds as
//! the start and end of the sequence.

use crate::{ABOVE_Z, BELOW_A};

/// Returns a key strictly between `prev` and `next`.
///
/// An empty `prev` means "start of sequence" and an empty `next` means
/// "end of sequence". When both are non-empty the caller must guarantee
/// `prev < next`; otherwise the result is meaningless (but never a panic).
///
/// ```
/// use order_key::mid_key;
///
/// assert_eq!(mid_key("", ""), "n");
/// assert_eq!(mid_key("a", "b"), "an");
/// assert_eq!(mid_key("z", ""), "zn");
/// ```
pub fn mid_key(prev: &str, next: &str) -> String {
    let prev = prev.as_bytes();
    let next = next.as_bytes();
    let lower = |pos: usize| prev.get(pos).copied().unwrap_or(BELOW_A);
    let upper = |pos: usize| next.get(pos).copied().unwrap_or(ABOVE_Z);

    // Find the leftmost position where the bounds diverge
    let mut pos = 0;
    let (mut p, mut n) = (lower(0), upper(0));
    while p == n {
        pos += 1;
        p = lower(pos);
        n = upper(pos);
    }
    pos += 1;

    let mut key: Vec<u8> = prev.iter().take(pos - 1).copied().collect();

    if p == BELOW_A {
        // prev is a prefix of next: nothing sorts below 'a', so match them
        while n == b'a' {
            n = upper(pos);
            pos += 1;
            key.push(b'a');
        }
        if n == b'b' {
            key.push(b'a');
            n = ABOVE_Z;
        }
    } else if u16::from(p) + 1 == u16::from(n) {
        // Consecutive characters: keep prev's and go one level deeper
        key.push(p);
        n = ABOVE_Z;
        loop {
            p = lower(pos);
            pos += 1;
            if p != b'z' {
                break;
            }
            key.push(b'z');
        }
    }

    let mid = (u16::from(p) + u16::from(n)).div_ceil(2);
    key.push(mid as u8);
    key.into_iter().map(char::from).collect()
}

/// Checks that `key` is a well-formed stored key.
///
/// Stored keys are non-empty, lowercase `a`-`z` only, and never end in
/// `'a'` (a trailing `'a'` leaves no room to insert before it).
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_lowercase()) && !key.ends_with('a')
}

/// Checks the `mid_key` precondition, with empty strings as open bounds.
pub fn is_strictly_ordered(prev: &str, next: &str) -> bool {
    prev.is_empty() || next.is_empty() || prev < next
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mid_key_literals() {
        assert_eq!(mid_key("", ""), "n");
        assert_eq!(mid_key("", "n"), "g");
        assert_eq!(mid_key("a", ""), "n");
        assert_eq!(mid_key("z", ""), "zn");
        assert_eq!(mid_key("a", "b"), "an");
        assert_eq!(mid_key("a", "c"), "b");
        assert_eq!(mid_key("nn", "nz"), "nt");
    }

    #[test]
    fn test_mid_key_prefix_bounds() {
        // Leading 'a's of next are copied since nothing sorts below 'a'
        assert_eq!(mid_key("", "b"), "an");
        assert_eq!(mid_key("", "ab"), "aan");
        assert_eq!(mid_key("n", "nb"), "nan");
        let key = mid_key("", "aab");
        assert!(key.as_str() < "aab");
    }

    #[test]
    fn test_mid_key_trailing_z() {
        let key = mid_key("mz", "n");
        assert!("mz" < key.as_str() && key.as_str() < "n");
        assert_eq!(key, "mzn");

        let key = mid_key("mzz", "n");
        assert_eq!(key, "mzzn");
    }

    #[test]
    fn test_repeated_insertion_at_head_grows_slowly() {
        let mut next = String::from("n");
        for _ in 0..50 {
            let key = mid_key("", &next);
            assert!(key < next);
            next = key;
        }
        assert!(next.len() < 20, "head insertions grew to {}", next.len());
    }

    #[test]
    fn test_repeated_insertion_at_tail() {
        let mut prev = String::from("n");
        for _ in 0..50 {
            let key = mid_key(&prev, "");
            assert!(key > prev);
            assert!(is_valid_key(&key));
            prev = key;
        }
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("n"));
        assert!(is_valid_key("zzn"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("ba"));
        assert!(!is_valid_key("Nn"));
        assert!(!is_valid_key("n1"));
    }

    #[test]
    fn test_is_strictly_ordered() {
        assert!(is_strictly_ordered("", ""));
        assert!(is_strictly_ordered("b", ""));
        assert!(is_strictly_ordered("", "b"));
        assert!(is_strictly_ordered("b", "c"));
        assert!(!is_strictly_ordered("c", "c"));
        assert!(!is_strictly_ordered("d", "c"));
    }

    fn valid_key() -> impl Strategy<Value = String> {
        "[a-z]{0,5}[b-z]"
    }

    proptest! {
        #[test]
        fn prop_mid_key_between_bounds(a in valid_key(), b in valid_key()) {
            prop_assume!(a != b);
            let (prev, next) = if a < b { (a, b) } else { (b, a) };
            let key = mid_key(&prev, &next);
            prop_assert!(prev < key, "{} !< {}", prev, key);
            prop_assert!(key < next, "{} !< {}", key, next);
            prop_assert!(is_valid_key(&key));
        }

        #[test]
        fn prop_mid_key_open_bounds(k in valid_key()) {
            let after = mid_key(&k, "");
            prop_assert!(after > k);
            let before = mid_key("", &k);
            prop_assert!(before < k);
            prop_assert!(!before.is_empty());
        }
    }
}
