//! Evenly Spread Keys
//!
//! Generates N short, evenly spaced keys for rewriting a whole collection
//! in one pass.

use std::vec;

/// Bit masks selecting `k` evenly spaced letters out of `b..=z` for `k < 13`.
///
/// Bit `i` selects the letter `'b' + i`. Larger counts use the complement
/// of the mask for `25 - k`.
const PARTIAL_ALPHABETS: [u32; 13] = [
    0, 4096, 65792, 528416, 1081872, 2167048, 2376776, 4756004, 4794660, 5411476, 9775442,
    11097386, 11184810,
];

/// Mask with all 25 letters `b..=z` selected
const FULL_ALPHABET: u32 = (1 << 25) - 1;

/// Returns `count` evenly spaced letters from `b..=z`.
fn partial_alphabet(count: usize) -> Vec<u8> {
    let bits = match count {
        0..=12 => PARTIAL_ALPHABETS[count],
        13..=24 => FULL_ALPHABET - PARTIAL_ALPHABETS[25 - count],
        _ => FULL_ALPHABET,
    };
    (0..25u8)
        .filter(|bit| bits & (1 << bit) != 0)
        .map(|bit| b'b' + bit)
        .collect()
}

fn strip_trailing_a(key: &mut Vec<u8>) {
    while key.last() == Some(&b'a') {
        key.pop();
    }
}

/// Lazy generator of evenly spread keys.
///
/// Keys have length `L = floor(log26(count)) + 1` at most. Every prefix of
/// length `L - 1` (except the smallest) is itself emitted, followed by a run
/// of suffix letters; the runs share the remainder via a fractional
/// accumulator so exactly `count` keys come out, strictly increasing.
///
/// `Spread` is `Clone`, so a sequence can be restarted from any point.
#[derive(Debug, Clone)]
pub struct Spread {
    /// Number of leading characters fixed per prefix (`L - 1`)
    width: u32,
    /// Number of prefixes (`26^(L-1)`)
    prefixes: u128,
    /// Suffix letters per prefix before leaps
    part: usize,
    /// Accumulator step and threshold, scaled by `2 * prefixes` to stay exact
    leap_step: u128,
    leap_total: u128,
    leap_unit: u128,
    alphabets: [Vec<u8>; 2],
    next_prefix: u128,
    remaining: usize,
    buffer: vec::IntoIter<String>,
}

impl Spread {
    pub fn new(count: usize) -> Self {
        let total = count as u128;
        let mut width = 0u32;
        let mut prefixes = 1u128;
        while count > 0 && prefixes * 26 <= total {
            width += 1;
            prefixes *= 26;
        }

        let numerator = (total + 1).saturating_sub(prefixes);
        let part = (numerator / prefixes) as usize;
        let remainder = numerator % prefixes;

        Self {
            width,
            prefixes,
            part,
            leap_step: remainder * 2,
            leap_total: prefixes,
            leap_unit: prefixes * 2,
            alphabets: [partial_alphabet(part), partial_alphabet(part + 1)],
            next_prefix: if count == 0 { prefixes } else { 0 },
            remaining: count,
            buffer: Vec::new().into_iter(),
        }
    }

    /// Key prefix (length `width`) for the prefix with the given index.
    fn prefix(&self, mut index: u128) -> Vec<u8> {
        let mut prefix = vec![b'a'; self.width as usize];
        for slot in prefix.iter_mut().rev() {
            *slot = b'a' + (index % 26) as u8;
            index /= 26;
        }
        prefix
    }

    /// Produces every key belonging to the next prefix.
    fn fill(&mut self) -> bool {
        if self.next_prefix >= self.prefixes {
            return false;
        }
        let index = self.next_prefix;
        self.next_prefix += 1;

        let prefix = self.prefix(index);
        let mut keys = Vec::new();
        if index > 0 {
            let mut own = prefix.clone();
            strip_trailing_a(&mut own);
            keys.push(own);
        }

        // An exact tie does not leap
        self.leap_total += self.leap_step;
        let leap = usize::from(self.leap_total > self.leap_unit);
        if leap == 1 {
            self.leap_total -= self.leap_unit;
        }

        for &letter in self.alphabets[leap].iter().take(self.part + leap) {
            let mut key = prefix.clone();
            key.push(letter);
            keys.push(key);
        }

        self.buffer = keys
            .into_iter()
            .map(|key| key.into_iter().map(char::from).collect())
            .collect::<Vec<String>>()
            .into_iter();
        true
    }
}

impl Iterator for Spread {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(key) = self.buffer.next() {
                self.remaining -= 1;
                return Some(key);
            }
            if !self.fill() {
                return None;
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Spread {}

/// Returns `count` evenly spaced, strictly increasing keys.
///
/// ```
/// use order_key::spread_keys;
///
/// assert_eq!(spread_keys(5), ["e", "j", "n", "r", "w"]);
/// assert!(spread_keys(0).is_empty());
/// ```
pub fn spread_keys(count: usize) -> Vec<String> {
    Spread::new(count).collect()
}
