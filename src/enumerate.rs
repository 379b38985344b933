use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{CrackError, Result};

/// Ordered set of distinct characters that brute-force candidates draw from.
///
/// The order determines enumeration order; the set determines coverage.
/// A one-time shuffle changes the former and never the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Full 94-character library: lowercase, uppercase, digits, punctuation.
    pub fn full_library() -> Self {
        let mut chars = Vec::with_capacity(94);
        chars.extend('a'..='z');
        chars.extend('A'..='Z');
        chars.extend('0'..='9');
        chars.extend(r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##.chars());
        Alphabet { chars }
    }

    /// Build an alphabet from an arbitrary character string.
    /// Rejects empty input and repeated characters.
    pub fn from_chars(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            return Err(CrackError::Config("alphabet must not be empty".into()));
        }
        for (i, c) in chars.iter().enumerate() {
            if chars[..i].contains(c) {
                return Err(CrackError::Config(format!(
                    "alphabet contains duplicate character: {:?}",
                    c
                )));
            }
        }
        Ok(Alphabet { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index]
    }

    /// One-time pre-run permutation. Sometimes the target's last character
    /// lands early in the shuffled order and saves millions of iterations.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.chars.shuffle(rng);
    }

    /// The characters in enumeration order, as a display string.
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Result of one enumerator step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The counter advanced; a new candidate is available.
    Continued,
    /// The whole space of length 1..=max_len is spent. The counter was not
    /// mutated by the call that reports this.
    Exhausted,
}

/// Odometer-style counter over strings of length 1..=max_len.
///
/// Each slot is either inactive (`None`, not yet contributing a character)
/// or an index into the alphabet. Slot 0 is always active; active slots
/// form a contiguous prefix, so candidate length grows monotonically as
/// lower slots overflow into activating higher ones. Every string over the
/// alphabet with length in range is produced exactly once.
pub struct Enumerator {
    alphabet: Alphabet,
    slots: Vec<Option<usize>>,
    exhausted: bool,
}

impl Enumerator {
    pub fn new(alphabet: Alphabet, max_len: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(CrackError::Config(
                "maximum candidate length must be at least 1".into(),
            ));
        }
        if alphabet.is_empty() {
            return Err(CrackError::Config("alphabet must not be empty".into()));
        }
        let mut slots = vec![None; max_len];
        slots[0] = Some(0);
        Ok(Enumerator {
            alphabet,
            slots,
            exhausted: false,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The candidate selected by the currently active slot prefix.
    pub fn current(&self) -> String {
        self.slots
            .iter()
            .map_while(|slot| slot.map(|i| self.alphabet.char_at(i)))
            .collect()
    }

    /// Exact number of distinct candidates this configuration covers:
    /// sum over L in 1..=max_len of |alphabet|^L.
    pub fn total_space(&self) -> u128 {
        let base = self.alphabet.len() as u128;
        let mut total = 0u128;
        let mut pow = 1u128;
        for _ in 0..self.slots.len() {
            pow = pow.saturating_mul(base);
            total = total.saturating_add(pow);
        }
        total
    }

    /// Advance the counter one step, carrying from slot 0 upward.
    ///
    /// Per-slot rule: an inactive slot activates to index 0 (this is how a
    /// carry grows the candidate by one character and it never carries
    /// further); a slot below the last alphabet index increments; a slot at
    /// the last index wraps to 0 and carries into the next slot. A carry
    /// that would run off the final slot means the space is exhausted.
    ///
    /// Calling again after `Exhausted` is a caller bug and reports
    /// `CrackError::State`.
    pub fn advance(&mut self) -> Result<Step> {
        if self.exhausted {
            return Err(CrackError::State(
                "advance() called after exhaustion".into(),
            ));
        }

        // Exhaustion check up front so the exhausting call leaves the
        // counter untouched.
        let last = self.alphabet.len() - 1;
        if self.slots.iter().all(|s| *s == Some(last)) {
            self.exhausted = true;
            return Ok(Step::Exhausted);
        }

        for slot in self.slots.iter_mut() {
            match *slot {
                None => {
                    *slot = Some(0);
                    return Ok(Step::Continued);
                }
                Some(v) if v < last => {
                    *slot = Some(v + 1);
                    return Ok(Step::Continued);
                }
                Some(_) => {
                    *slot = Some(0);
                    // carry into the next slot
                }
            }
        }

        unreachable!("carry past the last slot is caught by the exhaustion check");
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn collect_all(alphabet: &str, max_len: usize) -> Vec<String> {
        let mut e = Enumerator::new(Alphabet::from_chars(alphabet).unwrap(), max_len).unwrap();
        let mut out = vec![e.current()];
        while e.advance().unwrap() == Step::Continued {
            out.push(e.current());
        }
        out
    }

    #[test]
    fn test_full_library_has_94_chars() {
        let lib = Alphabet::full_library();
        assert_eq!(lib.len(), 94);
        // distinct
        let set: HashSet<char> = lib.as_string().chars().collect();
        assert_eq!(set.len(), 94);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_alphabets() {
        assert!(Alphabet::from_chars("").is_err());
        assert!(Alphabet::from_chars("abca").is_err());
        assert!(Alphabet::from_chars("abc").is_ok());
    }

    #[test]
    fn test_rejects_zero_max_length() {
        let err = Enumerator::new(Alphabet::from_chars("ab").unwrap(), 0);
        assert!(err.is_err());
    }

    #[test]
    fn test_total_space() {
        let e = Enumerator::new(Alphabet::from_chars("ab").unwrap(), 3).unwrap();
        assert_eq!(e.total_space(), 2 + 4 + 8);

        let e = Enumerator::new(Alphabet::from_chars("abc").unwrap(), 2).unwrap();
        assert_eq!(e.total_space(), 3 + 9);
    }

    #[test]
    fn test_initial_candidate_is_first_char() {
        let e = Enumerator::new(Alphabet::from_chars("xyz").unwrap(), 4).unwrap();
        assert_eq!(e.current(), "x");
    }

    #[test]
    fn test_length_order_is_monotone() {
        let all = collect_all("ab", 3);
        let lengths: Vec<usize> = all.iter().map(|s| s.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort();
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn test_enumeration_is_a_bijection() {
        let all = collect_all("abc", 3);
        assert_eq!(all.len() as u128, 3 + 9 + 27);

        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(unique.len(), all.len(), "no candidate may repeat");

        // Every string of length 1..=3 over {a,b,c} must appear.
        for s in ["a", "c", "ba", "cc", "abc", "cab", "ccc"] {
            assert!(unique.contains(&s.to_string()), "missing {}", s);
        }
    }

    #[test]
    fn test_exhausted_exactly_at_total_space() {
        let mut e = Enumerator::new(Alphabet::from_chars("ab").unwrap(), 2).unwrap();
        let total = e.total_space();
        // The initial state already presents candidate #1, so the counter
        // continues total - 1 times before the space is spent.
        for _ in 0..total - 1 {
            assert_eq!(e.advance().unwrap(), Step::Continued);
        }
        assert_eq!(e.advance().unwrap(), Step::Exhausted);
    }

    #[test]
    fn test_advance_after_exhaustion_is_a_state_error() {
        let mut e = Enumerator::new(Alphabet::from_chars("a").unwrap(), 1).unwrap();
        assert_eq!(e.advance().unwrap(), Step::Exhausted);
        assert!(e.is_exhausted());
        match e.advance() {
            Err(CrackError::State(_)) => {}
            other => panic!("expected State error, got {:?}", other),
        }
    }

    #[test]
    fn test_shuffle_preserves_space_and_coverage() {
        let mut shuffled = Alphabet::from_chars("abc").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        shuffled.shuffle(&mut rng);

        let plain: HashSet<String> = collect_all("abc", 2).into_iter().collect();

        let mut e = Enumerator::new(shuffled, 2).unwrap();
        assert_eq!(e.total_space(), 3 + 9);
        let mut covered = HashSet::new();
        covered.insert(e.current());
        while e.advance().unwrap() == Step::Continued {
            covered.insert(e.current());
        }
        assert_eq!(covered, plain);
    }
}
