use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::digest::TargetDigest;
use crate::enumerate::{Alphabet, Enumerator, Step};
use crate::error::Result;
use crate::mangle::RuleSet;
use crate::stats::Statistics;

/// Terminal outcome of one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The candidate whose digest matched, plus how many were tested to
    /// get there.
    Found { plaintext: String, tested: u64 },
    /// Every candidate in scope was tested without a match. In brute-force
    /// mode this means the enumerator reported true exhaustion.
    NotFound { tested: u64 },
    /// An externally imposed candidate ceiling stopped the run before the
    /// space was exhausted. Distinct from `NotFound` on purpose.
    CutShort { tested: u64 },
}

impl SearchOutcome {
    pub fn tested(&self) -> u64 {
        match self {
            SearchOutcome::Found { tested, .. }
            | SearchOutcome::NotFound { tested }
            | SearchOutcome::CutShort { tested } => *tested,
        }
    }
}

/// Knobs shared by both search modes.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Permute the alphabet once before brute force begins. Order-only;
    /// coverage is unchanged.
    pub shuffle: bool,
    /// Optional defensive ceiling on candidates tested. The enumerator's
    /// own exhaustion signal stays authoritative.
    pub max_candidates: Option<u64>,
    /// Worker threads for the hash-and-compare step. 1 = the sequential
    /// reference path.
    pub workers: usize,
    /// Candidates handed to the worker pool at a time.
    pub batch_size: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            shuffle: false,
            max_candidates: None,
            workers: 1,
            batch_size: 1024,
        }
    }
}

/// Pulls candidates from the enumerator or the mangled wordlist, hashes
/// each, and stops at the first digest match.
pub struct SearchDriver {
    target: TargetDigest,
    options: SearchOptions,
}

impl SearchDriver {
    pub fn new(target: TargetDigest, options: SearchOptions) -> Self {
        SearchDriver { target, options }
    }

    pub fn target(&self) -> &TargetDigest {
        &self.target
    }

    /// Brute-force mode: walk every string of length 1..=max_len over the
    /// alphabet until a digest matches or the space is spent.
    pub fn brute_force(
        &self,
        alphabet: Alphabet,
        max_len: usize,
        stats: &Statistics,
    ) -> Result<SearchOutcome> {
        let mut alphabet = alphabet;
        if self.options.shuffle {
            alphabet.shuffle(&mut rand::thread_rng());
            info!("shuffled alphabet order: {}", alphabet);
        }

        let mut enumerator = Enumerator::new(alphabet, max_len)?;
        debug!(
            "search space holds {} candidates",
            enumerator.total_space()
        );

        if self.options.workers <= 1 {
            self.brute_force_sequential(&mut enumerator, stats)
        } else {
            self.brute_force_batched(&mut enumerator, stats)
        }
    }

    fn brute_force_sequential(
        &self,
        enumerator: &mut Enumerator,
        stats: &Statistics,
    ) -> Result<SearchOutcome> {
        let mut tested = 0u64;
        loop {
            let candidate = enumerator.current();
            tested += 1;
            stats.increment_tested();

            if self.target.matches(&candidate) {
                return Ok(SearchOutcome::Found {
                    plaintext: candidate,
                    tested,
                });
            }

            // Exhaustion wins over the ceiling when both land on the same
            // candidate; the enumerator is the source of truth.
            if enumerator.advance()? == Step::Exhausted {
                return Ok(SearchOutcome::NotFound { tested });
            }
            if let Some(limit) = self.options.max_candidates {
                if tested >= limit {
                    return Ok(SearchOutcome::CutShort { tested });
                }
            }
        }
    }

    /// Batched variant: the single-threaded enumerator fills a bounded
    /// batch, worker threads scan disjoint chunks of it.
    fn brute_force_batched(
        &self,
        enumerator: &mut Enumerator,
        stats: &Statistics,
    ) -> Result<SearchOutcome> {
        let batch_size = self.options.batch_size.max(1);
        let mut tested = 0u64;
        let mut exhausted = false;

        loop {
            let mut batch: Vec<String> = Vec::with_capacity(batch_size);
            while batch.len() < batch_size && !exhausted {
                if let Some(limit) = self.options.max_candidates {
                    if tested + batch.len() as u64 >= limit {
                        break;
                    }
                }
                batch.push(enumerator.current());
                if enumerator.advance()? == Step::Exhausted {
                    exhausted = true;
                }
            }

            if batch.is_empty() {
                return Ok(if exhausted {
                    SearchOutcome::NotFound { tested }
                } else {
                    SearchOutcome::CutShort { tested }
                });
            }

            tested += batch.len() as u64;
            stats.add_tested(batch.len() as u64);

            if let Some(index) = self.scan(&batch) {
                return Ok(SearchOutcome::Found {
                    plaintext: batch.swap_remove(index),
                    tested,
                });
            }

            if exhausted {
                return Ok(SearchOutcome::NotFound { tested });
            }
            if let Some(limit) = self.options.max_candidates {
                if tested >= limit {
                    return Ok(SearchOutcome::CutShort { tested });
                }
            }
        }
    }

    /// Dictionary mode: stream the wordlist one line at a time, expand each
    /// word through the rule set, and test the resulting pool. The file is
    /// never loaded wholesale.
    pub fn dictionary<P: AsRef<Path>>(
        &self,
        wordlist: P,
        rules: &RuleSet,
        stats: &Statistics,
    ) -> Result<SearchOutcome> {
        let file = File::open(wordlist.as_ref())?;
        let reader = BufReader::new(file);
        let mut tested = 0u64;

        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() {
                continue;
            }

            let pool = rules.expand(word);

            // The unmodified word goes first; rule-derived variants follow
            // in set order.
            let ordered = std::iter::once(word.to_string())
                .chain(pool.into_iter().filter(|c| c.as_str() != word));

            if self.options.workers <= 1 {
                for candidate in ordered {
                    tested += 1;
                    stats.increment_tested();
                    if self.target.matches(&candidate) {
                        return Ok(SearchOutcome::Found {
                            plaintext: candidate,
                            tested,
                        });
                    }
                    if let Some(limit) = self.options.max_candidates {
                        if tested >= limit {
                            return Ok(SearchOutcome::CutShort { tested });
                        }
                    }
                }
            } else {
                let mut batch: Vec<String> = ordered.collect();
                if let Some(limit) = self.options.max_candidates {
                    let room = limit.saturating_sub(tested) as usize;
                    batch.truncate(room);
                }
                tested += batch.len() as u64;
                stats.add_tested(batch.len() as u64);

                if let Some(index) = self.scan(&batch) {
                    return Ok(SearchOutcome::Found {
                        plaintext: batch.swap_remove(index),
                        tested,
                    });
                }
                if let Some(limit) = self.options.max_candidates {
                    if tested >= limit {
                        return Ok(SearchOutcome::CutShort { tested });
                    }
                }
            }

            debug!("word '{}' exhausted, {} candidates so far", word, tested);
        }

        Ok(SearchOutcome::NotFound { tested })
    }

    /// Scan a batch with the configured worker count. The first match
    /// raises a stop flag that cancels the remaining workers; with exactly
    /// one preimage in the space, the winning candidate is deterministic.
    fn scan(&self, batch: &[String]) -> Option<usize> {
        let workers = self.options.workers.max(1);
        if workers == 1 || batch.len() < workers * 2 {
            return batch.iter().position(|c| self.target.matches(c));
        }

        let chunk_size = (batch.len() + workers - 1) / workers;
        let stop = AtomicBool::new(false);
        let found = AtomicUsize::new(usize::MAX);

        std::thread::scope(|s| {
            for (chunk_index, chunk) in batch.chunks(chunk_size).enumerate() {
                let stop = &stop;
                let found = &found;
                let target = &self.target;
                s.spawn(move || {
                    for (i, candidate) in chunk.iter().enumerate() {
                        if stop.load(Ordering::Relaxed) {
                            return;
                        }
                        if target.matches(candidate) {
                            found.fetch_min(chunk_index * chunk_size + i, Ordering::Relaxed);
                            stop.store(true, Ordering::Relaxed);
                            return;
                        }
                    }
                });
            }
        });

        let index = found.load(Ordering::Relaxed);
        (index != usize::MAX).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mangle::Rule;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_wordlist(name: &str, words: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join("ettubrute-search-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for word in words {
            writeln!(file, "{}", word).unwrap();
        }
        path
    }

    #[test]
    fn test_brute_force_finds_ba() {
        let target = TargetDigest::of("ba");
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        match outcome {
            SearchOutcome::Found { plaintext, tested } => {
                assert_eq!(plaintext, "ba");
                assert!(tested <= 5, "tested {} candidates", tested);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_brute_force_exhaustion_is_not_found() {
        let target = TargetDigest::of("zzz"); // outside the {a,b} x 2 space
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        assert_eq!(outcome, SearchOutcome::NotFound { tested: 6 });
        assert_eq!(stats.tested(), 6);
    }

    #[test]
    fn test_brute_force_ceiling_reports_cut_short() {
        let target = TargetDigest::of("zzz");
        let options = SearchOptions {
            max_candidates: Some(3),
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        assert_eq!(outcome, SearchOutcome::CutShort { tested: 3 });
    }

    #[test]
    fn test_exhaustion_beats_ceiling_on_the_last_candidate() {
        let target = TargetDigest::of("zzz");
        let options = SearchOptions {
            max_candidates: Some(6), // exactly the size of the space
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        assert_eq!(outcome, SearchOutcome::NotFound { tested: 6 });
    }

    #[test]
    fn test_brute_force_shuffled_still_finds() {
        let target = TargetDigest::of("ba");
        let options = SearchOptions {
            shuffle: true,
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        match outcome {
            SearchOutcome::Found { plaintext, .. } => assert_eq!(plaintext, "ba"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_brute_force_batched_workers() {
        let target = TargetDigest::of("ba");
        let options = SearchOptions {
            workers: 4,
            batch_size: 2,
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        match outcome {
            SearchOutcome::Found { plaintext, .. } => assert_eq!(plaintext, "ba"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_brute_force_batched_exhaustion() {
        let target = TargetDigest::of("zzz");
        let options = SearchOptions {
            workers: 4,
            batch_size: 4,
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let outcome = driver
            .brute_force(Alphabet::from_chars("ab").unwrap(), 2, &stats)
            .unwrap();

        assert_eq!(outcome, SearchOutcome::NotFound { tested: 6 });
    }

    #[test]
    fn test_dictionary_plural_finds_dogs() {
        let path = write_wordlist("dogs.txt", &["dog"]);
        let target = TargetDigest::of("dogs");
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let mut rules = RuleSet::baseline();
        rules.enable(Rule::Plural);

        let outcome = driver.dictionary(&path, &rules, &stats).unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                plaintext: "dogs".to_string(),
                tested: 2
            }
        );
    }

    #[test]
    fn test_dictionary_baseline_not_found() {
        let path = write_wordlist("xyz.txt", &["xyz"]);
        let target = TargetDigest::of("nomatch");
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let outcome = driver
            .dictionary(&path, &RuleSet::baseline(), &stats)
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound { tested: 1 });
    }

    #[test]
    fn test_dictionary_trims_and_skips_blank_lines() {
        let path = write_wordlist("trim.txt", &["  dog  ", "", "cat"]);
        let target = TargetDigest::of("cat");
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let outcome = driver
            .dictionary(&path, &RuleSet::baseline(), &stats)
            .unwrap();
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                plaintext: "cat".to_string(),
                tested: 2
            }
        );
    }

    #[test]
    fn test_dictionary_missing_file_is_io_error() {
        let target = TargetDigest::of("anything");
        let driver = SearchDriver::new(target, SearchOptions::default());
        let stats = Statistics::new();

        let err = driver
            .dictionary("/nonexistent/wordlist.txt", &RuleSet::baseline(), &stats)
            .unwrap_err();
        assert!(matches!(err, crate::error::CrackError::Io(_)));
    }

    #[test]
    fn test_dictionary_with_workers() {
        let path = write_wordlist("workers.txt", &["dog"]);
        let target = TargetDigest::of("dogs");
        let options = SearchOptions {
            workers: 2,
            ..SearchOptions::default()
        };
        let driver = SearchDriver::new(target, options);
        let stats = Statistics::new();

        let mut rules = RuleSet::baseline();
        rules.enable(Rule::Plural);

        let outcome = driver.dictionary(&path, &rules, &stats).unwrap();
        match outcome {
            SearchOutcome::Found { plaintext, .. } => assert_eq!(plaintext, "dogs"),
            other => panic!("expected Found, got {:?}", other),
        }
    }
}
