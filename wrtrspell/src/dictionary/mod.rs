//! Frequency dictionary with approximate lookup.
//!
//! Terms are indexed with the symmetric delete scheme: every term contributes
//! all variants of its first `prefix_length` characters with up to
//! `max_edit_distance` characters removed. A lookup generates the same deletes
//! for the input and verifies each candidate with an optimal string alignment
//! distance, so the cost of a lookup depends on the word length and not on the
//! dictionary size.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::BufRead;

use hashbrown::{HashMap, HashSet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::speller::suggestion::Suggestion;
use crate::tokenizer::case_handling::lower_case;

pub mod loader;
pub mod user;

/// A case-folded term and its corpus frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub term: SmolStr,
    pub frequency: u64,
}

/// Controls how many matches a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// The single best match: smallest distance, then highest frequency.
    Top,
    /// Every match at the smallest distance found.
    Closest,
    /// Every match within the distance budget.
    All,
}

/// Parses a `term count` or bare `term` line. Returns `None` for blank lines,
/// comments and lines whose count is not a number.
pub(crate) fn parse_line(line: &str) -> Option<(&str, u64)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut parts = line.split_whitespace();
    let term = parts.next()?;
    match parts.next() {
        None => Some((term, 1)),
        Some(count) => count.parse::<u64>().ok().map(|count| (term, count)),
    }
}

fn delete_key(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

/// All strings reachable from `word` by removing up to `max_distance` characters,
/// `word` itself included.
fn deletes(word: &str, max_distance: u8) -> HashSet<String> {
    let mut out = HashSet::new();
    out.insert(word.to_string());

    let mut frontier = vec![word.to_string()];
    for _ in 0..max_distance {
        let mut next = Vec::new();
        for edit in &frontier {
            let chars: Vec<char> = edit.chars().collect();
            for skip in 0..chars.len() {
                let variant: String = chars
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, c)| *c)
                    .collect();
                if out.insert(variant.clone()) {
                    next.push(variant);
                }
            }
        }
        frontier = next;
    }

    out
}

#[derive(Debug)]
pub struct SymSpellIndex {
    max_edit_distance: u8,
    prefix_length: usize,
    entries: Vec<DictionaryEntry>,
    words: HashMap<SmolStr, u32>,
    // Keyed by a hash of the delete; collisions only add candidates, which the
    // distance check then rejects.
    deletes: HashMap<u64, Vec<u32>>,
    max_term_length: usize,
}

impl SymSpellIndex {
    pub fn new(max_edit_distance: u8, prefix_length: usize) -> SymSpellIndex {
        SymSpellIndex {
            max_edit_distance,
            prefix_length: prefix_length.max(1),
            entries: Vec::new(),
            words: HashMap::new(),
            deletes: HashMap::new(),
            max_term_length: 0,
        }
    }

    pub fn max_edit_distance(&self) -> u8 {
        self.max_edit_distance
    }

    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    fn prefix<'a>(&self, term: &'a str) -> &'a str {
        match term.char_indices().nth(self.prefix_length) {
            Some((end, _)) => &term[..end],
            None => term,
        }
    }

    /// Adds a term, making it visible to exact lookups immediately. Returns
    /// `false` if the term was already present, in which case the larger
    /// frequency is kept.
    pub fn insert(&mut self, term: &str, frequency: u64) -> bool {
        let key = lower_case(term.trim());
        if key.is_empty() {
            return false;
        }

        if let Some(&id) = self.words.get(&key) {
            let entry = &mut self.entries[id as usize];
            entry.frequency = entry.frequency.max(frequency);
            return false;
        }

        let id = self.entries.len() as u32;
        for delete in deletes(self.prefix(&key), self.max_edit_distance) {
            self.deletes.entry(delete_key(&delete)).or_default().push(id);
        }

        self.max_term_length = self.max_term_length.max(key.chars().count());
        self.words.insert(key.clone(), id);
        self.entries.push(DictionaryEntry {
            term: key,
            frequency,
        });
        true
    }

    /// Loads `term count` lines. Entries below `count_threshold` and malformed
    /// lines are skipped. Returns the number of new terms.
    pub fn load_frequency_dictionary<R: BufRead>(
        &mut self,
        reader: R,
        count_threshold: u64,
    ) -> std::io::Result<usize> {
        let mut added = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_line(&line) {
                Some((term, count)) if count >= count_threshold => {
                    if self.insert(term, count) {
                        added += 1;
                    }
                }
                Some(_) => {}
                None if line.trim().is_empty() || line.trim_start().starts_with('#') => {}
                None => debug!("skipping malformed dictionary line {}: {:?}", line_no + 1, line),
            }
        }

        Ok(added)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.words.contains_key(&lower_case(term))
    }

    pub fn frequency(&self, term: &str) -> Option<u64> {
        self.words
            .get(&lower_case(term))
            .map(|&id| self.entries[id as usize].frequency)
    }

    /// Finds dictionary terms within `max_edit_distance` of `input`, sorted by
    /// distance, then frequency. A distance above the one the index was built
    /// for is clamped.
    pub fn lookup(&self, input: &str, max_edit_distance: u8, verbosity: Verbosity) -> Vec<Suggestion> {
        let max_distance = if max_edit_distance > self.max_edit_distance {
            warn!(
                "lookup distance {} exceeds index distance {}, clamping",
                max_edit_distance, self.max_edit_distance
            );
            self.max_edit_distance
        } else {
            max_edit_distance
        };

        let input = lower_case(input);
        let input_len = input.chars().count();
        let mut results = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();

        if let Some(&id) = self.words.get(&input) {
            let entry = &self.entries[id as usize];
            results.push(Suggestion::new(entry.term.clone(), 0, entry.frequency));
            seen.insert(id);
            if verbosity != Verbosity::All {
                return results;
            }
        }

        if max_distance == 0 || input_len > self.max_term_length + max_distance as usize {
            return results;
        }

        for candidate in deletes(self.prefix(&input), max_distance) {
            let ids = match self.deletes.get(&delete_key(&candidate)) {
                Some(ids) => ids,
                None => continue,
            };

            for &id in ids {
                if !seen.insert(id) {
                    continue;
                }

                let entry = &self.entries[id as usize];
                let term_len = entry.term.chars().count();
                if term_len.abs_diff(input_len) > max_distance as usize {
                    continue;
                }

                let distance = strsim::osa_distance(&input, &entry.term);
                if distance <= max_distance as usize {
                    results.push(Suggestion::new(
                        entry.term.clone(),
                        distance as u8,
                        entry.frequency,
                    ));
                }
            }
        }

        results.sort();

        match verbosity {
            Verbosity::Top => results.truncate(1),
            Verbosity::Closest => {
                if let Some(best) = results.first().map(Suggestion::distance) {
                    results.retain(|s| s.distance == best);
                }
            }
            Verbosity::All => {}
        }

        results
    }
}
