use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashSet;
use itertools::Itertools;
use log::{debug, error, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use unic_ucd_category::GeneralCategory;

use self::error::SpellerError;
use self::suggestion::Suggestion;
use crate::cursor::{MisspelledEntry, NavigationMode};
use crate::dictionary::loader::{load_base_dictionary, DEFAULT_DICTIONARY_URL};
use crate::dictionary::user::UserDictionary;
use crate::dictionary::{SymSpellIndex, Verbosity};
use crate::skip::{CapitalizationPolicy, Lexicon, SkipContext, SkipPolicy, SkipReason};
use crate::tokenizer::case_handling::{lower_case, CaseMutation};
use crate::tokenizer::spans::ExclusionSpans;
use crate::tokenizer::{normalize_apostrophes, tokens, Token};

pub mod error;
pub mod suggestion;

const MAX_EDIT_DISTANCE_LIMIT: u8 = 4;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellerConfig {
    /// largest edit distance considered for suggestions
    pub max_edit_distance: u8,
    /// number of leading characters indexed per term
    pub prefix_length: usize,
    /// suggestions kept per word, `None` for all
    pub n_best: Option<usize>,
    pub navigation: NavigationMode,
    pub capitalization: CapitalizationPolicy,
    /// base dictionary entries below this count are dropped
    pub count_threshold: u64,
    /// download the base dictionary when it is missing
    pub bootstrap: bool,
    /// where to download it from, [`DEFAULT_DICTIONARY_URL`] if unset
    pub dictionary_url: Option<String>,
}

impl SpellerConfig {
    pub const fn default() -> SpellerConfig {
        SpellerConfig {
            max_edit_distance: 2,
            prefix_length: 7,
            n_best: Some(5),
            navigation: NavigationMode::Wrap,
            capitalization: CapitalizationPolicy::CheckLowercase,
            count_threshold: 1,
            bootstrap: true,
            dictionary_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), SpellerError> {
        if self.max_edit_distance > MAX_EDIT_DISTANCE_LIMIT {
            return Err(SpellerError::InvalidConfig(format!(
                "max_edit_distance must be at most {}, got {}",
                MAX_EDIT_DISTANCE_LIMIT, self.max_edit_distance
            )));
        }

        if self.prefix_length <= self.max_edit_distance as usize {
            return Err(SpellerError::InvalidConfig(format!(
                "prefix_length ({}) must be greater than max_edit_distance ({})",
                self.prefix_length, self.max_edit_distance
            )));
        }

        if self.n_best == Some(0) {
            return Err(SpellerError::InvalidConfig(
                "n_best must be positive or null".into(),
            ));
        }

        Ok(())
    }

    /// Reads a JSON config. Missing fields take their default values.
    pub fn from_json_file(path: &Path) -> Result<SpellerConfig, SpellerError> {
        let file = File::open(path).map_err(|source| SpellerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SpellerConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| SpellerError::InvalidConfig(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// The download location, if bootstrapping is enabled.
    pub fn bootstrap_url(&self) -> Option<&str> {
        if !self.bootstrap {
            return None;
        }
        Some(self.dictionary_url.as_deref().unwrap_or(DEFAULT_DICTIONARY_URL))
    }
}

impl Default for SpellerConfig {
    fn default() -> Self {
        SpellerConfig::default()
    }
}

/// Read-only view over the speller's word sets for the duration of one scan.
struct LexiconView<'a> {
    index: &'a SymSpellIndex,
    user_terms: &'a HashSet<SmolStr>,
    ignored: &'a HashSet<SmolStr>,
}

impl Lexicon for LexiconView<'_> {
    fn is_correct(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    fn is_known_term(&self, word: &str) -> bool {
        self.user_terms.contains(word) || self.ignored.contains(word)
    }
}

fn has_letters(word: &str) -> bool {
    word.chars().any(|c| GeneralCategory::of(c).is_letter())
}

fn lookup_key(word: &str) -> SmolStr {
    lower_case(&normalize_apostrophes(word.trim()))
}

/// The spellchecker shared by every open document.
///
/// Holds the dictionary index, the user dictionary and the set of words
/// ignored for this run. All mutation goes through interior locks, so a
/// `Speller` is used behind an `Arc`.
#[derive(Debug)]
pub struct Speller {
    config: SpellerConfig,
    policy: SkipPolicy,
    index: RwLock<SymSpellIndex>,
    user_dictionary: Option<UserDictionary>,
    user_terms: Mutex<HashSet<SmolStr>>,
    ignored: Mutex<HashSet<SmolStr>>,
}

impl Speller {
    pub fn new(
        index: SymSpellIndex,
        user_dictionary: Option<UserDictionary>,
        config: SpellerConfig,
    ) -> Result<Arc<Speller>, SpellerError> {
        config.validate()?;

        let speller = Speller {
            policy: SkipPolicy::new(config.capitalization),
            config,
            index: RwLock::new(index),
            user_dictionary,
            user_terms: Mutex::new(HashSet::new()),
            ignored: Mutex::new(HashSet::new()),
        };
        speller.reload_user_dictionary();

        Ok(Arc::new(speller))
    }

    /// Builds a speller from a base dictionary file, downloading it first if
    /// it is missing and the config allows it.
    pub fn load(
        base: &Path,
        user: Option<&Path>,
        config: SpellerConfig,
    ) -> Result<Arc<Speller>, SpellerError> {
        config.validate()?;

        let started = Instant::now();
        let mut index = SymSpellIndex::new(config.max_edit_distance, config.prefix_length);
        load_base_dictionary(
            &mut index,
            base,
            config.bootstrap_url(),
            config.count_threshold,
        )?;
        debug!("index built in {:?}", started.elapsed());

        Speller::new(index, user.map(UserDictionary::open), config)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        user: Option<&Path>,
        config: SpellerConfig,
    ) -> Result<Arc<Speller>, SpellerError> {
        config.validate()?;

        let mut index = SymSpellIndex::new(config.max_edit_distance, config.prefix_length);
        index
            .load_frequency_dictionary(reader, config.count_threshold)
            .map_err(|source| SpellerError::Io {
                path: "<reader>".into(),
                source,
            })?;

        Speller::new(index, user.map(UserDictionary::open), config)
    }

    pub fn config(&self) -> &SpellerConfig {
        &self.config
    }

    pub fn policy(&self) -> &SkipPolicy {
        &self.policy
    }

    pub fn user_dictionary(&self) -> Option<&UserDictionary> {
        self.user_dictionary.as_ref()
    }

    pub fn dictionary_len(&self) -> usize {
        self.index.read().len()
    }

    /// Inserts every term of the user dictionary file into the index.
    pub fn reload_user_dictionary(&self) {
        let user_dictionary = match self.user_dictionary.as_ref() {
            Some(d) => d,
            None => return,
        };

        let terms = user_dictionary.load_terms();
        {
            let mut index = self.index.write();
            for entry in &terms {
                index.insert(&entry.term, entry.frequency);
            }
        }

        let mut user_terms = self.user_terms.lock();
        user_terms.extend(terms.into_iter().map(|e| e.term));
    }

    pub fn is_correct(&self, word: &str) -> bool {
        if word.is_empty() || !has_letters(word) {
            return true;
        }

        let key = lookup_key(word);
        self.index.read().contains(&key)
            || self.user_terms.lock().contains(&key)
            || self.ignored.lock().contains(&key)
    }

    pub fn suggest(&self, word: &str) -> Vec<Suggestion> {
        let index = self.index.read();
        self.suggest_in(&index, word)
    }

    fn suggest_in(&self, index: &SymSpellIndex, word: &str) -> Vec<Suggestion> {
        let key = lookup_key(word);
        if key.is_empty() {
            return vec![];
        }

        let mut suggestions: Vec<Suggestion> = index
            .lookup(&key, self.config.max_edit_distance, Verbosity::All)
            .into_iter()
            .filter(|s| s.value != key)
            .collect();

        if let Some(n) = self.config.n_best {
            suggestions.truncate(n);
        }

        let mutation = CaseMutation::of(word);
        if mutation != CaseMutation::None {
            for s in suggestions.iter_mut() {
                s.value = mutation.apply(&s.value);
            }
        }

        suggestions
    }

    /// Every token of `text` with the rule that skipped it, if any.
    pub fn classify<'t>(&self, text: &'t str) -> Vec<(Token<'t>, Option<SkipReason>)> {
        let spans = ExclusionSpans::scan(text);
        let index = self.index.read();
        let user_terms = self.user_terms.lock();
        let ignored = self.ignored.lock();

        let lexicon = LexiconView {
            index: &index,
            user_terms: &user_terms,
            ignored: &ignored,
        };
        let cx = SkipContext {
            spans: &spans,
            lexicon: &lexicon,
        };

        tokens(text)
            .map(|token| {
                let reason = self.policy.should_skip(&token, &cx);
                (token, reason)
            })
            .collect()
    }

    /// Scans a whole document and returns its misspellings in document order.
    pub fn check(&self, text: &str) -> Vec<MisspelledEntry> {
        let started = Instant::now();
        self.reload_user_dictionary();

        let spans = ExclusionSpans::scan(text);
        let index = self.index.read();
        let user_terms = self.user_terms.lock();
        let ignored = self.ignored.lock();

        let lexicon = LexiconView {
            index: &index,
            user_terms: &user_terms,
            ignored: &ignored,
        };
        let cx = SkipContext {
            spans: &spans,
            lexicon: &lexicon,
        };

        let mut checked = 0usize;
        let entries: Vec<MisspelledEntry> = tokens(text)
            .filter(|token| self.policy.should_skip(token, &cx).is_none())
            .map(|token| token.core())
            .filter(|token| {
                checked += 1;
                !index.contains(&token.lower)
            })
            .map(|token| MisspelledEntry {
                word: SmolStr::new(token.text),
                suggestions: self.suggest_in(&index, token.text),
                offset: token.offset,
            })
            .collect();

        debug!(
            "checked {} tokens, {} misspelled, {} spans excluded, in {:?}",
            checked,
            entries.len(),
            spans.len(),
            started.elapsed()
        );

        entries
    }

    /// Permanently accepts `word`. The index is updated even if writing the
    /// user dictionary fails. Returns `false` if the word was already there.
    pub fn add_to_dictionary(&self, word: &str) -> bool {
        let term = lookup_key(word);
        if term.is_empty() {
            warn!("refusing to add an empty word to the dictionary");
            return false;
        }

        self.index.write().insert(&term, 1);

        let mut user_terms = self.user_terms.lock();
        if !user_terms.insert(term.clone()) {
            return false;
        }

        if let Some(user_dictionary) = self.user_dictionary.as_ref() {
            if let Err(e) = user_dictionary.append(&term) {
                error!("could not save {:?} to the user dictionary: {}", term, e);
            }
        }

        debug!("added {:?} to the dictionary", term);
        true
    }

    /// Stops flagging `word` until the speller is dropped.
    pub fn ignore_word(&self, word: &str) -> bool {
        let term = lookup_key(word);
        if term.is_empty() {
            return false;
        }
        self.ignored.lock().insert(term)
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignored.lock().contains(&lookup_key(word))
    }

    /// The best correction for `word`, or `word` itself when it is correct or
    /// nothing is close enough.
    pub fn correct_word(&self, word: &str) -> SmolStr {
        if self.is_correct(word) {
            return SmolStr::new(word);
        }

        self.suggest(word)
            .into_iter()
            .next()
            .map(|s| s.value)
            .unwrap_or_else(|| SmolStr::new(word))
    }

    /// Corrects each whitespace separated word. Whitespace is collapsed.
    pub fn correct_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|w| self.correct_word(w))
            .join(" ")
    }
}
