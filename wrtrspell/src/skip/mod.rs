//! Decides which tokens are never looked up.
//!
//! A [`SkipPolicy`] is an ordered list of [`SkipRule`]s. The first rule that
//! applies wins and its [`SkipReason`] is reported, which the CLI uses to
//! explain why a word was left alone.
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unic_ucd_category::GeneralCategory;

use crate::tokenizer::case_handling::{is_all_caps, is_first_caps};
use crate::tokenizer::spans::ExclusionSpans;
use crate::tokenizer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    Possessive,
    QuotedCorrect,
    Contraction,
    KnownTerm,
    ExcludedSpan,
    Numeric,
    MixedAlphanumeric,
    Acronym,
    Capitalized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Possessive => "possessive",
            SkipReason::QuotedCorrect => "quoted",
            SkipReason::Contraction => "contraction",
            SkipReason::KnownTerm => "known term",
            SkipReason::ExcludedSpan => "excluded span",
            SkipReason::Numeric => "numeric",
            SkipReason::MixedAlphanumeric => "alphanumeric",
            SkipReason::Acronym => "acronym",
            SkipReason::Capitalized => "capitalized",
        };
        f.write_str(s)
    }
}

/// How capitalised words are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalizationPolicy {
    /// Skip a capitalised word only when its lower case form is a known word,
    /// so "Teh" at the start of a sentence is still flagged.
    CheckLowercase,
    /// Skip every capitalised word. Catches fewer typos.
    SkipAll,
}

/// Dictionary queries the rules need. Words are passed lower-cased with ASCII
/// apostrophes.
pub trait Lexicon {
    /// Exact membership in the dictionary.
    fn is_correct(&self, word: &str) -> bool;
    /// In the user dictionary or ignored for this session.
    fn is_known_term(&self, word: &str) -> bool;
}

pub struct SkipContext<'a> {
    pub spans: &'a ExclusionSpans,
    pub lexicon: &'a dyn Lexicon,
}

pub trait SkipRule: Send + Sync + fmt::Debug {
    fn reason(&self) -> SkipReason;
    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool;
}

#[derive(Debug)]
pub struct Possessive;

impl SkipRule for Possessive {
    fn reason(&self) -> SkipReason {
        SkipReason::Possessive
    }

    fn applies(&self, token: &Token<'_>, _cx: &SkipContext<'_>) -> bool {
        let lw = token.lower.as_str();
        lw == "s" || lw.ends_with("'s")
    }
}

/// A word wrapped in single quotes whose bare form is correct.
#[derive(Debug)]
pub struct QuotedCorrect;

impl SkipRule for QuotedCorrect {
    fn reason(&self) -> SkipReason {
        SkipReason::QuotedCorrect
    }

    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool {
        let lw = token.lower.as_str();
        if lw.chars().count() < 2 || !(lw.starts_with('\'') || lw.ends_with('\'')) {
            return false;
        }

        let base = lw.trim_matches('\'');
        !base.is_empty() && cx.lexicon.is_correct(base)
    }
}

const CONTRACTION_SUFFIXES: &[&str] = &["t", "s", "d", "ll", "re", "ve", "m"];

/// Contractions like "can't" or "they've", whose stem is a correct word.
/// Frequency dictionaries rarely carry them.
#[derive(Debug)]
pub struct Contraction;

impl SkipRule for Contraction {
    fn reason(&self) -> SkipReason {
        SkipReason::Contraction
    }

    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool {
        let lw = token.lower.as_str();
        let (stem, suffix) = match lw.rsplit_once('\'') {
            Some(parts) => parts,
            None => return false,
        };

        if stem.is_empty() || !CONTRACTION_SUFFIXES.contains(&suffix) {
            return false;
        }

        if cx.lexicon.is_correct(stem) {
            return true;
        }

        // "don't" and "isn't" carry the n on the stem
        suffix == "t"
            && stem
                .strip_suffix('n')
                .map_or(false, |s| !s.is_empty() && cx.lexicon.is_correct(s))
    }
}

#[derive(Debug)]
pub struct KnownTerm;

impl SkipRule for KnownTerm {
    fn reason(&self) -> SkipReason {
        SkipReason::KnownTerm
    }

    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool {
        cx.lexicon.is_known_term(&token.lower)
    }
}

#[derive(Debug)]
pub struct ExcludedSpan;

impl SkipRule for ExcludedSpan {
    fn reason(&self) -> SkipReason {
        SkipReason::ExcludedSpan
    }

    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool {
        cx.spans.contains(token.offset)
    }
}

fn ordinal_regex() -> &'static Regex {
    static ORDINAL: OnceLock<Regex> = OnceLock::new();
    ORDINAL.get_or_init(|| Regex::new(r"^\d+(st|nd|rd|th)$").expect("ordinal pattern is valid"))
}

fn is_letter(c: char) -> bool {
    GeneralCategory::of(c).is_letter()
}

/// Ordinals, plain numbers and anything without a single letter.
#[derive(Debug)]
pub struct Numeric;

impl SkipRule for Numeric {
    fn reason(&self) -> SkipReason {
        SkipReason::Numeric
    }

    fn applies(&self, token: &Token<'_>, _cx: &SkipContext<'_>) -> bool {
        ordinal_regex().is_match(&token.lower) || !token.text.chars().any(is_letter)
    }
}

/// Identifiers like "HTML5" or "x86".
#[derive(Debug)]
pub struct MixedAlphanumeric;

impl SkipRule for MixedAlphanumeric {
    fn reason(&self) -> SkipReason {
        SkipReason::MixedAlphanumeric
    }

    fn applies(&self, token: &Token<'_>, _cx: &SkipContext<'_>) -> bool {
        token.text.chars().any(|c| c.is_numeric()) && token.text.chars().any(is_letter)
    }
}

#[derive(Debug)]
pub struct Acronym;

impl SkipRule for Acronym {
    fn reason(&self) -> SkipReason {
        SkipReason::Acronym
    }

    fn applies(&self, token: &Token<'_>, _cx: &SkipContext<'_>) -> bool {
        token.text.chars().count() >= 2 && is_all_caps(token.text)
    }
}

#[derive(Debug)]
pub struct Capitalized {
    pub policy: CapitalizationPolicy,
}

impl SkipRule for Capitalized {
    fn reason(&self) -> SkipReason {
        SkipReason::Capitalized
    }

    fn applies(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> bool {
        if !is_first_caps(token.text) {
            return false;
        }

        match self.policy {
            CapitalizationPolicy::SkipAll => true,
            CapitalizationPolicy::CheckLowercase => cx.lexicon.is_correct(&token.lower),
        }
    }
}

#[derive(Debug)]
pub struct SkipPolicy {
    rules: Vec<Box<dyn SkipRule>>,
}

impl SkipPolicy {
    /// The standard rule order.
    pub fn new(capitalization: CapitalizationPolicy) -> SkipPolicy {
        SkipPolicy {
            rules: vec![
                Box::new(Possessive),
                Box::new(QuotedCorrect),
                Box::new(Contraction),
                Box::new(KnownTerm),
                Box::new(ExcludedSpan),
                Box::new(Numeric),
                Box::new(MixedAlphanumeric),
                Box::new(Acronym),
                Box::new(Capitalized {
                    policy: capitalization,
                }),
            ],
        }
    }

    pub fn with_rules(rules: Vec<Box<dyn SkipRule>>) -> SkipPolicy {
        SkipPolicy { rules }
    }

    /// Appends a rule, evaluated after the existing ones.
    pub fn push<R: SkipRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn SkipRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// The reason of the first rule that applies. A token wrapped in quote
    /// apostrophes is also tried without them, so `'NASA'` is still an
    /// acronym.
    pub fn should_skip(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> Option<SkipReason> {
        self.first_match(token, cx).or_else(|| {
            let core = token.core();
            if core.text.is_empty() || core.text.len() == token.text.len() {
                return None;
            }
            self.first_match(&core, cx)
        })
    }

    fn first_match(&self, token: &Token<'_>, cx: &SkipContext<'_>) -> Option<SkipReason> {
        self.rules
            .iter()
            .find(|rule| rule.applies(token, cx))
            .map(|rule| rule.reason())
    }
}

impl Default for SkipPolicy {
    fn default() -> SkipPolicy {
        SkipPolicy::new(CapitalizationPolicy::CheckLowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokens;
    use hashbrown::HashSet;

    struct Words {
        correct: HashSet<&'static str>,
        known: HashSet<&'static str>,
    }

    impl Lexicon for Words {
        fn is_correct(&self, word: &str) -> bool {
            self.correct.contains(word)
        }

        fn is_known_term(&self, word: &str) -> bool {
            self.known.contains(word)
        }
    }

    fn lexicon() -> Words {
        Words {
            correct: ["the", "can", "do", "is", "they", "new", "quote", "cat"]
                .into_iter()
                .collect(),
            known: ["wrtr"].into_iter().collect(),
        }
    }

    fn reasons(text: &str, policy: &SkipPolicy) -> Vec<(String, Option<SkipReason>)> {
        let lexicon = lexicon();
        let spans = ExclusionSpans::scan(text);
        let cx = SkipContext {
            spans: &spans,
            lexicon: &lexicon,
        };

        tokens(text)
            .map(|t| (t.text.to_string(), policy.should_skip(&t, &cx)))
            .collect()
    }

    fn reason_of(text: &str, word: &str) -> Option<SkipReason> {
        reasons(text, &SkipPolicy::default())
            .into_iter()
            .find(|(w, _)| w == word)
            .and_then(|(_, r)| r)
    }

    #[test]
    fn possessives_and_contractions() {
        let text = "the cat's s can't don't they've isn’t gonna'd";

        assert_eq!(reason_of(text, "cat's"), Some(SkipReason::Possessive));
        assert_eq!(reason_of(text, "s"), Some(SkipReason::Possessive));
        assert_eq!(reason_of(text, "can't"), Some(SkipReason::Contraction));
        assert_eq!(reason_of(text, "don't"), Some(SkipReason::Contraction));
        assert_eq!(reason_of(text, "they've"), Some(SkipReason::Contraction));
        assert_eq!(reason_of(text, "isn’t"), Some(SkipReason::Contraction));
        assert_eq!(reason_of(text, "gonna'd"), None);
    }

    #[test]
    fn quoted_words() {
        let lexicon = lexicon();
        let spans = ExclusionSpans::default();
        let cx = SkipContext {
            spans: &spans,
            lexicon: &lexicon,
        };

        assert!(QuotedCorrect.applies(&Token::new(0, "'quote"), &cx));
        assert!(QuotedCorrect.applies(&Token::new(0, "the'"), &cx));
        assert!(!QuotedCorrect.applies(&Token::new(0, "'qoute'"), &cx));
        assert!(!QuotedCorrect.applies(&Token::new(0, "'"), &cx));
        assert!(!QuotedCorrect.applies(&Token::new(0, "quote"), &cx));
    }

    #[test]
    fn quoted_tokens_from_text() {
        let text = "he said 'quote' and ‘the’ but 'qoute' or 'NASA' and 'Wrtr'";

        assert_eq!(reason_of(text, "'quote'"), Some(SkipReason::QuotedCorrect));
        assert_eq!(reason_of(text, "‘the’"), Some(SkipReason::QuotedCorrect));
        assert_eq!(reason_of(text, "'qoute'"), None);
        assert_eq!(reason_of(text, "'NASA'"), Some(SkipReason::Acronym));
        assert_eq!(reason_of(text, "'Wrtr'"), Some(SkipReason::KnownTerm));
    }

    #[test]
    fn spans_and_known_terms() {
        let text = "see https://exampel.com/wrods and `fn mian` with Wrtr";

        assert_eq!(reason_of(text, "exampel"), Some(SkipReason::ExcludedSpan));
        assert_eq!(reason_of(text, "wrods"), Some(SkipReason::ExcludedSpan));
        assert_eq!(reason_of(text, "mian"), Some(SkipReason::ExcludedSpan));
        assert_eq!(reason_of(text, "Wrtr"), Some(SkipReason::KnownTerm));
        assert_eq!(reason_of(text, "see"), None);
    }

    #[test]
    fn numbers_and_identifiers() {
        let text = "the 4th of 2024 ٣ HTML5 x86 NASA I";

        assert_eq!(reason_of(text, "4th"), Some(SkipReason::Numeric));
        assert_eq!(reason_of(text, "2024"), Some(SkipReason::Numeric));
        assert_eq!(reason_of(text, "٣"), Some(SkipReason::Numeric));
        assert_eq!(reason_of(text, "HTML5"), Some(SkipReason::MixedAlphanumeric));
        assert_eq!(reason_of(text, "x86"), Some(SkipReason::MixedAlphanumeric));
        assert_eq!(reason_of(text, "NASA"), Some(SkipReason::Acronym));
        assert_eq!(reason_of(text, "I"), None);
    }

    #[test]
    fn capitalization_policies() {
        let text = "The Teh New York";

        let lenient = reasons(text, &SkipPolicy::default());
        assert_eq!(lenient[0].1, Some(SkipReason::Capitalized));
        assert_eq!(lenient[1].1, None);
        assert_eq!(lenient[2].1, Some(SkipReason::Capitalized));
        assert_eq!(lenient[3].1, None);

        let blanket = reasons(text, &SkipPolicy::new(CapitalizationPolicy::SkipAll));
        assert!(blanket
            .iter()
            .all(|(_, r)| *r == Some(SkipReason::Capitalized)));
    }

    #[test]
    fn first_match_wins() {
        #[derive(Debug)]
        struct Everything;

        impl SkipRule for Everything {
            fn reason(&self) -> SkipReason {
                SkipReason::KnownTerm
            }

            fn applies(&self, _token: &Token<'_>, _cx: &SkipContext<'_>) -> bool {
                true
            }
        }

        let mut policy = SkipPolicy::default();
        policy.push(Everything);

        let text = "NASA qwrtp";
        let found = reasons(text, &policy);
        assert_eq!(found[0].1, Some(SkipReason::Acronym));
        assert_eq!(found[1].1, Some(SkipReason::KnownTerm));
        assert_eq!(policy.rules().count(), 10);
    }
}
