//! Word tokenization over Markdown documents.
//!
//! Tokens are maximal runs of letters and digits, with apostrophes allowed
//! between them so contractions and possessives stay whole. Leading and
//! trailing apostrophes are kept on the token too, since they are usually
//! quote marks that the skip rules look at. Every token carries its byte
//! offset into the scanned document.
use std::sync::OnceLock;

use regex::{Matches, Regex};
use smol_str::SmolStr;

pub mod case_handling;
pub mod spans;

use self::case_handling::lower_case;

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"['‘’]*[\p{L}\p{M}\p{N}]+(?:['’][\p{L}\p{M}\p{N}]+)*['’]*")
            .expect("word pattern is valid")
    })
}

/// Replaces typographic apostrophes with ASCII ones.
pub fn normalize_apostrophes(word: &str) -> String {
    word.replace(['’', '‘'], "'")
}

pub struct WordIndices<'t> {
    inner: Matches<'static, 't>,
}

impl<'t> Iterator for WordIndices<'t> {
    type Item = (usize, &'t str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|m| (m.start(), m.as_str()))
    }
}

pub struct Words<'t>(WordIndices<'t>);

impl<'t> Iterator for Words<'t> {
    type Item = &'t str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, word)| word)
    }
}

pub trait Tokenize {
    fn word_indices(&self) -> WordIndices<'_>;
    fn words(&self) -> Words<'_>;
}

impl Tokenize for str {
    fn word_indices(&self) -> WordIndices<'_> {
        WordIndices {
            inner: word_regex().find_iter(self),
        }
    }

    fn words(&self) -> Words<'_> {
        Words(self.word_indices())
    }
}

/// A word as found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t> {
    /// byte offset of the word in the scanned document
    pub offset: usize,
    /// the word exactly as written
    pub text: &'t str,
    /// lower case form with ASCII apostrophes, used for every lookup
    pub lower: SmolStr,
}

impl<'t> Token<'t> {
    pub fn new(offset: usize, text: &'t str) -> Token<'t> {
        Token {
            offset,
            text,
            lower: lower_case(&normalize_apostrophes(text)),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// The token without leading or trailing apostrophes.
    pub fn core(&self) -> Token<'t> {
        let is_quote = |c: char| matches!(c, '\'' | '‘' | '’');
        let start = self.text.len() - self.text.trim_start_matches(is_quote).len();
        let text = self.text[start..].trim_end_matches(is_quote);
        Token::new(self.offset + start, text)
    }
}

/// Tokenizes a whole document.
pub fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    text.word_indices()
        .map(|(offset, word)| Token::new(offset, word))
}
