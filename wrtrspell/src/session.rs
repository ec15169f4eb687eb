//! Per-document spellcheck state.
//!
//! A [`SpellcheckSession`] remembers the document it last scanned together
//! with the misspellings found in it. Every operation that changes what is
//! flagged rescans that document, so offsets in the list always refer to the
//! stored text.
use std::ops::Range;
use std::sync::Arc;

use log::debug;

use crate::cursor::{MisspelledEntry, MisspellingList};
use crate::position::{offset_to_position, Position};
use crate::speller::error::SpellerError;
use crate::speller::Speller;
use crate::tokenizer::case_handling::upper_first;
use crate::worker::{ScanRequest, ScanResult};

/// Result of replacing the current word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// the document with the replacement applied
    pub document: String,
    /// byte range of the inserted text in `document`
    pub range: Range<usize>,
}

#[derive(Debug)]
pub struct SpellcheckSession {
    speller: Arc<Speller>,
    list: MisspellingList,
    document: String,
    // latest document handed out by `request_scan` and not yet installed
    pending: Option<String>,
    version: u64,
}

impl SpellcheckSession {
    pub fn new(speller: Arc<Speller>) -> SpellcheckSession {
        let list = MisspellingList::new(speller.config().navigation);
        SpellcheckSession {
            speller,
            list,
            document: String::new(),
            pending: None,
            version: 0,
        }
    }

    pub fn speller(&self) -> &Arc<Speller> {
        &self.speller
    }

    pub fn list(&self) -> &MisspellingList {
        &self.list
    }

    /// The document the current list was computed from.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Scans `document` from scratch. The cursor moves to the first
    /// misspelling.
    pub fn check_text(&mut self, document: &str) -> &[MisspelledEntry] {
        self.version += 1;
        self.install(document.to_string());
        self.list.entries()
    }

    fn install(&mut self, document: String) {
        let entries = self.speller.check(&document);
        self.pending = None;
        self.document = document;
        self.list.replace(entries);
    }

    /// Rescans the newest known text: a requested document still in flight
    /// takes precedence over the installed one.
    fn rescan(&mut self) {
        let document = match self.pending.take() {
            Some(document) => document,
            None => std::mem::take(&mut self.document),
        };
        self.version += 1;
        self.install(document);
    }

    pub fn get_current_word(&self) -> Option<&MisspelledEntry> {
        self.list.current()
    }

    pub fn current_index(&self) -> isize {
        self.list.current_index()
    }

    pub fn next_word(&mut self) -> Option<&MisspelledEntry> {
        self.list.next()
    }

    pub fn previous_word(&mut self) -> Option<&MisspelledEntry> {
        self.list.previous()
    }

    pub fn select(&mut self, index: usize) -> Option<&MisspelledEntry> {
        self.list.select(index)
    }

    pub fn progress(&self) -> Option<(usize, usize)> {
        self.list.progress()
    }

    /// Row and column of the current misspelling in the scanned document.
    pub fn current_position(&self) -> Option<Position> {
        self.list
            .current()
            .map(|e| offset_to_position(&self.document, e.offset))
    }

    /// Adds `word` to the user dictionary and rescans. The cursor keeps its
    /// index, clamped to the shorter list.
    pub fn add_to_dictionary(&mut self, word: &str) -> Option<&MisspelledEntry> {
        let previous = self.list.position();
        self.speller.add_to_dictionary(word);
        self.rescan();
        self.list.restore_index(previous)
    }

    /// Ignores `word` until the speller is dropped, then rescans like
    /// [`add_to_dictionary`](Self::add_to_dictionary).
    pub fn ignore_word(&mut self, word: &str) -> Option<&MisspelledEntry> {
        let previous = self.list.position();
        self.speller.ignore_word(word);
        self.rescan();
        self.list.restore_index(previous)
    }

    fn current_word(&self) -> Result<&MisspelledEntry, SpellerError> {
        self.list.current().ok_or(SpellerError::NoCurrentWord)
    }

    pub fn add_current_to_dictionary(&mut self) -> Result<Option<&MisspelledEntry>, SpellerError> {
        let word = self.current_word()?.word.clone();
        Ok(self.add_to_dictionary(&word))
    }

    pub fn ignore_current(&mut self) -> Result<Option<&MisspelledEntry>, SpellerError> {
        let word = self.current_word()?.word.clone();
        Ok(self.ignore_word(&word))
    }

    fn ensure_current_document(&self, document: &str) -> Result<(), SpellerError> {
        if document.len() != self.document.len() || document != self.document {
            return Err(SpellerError::StaleDocument);
        }
        Ok(())
    }

    /// Replaces the current word with its `suggestion_index`th suggestion.
    ///
    /// `document` must be the text last scanned. After the rescan the cursor
    /// is on the first misspelling at or after the replaced word, or on the
    /// last one if none follows.
    pub fn apply_suggestion(
        &mut self,
        document: &str,
        suggestion_index: usize,
        capitalize: bool,
    ) -> Result<Replacement, SpellerError> {
        self.ensure_current_document(document)?;

        let entry = self.current_word()?;
        let suggestion =
            entry
                .suggestions
                .get(suggestion_index)
                .ok_or(SpellerError::SuggestionOutOfRange {
                    index: suggestion_index,
                    len: entry.suggestions.len(),
                })?;

        let text = if capitalize {
            upper_first(&suggestion.value)
        } else {
            suggestion.value.clone()
        };

        self.replace_current(&text)
    }

    /// Replaces the current word with arbitrary text.
    pub fn apply_replacement(
        &mut self,
        document: &str,
        text: &str,
    ) -> Result<Replacement, SpellerError> {
        self.ensure_current_document(document)?;
        self.current_word()?;
        self.replace_current(text)
    }

    fn replace_current(&mut self, text: &str) -> Result<Replacement, SpellerError> {
        let range = self.current_word()?.range();

        let mut updated = String::with_capacity(self.document.len() + text.len());
        updated.push_str(&self.document[..range.start]);
        updated.push_str(text);
        updated.push_str(&self.document[range.end..]);

        debug!(
            "replaced {:?} at {} with {:?}",
            &self.document[range.clone()],
            range.start,
            text
        );

        self.version += 1;
        self.install(updated.clone());
        self.list.reposition_after(range.start);

        Ok(Replacement {
            document: updated,
            range: range.start..range.start + text.len(),
        })
    }

    /// Starts an asynchronous scan. Any result for an earlier request will be
    /// rejected by [`accept_scan`](Self::accept_scan).
    pub fn request_scan(&mut self, document: &str) -> ScanRequest {
        self.version += 1;
        self.pending = Some(document.to_string());
        ScanRequest {
            version: self.version,
            document: document.to_string(),
        }
    }

    /// Installs a background scan result. Returns `false` and leaves the
    /// session untouched if a newer scan was requested since.
    pub fn accept_scan(&mut self, result: ScanResult) -> bool {
        if result.version != self.version {
            debug!(
                "discarding scan for version {}, current is {}",
                result.version, self.version
            );
            return false;
        }

        self.pending = None;
        self.document = result.document;
        self.list.replace(result.entries);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tests::sample_index;
    use crate::speller::SpellerConfig;

    fn session() -> SpellcheckSession {
        let speller = Speller::new(sample_index(), None, SpellerConfig::default()).unwrap();
        SpellcheckSession::new(speller)
    }

    #[test]
    fn check_and_navigate() {
        let mut session = session();
        let entries = session.check_text("Teh cat sat on teh mat.");

        assert_eq!(entries.len(), 2);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_position(), Some(Position::new(0, 0)));
        assert_eq!(session.next_word().map(|e| e.offset), Some(15));
        assert_eq!(session.progress(), Some((2, 2)));
        assert_eq!(session.next_word().map(|e| e.offset), Some(0));
    }

    #[test]
    fn stale_document_is_rejected() {
        let mut session = session();
        session.check_text("teh cat");
        let version = session.version();

        let err = session.apply_suggestion("teh dog", 0, false).unwrap_err();
        assert!(matches!(err, SpellerError::StaleDocument));
        assert_eq!(session.document(), "teh cat");
        assert_eq!(session.version(), version);
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn errors_without_current_word() {
        let mut session = session();
        session.check_text("the cat");

        assert!(matches!(
            session.apply_suggestion("the cat", 0, false),
            Err(SpellerError::NoCurrentWord)
        ));
        assert!(matches!(
            session.add_current_to_dictionary(),
            Err(SpellerError::NoCurrentWord)
        ));

        session.check_text("qwrtpzx");
        assert!(matches!(
            session.apply_suggestion("qwrtpzx", 0, false),
            Err(SpellerError::SuggestionOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn free_form_replacement() {
        let mut session = session();
        session.check_text("a qwrtpzx and teh");

        let replacement = session.apply_replacement("a qwrtpzx and teh", "cat").unwrap();
        assert_eq!(replacement.document, "a cat and teh");
        assert_eq!(&replacement.document[replacement.range.clone()], "cat");
        assert_eq!(session.get_current_word().map(|e| e.word.as_str()), Some("teh"));
    }

    #[test]
    fn capitalized_suggestion() {
        let mut session = session();
        session.check_text("said teh");
        let replacement = session.apply_suggestion("said teh", 0, true).unwrap();

        assert_eq!(replacement.document, "said The");
        assert!(session.get_current_word().is_none());
    }

    #[test]
    fn stale_scans_are_discarded() {
        let mut session = session();
        let speller = session.speller().clone();

        let first = session.request_scan("teh");
        let second = session.request_scan("teh ths");

        let old = ScanResult {
            version: first.version,
            entries: speller.check(&first.document),
            document: first.document,
        };
        assert!(!session.accept_scan(old));
        assert!(session.list().is_empty());

        let new = ScanResult {
            version: second.version,
            entries: speller.check(&second.document),
            document: second.document,
        };
        assert!(session.accept_scan(new));
        assert_eq!(session.list().len(), 2);
        assert_eq!(session.document(), "teh ths");
    }

    #[test]
    fn add_while_scan_in_flight_uses_requested_document() {
        let mut session = session();
        let speller = session.speller().clone();
        session.check_text("teh cat");

        let request = session.request_scan("teh cat ths wrod");
        session.add_to_dictionary("teh");

        assert_eq!(session.document(), "teh cat ths wrod");
        let words: Vec<_> = session.list().entries().iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, vec!["ths", "wrod"]);

        // the worker's result predates the add and is superseded by the rescan
        let late = ScanResult {
            version: request.version,
            entries: speller.check(&request.document),
            document: request.document,
        };
        assert!(!session.accept_scan(late));
        assert_eq!(session.list().len(), 2);

        let document = session.document().to_string();
        let replacement = session.apply_suggestion(&document, 0, false).unwrap();
        assert!(replacement.document.starts_with("teh cat th"));
    }
}
