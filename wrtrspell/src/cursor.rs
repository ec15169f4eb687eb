//! The list of misspellings found by the last scan and a cursor over it.
use std::ops::Range;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::speller::suggestion::Suggestion;

/// A misspelled word and where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisspelledEntry {
    /// the word as written in the document
    pub word: SmolStr,
    /// corrections, closest first
    pub suggestions: Vec<Suggestion>,
    /// byte offset into the scanned document
    pub offset: usize,
}

impl MisspelledEntry {
    pub fn end(&self) -> usize {
        self.offset + self.word.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Offset counted in characters, for hosts that index text by `char`.
    /// `text` must be the scanned document.
    pub fn char_offset(&self, text: &str) -> usize {
        let offset = self.offset.min(text.len());
        match text.get(..offset) {
            Some(prefix) => prefix.chars().count(),
            None => text.char_indices().take_while(|(i, _)| *i < offset).count(),
        }
    }
}

/// What happens when moving past either end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// go around to the other end
    Wrap,
    /// stay on the first or last entry
    Clamp,
}

impl Default for NavigationMode {
    fn default() -> Self {
        NavigationMode::Wrap
    }
}

/// Scan results in document order plus the current position.
///
/// The cursor is `None` exactly when the list is empty.
#[derive(Debug, Clone, Default)]
pub struct MisspellingList {
    entries: Vec<MisspelledEntry>,
    current: Option<usize>,
    mode: NavigationMode,
}

impl MisspellingList {
    pub fn new(mode: NavigationMode) -> MisspellingList {
        MisspellingList {
            entries: vec![],
            current: None,
            mode,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: NavigationMode) {
        self.mode = mode;
    }

    /// Installs a fresh scan result with the cursor on the first entry.
    pub fn replace(&mut self, entries: Vec<MisspelledEntry>) -> &[MisspelledEntry] {
        self.current = if entries.is_empty() { None } else { Some(0) };
        self.entries = entries;
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn entries(&self) -> &[MisspelledEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<&MisspelledEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn position(&self) -> Option<usize> {
        self.current
    }

    /// The cursor as a signed index, `-1` when there is nothing to show.
    pub fn current_index(&self) -> isize {
        self.current.map_or(-1, |i| i as isize)
    }

    pub fn next(&mut self) -> Option<&MisspelledEntry> {
        let i = self.current?;
        let last = self.entries.len() - 1;
        self.current = Some(match self.mode {
            NavigationMode::Wrap if i == last => 0,
            _ => (i + 1).min(last),
        });
        self.current()
    }

    pub fn previous(&mut self) -> Option<&MisspelledEntry> {
        let i = self.current?;
        let last = self.entries.len() - 1;
        self.current = Some(match self.mode {
            NavigationMode::Wrap if i == 0 => last,
            _ => i.saturating_sub(1),
        });
        self.current()
    }

    /// Moves to `index`. Out of range leaves the cursor where it was.
    pub fn select(&mut self, index: usize) -> Option<&MisspelledEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.current = Some(index);
        self.current()
    }

    /// Puts the cursor back where it was before a rescan, clamped to the new
    /// length.
    pub fn restore_index(&mut self, previous: Option<usize>) -> Option<&MisspelledEntry> {
        self.current = match self.entries.len() {
            0 => None,
            len => Some(previous.unwrap_or(0).min(len - 1)),
        };
        self.current()
    }

    /// Lands on the first entry at or after `offset`, or the last entry when
    /// every entry is before it.
    pub fn reposition_after(&mut self, offset: usize) -> Option<&MisspelledEntry> {
        self.current = match self.entries.len() {
            0 => None,
            len => Some(
                self.entries
                    .partition_point(|e| e.offset < offset)
                    .min(len - 1),
            ),
        };
        self.current()
    }

    /// `(current, total)` with a 1-based current, for status displays.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.current.map(|i| (i + 1, self.entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, offset: usize) -> MisspelledEntry {
        MisspelledEntry {
            word: word.into(),
            suggestions: vec![],
            offset,
        }
    }

    fn list(mode: NavigationMode) -> MisspellingList {
        let mut list = MisspellingList::new(mode);
        list.replace(vec![entry("teh", 0), entry("ths", 10), entry("wrod", 20)]);
        list
    }

    fn word(e: Option<&MisspelledEntry>) -> Option<&str> {
        e.map(|e| e.word.as_str())
    }

    #[test]
    fn empty_state() {
        let mut list = MisspellingList::default();

        assert_eq!(list.current_index(), -1);
        assert!(list.current().is_none());
        assert!(list.next().is_none());
        assert!(list.previous().is_none());
        assert!(list.reposition_after(3).is_none());
        assert!(list.restore_index(Some(2)).is_none());
        assert_eq!(list.progress(), None);
        assert_eq!(list.current_index(), -1);
    }

    #[test]
    fn wraps_around() {
        let mut list = list(NavigationMode::Wrap);

        assert_eq!(list.current_index(), 0);
        assert_eq!(word(list.previous()), Some("wrod"));
        assert_eq!(word(list.next()), Some("teh"));
        assert_eq!(word(list.next()), Some("ths"));
        assert_eq!(word(list.next()), Some("wrod"));
        assert_eq!(word(list.next()), Some("teh"));
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let mut list = list(NavigationMode::Wrap);
        list.select(1);

        for _ in 0..list.len() {
            list.next();
        }
        assert_eq!(list.current_index(), 1);

        for _ in 0..list.len() {
            list.previous();
        }
        assert_eq!(list.current_index(), 1);
    }

    #[test]
    fn clamps_at_ends() {
        let mut list = list(NavigationMode::Clamp);

        assert_eq!(word(list.previous()), Some("teh"));
        list.next();
        list.next();
        assert_eq!(word(list.next()), Some("wrod"));
        assert_eq!(list.current_index(), 2);
    }

    #[test]
    fn replace_resets_cursor() {
        let mut list = list(NavigationMode::Wrap);
        list.select(2);

        list.replace(vec![entry("a", 1)]);
        assert_eq!(list.current_index(), 0);

        list.replace(vec![]);
        assert_eq!(list.current_index(), -1);
    }

    #[test]
    fn select_out_of_range() {
        let mut list = list(NavigationMode::Wrap);
        list.select(1);

        assert!(list.select(7).is_none());
        assert_eq!(list.current_index(), 1);
        assert_eq!(list.progress(), Some((2, 3)));
    }

    #[test]
    fn reposition_and_restore() {
        let mut list = list(NavigationMode::Wrap);

        assert_eq!(word(list.reposition_after(10)), Some("ths"));
        assert_eq!(word(list.reposition_after(11)), Some("wrod"));
        assert_eq!(word(list.reposition_after(99)), Some("wrod"));
        assert_eq!(word(list.reposition_after(0)), Some("teh"));

        assert_eq!(word(list.restore_index(Some(1))), Some("ths"));
        assert_eq!(word(list.restore_index(Some(8))), Some("wrod"));
        assert_eq!(word(list.restore_index(None)), Some("teh"));
    }

    #[test]
    fn offsets() {
        let text = "héllo teh";
        let e = entry("teh", text.find("teh").unwrap());

        assert_eq!(e.offset, 7);
        assert_eq!(e.char_offset(text), 6);
        assert_eq!(&text[e.range()], "teh");
    }
}
