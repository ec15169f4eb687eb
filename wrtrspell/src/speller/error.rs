//! Error types for spellcheck operations.

use std::path::PathBuf;

/// Errors that can occur while loading dictionaries or driving a spellcheck session.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpellerError {
    /// The base dictionary could not be read and no fallback copy could be obtained
    #[error("Dictionary unavailable at '{}': {reason}", path.display())]
    DictionaryUnavailable {
        /// where the dictionary was expected
        path: PathBuf,
        /// why loading or bootstrapping failed
        reason: String,
    },

    /// I/O error while reading a dictionary file
    #[error("I/O error reading '{}'", path.display())]
    Io {
        /// file being read
        path: PathBuf,
        /// underlying error
        #[source]
        source: std::io::Error,
    },

    /// Writing to the user dictionary failed
    #[error("Failed to persist user dictionary '{}'", path.display())]
    Persistence {
        /// user dictionary file
        path: PathBuf,
        /// underlying error
        #[source]
        source: std::io::Error,
    },

    /// Fetching the fallback dictionary failed
    #[error("Failed to download dictionary from {url}: {reason}")]
    Download {
        /// remote location
        url: String,
        /// transport or status error
        reason: String,
    },

    /// A background thread could not be started
    #[error("Failed to spawn {name} thread")]
    Spawn {
        /// thread name
        name: &'static str,
        /// underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration values are out of range
    #[error("Invalid speller configuration: {0}")]
    InvalidConfig(String),

    /// A document other than the one last scanned was passed in; offsets would be stale
    #[error("Document does not match the last scanned document")]
    StaleDocument,

    /// The misspelling list is empty
    #[error("No current misspelled word")]
    NoCurrentWord,

    /// Requested suggestion does not exist for the current word
    #[error("Suggestion {index} out of range ({len} available)")]
    SuggestionOutOfRange {
        /// requested index
        index: usize,
        /// suggestions available
        len: usize,
    },
}
