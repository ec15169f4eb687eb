//! Default file locations.
use std::path::PathBuf;

const APP_DIR: &str = "wrtr";

/// The per-user data directory, e.g. `~/.local/share/wrtr` on Linux.
/// Falls back to `./wrtr` when the platform reports none.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn dictionary_dir() -> PathBuf {
    data_dir().join("dictionary")
}

pub fn default_user_dictionary_path() -> PathBuf {
    dictionary_dir().join("user_dictionary.txt")
}

pub fn default_base_dictionary_path() -> PathBuf {
    dictionary_dir().join("frequency_dictionary_en_82_765.txt")
}
