//! Loading the base frequency dictionary, with a one-time download when the
//! file has never been fetched.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use log::{debug, error, info, warn};

use super::SymSpellIndex;
use crate::speller::error::SpellerError;

/// English frequency list published with SymSpell, used when no local copy exists.
pub const DEFAULT_DICTIONARY_URL: &str = "https://raw.githubusercontent.com/mammothb/symspellpy/master/symspellpy/frequency_dictionary_en_82_765.txt";

#[cfg(feature = "bootstrap")]
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Loads `path` into `index`. When the file is missing and `url` is given, the
/// dictionary is downloaded to `path` first. Returns the number of terms added.
pub fn load_base_dictionary(
    index: &mut SymSpellIndex,
    path: &Path,
    url: Option<&str>,
    count_threshold: u64,
) -> Result<usize, SpellerError> {
    if !path.exists() {
        let result = match url {
            Some(url) => fetch(url, path),
            None => Err(SpellerError::DictionaryUnavailable {
                path: path.to_path_buf(),
                reason: "file does not exist".into(),
            }),
        };

        if let Err(e) = result {
            error!("{}", e);
            return Err(match e {
                e @ SpellerError::DictionaryUnavailable { .. } => e,
                e => SpellerError::DictionaryUnavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                },
            });
        }
    }

    let started = Instant::now();
    let file = File::open(path).map_err(|e| {
        error!("could not open dictionary {}: {}", path.display(), e);
        SpellerError::DictionaryUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let added = index
        .load_frequency_dictionary(BufReader::new(file), count_threshold)
        .map_err(|source| SpellerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    if added == 0 {
        warn!(
            "dictionary {} is empty, every word will be flagged",
            path.display()
        );
    }
    debug!(
        "loaded {} terms from {} in {:?}",
        added,
        path.display(),
        started.elapsed()
    );

    Ok(added)
}

#[cfg(feature = "bootstrap")]
fn fetch(url: &str, path: &Path) -> Result<(), SpellerError> {
    use std::io::{Read, Write};

    info!("dictionary not found at {}, downloading {}", path.display(), url);

    let download = |reason: String| SpellerError::Download {
        url: url.to_string(),
        reason,
    };
    let persistence = |source| SpellerError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let response = ureq::get(url)
        .set("User-Agent", concat!("wrtrspell/", env!("CARGO_PKG_VERSION")))
        .call()
        .map_err(|e| download(e.to_string()))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES)
        .read_to_end(&mut bytes)
        .map_err(|e| download(e.to_string()))?;

    if bytes.is_empty() {
        return Err(download("empty response".into()));
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(persistence)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(persistence)?;
    tmp.write_all(&bytes).map_err(persistence)?;
    tmp.as_file().sync_all().map_err(persistence)?;
    tmp.persist(path).map_err(|e| persistence(e.error))?;

    info!("saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(not(feature = "bootstrap"))]
fn fetch(url: &str, path: &Path) -> Result<(), SpellerError> {
    info!("not downloading {}, built without bootstrap support", url);
    Err(SpellerError::DictionaryUnavailable {
        path: path.to_path_buf(),
        reason: "file does not exist".into(),
    })
}
