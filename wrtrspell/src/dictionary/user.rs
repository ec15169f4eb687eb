//! The user's personal word list.
//!
//! A plain text file with one `term` or `term count` per line. Words are
//! appended when the user adds them and the whole file is re-read before
//! every scan, so edits made by hand show up without a restart.
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashSet;
use log::{debug, warn};
use smol_str::SmolStr;

use super::{parse_line, DictionaryEntry};
use crate::speller::error::SpellerError;
use crate::tokenizer::case_handling::lower_case;

#[derive(Debug, Clone)]
pub struct UserDictionary {
    path: PathBuf,
}

impl UserDictionary {
    /// Opens the dictionary at `path`, creating the file and its parent
    /// directories if they are missing. Failing to create them is not fatal:
    /// the dictionary then behaves as empty until a write succeeds.
    pub fn open<P: AsRef<Path>>(path: P) -> UserDictionary {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Err(e) = Self::create(&path) {
                warn!("could not create user dictionary {}: {}", path.display(), e);
            }
        }

        UserDictionary { path }
    }

    fn create(path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every term in file order, lower-cased and without duplicates.
    pub fn load_terms(&self) -> Vec<DictionaryEntry> {
        match self.read_terms() {
            Ok(terms) => terms,
            Err(e) => {
                warn!("could not read user dictionary {}: {}", self.path.display(), e);
                vec![]
            }
        }
    }

    fn read_terms(&self) -> io::Result<Vec<DictionaryEntry>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut seen: HashSet<SmolStr> = HashSet::new();
        let mut terms = vec![];

        for line in BufReader::new(file).lines() {
            let line = line?;
            if let Some((term, frequency)) = parse_line(&line) {
                let term = lower_case(term);
                if seen.insert(term.clone()) {
                    terms.push(DictionaryEntry { term, frequency });
                }
            }
        }

        debug!("read {} user terms from {}", terms.len(), self.path.display());
        Ok(terms)
    }

    /// Appends `term` on its own line.
    pub fn append(&self, term: &str) -> Result<(), SpellerError> {
        let persistence = |source| SpellerError::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(persistence)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(persistence)?;

        writeln!(file, "{}", term).map_err(persistence)
    }
}
