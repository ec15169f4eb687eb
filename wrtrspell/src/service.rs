//! Shared, lazily loaded speller.
//!
//! Building the index for a full frequency dictionary takes a noticeable
//! moment, so hosts start it in the background and show a loading state in
//! the meantime. However many callers ask for the speller while it loads, the
//! loader runs once.
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, error, info};
use parking_lot::{Condvar, Mutex};

use crate::paths::{default_base_dictionary_path, default_user_dictionary_path};
use crate::speller::error::SpellerError;
use crate::speller::{Speller, SpellerConfig};

const THREAD_NAME: &str = "wrtrspell-load";

#[derive(Debug, Clone)]
pub enum LoadState {
    Idle,
    Loading,
    Ready(Arc<Speller>),
    Failed(Arc<SpellerError>),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Where the speller is loaded from.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub dictionary: PathBuf,
    pub user_dictionary: Option<PathBuf>,
    pub config: SpellerConfig,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            dictionary: default_base_dictionary_path(),
            user_dictionary: Some(default_user_dictionary_path()),
            config: SpellerConfig::default(),
        }
    }
}

type Loader = dyn Fn() -> Result<Arc<Speller>, SpellerError> + Send + Sync;

struct Shared {
    state: Mutex<LoadState>,
    done: Condvar,
    loader: Box<Loader>,
}

impl Shared {
    fn run(&self) {
        let started = Instant::now();
        let state = match (self.loader)() {
            Ok(speller) => {
                info!(
                    "speller ready with {} terms in {:?}",
                    speller.dictionary_len(),
                    started.elapsed()
                );
                LoadState::Ready(speller)
            }
            Err(e) => {
                error!("spellcheck unavailable: {}", e);
                LoadState::Failed(Arc::new(e))
            }
        };

        *self.state.lock() = state;
        self.done.notify_all();
    }
}

/// Cheap to clone; clones share the same speller.
#[derive(Clone)]
pub struct SpellerService {
    shared: Arc<Shared>,
}

impl fmt::Debug for SpellerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpellerService")
            .field("state", &*self.shared.state.lock())
            .finish()
    }
}

impl SpellerService {
    pub fn new(options: LoadOptions) -> SpellerService {
        SpellerService::with_loader(move || {
            Speller::load(
                &options.dictionary,
                options.user_dictionary.as_deref(),
                options.config.clone(),
            )
        })
    }

    /// A service that builds its speller with `loader`.
    pub fn with_loader<F>(loader: F) -> SpellerService
    where
        F: Fn() -> Result<Arc<Speller>, SpellerError> + Send + Sync + 'static,
    {
        SpellerService {
            shared: Arc::new(Shared {
                state: Mutex::new(LoadState::Idle),
                done: Condvar::new(),
                loader: Box::new(loader),
            }),
        }
    }

    pub fn state(&self) -> LoadState {
        self.shared.state.lock().clone()
    }

    /// The speller if it has finished loading.
    pub fn get(&self) -> Option<Arc<Speller>> {
        match &*self.shared.state.lock() {
            LoadState::Ready(speller) => Some(speller.clone()),
            _ => None,
        }
    }

    /// Starts loading on a background thread. Returns `false` if a load is
    /// already running or finished.
    pub fn spawn_load(&self) -> bool {
        {
            let mut state = self.shared.state.lock();
            if !matches!(*state, LoadState::Idle) {
                return false;
            }
            *state = LoadState::Loading;
        }

        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || shared.run());

        if let Err(source) = spawned {
            let e = SpellerError::Spawn {
                name: THREAD_NAME,
                source,
            };
            error!("{}", e);
            *self.shared.state.lock() = LoadState::Failed(Arc::new(e));
            self.shared.done.notify_all();
        }

        true
    }

    /// Blocks until the speller is loaded, loading it on this thread if
    /// nobody has started yet. A `reset` that lands while this call waits
    /// starts another load instead of returning the forgotten speller.
    pub fn wait(&self) -> Result<Arc<Speller>, Arc<SpellerError>> {
        let mut state = self.shared.state.lock();

        loop {
            match &*state {
                LoadState::Ready(speller) => return Ok(speller.clone()),
                LoadState::Failed(e) => return Err(e.clone()),
                LoadState::Idle | LoadState::Loading => {}
            }

            if state.is_loading() {
                debug!("waiting for speller to load");
                self.shared.done.wait(&mut state);
                continue;
            }

            *state = LoadState::Loading;
            drop(state);
            self.shared.run();
            state = self.shared.state.lock();
        }
    }

    /// Forgets the loaded speller so the next request loads it again. Has no
    /// effect while a load is running.
    pub fn reset(&self) -> bool {
        let mut state = self.shared.state.lock();
        if state.is_loading() {
            return false;
        }
        *state = LoadState::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tests::sample_index;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_service(delay: Duration) -> (SpellerService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let service = SpellerService::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(delay);
            Speller::new(sample_index(), None, SpellerConfig::default())
        });
        (service, calls)
    }

    #[test]
    fn single_flight() {
        let (service, calls) = counting_service(Duration::from_millis(100));

        assert!(matches!(service.state(), LoadState::Idle));
        assert!(service.spawn_load());
        assert!(!service.spawn_load());

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                thread::spawn(move || service.wait().is_ok())
            })
            .collect();

        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(service.state(), LoadState::Ready(_)));
        assert!(service.get().is_some());
    }

    #[test]
    fn wait_loads_inline() {
        let (service, calls) = counting_service(Duration::from_millis(0));

        assert!(service.get().is_none());
        let speller = service.wait().unwrap();
        assert!(speller.is_correct("believe"));
        assert!(Arc::ptr_eq(&speller, &service.wait().unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_is_sticky_until_reset() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let service = SpellerService::with_loader(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(SpellerError::DictionaryUnavailable {
                path: "missing.txt".into(),
                reason: "file does not exist".into(),
            })
        });

        assert!(service.wait().is_err());
        assert!(service.wait().is_err());
        assert!(matches!(service.state(), LoadState::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(service.reset());
        assert!(service.wait().is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_during_wait_reloads() {
        let (service, calls) = counting_service(Duration::from_millis(1));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                thread::spawn(move || (0..25).all(|_| service.wait().is_ok()))
            })
            .collect();
        let resetter = {
            let service = service.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    service.reset();
                    thread::sleep(Duration::from_micros(200));
                }
            })
        };

        resetter.join().unwrap();
        for waiter in waiters {
            assert!(waiter.join().unwrap());
        }
        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert!(service.wait().is_ok());
    }

    #[test]
    fn loads_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = dir.path().join("frequency.txt");
        std::fs::write(&dictionary, crate::dictionary::tests::SAMPLE).unwrap();

        let service = SpellerService::new(LoadOptions {
            dictionary,
            user_dictionary: Some(dir.path().join("user.txt")),
            config: SpellerConfig {
                bootstrap: false,
                ..SpellerConfig::default()
            },
        });

        let speller = service.wait().unwrap();
        assert!(speller.is_correct("misspelled"));
        assert!(dir.path().join("user.txt").exists());
    }
}
