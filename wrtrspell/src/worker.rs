//! Background scanning.
//!
//! Hosts submit the document after each edit and poll for results from their
//! event loop. Requests carry a version; the worker skips requests that are
//! already superseded and the receiving side drops results that arrive late.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::cursor::MisspelledEntry;
use crate::speller::error::SpellerError;
use crate::speller::Speller;

const THREAD_NAME: &str = "wrtrspell-scan";

/// A document to scan, stamped with the version that requested it.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub version: u64,
    pub document: String,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub version: u64,
    pub document: String,
    pub entries: Vec<MisspelledEntry>,
}

pub struct ScanWorker {
    requests: Option<Sender<ScanRequest>>,
    results: Receiver<ScanResult>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ScanWorker {
    pub fn spawn(speller: Arc<Speller>) -> Result<ScanWorker, SpellerError> {
        let (request_tx, request_rx) = mpsc::channel::<ScanRequest>();
        let (result_tx, result_rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));

        let worker_latest = latest.clone();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                while let Ok(mut request) = request_rx.recv() {
                    // only the newest queued document matters
                    while let Ok(newer) = request_rx.try_recv() {
                        request = newer;
                    }

                    if request.version < worker_latest.load(Ordering::Acquire) {
                        trace!("skipping superseded scan {}", request.version);
                        continue;
                    }

                    let entries = speller.check(&request.document);
                    let result = ScanResult {
                        version: request.version,
                        document: request.document,
                        entries,
                    };
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
                debug!("scan worker exiting");
            })
            .map_err(|source| SpellerError::Spawn {
                name: THREAD_NAME,
                source,
            })?;

        Ok(ScanWorker {
            requests: Some(request_tx),
            results: result_rx,
            latest,
            handle: Some(handle),
        })
    }

    /// Queues a scan. Returns `false` if the worker thread has stopped.
    pub fn submit(&self, request: ScanRequest) -> bool {
        self.latest.fetch_max(request.version, Ordering::AcqRel);
        match self.requests.as_ref() {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    pub fn latest_version(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    fn is_current(&self, result: &ScanResult) -> bool {
        let latest = self.latest_version();
        if result.version < latest {
            trace!("dropping stale scan {} (latest {})", result.version, latest);
            return false;
        }
        true
    }

    /// The result for the newest submitted request, if it is ready.
    pub fn poll(&self) -> Option<ScanResult> {
        let mut found = None;
        while let Ok(result) = self.results.try_recv() {
            if self.is_current(&result) {
                found = Some(result);
            }
        }
        found
    }

    /// Blocks until the newest submitted request has been scanned or `timeout`
    /// elapses.
    pub fn wait(&self, timeout: Duration) -> Option<ScanResult> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(result) if self.is_current(&result) => return Some(result),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            }
        }
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::tests::sample_index;
    use crate::session::SpellcheckSession;
    use crate::speller::SpellerConfig;

    fn speller() -> Arc<Speller> {
        Speller::new(sample_index(), None, SpellerConfig::default()).unwrap()
    }

    #[test]
    fn scans_in_background() {
        let worker = ScanWorker::spawn(speller()).unwrap();

        assert!(worker.submit(ScanRequest {
            version: 1,
            document: "teh cat".into(),
        }));
        let result = worker.wait(Duration::from_secs(10)).unwrap();

        assert_eq!(result.version, 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].word, "teh");
    }

    #[test]
    fn only_newest_result_is_delivered() {
        let speller = speller();
        let worker = ScanWorker::spawn(speller.clone()).unwrap();
        let mut session = SpellcheckSession::new(speller);

        for document in ["teh", "teh ths", "teh ths wrod"] {
            worker.submit(session.request_scan(document));
        }

        let result = worker.wait(Duration::from_secs(10)).unwrap();
        assert_eq!(result.version, 3);
        assert!(session.accept_scan(result));
        assert_eq!(session.list().len(), 3);
        assert!(worker.poll().is_none());
    }
}
