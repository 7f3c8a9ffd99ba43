//! headers/iterate.rs
//! Cancellable iteration over a header snapshot.
//!
//! Design notes:
//! - `iterate` snapshots the pairs under the read lock, then hands them to a
//!   producer thread over a bounded channel. Writes after that point are not
//!   seen by the iterator.
//! - The producer re-checks the cancel token before every emission and
//!   selects between sending and the token's close signal, so it never blocks
//!   on a consumer that stopped listening.
//! - Dropping a `HeaderIter` disconnects the channel and joins the producer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::select;
use parking_lot::Mutex;
use tracing::trace;

use crate::constants::ITERATOR_BUFFER_SIZE;
use crate::headers::container::HeaderContainer;
use crate::headers::types::{HeaderFields, HeaderPair};

/// Cancellation signal shared between a caller and iteration producers.
///
/// Cloning yields a handle to the same signal.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    // Dropped on cancel; disconnecting it wakes every `done()` receiver.
    close: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (close, done) = bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                close: Mutex::new(Some(close)),
                done,
            }),
        }
    }

    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.close.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Channel that becomes ready (disconnected) once `cancel` is called.
    pub fn done(&self) -> Receiver<()> {
        self.inner.done.clone()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Lazy, finite sequence of header pairs fed by a producer thread.
pub struct HeaderIter {
    rx: Option<Receiver<HeaderPair>>,
    producer: Option<JoinHandle<()>>,
}

impl HeaderIter {
    fn spawn(pairs: Vec<HeaderPair>, cancel: CancelToken) -> Self {
        let (tx, rx) = bounded(ITERATOR_BUFFER_SIZE);
        trace!(pairs = pairs.len(), "starting header iteration");
        let producer = thread::spawn(move || produce(pairs, tx, cancel));
        Self {
            rx: Some(rx),
            producer: Some(producer),
        }
    }
}

fn produce(pairs: Vec<HeaderPair>, tx: Sender<HeaderPair>, cancel: CancelToken) {
    let done = cancel.done();
    for pair in pairs {
        if cancel.is_cancelled() {
            trace!("header iteration cancelled");
            return;
        }
        select! {
            send(tx, pair) -> res => {
                if res.is_err() {
                    // consumer went away
                    return;
                }
            }
            recv(done) -> _ => {
                trace!("header iteration cancelled");
                return;
            }
        }
    }
}

impl Iterator for HeaderIter {
    type Item = HeaderPair;

    fn next(&mut self) -> Option<HeaderPair> {
        self.rx.as_ref()?.recv().ok()
    }
}

impl Drop for HeaderIter {
    fn drop(&mut self) {
        // Disconnect first so a producer blocked in `send` exits.
        self.rx.take();
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
    }
}

/// Receives pairs from `HeaderContainer::walk`.
pub trait Visitor {
    type Error;

    fn visit(&mut self, pair: &HeaderPair) -> Result<(), Self::Error>;
}

impl<F, E> Visitor for F
where
    F: FnMut(&HeaderPair) -> Result<(), E>,
{
    type Error = E;

    fn visit(&mut self, pair: &HeaderPair) -> Result<(), E> {
        self(pair)
    }
}

impl<F: HeaderFields> HeaderContainer<F> {
    /// Iterate over a snapshot of the present parameters.
    pub fn iterate(&self, cancel: &CancelToken) -> HeaderIter {
        let pairs = self.read().make_pairs();
        HeaderIter::spawn(pairs, cancel.clone())
    }

    /// Feed every pair to `visitor`, stopping at its first error.
    pub fn walk<V: Visitor + ?Sized>(
        &self,
        cancel: &CancelToken,
        visitor: &mut V,
    ) -> Result<(), V::Error> {
        for pair in self.iterate(cancel) {
            visitor.visit(&pair)?;
        }
        Ok(())
    }
}
