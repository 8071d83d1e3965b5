//! The "generation in progress" signal.
//!
//! A UI that offers download buttons needs to know when a document is being
//! produced so it can disable repeat requests. [`StatusSignal`] publishes that
//! boolean through a `tokio::sync::watch` channel; readers either poll
//! [`StatusSignal::is_generating`] or await changes on a [`watch::Receiver`].
//!
//! The only way to raise the flag is [`StatusSignal::begin`], which returns a
//! [`GeneratingGuard`]. Dropping the guard lowers the flag, so every exit path
//! of a request (success, returned error, panic) clears it exactly once.
//!
//! The flag is advisory. Two overlapping requests are not serialised here; the
//! caller decides whether to honour it.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Receives every status transition, in order.
///
/// A `watch` receiver only observes the latest value; observers see each
/// `true`/`false` edge individually.
pub trait StatusObserver: Send + Sync {
    fn on_status_change(&self, generating: bool);
}

/// Shared, cloneable handle to the generating flag.
#[derive(Clone)]
pub struct StatusSignal {
    tx: Arc<watch::Sender<bool>>,
    observers: Arc<Vec<Arc<dyn StatusObserver>>>,
}

impl StatusSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            observers: Arc::new(Vec::new()),
        }
    }

    /// Attach an observer. Call before the signal is shared.
    pub fn with_observer(mut self, observer: Arc<dyn StatusObserver>) -> Self {
        Arc::make_mut(&mut self.observers).push(observer);
        self
    }

    /// Subscribe to the current value and later changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        *self.tx.borrow()
    }

    /// Raise the flag for the lifetime of the returned guard.
    pub fn begin(&self) -> GeneratingGuard<'_> {
        self.publish(true);
        GeneratingGuard { signal: self }
    }

    fn publish(&self, generating: bool) {
        debug!("Generating status → {}", generating);
        self.tx.send_replace(generating);
        for observer in self.observers.iter() {
            observer.on_status_change(generating);
        }
    }
}

impl Default for StatusSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSignal")
            .field("generating", &self.is_generating())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Holds the generating flag up. Lowers it on drop.
#[must_use = "dropping the guard immediately clears the generating flag"]
pub struct GeneratingGuard<'a> {
    signal: &'a StatusSignal,
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.signal.publish(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<bool>>);

    impl StatusObserver for Recorder {
        fn on_status_change(&self, generating: bool) {
            self.0.lock().unwrap().push(generating);
        }
    }

    #[test]
    fn guard_raises_and_lowers_once() {
        let recorder = Arc::new(Recorder::default());
        let signal = StatusSignal::new().with_observer(recorder.clone());
        assert!(!signal.is_generating());
        {
            let _guard = signal.begin();
            assert!(signal.is_generating());
        }
        assert!(!signal.is_generating());
        assert_eq!(*recorder.0.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn guard_lowers_on_panic() {
        let recorder = Arc::new(Recorder::default());
        let signal = StatusSignal::new().with_observer(recorder.clone());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = signal.begin();
            panic!("paint crashed");
        }));
        assert!(result.is_err());
        assert!(!signal.is_generating());
        assert_eq!(*recorder.0.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn receivers_see_latest_value() {
        let signal = StatusSignal::new();
        let rx = signal.subscribe();
        let guard = signal.begin();
        assert!(*rx.borrow());
        drop(guard);
        assert!(!*rx.borrow());
    }

    #[test]
    fn clones_share_the_flag() {
        let signal = StatusSignal::new();
        let other = signal.clone();
        let _guard = signal.begin();
        assert!(other.is_generating());
    }
}
