//! Trailing-edge rate limiter for event handlers
//!
//! [`throttle`] wraps a callback so it runs at most once per window. A call
//! that lands inside the window schedules one trailing run on the tokio timer
//! with that call's arguments; further calls are dropped until it has fired.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{sleep, Instant};
use tracing::{trace, warn};

#[derive(Debug, Default)]
struct ThrottleState {
    last_run: Option<Instant>,
    pending: bool,
}

struct Inner<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    window: Duration,
    state: Mutex<ThrottleState>,
}

impl<A> Inner<A> {
    fn state(&self) -> MutexGuard<'_, ThrottleState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run_trailing(&self, args: A) {
        {
            let mut state = self.state();
            state.last_run = Some(Instant::now());
            state.pending = false;
        }
        trace!("throttled call: trailing run");
        (self.func)(args);
    }
}

/// Rate-limited callback returned by [`throttle`].
///
/// Clones share the same window; separate `throttle` calls never do.
pub struct Throttled<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Throttled<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Throttled<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("window", &self.inner.window)
            .field("state", &*self.inner.state())
            .finish()
    }
}

/// Wrap `func` so it runs at most once per `window`
pub fn throttle<A, F>(func: F, window: Duration) -> Throttled<A>
where
    F: Fn(A) + Send + Sync + 'static,
    A: Send + 'static,
{
    Throttled {
        inner: Arc::new(Inner {
            func: Box::new(func),
            window,
            state: Mutex::new(ThrottleState::default()),
        }),
    }
}

impl<A: Send + 'static> Throttled<A> {
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Check if a trailing run is scheduled
    pub fn is_pending(&self) -> bool {
        self.inner.state().pending
    }

    /// Invoke the wrapped callback now, or schedule/drop the call if the
    /// window since the last run has not elapsed.
    ///
    /// A deferred run needs a tokio runtime; without one the call is dropped.
    /// If every handle is dropped before a deferred run fires, it is skipped.
    pub fn call(&self, args: A) {
        let now = Instant::now();
        let mut state = self.inner.state();

        let elapsed = state.last_run.map(|last| now.saturating_duration_since(last));
        let remaining = match elapsed {
            Some(elapsed) if elapsed < self.inner.window => self.inner.window - elapsed,
            _ => {
                state.last_run = Some(now);
                drop(state);
                trace!("throttled call: immediate run");
                (self.inner.func)(args);
                return;
            }
        };

        if state.pending {
            trace!("throttled call dropped, trailing run already pending");
            return;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(?e, "no runtime for trailing throttled call, dropping it");
                return;
            }
        };

        state.pending = true;
        drop(state);

        trace!(delay_ms = remaining.as_millis() as u64, "throttled call deferred");
        let inner: Weak<Inner<A>> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            sleep(remaining).await;
            match inner.upgrade() {
                Some(inner) => inner.run_trailing(args),
                None => trace!("throttled callback dropped before trailing run"),
            }
        });
    }
}
