//! One-shot background timer.
//!
//! The timer thread blocks on a zero-capacity channel with `recv_timeout`. Dropping the
//! sender disconnects the channel, which wakes the thread without firing. A timeout
//! runs `on_fire` exactly once on the timer thread.

use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use log::debug;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::utils::config::TIMER_THREAD_NAME;

/// Handle for a timer started with [`start_timer`]. Dropping it cancels.
pub struct TimerHandle<T> {
    cancel_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<Option<T>>>,
    fired: Arc<AtomicBool>,
}

/// Schedule `on_fire` to run once on its own thread after `duration`, unless canceled first.
pub fn start_timer<T, F>(duration: Duration, on_fire: F) -> io::Result<TimerHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (cancel_tx, cancel_rx) = bounded::<()>(0);
    let fired = Arc::new(AtomicBool::new(false));
    let fired_t = Arc::clone(&fired);

    let handle = thread::Builder::new()
        .name(TIMER_THREAD_NAME.to_string())
        .spawn(move || match cancel_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => {
                fired_t.store(true, Ordering::SeqCst);
                Some(on_fire())
            }
            // Disconnected (canceled) or an explicit cancel message.
            _ => None,
        })?;

    Ok(TimerHandle {
        cancel_tx: Some(cancel_tx),
        handle: Some(handle),
        fired,
    })
}

impl<T> TimerHandle<T> {
    /// Prevent firing if the timer is still pending. No-op after firing or a previous cancel.
    pub fn cancel(&mut self) {
        if self.cancel_tx.take().is_some() {
            debug!("timer canceled (fired: {})", self.has_fired());
        }
    }

    /// Whether `on_fire` has started.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Wait for the timer thread. Returns the handler's value if it fired.
    ///
    /// Does not cancel: call [`Self::cancel`] first unless you want to wait out the full duration.
    pub fn join(mut self) -> Option<T> {
        let handle = self.handle.take()?;
        handle.join().unwrap_or_else(|_| {
            log::error!("timer thread panicked");
            None
        })
    }
}

impl<T> Drop for TimerHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
