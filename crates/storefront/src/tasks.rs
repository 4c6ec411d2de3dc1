//! Timers and background work tied to the lifetime of their owner.
//!
//! Nothing here outlives the value that started it: dropping a
//! [`ScopedTask`], a [`Debouncer`] or a countdown stream cancels the
//! underlying timer.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

use shopfront_core::{Countdown, TimeLeft};

/// Delay between the last keystroke and the search being applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Interval between countdown updates.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// A spawned task that is aborted when this handle is dropped.
///
/// Awaiting the handle yields the task's output.
#[derive(Debug)]
pub struct ScopedTask<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> ScopedTask<T> {
    /// Spawn `future` on the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }
}

impl<T> ScopedTask<T> {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for ScopedTask<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx)
    }
}

impl<T> Drop for ScopedTask<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Delivers the last pushed value once no new value arrived for `delay`.
///
/// Values are delivered on the receiver returned by [`Debouncer::new`].
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<ScopedTask<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    /// Restart the timer with `value` as the value to deliver.
    pub fn push(&mut self, value: T) {
        let tx = self.tx.clone();
        let delay = self.delay;
        // Replacing the pending task aborts the previous timer.
        self.pending = Some(ScopedTask::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner is shutting down.
            let _ = tx.send(value);
        }));
    }

    /// Drop any pending value without delivering it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

/// Stream of time left on `countdown`, yielded immediately and then every second.
///
/// After the deadline the stream keeps yielding zero; it ends only when the
/// consumer drops it.
pub fn countdown_ticks(countdown: Countdown) -> impl Stream<Item = TimeLeft> {
    countdown_ticks_with_clock(countdown, Utc::now)
}

/// [`countdown_ticks`] with an injectable wall clock.
pub fn countdown_ticks_with_clock<C>(countdown: Countdown, clock: C) -> impl Stream<Item = TimeLeft>
where
    C: Fn() -> DateTime<Utc> + Send + 'static,
{
    async_stream::stream! {
        let mut interval = tokio::time::interval(COUNTDOWN_TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            yield countdown.remaining(clock());
        }
    }
}
