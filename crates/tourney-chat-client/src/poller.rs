//! Feed poller.
//!
//! The [`Poller`] owns the high-water mark: the highest token it has handed
//! to the reconciler. Every cycle it asks the server for everything newer,
//! applies the batch under a single lock acquisition and moves the mark
//! forward. Failed cycles are dropped and retried on the next tick.
//!
//! Scheduling is skip-if-busy: [`Poller::spawn`] awaits each cycle before
//! taking the next tick, and ticks missed while a slow request was in flight
//! are skipped rather than replayed, so polls never overlap.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tourney_chat_core::{ApplyReport, Reconciler, RenderSurface, RoomId, Token};

use crate::transport::ChatTransport;

/// A reconciler shared between the poller task and the UI.
pub type SharedReconciler<S> = Arc<Mutex<Reconciler<S>>>;

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The server had nothing new.
    Empty,
    /// A batch was handed to the reconciler.
    Applied(ApplyReport),
    /// The request failed; nothing changed.
    Failed,
}

/// Polls the chat feed and feeds the reconciler.
pub struct Poller<T: ChatTransport + ?Sized, S: RenderSurface> {
    transport: Arc<T>,
    room: RoomId,
    reconciler: SharedReconciler<S>,
    interval: Duration,
    high_water: Token,
    high_water_tx: watch::Sender<Token>,
    consecutive_failures: u32,
}

impl<T, S> Poller<T, S>
where
    T: ChatTransport + ?Sized + 'static,
    S: RenderSurface + Send + 'static,
    S::Handle: Send,
{
    /// Create a poller starting from an empty feed.
    pub fn new(
        transport: Arc<T>,
        room: RoomId,
        reconciler: SharedReconciler<S>,
        interval: Duration,
    ) -> Self {
        let (high_water_tx, _) = watch::channel(Token::ZERO);
        Self {
            transport,
            room,
            reconciler,
            interval,
            high_water: Token::ZERO,
            high_water_tx,
            consecutive_failures: 0,
        }
    }

    /// Highest token handed to the reconciler so far.
    #[must_use]
    pub const fn high_water(&self) -> Token {
        self.high_water
    }

    /// Run one poll cycle.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let events = match self.transport.fetch_since(self.room, self.high_water).await {
            Ok(events) => events,
            Err(err) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures == 1 {
                    tracing::warn!(
                        room = %self.room,
                        high_water = %self.high_water,
                        error = %err,
                        "Chat poll failed, retrying on next tick"
                    );
                } else {
                    tracing::debug!(
                        failures = self.consecutive_failures,
                        error = %err,
                        "Chat poll still failing"
                    );
                }
                return PollOutcome::Failed;
            }
        };

        if self.consecutive_failures > 0 {
            tracing::info!(failures = self.consecutive_failures, "Chat poll recovered");
            self.consecutive_failures = 0;
        }

        if events.is_empty() {
            return PollOutcome::Empty;
        }

        let report = self.reconciler.lock().apply(&events);

        if let Some(last) = report.last_token {
            if last > self.high_water {
                self.high_water = last;
                self.high_water_tx.send_replace(last);
            }
        }

        tracing::debug!(
            applied = report.applied,
            skipped = report.skipped,
            dangling = report.dangling.len(),
            high_water = %self.high_water,
            "Applied chat batch"
        );
        PollOutcome::Applied(report)
    }

    /// Start polling in the background: once immediately, then every
    /// interval until the returned handle is stopped or dropped.
    pub fn spawn(mut self) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let high_water = self.high_water_tx.subscribe();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(room = %self.room, interval = ?self.interval, "Chat poller started");

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    _ = self.poll_once() => {}
                }
            }

            tracing::info!(high_water = %self.high_water, "Chat poller stopped");
            self.high_water
        });

        PollerHandle {
            shutdown: shutdown_tx,
            high_water,
            task,
        }
    }
}

/// Handle to a running [`Poller`].
///
/// Dropping the handle also stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    high_water: watch::Receiver<Token>,
    task: JoinHandle<Token>,
}

impl PollerHandle {
    /// Highest token applied so far.
    #[must_use]
    pub fn high_water(&self) -> Token {
        *self.high_water.borrow()
    }

    /// Whether the poll task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and return the final high-water mark.
    ///
    /// An in-flight request is abandoned.
    pub async fn stop(self) -> Token {
        let last_seen = *self.high_water.borrow();
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "Chat poller task ended abnormally");
                last_seen
            }
        }
    }
}
