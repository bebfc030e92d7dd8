// src/orchestrator.rs
//! `MoodSession`: the shared, async-facing handle around one [`Session`].
//!
//! Commands lock the session, run to completion, turn queued timer requests into
//! tokio tasks and publish a fresh snapshot on a `watch` channel. A reset (any command
//! that bumps the epoch) aborts every pending timer. Timer-producing commands must run
//! inside a tokio runtime.

use std::sync::{Arc, Mutex, Weak};

use metrics::counter;
use tokio::sync::watch;
use tracing::info;

use crate::config::{MoodConfig, QuickReply, TimingConfig};
use crate::sentiment::Sentiment;
use crate::session::{ImageHandle, Session, SessionSnapshot};
use crate::timers::{TimerRequest, TimerSet};

#[derive(Clone)]
pub struct MoodSession {
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    tx: watch::Sender<SessionSnapshot>,
}

struct Inner {
    session: Session,
    timers: TimerSet,
}

impl std::fmt::Debug for MoodSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodSession").finish_non_exhaustive()
    }
}

impl MoodSession {
    pub fn new(cfg: &MoodConfig) -> Self {
        Self::from_session(Session::new(cfg))
    }

    pub fn from_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(session.snapshot());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    session,
                    timers: TimerSet::new(),
                }),
                tx,
            }),
        }
    }

    // ---- observables ----

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.tx.borrow().clone()
    }

    /// Receives a new snapshot after every command and every fired timer.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.tx.subscribe()
    }

    pub fn quick_replies(&self) -> Vec<QuickReply> {
        self.read(|s| s.quick_replies().to_vec())
    }

    pub fn timing(&self) -> TimingConfig {
        self.read(|s| *s.timing())
    }

    pub fn pending_timers(&self) -> usize {
        self.shared
            .inner
            .lock()
            .expect("session mutex poisoned")
            .timers
            .len()
    }

    // ---- commands ----

    pub fn image_selected(&self, handle: Option<ImageHandle>) -> bool {
        self.mutate(|s| s.image_selected(handle))
    }

    pub fn cheer_accepted(&self) -> bool {
        self.mutate(|s| s.cheer_accepted())
    }

    pub fn cancel(&self) {
        self.mutate(|s| s.cancel())
    }

    pub fn reset(&self) {
        self.mutate(|s| s.reset())
    }

    pub fn acknowledge_disclosure(&self) -> bool {
        self.mutate(|s| s.acknowledge_disclosure())
    }

    pub fn update_draft(&self, text: &str) -> bool {
        self.mutate(|s| s.update_draft(text))
    }

    pub fn message_sent(&self, text: &str) -> Option<Sentiment> {
        self.mutate(|s| s.message_sent(text))
    }

    pub fn quick_reply(&self, positive: bool) -> bool {
        self.mutate(|s| s.quick_reply(positive))
    }

    pub fn quick_reply_at(&self, index: usize) -> bool {
        self.mutate(|s| s.quick_reply_at(index))
    }

    /// The joke comes back to the caller right away, whatever happens to the mood.
    pub fn tell_joke(&self) -> String {
        self.mutate(|s| s.tell_joke())
    }

    // ---- plumbing ----

    fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        let guard = self.shared.inner.lock().expect("session mutex poisoned");
        f(&guard.session)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        self.with_inner(|inner| f(&mut inner.session))
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut guard = self.shared.inner.lock().expect("session mutex poisoned");
        let inner = &mut *guard;

        let epoch_before = inner.session.epoch();
        let out = f(&mut *inner);

        if inner.session.epoch() != epoch_before {
            let cancelled = inner.timers.cancel_all();
            counter!("mood_resets_total").increment(1);
            info!(target: "session", cancelled, "pending timers cancelled by reset");
        }

        for request in inner.session.take_timer_requests() {
            let weak = Arc::downgrade(&self.shared);
            inner
                .timers
                .schedule(request, move |req| async move { deliver(weak, req) });
        }

        debug_assert!(
            inner.session.invariant_violation().is_none(),
            "session invariant violated: {:?}",
            inner.session.invariant_violation()
        );

        // published under the lock so snapshots never go out of order
        self.shared.tx.send_replace(inner.session.snapshot());
        drop(guard);
        out
    }
}

/// Timer callback. A dropped session simply swallows its late timers.
fn deliver(weak: Weak<Shared>, request: TimerRequest) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let handle = MoodSession { shared };
    handle.with_inner(|inner| {
        if request.epoch == inner.session.epoch() {
            inner.timers.finished(request.kind);
        }
        inner.session.fire(request);
    });
}
