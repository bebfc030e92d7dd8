// src/timers.rs
//! Deferred phase continuations, keyed by session epoch so a reset can cancel them.
//!
//! The session only *requests* timers ([`TimerRequest`]); [`TimerSet`] turns requests
//! into tokio tasks and aborts them on reset. A continuation that still slips through
//! (already woken when the abort lands) is rejected by the epoch check on delivery.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::TimingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Cheering → Analyzing, once the mood reached `excited`.
    CalmDown,
    /// Analyzing → Results.
    Analysis,
    /// Results → "you were fooled" overlay.
    Disclosure,
}

impl TimerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerKind::CalmDown => "calm_down",
            TimerKind::Analysis => "analysis",
            TimerKind::Disclosure => "disclosure",
        }
    }

    pub fn delay(self, timing: &TimingConfig) -> Duration {
        let units = match self {
            TimerKind::CalmDown => timing.calm_down_units,
            TimerKind::Analysis => timing.analysis_units,
            TimerKind::Disclosure => timing.disclosure_units,
        };
        timing.units(units)
    }
}

/// A continuation the session wants delivered after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub kind: TimerKind,
    pub epoch: u64,
    pub delay: Duration,
}

/// Live tokio timers, at most one per kind.
#[derive(Debug, Default)]
pub struct TimerSet {
    pending: HashMap<TimerKind, AbortHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `fire(request)` after the requested delay. The deadline is fixed now,
    /// not when the task is first polled. Must be called inside a tokio runtime.
    pub fn schedule<F, Fut>(&mut self, request: TimerRequest, fire: F)
    where
        F: FnOnce(TimerRequest) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let deadline = Instant::now() + request.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            fire(request).await;
        });
        debug!(
            target: "timers",
            kind = request.kind.as_str(),
            epoch = request.epoch,
            delay_ms = request.delay.as_millis() as u64,
            "timer scheduled"
        );
        if let Some(old) = self.pending.insert(request.kind, handle.abort_handle()) {
            old.abort();
        }
    }

    /// Forget a timer that has fired.
    pub fn finished(&mut self, kind: TimerKind) {
        self.pending.remove(&kind);
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        for (kind, handle) in self.pending.drain() {
            handle.abort();
            debug!(target: "timers", kind = kind.as_str(), "timer cancelled");
        }
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn req(kind: TimerKind, ms: u64) -> TimerRequest {
        TimerRequest {
            kind,
            epoch: 1,
            delay: Duration::from_millis(ms),
        }
    }

    #[test]
    fn delays_follow_timing_config() {
        let t = TimingConfig::default();
        assert_eq!(TimerKind::CalmDown.delay(&t), Duration::from_secs(1));
        assert_eq!(TimerKind::Analysis.delay(&t), Duration::from_secs(3));
        assert_eq!(TimerKind::Disclosure.delay(&t), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut set = TimerSet::new();
        let h = hits.clone();
        set.schedule(req(TimerKind::Analysis, 3000), move |_| async move {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(set.len(), 1);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_pending_timers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut set = TimerSet::new();
        for kind in [TimerKind::CalmDown, TimerKind::Disclosure] {
            let h = hits.clone();
            set.schedule(req(kind, 100), move |_| async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(set.len(), 2);
        assert_eq!(set.cancel_all(), 2);
        assert!(set.is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_same_kind_replaces_old_timer() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut set = TimerSet::new();
        for _ in 0..3 {
            let h = hits.clone();
            set.schedule(req(TimerKind::CalmDown, 100), move |_| async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(set.len(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
