// src/session.rs
//! # Session
//! One interaction, start to finish: image → refusal → cheering → fake analysis →
//! results → "you were fooled".
//!
//! Everything here is synchronous and free of I/O. Delays are not awaited; they are
//! queued as [`TimerRequest`]s (drained with [`Session::take_timer_requests`]) and
//! handed back later through [`Session::fire`]. Each request carries the session
//! epoch, which `reset` bumps, so continuations from an abandoned session are
//! ignored.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{MoodConfig, PointsConfig, QuickReply, TimingConfig};
use crate::mood::{MoodAccumulator, MoodChange, MoodTier};
use crate::phase::{Phase, PhaseController};
use crate::result::{AnalysisResult, RandomSource, ResultGenerator, StdRandom};
use crate::sentiment::{anon_hash, Sentiment, SentimentClassifier};
use crate::timers::{TimerKind, TimerRequest};

/// Opaque reference to the uploaded picture (object URL, file id, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(String);

impl ImageHandle {
    /// `None` for blank references.
    pub fn new(reference: impl Into<String>) -> Option<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            None
        } else {
            Some(Self(reference))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub mood_level: u8,
    pub mood_tier: MoodTier,
    pub mood_emoji: &'static str,
    pub image: Option<ImageHandle>,
    pub result: Option<AnalysisResult>,
    pub fooled_revealed: bool,
    pub refusal_prompt_open: bool,
    pub draft: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
enum MoodAdjust {
    Up(u8),
    Down(u8),
}

pub struct Session {
    phase: PhaseController,
    mood: MoodAccumulator,
    image: Option<ImageHandle>,
    result: Option<AnalysisResult>,
    draft: String,
    fooled_revealed: bool,
    refusal_prompt_open: bool,
    updated_at: DateTime<Utc>,

    epoch: u64,
    awaiting: HashSet<TimerKind>,
    outbox: Vec<TimerRequest>,

    classifier: SentimentClassifier,
    generator: ResultGenerator,
    joke_rng: Box<dyn RandomSource>,
    points: PointsConfig,
    timing: TimingConfig,
    jokes: Vec<String>,
    quick_replies: Vec<QuickReply>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.phase.current())
            .field("mood", &self.mood.level())
            .field("epoch", &self.epoch)
            .field("awaiting", &self.awaiting)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&MoodConfig::default())
    }
}

impl Session {
    pub fn new(cfg: &MoodConfig) -> Self {
        Self::with_random(
            cfg,
            Box::new(StdRandom::from_os()),
            Box::new(StdRandom::from_os()),
        )
    }

    /// Build with explicit random sources for the result and for jokes.
    pub fn with_random(
        cfg: &MoodConfig,
        result_rng: Box<dyn RandomSource>,
        joke_rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            phase: PhaseController::new(),
            mood: MoodAccumulator::new(),
            image: None,
            result: None,
            draft: String::new(),
            fooled_revealed: false,
            refusal_prompt_open: false,
            updated_at: Utc::now(),
            epoch: 0,
            awaiting: HashSet::new(),
            outbox: Vec::new(),
            classifier: SentimentClassifier::from_lexicon(&cfg.lexicon),
            generator: ResultGenerator::new(result_rng),
            joke_rng,
            points: cfg.points,
            timing: cfg.timing,
            jokes: cfg.content.jokes.clone(),
            quick_replies: cfg.content.quick_replies.clone(),
        }
    }

    // ---- observables ----

    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    pub fn mood_level(&self) -> u8 {
        self.mood.level()
    }

    pub fn mood_tier(&self) -> MoodTier {
        self.mood.tier()
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn fooled_revealed(&self) -> bool {
        self.fooled_revealed
    }

    pub fn refusal_prompt_open(&self) -> bool {
        self.refusal_prompt_open
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let tier = self.mood.tier();
        SessionSnapshot {
            phase: self.phase.current(),
            mood_level: self.mood.level(),
            mood_tier: tier,
            mood_emoji: tier.emoji(),
            image: self.image.clone(),
            result: self.result.clone(),
            fooled_revealed: self.fooled_revealed,
            refusal_prompt_open: self.refusal_prompt_open,
            draft: self.draft.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Timers requested since the last drain.
    pub fn take_timer_requests(&mut self) -> Vec<TimerRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Describes the first broken cross-field invariant, if any.
    pub fn invariant_violation(&self) -> Option<String> {
        let phase = self.phase.current();
        if self.result.is_some() != (phase == Phase::Results) {
            return Some(format!(
                "result present={} in phase {phase}",
                self.result.is_some()
            ));
        }
        if self.image.is_some() != (phase != Phase::Upload) {
            return Some(format!(
                "image present={} in phase {phase}",
                self.image.is_some()
            ));
        }
        if self.fooled_revealed && phase != Phase::Results {
            return Some(format!("disclosure visible in phase {phase}"));
        }
        None
    }

    // ---- commands ----

    /// Upload → Refused. A missing handle or any other phase is a no-op.
    pub fn image_selected(&mut self, handle: Option<ImageHandle>) -> bool {
        let Some(handle) = handle else {
            debug!(target: "session", "image selected without a handle, ignored");
            return false;
        };
        if self.phase.transition(Phase::Refused).is_err() {
            return false;
        }
        self.image = Some(handle);
        self.refusal_prompt_open = true;
        self.touch();
        true
    }

    /// Refused → Cheering.
    pub fn cheer_accepted(&mut self) -> bool {
        if self.phase.transition(Phase::Cheering).is_err() {
            return false;
        }
        self.refusal_prompt_open = false;
        self.touch();
        true
    }

    pub fn cancel(&mut self) {
        self.reset();
    }

    /// Back to a pristine Upload session; pending continuations become stale.
    pub fn reset(&mut self) {
        let left = self.phase.reset();
        self.mood.reset();
        self.image = None;
        self.result = None;
        self.draft.clear();
        self.fooled_revealed = false;
        self.refusal_prompt_open = false;
        self.awaiting.clear();
        self.outbox.clear();
        self.epoch = self.epoch.wrapping_add(1);
        self.touch();
        gauge!("mood_level").set(0.0);
        info!(target: "session", from = %left, epoch = self.epoch, "session reset");
    }

    /// Dismissing the disclosure overlay starts over.
    pub fn acknowledge_disclosure(&mut self) -> bool {
        if !self.fooled_revealed {
            return false;
        }
        self.reset();
        true
    }

    /// Keep the text the user is typing. Only meaningful while cheering.
    pub fn update_draft(&mut self, text: &str) -> bool {
        if !self.phase.current().accepts_mood_input() {
            return false;
        }
        self.draft = text.to_string();
        true
    }

    /// Classify a free-text message and move the mood accordingly.
    pub fn message_sent(&mut self, text: &str) -> Option<Sentiment> {
        if text.trim().is_empty() {
            return None;
        }
        if !self.phase.current().accepts_mood_input() {
            debug!(target: "session", phase = %self.phase.current(), "message ignored");
            return None;
        }

        let hits = self.classifier.hits(text);
        let verdict = hits.verdict();
        counter!("mood_messages_total", "verdict" => verdict.as_str()).increment(1);
        info!(
            target: "session",
            id = %anon_hash(text),
            verdict = verdict.as_str(),
            positive_hits = hits.positive,
            negative_hits = hits.negative,
            "message classified"
        );

        let adjust = if verdict.is_positive() {
            MoodAdjust::Up(self.points.message_positive)
        } else {
            MoodAdjust::Down(self.points.message_negative)
        };
        self.adjust_mood(adjust);
        self.draft.clear();
        Some(verdict)
    }

    pub fn quick_reply(&mut self, positive: bool) -> bool {
        let adjust = if positive {
            MoodAdjust::Up(self.points.quick_reply_positive)
        } else {
            MoodAdjust::Down(self.points.quick_reply_negative)
        };
        self.adjust_mood(adjust).is_some()
    }

    /// Click on the catalogue entry at `index`; unknown indices are ignored.
    pub fn quick_reply_at(&mut self, index: usize) -> bool {
        match self.quick_replies.get(index).map(|q| q.positive) {
            Some(positive) => self.quick_reply(positive),
            None => {
                debug!(target: "session", index, "unknown quick reply");
                false
            }
        }
    }

    /// Always returns a joke; the mood bonus only applies while cheering.
    pub fn tell_joke(&mut self) -> String {
        let joke = if self.jokes.is_empty() {
            String::new()
        } else {
            let idx = self.joke_rng.pick(self.jokes.len());
            self.jokes[idx].clone()
        };
        counter!("mood_jokes_total").increment(1);
        self.adjust_mood(MoodAdjust::Up(self.points.joke));
        joke
    }

    // ---- timers ----

    /// Deliver a due continuation. Stale (other epoch) or unexpected requests are dropped.
    pub fn fire(&mut self, request: TimerRequest) -> bool {
        if request.epoch != self.epoch || !self.awaiting.remove(&request.kind) {
            debug!(
                target: "session",
                kind = request.kind.as_str(),
                epoch = request.epoch,
                current_epoch = self.epoch,
                "stale timer dropped"
            );
            return false;
        }

        match request.kind {
            TimerKind::CalmDown => {
                if self.image.is_none() {
                    warn!(target: "session", "calm-down fired without an image");
                    return false;
                }
                if self.phase.transition(Phase::Analyzing).is_err() {
                    return false;
                }
                self.request_timer(TimerKind::Analysis);
            }
            TimerKind::Analysis => {
                if self.phase.transition(Phase::Results).is_err() {
                    return false;
                }
                let result = self.generator.generate();
                info!(
                    target: "session",
                    emotion = result.emotion.as_str(),
                    confidence = result.confidence,
                    "fake analysis ready"
                );
                self.result = Some(result);
                self.request_timer(TimerKind::Disclosure);
            }
            TimerKind::Disclosure => {
                if !self.phase.is(Phase::Results) {
                    return false;
                }
                self.fooled_revealed = true;
                info!(target: "session", "disclosure revealed");
            }
        }
        self.touch();
        true
    }

    fn adjust_mood(&mut self, adjust: MoodAdjust) -> Option<MoodChange> {
        if !self.phase.current().accepts_mood_input() {
            debug!(target: "mood", phase = %self.phase.current(), ?adjust, "mood change ignored");
            return None;
        }
        let change = match adjust {
            MoodAdjust::Up(n) => self.mood.increase(n),
            MoodAdjust::Down(n) => self.mood.decrease(n),
        };
        gauge!("mood_level").set(change.after as f64);
        info!(
            target: "mood",
            before = change.before,
            after = change.after,
            delta = change.delta(),
            tier = %change.tier_after(),
            "mood changed"
        );
        if change.entered_excited() {
            self.request_timer(TimerKind::CalmDown);
        }
        self.touch();
        Some(change)
    }

    /// Queue a timer unless one of the same kind is already outstanding.
    fn request_timer(&mut self, kind: TimerKind) {
        if !self.awaiting.insert(kind) {
            debug!(target: "session", kind = kind.as_str(), "timer already pending");
            return;
        }
        self.outbox.push(TimerRequest {
            kind,
            epoch: self.epoch,
            delay: kind.delay(&self.timing),
        });
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
