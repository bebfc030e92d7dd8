// src/mood.rs
//! # Mood
//! Bounded mood level (0..=100) and the five tiers derived from it.
//!
//! The accumulator is plain data: every mutation returns a [`MoodChange`] and it is
//! up to the caller to react to tier crossings.

use serde::{Deserialize, Serialize};

pub const MOOD_MIN: u8 = 0;
pub const MOOD_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTier {
    Angry,
    Sad,
    Neutral,
    Happy,
    Excited,
}

impl MoodTier {
    /// Bands: angry [0,20), sad [20,40), neutral [40,60), happy [60,80), excited [80,100].
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=19 => MoodTier::Angry,
            20..=39 => MoodTier::Sad,
            40..=59 => MoodTier::Neutral,
            60..=79 => MoodTier::Happy,
            _ => MoodTier::Excited,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoodTier::Angry => "angry",
            MoodTier::Sad => "sad",
            MoodTier::Neutral => "neutral",
            MoodTier::Happy => "happy",
            MoodTier::Excited => "excited",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodTier::Angry => "😠",
            MoodTier::Sad => "😢",
            MoodTier::Neutral => "😐",
            MoodTier::Happy => "😊",
            MoodTier::Excited => "🤩",
        }
    }
}

impl std::fmt::Display for MoodTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Before/after pair returned by every accumulator mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodChange {
    pub before: u8,
    pub after: u8,
}

impl MoodChange {
    pub fn tier_before(&self) -> MoodTier {
        MoodTier::from_level(self.before)
    }

    pub fn tier_after(&self) -> MoodTier {
        MoodTier::from_level(self.after)
    }

    /// True only for the step that moves the level from below `excited` into it.
    pub fn entered_excited(&self) -> bool {
        self.tier_before() != MoodTier::Excited && self.tier_after() == MoodTier::Excited
    }

    pub fn delta(&self) -> i16 {
        self.after as i16 - self.before as i16
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodAccumulator {
    level: u8,
}

impl MoodAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at an arbitrary level (clamped).
    pub fn with_level(level: u8) -> Self {
        Self {
            level: level.min(MOOD_MAX),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn tier(&self) -> MoodTier {
        MoodTier::from_level(self.level)
    }

    pub fn increase(&mut self, amount: u8) -> MoodChange {
        let before = self.level;
        self.level = self.level.saturating_add(amount).min(MOOD_MAX);
        MoodChange {
            before,
            after: self.level,
        }
    }

    pub fn decrease(&mut self, amount: u8) -> MoodChange {
        let before = self.level;
        self.level = self.level.saturating_sub(amount);
        MoodChange {
            before,
            after: self.level,
        }
    }

    pub fn reset(&mut self) {
        self.level = MOOD_MIN;
    }
}
