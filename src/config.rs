// src/config.rs
//! Mood analyzer configuration: timing, point values, lexicon, jokes and quick replies.
//!
//! The repository copy of `config/mood.toml` is embedded at compile time and acts as
//! the fallback whenever no file is found on disk.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

// --- env defaults & names ---
pub const DEFAULT_MOOD_CONFIG_PATH: &str = "config/mood.toml";
pub const ENV_MOOD_CONFIG_PATH: &str = "MOOD_CONFIG_PATH";
pub const ENV_MOOD_TIME_UNIT_MS: &str = "MOOD_TIME_UNIT_MS";

static EMBEDDED: Lazy<MoodConfig> = Lazy::new(|| {
    let raw = include_str!("../config/mood.toml");
    let mut cfg: MoodConfig = toml::from_str(raw).expect("valid embedded mood config");
    cfg.normalize();
    cfg
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Length of one time unit in milliseconds. 0 makes every timer fire immediately.
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,
    #[serde(default = "default_calm_down_units")]
    pub calm_down_units: u32,
    #[serde(default = "default_analysis_units")]
    pub analysis_units: u32,
    #[serde(default = "default_disclosure_units")]
    pub disclosure_units: u32,
}

fn default_time_unit_ms() -> u64 {
    1000
}
fn default_calm_down_units() -> u32 {
    1
}
fn default_analysis_units() -> u32 {
    3
}
fn default_disclosure_units() -> u32 {
    2
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: default_time_unit_ms(),
            calm_down_units: default_calm_down_units(),
            analysis_units: default_analysis_units(),
            disclosure_units: default_disclosure_units(),
        }
    }
}

impl TimingConfig {
    pub fn units(&self, n: u32) -> Duration {
        Duration::from_millis(self.time_unit_ms.saturating_mul(n as u64))
    }
}

/// Mood points awarded or taken away per gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsConfig {
    #[serde(default = "PointsConfig::d_message_positive")]
    pub message_positive: u8,
    #[serde(default = "PointsConfig::d_message_negative")]
    pub message_negative: u8,
    #[serde(default = "PointsConfig::d_quick_reply_positive")]
    pub quick_reply_positive: u8,
    #[serde(default = "PointsConfig::d_quick_reply_negative")]
    pub quick_reply_negative: u8,
    #[serde(default = "PointsConfig::d_joke")]
    pub joke: u8,
}

impl PointsConfig {
    fn d_message_positive() -> u8 {
        15
    }
    fn d_message_negative() -> u8 {
        18
    }
    fn d_quick_reply_positive() -> u8 {
        12
    }
    fn d_quick_reply_negative() -> u8 {
        15
    }
    fn d_joke() -> u8 {
        18
    }
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            message_positive: Self::d_message_positive(),
            message_negative: Self::d_message_negative(),
            quick_reply_positive: Self::d_quick_reply_positive(),
            quick_reply_negative: Self::d_quick_reply_negative(),
            joke: Self::d_joke(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconConfig {
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub positive: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub text: String,
    pub positive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub jokes: Vec<String>,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
}

impl Default for MoodConfig {
    fn default() -> Self {
        EMBEDDED.clone()
    }
}

impl MoodConfig {
    /// Resolve the config path from `MOOD_CONFIG_PATH` (or the default path), fall back
    /// to the embedded config when no file exists, then apply env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_MOOD_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MOOD_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            info!(target: "config", path = %path.display(), "no mood config on disk, using embedded default");
            Self::default()
        };

        if let Some(ms) = parse_time_unit_env(std::env::var(ENV_MOOD_TIME_UNIT_MS).ok()) {
            cfg.timing.time_unit_ms = ms;
        }

        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read mood config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid mood config at {}: {}", path.display(), e))
    }

    /// Parse and sanitize. Missing lists are filled from the embedded config.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: MoodConfig = toml::from_str(toml_str)?;
        cfg.normalize();
        cfg.fill_from(&EMBEDDED);
        Ok(cfg)
    }

    fn normalize(&mut self) {
        let d = PointsConfig::default();
        let p = &mut self.points;
        for (v, fallback) in [
            (&mut p.message_positive, d.message_positive),
            (&mut p.message_negative, d.message_negative),
            (&mut p.quick_reply_positive, d.quick_reply_positive),
            (&mut p.quick_reply_negative, d.quick_reply_negative),
            (&mut p.joke, d.joke),
        ] {
            if *v == 0 {
                *v = fallback;
            }
        }

        self.lexicon.negative = normalize_words(&self.lexicon.negative);
        self.lexicon.positive = normalize_words(&self.lexicon.positive);

        self.content.jokes.retain(|j| !j.trim().is_empty());
        self.content.quick_replies.retain(|q| !q.text.trim().is_empty());
    }

    fn fill_from(&mut self, embedded: &MoodConfig) {
        if self.lexicon.negative.is_empty() && self.lexicon.positive.is_empty() {
            warn!(target: "config", "empty lexicon, using embedded word lists");
            self.lexicon = embedded.lexicon.clone();
        }
        if self.content.jokes.is_empty() {
            warn!(target: "config", "no jokes configured, using embedded jokes");
            self.content.jokes = embedded.content.jokes.clone();
        }
        if self.content.quick_replies.is_empty() {
            warn!(target: "config", "no quick replies configured, using embedded set");
            self.content.quick_replies = embedded.content.quick_replies.clone();
        }
    }
}

/// Trim, lower-case, drop empties and duplicates (first occurrence wins).
fn normalize_words(words: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

fn parse_time_unit_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}
