// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Consumer-side policy: which distance crossing, if any, gets spoken.
//!
//! The threshold classifier walks the distance map in ascending distance
//! order and stops at the first classification whose distance crosses below
//! its configured threshold — at most one announcement per frame, nearest
//! crossing wins. The [`Announcer`] then deduplicates phrases so the same
//! warning is not repeated every frame, and hands the text to whatever
//! [`SpeechSink`] the host plugged in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::classification::Classification;
use super::distance_map::ClassifiedDistanceMap;

/// How urgent a crossing is. Two-tier rules (floor) distinguish "act now"
/// from "heads up"; single-tier rules always warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementTier {
    Warning,
    Caution,
}

/// Distance threshold for one classification, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdRule {
    Single(f32),
    TwoTier { urgent: f32, caution: f32 },
}

impl ThresholdRule {
    /// Which tier, if any, the given distance crosses.
    pub fn crossing(&self, distance: f32) -> Option<AnnouncementTier> {
        match *self {
            ThresholdRule::Single(threshold) => {
                (distance < threshold).then_some(AnnouncementTier::Warning)
            }
            ThresholdRule::TwoTier { urgent, caution } => {
                if distance < urgent {
                    Some(AnnouncementTier::Warning)
                } else if distance < caution {
                    Some(AnnouncementTier::Caution)
                } else {
                    None
                }
            }
        }
    }
}

/// One spoken warning, produced by [`ThresholdPolicy::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub classification: Classification,
    pub distance: f32,
    pub tier: AnnouncementTier,
    pub phrase: String,
}

/// Per-classification threshold rules.
///
/// The defaults come from the shipped obstacle-warning policy; deployments
/// override them from JSON. A classification with no rule never announces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdPolicy {
    rules: HashMap<Classification, ThresholdRule>,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        let rules = HashMap::from([
            (Classification::Wall, ThresholdRule::Single(0.30)),
            (
                Classification::Floor,
                ThresholdRule::TwoTier {
                    urgent: 0.40,
                    caution: 0.70,
                },
            ),
            (Classification::Ceiling, ThresholdRule::Single(0.25)),
            (Classification::Table, ThresholdRule::Single(0.40)),
            (Classification::Seat, ThresholdRule::Single(0.40)),
            (Classification::Window, ThresholdRule::Single(0.25)),
            (Classification::Door, ThresholdRule::Single(0.30)),
            (Classification::Unknown, ThresholdRule::Single(0.40)),
        ]);
        Self { rules }
    }
}

impl ThresholdPolicy {
    /// Policy with no rules at all: nothing ever announces.
    pub fn silent() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn rule(&self, classification: Classification) -> Option<&ThresholdRule> {
        self.rules.get(&classification)
    }

    pub fn set_rule(&mut self, classification: Classification, rule: ThresholdRule) {
        self.rules.insert(classification, rule);
    }

    /// At most one announcement per invocation: classifications are
    /// processed in ascending distance order and the first crossing wins,
    /// short-circuiting the rest.
    pub fn evaluate(&self, map: &ClassifiedDistanceMap) -> Option<Announcement> {
        for (classification, surface) in map.sorted_by_distance() {
            let Some(rule) = self.rules.get(&classification) else {
                continue;
            };
            if let Some(tier) = rule.crossing(surface.distance) {
                return Some(Announcement {
                    classification,
                    distance: surface.distance,
                    tier,
                    phrase: phrase_for(classification, surface.distance, tier),
                });
            }
        }
        None
    }
}

/// Spoken phrasing, matching the shipped obstacle-warning script (aviation
/// callouts for terrain and ceiling, plain distances for the rest).
fn phrase_for(classification: Classification, distance: f32, tier: AnnouncementTier) -> String {
    match (classification, tier) {
        (Classification::Floor, AnnouncementTier::Warning) => {
            "terrain, terrain; pull up, pull up".to_string()
        }
        (Classification::Floor, AnnouncementTier::Caution) => {
            "caution: terrain; caution: terrain;".to_string()
        }
        (Classification::Ceiling, _) => "cruising altitude".to_string(),
        (Classification::Unknown, _) => format!("{distance:.1} meter"),
        (other, _) => format!("{distance:.1} meter from {}", other.label()),
    }
}

/// Where announcements end up. The host typically backs this with a speech
/// synthesizer; tests back it with a recording sink.
pub trait SpeechSink: Send {
    /// Speak `text`. When `stop_previous` is set, any utterance still in
    /// progress should be cut off mid-word first.
    fn speak(&mut self, text: &str, stop_previous: bool);
}

/// Default sink: announcements go to the log.
#[derive(Debug, Default)]
pub struct TracingSpeech;

impl SpeechSink for TracingSpeech {
    fn speak(&mut self, text: &str, _stop_previous: bool) {
        tracing::info!(target: "proxlib::speech", "{text}");
    }
}

/// Owns one speech sink plus the dedup cache of the last phrase spoken.
///
/// Explicitly a component instance, not process-wide state: a host that
/// wants two independent announcement streams creates two announcers.
pub struct Announcer<S: SpeechSink> {
    sink: S,
    last_spoken: Option<String>,
    stop_previous: bool,
}

impl<S: SpeechSink> Announcer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            last_spoken: None,
            stop_previous: true,
        }
    }

    pub fn with_stop_previous(mut self, stop_previous: bool) -> Self {
        self.stop_previous = stop_previous;
        self
    }

    /// Speak an announcement's phrase. Returns false when the phrase is
    /// identical to the last one spoken and was suppressed.
    pub fn announce(&mut self, announcement: &Announcement) -> bool {
        self.say(announcement.phrase.clone())
    }

    /// Speak arbitrary text with the same dedup behavior.
    pub fn say(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.last_spoken.as_deref() == Some(text.as_str()) {
            return false;
        }
        self.sink.speak(&text, self.stop_previous);
        self.last_spoken = Some(text);
        true
    }

    /// Forget the last phrase, so the next identical one speaks again.
    /// Call on session reset.
    pub fn reset(&mut self) {
        self.last_spoken = None;
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
