// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Semantic classification of scanned surface patches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic category assigned to a scanned surface patch.
///
/// The set is closed: it mirrors what mesh-scanning sensors actually emit.
/// `Unknown` is the default bucket for faces the sensor could not classify.
///
/// Classifications are unordered. Consumers that need a deterministic order
/// (display lists, tie-breaks between equally distant surfaces) sort by
/// [`DISPLAY_PRIORITY`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Wall,
    Floor,
    Ceiling,
    Table,
    Seat,
    Window,
    Door,
    #[default]
    Unknown,
}

/// Explicit priority order for display and deterministic tie-breaking.
///
/// Lower index wins. `Unknown` sorts last on purpose: when two surfaces are
/// exactly as close, the one we can name is the one worth reporting.
pub const DISPLAY_PRIORITY: [Classification; 8] = [
    Classification::Wall,
    Classification::Floor,
    Classification::Ceiling,
    Classification::Table,
    Classification::Seat,
    Classification::Window,
    Classification::Door,
    Classification::Unknown,
];

impl Classification {
    /// Position in [`DISPLAY_PRIORITY`]; lower is higher priority.
    pub fn priority_index(&self) -> usize {
        DISPLAY_PRIORITY
            .iter()
            .position(|c| c == self)
            .unwrap_or(DISPLAY_PRIORITY.len())
    }

    /// Human-readable label, suitable for spoken announcements.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Wall => "wall",
            Classification::Floor => "floor",
            Classification::Ceiling => "ceiling",
            Classification::Table => "table",
            Classification::Seat => "seats",
            Classification::Window => "window",
            Classification::Door => "door",
            Classification::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
