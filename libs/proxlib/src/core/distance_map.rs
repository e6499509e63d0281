// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Query results: the per-classification distance map and the
//! point-of-interest lookup.

use std::collections::HashMap;

use glam::Vec3;

use super::classification::Classification;

/// The nearest observed surface of one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestSurface {
    /// Distance from the viewpoint, in meters.
    pub distance: f32,
    /// World-space center of the winning face.
    pub center: Vec3,
}

/// Per-classification nearest-distance summary for one frame.
///
/// Contract: unordered, keys unique. Every key corresponds to at least one
/// face observed by the query that produced the map, and the stored distance
/// is the minimum over all such faces. The map is rebuilt whole on every
/// query; there is no incremental update and no history across frames.
///
/// Consumers that need a deterministic iteration order sort explicitly, e.g.
/// by distance or by [`DISPLAY_PRIORITY`](super::classification::DISPLAY_PRIORITY).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedDistanceMap {
    entries: HashMap<Classification, NearestSurface>,
}

impl ClassifiedDistanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation in, keeping the strictly smaller distance.
    ///
    /// Strict `<` means the first face to reach a given minimum wins, which
    /// keeps the query's "first encountered at minimum" tie-break.
    pub fn fold_min(&mut self, classification: Classification, candidate: NearestSurface) {
        match self.entries.get(&classification) {
            Some(existing) if existing.distance <= candidate.distance => {}
            _ => {
                self.entries.insert(classification, candidate);
            }
        }
    }

    pub fn get(&self, classification: Classification) -> Option<&NearestSurface> {
        self.entries.get(&classification)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Classification, &NearestSurface)> {
        self.entries.iter().map(|(c, s)| (*c, s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted ascending by distance, ties broken by display
    /// priority. This is the order the threshold classifier evaluates in.
    pub fn sorted_by_distance(&self) -> Vec<(Classification, NearestSurface)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(c, s)| (*c, *s)).collect();
        entries.sort_by(|a, b| {
            a.1.distance
                .total_cmp(&b.1.distance)
                .then_with(|| a.0.priority_index().cmp(&b.0.priority_index()))
        });
        entries
    }
}

/// The surface patch closest to the aim point, when one lies within the
/// proximity tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOfInterest {
    pub classification: Classification,
    /// World-space center of the qualifying face.
    pub center: Vec3,
    /// Distance from the target location, in meters.
    pub distance: f32,
}

/// Everything one query produced: the distance map plus the optional
/// point-of-interest. Absent entirely when nothing survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSummary {
    pub distances: ClassifiedDistanceMap,
    pub poi: Option<PointOfInterest>,
}
