// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Picks the single nearest obstacle out of a distance map.

use serde::{Deserialize, Serialize};

use super::classification::Classification;
use super::distance_map::{ClassifiedDistanceMap, NearestSurface};

/// Policy for what counts as an "obstacle".
///
/// Some consumers walk on the floor and do not want it reported as the
/// nearest thing in the way; others (drone-style consumers) do. Configurable
/// rather than hardwired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearestObstaclePolicy {
    pub exclude_floor: bool,
}

/// The single (classification, surface) pair with the globally minimum
/// distance to the viewpoint.
///
/// The map is unordered, so exact-tie winners would otherwise depend on
/// iteration order; ties are broken explicitly by
/// [`DISPLAY_PRIORITY`](super::classification::DISPLAY_PRIORITY) so the
/// answer is deterministic.
pub fn nearest_obstacle(
    map: &ClassifiedDistanceMap,
    policy: NearestObstaclePolicy,
) -> Option<(Classification, NearestSurface)> {
    map.iter()
        .filter(|(c, _)| !(policy.exclude_floor && *c == Classification::Floor))
        .min_by(|a, b| {
            a.1.distance
                .total_cmp(&b.1.distance)
                .then_with(|| a.0.priority_index().cmp(&b.0.priority_index()))
        })
        .map(|(c, s)| (c, *s))
}
