// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The nearest-classified-surface query.
//!
//! One pass over every face of every in-range anchor, tracking two minima
//! at once:
//!
//! - per classification, the nearest face center to the viewpoint (the
//!   distance map), and
//! - across all classifications, the nearest face center to the target that
//!   sits within the proximity tolerance (the point-of-interest).
//!
//! Deliberately O(n) with no sorting: the pass has to finish inside a single
//! frame's time budget on mobile hardware, and a minimum does not need an
//! order.

use serde::{Deserialize, Serialize};

use super::distance_map::{AnchorSummary, ClassifiedDistanceMap, NearestSurface, PointOfInterest};
use super::mesh::FrameSnapshot;

/// Tunables for one query invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Anchors whose origin is farther than this from the target are
    /// skipped wholesale, faces unexamined.
    pub cutoff_radius: f32,
    /// A face center within this distance of the target qualifies as the
    /// point-of-interest candidate.
    pub poi_tolerance: f32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cutoff_radius: 4.0,
            poi_tolerance: 0.05,
        }
    }
}

impl QueryConfig {
    /// Reject configs that would silently produce empty results forever.
    pub fn validate(&self) -> crate::core::error::Result<()> {
        if !self.cutoff_radius.is_finite() || self.cutoff_radius <= 0.0 {
            return Err(crate::core::error::ProxError::Configuration(format!(
                "cutoff_radius must be positive and finite, got {}",
                self.cutoff_radius
            )));
        }
        if !self.poi_tolerance.is_finite() || self.poi_tolerance < 0.0 {
            return Err(crate::core::error::ProxError::Configuration(format!(
                "poi_tolerance must be non-negative and finite, got {}",
                self.poi_tolerance
            )));
        }
        Ok(())
    }
}

/// Build the per-frame summary for one snapshot.
///
/// Pure function of its inputs: no side effects, no shared state, and
/// re-running it on an identical snapshot yields a bitwise-identical
/// summary. Returns `None` iff nothing survives filtering — zero in-range
/// anchors, zero faces, and no aim-hit to fall back on. Degenerate geometry
/// is not validated; any face with a well-defined center is accepted as-is.
pub fn build_summary(snapshot: &FrameSnapshot, config: &QueryConfig) -> Option<AnchorSummary> {
    let mut distances = ClassifiedDistanceMap::new();
    let mut poi: Option<PointOfInterest> = None;

    for anchor in &snapshot.anchors {
        // Coarse filter on the anchor origin so distant anchors cost one
        // distance check instead of a full face walk.
        if anchor.origin().distance(snapshot.target) >= config.cutoff_radius {
            continue;
        }

        for face in &anchor.faces {
            let world_center = anchor.world_center_of(face);

            let distance_to_target = world_center.distance(snapshot.target);
            if distance_to_target <= config.poi_tolerance {
                // First face to reach a given minimum wins; strict `<`
                // keeps it that way.
                let closer = poi
                    .as_ref()
                    .is_none_or(|current| distance_to_target < current.distance);
                if closer {
                    poi = Some(PointOfInterest {
                        classification: face.classification,
                        center: world_center,
                        distance: distance_to_target,
                    });
                }
            }

            // The distance map is NOT gated by the tolerance: every face of
            // an in-range anchor competes for its classification's minimum.
            distances.fold_min(
                face.classification,
                NearestSurface {
                    distance: world_center.distance(snapshot.viewpoint),
                    center: world_center,
                },
            );
        }
    }

    // A host-supplied aim measurement competes like any other observation,
    // and carries a frame where the scan itself came up empty.
    if let Some(hit) = &snapshot.aim_hit {
        distances.fold_min(
            hit.classification,
            NearestSurface {
                distance: hit.distance,
                center: snapshot.target,
            },
        );
    }

    if distances.is_empty() {
        return None;
    }

    Some(AnchorSummary { distances, poi })
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::core::classification::Classification;
    use crate::core::mesh::{AimHit, MeshAnchor, SurfaceFace};

    // =========================================================================
    // Test Fixtures
    // =========================================================================

    /// Anchor at the world origin whose faces are given in world coordinates.
    fn anchor_with_faces(faces: Vec<SurfaceFace>) -> MeshAnchor {
        MeshAnchor::new(Mat4::IDENTITY, faces)
    }

    fn face(x: f32, y: f32, z: f32, classification: Classification) -> SurfaceFace {
        SurfaceFace::new(Vec3::new(x, y, z), classification)
    }

    /// Deterministic pseudo-random stream for the brute-force cross-check.
    struct Lcg(u64);

    impl Lcg {
        fn next_f32(&mut self, lo: f32, hi: f32) -> f32 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let unit = ((self.0 >> 33) as f32) / ((1u64 << 31) as f32);
            lo + unit * (hi - lo)
        }

        fn next_classification(&mut self) -> Classification {
            use crate::core::classification::DISPLAY_PRIORITY;
            let i = self.next_f32(0.0, DISPLAY_PRIORITY.len() as f32) as usize;
            DISPLAY_PRIORITY[i.min(DISPLAY_PRIORITY.len() - 1)]
        }
    }

    // =========================================================================
    // Concrete scenarios
    // =========================================================================

    #[test]
    fn test_three_face_scenario() {
        // Target at origin, viewpoint 1.2m behind it on +Z.
        let target = Vec3::ZERO;
        let viewpoint = Vec3::new(0.0, 0.0, 1.2);

        // A: wall, grazing the target (within tolerance), ~1.2 from viewpoint.
        // B: floor, well outside tolerance, 0.35 from viewpoint.
        // C: wall, far from target but only 0.9 from viewpoint.
        let snapshot = FrameSnapshot::new(
            vec![anchor_with_faces(vec![
                face(0.04, 0.0, 0.0, Classification::Wall),
                face(0.0, 0.0, 0.85, Classification::Floor),
                face(0.0, 0.0, 2.1, Classification::Wall),
            ])],
            target,
            viewpoint,
        );

        let summary = build_summary(&snapshot, &QueryConfig::default()).unwrap();

        let poi = summary.poi.expect("face A should qualify as POI");
        assert_eq!(poi.classification, Classification::Wall);
        assert!((poi.distance - 0.04).abs() < 1e-6);
        assert_eq!(poi.center, Vec3::new(0.04, 0.0, 0.0));

        // Wall minimum comes from C (0.9 < ~1.2), floor from B.
        assert_eq!(summary.distances.len(), 2);
        let wall = summary.distances.get(Classification::Wall).unwrap();
        assert!((wall.distance - 0.9).abs() < 1e-6);
        assert_eq!(wall.center, Vec3::new(0.0, 0.0, 2.1));
        let floor = summary.distances.get(Classification::Floor).unwrap();
        assert!((floor.distance - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_zero_anchors_yields_absent_result() {
        let snapshot = FrameSnapshot::new(vec![], Vec3::ZERO, Vec3::ZERO);
        assert!(build_summary(&snapshot, &QueryConfig::default()).is_none());
    }

    #[test]
    fn test_all_anchors_beyond_cutoff_yields_absent_result() {
        let far = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let snapshot = FrameSnapshot::new(
            vec![MeshAnchor::new(
                far,
                vec![face(0.0, 0.0, 0.0, Classification::Wall)],
            )],
            Vec3::ZERO,
            Vec3::ZERO,
        );
        assert!(build_summary(&snapshot, &QueryConfig::default()).is_none());
    }

    #[test]
    fn test_cutoff_gates_anchors_not_faces() {
        // The anchor origin is in range, so even a face 5m from the target
        // still competes for its classification's minimum.
        let target = Vec3::ZERO;
        let viewpoint = Vec3::new(0.0, 0.0, 4.5);
        let snapshot = FrameSnapshot::new(
            vec![anchor_with_faces(vec![face(
                0.0,
                0.0,
                5.0,
                Classification::Ceiling,
            )])],
            target,
            viewpoint,
        );
        let summary = build_summary(&snapshot, &QueryConfig::default()).unwrap();
        let ceiling = summary.distances.get(Classification::Ceiling).unwrap();
        assert!((ceiling.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nonempty_guarantee_when_any_face_in_range() {
        let snapshot = FrameSnapshot::new(
            vec![anchor_with_faces(vec![face(
                1.0,
                0.0,
                0.0,
                Classification::Table,
            )])],
            Vec3::ZERO,
            Vec3::ZERO,
        );
        let summary = build_summary(&snapshot, &QueryConfig::default()).unwrap();
        assert!(!summary.distances.is_empty());
    }

    // =========================================================================
    // Aim-hit merge
    // =========================================================================

    #[test]
    fn test_aim_hit_carries_an_otherwise_empty_frame() {
        let snapshot = FrameSnapshot::new(vec![], Vec3::ZERO, Vec3::ZERO).with_aim_hit(AimHit {
            classification: Classification::Unknown,
            distance: 1.7,
        });
        let summary = build_summary(&snapshot, &QueryConfig::default()).unwrap();
        assert_eq!(summary.distances.len(), 1);
        assert_eq!(
            summary.distances.get(Classification::Unknown).unwrap().distance,
            1.7
        );
        assert!(summary.poi.is_none());
    }

    #[test]
    fn test_aim_hit_merges_with_min() {
        let viewpoint = Vec3::new(0.0, 0.0, 1.0);
        let base = FrameSnapshot::new(
            vec![anchor_with_faces(vec![face(
                0.0,
                0.0,
                0.5,
                Classification::Wall,
            )])],
            Vec3::ZERO,
            viewpoint,
        );

        // Farther hit loses to the scanned face…
        let summary = build_summary(
            &base.clone().with_aim_hit(AimHit {
                classification: Classification::Wall,
                distance: 2.0,
            }),
            &QueryConfig::default(),
        )
        .unwrap();
        assert!((summary.distances.get(Classification::Wall).unwrap().distance - 0.5).abs() < 1e-6);

        // …and a closer hit wins.
        let summary = build_summary(
            &base.with_aim_hit(AimHit {
                classification: Classification::Wall,
                distance: 0.1,
            }),
            &QueryConfig::default(),
        )
        .unwrap();
        assert_eq!(summary.distances.get(Classification::Wall).unwrap().distance, 0.1);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[test]
    fn test_poi_present_iff_face_within_tolerance() {
        let config = QueryConfig::default();
        let just_inside = FrameSnapshot::new(
            vec![anchor_with_faces(vec![face(
                0.049,
                0.0,
                0.0,
                Classification::Door,
            )])],
            Vec3::ZERO,
            Vec3::ZERO,
        );
        assert!(build_summary(&just_inside, &config).unwrap().poi.is_some());

        let just_outside = FrameSnapshot::new(
            vec![anchor_with_faces(vec![face(
                0.051,
                0.0,
                0.0,
                Classification::Door,
            )])],
            Vec3::ZERO,
            Vec3::ZERO,
        );
        assert!(build_summary(&just_outside, &config).unwrap().poi.is_none());
    }

    #[test]
    fn test_poi_reports_minimum_among_qualifying_faces() {
        let snapshot = FrameSnapshot::new(
            vec![anchor_with_faces(vec![
                face(0.04, 0.0, 0.0, Classification::Wall),
                face(0.01, 0.0, 0.0, Classification::Table),
                face(0.03, 0.0, 0.0, Classification::Door),
            ])],
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
        );
        let poi = build_summary(&snapshot, &QueryConfig::default())
            .unwrap()
            .poi
            .unwrap();
        assert_eq!(poi.classification, Classification::Table);
        assert!((poi.distance - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_brute_force_cross_check() {
        // 40 anchors x 25 faces of pseudo-random classified geometry. Every
        // stored distance must equal the true minimum over all faces of that
        // classification among in-range anchors.
        let mut rng = Lcg(0x5eed);
        let target = Vec3::new(0.5, 0.0, -0.5);
        let viewpoint = Vec3::new(0.0, 1.6, 0.0);
        let config = QueryConfig::default();

        let anchors: Vec<MeshAnchor> = (0..40)
            .map(|_| {
                let origin = Vec3::new(
                    rng.next_f32(-6.0, 6.0),
                    rng.next_f32(-2.0, 2.0),
                    rng.next_f32(-6.0, 6.0),
                );
                let faces = (0..25)
                    .map(|_| {
                        SurfaceFace::new(
                            Vec3::new(
                                rng.next_f32(-1.0, 1.0),
                                rng.next_f32(-1.0, 1.0),
                                rng.next_f32(-1.0, 1.0),
                            ),
                            rng.next_classification(),
                        )
                    })
                    .collect();
                MeshAnchor::new(Mat4::from_translation(origin), faces)
            })
            .collect();

        let snapshot = FrameSnapshot::new(anchors, target, viewpoint);
        let summary = build_summary(&snapshot, &config);

        // Brute force reference.
        let mut reference: std::collections::HashMap<Classification, f32> =
            std::collections::HashMap::new();
        for anchor in &snapshot.anchors {
            if anchor.origin().distance(target) >= config.cutoff_radius {
                continue;
            }
            for f in &anchor.faces {
                let d = anchor.world_center_of(f).distance(viewpoint);
                reference
                    .entry(f.classification)
                    .and_modify(|m| *m = m.min(d))
                    .or_insert(d);
            }
        }

        match summary {
            None => assert!(reference.is_empty()),
            Some(summary) => {
                assert_eq!(summary.distances.len(), reference.len());
                for (classification, expected) in reference {
                    let got = summary.distances.get(classification).unwrap().distance;
                    assert_eq!(got, expected, "minimum mismatch for {classification}");
                }
            }
        }
    }

    #[test]
    fn test_idempotent_on_identical_snapshot() {
        let mut rng = Lcg(42);
        let faces: Vec<SurfaceFace> = (0..100)
            .map(|_| {
                SurfaceFace::new(
                    Vec3::new(
                        rng.next_f32(-2.0, 2.0),
                        rng.next_f32(-2.0, 2.0),
                        rng.next_f32(-2.0, 2.0),
                    ),
                    rng.next_classification(),
                )
            })
            .collect();
        let snapshot = FrameSnapshot::new(
            vec![anchor_with_faces(faces)],
            Vec3::ZERO,
            Vec3::new(0.0, 1.0, 0.0),
        );
        let config = QueryConfig::default();

        let first = build_summary(&snapshot, &config);
        let second = build_summary(&snapshot, &config);
        assert_eq!(first, second);
    }

    // =========================================================================
    // Config
    // =========================================================================

    #[test]
    fn test_config_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.cutoff_radius, 4.0);
        assert_eq!(config.poi_tolerance, 0.05);
    }

    #[test]
    fn test_config_validation() {
        assert!(QueryConfig::default().validate().is_ok());
        assert!(QueryConfig {
            cutoff_radius: 0.0,
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(QueryConfig {
            poi_tolerance: -0.1,
            ..Default::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: QueryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, QueryConfig::default());
        let config: QueryConfig = serde_json::from_str(r#"{"cutoff_radius": 2.5}"#).unwrap();
        assert_eq!(config.cutoff_radius, 2.5);
        assert_eq!(config.poi_tolerance, 0.05);
    }
}
