// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Per-frame mesh observations: anchors, faces, and the frame snapshot.
//!
//! Nothing here persists across frames. A sensor produces a fresh
//! [`FrameSnapshot`] per depth frame; the snapshot is owned by the single
//! query invocation it is submitted to and discarded afterwards.

use glam::{Mat4, Vec3};
use uuid::Uuid;

use super::classification::Classification;

/// Opaque identifier of the spatially-tracked reference frame that owns a
/// set of faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(Uuid);

impl AnchorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One triangulated surface patch, observed this frame.
///
/// The center is expressed in the owning anchor's local frame; use
/// [`MeshAnchor::world_center_of`] to get world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceFace {
    pub center: Vec3,
    pub classification: Classification,
}

impl SurfaceFace {
    pub fn new(center: Vec3, classification: Classification) -> Self {
        Self {
            center,
            classification,
        }
    }
}

/// A spatially-tracked reference frame carrying zero or more classified
/// faces, plus its local-to-world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAnchor {
    pub id: AnchorId,
    pub transform: Mat4,
    pub faces: Vec<SurfaceFace>,
}

impl MeshAnchor {
    pub fn new(transform: Mat4, faces: Vec<SurfaceFace>) -> Self {
        Self {
            id: AnchorId::new(),
            transform,
            faces,
        }
    }

    /// World-space position of the anchor's origin. Used for the coarse
    /// cutoff-radius filter before any per-face work happens.
    pub fn origin(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// World-space center of one of this anchor's faces.
    pub fn world_center_of(&self, face: &SurfaceFace) -> Vec3 {
        self.transform.transform_point3(face.center)
    }
}

/// Distance the host already measured along its own aim ray, with the
/// classification of whatever plane that ray hit (if the host knows it).
///
/// Merged into the per-classification distance map with `min`, so a frame
/// where every scanned face is out of range still reports the one surface
/// the user is demonstrably aiming at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimHit {
    pub classification: Classification,
    pub distance: f32,
}

/// Everything one query invocation needs, captured at submission time.
///
/// Read-only once constructed; the query runs on a worker thread against
/// this snapshot alone, so no locking is required anywhere in the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    /// Anchors observed this frame.
    pub anchors: Vec<MeshAnchor>,
    /// The point the consumer wants proximity information about (usually
    /// where the viewpoint is aimed).
    pub target: Vec3,
    /// The observer's position.
    pub viewpoint: Vec3,
    /// Optional aim-ray measurement supplied by the host.
    pub aim_hit: Option<AimHit>,
}

impl FrameSnapshot {
    pub fn new(anchors: Vec<MeshAnchor>, target: Vec3, viewpoint: Vec3) -> Self {
        Self {
            anchors,
            target,
            viewpoint,
            aim_hit: None,
        }
    }

    pub fn with_aim_hit(mut self, hit: AimHit) -> Self {
        self.aim_hit = Some(hit);
        self
    }

    /// Total number of faces across all anchors, before cutoff filtering.
    pub fn face_count(&self) -> usize {
        self.anchors.iter().map(|a| a.faces.len()).sum()
    }
}
