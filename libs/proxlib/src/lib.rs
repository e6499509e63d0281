// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! proxlib: real-time proximity queries over classified surface meshes.
//!
//! A mesh-scanning sensor hands us a fresh snapshot of classified surface
//! patches every frame. This crate answers two questions about that snapshot
//! without ever blocking the frame path:
//!
//! - what kind of surface is the user aiming at right now, and
//! - for every surface kind in range, how close is the nearest one?
//!
//! The answers feed consumer-side policy: threshold rules that decide what
//! (if anything) to announce about nearby obstacles.
//!
//! The crate has no opinion about where snapshots come from or how results
//! are rendered or spoken. Sensors, renderers, and speech synthesis live in
//! the host application; the seams are [`FrameSnapshot`] on the way in and
//! [`SpeechSink`] / caller callbacks on the way out.

pub mod core;
pub mod prelude;

pub use core::announce::{
    Announcement, AnnouncementTier, Announcer, SpeechSink, ThresholdPolicy, ThresholdRule,
    TracingSpeech,
};
pub use core::classification::Classification;
pub use core::distance_map::{AnchorSummary, ClassifiedDistanceMap, NearestSurface, PointOfInterest};
pub use core::error::{ProxError, Result};
pub use core::mesh::{AimHit, AnchorId, FrameSnapshot, MeshAnchor, SurfaceFace};
pub use core::monitor::{DistanceBand, ProximityMonitor};
pub use core::query::{build_summary, QueryConfig};
pub use core::resolver::{nearest_obstacle, NearestObstaclePolicy};
pub use core::scheduler::{QueryOutcome, QueryScheduler, SubmitOutcome};
