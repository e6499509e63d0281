// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Commonly used types for `use proxlib::prelude::*`.

pub use crate::core::{
    // Errors
    error::{ProxError, Result},

    // Data model
    classification::Classification,
    distance_map::{AnchorSummary, ClassifiedDistanceMap, NearestSurface, PointOfInterest},
    mesh::{FrameSnapshot, MeshAnchor, SurfaceFace},

    // Query + scheduling
    query::{build_summary, QueryConfig},
    scheduler::{QueryOutcome, QueryScheduler, SubmitOutcome},

    // Consumer policy
    announce::{Announcer, SpeechSink, ThresholdPolicy},
    monitor::ProximityMonitor,
};
