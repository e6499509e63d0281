// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Ties the pipeline together for a per-frame consumer: submit the
//! snapshot, drain ready outcomes, keep the last-known distance map,
//! fire callbacks, and speak at most one warning per outcome.

use std::time::Duration;

use super::announce::{Announcer, SpeechSink, ThresholdPolicy};
use super::distance_map::{ClassifiedDistanceMap, NearestSurface, PointOfInterest};
use super::error::Result;
use super::mesh::FrameSnapshot;
use super::query::QueryConfig;
use super::resolver::{NearestObstaclePolicy, nearest_obstacle};
use super::scheduler::{QueryOutcome, QueryScheduler, SubmitOutcome};
use crate::core::classification::Classification;

/// Display tier for a raw center-of-view distance, used by hosts that
/// color-code the on-screen measurement. Bands narrow as things get close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    Immediate,
    VeryClose,
    Close,
    Moderate,
    Far,
    Clear,
}

impl DistanceBand {
    pub fn for_distance(distance: f32) -> Self {
        match distance {
            d if d <= 1.4 => DistanceBand::Immediate,
            d if d <= 1.875 => DistanceBand::VeryClose,
            d if d <= 2.75 => DistanceBand::Close,
            d if d <= 3.125 => DistanceBand::Moderate,
            d if d <= 3.75 => DistanceBand::Far,
            _ => DistanceBand::Clear,
        }
    }
}

pub type DistanceCallback = Box<dyn FnMut(f32) + Send>;
pub type CategorizedCallback = Box<dyn FnMut(&ClassifiedDistanceMap) + Send>;

/// Per-frame proximity consumer.
///
/// Owns a [`QueryScheduler`], the threshold policy, and an [`Announcer`].
/// All consumer-side state (last-known map, last point-of-interest) is
/// mutated only on the thread that calls [`process_frame`] — results cross
/// the thread boundary through the scheduler's outcome channel and nowhere
/// else.
///
/// Outcomes are applied optimistically: an outcome that arrives for an
/// already-superseded frame still updates the display state, because a
/// slightly stale answer beats none.
///
/// [`process_frame`]: ProximityMonitor::process_frame
pub struct ProximityMonitor<S: SpeechSink> {
    scheduler: QueryScheduler,
    policy: ThresholdPolicy,
    obstacle_policy: NearestObstaclePolicy,
    announcer: Announcer<S>,
    last_map: Option<ClassifiedDistanceMap>,
    last_poi: Option<PointOfInterest>,
    on_distance_update: Option<DistanceCallback>,
    on_categorized_update: Option<CategorizedCallback>,
}

impl<S: SpeechSink> ProximityMonitor<S> {
    pub fn new(config: QueryConfig, policy: ThresholdPolicy, announcer: Announcer<S>) -> Result<Self> {
        Ok(Self {
            scheduler: QueryScheduler::new(config)?,
            policy,
            obstacle_policy: NearestObstaclePolicy::default(),
            announcer,
            last_map: None,
            last_poi: None,
            on_distance_update: None,
            on_categorized_update: None,
        })
    }

    pub fn with_obstacle_policy(mut self, policy: NearestObstaclePolicy) -> Self {
        self.obstacle_policy = policy;
        self
    }

    /// Called with the host's raw aim-ray distance on every accepted frame
    /// that carries one.
    pub fn on_distance_update(mut self, callback: impl FnMut(f32) + Send + 'static) -> Self {
        self.on_distance_update = Some(Box::new(callback));
        self
    }

    /// Called with the fresh distance map every time an outcome lands.
    pub fn on_categorized_update(
        mut self,
        callback: impl FnMut(&ClassifiedDistanceMap) + Send + 'static,
    ) -> Self {
        self.on_categorized_update = Some(Box::new(callback));
        self
    }

    /// Submit one frame and apply whatever outcomes are ready.
    ///
    /// Returns the submit outcome so the host can count drops. A dropped
    /// frame is normal under load; the next frame simply tries again.
    pub fn process_frame(&mut self, snapshot: FrameSnapshot) -> Result<SubmitOutcome> {
        let aim_distance = snapshot.aim_hit.map(|hit| hit.distance);

        let outcome = self.scheduler.submit(snapshot)?;

        if matches!(outcome, SubmitOutcome::Accepted { .. }) {
            if let (Some(callback), Some(distance)) = (&mut self.on_distance_update, aim_distance) {
                callback(distance);
            }
        }

        self.drain_ready();
        Ok(outcome)
    }

    /// Apply every outcome the worker has finished. Runs on the caller's
    /// thread; this is the only place consumer-side state mutates.
    pub fn drain_ready(&mut self) {
        while let Some(outcome) = self.scheduler.poll_outcome() {
            self.apply(outcome);
        }
    }

    /// Blocking variant for hosts that want to wait out an in-flight query
    /// (end of session, tests).
    pub fn drain_blocking(&mut self, timeout: Duration) {
        if let Some(outcome) = self.scheduler.recv_outcome_timeout(timeout) {
            self.apply(outcome);
        }
        self.drain_ready();
    }

    fn apply(&mut self, outcome: QueryOutcome) {
        let Some(summary) = outcome.summary else {
            // Insufficient data this frame; keep showing the last answer.
            return;
        };

        self.last_poi = summary.poi;
        if let Some(callback) = &mut self.on_categorized_update {
            callback(&summary.distances);
        }
        if let Some(announcement) = self.policy.evaluate(&summary.distances) {
            self.announcer.announce(&announcement);
        }
        self.last_map = Some(summary.distances);
    }

    /// Last distance map any outcome delivered, possibly from an earlier
    /// frame than the latest submission.
    pub fn last_map(&self) -> Option<&ClassifiedDistanceMap> {
        self.last_map.as_ref()
    }

    /// Classification of the surface the user was last aiming at, when one
    /// was within tolerance.
    pub fn last_poi(&self) -> Option<&PointOfInterest> {
        self.last_poi.as_ref()
    }

    /// Nearest obstacle in the last-known map under the configured policy.
    pub fn nearest_obstacle(&self) -> Option<(Classification, NearestSurface)> {
        self.last_map
            .as_ref()
            .and_then(|map| nearest_obstacle(map, self.obstacle_policy))
    }

    pub fn dropped_frames(&self) -> u64 {
        self.scheduler.dropped_frames()
    }

    /// Clear announcement dedup and display state. Call when the host
    /// resets its scanning session; note an in-flight query still completes
    /// and will repopulate the state when its outcome is drained.
    pub fn reset_session(&mut self) {
        self.announcer.reset();
        self.last_map = None;
        self.last_poi = None;
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer<S> {
        &mut self.announcer
    }
}
