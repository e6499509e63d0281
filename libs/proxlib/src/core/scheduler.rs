// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Off-thread execution of the distance query.
//!
//! One dedicated worker thread per scheduler, at most one query in flight.
//! A frame that arrives while the worker is busy is dropped, not queued —
//! latest-wins backpressure, because a stale proximity answer is worth less
//! than a fresh frame. Results come back through a channel the caller
//! drains on its own thread, exactly one outcome per accepted submission,
//! in submission order.
//!
//! There is no cancellation: once accepted, a query runs to completion even
//! through shutdown, and its outcome may describe a frame the consumer has
//! already moved past. `frame_id` lets the consumer notice.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select};

use super::distance_map::AnchorSummary;
use super::error::{ProxError, Result};
use super::mesh::FrameSnapshot;
use super::query::{QueryConfig, build_summary};

/// What happened to a submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The worker took the frame; exactly one [`QueryOutcome`] with this id
    /// will be delivered.
    Accepted { frame_id: u64 },
    /// A query was already in flight; the frame was discarded. Resubmit on
    /// the next frame — never within the same one.
    Dropped,
}

/// Result of one accepted query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub frame_id: u64,
    /// `None` means nothing survived filtering this frame — insufficient
    /// data, not an error.
    pub summary: Option<AnchorSummary>,
}

struct Job {
    frame_id: u64,
    snapshot: FrameSnapshot,
}

/// Single-worker scheduler with a single-slot in-flight gate.
pub struct QueryScheduler {
    job_tx: Sender<Job>,
    outcome_rx: Receiver<QueryOutcome>,
    shutdown_tx: Sender<()>,
    in_flight: Arc<AtomicBool>,
    next_frame_id: AtomicU64,
    dropped_frames: AtomicU64,
    stopped: AtomicBool,
    worker: Option<JoinHandle<()>>,
}

impl QueryScheduler {
    /// Spawn the worker thread. `config` applies to every query this
    /// scheduler runs.
    pub fn new(config: QueryConfig) -> Result<Self> {
        config.validate()?;

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<QueryOutcome>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let in_flight = Arc::new(AtomicBool::new(false));

        let worker_gate = Arc::clone(&in_flight);
        let worker = std::thread::Builder::new()
            .name("proxlib-query".into())
            .spawn(move || run_worker(job_rx, outcome_tx, shutdown_rx, worker_gate, config))
            .map_err(|e| ProxError::Other(e.into()))?;

        tracing::debug!("query scheduler started (cutoff={}m)", config.cutoff_radius);

        Ok(Self {
            job_tx,
            outcome_rx,
            shutdown_tx,
            in_flight,
            next_frame_id: AtomicU64::new(0),
            dropped_frames: AtomicU64::new(0),
            stopped: AtomicBool::new(false),
            worker: Some(worker),
        })
    }

    /// Hand a frame to the worker, unless one is already being processed.
    ///
    /// The snapshot is captured by value: the worker reads it without
    /// locking because nobody else can.
    pub fn submit(&self, snapshot: FrameSnapshot) -> Result<SubmitOutcome> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(ProxError::SchedulerStopped);
        }

        // The gate is the at-most-one-in-flight invariant, mechanically:
        // whoever swaps false->true owns the slot until the worker releases
        // it after delivering the outcome.
        if self.in_flight.swap(true, Ordering::AcqRel) {
            let dropped = self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::trace!("frame dropped, query in flight (total dropped: {dropped})");
            return Ok(SubmitOutcome::Dropped);
        }

        let frame_id = self.next_frame_id.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(Job { frame_id, snapshot }).is_err() {
            self.in_flight.store(false, Ordering::Release);
            return Err(ProxError::SchedulerStopped);
        }

        Ok(SubmitOutcome::Accepted { frame_id })
    }

    /// Non-blocking: the next ready outcome, if any. Call from the thread
    /// that owns the consumer-side state.
    pub fn poll_outcome(&self) -> Option<QueryOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Blocking receive with a deadline. Mostly useful in tests and
    /// batch-style consumers.
    pub fn recv_outcome_timeout(&self, timeout: Duration) -> Option<QueryOutcome> {
        self.outcome_rx.recv_timeout(timeout).ok()
    }

    /// A clone of the outcome channel, for callers that integrate it into
    /// their own `select!` loop.
    pub fn outcomes(&self) -> Receiver<QueryOutcome> {
        self.outcome_rx.clone()
    }

    /// Frames discarded by the latest-wins gate since startup.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// True when no query is queued or running.
    pub fn is_idle(&self) -> bool {
        !self.in_flight.load(Ordering::Acquire)
    }

    /// Stop the worker. Any accepted query still runs to completion first
    /// and its outcome stays available on the outcome channel.
    pub fn shutdown(&mut self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.shutdown_tx.send(());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("query worker panicked during shutdown");
            }
        }
        tracing::debug!(
            "query scheduler stopped ({} frames dropped)",
            self.dropped_frames()
        );
    }
}

impl Drop for QueryScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    job_rx: Receiver<Job>,
    outcome_tx: Sender<QueryOutcome>,
    shutdown_rx: Receiver<()>,
    in_flight: Arc<AtomicBool>,
    config: QueryConfig,
) {
    tracing::trace!("query worker thread started");

    let process = |job: Job| {
        let face_count = job.snapshot.face_count();
        let summary = build_summary(&job.snapshot, &config);
        tracing::trace!(
            "frame {} processed ({face_count} faces, result: {})",
            job.frame_id,
            if summary.is_some() { "summary" } else { "absent" }
        );
        // Release the slot before publishing the outcome: a consumer that
        // receives outcome N and resubmits on the spot must find the gate
        // open. Outcomes still leave in processing order — one worker, one
        // FIFO job channel.
        in_flight.store(false, Ordering::Release);
        let _ = outcome_tx.send(QueryOutcome {
            frame_id: job.frame_id,
            summary,
        });
    };

    loop {
        select! {
            recv(shutdown_rx) -> _ => {
                // Accepted work still completes; drain before exiting.
                while let Ok(job) = job_rx.try_recv() {
                    process(job);
                }
                break;
            },
            recv(job_rx) -> msg => match msg {
                Ok(job) => process(job),
                Err(_) => break,
            }
        }
    }

    tracing::trace!("query worker thread stopped");
}
