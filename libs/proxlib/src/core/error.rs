// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use thiserror::Error;

/// Errors surfaced by the scheduling layer.
///
/// The distance query itself never fails: an input set where nothing
/// survives cutoff filtering produces an absent summary, not an error
/// (callers treat that as "insufficient data this frame" and retry on the
/// next one).
#[derive(Error, Debug)]
pub enum ProxError {
    #[error("query scheduler has been shut down")]
    SchedulerStopped,

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProxError>;
