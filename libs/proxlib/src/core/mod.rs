// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod announce;
pub mod classification;
pub mod distance_map;
pub mod error;
pub mod mesh;
pub mod monitor;
pub mod query;
pub mod resolver;
pub mod scheduler;

pub use announce::*;
pub use classification::*;
pub use distance_map::*;
pub use error::*;
pub use mesh::*;
pub use monitor::*;
pub use query::*;
pub use resolver::*;
pub use scheduler::*;
