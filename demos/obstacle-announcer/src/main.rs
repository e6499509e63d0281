// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Obstacle Announcer Demo
//!
//! Simulates a scanning session: a synthetic room (floor, far wall, a
//! table) and a viewpoint that walks toward the wall one step per frame.
//! Each frame goes through the full pipeline — scheduler, distance map,
//! threshold policy, announcer — and warnings print as they would be
//! spoken.

use std::time::Duration;

use glam::{Mat4, Vec3};
use proxlib::prelude::*;
use proxlib::{AimHit, Announcer, Classification, DistanceBand, SurfaceFace};

/// Speech sink that "speaks" to stdout.
struct ConsoleSpeech;

impl SpeechSink for ConsoleSpeech {
    fn speak(&mut self, text: &str, _stop_previous: bool) {
        println!("  [speech] {text}");
    }
}

/// One frame's worth of synthetic scan data, as a sensor would hand it to
/// us: a floor patch grid, the far wall, and a table edge.
fn room_snapshot(viewpoint: Vec3, wall_z: f32) -> FrameSnapshot {
    let mut floor_faces = Vec::new();
    for x in -4..=4 {
        for z in -4..=4 {
            floor_faces.push(SurfaceFace::new(
                Vec3::new(x as f32 * 0.5, 0.0, z as f32 * 0.5),
                Classification::Floor,
            ));
        }
    }

    let mut wall_faces = Vec::new();
    for x in -4..=4 {
        for y in 0..=5 {
            wall_faces.push(SurfaceFace::new(
                Vec3::new(x as f32 * 0.5, y as f32 * 0.5, 0.0),
                Classification::Wall,
            ));
        }
    }

    let table_faces = vec![
        SurfaceFace::new(Vec3::new(1.2, 0.75, wall_z - 1.0), Classification::Table),
        SurfaceFace::new(Vec3::new(1.5, 0.75, wall_z - 1.0), Classification::Table),
    ];

    // Aim straight ahead at the wall.
    let target = Vec3::new(viewpoint.x, viewpoint.y, wall_z);
    let aim_distance = viewpoint.distance(target);

    FrameSnapshot::new(
        vec![
            MeshAnchor::new(Mat4::IDENTITY, floor_faces),
            MeshAnchor::new(Mat4::from_translation(Vec3::new(0.0, 0.0, wall_z)), wall_faces),
            MeshAnchor::new(Mat4::IDENTITY, table_faces),
        ],
        target,
        viewpoint,
    )
    .with_aim_hit(AimHit {
        classification: Classification::Wall,
        distance: aim_distance,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .init();

    println!("=== Obstacle Announcer Demo ===\n");

    let mut monitor = ProximityMonitor::new(
        QueryConfig::default(),
        ThresholdPolicy::default(),
        Announcer::new(ConsoleSpeech),
    )?
    .on_distance_update(|distance| {
        let band = DistanceBand::for_distance(distance);
        println!("  aim: {distance:.2}m ahead ({band:?})");
    });

    // Eye height low enough that the floor sits in the caution band the
    // whole walk, the way a tablet held at waist height scans a room.
    let wall_z = 0.0;
    let mut viewpoint = Vec3::new(0.0, 0.65, 4.86);

    for frame in 0..24 {
        println!("frame {frame:02} (viewpoint z = {:.2})", viewpoint.z);
        match monitor.process_frame(room_snapshot(viewpoint, wall_z))? {
            SubmitOutcome::Accepted { .. } => {}
            SubmitOutcome::Dropped => println!("  (frame dropped, query in flight)"),
        }
        monitor.drain_blocking(Duration::from_millis(250));

        if let Some((classification, surface)) = monitor.nearest_obstacle() {
            println!("  nearest: {classification} at {:.2}m", surface.distance);
        }

        // Step toward the wall.
        viewpoint.z -= 0.2;
        std::thread::sleep(Duration::from_millis(20));
    }

    println!("\n{} frame(s) dropped under load", monitor.dropped_frames());
    println!("=== Demo Complete ===");
    Ok(())
}
