//! Collide command
//!
//! Scene files place objects around a player standing at the origin:
//!
//! ```json
//! {
//!   "tiling": 5,
//!   "objects": [
//!     { "position": [0.3, 0.0, 0.0], "yaw": 45.0, "shapes": { "spheres": [...] } }
//!   ],
//!   "probes": [
//!     { "point": [0.25, 0.0, 0.0], "radius": 0.05 },
//!     { "radius": 0.1, "height": 0.5, "delta": [0.0, -0.05, 0.0] }
//!   ]
//! }
//! ```

use crate::OutputFormat;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;
use warp_collide::{
    BodyProbe, CacheMode, ColliderWorld, CollisionConfig, Hit, OwnerId, ShapeSet,
};
use warp_core::domain::check_in_ball;
use warp_core::rotation::euler_degrees;
use warp_core::{GyroVector, Placement, WorldFrame};

#[derive(Debug, Deserialize)]
struct Scene {
    tiling: f64,
    /// Where the player stands, in Poincaré coordinates
    #[serde(default)]
    player: [f64; 3],
    #[serde(default)]
    objects: Vec<SceneObject>,
    #[serde(default)]
    probes: Vec<ProbeSpec>,
}

#[derive(Debug, Deserialize)]
struct SceneObject {
    /// Poincaré position
    #[serde(default)]
    position: [f32; 3],
    /// Rotation about the vertical axis, in degrees
    #[serde(default)]
    yaw: f32,
    #[serde(default)]
    high_precision: bool,
    shapes: ShapeSet,
}

#[derive(Debug, Deserialize)]
struct ProbeSpec {
    #[serde(default)]
    point: [f32; 3],
    radius: f32,
    /// Run a standing two-sphere probe with the head at this height
    #[serde(default)]
    height: Option<f32>,
    /// Movement to resolve for standing probes
    #[serde(default)]
    delta: [f32; 3],
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    probe: usize,
    #[serde(flatten)]
    hit: Hit<f32>,
}

pub fn run(
    input: &str,
    config: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading scene from {}", input);

    let scene: Scene = serde_json::from_str(&fs::read_to_string(input)?)?;
    let config: CollisionConfig = match config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => CollisionConfig::default(),
    };

    let mut world = ColliderWorld::<f32>::with_tiling(scene.tiling, config)?;
    let curv = *world.curvature()?;
    let player = Vector3::from(scene.player);
    check_in_ball(&curv, &player)?;
    let frame = WorldFrame::starting_at(player);

    let mut refreshed = 0;
    for object in &scene.objects {
        let position = Vector3::from(object.position);
        check_in_ball(&curv, &position)?;
        let local = GyroVector::new(
            position,
            euler_degrees(0.0, object.yaw, 0.0),
        );
        let placement = Placement::new(local)
            .with_height_mode(object.shapes.height)
            .with_high_precision(object.high_precision);

        let handle = world.register_shapes(&object.shapes, OwnerId::new(), local)?;
        if world.refresh_group(handle, &placement.compose(&curv, &frame))? {
            refreshed += 1;
        }
    }

    info!(
        objects = scene.objects.len(),
        in_range = refreshed,
        colliders = world.registry().collider_count(),
        probes = scene.probes.len(),
        "Scene loaded"
    );

    let mut reports = Vec::with_capacity(scene.probes.len());
    for (index, spec) in scene.probes.iter().enumerate() {
        let point = Vector3::from(spec.point);
        check_in_ball(&curv, &point)?;
        let hit = match spec.height {
            Some(height) => {
                let mut probe = BodyProbe::standing(height, spec.radius);
                probe.body += point;
                probe.head += point;
                world.iterated_collide(&probe, &Vector3::from(spec.delta))?
            }
            None => world.collide(&point, spec.radius, CacheMode::Cached)?,
        };
        reports.push(ProbeReport { probe: index, hit });
    }

    match format {
        OutputFormat::Text => {
            for report in &reports {
                let hit = &report.hit;
                let d = hit.displacement;
                println!(
                    "probe {}: displacement ({:.6}, {:.6}, {:.6}) ground {:.3} slope [{:.3}, {:.3}]{}",
                    report.probe,
                    d.x,
                    d.y,
                    d.z,
                    hit.max_sin_y_ground,
                    hit.min_sin_y,
                    hit.max_sin_y,
                    match &hit.source {
                        Some(source) => format!(" hit {} #{}", source.group, source.collider),
                        None => String::new(),
                    }
                );
            }
        }

        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(())
}
