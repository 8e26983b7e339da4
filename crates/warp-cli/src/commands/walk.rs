//! Walk command

use tracing::info;
use warp_core::walk::{Step, vertex_loop};
use warp_core::{Curvature, GyroVector, Real, real};

pub fn run(valence: f64, steps: &[Step], single: bool) -> Result<(), Box<dyn std::error::Error>> {
    let curv = Curvature::from_tiling(valence)?;
    let steps = if steps.is_empty() {
        vertex_loop(&curv)
    } else {
        steps.to_vec()
    };

    info!(steps = steps.len(), single, "Walking");

    if single {
        report::<f32>(&curv, &steps);
    } else {
        report::<f64>(&curv, &steps);
    }

    Ok(())
}

fn report<T: Real>(curv: &Curvature, steps: &[Step]) {
    let mut gv = GyroVector::<T>::identity();
    println!("start  {gv}");
    for step in steps {
        gv = gv.translate(curv, &step.delta(curv));
        println!("{step:<6} {gv}");
    }

    let (yaw, distance) = gv
        .gyr()
        .axis_angle()
        .map(|(axis, angle)| (angle * axis.y, gv.vec().norm()))
        .unwrap_or((T::zero(), gv.vec().norm()));
    println!();
    println!("Distance from start: {distance:.9}");
    println!("Net yaw:             {:.3}°", yaw * real::<T>(180.0) / T::pi());
}
