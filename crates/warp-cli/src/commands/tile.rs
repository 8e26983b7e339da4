//! Tile command

use warp_core::{Curvature, Vector3};
use warp_core::walk::expected_holonomy;

pub fn run(valence: f64) -> Result<(), Box<dyn std::error::Error>> {
    let curv = Curvature::from_tiling(valence)?;

    println!("Tiling {{4,{}}}", curv.valence());
    println!("===========\n");

    println!("Geometry:    {}", curv.sign().name());
    println!("K:           {}", curv.k::<f64>());
    println!("Cell width:  {:.9}", curv.cell_width::<f64>());
    println!("Klein v:     {:.9}", curv.klein_v::<f64>());

    let (axis, angle) = expected_holonomy::<f64>(&curv)
        .axis_angle()
        .map(|(axis, angle)| (axis.into_inner(), angle.to_degrees()))
        .unwrap_or((Vector3::y(), 0.0));
    println!();
    println!("Vertex loop: {} steps", curv.n());
    if angle == 0.0 {
        println!("Holonomy:    none");
    } else {
        println!(
            "Holonomy:    {:.3}° about ({:.3}, {:.3}, {:.3})",
            angle, axis.x, axis.y, axis.z
        );
    }

    Ok(())
}
