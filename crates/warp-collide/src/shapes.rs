//! Authoring shapes
//!
//! Scene files describe an object's collision geometry with a few simple
//! primitives in the object's local unit coordinates. Boxes and meshes are
//! broken into triangles; everything is then placed by the object's local
//! transform and converted into colliders.

use crate::collider::{
    Collider, CylinderCollider, PlaneCollider, SphereCollider, TriangleCollider, has_area,
};
use crate::error::{CollideError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warp_core::rotation::euler_degrees;
use warp_core::{Curvature, HeightMode, Real, real};

/// Triangle corners for the six faces of a box
static BOX_TRIANGLES: [usize; 36] = [
    0, 1, 2, 1, 2, 3, //
    0, 2, 4, 2, 4, 6, //
    0, 4, 1, 4, 1, 5, //
    7, 3, 6, 3, 6, 2, //
    7, 5, 3, 5, 3, 1, //
    7, 6, 5, 6, 5, 4, //
];

/// Scale, then rotate (Euler degrees), then translate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalTransform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl LocalTransform {
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        let [rx, ry, rz] = self.rotation;
        let scaled = p.component_mul(&Vector3::from(self.scale));
        Vector3::from(self.position) + euler_degrees(rx, ry, rz) * scaled
    }
}

/// An oriented box; a zero size on one axis makes it a flat quad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    pub size: [f64; 3],
    /// Thickness added around every face
    #[serde(default)]
    pub offset: f64,
}

impl BoxShape {
    /// Corners before the object transform
    fn corners(&self) -> Vec<Vector3<f64>> {
        let s = Vector3::from(self.size) * 0.5;
        let [rx, ry, rz] = self.rotation;
        let r = euler_degrees(rx, ry, rz);
        let c = Vector3::from(self.position);

        let local: Vec<[f64; 3]> = if s.x == 0.0 {
            vec![[0.0, s.y, s.z], [0.0, -s.y, s.z], [0.0, s.y, -s.z], [0.0, -s.y, -s.z]]
        } else if s.y == 0.0 {
            vec![[s.x, 0.0, s.z], [-s.x, 0.0, s.z], [s.x, 0.0, -s.z], [-s.x, 0.0, -s.z]]
        } else if s.z == 0.0 {
            vec![[s.x, s.y, 0.0], [-s.x, s.y, 0.0], [s.x, -s.y, 0.0], [-s.x, -s.y, 0.0]]
        } else {
            // x flips fastest, then y, then z
            (0..8)
                .map(|i| {
                    let sign = |bit: usize| if i & bit == 0 { 1.0 } else { -1.0 };
                    [s.x * sign(1), s.y * sign(2), s.z * sign(4)]
                })
                .collect()
        };
        local.into_iter().map(|v| c + r * Vector3::from(v)).collect()
    }

    /// Corner indices, three per triangle
    fn triangles(&self, corners: usize) -> &'static [usize] {
        if corners == 4 { &BOX_TRIANGLES[..6] } else { &BOX_TRIANGLES }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereShape {
    pub center: [f64; 3],
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderShape {
    pub p1: [f64; 3],
    pub p2: [f64; 3],
    pub radius: f64,
    #[serde(default)]
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleShape {
    pub a: [f64; 3],
    pub b: [f64; 3],
    pub c: [f64; 3],
}

/// A plane through `point`, facing along `point` from the tile centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneShape {
    pub point: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshShape {
    pub vertices: Vec<[f64; 3]>,
    /// Three vertex indices per triangle
    pub indices: Vec<usize>,
}

/// The collision geometry of one object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeSet {
    pub boxes: Vec<BoxShape>,
    pub spheres: Vec<SphereShape>,
    pub cylinders: Vec<CylinderShape>,
    pub triangles: Vec<TriangleShape>,
    pub planes: Vec<PlaneShape>,
    pub meshes: Vec<MeshShape>,
    /// Placement of the shapes within the object
    pub transform: LocalTransform,
    pub height: HeightMode,
    /// Drop triangles lying entirely on or under the floor
    pub remove_floor_triangles: bool,
}

impl Default for ShapeSet {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            spheres: Vec::new(),
            cylinders: Vec::new(),
            triangles: Vec::new(),
            planes: Vec::new(),
            meshes: Vec::new(),
            transform: LocalTransform::default(),
            height: HeightMode::default(),
            remove_floor_triangles: true,
        }
    }
}

impl ShapeSet {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
            && self.spheres.is_empty()
            && self.cylinders.is_empty()
            && self.triangles.is_empty()
            && self.planes.is_empty()
            && self.meshes.is_empty()
    }

    /// Convert every shape into colliders, in authoring order
    pub fn build<T: Real>(&self, curv: &Curvature) -> Result<Vec<Collider<T>>> {
        let mut builder = Builder {
            curv,
            set: self,
            colliders: Vec::new(),
            floor_dropped: 0,
            degenerate_dropped: 0,
        };

        for shape in &self.boxes {
            let corners = shape.corners();
            for tri in shape.triangles(corners.len()).chunks_exact(3) {
                builder.triangle(
                    &corners[tri[0]],
                    &corners[tri[1]],
                    &corners[tri[2]],
                    shape.offset,
                )?;
            }
        }
        for shape in &self.spheres {
            let collider = SphereCollider::new(
                curv,
                &builder.place(&Vector3::from(shape.center)),
                real(shape.radius * self.transform.scale[1]),
                self.height,
            )?;
            builder.colliders.push(collider.into());
        }
        for shape in &self.cylinders {
            let collider = CylinderCollider::new(
                curv,
                &builder.place(&Vector3::from(shape.p1)),
                &builder.place(&Vector3::from(shape.p2)),
                real(shape.radius * self.transform.scale[1]),
                shape.capped,
                self.height,
            )?;
            builder.colliders.push(collider.into());
        }
        for shape in &self.triangles {
            builder.triangle(
                &Vector3::from(shape.a),
                &Vector3::from(shape.b),
                &Vector3::from(shape.c),
                0.0,
            )?;
        }
        for shape in &self.planes {
            let collider =
                PlaneCollider::new(curv, &builder.place(&Vector3::from(shape.point)), self.height)?;
            builder.colliders.push(collider.into());
        }
        for mesh in &self.meshes {
            if mesh.indices.len() % 3 != 0 {
                return Err(CollideError::InvalidShape(format!(
                    "mesh index count {} is not a multiple of 3",
                    mesh.indices.len()
                )));
            }
            let vertex = |i: usize| {
                mesh.vertices.get(i).map(|v| Vector3::from(*v)).ok_or_else(|| {
                    CollideError::InvalidShape(format!(
                        "mesh index {i} out of range for {} vertices",
                        mesh.vertices.len()
                    ))
                })
            };
            for tri in mesh.indices.chunks_exact(3) {
                builder.mesh_triangle(&vertex(tri[0])?, &vertex(tri[1])?, &vertex(tri[2])?)?;
            }
        }

        debug!(
            colliders = builder.colliders.len(),
            floor_dropped = builder.floor_dropped,
            degenerate_dropped = builder.degenerate_dropped,
            "Built colliders from shapes"
        );
        Ok(builder.colliders)
    }
}

struct Builder<'a, T: Real> {
    curv: &'a Curvature,
    set: &'a ShapeSet,
    colliders: Vec<Collider<T>>,
    floor_dropped: usize,
    degenerate_dropped: usize,
}

impl<T: Real> Builder<'_, T> {
    /// Object-local point to unit coordinates at working precision
    fn place(&self, p: &Vector3<f64>) -> Vector3<T> {
        self.set.transform.transform_point(p).map(real::<T>)
    }

    fn triangle(
        &mut self,
        a: &Vector3<f64>,
        b: &Vector3<f64>,
        c: &Vector3<f64>,
        offset: f64,
    ) -> Result<()> {
        let tri = TriangleCollider::new(
            self.curv,
            &self.place(a),
            &self.place(b),
            &self.place(c),
            real(offset),
            self.set.height,
        )?;
        // The ground check already covers anything at or below the floor
        if self.set.remove_floor_triangles && tri.vertices().iter().all(|v| v.y <= T::zero()) {
            self.floor_dropped += 1;
            return Ok(());
        }
        self.colliders.push(tri.into());
        Ok(())
    }

    /// Imported meshes routinely carry slivers; drop those instead of the
    /// whole object
    fn mesh_triangle(&mut self, a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Result<()> {
        if !has_area(&self.place(a), &self.place(b), &self.place(c)) {
            warn!(?a, ?b, ?c, "Skipping mesh triangle with no area");
            self.degenerate_dropped += 1;
            return Ok(());
        }
        self.triangle(a, b, c, 0.0)
    }
}
