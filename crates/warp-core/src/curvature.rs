//! Curvature model
//!
//! A world is tiled by squares, `n` of which meet at every vertex. The
//! valence alone fixes the geometry:
//!
//! ```text
//!   n < 4   spherical   K = +1   (corners too wide, the surface closes up)
//!   n = 4   euclidean   K =  0   (ordinary grid)
//!   n > 4   hyperbolic  K = -1   (corners too narrow, the surface flares out)
//! ```
//!
//! All derived quantities are computed once in `f64`. Errors in these
//! constants multiply through every later composition, so they are never
//! derived at working precision.

use crate::error::{Result, WarpError};
use crate::scalar::{Real, real};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::info;

/// Sign of the curvature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvatureSign {
    Hyperbolic,
    Euclidean,
    Spherical,
}

impl CurvatureSign {
    /// The curvature constant K
    pub fn k(self) -> f64 {
        match self {
            Self::Hyperbolic => -1.0,
            Self::Euclidean => 0.0,
            Self::Spherical => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hyperbolic => "hyperbolic",
            Self::Euclidean => "euclidean",
            Self::Spherical => "spherical",
        }
    }
}

/// Curvature parameters derived from a tiling valence
///
/// Built by [`Curvature::from_tiling`] and then passed by reference to every
/// operation that depends on it. Serialized as its valence alone; the
/// derived constants are recomputed on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TilingRepr", into = "TilingRepr")]
pub struct Curvature {
    valence: f64,
    sign: CurvatureSign,
    cell_width: f64,
    klein_v: f64,
}

impl Curvature {
    /// Derive the curvature for `n` squares meeting at each vertex
    ///
    /// `n` may be fractional. Values at or below 2 have no square tiling.
    pub fn from_tiling(n: f64) -> Result<Self> {
        if !n.is_finite() || n <= 2.0 {
            return Err(WarpError::InvalidValence(n));
        }

        if n == 4.0 {
            return Ok(Self::euclidean());
        }

        let sign = if n < 4.0 {
            CurvatureSign::Spherical
        } else {
            CurvatureSign::Hyperbolic
        };

        // r is the cosh (or cos) of the inradius of one square tile
        let r = (PI / n).cos() / (PI / 4.0).sin();
        let cell_width = (r * r - 1.0).abs().sqrt() / r;

        // Tiny epsilon hides seams between neighbouring tiles
        let klein_v = cell_width + 3e-4 / n;

        Ok(Self {
            valence: n,
            sign,
            cell_width,
            klein_v,
        })
    }

    /// Flat square grid
    pub fn euclidean() -> Self {
        Self {
            valence: 4.0,
            sign: CurvatureSign::Euclidean,
            cell_width: 2.0,
            klein_v: 1.0,
        }
    }

    /// Raw tiling valence
    pub fn valence(&self) -> f64 {
        self.valence
    }

    /// Integer number of tiles per vertex
    pub fn n(&self) -> u32 {
        self.valence as u32
    }

    pub fn sign(&self) -> CurvatureSign {
        self.sign
    }

    pub fn is_euclidean(&self) -> bool {
        self.sign == CurvatureSign::Euclidean
    }

    pub fn is_spherical(&self) -> bool {
        self.sign == CurvatureSign::Spherical
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.sign == CurvatureSign::Hyperbolic
    }

    /// Curvature constant K at working precision
    #[inline]
    pub fn k<T: Real>(&self) -> T {
        real(self.sign.k())
    }

    /// Distance between neighbouring tile centres in Poincaré units
    #[inline]
    pub fn cell_width<T: Real>(&self) -> T {
        real(self.cell_width)
    }

    /// Klein-coordinate position of a tile corner
    #[inline]
    pub fn klein_v<T: Real>(&self) -> T {
        real(self.klein_v)
    }

    /// Curvature-dependent tangent
    pub fn tan_k<T: Real>(&self, x: T) -> T {
        match self.sign {
            CurvatureSign::Spherical => x.tan(),
            CurvatureSign::Hyperbolic => x.tanh(),
            CurvatureSign::Euclidean => x,
        }
    }

    /// Curvature-dependent inverse tangent
    pub fn atan_k<T: Real>(&self, x: T) -> T {
        match self.sign {
            CurvatureSign::Spherical => x.atan(),
            CurvatureSign::Hyperbolic => atanh(x),
            CurvatureSign::Euclidean => x,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TilingRepr {
    valence: f64,
}

impl TryFrom<TilingRepr> for Curvature {
    type Error = WarpError;

    fn try_from(repr: TilingRepr) -> Result<Self> {
        Self::from_tiling(repr.valence)
    }
}

impl From<Curvature> for TilingRepr {
    fn from(curv: Curvature) -> Self {
        Self {
            valence: curv.valence,
        }
    }
}

/// Inverse hyperbolic cosine
pub fn acosh<T: Real>(x: T) -> T {
    (x + (x * x - T::one()).sqrt()).ln()
}

/// Inverse hyperbolic tangent
pub fn atanh<T: Real>(x: T) -> T {
    let half: T = real(0.5);
    half * ((T::one() + x) / (T::one() - x)).ln()
}

/// World curvature with an explicit load lifecycle
///
/// Starts unset. Reading the curvature before a world has been loaded is a
/// configuration error rather than a silent Euclidean default.
#[derive(Debug, Clone, Default)]
pub struct Space {
    curvature: Option<Curvature>,
}

impl Space {
    /// Create an uninitialized space
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a space already set to a tiling
    pub fn with_tiling(n: f64) -> Result<Self> {
        let mut space = Self::new();
        space.set_curvature(n)?;
        Ok(space)
    }

    /// Set the tiling valence
    ///
    /// Returns `true` when the curvature actually changed. Setting the same
    /// valence twice is a no-op.
    pub fn set_curvature(&mut self, n: f64) -> Result<bool> {
        if self.curvature.is_some_and(|c| c.valence == n) {
            return Ok(false);
        }

        let curvature = Curvature::from_tiling(n)?;
        info!(
            valence = n,
            geometry = curvature.sign.name(),
            cell_width = curvature.cell_width,
            "Curvature set"
        );
        self.curvature = Some(curvature);
        Ok(true)
    }

    /// Current curvature
    pub fn curvature(&self) -> Result<&Curvature> {
        self.curvature.as_ref().ok_or(WarpError::CurvatureUnset)
    }

    pub fn is_set(&self) -> bool {
        self.curvature.is_some()
    }

    /// Forget the curvature (world unload)
    pub fn reset(&mut self) {
        self.curvature = None;
    }
}
