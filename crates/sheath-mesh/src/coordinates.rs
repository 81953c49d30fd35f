//! Metric coefficients of a field-aligned curvilinear mesh.

use sheath_core::{Field2D, Field3D};

/// Axisymmetric metric data for one mesh partition.
///
/// Coefficients are stored per `(x, y)` cell, guard cells included.
/// The z spacing is uniform.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    /// Jacobian `J`.
    pub j: Field2D,
    /// Parallel metric component `g_22`.
    pub g_22: Field2D,
    /// Covariant `g_23`, used by the poloidal ExB term.
    pub g_23: Field2D,
    /// Covariant `g_12`, used by the poloidal ExB term.
    pub g_12: Field2D,
    /// Radial spacing.
    pub dx: Field2D,
    /// Parallel spacing.
    pub dy: Field2D,
    /// Toroidal spacing.
    pub dz: f64,
    /// Toroidal shift that maps standard to field-aligned coordinates.
    pub z_shift: Field2D,
}

impl Coordinates {
    /// Length of the periodic z domain.
    pub fn zlength(&self, nz: usize) -> f64 {
        self.dz * nz as f64
    }

    /// `sqrt(g_22)` at `(x, y)`.
    #[inline]
    pub fn sqrt_g22(&self, x: usize, y: usize) -> f64 {
        self.g_22[(x, y)].sqrt()
    }

    /// `dy^2 g_22` broadcast to a 3D field, the parallel diffusion scale.
    pub fn dy2_g22(&self) -> Field3D {
        let dy = &self.dy;
        let g22 = &self.g_22;
        Field3D::from_fn(self.j.mesh_id(), self.j.shape(), |x, y, _| {
            dy[(x, y)] * dy[(x, y)] * g22[(x, y)]
        })
    }
}
