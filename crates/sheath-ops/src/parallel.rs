//! Finite-volume operators along the magnetic field.
//!
//! Every operator here works in field-aligned coordinates: inputs are
//! transformed over [`Region::NoX`], fluxes are accumulated per `(x, z)`
//! column along y, and the result is transformed back over
//! [`Region::NoBoundary`]. Only interior cells of a result are
//! meaningful.
//!
//! Face fluxes are scaled by
//!
//! ```text
//! common = (J_j + J_n) / (sqrt(g_22,j) + sqrt(g_22,n))
//! ```
//!
//! and divided by `dy J` of the cell they are added to, so that the sum
//! of `result * dy * J` over a periodic column telescopes to zero.

use std::ops::RangeInclusive;

use sheath_core::{Field3D, Region};
use sheath_mesh::{Coordinates, Mesh};

use crate::check::{ensure_compatible, ensure_y_guards, mesh_err};
use crate::error::OpError;
use crate::stencil::{CellEdges, Mc, Stencil1D};

/// Which face of a cell a flux crosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    /// The `y - 1/2` face.
    Lower,
    /// The `y + 1/2` face.
    Upper,
}

/// How a face flux was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowRegime {
    /// Face on a non-periodic domain end; no classification is made.
    Boundary,
    /// Face velocity leaves the cell faster than the local wave speed.
    SupersonicOut,
    /// Face velocity enters the cell faster than the local wave speed.
    SupersonicIn,
    /// Face velocity within the wave speed: blended upwind flux.
    Subsonic,
}

/// One face flux evaluated by [`div_par_fvv_inspect`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceFlux {
    /// x index of the cell.
    pub x: usize,
    /// y index of the cell, in field-aligned coordinates.
    pub y: usize,
    /// z index of the cell.
    pub z: usize,
    /// Which face of the cell.
    pub face: Face,
    /// Face velocity, the mean of the two adjacent cell velocities.
    pub vpar: f64,
    /// Larger of the two adjacent wave speeds; `None` on a boundary face.
    pub amax: Option<f64>,
    /// Branch taken.
    pub regime: FlowRegime,
    /// Flux through the face, positive in `+y`.
    pub flux: f64,
}

/// Flux scale factors for the face between `y` and `n`: the factor for
/// cell `y` and the factor for cell `n`.
#[inline]
fn face_factors(c: &Coordinates, x: usize, y: usize, n: usize) -> (f64, f64) {
    let common = (c.j[(x, y)] + c.j[(x, n)]) / (c.sqrt_g22(x, y) + c.sqrt_g22(x, n));
    (
        common / (c.dy[(x, y)] * c.j[(x, y)]),
        common / (c.dy[(x, n)] * c.j[(x, n)]),
    )
}

/// y cells whose faces are evaluated for column `x`.
///
/// Guard cells next to a partition or periodic boundary are included so
/// that both sides of such a face see the same flux without exchanging
/// fluxes. Physical end cells are excluded and handled as boundaries.
fn column_range(mesh: &dyn Mesh, x: usize) -> RangeInclusive<usize> {
    let s = mesh.shape();
    let periodic = mesh.periodic_y(x);
    let ys = if !mesh.first_y(x) || periodic {
        s.ystart() - 1
    } else {
        s.ystart()
    };
    let ye = if !mesh.last_y(x) || periodic {
        s.yend() + 1
    } else {
        s.yend()
    };
    ys..=ye
}

fn aligned(op: &'static str, mesh: &dyn Mesh, f: &Field3D) -> Result<Field3D, OpError> {
    mesh.to_field_aligned(f, Region::NoX).map_err(mesh_err(op))
}

// ── div_par_fvv ────────────────────────────────────────────────────

/// Parallel divergence of `f v^2`, the self-advective momentum flux.
///
/// Uses the [`Mc`] limiter. See [`div_par_fvv_inspect`] for the scheme.
pub fn div_par_fvv(
    mesh: &dyn Mesh,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    fixflux: bool,
) -> Result<Field3D, OpError> {
    div_par_fvv_inspect(mesh, f, v, wave_speed, fixflux, &Mc, |_| {})
}

/// [`div_par_fvv`] with a chosen limiter.
pub fn div_par_fvv_with<L: CellEdges + ?Sized>(
    mesh: &dyn Mesh,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    fixflux: bool,
    limiter: &L,
) -> Result<Field3D, OpError> {
    div_par_fvv_inspect(mesh, f, v, wave_speed, fixflux, limiter, |_| {})
}

/// [`div_par_fvv`] reporting every evaluated face flux to `observe`.
///
/// For each cell the face values of `f` and `v` are reconstructed with
/// `limiter` and the face velocity is `vpar = (v_j + v_n) / 2`. With
/// `amax` the larger adjacent wave speed, the upper-face flux is
///
/// - `R_f vpar R_v` when `vpar > amax` (supersonic out of the cell),
/// - `0` when `vpar < -amax` (supersonic in; the neighbour's lower face
///   carries the flux),
/// - `R_f (vpar + amax)/2 R_v` otherwise.
///
/// The lower face mirrors this with `L` values and `(vpar - amax)/2`.
/// On a non-periodic domain end the classification is skipped: with
/// `fixflux` the flux is `b vpar^2` for the midpoint value `b`,
/// otherwise the upwind flux plus `ws (R_f R_v - b vpar)`.
pub fn div_par_fvv_inspect<L: CellEdges + ?Sized>(
    mesh: &dyn Mesh,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    fixflux: bool,
    limiter: &L,
    mut observe: impl FnMut(&FaceFlux),
) -> Result<Field3D, OpError> {
    const OP: &str = "div_par_fvv";
    ensure_compatible(OP, mesh, &[f, v, wave_speed])?;
    ensure_y_guards(OP, mesh, 2)?;

    let f = aligned(OP, mesh, f)?;
    let v = aligned(OP, mesh, v)?;
    let ws = aligned(OP, mesh, wave_speed)?;
    let coords = mesh.coordinates();
    let s = mesh.shape();
    let mut result = f.zeros_like();

    for x in s.xstart()..=s.xend() {
        let periodic = mesh.periodic_y(x);
        let upper_end = mesh.last_y(x) && !periodic;
        let lower_end = mesh.first_y(x) && !periodic;

        for y in column_range(mesh, x) {
            let (fac_rc, fac_rp) = face_factors(coords, x, y, y + 1);
            let (fac_lc, fac_lm) = face_factors(coords, x, y, y - 1);

            for z in 0..s.nz {
                let sf = Stencil1D::reconstruct(f[(x, y - 1, z)], f[(x, y, z)], f[(x, y + 1, z)], limiter);
                let sv = Stencil1D::reconstruct(v[(x, y - 1, z)], v[(x, y, z)], v[(x, y + 1, z)], limiter);
                let wc = ws[(x, y, z)];

                // Upper face
                let vpar = 0.5 * (v[(x, y, z)] + v[(x, y + 1, z)]);
                let (flux, amax, regime) = if upper_end && y == s.yend() {
                    let bndry = 0.5 * (sf.c + sf.p);
                    let flux = if fixflux {
                        bndry * vpar * vpar
                    } else {
                        sf.r * vpar * sv.r + wc * (sf.r * sv.r - bndry * vpar)
                    };
                    (flux, None, FlowRegime::Boundary)
                } else {
                    let amax = wc.max(ws[(x, y + 1, z)]);
                    let (flux, regime) = if vpar > amax {
                        (sf.r * vpar * sv.r, FlowRegime::SupersonicOut)
                    } else if vpar < -amax {
                        (0.0, FlowRegime::SupersonicIn)
                    } else {
                        (sf.r * 0.5 * (vpar + amax) * sv.r, FlowRegime::Subsonic)
                    };
                    (flux, Some(amax), regime)
                };
                result[(x, y, z)] += flux * fac_rc;
                result[(x, y + 1, z)] -= flux * fac_rp;
                observe(&FaceFlux {
                    x,
                    y,
                    z,
                    face: Face::Upper,
                    vpar,
                    amax,
                    regime,
                    flux,
                });

                // Lower face
                let vpar = 0.5 * (v[(x, y, z)] + v[(x, y - 1, z)]);
                let (flux, amax, regime) = if lower_end && y == s.ystart() {
                    let bndry = 0.5 * (sf.c + sf.m);
                    let flux = if fixflux {
                        bndry * vpar * vpar
                    } else {
                        sf.l * vpar * sv.l - wc * (sf.l * sv.l - bndry * vpar)
                    };
                    (flux, None, FlowRegime::Boundary)
                } else {
                    let amax = wc.max(ws[(x, y - 1, z)]);
                    let (flux, regime) = if vpar < -amax {
                        (sf.l * vpar * sv.l, FlowRegime::SupersonicOut)
                    } else if vpar > amax {
                        (0.0, FlowRegime::SupersonicIn)
                    } else {
                        (sf.l * 0.5 * (vpar - amax) * sv.l, FlowRegime::Subsonic)
                    };
                    (flux, Some(amax), regime)
                };
                result[(x, y, z)] -= flux * fac_lc;
                result[(x, y - 1, z)] += flux * fac_lm;
                observe(&FaceFlux {
                    x,
                    y,
                    z,
                    face: Face::Lower,
                    vpar,
                    amax,
                    regime,
                    flux,
                });
            }
        }
    }

    mesh.from_field_aligned(&result, Region::NoBoundary)
        .map_err(mesh_err(OP))
}

// ── div_par ────────────────────────────────────────────────────────

/// Parallel divergence of `f v`, the advective flux of a scalar.
///
/// Uses the [`Mc`] limiter. See [`div_par_with`].
pub fn div_par(
    mesh: &dyn Mesh,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    fixflux: bool,
) -> Result<Field3D, OpError> {
    div_par_with(mesh, f, v, wave_speed, fixflux, &Mc)
}

/// Parallel divergence of `f v` with a chosen limiter.
///
/// Interior faces use a local Lax-Friedrichs flux: with
/// `amax = max(ws_j, ws_n, |v_j|, |v_n|)` the upper-face flux is
/// `R_f (vpar + amax) / 2` and the lower-face flux `L_f (vpar - amax) / 2`.
/// On a non-periodic end, `fixflux` uses the midpoint value `b vpar`;
/// otherwise `R_f vpar + ws (R_f - b)` (upper) or `L_f vpar - ws (L_f - b)`
/// (lower).
pub fn div_par_with<L: CellEdges + ?Sized>(
    mesh: &dyn Mesh,
    f: &Field3D,
    v: &Field3D,
    wave_speed: &Field3D,
    fixflux: bool,
    limiter: &L,
) -> Result<Field3D, OpError> {
    const OP: &str = "div_par";
    ensure_compatible(OP, mesh, &[f, v, wave_speed])?;
    ensure_y_guards(OP, mesh, 2)?;

    let f = aligned(OP, mesh, f)?;
    let v = aligned(OP, mesh, v)?;
    let ws = aligned(OP, mesh, wave_speed)?;
    let coords = mesh.coordinates();
    let s = mesh.shape();
    let mut result = f.zeros_like();

    for x in s.xstart()..=s.xend() {
        let periodic = mesh.periodic_y(x);
        let upper_end = mesh.last_y(x) && !periodic;
        let lower_end = mesh.first_y(x) && !periodic;

        for y in column_range(mesh, x) {
            let (fac_rc, fac_rp) = face_factors(coords, x, y, y + 1);
            let (fac_lc, fac_lm) = face_factors(coords, x, y, y - 1);

            for z in 0..s.nz {
                let sf = Stencil1D::reconstruct(f[(x, y - 1, z)], f[(x, y, z)], f[(x, y + 1, z)], limiter);
                let wc = ws[(x, y, z)];
                let vc = v[(x, y, z)];

                let vpar = 0.5 * (vc + v[(x, y + 1, z)]);
                let flux = if upper_end && y == s.yend() {
                    let bndry = 0.5 * (sf.c + sf.p);
                    if fixflux {
                        bndry * vpar
                    } else {
                        sf.r * vpar + wc * (sf.r - bndry)
                    }
                } else {
                    let amax = wc
                        .max(ws[(x, y + 1, z)])
                        .max(vc.abs())
                        .max(v[(x, y + 1, z)].abs());
                    sf.r * 0.5 * (vpar + amax)
                };
                result[(x, y, z)] += flux * fac_rc;
                result[(x, y + 1, z)] -= flux * fac_rp;

                let vpar = 0.5 * (vc + v[(x, y - 1, z)]);
                let flux = if lower_end && y == s.ystart() {
                    let bndry = 0.5 * (sf.c + sf.m);
                    if fixflux {
                        bndry * vpar
                    } else {
                        sf.l * vpar - wc * (sf.l - bndry)
                    }
                } else {
                    let amax = wc
                        .max(ws[(x, y - 1, z)])
                        .max(vc.abs())
                        .max(v[(x, y - 1, z)].abs());
                    sf.l * 0.5 * (vpar - amax)
                };
                result[(x, y, z)] -= flux * fac_lc;
                result[(x, y - 1, z)] += flux * fac_lm;
            }
        }
    }

    mesh.from_field_aligned(&result, Region::NoBoundary)
        .map_err(mesh_err(OP))
}

// ── Diffusion and gradient ─────────────────────────────────────────

/// Parallel diffusion `div(K grad_par f)` in flux form.
///
/// Face coefficient, Jacobian and `g_22` are two-point averages; the
/// face gradient is `2 (f_n - f_j) / (dy_j + dy_n)`. With `bndry_flux`
/// false, no flux crosses a non-periodic domain end.
pub fn div_par_k_grad_par(
    mesh: &dyn Mesh,
    k: &Field3D,
    f: &Field3D,
    bndry_flux: bool,
) -> Result<Field3D, OpError> {
    const OP: &str = "div_par_k_grad_par";
    ensure_compatible(OP, mesh, &[k, f])?;
    ensure_y_guards(OP, mesh, 1)?;

    let k = aligned(OP, mesh, k)?;
    let f = aligned(OP, mesh, f)?;
    let c = mesh.coordinates();
    let s = mesh.shape();
    let mut result = f.zeros_like();

    let face_flux = |x: usize, y: usize, n: usize, z: usize| -> f64 {
        let kf = 0.5 * (k[(x, y, z)] + k[(x, n, z)]);
        let jf = 0.5 * (c.j[(x, y)] + c.j[(x, n)]);
        let g22 = 0.5 * (c.g_22[(x, y)] + c.g_22[(x, n)]);
        let gradient = 2.0 * (f[(x, n, z)] - f[(x, y, z)]) / (c.dy[(x, y)] + c.dy[(x, n)]);
        kf * jf * gradient / g22
    };

    for (x, y, z) in s.iter(Region::NoBoundary) {
        let periodic = mesh.periodic_y(x);
        let volume = c.dy[(x, y)] * c.j[(x, y)];
        if bndry_flux || periodic || !mesh.last_y(x) || y != s.yend() {
            result[(x, y, z)] += face_flux(x, y, y + 1, z) / volume;
        }
        if bndry_flux || periodic || !mesh.first_y(x) || y != s.ystart() {
            // minus the lower-face flux
            result[(x, y, z)] += face_flux(x, y, y - 1, z) / volume;
        }
    }

    mesh.from_field_aligned(&result, Region::NoBoundary)
        .map_err(mesh_err(OP))
}

/// Second-order central parallel gradient `b . grad f`.
pub fn grad_par(mesh: &dyn Mesh, f: &Field3D) -> Result<Field3D, OpError> {
    const OP: &str = "grad_par";
    ensure_compatible(OP, mesh, &[f])?;
    ensure_y_guards(OP, mesh, 1)?;

    let f = aligned(OP, mesh, f)?;
    let c = mesh.coordinates();
    let s = mesh.shape();
    let mut result = f.zeros_like();
    for (x, y, z) in s.iter(Region::NoBoundary) {
        result[(x, y, z)] =
            (f[(x, y + 1, z)] - f[(x, y - 1, z)]) / (2.0 * c.dy[(x, y)] * c.sqrt_g22(x, y));
    }
    mesh.from_field_aligned(&result, Region::NoBoundary)
        .map_err(mesh_err(OP))
}
