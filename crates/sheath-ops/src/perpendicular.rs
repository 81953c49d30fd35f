//! Operators across the magnetic field and along the periodic z axis.

use sheath_core::{Field3D, Region};
use sheath_mesh::Mesh;

use crate::check::{ensure_compatible, ensure_x_guards, ensure_y_guards, mesh_err};
use crate::error::OpError;
use crate::stencil::{Mc, Stencil1D};

#[inline]
fn z_plus(k: usize, nz: usize) -> usize {
    (k + 1) % nz
}

#[inline]
fn z_minus(k: usize, nz: usize) -> usize {
    (k + nz - 1) % nz
}

/// Divergence of the ExB flux `n (b x grad f) / B`.
///
/// The x-z advection is upwinded on corner-interpolated face velocities
/// with [`Mc`]-limited face values of `n`:
///
/// ```text
///    fmp --- vU --- fpp
///     |              |
///    vL      n      vR    -> x
///     |              |
///    fmm --- vD --- fpm
/// ```
///
/// Each face flux is added by its donor cell only, so every interior face
/// is counted once. With `bndry_flux`, flux crosses the physical x
/// boundaries: outflow uses the reconstructed face value and inflow the
/// midpoint of the boundary and guard cells. With `poloidal`, the
/// y component of the drift, `J v^y = J (g_23 df/dx - g_12 df/dz) / g_22`,
/// is added with central face values in field-aligned coordinates.
pub fn div_n_bxgrad_f_b_xppm(
    mesh: &dyn Mesh,
    n: &Field3D,
    f: &Field3D,
    bndry_flux: bool,
    poloidal: bool,
) -> Result<Field3D, OpError> {
    const OP: &str = "div_n_bxgrad_f_b_xppm";
    ensure_compatible(OP, mesh, &[n, f])?;
    ensure_x_guards(OP, mesh, 1)?;

    let c = mesh.coordinates();
    let s = mesh.shape();
    let nz = s.nz;
    let dz = c.dz;
    let mut result = n.zeros_like();

    for (i, j, k) in s.iter(Region::NoBoundary) {
        let kp = z_plus(k, nz);
        let km = z_minus(k, nz);
        let jac = c.j[(i, j)];
        let dx = c.dx[(i, j)];

        // stream function on the cell corners
        let fmm = 0.25 * (f[(i, j, k)] + f[(i - 1, j, k)] + f[(i, j, km)] + f[(i - 1, j, km)]);
        let fmp = 0.25 * (f[(i, j, k)] + f[(i, j, kp)] + f[(i - 1, j, k)] + f[(i - 1, j, kp)]);
        let fpp = 0.25 * (f[(i, j, k)] + f[(i, j, kp)] + f[(i + 1, j, k)] + f[(i + 1, j, kp)]);
        let fpm = 0.25 * (f[(i, j, k)] + f[(i + 1, j, k)] + f[(i, j, km)] + f[(i + 1, j, km)]);

        // contravariant flux velocities on the faces
        let v_up = jac * (fmp - fpp) / dx;
        let v_down = jac * (fmm - fpm) / dx;
        let v_right = 0.5 * (jac + c.j[(i + 1, j)]) * (fpp - fpm) / dz;
        let v_left = 0.5 * (jac + c.j[(i - 1, j)]) * (fmp - fmm) / dz;

        let vol = dx * jac;
        let vol_p = c.dx[(i + 1, j)] * c.j[(i + 1, j)];
        let vol_m = c.dx[(i - 1, j)] * c.j[(i - 1, j)];

        // x direction
        let sx = Stencil1D::reconstruct(n[(i - 1, j, k)], n[(i, j, k)], n[(i + 1, j, k)], &Mc);
        if i == s.xend() && mesh.last_x() {
            if bndry_flux {
                let flux = if v_right > 0.0 {
                    v_right * sx.r
                } else {
                    v_right * 0.5 * (n[(i + 1, j, k)] + n[(i, j, k)])
                };
                result[(i, j, k)] += flux / vol;
                result[(i + 1, j, k)] -= flux / vol_p;
            }
        } else if v_right > 0.0 {
            let flux = v_right * sx.r;
            result[(i, j, k)] += flux / vol;
            result[(i + 1, j, k)] -= flux / vol_p;
        }

        if i == s.xstart() && mesh.first_x() {
            if bndry_flux {
                let flux = if v_left < 0.0 {
                    v_left * sx.l
                } else {
                    v_left * 0.5 * (n[(i - 1, j, k)] + n[(i, j, k)])
                };
                result[(i, j, k)] -= flux / vol;
                result[(i - 1, j, k)] += flux / vol_m;
            }
        } else if v_left < 0.0 {
            let flux = v_left * sx.l;
            result[(i, j, k)] -= flux / vol;
            result[(i - 1, j, k)] += flux / vol_m;
        }

        // z direction
        let sz = Stencil1D::reconstruct(n[(i, j, km)], n[(i, j, k)], n[(i, j, kp)], &Mc);
        let zvol = jac * dz;
        if v_up > 0.0 {
            let flux = v_up * sz.r;
            result[(i, j, k)] += flux / zvol;
            result[(i, j, kp)] -= flux / zvol;
        }
        if v_down < 0.0 {
            let flux = v_down * sz.l;
            result[(i, j, k)] -= flux / zvol;
            result[(i, j, km)] += flux / zvol;
        }
    }

    if poloidal {
        ensure_y_guards(OP, mesh, 1)?;
        let na = mesh.to_field_aligned(n, Region::NoX).map_err(mesh_err(OP))?;
        let fa = mesh.to_field_aligned(f, Region::NoX).map_err(mesh_err(OP))?;
        let mut yresult = na.zeros_like();

        let jv = |i: usize, j: usize, k: usize| -> f64 {
            let dfdx = (fa[(i + 1, j, k)] - fa[(i - 1, j, k)]) / (2.0 * c.dx[(i, j)]);
            let dfdz = (fa[(i, j, z_plus(k, nz))] - fa[(i, j, z_minus(k, nz))]) / (2.0 * dz);
            c.j[(i, j)] * (c.g_23[(i, j)] * dfdx - c.g_12[(i, j)] * dfdz) / c.g_22[(i, j)]
        };

        for (i, j, k) in s.iter(Region::NoBoundary) {
            let centre = jv(i, j, k);
            let v_up = 0.5 * (centre + jv(i, j + 1, k));
            let v_down = 0.5 * (centre + jv(i, j - 1, k));
            let n_up = 0.5 * (na[(i, j, k)] + na[(i, j + 1, k)]);
            let n_down = 0.5 * (na[(i, j, k)] + na[(i, j - 1, k)]);
            yresult[(i, j, k)] = (n_up * v_up - n_down * v_down) / (c.j[(i, j)] * c.dy[(i, j)]);
        }

        let yresult = mesh
            .from_field_aligned(&yresult, Region::NoBoundary)
            .map_err(mesh_err(OP))?;
        result += &yresult;
    }

    Ok(result)
}

/// Index-space perpendicular diffusion `div(a grad_perp f)`.
///
/// Fluxes `(f_{i+1} - f_i) (a_i + a_{i+1}) / 2` are exchanged between
/// neighbouring cells in x and in the periodic z direction, with no
/// metric factors. With `xflux` false, nothing crosses the physical x
/// boundaries.
pub fn div_perp_lap_fv_index(
    mesh: &dyn Mesh,
    a: &Field3D,
    f: &Field3D,
    xflux: bool,
) -> Result<Field3D, OpError> {
    const OP: &str = "div_perp_lap_fv_index";
    ensure_compatible(OP, mesh, &[a, f])?;
    ensure_x_guards(OP, mesh, 1)?;

    let s = mesh.shape();
    let nz = s.nz;
    let mut result = f.zeros_like();

    let mut xs = s.xstart() - 1;
    let mut xe = s.xend();
    if !xflux {
        if mesh.first_x() {
            xs += 1;
        }
        if mesh.last_x() {
            xe -= 1;
        }
    }
    for i in xs..=xe {
        for j in s.ystart()..=s.yend() {
            for k in 0..nz {
                let fout = (f[(i + 1, j, k)] - f[(i, j, k)]) * 0.5 * (a[(i, j, k)] + a[(i + 1, j, k)]);
                result[(i, j, k)] += fout;
                result[(i + 1, j, k)] -= fout;
            }
        }
    }

    for (i, j, k) in s.iter(Region::NoBoundary) {
        let kp = z_plus(k, nz);
        let fout = (f[(i, j, kp)] - f[(i, j, k)]) * 0.5 * (a[(i, j, k)] + a[(i, j, kp)]);
        result[(i, j, k)] += fout;
        result[(i, j, kp)] -= fout;
    }

    Ok(result)
}

/// Fourth derivative in z, `(f_{k+2} - 4 f_{k+1} + 6 f_k - 4 f_{k-1} + f_{k-2}) / dz^4`.
///
/// Evaluated on interior cells; z is periodic.
pub fn d4dz4(mesh: &dyn Mesh, f: &Field3D) -> Result<Field3D, OpError> {
    const OP: &str = "d4dz4";
    ensure_compatible(OP, mesh, &[f])?;

    let s = mesh.shape();
    let nz = s.nz;
    let dz4 = mesh.coordinates().dz.powi(4);
    let mut result = f.zeros_like();
    for (i, j, k) in s.iter(Region::NoBoundary) {
        let kp = z_plus(k, nz);
        let kpp = z_plus(kp, nz);
        let km = z_minus(k, nz);
        let kmm = z_minus(km, nz);
        result[(i, j, k)] = (f[(i, j, kpp)] - 4.0 * f[(i, j, kp)] + 6.0 * f[(i, j, k)]
            - 4.0 * f[(i, j, km)]
            + f[(i, j, kmm)])
            / dz4;
    }
    Ok(result)
}
