//! Conservation and alignment properties of the parallel operators.

use proptest::prelude::*;
use sheath_core::{Field3D, Region};
use sheath_mesh::{Mesh, StructuredMesh};
use sheath_ops::{div_par, div_par_fvv, div_par_fvv_with, Fromm, MinMod, Upwind};

/// `sum(result * dy * J)` over the interior of column `(x, z)`.
fn column_integral(mesh: &dyn Mesh, r: &Field3D, x: usize, z: usize) -> f64 {
    let c = mesh.coordinates();
    let s = mesh.shape();
    (s.ystart()..=s.yend())
        .map(|y| r[(x, y, z)] * c.dy[(x, y)] * c.j[(x, y)])
        .sum()
}

fn radial_mesh() -> StructuredMesh {
    StructuredMesh::builder(3, 8, 2)
        .periodic_y()
        .jacobian_fn(|x, _| 1.0 + 0.5 * x as f64)
        .g_22_fn(|x, _| 0.5 + 0.1 * x as f64)
        .dy(0.25)
        .build()
        .unwrap()
}

#[test]
fn z_uniform_data_is_unaffected_by_shift() {
    let plain = StructuredMesh::builder(2, 6, 4).build().unwrap();
    let shifted = StructuredMesh::builder(2, 6, 4)
        .z_shift_fn(|x, y| 0.3 * x as f64 + 0.1 * y as f64)
        .build()
        .unwrap();
    let profile = |_: usize, y: usize, _: usize| 1.0 + 0.1 * (y as f64).powi(2);
    let speed = |_: usize, y: usize, _: usize| 0.2 * y as f64 - 0.5;

    let a = div_par_fvv(
        &plain,
        &plain.field_from_fn(&profile),
        &plain.field_from_fn(&speed),
        &plain.field(1.0),
        false,
    )
    .unwrap();
    let b = div_par_fvv(
        &shifted,
        &shifted.field_from_fn(&profile),
        &shifted.field_from_fn(&speed),
        &shifted.field(1.0),
        false,
    )
    .unwrap();
    for (x, y, z) in plain.shape().iter(Region::NoBoundary) {
        assert!((a[(x, y, z)] - b[(x, y, z)]).abs() < 1e-12);
    }
}

#[test]
fn every_limiter_keeps_zero_velocity_at_rest() {
    let mesh = StructuredMesh::builder(2, 5, 2).build().unwrap();
    let f = mesh.field_from_fn(&|_, y, _| 1.0 + y as f64);
    let v = mesh.field(0.0);
    let ws = mesh.field(2.0);
    for r in [
        div_par_fvv_with(&mesh, &f, &v, &ws, false, &Upwind).unwrap(),
        div_par_fvv_with(&mesh, &f, &v, &ws, false, &Fromm).unwrap(),
        div_par_fvv_with(&mesh, &f, &v, &ws, false, &MinMod).unwrap(),
    ] {
        assert_eq!(r.max_abs(Region::NoBoundary), 0.0);
    }
}

proptest! {
    #[test]
    fn periodic_columns_conserve_momentum_flux(
        f_seed in proptest::collection::vec(0.5f64..2.0, 8),
        v_seed in proptest::collection::vec(-3.0f64..3.0, 8),
        ws in 0.1f64..2.0,
    ) {
        let mesh = radial_mesh();
        let s = mesh.shape();
        let ny = s.yend() - s.ystart() + 1;
        let wrap = move |y: usize| (y + ny - s.ystart() % ny) % ny;
        let mut f = mesh.field_from_fn(&|_, y, _| f_seed[wrap(y)]);
        let mut v = mesh.field_from_fn(&|_, y, _| v_seed[wrap(y)]);
        mesh.communicate(&mut f).unwrap();
        mesh.communicate(&mut v).unwrap();
        let r = div_par_fvv(&mesh, &f, &v, &mesh.field(ws), false).unwrap();
        for x in s.xstart()..=s.xend() {
            prop_assert!(column_integral(&mesh, &r, x, 0).abs() < 1e-10);
        }
        let r = div_par(&mesh, &f, &v, &mesh.field(ws), true).unwrap();
        for x in s.xstart()..=s.xend() {
            prop_assert!(column_integral(&mesh, &r, x, 1).abs() < 1e-10);
        }
    }
}
