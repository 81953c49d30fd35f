//! Mesh trait compliance test helpers.
//!
//! These functions verify that a Mesh implementation satisfies the
//! invariants required by the trait contract.

use sheath_core::{Direction, Region};

use crate::mesh::Mesh;

/// Assert that aligning then un-aligning the whole field restores it.
pub fn assert_aligned_round_trip(mesh: &dyn Mesh) {
    let f = mesh.field_from_fn(&|x, y, z| {
        ((x * 7 + y * 3) as f64 * 0.1).sin() + (z as f64 * 0.9).cos()
    });
    let aligned = mesh.to_field_aligned(&f, Region::All).unwrap();
    assert_eq!(aligned.direction(), Direction::Aligned);
    let back = mesh.from_field_aligned(&aligned, Region::All).unwrap();
    assert_eq!(back.direction(), Direction::Standard);
    for (i, (a, b)) in back.as_slice().iter().zip(f.as_slice()).enumerate() {
        assert!((a - b).abs() < 1e-10, "round trip differs at flat index {i}: {a} vs {b}");
    }
}

/// Assert that cells outside the requested region are copied unchanged.
pub fn assert_transform_respects_region(mesh: &dyn Mesh) {
    let s = mesh.shape();
    let f = mesh.field_from_fn(&|x, y, z| (x * 31 + y * 17 + z) as f64);
    let aligned = mesh.to_field_aligned(&f, Region::NoBoundary).unwrap();
    for x in 0..s.nx {
        for y in 0..s.ny {
            let inside = (s.xstart()..=s.xend()).contains(&x) && (s.ystart()..=s.yend()).contains(&y);
            if inside {
                continue;
            }
            for z in 0..s.nz {
                assert_eq!(aligned[(x, y, z)], f[(x, y, z)], "guard ({x}, {y}, {z}) modified");
            }
        }
    }
}

/// Assert that the boundary predicates agree with the y topology.
pub fn assert_boundary_predicates_consistent(mesh: &dyn Mesh) {
    let s = mesh.shape();
    for x in 0..s.nx {
        let periodic = mesh.periodic_y(x);
        assert_eq!(periodic, mesh.y_boundary(x).is_periodic());
    }
}

/// Assert that communicate leaves interior cells unchanged.
pub fn assert_communicate_preserves_interior(mesh: &dyn Mesh) {
    let mut f = mesh.field_from_fn(&|x, y, z| (x + 2 * y + 3 * z) as f64);
    let before = f.clone();
    mesh.communicate(&mut f).unwrap();
    let s = mesh.shape();
    for (x, y, z) in s.iter(Region::NoBoundary) {
        assert_eq!(f[(x, y, z)], before[(x, y, z)]);
    }
}

/// Run the full compliance suite.
pub fn run_full_compliance(mesh: &dyn Mesh) {
    assert_aligned_round_trip(mesh);
    assert_transform_respects_region(mesh);
    assert_boundary_predicates_consistent(mesh);
    assert_communicate_preserves_interior(mesh);
}
