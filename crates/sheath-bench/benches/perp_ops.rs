//! Criterion micro-benchmarks for the perpendicular operators.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use sheath_bench::perturbed_profile;
use sheath_mesh::StructuredMesh;
use sheath_ops::{d4dz4, div_n_bxgrad_f_b_xppm, div_perp_lap_fv_index};

/// Periodic 16x64x16 mesh (16K cells).
fn mesh() -> StructuredMesh {
    StructuredMesh::builder(16, 64, 16)
        .periodic_y()
        .dz(2.0 * std::f64::consts::PI / 16.0)
        .build()
        .unwrap()
}

fn bench_exb(c: &mut Criterion) {
    let mesh = mesh();
    let n = perturbed_profile(&mesh, 1.0, 0.2, 11);
    let phi = perturbed_profile(&mesh, 0.0, 1.0, 12);

    c.bench_function("div_n_bxgrad_f_b_xppm_16k", |b| {
        b.iter(|| black_box(div_n_bxgrad_f_b_xppm(&mesh, &n, &phi, true, true).unwrap()));
    });
}

fn bench_perp_diffusion(c: &mut Criterion) {
    let mesh = mesh();
    let a = perturbed_profile(&mesh, 0.5, 0.1, 13);
    let f = perturbed_profile(&mesh, 1.0, 0.2, 14);

    c.bench_function("div_perp_lap_fv_index_16k", |b| {
        b.iter(|| black_box(div_perp_lap_fv_index(&mesh, &a, &f, true).unwrap()));
    });
}

fn bench_hyperdiffusion(c: &mut Criterion) {
    let mesh = mesh();
    let f = perturbed_profile(&mesh, 1.0, 0.2, 15);

    c.bench_function("d4dz4_16k", |b| {
        b.iter(|| black_box(d4dz4(&mesh, &f).unwrap()));
    });
}

criterion_group!(benches, bench_exb, bench_perp_diffusion, bench_hyperdiffusion);
criterion_main!(benches);
