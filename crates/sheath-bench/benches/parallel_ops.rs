//! Criterion micro-benchmarks for the parallel flux operators.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sheath_bench::perturbed_profile;
use sheath_mesh::{Mesh, StructuredMesh};
use sheath_ops::{
    div_par, div_par_fvv, div_par_fvv_with, div_par_k_grad_par, grad_par, Fromm, MinMod, Upwind,
};

/// Periodic 16x64x16 mesh (16K cells).
fn mesh() -> StructuredMesh {
    StructuredMesh::builder(16, 64, 16)
        .periodic_y()
        .build()
        .unwrap()
}

fn bench_div_par_fvv(c: &mut Criterion) {
    let mesh = mesh();
    let n = perturbed_profile(&mesh, 1.0, 0.2, 1);
    let v = perturbed_profile(&mesh, 0.0, 1.5, 2);
    let cs = mesh.field(1.0);

    c.bench_function("div_par_fvv_mc_16k", |b| {
        b.iter(|| black_box(div_par_fvv(&mesh, &n, &v, &cs, false).unwrap()));
    });

    let mut group = c.benchmark_group("div_par_fvv_limiter");
    group.bench_function(BenchmarkId::from_parameter("upwind"), |b| {
        b.iter(|| black_box(div_par_fvv_with(&mesh, &n, &v, &cs, false, &Upwind).unwrap()));
    });
    group.bench_function(BenchmarkId::from_parameter("fromm"), |b| {
        b.iter(|| black_box(div_par_fvv_with(&mesh, &n, &v, &cs, false, &Fromm).unwrap()));
    });
    group.bench_function(BenchmarkId::from_parameter("minmod"), |b| {
        b.iter(|| black_box(div_par_fvv_with(&mesh, &n, &v, &cs, false, &MinMod).unwrap()));
    });
    group.finish();
}

fn bench_div_par(c: &mut Criterion) {
    let mesh = mesh();
    let n = perturbed_profile(&mesh, 1.0, 0.2, 3);
    let v = perturbed_profile(&mesh, 0.0, 1.5, 4);
    let cs = mesh.field(1.0);

    c.bench_function("div_par_mc_16k", |b| {
        b.iter(|| black_box(div_par(&mesh, &n, &v, &cs, true).unwrap()));
    });
}

fn bench_diffusion_and_gradient(c: &mut Criterion) {
    let mesh = mesh();
    let k = perturbed_profile(&mesh, 0.5, 0.1, 5);
    let f = perturbed_profile(&mesh, 1.0, 0.2, 6);

    c.bench_function("div_par_k_grad_par_16k", |b| {
        b.iter(|| black_box(div_par_k_grad_par(&mesh, &k, &f, true).unwrap()));
    });
    c.bench_function("grad_par_16k", |b| {
        b.iter(|| black_box(grad_par(&mesh, &f).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_div_par_fvv,
    bench_div_par,
    bench_diffusion_and_gradient
);
criterion_main!(benches);
