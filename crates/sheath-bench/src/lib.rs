//! Benchmark profiles and utilities for the Sheath plasma species framework.
//!
//! Provides pre-built [`Simulation`] profiles for benchmarking and examples:
//!
//! - [`reference_profile`]: 8x32x16 periodic mesh (4K cells), deuterium
//!   density and momentum plus electron density
//! - [`stress_profile`]: 32x64x32 periodic mesh (~65K cells), same species
//! - [`perturbed_profile`]: deterministic cell-by-cell perturbation via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::f64::consts::PI;

use sheath_component::{
    Component, ComponentError, FinallyContext, StateKey, StateKeys, TransformContext,
};
use sheath_core::state::keys;
use sheath_core::{Field3D, Options};
use sheath_engine::Simulation;
use sheath_mesh::{Mesh, StructuredMesh};

/// Publishes a uniform temperature for a list of species.
///
/// Stands in for an energy equation so the density and momentum
/// components have a sound speed to work with.
pub struct IsothermalClosure {
    species: Vec<String>,
    temperature: f64,
}

impl IsothermalClosure {
    /// Temperature `temperature` (normalised) for every named species.
    pub fn new<I, S>(species: I, temperature: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            species: species.into_iter().map(Into::into).collect(),
            temperature,
        }
    }
}

impl Component for IsothermalClosure {
    fn name(&self) -> &str {
        "closure"
    }

    fn kind(&self) -> &'static str {
        "isothermal"
    }

    fn publishes(&self) -> StateKeys {
        self.species
            .iter()
            .map(|s| StateKey::species(s, keys::TEMPERATURE))
            .collect()
    }

    fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
        let label = self.label();
        for species in &self.species {
            let t = ctx.mesh().field(self.temperature);
            ctx.state_mut()
                .species_mut(species)
                .set(keys::TEMPERATURE, t, &label)?;
        }
        Ok(())
    }

    fn finally(&mut self, _ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// Build a reference benchmark profile: 8x32x16 cells.
///
/// Species: `d+` (density and momentum, AA=2) and `e` (density with
/// z hyperdiffusion and a uniform source). Finiteness checking is off so
/// the timing covers the components only.
pub fn reference_profile(seed: u64) -> Simulation {
    profile(8, 32, 16, seed)
}

/// Build a stress benchmark profile: 32x64x32 cells.
///
/// Same species as [`reference_profile`] at 16x the cell count.
pub fn stress_profile(seed: u64) -> Simulation {
    profile(32, 64, 32, seed)
}

fn profile(nx: usize, ny: usize, nz: usize, seed: u64) -> Simulation {
    let mesh = StructuredMesh::builder(nx, ny, nz)
        .periodic_y()
        .dy(2.0 * PI / ny as f64)
        .dz(2.0 * PI / nz as f64)
        .build()
        .expect("benchmark mesh is valid");

    let mut options = Options::new();
    options
        .section_mut("units")
        .set("inv_meters_cubed", 1e19)
        .set("seconds", 1e-6);
    options
        .section_mut("sheath")
        .set("components", "d+, e")
        .set("check_finite", false);
    options
        .section_mut("d+")
        .set("type", "evolve_density, evolve_momentum")
        .set("AA", 2.0)
        .set("charge", 1.0);
    options
        .section_mut("Nd+")
        .set("function", perturbed_profile(&mesh, 1.0, 0.1, seed));
    options
        .section_mut("NVd+")
        .set("function", perturbed_profile(&mesh, 0.0, 0.5, seed.wrapping_add(1)));
    options
        .section_mut("e")
        .set("type", "evolve_density")
        .set("hyper_z", 0.01);
    options
        .section_mut("Ne")
        .set("function", perturbed_profile(&mesh, 1.0, 0.1, seed.wrapping_add(2)))
        .set("source", 1e24);

    Simulation::builder()
        .mesh(mesh)
        .options(options)
        .component(IsothermalClosure::new(["d+", "e"], 1.0))
        .build()
        .expect("benchmark profile is valid")
}

/// Deterministic field `base + amplitude * r` with `r` in `[-1, 1)`.
///
/// `r` comes from a simple hash of the seed and the cell's flat index,
/// so the same seed always gives the same field.
pub fn perturbed_profile(mesh: &dyn Mesh, base: f64, amplitude: f64, seed: u64) -> Field3D {
    let shape = mesh.shape();
    mesh.field_from_fn(&|x, y, z| {
        let i = shape.index(x, y, z) as u64;
        let h = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(i.wrapping_mul(1442695040888963407));
        let r = (h >> 11) as f64 / (1u64 << 53) as f64;
        base + amplitude * (2.0 * r - 1.0)
    })
}
