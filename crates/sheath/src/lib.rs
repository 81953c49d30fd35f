//! Sheath: finite-volume evolution of plasma species densities and
//! parallel momenta.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Sheath sub-crates. For most users, adding `sheath` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use sheath::prelude::*;
//!
//! // A 2x8x4 mesh, periodic along the field line.
//! let mesh = StructuredMesh::builder(2, 8, 4).periodic_y().build().unwrap();
//!
//! let mut options = Options::new();
//! options
//!     .section_mut("units")
//!     .set("inv_meters_cubed", 1e19)
//!     .set("seconds", 1e-6);
//! options.section_mut("sheath").set("components", "d+");
//! options
//!     .section_mut("d+")
//!     .set("type", "evolve_density")
//!     .set("AA", 2.0)
//!     .set("charge", 1.0);
//! // 1e25 m^-3 s^-1 is one normalised unit.
//! options
//!     .section_mut("Nd+")
//!     .set("function", 1.0)
//!     .set("source", 1e25);
//!
//! let mut sim = Simulation::builder().mesh(mesh).options(options).build().unwrap();
//! sim.rhs().unwrap();
//!
//! let id = sim.variables().id("Nd+").unwrap();
//! let dndt = sim.variables().ddt(id).unwrap();
//! assert!((dndt.max_abs(Region::NoBoundary) - 1.0).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sheath-core` | Fields, regions, the per-evaluation state, options |
//! | [`mesh`] | `sheath-mesh` | The `Mesh` trait, metrics, field-aligned transforms |
//! | [`ops`] | `sheath-ops` | Finite-volume flux operators and limiters |
//! | [`component`] | `sheath-component` | Component trait, pipeline, registry, variable store |
//! | [`species`] | `sheath-species` | Density and momentum evolution components |
//! | [`engine`] | `sheath-engine` | Right-hand-side driver and its configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Fields, regions, state records, and options (`sheath-core`).
///
/// [`types::Field3D`] is the value type every operator works on;
/// [`types::State`] carries the quantities components publish during one
/// evaluation.
pub use sheath_core as types;

/// Meshes and coordinates (`sheath-mesh`).
///
/// Provides the [`mesh::Mesh`] trait and the single-rank
/// [`mesh::StructuredMesh`].
pub use sheath_mesh as mesh;

/// Flux-divergence operators (`sheath-ops`).
///
/// Includes [`ops::div_par_fvv`], [`ops::div_par`], and the
/// [`ops::CellEdges`] limiters they reconstruct face values with.
pub use sheath_ops as ops;

/// Component contract and orchestration (`sheath-component`).
///
/// The [`component::Component`] trait is the main extension point for
/// user-defined physics.
pub use sheath_component as component;

/// Species evolution components (`sheath-species`).
///
/// [`species::EvolveDensity`] and [`species::EvolveMomentum`], plus
/// [`species::registry`] mapping their type tags to factories.
pub use sheath_species as species;

/// Right-hand-side driver (`sheath-engine`).
///
/// [`engine::Simulation`] builds components from options and runs
/// evaluations.
pub use sheath_engine as engine;

/// Common imports for typical Sheath usage.
///
/// ```rust
/// use sheath::prelude::*;
/// ```
///
/// This imports the most frequently used types: fields, options, the mesh
/// trait and its structured implementation, the component trait and its
/// contexts, and the simulation driver.
pub mod prelude {
    // Core types
    pub use sheath_core::{Field3D, Options, Region, State};
    pub use sheath_core::state::keys;

    // Errors
    pub use sheath_core::{FieldError, OptionsError, StateError};
    pub use sheath_component::{ComponentError, PipelineError};

    // Mesh
    pub use sheath_mesh::{Mesh, StructuredMesh};

    // Component
    pub use sheath_component::{
        BuildContext, Component, ComponentRegistry, FinallyContext, StateKey, StateKeys,
        TransformContext, VarId,
    };

    // Species
    pub use sheath_species::{EvolveDensity, EvolveMomentum};

    // Engine
    pub use sheath_engine::{ConfigError, RhsError, RhsMetrics, Simulation, SimulationConfig};
}
