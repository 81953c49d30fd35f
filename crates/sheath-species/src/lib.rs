//! Density and momentum evolution components for Sheath plasma species.
//!
//! Each species is configured by an options section named after it.
//! Its `type` option lists the components to build, e.g.
//! `type = evolve_density, evolve_momentum`.
//!
//! # Evaluation order (each right-hand side)
//!
//! 1. [`EvolveDensity`]: transform publishes density, AA, charge
//! 2. [`EvolveMomentum`]: transform reads density, AA → publishes momentum, velocity
//! 3. every `finally`: reads the completed state → writes `ddt`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod density;
pub mod momentum;
pub mod profile;

pub use density::{
    low_density_diffusivity, low_density_perp_diffusivity, EvolveDensity, EVOLVE_DENSITY,
};
pub use momentum::{EvolveMomentum, EVOLVE_MOMENTUM};

use sheath_component::{BuildContext, Component, ComponentError, ComponentRegistry};
use sheath_core::Options;

fn build_density(
    name: &str,
    options: &mut Options,
    ctx: &mut BuildContext<'_>,
) -> Result<Box<dyn Component>, ComponentError> {
    Ok(Box::new(EvolveDensity::from_options(name, options, ctx)?))
}

fn build_momentum(
    name: &str,
    options: &mut Options,
    ctx: &mut BuildContext<'_>,
) -> Result<Box<dyn Component>, ComponentError> {
    Ok(Box::new(EvolveMomentum::from_options(name, options, ctx)?))
}

/// A registry holding every component type in this crate.
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(EVOLVE_DENSITY, build_density)
        .register(EVOLVE_MOMENTUM, build_momentum);
    registry
}
