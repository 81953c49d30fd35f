//! Right-hand-side evaluation driver for Sheath species pipelines.
//!
//! Provides [`Simulation`], which builds components from an options tree
//! through a [`ComponentRegistry`](sheath_component::ComponentRegistry),
//! orders them into a [`Pipeline`](sheath_component::Pipeline), and runs
//! the two-phase evaluation that fills every evolved variable's time
//! derivative. Time integration itself belongs to the caller.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use metrics::RhsMetrics;
pub use simulation::{Phase, RhsError, Simulation, SimulationBuilder};
