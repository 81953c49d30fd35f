//! Component trait and phase contexts for Sheath species models.
//!
//! A [`Component`] publishes primary quantities in
//! [`transform`](Component::transform) through a [`TransformContext`],
//! then computes time derivatives in [`finally`](Component::finally)
//! through a [`FinallyContext`]. A [`Pipeline`] orders components by
//! their declared dependencies, and a [`ComponentRegistry`] builds them
//! from options by type tag. Evolved variables live in the
//! [`VariableStore`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod component;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod solver;

pub use component::{Component, Section, StateKey, StateKeys};
pub use context::{BuildContext, FinallyContext, TransformContext};
pub use error::{ComponentError, SolverError};
pub use pipeline::{Pipeline, PipelineError};
pub use registry::{ComponentRegistry, Factory};
pub use solver::{OutputMode, OutputRegistration, OutputSink, OutputTarget, VarId, VariableStore};
