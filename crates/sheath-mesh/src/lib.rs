//! Mesh geometry for Sheath plasma species models.
//!
//! This crate defines the [`Mesh`] trait, the geometry provider through
//! which every flux operator reads metric coefficients, boundary
//! predicates, and field-aligned coordinate transforms, along with the
//! single-partition [`StructuredMesh`] backend.
//!
//! # Field alignment
//!
//! Parallel operators work on field-aligned data, where consecutive y
//! indices follow a magnetic field line. [`StructuredMesh`] implements
//! the shifted-metric approach: each `(x, y)` column is shifted in z by
//! a Fourier phase, see [`ZShifter`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coordinates;
pub mod edge;
pub mod error;
pub mod mesh;
pub mod shift;
pub mod structured;

#[cfg(test)]
pub(crate) mod compliance;

pub use coordinates::Coordinates;
pub use edge::YBoundary;
pub use error::MeshError;
pub use mesh::Mesh;
pub use shift::ZShifter;
pub use structured::{StructuredMesh, StructuredMeshBuilder, MIN_Y_GUARDS};
