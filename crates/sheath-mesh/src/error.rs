//! Error types for mesh construction and coordinate transforms.

use std::fmt;

use sheath_core::{Direction, MeshInstanceId, Shape};

/// Errors arising from mesh construction or field transforms.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Attempted to construct a mesh with zero cells in some direction.
    EmptyMesh,
    /// Too few guard cells for the widest stencil.
    InsufficientGuards {
        /// `"x"` or `"y"`.
        direction: &'static str,
        /// Guard cells requested.
        found: usize,
        /// Minimum accepted.
        required: usize,
    },
    /// A metric coefficient is non-positive or non-finite.
    InvalidMetric {
        /// Coefficient name, e.g. `"J"` or `"g_22"`.
        name: &'static str,
        /// x index of the offending cell.
        x: usize,
        /// y index of the offending cell.
        y: usize,
        /// The rejected value.
        value: f64,
    },
    /// A field was built on a different mesh instance.
    ForeignField {
        /// This mesh.
        mesh: MeshInstanceId,
        /// The field's mesh.
        field: MeshInstanceId,
    },
    /// A field's extent does not match this mesh.
    ShapeMismatch {
        /// This mesh's extent.
        expected: Shape,
        /// The field's extent.
        found: Shape,
    },
    /// A transform was applied to a field in the wrong y direction.
    WrongDirection {
        /// Direction the transform accepts.
        expected: Direction,
        /// Direction of the field passed in.
        found: Direction,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMesh => write!(f, "mesh must have at least one cell in each direction"),
            Self::InsufficientGuards {
                direction,
                found,
                required,
            } => write!(
                f,
                "{direction} guard cells: found {found}, need at least {required}"
            ),
            Self::InvalidMetric { name, x, y, value } => {
                write!(f, "metric {name} at ({x}, {y}) is {value}, must be positive and finite")
            }
            Self::ForeignField { mesh, field } => {
                write!(f, "field belongs to {field}, not {mesh}")
            }
            Self::ShapeMismatch { expected, found } => write!(
                f,
                "field extent {}x{}x{} does not match mesh extent {}x{}x{}",
                found.nx, found.ny, found.nz, expected.nx, expected.ny, expected.nz
            ),
            Self::WrongDirection { expected, found } => {
                write!(f, "expected a {expected:?} field, found {found:?}")
            }
        }
    }
}

impl std::error::Error for MeshError {}
