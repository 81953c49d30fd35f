//! Error type for flux-divergence operators.

use std::error::Error;
use std::fmt;

use sheath_core::field::FieldLayout;
use sheath_mesh::MeshError;

/// Errors from operator preconditions.
///
/// Every variant is a contract violation: the operator computed nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum OpError {
    /// Two inputs differ in mesh, extent, or y direction, or the inputs
    /// were not built on the mesh the operator was given.
    IncompatibleFields {
        /// Operator that detected the mismatch.
        operation: &'static str,
        /// Layout of the first input, or of the mesh when the inputs are foreign.
        expected: FieldLayout,
        /// Layout of the offending input.
        found: FieldLayout,
    },
    /// The mesh has too few guard cells for this operator's stencil.
    InsufficientGuards {
        /// Operator that needs the guards.
        operation: &'static str,
        /// `"x"` or `"y"`.
        direction: &'static str,
        /// Guard cells required.
        required: usize,
        /// Guard cells present.
        found: usize,
    },
    /// The mesh rejected a field-aligned transform.
    Mesh {
        /// Operator that called the mesh.
        operation: &'static str,
        /// The mesh error.
        source: MeshError,
    },
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleFields {
                operation,
                expected,
                found,
            } => write!(
                f,
                "{operation}: incompatible inputs, expected {expected}, found {found}"
            ),
            Self::InsufficientGuards {
                operation,
                direction,
                required,
                found,
            } => write!(
                f,
                "{operation}: needs {required} {direction} guard cells, mesh has {found}"
            ),
            Self::Mesh { operation, source } => write!(f, "{operation}: {source}"),
        }
    }
}

impl Error for OpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh { source, .. } => Some(source),
            _ => None,
        }
    }
}
