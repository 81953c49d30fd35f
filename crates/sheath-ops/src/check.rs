//! Shared precondition checks for operators.

use sheath_core::field::FieldLayout;
use sheath_core::Field3D;
use sheath_mesh::Mesh;

use crate::error::OpError;

/// Fail unless every field shares the first one's layout and that layout
/// belongs to `mesh`.
///
/// Inputs that agree with each other but live on another mesh are
/// reported as [`OpError::IncompatibleFields`] against the mesh's layout.
pub(crate) fn ensure_compatible(
    operation: &'static str,
    mesh: &dyn Mesh,
    fields: &[&Field3D],
) -> Result<(), OpError> {
    let Some((first, rest)) = fields.split_first() else {
        return Ok(());
    };
    for other in rest {
        if !first.is_compatible(other) {
            return Err(OpError::IncompatibleFields {
                operation,
                expected: first.layout(),
                found: other.layout(),
            });
        }
    }
    if mesh.check_owned(first).is_err() {
        return Err(OpError::IncompatibleFields {
            operation,
            expected: FieldLayout {
                mesh: mesh.instance_id(),
                shape: mesh.shape(),
                direction: first.direction(),
            },
            found: first.layout(),
        });
    }
    Ok(())
}

/// Fail unless the mesh has at least `required` y guard cells.
pub(crate) fn ensure_y_guards(
    operation: &'static str,
    mesh: &dyn Mesh,
    required: usize,
) -> Result<(), OpError> {
    let found = mesh.shape().myg;
    if found < required {
        return Err(OpError::InsufficientGuards {
            operation,
            direction: "y",
            required,
            found,
        });
    }
    Ok(())
}

/// Fail unless the mesh has at least `required` x guard cells.
pub(crate) fn ensure_x_guards(
    operation: &'static str,
    mesh: &dyn Mesh,
    required: usize,
) -> Result<(), OpError> {
    let found = mesh.shape().mxg;
    if found < required {
        return Err(OpError::InsufficientGuards {
            operation,
            direction: "x",
            required,
            found,
        });
    }
    Ok(())
}

/// Wrap a mesh error with the operator name.
pub(crate) fn mesh_err(operation: &'static str) -> impl Fn(sheath_mesh::MeshError) -> OpError {
    move |source| OpError::Mesh { operation, source }
}
