//! The core `Mesh` trait and `dyn Mesh` downcast support.

use std::any::Any;

use sheath_core::{Field3D, MeshInstanceId, Region, Shape};

use crate::coordinates::Coordinates;
use crate::edge::YBoundary;
use crate::error::MeshError;

/// Geometry provider for species components and flux operators.
///
/// A mesh describes one local partition: its extent, metric
/// coefficients, boundary predicates, and the transforms between
/// standard and field-aligned y coordinates.
///
/// # Object Safety
///
/// This trait is designed for use as `dyn Mesh`. Use
/// `downcast_ref` for opt-in specialization on concrete types.
pub trait Mesh: Any + Send + Sync + 'static {
    /// Unique instance identifier, stamped onto every field built here.
    fn instance_id(&self) -> MeshInstanceId;

    /// Local extent including guard cells.
    fn shape(&self) -> Shape;

    /// Metric coefficients.
    fn coordinates(&self) -> &Coordinates;

    /// Whether this partition holds the inner x boundary.
    fn first_x(&self) -> bool;

    /// Whether this partition holds the outer x boundary.
    fn last_x(&self) -> bool;

    /// Whether this partition holds the lower y end of column `x`.
    fn first_y(&self, x: usize) -> bool;

    /// Whether this partition holds the upper y end of column `x`.
    fn last_y(&self, x: usize) -> bool;

    /// y topology of column `x`.
    fn y_boundary(&self, x: usize) -> YBoundary;

    /// Whether column `x` is periodic in y.
    fn periodic_y(&self, x: usize) -> bool {
        self.y_boundary(x).is_periodic()
    }

    /// Transform a standard-direction field to field-aligned coordinates.
    ///
    /// Only cells in `region` are transformed; the rest are copied.
    fn to_field_aligned(&self, f: &Field3D, region: Region) -> Result<Field3D, MeshError>;

    /// Transform a field-aligned field back to standard coordinates.
    ///
    /// Only cells in `region` are transformed; the rest are copied.
    fn from_field_aligned(&self, f: &Field3D, region: Region) -> Result<Field3D, MeshError>;

    /// Fill guard cells that are owned by a neighbouring partition or
    /// by the periodic opposite end.
    fn communicate(&self, f: &mut Field3D) -> Result<(), MeshError>;

    /// A standard-direction field on this mesh, filled with `value`.
    fn field(&self, value: f64) -> Field3D {
        Field3D::filled(self.instance_id(), self.shape(), value)
    }

    /// A standard-direction field on this mesh evaluated from `f(x, y, z)`.
    fn field_from_fn(&self, f: &dyn Fn(usize, usize, usize) -> f64) -> Field3D {
        Field3D::from_fn(self.instance_id(), self.shape(), f)
    }

    /// Fail unless `f` was built on this mesh with this extent.
    fn check_owned(&self, f: &Field3D) -> Result<(), MeshError> {
        if f.mesh_id() != self.instance_id() {
            return Err(MeshError::ForeignField {
                mesh: self.instance_id(),
                field: f.mesh_id(),
            });
        }
        if f.shape() != self.shape() {
            return Err(MeshError::ShapeMismatch {
                expected: self.shape(),
                found: f.shape(),
            });
        }
        Ok(())
    }
}

impl dyn Mesh {
    /// Attempt to downcast a trait object to a concrete mesh type.
    pub fn downcast_ref<T: Mesh>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}
