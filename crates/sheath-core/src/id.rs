//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`MeshInstanceId`] allocation.
static MESH_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a mesh.
///
/// Allocated from a monotonic atomic counter via [`MeshInstanceId::next`].
/// Every [`Field3D`](crate::Field3D) carries the id of the mesh it was
/// created on; two fields are only compatible when their ids match, even
/// if the two meshes happen to have identical shapes.
///
/// Cloning a mesh preserves its instance id, which is correct because a
/// cloned mesh has identical geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshInstanceId(u64);

impl MeshInstanceId {
    /// Allocate a fresh, unique instance id.
    ///
    /// Each call returns a new id that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(MESH_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MeshInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}
