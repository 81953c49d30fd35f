//! Parallel (y) boundary topology of a mesh column.

/// How the y direction closes at the ends of an x column.
///
/// Closed flux surfaces in the core are periodic in y. Open field lines
/// in the scrape-off layer end on material surfaces, where boundary
/// fluxes are imposed by the operators instead of guard-cell exchange.
///
/// # Examples
///
/// ```
/// use sheath_mesh::{Mesh, StructuredMesh, YBoundary};
///
/// let mesh = StructuredMesh::builder(4, 8, 4).ixseps(3).build().unwrap();
/// assert_eq!(mesh.y_boundary(2), YBoundary::Periodic);
/// assert_eq!(mesh.y_boundary(3), YBoundary::Open);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum YBoundary {
    /// y wraps around: guard cells are filled from the opposite end.
    Periodic,
    /// y ends on a target: guard cells hold boundary conditions.
    Open,
}

impl YBoundary {
    /// Whether guard cells are exchanged with the opposite end.
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic)
    }
}
