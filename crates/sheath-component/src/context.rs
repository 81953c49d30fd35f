//! Phase-tagged contexts passed to components.
//!
//! The two phases of a right-hand-side evaluation get different
//! capabilities, enforced by the borrow checker rather than by runtime
//! flags:
//!
//! - [`TransformContext`] grants write access to the [`State`] and
//!   read access to current variable values. Components publish their
//!   primary quantities here.
//! - [`FinallyContext`] grants read-only access to the completed
//!   [`State`] and write access to derivative slots.
//!
//! [`BuildContext`] is the construction-time counterpart: mesh access
//! plus variable and output registration.

use sheath_core::{Field3D, State};
use sheath_mesh::Mesh;

use crate::error::SolverError;
use crate::solver::{OutputMode, OutputTarget, VarId, VariableStore};

/// Access granted while components are being constructed.
pub struct BuildContext<'a> {
    mesh: &'a dyn Mesh,
    solver: &'a mut VariableStore,
}

impl<'a> BuildContext<'a> {
    /// Construct a build context.
    pub fn new(mesh: &'a dyn Mesh, solver: &'a mut VariableStore) -> Self {
        Self { mesh, solver }
    }

    /// The mesh all fields live on.
    pub fn mesh(&self) -> &dyn Mesh {
        self.mesh
    }

    /// Whether this run continues from saved data.
    pub fn is_restarting(&self) -> bool {
        self.solver.is_restarting()
    }

    /// Register an evolved variable. See [`VariableStore::add`].
    pub fn add_variable(
        &mut self,
        name: &str,
        initial: Field3D,
        owner: &str,
    ) -> Result<VarId, SolverError> {
        self.solver.add(name, initial, owner)
    }

    /// Register an output. See [`VariableStore::register_output`].
    pub fn register_output(
        &mut self,
        name: &str,
        mode: OutputMode,
        target: OutputTarget,
        owner: &str,
    ) {
        self.solver.register_output(name, mode, target, owner);
    }

    /// The underlying store.
    pub fn solver(&self) -> &VariableStore {
        self.solver
    }
}

/// Access granted during the `transform` phase.
pub struct TransformContext<'a> {
    state: &'a mut State,
    mesh: &'a dyn Mesh,
    solver: &'a VariableStore,
}

impl<'a> TransformContext<'a> {
    /// Construct a transform context.
    ///
    /// Typically called by the engine, not by components directly.
    pub fn new(state: &'a mut State, mesh: &'a dyn Mesh, solver: &'a VariableStore) -> Self {
        Self {
            state,
            mesh,
            solver,
        }
    }

    /// The state as published so far.
    pub fn state(&self) -> &State {
        self.state
    }

    /// Mutable state, for publishing.
    pub fn state_mut(&mut self) -> &mut State {
        self.state
    }

    /// The mesh.
    pub fn mesh(&self) -> &dyn Mesh {
        self.mesh
    }

    /// Current value of an evolved variable.
    pub fn value(&self, id: VarId) -> Result<&Field3D, SolverError> {
        self.solver.value(id)
    }
}

/// Access granted during the `finally` phase.
pub struct FinallyContext<'a> {
    state: &'a State,
    mesh: &'a dyn Mesh,
    solver: &'a mut VariableStore,
}

impl<'a> FinallyContext<'a> {
    /// Construct a finally context.
    pub fn new(state: &'a State, mesh: &'a dyn Mesh, solver: &'a mut VariableStore) -> Self {
        Self {
            state,
            mesh,
            solver,
        }
    }

    /// The completed state. Read-only.
    pub fn state(&self) -> &State {
        self.state
    }

    /// The mesh.
    pub fn mesh(&self) -> &dyn Mesh {
        self.mesh
    }

    /// Current value of an evolved variable.
    pub fn value(&self, id: VarId) -> Result<&Field3D, SolverError> {
        self.solver.value(id)
    }

    /// Write the time derivative of a variable.
    pub fn set_ddt(&mut self, id: VarId, ddt: Field3D) -> Result<(), SolverError> {
        self.solver.set_ddt(id, ddt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheath_core::state::keys;
    use sheath_mesh::StructuredMesh;

    #[test]
    fn transform_publishes_and_finally_writes_ddt() {
        let mesh = StructuredMesh::builder(2, 4, 4).build().unwrap();
        let mut store = VariableStore::new();
        let id = {
            let mut build = BuildContext::new(&mesh, &mut store);
            assert!(!build.is_restarting());
            let initial = build.mesh().field(3.0);
            build.add_variable("Ne", initial, "e").unwrap()
        };

        let mut state = State::new();
        {
            let mut ctx = TransformContext::new(&mut state, &mesh, &store);
            let n = ctx.value(id).unwrap().clone();
            ctx.state_mut()
                .species_mut("e")
                .set(keys::DENSITY, n, "e")
                .unwrap();
        }
        {
            let mut ctx = FinallyContext::new(&state, &mesh, &mut store);
            let n = ctx
                .state()
                .require_species("e")
                .unwrap()
                .get_field(keys::DENSITY)
                .unwrap()
                .clone();
            ctx.set_ddt(id, -n).unwrap();
        }
        assert!(store.ddt(id).unwrap().as_slice().iter().all(|&v| v == -3.0));
    }
}
