//! The integrator-facing store of evolved variables.
//!
//! [`VariableStore`] holds one entry per evolved field: its current
//! value, supplied by the time integrator before each right-hand-side
//! evaluation, and its derivative slot, written by the owning component
//! during `finally`. Components register their variables once, at
//! construction, through [`VariableStore::add`].
//!
//! The store also collects output registrations. It does not write
//! anything itself: an [`OutputSink`] receives the registrations and
//! decides what to do with them.

use indexmap::IndexMap;

use sheath_core::Field3D;

use crate::error::SolverError;

/// Handle to a registered variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    /// Position in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// How often a registered output is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Every output step.
    Repeat,
    /// Once per run, e.g. for restart files.
    Once,
}

/// Which file family an output belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// Regular diagnostic output.
    Dump,
    /// Restart checkpoints.
    Restart,
}

/// A request to write a named quantity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputRegistration {
    /// Output name, e.g. `Nd+` or `ddt(Nd+)`.
    pub name: String,
    /// Write frequency.
    pub mode: OutputMode,
    /// Destination.
    pub target: OutputTarget,
    /// Component that asked for it.
    pub owner: String,
}

/// Receiver for output registrations.
///
/// Implementations may write files, collect names for inspection, or
/// ignore everything.
pub trait OutputSink {
    /// Accept one registration.
    fn register(&mut self, registration: &OutputRegistration);
}

#[derive(Clone, Debug)]
struct Variable {
    value: Field3D,
    ddt: Field3D,
    owner: String,
}

/// Evolved variables, their derivative slots, and output registrations.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    vars: IndexMap<String, Variable>,
    restarting: bool,
    restart_data: IndexMap<String, Field3D>,
    outputs: Vec<OutputRegistration>,
}

impl VariableStore {
    /// An empty store for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store for a restarted run.
    ///
    /// Every variable registered afterwards takes its value from
    /// `saved`; a variable without saved data is an error.
    pub fn restarting(saved: impl IntoIterator<Item = (String, Field3D)>) -> Self {
        Self {
            restarting: true,
            restart_data: saved.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Whether this run continues from saved data.
    pub fn is_restarting(&self) -> bool {
        self.restarting
    }

    /// Register an evolved variable owned by `owner`.
    ///
    /// When restarting, `initial` only supplies the layout: the stored
    /// value comes from the saved data, which must match it.
    pub fn add(&mut self, name: &str, initial: Field3D, owner: &str) -> Result<VarId, SolverError> {
        if let Some(existing) = self.vars.get(name) {
            return Err(SolverError::DuplicateVariable {
                name: name.to_string(),
                first_owner: existing.owner.clone(),
                second_owner: owner.to_string(),
            });
        }
        let value = if self.restarting {
            let saved = self
                .restart_data
                .get(name)
                .ok_or_else(|| SolverError::MissingRestart {
                    name: name.to_string(),
                })?;
            initial
                .check_compatible(saved, "restart")
                .map_err(|source| SolverError::Incompatible {
                    name: name.to_string(),
                    source,
                })?;
            log::debug!("restoring '{name}' from saved data");
            saved.clone()
        } else {
            initial
        };
        let ddt = value.zeros_like();
        let (index, _) = self.vars.insert_full(
            name.to_string(),
            Variable {
                value,
                ddt,
                owner: owner.to_string(),
            },
        );
        Ok(VarId(index))
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable is registered.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Look up a variable by name.
    pub fn id(&self, name: &str) -> Option<VarId> {
        self.vars.get_index_of(name).map(VarId)
    }

    /// Name of a variable.
    pub fn name(&self, id: VarId) -> Option<&str> {
        self.vars.get_index(id.0).map(|(k, _)| k.as_str())
    }

    /// Component that registered a variable.
    pub fn owner(&self, id: VarId) -> Option<&str> {
        self.vars.get_index(id.0).map(|(_, v)| v.owner.as_str())
    }

    /// All variable ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.vars.len()).map(VarId)
    }

    fn var(&self, id: VarId) -> Result<&Variable, SolverError> {
        self.vars
            .get_index(id.0)
            .map(|(_, v)| v)
            .ok_or_else(|| unknown(id))
    }

    fn var_mut(&mut self, id: VarId) -> Result<(&str, &mut Variable), SolverError> {
        self.vars
            .get_index_mut(id.0)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| unknown(id))
    }

    /// Current value of a variable.
    pub fn value(&self, id: VarId) -> Result<&Field3D, SolverError> {
        self.var(id).map(|v| &v.value)
    }

    /// Replace the current value, as the integrator does between
    /// evaluations.
    pub fn set_value(&mut self, id: VarId, value: Field3D) -> Result<(), SolverError> {
        let (name, var) = self.var_mut(id)?;
        var.value
            .check_compatible(&value, "set_value")
            .map_err(|source| SolverError::Incompatible {
                name: name.to_string(),
                source,
            })?;
        var.value = value;
        Ok(())
    }

    /// Time derivative written by the last evaluation.
    pub fn ddt(&self, id: VarId) -> Result<&Field3D, SolverError> {
        self.var(id).map(|v| &v.ddt)
    }

    /// Write a time derivative.
    pub fn set_ddt(&mut self, id: VarId, ddt: Field3D) -> Result<(), SolverError> {
        let (name, var) = self.var_mut(id)?;
        var.value
            .check_compatible(&ddt, "set_ddt")
            .map_err(|source| SolverError::Incompatible {
                name: name.to_string(),
                source,
            })?;
        var.ddt = ddt;
        Ok(())
    }

    /// Zero every derivative slot.
    pub fn clear_derivatives(&mut self) {
        for var in self.vars.values_mut() {
            var.ddt.fill(0.0);
        }
    }

    /// Request that `name` be written with the given mode and target.
    pub fn register_output(
        &mut self,
        name: &str,
        mode: OutputMode,
        target: OutputTarget,
        owner: &str,
    ) {
        log::debug!("'{owner}' registers output '{name}' ({mode:?}, {target:?})");
        self.outputs.push(OutputRegistration {
            name: name.to_string(),
            mode,
            target,
            owner: owner.to_string(),
        });
    }

    /// Output registrations in the order they were made.
    pub fn outputs(&self) -> &[OutputRegistration] {
        &self.outputs
    }

    /// Hand every registration to `sink`.
    pub fn forward_outputs(&self, sink: &mut dyn OutputSink) {
        for registration in &self.outputs {
            sink.register(registration);
        }
    }
}

fn unknown(id: VarId) -> SolverError {
    SolverError::UnknownVariable {
        name: format!("#{}", id.0),
    }
}
