//! Error types for components and the variable store.

use std::error::Error;
use std::fmt;

use sheath_core::{FieldError, OptionsError, StateError};
use sheath_mesh::MeshError;
use sheath_ops::OpError;

/// Errors from the [`VariableStore`](crate::VariableStore).
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// A variable name was registered twice.
    DuplicateVariable {
        /// The contested name.
        name: String,
        /// Component that registered it first.
        first_owner: String,
        /// Component that tried to register it again.
        second_owner: String,
    },
    /// No variable with this name or id exists.
    UnknownVariable {
        /// Name (or `#index`) of the variable.
        name: String,
    },
    /// The store is restarting but holds no saved value for a variable.
    MissingRestart {
        /// The variable without restart data.
        name: String,
    },
    /// A value or derivative does not match the variable's layout.
    Incompatible {
        /// The variable being written.
        name: String,
        /// The layout mismatch.
        source: FieldError,
    },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateVariable {
                name,
                first_owner,
                second_owner,
            } => write!(
                f,
                "variable '{name}' registered by '{first_owner}' and again by '{second_owner}'"
            ),
            Self::UnknownVariable { name } => write!(f, "unknown variable '{name}'"),
            Self::MissingRestart { name } => {
                write!(f, "restarting, but no saved value for variable '{name}'")
            }
            Self::Incompatible { name, source } => {
                write!(f, "variable '{name}': {source}")
            }
        }
    }
}

impl Error for SolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Incompatible { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while building or evaluating a component.
///
/// All variants are contract violations. Numerical degeneracies are
/// never reported here.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentError {
    /// A state read or write failed.
    State(StateError),
    /// A flux operator rejected its inputs.
    Op(OpError),
    /// A configuration value was missing or mistyped.
    Options(OptionsError),
    /// A mesh call failed.
    Mesh(MeshError),
    /// Field arithmetic failed.
    Field(FieldError),
    /// The variable store rejected a registration or write.
    Solver(SolverError),
    /// No factory is registered for a type tag.
    UnknownType {
        /// Component (section) name.
        name: String,
        /// The unrecognised tag.
        tag: String,
        /// Tags that are registered.
        known: Vec<String>,
    },
    /// An initial value violates a precondition of the component.
    InvalidInitialValue {
        /// The variable being initialised.
        variable: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(e) => write!(f, "state: {e}"),
            Self::Op(e) => write!(f, "operator: {e}"),
            Self::Options(e) => write!(f, "options: {e}"),
            Self::Mesh(e) => write!(f, "mesh: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Solver(e) => write!(f, "solver: {e}"),
            Self::UnknownType { name, tag, known } => write!(
                f,
                "component '{name}': unknown type '{tag}' (known: {})",
                known.join(", ")
            ),
            Self::InvalidInitialValue { variable, reason } => {
                write!(f, "invalid initial value for '{variable}': {reason}")
            }
        }
    }
}

impl Error for ComponentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(e) => Some(e),
            Self::Op(e) => Some(e),
            Self::Options(e) => Some(e),
            Self::Mesh(e) => Some(e),
            Self::Field(e) => Some(e),
            Self::Solver(e) => Some(e),
            Self::UnknownType { .. } | Self::InvalidInitialValue { .. } => None,
        }
    }
}

impl From<StateError> for ComponentError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<OpError> for ComponentError {
    fn from(e: OpError) -> Self {
        Self::Op(e)
    }
}

impl From<OptionsError> for ComponentError {
    fn from(e: OptionsError) -> Self {
        Self::Options(e)
    }
}

impl From<MeshError> for ComponentError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}

impl From<FieldError> for ComponentError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<SolverError> for ComponentError {
    fn from(e: SolverError) -> Self {
        Self::Solver(e)
    }
}
