//! Error types for fields, the species state record, and options.
//!
//! Every variant here is a contract violation: a programmer or
//! configuration error that aborts the current evaluation. Numerical
//! degeneracies (density below the floor, supersonic flow) are never
//! reported as errors; they are resolved by the operators themselves.

use std::error::Error;
use std::fmt;

use crate::field::FieldLayout;

/// Errors from field arithmetic and layout checks.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// Two fields passed to the same operation live on different meshes,
    /// have different shapes, or are in different coordinate directions.
    Incompatible {
        /// Name of the operation that detected the mismatch.
        operation: String,
        /// Layout of the first operand.
        expected: FieldLayout,
        /// Layout of the offending operand.
        found: FieldLayout,
    },
    /// An index lies outside the field's local extent.
    IndexOutOfBounds {
        /// The offending `(x, y, z)` index.
        index: (usize, usize, usize),
        /// The local extent `(nx, ny, nz)`.
        extent: (usize, usize, usize),
    },
    /// A buffer supplied to a field constructor has the wrong length.
    LengthMismatch {
        /// Number of values the shape requires.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incompatible {
                operation,
                expected,
                found,
            } => write!(
                f,
                "incompatible fields in '{operation}': expected {expected}, found {found}"
            ),
            Self::IndexOutOfBounds { index, extent } => {
                write!(f, "index {index:?} out of bounds for extent {extent:?}")
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
        }
    }
}

impl Error for FieldError {}

/// Errors from reading or writing the per-evaluation [`State`](crate::State).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateError {
    /// A required value was not published by any component.
    MissingField {
        /// Section path, e.g. `species:d+` or `fields`.
        section: String,
        /// Key within the section.
        key: String,
    },
    /// A value was published twice in one transform phase.
    ///
    /// The first value is retained.
    AlreadySet {
        /// Section path.
        section: String,
        /// Key within the section.
        key: String,
        /// Component that published the retained value.
        first_writer: String,
        /// Component whose write was rejected.
        second_writer: String,
    },
    /// A value exists but has a different type than requested.
    WrongType {
        /// Section path.
        section: String,
        /// Key within the section.
        key: String,
        /// The requested type.
        expected: &'static str,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { section, key } => {
                write!(f, "required state value '{section}:{key}' is not set")
            }
            Self::AlreadySet {
                section,
                key,
                first_writer,
                second_writer,
            } => write!(
                f,
                "state value '{section}:{key}' already set by '{first_writer}', \
                 rejected write from '{second_writer}'"
            ),
            Self::WrongType {
                section,
                key,
                expected,
            } => write!(f, "state value '{section}:{key}' is not a {expected}"),
        }
    }
}

impl Error for StateError {}

/// Errors from typed option lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionsError {
    /// A required option has no value and no default.
    Missing {
        /// Full option path, e.g. `units:seconds`.
        path: String,
    },
    /// An option holds a value of a different type.
    TypeMismatch {
        /// Full option path.
        path: String,
        /// The requested type.
        expected: &'static str,
        /// The stored type.
        found: &'static str,
    },
    /// An option value is out of its valid range.
    Invalid {
        /// Full option path.
        path: String,
        /// What is wrong with the value.
        reason: String,
    },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "option '{path}' is required but not set"),
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "option '{path}': expected {expected}, found {found}"),
            Self::Invalid { path, reason } => write!(f, "option '{path}': {reason}"),
        }
    }
}

impl Error for OptionsError {}
