//! Core types for the Sheath plasma species framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by every other Sheath crate:
//! mesh identifiers, 2D/3D fields with guard cells, the per-evaluation
//! species state record, the hierarchical options tree, physical
//! constants, and the error types for each of these.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod field;
pub mod id;
pub mod options;
pub mod state;

pub use error::{FieldError, OptionsError, StateError};
pub use field::{Direction, Field2D, Field3D, Region, Shape};
pub use id::MeshInstanceId;
pub use options::{OptionValue, Options};
pub use state::{Record, State, Value};
