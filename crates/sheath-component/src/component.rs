//! The [`Component`] trait and its dependency declarations.

use std::fmt;

use smallvec::SmallVec;

use crate::context::{FinallyContext, TransformContext};
use crate::error::ComponentError;

/// Where in the [`State`](sheath_core::State) a value lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// `species:<name>`.
    Species(String),
    /// The `fields` section.
    Fields,
    /// Top level.
    Global,
}

/// A fully qualified state key, used to declare dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Section holding the value.
    pub section: Section,
    /// Key within the section.
    pub key: &'static str,
}

impl StateKey {
    /// A key in a species record.
    pub fn species(name: &str, key: &'static str) -> Self {
        Self {
            section: Section::Species(name.to_string()),
            key,
        }
    }

    /// A key in the `fields` section.
    pub fn fields(key: &'static str) -> Self {
        Self {
            section: Section::Fields,
            key,
        }
    }

    /// A top-level key.
    pub fn global(key: &'static str) -> Self {
        Self {
            section: Section::Global,
            key,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Section::Species(name) => write!(f, "species:{name}:{}", self.key),
            Section::Fields => write!(f, "fields:{}", self.key),
            Section::Global => f.write_str(self.key),
        }
    }
}

/// Declared state keys. Most components touch only a handful.
pub type StateKeys = SmallVec<[StateKey; 4]>;

/// A unit of physics that takes part in every right-hand-side evaluation.
///
/// Evaluation runs in two phases. First every component's
/// [`transform`](Component::transform) publishes primary quantities
/// (density, velocity, ...) into the shared state. Then every
/// component's [`finally`](Component::finally) reads what all the
/// others published and writes the time derivatives of its own
/// variables. No `finally` starts before every `transform` has finished.
///
/// Components must be `Send + 'static` so a simulation can be moved to
/// another thread. They are stored as `Box<dyn Component>`, so the trait
/// is object-safe: the set of component kinds is open for extension.
///
/// # Dependencies
///
/// A component that reads, during `transform`, a value published by
/// another component's `transform` lists it in
/// [`transform_reads`](Component::transform_reads); the publisher lists
/// it in [`publishes`](Component::publishes). The pipeline orders
/// components so that publishers run first. Reads made only in
/// `finally` need no declaration.
///
/// # Example
///
/// ```
/// use sheath_component::{Component, ComponentError, FinallyContext, StateKey, StateKeys, TransformContext};
/// use sheath_core::state::keys;
/// use smallvec::smallvec;
///
/// struct FixedCharge {
///     species: String,
/// }
///
/// impl Component for FixedCharge {
///     fn name(&self) -> &str {
///         &self.species
///     }
///
///     fn kind(&self) -> &'static str {
///         "fixed_charge"
///     }
///
///     fn publishes(&self) -> StateKeys {
///         smallvec![StateKey::species(&self.species, keys::CHARGE)]
///     }
///
///     fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
///         let label = self.label();
///         ctx.state_mut()
///             .species_mut(&self.species)
///             .set(keys::CHARGE, 1.0, &label)?;
///         Ok(())
///     }
///
///     fn finally(&mut self, _ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
///         Ok(())
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// Section name this component was created for, usually a species.
    fn name(&self) -> &str;

    /// Type tag, as used in the `type` option.
    fn kind(&self) -> &'static str;

    /// Identifier used as the writer of published values and in errors.
    fn label(&self) -> String {
        format!("{} ({})", self.name(), self.kind())
    }

    /// Keys this component may publish during `transform`.
    fn publishes(&self) -> StateKeys {
        StateKeys::new()
    }

    /// Keys this component reads during `transform` that another
    /// component publishes.
    fn transform_reads(&self) -> StateKeys {
        StateKeys::new()
    }

    /// Publish primary quantities.
    fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError>;

    /// Compute time derivatives from the completed state.
    fn finally(&mut self, ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError>;
}
