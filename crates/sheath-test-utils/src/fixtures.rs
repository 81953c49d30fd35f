//! Reusable meshes, options and mock components.
//!
//! - [`open_mesh`] and [`periodic_mesh`]: small structured meshes with
//!   unit metrics.
//! - [`unit_options`]: an options tree with unit normalisation.
//! - [`PublishFields`]: publishes fixed values during `transform`.
//! - [`FailingComponent`]: fails deterministically after N calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use sheath_component::{
    Component, ComponentError, FinallyContext, Section, StateKey, StateKeys, TransformContext,
};
use sheath_core::{Options, State, StateError, Value};
use sheath_mesh::StructuredMesh;

/// `nx` by `ny` by `nz` mesh with open (sheath) y boundaries everywhere.
pub fn open_mesh(nx: usize, ny: usize, nz: usize) -> StructuredMesh {
    StructuredMesh::builder(nx, ny, nz)
        .build()
        .expect("valid test mesh")
}

/// `nx` by `ny` by `nz` mesh with periodic y in every column.
pub fn periodic_mesh(nx: usize, ny: usize, nz: usize) -> StructuredMesh {
    StructuredMesh::builder(nx, ny, nz)
        .periodic_y()
        .build()
        .expect("valid test mesh")
}

/// Options with `units:inv_meters_cubed = 1` and `units:seconds = 1`,
/// so configured sources are used without rescaling.
pub fn unit_options() -> Options {
    let mut options = Options::new();
    options
        .section_mut("units")
        .set("inv_meters_cubed", 1.0)
        .set("seconds", 1.0);
    options
}

/// One value published by [`PublishFields`].
#[derive(Clone, Debug)]
pub struct Publication {
    pub section: Section,
    pub key: &'static str,
    pub value: Value,
}

/// Publishes a fixed list of values during `transform`. Does nothing in
/// `finally`.
///
/// Stands in for the collaborators (closures, field solvers, sources)
/// that a species component reads from.
pub struct PublishFields {
    name: String,
    publications: Vec<Publication>,
}

impl PublishFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publications: Vec::new(),
        }
    }

    /// Publish `value` under `species:<species>:<key>`.
    pub fn species(mut self, species: &str, key: &'static str, value: impl Into<Value>) -> Self {
        self.publications.push(Publication {
            section: Section::Species(species.to_string()),
            key,
            value: value.into(),
        });
        self
    }

    /// Publish `value` under `fields:<key>`.
    pub fn field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.publications.push(Publication {
            section: Section::Fields,
            key,
            value: value.into(),
        });
        self
    }

    /// Publish `value` at top level.
    pub fn global(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.publications.push(Publication {
            section: Section::Global,
            key,
            value: value.into(),
        });
        self
    }

    /// Write every publication straight into `state`, bypassing a
    /// pipeline.
    pub fn publish_into(&self, state: &mut State) -> Result<(), ComponentError> {
        let label = self.label();
        for p in &self.publications {
            let record = match &p.section {
                Section::Species(name) => state.species_mut(name),
                Section::Fields => state.fields_mut(),
                Section::Global => state.globals_mut(),
            };
            record.set(p.key, p.value.clone(), &label)?;
        }
        Ok(())
    }
}

impl Component for PublishFields {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "publish_fields"
    }

    fn publishes(&self) -> StateKeys {
        self.publications
            .iter()
            .map(|p| StateKey {
                section: p.section.clone(),
                key: p.key,
            })
            .collect()
    }

    fn transform(&mut self, ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
        self.publish_into(ctx.state_mut())
    }

    fn finally(&mut self, _ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// Fails in `finally` after a configurable number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so the count can be read
/// through a shared reference.
pub struct FailingComponent {
    name: String,
    succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingComponent {
    /// Create a component that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `finally()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Component for FailingComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "failing"
    }

    fn transform(&mut self, _ctx: &mut TransformContext<'_>) -> Result<(), ComponentError> {
        Ok(())
    }

    fn finally(&mut self, _ctx: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(ComponentError::State(StateError::MissingField {
                section: "species".to_string(),
                key: self.name.clone(),
            }));
        }
        Ok(())
    }
}
