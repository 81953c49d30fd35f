//! Per-evaluation state shared between components.
//!
//! A [`State`] is built fresh for every right-hand-side evaluation and
//! discarded afterwards. It has three sections:
//!
//! - `species:<name>`: one [`Record`] per species (density, velocity,
//!   charge, AA, temperature, pressure, sources, ...);
//! - `fields`: global fields such as the electrostatic potential `phi`;
//! - top-level values such as `sound_speed`.
//!
//! Each key may be set once. The first writer wins: a second
//! [`Record::set`] for the same key is rejected with
//! [`StateError::AlreadySet`] and the first value is kept.

use indexmap::IndexMap;

use crate::error::StateError;
use crate::field::Field3D;

/// Well-known keys used by species components.
pub mod keys {
    /// Species density.
    pub const DENSITY: &str = "density";
    /// Parallel flow velocity.
    pub const VELOCITY: &str = "velocity";
    /// Parallel momentum.
    pub const MOMENTUM: &str = "momentum";
    /// Atomic mass in units of the proton mass.
    pub const ATOMIC_MASS: &str = "AA";
    /// Particle charge in units of the elementary charge.
    pub const CHARGE: &str = "charge";
    /// Species temperature.
    pub const TEMPERATURE: &str = "temperature";
    /// Species pressure.
    pub const PRESSURE: &str = "pressure";
    /// Externally supplied density source.
    pub const DENSITY_SOURCE: &str = "density_source";
    /// Externally supplied momentum source.
    pub const MOMENTUM_SOURCE: &str = "momentum_source";
    /// Electrostatic potential, in the `fields` section.
    pub const PHI: &str = "phi";
    /// Characteristic wave speed, at top level.
    pub const SOUND_SPEED: &str = "sound_speed";
}

/// A value stored in the state.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A scalar, e.g. atomic mass or charge.
    Real(f64),
    /// A 3D field.
    Field(Field3D),
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Field3D> for Value {
    fn from(v: Field3D) -> Self {
        Self::Field(v)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    value: Value,
    writer: String,
}

/// A named collection of set-once values.
#[derive(Clone, Debug, Default)]
pub struct Record {
    section: String,
    slots: IndexMap<String, Slot>,
}

impl Record {
    /// An empty record for the given section path.
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            slots: IndexMap::new(),
        }
    }

    /// Section path, e.g. `species:d+`.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Publish `value` under `key` on behalf of `writer`.
    pub fn set(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        writer: &str,
    ) -> Result<(), StateError> {
        if let Some(existing) = self.slots.get(key) {
            return Err(StateError::AlreadySet {
                section: self.section.clone(),
                key: key.to_string(),
                first_writer: existing.writer.clone(),
                second_writer: writer.to_string(),
            });
        }
        self.slots.insert(
            key.to_string(),
            Slot {
                value: value.into(),
                writer: writer.to_string(),
            },
        );
        Ok(())
    }

    /// Whether `key` has been published.
    pub fn is_set(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Component that published `key`.
    pub fn writer(&self, key: &str) -> Option<&str> {
        self.slots.get(key).map(|s| s.writer.as_str())
    }

    /// Published keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Required value.
    pub fn get(&self, key: &str) -> Result<&Value, StateError> {
        self.slots
            .get(key)
            .map(|s| &s.value)
            .ok_or_else(|| StateError::MissingField {
                section: self.section.clone(),
                key: key.to_string(),
            })
    }

    /// Required field value.
    pub fn get_field(&self, key: &str) -> Result<&Field3D, StateError> {
        match self.get(key)? {
            Value::Field(f) => Ok(f),
            Value::Real(_) => Err(self.wrong_type(key, "field")),
        }
    }

    /// Required scalar value.
    pub fn get_real(&self, key: &str) -> Result<f64, StateError> {
        match self.get(key)? {
            Value::Real(r) => Ok(*r),
            Value::Field(_) => Err(self.wrong_type(key, "real")),
        }
    }

    /// Optional field value: `Ok(None)` if absent, an error if present
    /// with the wrong type.
    pub fn field_opt(&self, key: &str) -> Result<Option<&Field3D>, StateError> {
        match self.slots.get(key) {
            None => Ok(None),
            Some(Slot {
                value: Value::Field(f),
                ..
            }) => Ok(Some(f)),
            Some(_) => Err(self.wrong_type(key, "field")),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> StateError {
        StateError::WrongType {
            section: self.section.clone(),
            key: key.to_string(),
            expected,
        }
    }
}

/// The complete state for one evaluation.
#[derive(Clone, Debug)]
pub struct State {
    species: IndexMap<String, Record>,
    fields: Record,
    globals: Record,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// An empty state.
    pub fn new() -> Self {
        Self {
            species: IndexMap::new(),
            fields: Record::new("fields"),
            globals: Record::new(""),
        }
    }

    /// Record for a species, if any value has been published for it.
    pub fn species(&self, name: &str) -> Option<&Record> {
        self.species.get(name)
    }

    /// Record for a species; missing species is an error.
    pub fn require_species(&self, name: &str) -> Result<&Record, StateError> {
        self.species.get(name).ok_or_else(|| StateError::MissingField {
            section: "species".to_string(),
            key: name.to_string(),
        })
    }

    /// Mutable record for a species, created empty if absent.
    pub fn species_mut(&mut self, name: &str) -> &mut Record {
        self.species
            .entry(name.to_string())
            .or_insert_with(|| Record::new(format!("species:{name}")))
    }

    /// Species with at least one published value, in publication order.
    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    /// The `fields` section.
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    /// Mutable `fields` section.
    pub fn fields_mut(&mut self) -> &mut Record {
        &mut self.fields
    }

    /// Top-level values.
    pub fn globals(&self) -> &Record {
        &self.globals
    }

    /// Mutable top-level values.
    pub fn globals_mut(&mut self) -> &mut Record {
        &mut self.globals
    }
}
