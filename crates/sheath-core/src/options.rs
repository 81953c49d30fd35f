//! Hierarchical, typed, self-documenting configuration tree.
//!
//! An [`Options`] node holds typed values and named child sections, both
//! kept in insertion order. Lookups go through [`Options::get_or`] and
//! [`Options::get`], which record the documentation string, mark the
//! value as used, and remember whether the value came from the user or
//! from a default. Restart logic relies on that distinction: see
//! [`Options::is_set`].

use indexmap::IndexMap;

use crate::error::OptionsError;
use crate::field::Field3D;

/// A typed option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// Boolean switch.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Real number.
    Real(f64),
    /// Free text.
    Str(String),
    /// A full 3D field, e.g. a spatially varying source.
    Field(Field3D),
}

impl OptionValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Str(_) => "string",
            Self::Field(_) => "field",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Field3D> for OptionValue {
    fn from(v: Field3D) -> Self {
        Self::Field(v)
    }
}

/// Conversion from a stored [`OptionValue`] to a concrete type.
pub trait FromOption: Sized {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Convert, or `None` if the stored type does not fit.
    fn from_option(value: &OptionValue) -> Option<Self>;
}

impl FromOption for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromOption for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromOption for f64 {
    const TYPE_NAME: &'static str = "real";

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Real(r) => Some(*r),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromOption for String {
    const TYPE_NAME: &'static str = "string";

    fn from_option(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromOption for OptionValue {
    const TYPE_NAME: &'static str = "any";

    fn from_option(value: &OptionValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// Where a stored value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSource {
    /// Set explicitly by the user (input file, command line, or code).
    User,
    /// Filled in from the default passed to [`Options::get_or`].
    Default,
}

#[derive(Clone, Debug)]
struct Entry {
    value: OptionValue,
    source: ValueSource,
    doc: Option<String>,
    used: bool,
}

/// A node in the options tree.
#[derive(Clone, Debug, Default)]
pub struct Options {
    path: String,
    entries: IndexMap<String, Entry>,
    sections: IndexMap<String, Options>,
    conditionally_used: bool,
}

impl Options {
    /// An empty root node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Full path of this node, `""` for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn key_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.path, key)
        }
    }

    /// Set a value explicitly. Overwrites any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) -> &mut Self {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.into(),
                source: ValueSource::User,
                doc: None,
                used: false,
            },
        );
        self
    }

    /// Child section, created empty if absent.
    pub fn section_mut(&mut self, name: &str) -> &mut Options {
        let path = self.key_path(name);
        self.sections
            .entry(name.to_string())
            .or_insert_with(|| Options {
                path,
                ..Options::default()
            })
    }

    /// Child section, if present.
    pub fn section(&self, name: &str) -> Option<&Options> {
        self.sections.get(name)
    }

    /// Whether a child section exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Whether `key` was set by the user rather than defaulted.
    pub fn is_set(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.source == ValueSource::User)
    }

    /// Source of a stored value, if any.
    pub fn source(&self, key: &str) -> Option<ValueSource> {
        self.entries.get(key).map(|e| e.source)
    }

    /// Documentation recorded by the first lookup of `key`.
    pub fn doc(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|e| e.doc.as_deref())
    }

    /// Look up `key`, storing and returning `default` if it is absent.
    pub fn get_or<T>(&mut self, key: &str, default: T, doc: &str) -> Result<T, OptionsError>
    where
        T: FromOption + Clone + Into<OptionValue>,
    {
        let path = self.key_path(key);
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.used = true;
                if entry.doc.is_none() {
                    entry.doc = Some(doc.to_string());
                }
                T::from_option(&entry.value).ok_or_else(|| OptionsError::TypeMismatch {
                    path,
                    expected: T::TYPE_NAME,
                    found: entry.value.type_name(),
                })
            }
            None => {
                log::trace!("option '{path}' not set, using default");
                self.entries.insert(
                    key.to_string(),
                    Entry {
                        value: default.clone().into(),
                        source: ValueSource::Default,
                        doc: Some(doc.to_string()),
                        used: true,
                    },
                );
                Ok(default)
            }
        }
    }

    /// Look up a required `key`.
    pub fn get<T: FromOption>(&mut self, key: &str, doc: &str) -> Result<T, OptionsError> {
        let path = self.key_path(key);
        let entry = self
            .entries
            .get_mut(key)
            .ok_or(OptionsError::Missing { path: path.clone() })?;
        entry.used = true;
        if entry.doc.is_none() {
            entry.doc = Some(doc.to_string());
        }
        T::from_option(&entry.value).ok_or_else(|| OptionsError::TypeMismatch {
            path,
            expected: T::TYPE_NAME,
            found: entry.value.type_name(),
        })
    }

    /// Mark this section and everything below it as deliberately ignored.
    ///
    /// Keys in such sections are never reported by [`Options::unused`].
    pub fn set_conditionally_used(&mut self) {
        self.conditionally_used = true;
        for child in self.sections.values_mut() {
            child.set_conditionally_used();
        }
    }

    /// Whether [`Options::set_conditionally_used`] was called on this node.
    pub fn is_conditionally_used(&self) -> bool {
        self.conditionally_used
    }

    /// Full paths of user-set values that nothing looked up.
    pub fn unused(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_unused(&mut out);
        out
    }

    fn collect_unused(&self, out: &mut Vec<String>) {
        if self.conditionally_used {
            return;
        }
        for (key, entry) in &self.entries {
            if entry.source == ValueSource::User && !entry.used {
                out.push(self.key_path(key));
            }
        }
        for child in self.sections.values() {
            child.collect_unused(out);
        }
    }
}
