//! Pipeline validation and ordering.
//!
//! [`Pipeline::new`] runs once when a simulation is built. It checks the
//! component list for structural errors and sorts it so that every
//! component runs its `transform` after the components whose published
//! values it reads.

use indexmap::IndexMap;

use crate::component::{Component, StateKey};

use std::error::Error;
use std::fmt;

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from pipeline validation (build time, not per evaluation).
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// No components registered.
    Empty,

    /// Two components share a name and kind.
    DuplicateName {
        /// The repeated label.
        label: String,
    },

    /// Two components declare the same published key.
    PublishConflict {
        /// The contested key.
        key: String,
        /// Label of the first publisher (earlier in configuration order).
        first: String,
        /// Label of the second publisher.
        second: String,
    },

    /// A component reads a key during `transform` that nobody publishes.
    UnsatisfiedRead {
        /// The reading component.
        component: String,
        /// The missing key.
        key: String,
    },

    /// The transform dependencies form a cycle.
    Cycle {
        /// Labels of the components that could not be ordered.
        components: Vec<String>,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "pipeline has no components"),
            Self::DuplicateName { label } => write!(f, "component '{label}' appears twice"),
            Self::PublishConflict { key, first, second } => {
                write!(f, "'{key}' is published by both '{first}' and '{second}'")
            }
            Self::UnsatisfiedRead { component, key } => {
                write!(f, "component '{component}' reads '{key}', which nobody publishes")
            }
            Self::Cycle { components } => {
                write!(f, "dependency cycle among: {}", components.join(", "))
            }
        }
    }
}

impl Error for PipelineError {}

// ── Pipeline ───────────────────────────────────────────────────────

/// Components in execution order.
pub struct Pipeline {
    components: Vec<Box<dyn Component>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("order", &self.labels())
            .finish()
    }
}

impl Pipeline {
    /// Validate and order `components`.
    ///
    /// Checks performed:
    ///
    /// 1. The list is non-empty.
    /// 2. No two components share a label.
    /// 3. No key is declared by two publishers.
    /// 4. Every declared transform read has a publisher.
    /// 5. The publisher-before-reader relation is acyclic.
    ///
    /// Components with no ordering constraint between them keep their
    /// configuration order.
    pub fn new(components: Vec<Box<dyn Component>>) -> Result<Self, PipelineError> {
        if components.is_empty() {
            return Err(PipelineError::Empty);
        }

        let labels: Vec<String> = components.iter().map(|c| c.label()).collect();
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(PipelineError::DuplicateName {
                    label: label.clone(),
                });
            }
        }

        let mut publisher: IndexMap<StateKey, usize> = IndexMap::new();
        for (i, component) in components.iter().enumerate() {
            for key in component.publishes() {
                if let Some(&j) = publisher.get(&key) {
                    return Err(PipelineError::PublishConflict {
                        key: key.to_string(),
                        first: labels[j].clone(),
                        second: labels[i].clone(),
                    });
                }
                publisher.insert(key, i);
            }
        }

        // edges[p] lists the readers that must wait for p.
        let n = components.len();
        let mut edges: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, component) in components.iter().enumerate() {
            for key in component.transform_reads() {
                let &p = publisher
                    .get(&key)
                    .ok_or_else(|| PipelineError::UnsatisfiedRead {
                        component: labels[i].clone(),
                        key: key.to_string(),
                    })?;
                if p != i && !edges[p].contains(&i) {
                    edges[p].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        // Kahn's algorithm, always taking the earliest ready component.
        let mut order = Vec::with_capacity(n);
        let mut done = vec![false; n];
        while order.len() < n {
            let next = (0..n).find(|&i| !done[i] && in_degree[i] == 0);
            let Some(next) = next else {
                let components = (0..n)
                    .filter(|&i| !done[i])
                    .map(|i| labels[i].clone())
                    .collect();
                return Err(PipelineError::Cycle { components });
            };
            done[next] = true;
            order.push(next);
            for &reader in &edges[next] {
                in_degree[reader] -= 1;
            }
        }

        let mut slots: Vec<Option<Box<dyn Component>>> = components.into_iter().map(Some).collect();
        let components: Vec<Box<dyn Component>> =
            order.iter().filter_map(|&i| slots[i].take()).collect();

        let pipeline = Self { components };
        log::info!("component order: {}", pipeline.labels().join(" -> "));
        Ok(pipeline)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the pipeline is empty. Never true for a validated pipeline.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component labels in execution order.
    pub fn labels(&self) -> Vec<String> {
        self.components.iter().map(|c| c.label()).collect()
    }

    /// Components in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Mutable components in execution order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Component>> {
        self.components.iter_mut()
    }
}
