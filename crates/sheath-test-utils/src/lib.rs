//! Test utilities and mock types for Sheath development.
//!
//! Provides a [`RecordingSink`] for output registrations, mock
//! components in [`fixtures`], and ready-made meshes and option trees
//! for constructing test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    open_mesh, periodic_mesh, unit_options, FailingComponent, PublishFields, Publication,
};

use sheath_component::{OutputMode, OutputRegistration, OutputSink, OutputTarget};

/// [`OutputSink`] that remembers every registration.
#[derive(Debug, Default)]
pub struct RecordingSink {
    registrations: Vec<OutputRegistration>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything registered so far, in order.
    pub fn registrations(&self) -> &[OutputRegistration] {
        &self.registrations
    }

    /// Whether `name` was registered with this mode and target.
    pub fn has(&self, name: &str, mode: OutputMode, target: OutputTarget) -> bool {
        self.registrations
            .iter()
            .any(|r| r.name == name && r.mode == mode && r.target == target)
    }

    /// Registered names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.name.as_str()).collect()
    }
}

impl OutputSink for RecordingSink {
    fn register(&mut self, registration: &OutputRegistration) {
        self.registrations.push(registration.clone());
    }
}
