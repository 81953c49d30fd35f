//! The right-hand-side driver.
//!
//! [`Simulation`] owns the mesh, the ordered component pipeline, and the
//! [`VariableStore`] of evolved variables. Each call to
//! [`rhs()`](Simulation::rhs) runs one evaluation:
//!
//! 1. every derivative slot is zeroed and a fresh [`State`] is created;
//! 2. every component's `transform` runs, in pipeline order;
//! 3. every component's `finally` runs, in the same order;
//! 4. optionally, every derivative is scanned for NaN or infinity.
//!
//! No `finally` starts before the last `transform` has finished. An
//! error in either phase aborts the evaluation; the derivative slots are
//! then partially written and must not be used.
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] but not [`Sync`]. The integrator writes
//! variable values through [`variables_mut()`](Simulation::variables_mut)
//! between evaluations and reads derivatives through
//! [`variables()`](Simulation::variables) afterwards.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use sheath_component::{
    BuildContext, Component, ComponentError, ComponentRegistry, FinallyContext, OutputSink,
    Pipeline, TransformContext, VariableStore,
};
use sheath_core::{Field3D, Options, Region, State};
use sheath_mesh::Mesh;

use crate::config::{ConfigError, SimulationConfig};
use crate::metrics::RhsMetrics;

// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── RhsError ───────────────────────────────────────────────────────

/// Evaluation phase in which a component failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Publishing primary quantities.
    Transform,
    /// Computing time derivatives.
    Finally,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => f.write_str("transform"),
            Self::Finally => f.write_str("finally"),
        }
    }
}

/// Errors that abort a right-hand-side evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum RhsError {
    /// A component returned an error.
    Component {
        /// Label of the failing component, e.g. `d+ (evolve_density)`.
        component: String,
        /// Phase in which it failed.
        phase: Phase,
        /// The component's error.
        source: ComponentError,
    },
    /// A derivative holds NaN or infinity.
    NonFinite {
        /// Name of the evolved variable, e.g. `Nd+`.
        variable: String,
        /// Region that was scanned.
        region: Region,
        /// First offending `(x, y, z)` cell.
        cell: (usize, usize, usize),
    },
}

impl fmt::Display for RhsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component {
                component,
                phase,
                source,
            } => write!(f, "component '{component}' failed in {phase}: {source}"),
            Self::NonFinite {
                variable,
                region,
                cell,
            } => write!(
                f,
                "non-finite derivative of '{variable}' at {cell:?} (region {region})"
            ),
        }
    }
}

impl Error for RhsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Component { source, .. } => Some(source),
            Self::NonFinite { .. } => None,
        }
    }
}

// ── SimulationBuilder ──────────────────────────────────────────────

/// Builder for [`Simulation`].
///
/// Only a mesh is required. Without an explicit
/// [`config`](SimulationBuilder::config) the engine settings are read
/// from the options tree; without an explicit
/// [`registry`](SimulationBuilder::registry) the component types of
/// `sheath-species` are available.
pub struct SimulationBuilder {
    mesh: Option<Box<dyn Mesh>>,
    options: Options,
    config: Option<SimulationConfig>,
    registry: ComponentRegistry,
    saved: Option<Vec<(String, Field3D)>>,
    extra: Vec<Box<dyn Component>>,
}

impl SimulationBuilder {
    fn new() -> Self {
        Self {
            mesh: None,
            options: Options::new(),
            config: None,
            registry: sheath_species::registry(),
            saved: None,
            extra: Vec::new(),
        }
    }

    /// The mesh every field lives on.
    pub fn mesh(mut self, mesh: impl Mesh) -> Self {
        self.mesh = Some(Box::new(mesh));
        self
    }

    /// The options tree components are configured from.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Engine settings, instead of reading them from the options.
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Component types available to the component list.
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Saved variable values to restore when restarting.
    pub fn restart_from(mut self, saved: impl IntoIterator<Item = (String, Field3D)>) -> Self {
        self.saved = Some(saved.into_iter().collect());
        self
    }

    /// An already-built component to run alongside the configured ones.
    pub fn component(mut self, component: impl Component) -> Self {
        self.extra.push(Box::new(component));
        self
    }

    /// Build every component and validate the pipeline.
    ///
    /// Options set by the user but never read by any component are
    /// reported with `log::warn!`; they usually indicate a typo.
    pub fn build(self) -> Result<Simulation, ConfigError> {
        let mesh = self.mesh.ok_or(ConfigError::NoMesh)?;
        let mut options = self.options;
        let config = match self.config {
            Some(config) => config,
            None => SimulationConfig::from_options(&mut options)?,
        };
        config.validate()?;

        let mut store = match (config.restarting, self.saved) {
            (true, Some(saved)) => VariableStore::restarting(saved),
            (true, None) => return Err(ConfigError::MissingRestartData),
            (false, Some(_)) => {
                log::warn!("saved data supplied but restart is off; starting from initial profiles");
                VariableStore::new()
            }
            (false, None) => VariableStore::new(),
        };

        let mut components: Vec<Box<dyn Component>> = Vec::new();
        {
            let mut ctx = BuildContext::new(&*mesh, &mut store);
            for name in &config.components {
                let built = self
                    .registry
                    .create(name, &mut options, &mut ctx)
                    .map_err(|source| ConfigError::Component {
                        name: name.clone(),
                        source,
                    })?;
                components.extend(built);
            }
        }
        components.extend(self.extra);
        let pipeline = Pipeline::new(components)?;

        for path in options.unused() {
            log::warn!("option '{path}' is set but was never read");
        }
        log::debug!(
            "simulation ready: {} components, {} evolved variables",
            pipeline.len(),
            store.len()
        );

        Ok(Simulation {
            mesh,
            options,
            config,
            pipeline,
            store,
            state: State::new(),
            metrics: RhsMetrics::default(),
        })
    }
}

// ── Simulation ─────────────────────────────────────────────────────

/// Evolved variables and the components that compute their derivatives.
///
/// # Example
///
/// ```ignore
/// let mut sim = Simulation::builder().mesh(mesh).options(options).build()?;
/// let id = sim.variables().id("Nd+").unwrap();
/// sim.rhs()?;
/// let dndt = sim.variables().ddt(id)?;
/// ```
pub struct Simulation {
    mesh: Box<dyn Mesh>,
    options: Options,
    config: SimulationConfig,
    pipeline: Pipeline,
    store: VariableStore,
    state: State,
    metrics: RhsMetrics,
}

impl Simulation {
    /// Start building a simulation.
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Run one evaluation: all `transform`s, then all `finally`s.
    ///
    /// # Errors
    ///
    /// Returns [`RhsError::Component`] for the first component that
    /// fails, and [`RhsError::NonFinite`] if finiteness checking is on
    /// and a derivative holds NaN or infinity.
    pub fn rhs(&mut self) -> Result<&RhsMetrics, RhsError> {
        let start = Instant::now();
        let mut metrics = RhsMetrics {
            evaluations: self.metrics.evaluations,
            ..RhsMetrics::default()
        };

        self.store.clear_derivatives();
        self.state = State::new();

        for component in self.pipeline.iter_mut() {
            let t0 = Instant::now();
            let mut ctx = TransformContext::new(&mut self.state, &*self.mesh, &self.store);
            component
                .transform(&mut ctx)
                .map_err(|source| failure(&**component, Phase::Transform, source))?;
            metrics
                .transform_us
                .push((component.label(), t0.elapsed().as_micros() as u64));
        }

        for component in self.pipeline.iter_mut() {
            let t0 = Instant::now();
            let mut ctx = FinallyContext::new(&self.state, &*self.mesh, &mut self.store);
            component
                .finally(&mut ctx)
                .map_err(|source| failure(&**component, Phase::Finally, source))?;
            metrics
                .finally_us
                .push((component.label(), t0.elapsed().as_micros() as u64));
        }

        if self.config.check_finite {
            let t0 = Instant::now();
            self.check_finite()?;
            metrics.finite_check_us = t0.elapsed().as_micros() as u64;
        }

        metrics.evaluations += 1;
        metrics.total_us = start.elapsed().as_micros() as u64;
        self.metrics = metrics;
        Ok(&self.metrics)
    }

    fn check_finite(&self) -> Result<(), RhsError> {
        let region = Region::NoBoundary;
        for id in self.store.ids() {
            let Ok(ddt) = self.store.ddt(id) else {
                continue;
            };
            if let Some(cell) = ddt.first_non_finite(region) {
                let variable = self.store.name(id).unwrap_or("?").to_string();
                log::error!("non-finite ddt({variable}) at {cell:?}");
                return Err(RhsError::NonFinite {
                    variable,
                    region,
                    cell,
                });
            }
        }
        Ok(())
    }

    /// Evolved variables, their values and derivatives.
    pub fn variables(&self) -> &VariableStore {
        &self.store
    }

    /// Mutable access for the integrator to set new values.
    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    /// State published during the last evaluation.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The mesh.
    pub fn mesh(&self) -> &dyn Mesh {
        &*self.mesh
    }

    /// The ordered components.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Engine settings in effect.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The options tree, with defaults and usage recorded.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Metrics from the most recent successful evaluation.
    pub fn last_metrics(&self) -> &RhsMetrics {
        &self.metrics
    }

    /// Hand every output registration to `sink`.
    pub fn forward_outputs(&self, sink: &mut dyn OutputSink) {
        self.store.forward_outputs(sink);
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("mesh", &self.mesh.instance_id())
            .field("components", &self.pipeline.labels())
            .field("variables", &self.store.len())
            .field("config", &self.config)
            .field("evaluations", &self.metrics.evaluations)
            .finish()
    }
}

fn failure(component: &dyn Component, phase: Phase, source: ComponentError) -> RhsError {
    let label = component.label();
    log::error!("'{label}' failed in {phase}: {source}");
    RhsError::Component {
        component: label,
        phase,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheath_test_utils::{periodic_mesh, FailingComponent, PublishFields};

    #[test]
    fn build_without_mesh_fails() {
        let err = Simulation::builder()
            .config(SimulationConfig::with_components(Vec::<String>::new()))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoMesh);
    }

    #[test]
    fn empty_pipeline_rejected() {
        let err = Simulation::builder()
            .mesh(periodic_mesh(1, 4, 1))
            .config(SimulationConfig::default())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Pipeline(sheath_component::PipelineError::Empty)
        );
    }

    #[test]
    fn restart_without_saved_data_fails() {
        let config = SimulationConfig {
            restarting: true,
            ..SimulationConfig::default()
        };
        let err = Simulation::builder()
            .mesh(periodic_mesh(1, 4, 1))
            .config(config)
            .component(PublishFields::new("fixed"))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingRestartData);
    }

    #[test]
    fn evaluations_are_counted() {
        let mut sim = Simulation::builder()
            .mesh(periodic_mesh(1, 4, 1))
            .config(SimulationConfig::default())
            .component(PublishFields::new("fixed").global("time", 0.0))
            .build()
            .unwrap();
        sim.rhs().unwrap();
        let m = sim.rhs().unwrap();
        assert_eq!(m.evaluations, 2);
        assert_eq!(m.transform_us.len(), 1);
        assert_eq!(m.finally_us[0].0, "fixed (publish_fields)");
    }

    #[test]
    fn finally_failure_is_labelled() {
        let mut sim = Simulation::builder()
            .mesh(periodic_mesh(1, 4, 1))
            .config(SimulationConfig::default())
            .component(FailingComponent::new("broken", 1))
            .build()
            .unwrap();
        assert!(sim.rhs().is_ok());
        match sim.rhs() {
            Err(RhsError::Component {
                component, phase, ..
            }) => {
                assert_eq!(component, "broken (failing)");
                assert_eq!(phase, Phase::Finally);
            }
            other => panic!("expected Component error, got {other:?}"),
        }
        assert_eq!(sim.last_metrics().evaluations, 1);
    }
}
