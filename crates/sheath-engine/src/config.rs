//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] names the component sections to build and the
//! engine-level switches. It is either filled in directly or read from
//! the options tree with [`SimulationConfig::from_options`];
//! [`validate()`](SimulationConfig::validate) checks it before any
//! component is constructed.

use std::error::Error;
use std::fmt;

use sheath_component::{ComponentError, PipelineError};
use sheath_core::{Options, OptionsError};

/// Options section holding engine-level settings.
pub const SECTION: &str = "sheath";

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a [`Simulation`](crate::Simulation).
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// An engine-level option is missing or has the wrong type.
    Options(OptionsError),
    /// No mesh was supplied to the builder.
    NoMesh,
    /// The component list contains an empty name.
    EmptyComponentName {
        /// Position in the list.
        index: usize,
    },
    /// The same section appears twice in the component list.
    DuplicateComponent {
        /// The repeated section name.
        name: String,
    },
    /// A restart was requested but no saved data was supplied.
    MissingRestartData,
    /// A component could not be constructed.
    Component {
        /// Section the component was built from.
        name: String,
        /// What went wrong.
        source: ComponentError,
    },
    /// Dependency validation of the built components failed.
    Pipeline(PipelineError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Options(e) => write!(f, "options: {e}"),
            Self::NoMesh => write!(f, "no mesh supplied"),
            Self::EmptyComponentName { index } => {
                write!(f, "component name at position {index} is empty")
            }
            Self::DuplicateComponent { name } => {
                write!(f, "component '{name}' listed more than once")
            }
            Self::MissingRestartData => {
                write!(f, "restart requested but no saved data supplied")
            }
            Self::Component { name, source } => {
                write!(f, "building component '{name}': {source}")
            }
            Self::Pipeline(e) => write!(f, "pipeline: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Options(e) => Some(e),
            Self::Component { source, .. } => Some(source),
            Self::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OptionsError> for ConfigError {
    fn from(e: OptionsError) -> Self {
        Self::Options(e)
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Engine-level settings.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Option sections to build components from, in configuration order.
    pub components: Vec<String>,
    /// Scan every derivative for NaN or infinity after each evaluation.
    /// Default: on in debug builds, off in release builds.
    pub check_finite: bool,
    /// Continue from saved data instead of initial profiles. Default: false.
    pub restarting: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            check_finite: cfg!(debug_assertions),
            restarting: false,
        }
    }
}

impl SimulationConfig {
    /// Configuration for the given component sections, defaults elsewhere.
    pub fn with_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Read `sheath:components` (comma separated), `sheath:check_finite`,
    /// and the top-level `restart` flag.
    pub fn from_options(options: &mut Options) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let restarting = options.get_or("restart", defaults.restarting, "Continue from saved data")?;

        let section = options.section_mut(SECTION);
        let list: String = section.get("components", "Component sections, comma separated")?;
        let check_finite = section.get_or(
            "check_finite",
            defaults.check_finite,
            "Check derivatives for NaN and infinity after every evaluation",
        )?;

        Ok(Self {
            components: list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            check_finite,
            restarting,
        })
    }

    /// Validate structural invariants.
    ///
    /// An empty component list is accepted here: components may also be
    /// supplied directly to the builder, and the pipeline rejects an
    /// empty set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Names must be non-empty.
        if let Some(index) = self.components.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::EmptyComponentName { index });
        }
        // 2. Each section is built once.
        for (i, name) in self.components.iter().enumerate() {
            if self.components[..i].contains(name) {
                return Err(ConfigError::DuplicateComponent { name: name.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_checks_finite_in_debug_only() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.check_finite, cfg!(debug_assertions));
        assert!(!cfg.restarting);
        assert!(cfg.components.is_empty());
    }

    #[test]
    fn from_options_splits_component_list() {
        let mut opts = Options::new();
        opts.section_mut(SECTION)
            .set("components", "d+, e ,  ")
            .set("check_finite", true);
        let cfg = SimulationConfig::from_options(&mut opts).unwrap();
        assert_eq!(cfg.components, vec!["d+", "e"]);
        assert!(cfg.check_finite);
        assert!(!cfg.restarting);
        assert!(opts.unused().is_empty());
    }

    #[test]
    fn from_options_reads_restart_flag() {
        let mut opts = Options::new();
        opts.set("restart", true);
        opts.section_mut(SECTION).set("components", "e");
        assert!(SimulationConfig::from_options(&mut opts).unwrap().restarting);
    }

    #[test]
    fn missing_component_list_fails() {
        let mut opts = Options::new();
        match SimulationConfig::from_options(&mut opts) {
            Err(ConfigError::Options(OptionsError::Missing { path })) => {
                assert_eq!(path, "sheath:components");
            }
            other => panic!("expected Options(Missing), got {other:?}"),
        }
    }

    #[test]
    fn validate_duplicate_component_fails() {
        let cfg = SimulationConfig::with_components(["d+", "e", "d+"]);
        match cfg.validate() {
            Err(ConfigError::DuplicateComponent { name }) => assert_eq!(name, "d+"),
            other => panic!("expected DuplicateComponent, got {other:?}"),
        }
    }

    #[test]
    fn validate_empty_name_fails() {
        let cfg = SimulationConfig::with_components(["d+", " "]);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyComponentName { index: 1 })
        );
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(SimulationConfig::with_components(["d+", "e"])
            .validate()
            .is_ok());
    }

    #[test]
    fn component_error_display_names_section() {
        let err = ConfigError::Component {
            name: "d+".into(),
            source: ComponentError::Options(OptionsError::Missing {
                path: "units:seconds".into(),
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("'d+'"));
        assert!(msg.contains("units:seconds"));
        assert!(err.source().is_some());
    }

    proptest! {
        #[test]
        fn component_list_survives_spacing(
            names in proptest::collection::vec("[a-z][a-z0-9+]{0,4}", 1..6),
            pad in 0usize..3,
        ) {
            let sep = format!("{},{}", " ".repeat(pad), " ".repeat(pad));
            let mut opts = Options::new();
            opts.section_mut(SECTION).set("components", names.join(&sep));
            let cfg = SimulationConfig::from_options(&mut opts).unwrap();
            prop_assert_eq!(cfg.components, names);
        }
    }
}
