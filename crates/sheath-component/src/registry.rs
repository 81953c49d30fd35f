//! Type-tag to factory mapping for building components from options.

use indexmap::IndexMap;

use sheath_core::Options;

use crate::component::Component;
use crate::context::BuildContext;
use crate::error::ComponentError;

/// Builds one component for section `name`.
///
/// The factory receives the root of the options tree: a component reads
/// its own section (`options.section_mut(name)`) as well as shared ones
/// such as `units`.
pub type Factory = fn(
    name: &str,
    options: &mut Options,
    ctx: &mut BuildContext<'_>,
) -> Result<Box<dyn Component>, ComponentError>;

/// Known component types.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: IndexMap<&'static str, Factory>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `tag`, replacing any previous entry.
    pub fn register(&mut self, tag: &'static str, factory: Factory) -> &mut Self {
        if self.factories.insert(tag, factory).is_some() {
            log::warn!("component type '{tag}' registered twice; keeping the later factory");
        }
        self
    }

    /// Add every entry of `other`.
    pub fn extend(&mut self, other: &ComponentRegistry) -> &mut Self {
        for (&tag, &factory) in &other.factories {
            self.register(tag, factory);
        }
        self
    }

    /// Whether `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Build the components configured for section `name`.
    ///
    /// The section's `type` option is a comma-separated list of tags; it
    /// defaults to `name` itself. One component is built per tag, all
    /// sharing the section name.
    pub fn create(
        &self,
        name: &str,
        options: &mut Options,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Vec<Box<dyn Component>>, ComponentError> {
        let types: String = options.section_mut(name).get_or(
            "type",
            name.to_string(),
            "Component types, comma separated",
        )?;

        let mut built = Vec::new();
        for tag in types.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let factory = self
                .factories
                .get(tag)
                .ok_or_else(|| ComponentError::UnknownType {
                    name: name.to_string(),
                    tag: tag.to_string(),
                    known: self.tags().map(str::to_string).collect(),
                })?;
            log::debug!("creating component '{name}' of type '{tag}'");
            built.push(factory(name, options, ctx)?);
        }
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FinallyContext, TransformContext};
    use crate::solver::VariableStore;
    use sheath_mesh::StructuredMesh;

    struct Named(String, &'static str);

    impl Component for Named {
        fn name(&self) -> &str {
            &self.0
        }
        fn kind(&self) -> &'static str {
            self.1
        }
        fn transform(&mut self, _: &mut TransformContext<'_>) -> Result<(), ComponentError> {
            Ok(())
        }
        fn finally(&mut self, _: &mut FinallyContext<'_>) -> Result<(), ComponentError> {
            Ok(())
        }
    }

    fn alpha(
        name: &str,
        _: &mut Options,
        _: &mut BuildContext<'_>,
    ) -> Result<Box<dyn Component>, ComponentError> {
        Ok(Box::new(Named(name.to_string(), "alpha")))
    }

    fn beta(
        name: &str,
        _: &mut Options,
        _: &mut BuildContext<'_>,
    ) -> Result<Box<dyn Component>, ComponentError> {
        Ok(Box::new(Named(name.to_string(), "beta")))
    }

    fn registry() -> ComponentRegistry {
        let mut r = ComponentRegistry::new();
        r.register("alpha", alpha).register("beta", beta);
        r
    }

    #[test]
    fn type_list_builds_one_component_per_tag() {
        let mesh = StructuredMesh::builder(1, 4, 1).build().unwrap();
        let mut store = VariableStore::new();
        let mut ctx = BuildContext::new(&mesh, &mut store);
        let mut opts = Options::new();
        opts.section_mut("d+").set("type", "alpha, beta");
        let built = registry().create("d+", &mut opts, &mut ctx).unwrap();
        let kinds: Vec<&str> = built.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, vec!["alpha", "beta"]);
        assert!(built.iter().all(|c| c.name() == "d+"));
    }

    #[test]
    fn type_defaults_to_section_name() {
        let mesh = StructuredMesh::builder(1, 4, 1).build().unwrap();
        let mut store = VariableStore::new();
        let mut ctx = BuildContext::new(&mesh, &mut store);
        let mut opts = Options::new();
        let built = registry().create("beta", &mut opts, &mut ctx).unwrap();
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].label(), "beta (beta)");
    }

    #[test]
    fn unknown_tag_lists_known_ones() {
        let mesh = StructuredMesh::builder(1, 4, 1).build().unwrap();
        let mut store = VariableStore::new();
        let mut ctx = BuildContext::new(&mesh, &mut store);
        let mut opts = Options::new();
        opts.section_mut("e").set("type", "gamma");
        let err = registry().create("e", &mut opts, &mut ctx).err().unwrap();
        assert_eq!(
            err,
            ComponentError::UnknownType {
                name: "e".into(),
                tag: "gamma".into(),
                known: vec!["alpha".into(), "beta".into()],
            }
        );
    }
}
