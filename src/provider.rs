//! Registry of local repository manager factories.

use std::sync::Arc;

use log::info;

use crate::artifact::LocalRepository;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::manager::{
    EnhancedLocalRepositoryManagerFactory, LocalRepositoryManager, LocalRepositoryManagerFactory,
    SimpleLocalRepositoryManagerFactory,
};
use crate::selector::{ComponentRegistry, PrioritizedComponents, Selected};

/// Selection namespace of the local repository manager factories.
pub const SELECTION_NAMESPACE: &str = "local-repository-manager";

/// Creates the manager of a local repository by running the component
/// selector over the registered factories
pub struct LocalRepositoryProvider {
    factories: ComponentRegistry<dyn LocalRepositoryManagerFactory>,
}

impl Default for LocalRepositoryProvider {
    /// The built-in factories: `enhanced` (priority 10) and `simple`
    /// (priority 0).
    fn default() -> Self {
        let mut factories: ComponentRegistry<dyn LocalRepositoryManagerFactory> =
            ComponentRegistry::new();
        factories.register(
            "enhanced",
            10.0,
            Arc::new(EnhancedLocalRepositoryManagerFactory::default()),
        );
        factories.register("simple", 0.0, Arc::new(SimpleLocalRepositoryManagerFactory));
        Self::new(factories)
    }
}

impl LocalRepositoryProvider {
    pub fn new(factories: ComponentRegistry<dyn LocalRepositoryManagerFactory>) -> Self {
        Self { factories }
    }

    pub fn factories(&self) -> &ComponentRegistry<dyn LocalRepositoryManagerFactory> {
        &self.factories
    }

    /// Selects a manager for `repository`.
    ///
    /// The first factory in rank order that accepts the repository wins. When
    /// every factory declines, the error reports each one's reason.
    pub fn new_manager(
        &self,
        config: &SessionConfig,
        repository: &LocalRepository,
    ) -> Result<Selected<Box<dyn LocalRepositoryManager>>> {
        let candidates = PrioritizedComponents::rank(&self.factories, config, SELECTION_NAMESPACE)?;
        let selected = candidates.select(&format!("local repository {}", repository), |factory| {
            factory.new_instance(config, repository)
        })?;
        info!(
            "Using {} local repository manager for {}",
            selected.name,
            repository.base_path().display()
        );
        Ok(selected)
    }
}
