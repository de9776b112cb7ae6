//! Application context and state management.
//!
//! [`AppContext`] holds the catalog being worked on, where its selection
//! lives, and the registry that owns every change observable the tool
//! creates.

use std::path::{Path, PathBuf};

use anyhow::Context;
use prodconf::{
    Catalog, ChangeCause, ConfigurationEvent, ObservableRegistry, ProductConfiguration,
    SelectedOption, files,
};

/// Paths the tool reads from and writes to.
#[derive(Default, Clone, Debug)]
pub struct PathConfig {
    /// Catalog file.
    pub catalog: PathBuf,
    /// Selection file, explicit or derived from the catalog path.
    pub selection: Option<PathBuf>,
}

impl PathConfig {
    /// Resolve the selection path.
    ///
    /// An explicit path is used as given. Otherwise the default path next to
    /// the catalog is used only when that file exists.
    pub fn new(catalog: impl Into<PathBuf>, selection: Option<PathBuf>) -> Self {
        let catalog = catalog.into();
        let selection = selection.or_else(|| {
            let default = files::default_selection_path(&catalog);
            default.exists().then_some(default)
        });
        Self { catalog, selection }
    }
}

/// The main application context.
pub struct AppContext {
    pub paths: PathConfig,
    pub catalog: Catalog,
    registry: ObservableRegistry<ConfigurationEvent>,
}

impl AppContext {
    /// Load the catalog at `catalog` and resolve the selection path.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    pub fn load(catalog: impl AsRef<Path>, selection: Option<PathBuf>) -> anyhow::Result<Self> {
        let paths = PathConfig::new(catalog.as_ref(), selection);
        let catalog = files::load_catalog(&paths.catalog)?;
        Ok(Self {
            paths,
            catalog,
            registry: ObservableRegistry::new(),
        })
    }

    /// Read the current selection, empty when there is no selection file.
    pub fn selection(&self) -> anyhow::Result<Vec<SelectedOption>> {
        match &self.paths.selection {
            Some(path) => {
                debug!("Loading selection from {}", path.display());
                files::load_selection(path)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Build the configuration tree from the catalog and current selection.
    ///
    /// Every change made to the returned tree is logged.
    pub fn configuration(&self) -> anyhow::Result<ProductConfiguration> {
        let selection = self.selection()?;
        let changes = self.registry.create();
        changes.listen(log_change);
        ProductConfiguration::with_observable(&self.catalog, &selection, changes).with_context(
            || format!("Failed to build configuration for {}", self.paths.catalog.display()),
        )
    }

    /// Number of change observables still in use.
    pub fn live_observables(&self) -> usize {
        self.registry.live_count()
    }

    /// Drop every change listener the context installed.
    pub fn shutdown(&self) {
        self.registry.clear();
    }
}

fn log_change(event: &ConfigurationEvent) {
    match &event.cause {
        ChangeCause::Option { option, selected } => {
            info!("rev {}: option {option} -> {selected}", event.revision)
        }
        ChangeCause::ApiSelection { reset_others } => {
            info!("rev {}: selection applied (reset: {reset_others})", event.revision)
        }
    }
}
