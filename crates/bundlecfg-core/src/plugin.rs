use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::{debug, instrument};

/// Lifecycle points at which the external runtime may call into a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hook {
    Config,
    ConfigResolved,
    ConfigureServer,
    BuildStart,
    ResolveId,
    Load,
    Transform,
    HandleHotUpdate,
    BuildEnd,
    CloseBundle,
}

impl Hook {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::ConfigResolved => "configResolved",
            Self::ConfigureServer => "configureServer",
            Self::BuildStart => "buildStart",
            Self::ResolveId => "resolveId",
            Self::Load => "load",
            Self::Transform => "transform",
            Self::HandleHotUpdate => "handleHotUpdate",
            Self::BuildEnd => "buildEnd",
            Self::CloseBundle => "closeBundle",
        }
    }
}

impl Display for Hook {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract for framework-integration plugins.
///
/// The resolver never calls into a plugin; it only forwards descriptors to the
/// runtime in the order the author listed them.
pub trait Plugin: std::fmt::Debug + Send + Sync {
    /// Unique name of the plugin.
    fn name(&self) -> &str;
    /// The lifecycle hooks this plugin wants the runtime to invoke.
    fn hooks(&self) -> Vec<Hook>;
}

/// Opaque, cheaply cloneable handle to a plugin.
///
/// Two descriptors are equal only when they point at the same plugin instance.
#[derive(Debug, Clone)]
pub struct PluginDescriptor(Arc<dyn Plugin>);

impl PluginDescriptor {
    pub fn new(plugin: impl Plugin + 'static) -> Self {
        Self(Arc::new(plugin))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn hooks(&self) -> Vec<Hook> {
        self.0.hooks()
    }
}

impl From<Box<dyn Plugin>> for PluginDescriptor {
    fn from(plugin: Box<dyn Plugin>) -> Self {
        Self(Arc::from(plugin))
    }
}

impl PartialEq for PluginDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PluginDescriptor {}

/// Plugins known by name, used to turn `plugins = ["vue"]` into descriptors.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Registers a plugin, replacing any earlier plugin with the same name.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        let descriptor = PluginDescriptor::from(plugin);
        debug!("registering plugin: {}", descriptor.name());
        self.plugins
            .insert(descriptor.name().to_string(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<PluginDescriptor> {
        self.plugins.get(name).cloned()
    }

    /// Sorted names of every registered plugin.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Looks up descriptors for `names`, keeping the requested order.
    ///
    /// # Errors
    /// Returns an error naming the first unknown plugin and the known ones.
    #[instrument(skip(self))]
    pub fn descriptors_for(&self, names: &[String]) -> Result<Vec<PluginDescriptor>> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            match self.get(name) {
                Some(descriptor) => out.push(descriptor),
                None => bail!(
                    "unknown plugin '{}' (registered: {})",
                    name,
                    self.names().join(", ")
                ),
            }
        }
        Ok(out)
    }
}
