//! Vue single-file-component integration, registered as `vue`.

use bundlecfg_core::{Hook, Plugin};

pub const PLUGIN_NAME: &str = "vue";

pub fn default_hooks() -> &'static [Hook] {
    &[
        Hook::Config,
        Hook::ConfigResolved,
        Hook::ConfigureServer,
        Hook::BuildStart,
        Hook::ResolveId,
        Hook::Load,
        Hook::Transform,
        Hook::HandleHotUpdate,
    ]
}

#[derive(Debug, Default)]
pub struct VuePlugin;

impl VuePlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for VuePlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn hooks(&self) -> Vec<Hook> {
        default_hooks().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlecfg_core::{resolve, PluginRegistry, RawConfig};

    #[test]
    fn registers_under_vue() {
        let mut registry = PluginRegistry::default();
        registry.register(Box::new(VuePlugin::new()));

        let descriptor = registry.get("vue").expect("vue should be registered");
        assert!(descriptor.hooks().contains(&Hook::Transform));
        assert!(!descriptor.hooks().contains(&Hook::CloseBundle));
    }

    #[test]
    fn passes_through_resolution() {
        let mut registry = PluginRegistry::default();
        registry.register(Box::new(VuePlugin::new()));
        let plugins = registry.descriptors_for(&["vue".to_string()]).unwrap();

        let cfg = resolve(RawConfig {
            plugins,
            ..RawConfig::default()
        })
        .unwrap();
        assert_eq!(cfg.plugins()[0].name(), "vue");
    }
}
