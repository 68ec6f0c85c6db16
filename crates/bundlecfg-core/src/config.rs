use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};

use crate::plugin::{PluginDescriptor, PluginRegistry};
use crate::resolver::ResolveError;

/// Author-supplied configuration before defaults and validation.
///
/// `None` means the field was not given and will receive its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    pub plugins: Vec<PluginDescriptor>,
    pub out_dir: Option<String>,
    pub port: Option<i64>,
    pub aliases: Option<BTreeMap<String, String>>,
}

impl RawConfig {
    /// Stacks `other` on top of `self`.
    ///
    /// Scalars present in `other` win. Aliases are unioned with `other` taking
    /// precedence per key, and a non-empty plugin list in `other` replaces ours.
    pub fn overlay(mut self, other: RawConfig) -> RawConfig {
        if !other.plugins.is_empty() {
            self.plugins = other.plugins;
        }
        if other.out_dir.is_some() {
            self.out_dir = other.out_dir;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if let Some(extra) = other.aliases {
            self.aliases.get_or_insert_with(BTreeMap::new).extend(extra);
        }
        self
    }
}

/// Fully validated configuration handed to the bundler/dev-server runtime.
///
/// Only [`crate::resolver::ConfigResolver`] builds one, so holding a value
/// means every field passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub(crate) plugins: Vec<PluginDescriptor>,
    pub(crate) out_dir: String,
    pub(crate) port: u16,
    pub(crate) aliases: BTreeMap<String, String>,
}

impl ResolvedConfig {
    /// Plugins in the order the runtime must run them.
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn out_dir(&self) -> &str {
        &self.out_dir
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Converts back into raw input with every field explicitly set.
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            plugins: self.plugins.clone(),
            out_dir: Some(self.out_dir.clone()),
            port: Some(i64::from(self.port)),
            aliases: Some(self.aliases.clone()),
        }
    }

    /// Renders the resolved values in config file layout, plugins by name.
    pub fn to_file(&self) -> ConfigFile {
        ConfigFile {
            plugins: self.plugins.iter().map(|p| p.name().to_string()).collect(),
            build: BuildSection {
                out_dir: Some(self.out_dir.clone()),
            },
            server: ServerSection {
                port: Some(toml::Value::Integer(i64::from(self.port))),
            },
            resolve: ResolveSection {
                alias: Some(self.aliases.clone()),
            },
        }
    }
}

impl Serialize for ResolvedConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_file().serialize(serializer)
    }
}

/// On-disk configuration, laid out in the sections bundler configs use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub build: BuildSection,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub resolve: ResolveSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    #[serde(default, alias = "outDir", skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Kept untyped so a non-integer value surfaces as an invalid port
    /// instead of a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<toml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<BTreeMap<String, String>>,
}

impl ConfigFile {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let cfg = Self::parse(&text)
            .with_context(|| format!("failed to parse TOML config: {path}"))?;
        Ok(cfg)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str::<Self>(text)?)
    }

    /// Turns plugin names into descriptors and the port into an integer.
    ///
    /// # Errors
    /// Fails on an unknown plugin name, or with [`ResolveError::InvalidPort`]
    /// when `server.port` is not an integer.
    pub fn into_raw(self, registry: &PluginRegistry) -> Result<RawConfig> {
        let plugins = registry
            .descriptors_for(&self.plugins)
            .context("failed to resolve plugins")?;
        let port = self.server.port.map(port_from_value).transpose()?;

        Ok(RawConfig {
            plugins,
            out_dir: self.build.out_dir,
            port,
            aliases: self.resolve.alias,
        })
    }
}

fn port_from_value(value: toml::Value) -> Result<i64, ResolveError> {
    match value {
        toml::Value::Integer(port) => Ok(port),
        other => Err(ResolveError::InvalidPort {
            value: other.to_string(),
        }),
    }
}
