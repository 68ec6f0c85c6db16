//! Core logic for bundlecfg.
//!
//! This crate defines the raw and resolved bundler configuration, the config
//! file layout, the opaque plugin model, and the resolver that validates and
//! defaults a configuration before a build/dev-server runtime consumes it.

pub mod command;
pub mod config;
pub mod constants;
pub mod plugin;
pub mod resolver;

pub use command::{CommandRef, PrimaryCommand};
pub use config::{ConfigFile, RawConfig, ResolvedConfig};
pub use plugin::{Hook, Plugin, PluginDescriptor, PluginRegistry};
pub use resolver::{resolve, ConfigResolver, ResolveError};
