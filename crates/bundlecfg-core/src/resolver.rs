//! Turns a [`RawConfig`] into a [`ResolvedConfig`].
//!
//! Absent fields get defaults, present fields are validated, and aliases are
//! merged over the builtin set. Resolution either yields a complete config or
//! an error; nothing in between is observable.

use std::collections::BTreeMap;
use std::path::{Component, Path};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{RawConfig, ResolvedConfig};

/// Output directory used when none is configured.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Dev-server port used when none is configured.
pub const DEFAULT_PORT: u16 = 3001;

/// Aliases present in every resolved config unless overridden per key.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[("@", "/src")];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid server.port {value}: expected an integer in 1..=65535")]
    InvalidPort { value: String },
    #[error("invalid build.out_dir '{value}': must be a non-empty path")]
    InvalidOutputPath { value: String },
}

/// Stateless resolver; every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver;

impl ConfigResolver {
    /// Applies defaults and validation to `raw`.
    ///
    /// # Errors
    /// [`ResolveError::InvalidPort`] for a port outside `1..=65535`, and
    /// [`ResolveError::InvalidOutputPath`] for an empty or blank output path.
    #[instrument(skip_all)]
    pub fn resolve(&self, raw: RawConfig) -> Result<ResolvedConfig, ResolveError> {
        let port = match raw.port {
            Some(value) => validate_port(value)?,
            None => DEFAULT_PORT,
        };

        let out_dir = match raw.out_dir.as_deref() {
            Some(value) => normalize_out_dir(value)?,
            None => DEFAULT_OUT_DIR.to_string(),
        };

        let mut aliases: BTreeMap<String, String> = DEFAULT_ALIASES
            .iter()
            .map(|(key, target)| ((*key).to_string(), (*target).to_string()))
            .collect();
        for (key, target) in raw.aliases.unwrap_or_default() {
            if let Some(previous) = aliases.get(&key) {
                debug!("alias '{}' overrides '{}' with '{}'", key, previous, target);
            }
            aliases.insert(key, target);
        }

        debug!(
            "resolved config: port={}, out_dir={}, plugins={}, aliases={}",
            port,
            out_dir,
            raw.plugins.len(),
            aliases.len()
        );

        Ok(ResolvedConfig {
            plugins: raw.plugins,
            out_dir,
            port,
            aliases,
        })
    }
}

/// Shorthand for `ConfigResolver.resolve(raw)`.
pub fn resolve(raw: RawConfig) -> Result<ResolvedConfig, ResolveError> {
    ConfigResolver.resolve(raw)
}

fn validate_port(value: i64) -> Result<u16, ResolveError> {
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ResolveError::InvalidPort {
            value: value.to_string(),
        })
}

/// Trims the path, drops `.` components and trailing separators, and joins
/// with `/` so the result does not depend on the host platform.
fn normalize_out_dir(value: &str) -> Result<String, ResolveError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::InvalidOutputPath {
            value: value.to_string(),
        });
    }

    let mut prefix = String::new();
    let mut absolute = false;
    let mut parts = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Prefix(p) => prefix = p.as_os_str().to_string_lossy().into_owned(),
            Component::RootDir => absolute = true,
            Component::CurDir => {}
            other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
        }
    }

    let joined = parts.join("/");
    let normalized = match (absolute, joined.is_empty() && prefix.is_empty()) {
        (true, _) => format!("{prefix}/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => format!("{prefix}{joined}"),
    };
    Ok(normalized)
}
