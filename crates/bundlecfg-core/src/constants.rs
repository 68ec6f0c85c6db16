//! Constants used across the bundlecfg workspace.

/// The filename for bundlecfg's primary configuration.
pub const CONFIG_FILE: &str = "bundlecfg.toml";

/// The manifest file for Node projects, inspected when picking an init template.
pub const MANIFEST_NODE: &str = "package.json";

/// Environment overrides for the dev-server port and build output directory.
pub const ENV_PORT: &str = "BUNDLECFG_PORT";
pub const ENV_OUT_DIR: &str = "BUNDLECFG_OUT_DIR";
