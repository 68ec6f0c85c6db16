use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use bundlecfg_core::constants::{CONFIG_FILE, ENV_OUT_DIR, ENV_PORT};
use bundlecfg_core::{
    resolve, CommandRef, ConfigFile, PluginRegistry, PrimaryCommand, RawConfig, ResolvedConfig,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod init;
mod render;
mod styles;

use render::OutputFormat;

/// The command-line interface for bundlecfg.
#[derive(Debug, Parser)]
#[command(name = "bcfg")]
#[command(version)]
#[command(styles = styles::clap_styles())]
#[command(about = "Validate and resolve bundler/dev-server configuration")]
#[command(
    long_about = "bundlecfg loads a bundler configuration file, layers command-line and
environment overrides on top, applies defaults and validation, and prints
the resolved configuration a build or dev-server runtime should use.

Commands:
  init[:vue|plain]     Write a starter bundlecfg.toml
  resolve[:json|toml]  Print the resolved configuration
  check                Validate only
"
)]
pub(crate) struct Cli {
    /// Command in canonical form, for example: `resolve:toml`, `init:vue`
    command: Option<String>,
    /// Optional selector (supports `bcfg resolve toml` style)
    selector: Option<String>,
    /// Path to the config file.
    #[arg(long, default_value = CONFIG_FILE)]
    config: String,
    /// Override the dev-server port.
    #[arg(long, env = ENV_PORT, allow_negative_numbers = true)]
    port: Option<i64>,
    /// Override the build output directory.
    #[arg(long, env = ENV_OUT_DIR)]
    out_dir: Option<String>,
    /// Add or override a path alias, repeatable.
    #[arg(long = "alias", value_name = "KEY=TARGET", value_parser = parse_alias)]
    aliases: Vec<(String, String)>,
    /// Overwrite an existing config on `init`.
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn parse_alias(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, target)) if !key.is_empty() => Ok((key.to_string(), target.to_string())),
        _ => Err(format!("expected KEY=TARGET, got '{value}'")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    debug!("parsed cli arguments: {:?}", cli);

    let command_name = match &cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            return Ok(());
        }
    };

    let command_text = match &cli.selector {
        Some(selector) => format!("{}:{}", command_name, selector),
        None => command_name.clone(),
    };

    let command = CommandRef::from_str(&command_text)
        .map_err(|e| anyhow!("failed to parse command '{}': {e}", command_text))?;

    if command.primary == PrimaryCommand::Init {
        return init::run(&cli, command.selector.as_deref());
    }

    let output = execute(&cli, &builtin_registry(), &command)?;
    println!("{output}");
    Ok(())
}

/// Plugins that can be named in a config file.
pub(crate) fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::default();
    registry.register(Box::new(bundlecfg_plugin_vue::VuePlugin::new()));
    registry
}

/// Overrides given on the command line or through the environment.
fn flag_overrides(cli: &Cli) -> RawConfig {
    let aliases = (!cli.aliases.is_empty())
        .then(|| cli.aliases.iter().cloned().collect::<BTreeMap<_, _>>());
    RawConfig {
        plugins: Vec::new(),
        out_dir: cli.out_dir.clone(),
        port: cli.port,
        aliases,
    }
}

/// Loads the config file, layers overrides and resolves.
///
/// A missing file is only tolerated at the default location, where it means
/// "use defaults".
fn load_resolved(cli: &Cli, registry: &PluginRegistry) -> Result<ResolvedConfig> {
    let file = if cli.config == CONFIG_FILE && !Path::new(&cli.config).exists() {
        info!("no {} found, using defaults", CONFIG_FILE);
        ConfigFile::default()
    } else {
        ConfigFile::load_from_file(&cli.config)
            .with_context(|| format!("unable to load config '{}'", cli.config))?
    };

    let raw = file
        .into_raw(registry)
        .with_context(|| format!("invalid configuration in '{}'", cli.config))?
        .overlay(flag_overrides(cli));

    resolve(raw).with_context(|| format!("invalid configuration in '{}'", cli.config))
}

/// Runs a non-init command and returns what should be printed.
fn execute(cli: &Cli, registry: &PluginRegistry, command: &CommandRef) -> Result<String> {
    match command.primary {
        PrimaryCommand::Resolve => {
            let format = OutputFormat::from_selector(command.selector.as_deref())?;
            let cfg = load_resolved(cli, registry)?;
            render::render(&cfg, format)
        }
        PrimaryCommand::Check => {
            if let Some(selector) = &command.selector {
                bail!("'check' does not take a selector (got '{}')", selector);
            }
            let cfg = load_resolved(cli, registry)?;
            Ok(render::summary(&cfg))
        }
        PrimaryCommand::Init => bail!("'init' is handled before configuration is loaded"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bundlecfg_core::ResolveError;
    use std::fs;
    use tempfile::tempdir;

    pub(crate) fn test_cli(config: &str) -> Cli {
        Cli {
            command: Some("resolve".to_string()),
            selector: None,
            config: config.to_string(),
            port: None,
            out_dir: None,
            aliases: Vec::new(),
            force: false,
        }
    }

    fn write_config(dir: &Path, text: &str) -> String {
        let path = dir.join("bundlecfg.toml");
        fs::write(&path, text).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn resolve_json_from_file() {
        let dir = tempdir().unwrap();
        let config = write_config(
            dir.path(),
            "plugins = [\"vue\"]\n[server]\nport = 3001\n[resolve.alias]\n\"~\" = \"/lib\"\n",
        );
        let cli = test_cli(&config);
        let cmd = CommandRef::from_str("resolve").unwrap();

        let out = execute(&cli, &builtin_registry(), &cmd).expect("resolve should succeed");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["plugins"], serde_json::json!(["vue"]));
        assert_eq!(value["build"]["out_dir"], "dist");
        assert_eq!(value["resolve"]["alias"]["@"], "/src");
        assert_eq!(value["resolve"]["alias"]["~"], "/lib");
    }

    #[test]
    fn flags_override_file_values() {
        let dir = tempdir().unwrap();
        let config = write_config(
            dir.path(),
            "[build]\nout_dir = \"dist\"\n[server]\nport = 3001\n",
        );
        let mut cli = test_cli(&config);
        cli.port = Some(8080);
        cli.out_dir = Some("./public/".to_string());
        cli.aliases = vec![("@".to_string(), "/app".to_string())];

        let cfg = load_resolved(&cli, &builtin_registry()).unwrap();
        assert_eq!(cfg.port(), 8080);
        assert_eq!(cfg.out_dir(), "public");
        assert_eq!(cfg.aliases().get("@").map(String::as_str), Some("/app"));
    }

    #[test]
    fn invalid_port_halts_with_typed_error() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path(), "[server]\nport = 70000\n");
        let cli = test_cli(&config);
        let cmd = CommandRef::from_str("check").unwrap();

        let err = execute(&cli, &builtin_registry(), &cmd).expect_err("must fail");
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::InvalidPort { .. })
        ));
        assert!(format!("{err:#}").contains("server.port"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = test_cli(missing.to_str().unwrap());
        let cmd = CommandRef::from_str("resolve").unwrap();
        assert!(execute(&cli, &builtin_registry(), &cmd).is_err());
    }

    #[test]
    fn check_prints_summary() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path(), "plugins = [\"vue\"]\n");
        let cli = test_cli(&config);
        let cmd = CommandRef::from_str("check").unwrap();

        let out = execute(&cli, &builtin_registry(), &cmd).unwrap();
        assert_eq!(
            out,
            "check ok: port=3001 out_dir=dist plugins=[vue] aliases=1"
        );

        let with_selector = CommandRef::from_str("check:strict").unwrap();
        assert!(execute(&cli, &builtin_registry(), &with_selector).is_err());
    }

    #[test]
    fn resolve_toml_renders_sections() {
        let dir = tempdir().unwrap();
        let config = write_config(dir.path(), "");
        let cli = test_cli(&config);
        let cmd = CommandRef::from_str("resolve:toml").unwrap();

        let out = execute(&cli, &builtin_registry(), &cmd).unwrap();
        assert!(out.contains("[server]"));
        assert!(out.contains("port = 3001"));
        assert!(out.contains("[resolve.alias]"));
    }

    #[test]
    fn parses_alias_flags() {
        assert_eq!(
            parse_alias("~=/lib").unwrap(),
            ("~".to_string(), "/lib".to_string())
        );
        assert!(parse_alias("no-separator").is_err());
        assert!(parse_alias("=/lib").is_err());
    }
}
