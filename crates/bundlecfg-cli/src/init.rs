use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};

use bundlecfg_core::constants::MANIFEST_NODE;
use bundlecfg_core::{resolve, ConfigFile};

use crate::Cli;
use tracing::{info, instrument};

/// Runs the `init` command to write a starter config.
#[instrument(skip(cli))]
pub fn run(cli: &Cli, template_selector: Option<&str>) -> Result<()> {
    let template = match template_selector {
        Some(value) => InitTemplate::from_str(value)?,
        None => detect_template(Path::new(".")),
    };

    write_if_absent(&cli.config, template.render_config(), cli.force)
        .with_context(|| format!("failed to write '{}'", cli.config))?;

    // The starter must itself resolve cleanly.
    let raw = ConfigFile::load_from_file(&cli.config)?.into_raw(&crate::builtin_registry())?;
    let resolved = resolve(raw)?;

    info!(
        "init complete: template={}, config={}, port={}",
        template.as_str(),
        cli.config,
        resolved.port()
    );
    println!("next: run 'bcfg resolve'");

    Ok(())
}

/// Supported starter configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitTemplate {
    /// Vue single-page app.
    Vue,
    /// No framework plugin.
    Plain,
}

impl InitTemplate {
    fn from_str(value: &str) -> Result<Self> {
        match value {
            "vue" => Ok(Self::Vue),
            "plain" => Ok(Self::Plain),
            other => Err(anyhow!(
                "unknown init template '{}' (supported: vue,plain)",
                other
            )),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Vue => "vue",
            Self::Plain => "plain",
        }
    }

    fn render_config(self) -> &'static str {
        match self {
            Self::Vue => r#"plugins = ["vue"]

[build]
out_dir = "dist"

[server]
port = 3001

[resolve.alias]
"@" = "/src"
"#,
            Self::Plain => r#"plugins = []

[build]
out_dir = "dist"

[server]
port = 3001

# "@" -> "/src" is always present; add or override entries here.
[resolve.alias]
"#,
        }
    }
}

fn detect_template(base: &Path) -> InitTemplate {
    match fs::read_to_string(base.join(MANIFEST_NODE)) {
        Ok(manifest) if manifest.contains("\"vue\"") => InitTemplate::Vue,
        _ => InitTemplate::Plain,
    }
}

fn write_if_absent(path: &str, content: &str, force: bool) -> Result<()> {
    let output = Path::new(path);

    if output.exists() && !force {
        return Err(anyhow!(
            "'{}' already exists. Re-run with --force to overwrite",
            path
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }

    fs::write(output, content)
        .with_context(|| format!("failed to write file '{}'", output.display()))
}
