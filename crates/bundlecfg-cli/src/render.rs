use anyhow::{anyhow, Context, Result};

use bundlecfg_core::ResolvedConfig;

/// How `resolve` prints the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

impl OutputFormat {
    pub fn from_selector(selector: Option<&str>) -> Result<Self> {
        match selector {
            None | Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some(other) => Err(anyhow!(
                "unknown output format '{}' (supported: json,toml)",
                other
            )),
        }
    }
}

/// Renders `cfg` in config file layout so TOML output can be loaded back.
pub fn render(cfg: &ResolvedConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(cfg).context("failed to render config as JSON")
        }
        OutputFormat::Toml => {
            toml::to_string_pretty(cfg).context("failed to render config as TOML")
        }
    }
}

/// One-line summary printed by `check`.
pub fn summary(cfg: &ResolvedConfig) -> String {
    let plugins = cfg
        .plugins()
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "check ok: port={} out_dir={} plugins=[{}] aliases={}",
        cfg.port(),
        cfg.out_dir(),
        plugins,
        cfg.aliases().len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlecfg_core::{resolve, ConfigFile, PluginRegistry, RawConfig};

    #[test]
    fn selector_maps_to_format() {
        assert_eq!(OutputFormat::from_selector(None).unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_selector(Some("toml")).unwrap(),
            OutputFormat::Toml
        );
        assert!(OutputFormat::from_selector(Some("yaml")).is_err());
    }

    #[test]
    fn json_uses_file_layout() {
        let cfg = resolve(RawConfig::default()).unwrap();
        let out = render(&cfg, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["build"]["out_dir"], "dist");
        assert_eq!(value["server"]["port"], 3001);
        assert_eq!(value["resolve"]["alias"]["@"], "/src");
        assert_eq!(value["plugins"], serde_json::json!([]));
    }

    #[test]
    fn toml_output_loads_back_to_same_config() {
        let cfg = resolve(RawConfig {
            port: Some(4173),
            ..RawConfig::default()
        })
        .unwrap();
        let out = render(&cfg, OutputFormat::Toml).unwrap();

        let raw = ConfigFile::parse(&out)
            .unwrap()
            .into_raw(&PluginRegistry::default())
            .unwrap();
        assert_eq!(resolve(raw).unwrap(), cfg);
    }
}
