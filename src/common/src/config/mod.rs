use std::path::Path;

use serde::{Deserialize, Serialize};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use once_cell::sync::OnceCell;

pub static CONFIG: OnceCell<Configuration> = OnceCell::new();

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logql-builder.toml";

/// Prefix for environment overrides, nested keys are split on `__`
pub const ENV_PREFIX: &str = "LOGQL_BUILDER__";

/// Settings for how the operation registry is presented
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Include grouping variants that are normally hidden from operation lists
    pub include_hidden: bool,
}

/// How queries are printed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered LogQL text
    #[default]
    Text,
    /// The structured visual query as JSON
    Json,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print the explanation of every operation after the rendered query
    pub explain: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Operation registry presentation
    pub registry: RegistryConfig,
    /// Output settings for the command-line tool
    pub output: OutputConfig,
}

impl Configuration {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Configuration::default()))
    }

    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    /// Load configuration from an explicit file, still honouring env overrides
    pub fn load_from_path(path: &Path) -> Result<Self, Box<figment::Error>> {
        let config = Self::figment()
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_configuration() {
        let config = Configuration::default();

        assert!(!config.registry.include_hidden);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.explain);
    }

    #[test]
    fn test_configless_operation() {
        let config = Figment::from(Serialized::defaults(Configuration::default()))
            .extract::<Configuration>()
            .unwrap();

        assert!(!config.registry.include_hidden);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_toml_and_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [registry]
                include_hidden = true

                [output]
                format = "json"
                "#,
            )?;
            jail.set_env("LOGQL_BUILDER__OUTPUT__EXPLAIN", "true");

            let config = Configuration::load().map_err(|e| e.to_string())?;

            assert!(config.registry.include_hidden);
            assert_eq!(config.output.format, OutputFormat::Json);
            assert!(config.output.explain);
            Ok(())
        });
    }

    #[test]
    fn test_env_var_beats_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[output]\nformat = \"json\"\n")?;
            jail.set_env("LOGQL_BUILDER__OUTPUT__FORMAT", "text");

            let config = Configuration::load().map_err(|e| e.to_string())?;
            assert_eq!(config.output.format, OutputFormat::Text);
            Ok(())
        });
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[registry]\ninclude_hidden = true").unwrap();

        let config = Configuration::load_from_path(file.path()).unwrap();
        assert!(config.registry.include_hidden);
        assert_eq!(config.output.format, OutputFormat::Text);
    }
}
