use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::cli::{CommonArgs, CommonCommands, utils};
use common::config::{CONFIG, Configuration, OutputFormat};
use query_builder::{LokiQueryModeller, OperationCategory, OperationDef, VisualQuery};

/// LogQL Builder - assemble and render LogQL queries from visual query documents
#[derive(Parser)]
#[command(name = "logql-builder", version, about)]
pub struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a visual query JSON document to LogQL
    Render {
        /// Query document, `-` reads stdin
        query: PathBuf,
    },
    /// Add an operation to a query and print the result
    Add {
        /// Query document, `-` reads stdin
        query: PathBuf,
        /// Id of the operation to add, e.g. `sum` or `__line_contains`
        operation: String,
    },
    /// List the available operations
    Operations {
        #[arg(long, help = "Only list operations of this category")]
        category: Option<OperationCategory>,
    },
    /// Explain every operation of a query
    Explain {
        query: PathBuf,
    },
    /// Report label filters contradicting an earlier filter
    Conflicts {
        query: PathBuf,
    },
    #[command(flatten)]
    Common(CommonCommands),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        utils::init_logging(&self.common);

        let config = utils::load_config(self.common.config.as_ref())?;
        let config = CONFIG.get_or_init(|| config);
        let modeller = LokiQueryModeller::loki();

        match self.command {
            Commands::Render { query } => {
                let query = read_query(&query)?;
                println!("{}", render_output(&modeller, &query, config));
            }
            Commands::Add { query, operation } => {
                let query = read_query(&query)?;
                let query = modeller
                    .add_operation(&query, &operation)
                    .with_context(|| format!("Failed to add operation '{operation}'"))?;
                match config.output.format {
                    OutputFormat::Json => println!("{}", query.to_json()?),
                    OutputFormat::Text => println!("{}", render_output(&modeller, &query, config)),
                }
            }
            Commands::Operations { category } => {
                println!("{}", list_operations(&modeller, category, config)?);
            }
            Commands::Explain { query } => {
                let query = read_query(&query)?;
                println!("{}", explain_output(&modeller, &query));
            }
            Commands::Conflicts { query } => {
                let query = read_query(&query)?;
                let conflicts = modeller.conflicting_filters(&query);
                if conflicts.is_empty() {
                    log::info!("No conflicting label filters");
                }
                for index in conflicts {
                    println!(
                        "operation {index}: {}",
                        modeller.render_operations("", &query.operations[index..=index]).trim()
                    );
                }
            }
            Commands::Common(command) => {
                utils::handle_common_command(&command, config, &version_line())?
            }
        }
        Ok(())
    }
}

fn version_line() -> String {
    utils::version_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

fn read_query(path: &Path) -> Result<VisualQuery> {
    tracing::debug!(path = %path.display(), "Reading visual query");
    let json = if path.as_os_str() == "-" {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read query from stdin")?;
        json
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?
    };

    VisualQuery::from_json(&json).context("Failed to parse visual query")
}

fn render_output(modeller: &LokiQueryModeller, query: &VisualQuery, config: &Configuration) -> String {
    let rendered = modeller.render_query(query);
    if config.output.explain {
        format!("{rendered}\n\n{}", explain_output(modeller, query))
    } else {
        rendered
    }
}

fn explain_output(modeller: &LokiQueryModeller, query: &VisualQuery) -> String {
    modeller
        .explain_operations(query)
        .iter()
        .map(|explanation| format!("{}: {}", explanation.name, explanation.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_operations(
    modeller: &LokiQueryModeller,
    category: Option<OperationCategory>,
    config: &Configuration,
) -> Result<String> {
    let defs: Vec<&OperationDef> = modeller
        .registry()
        .all()
        .iter()
        .filter(|def| config.registry.include_hidden || !def.hide_from_list)
        .filter(|def| category.is_none_or(|category| def.category == category))
        .collect();

    let output = match config.output.format {
        OutputFormat::Json => {
            let entries: Vec<_> = defs
                .iter()
                .map(|def| {
                    serde_json::json!({
                        "id": def.id,
                        "name": def.name,
                        "category": def.category.to_string(),
                        "params": def.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
                        "hidden": def.hide_from_list,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&entries).context("Failed to serialize operations")?
        }
        OutputFormat::Text => defs
            .iter()
            .map(|def| format!("{:<32} {:<40} {}", def.id, def.name, def.category))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::OutputConfig;
    use std::io::Write;

    const QUERY: &str = r#"{
        "labels": [{"label": "app", "op": "=", "value": "api"}],
        "operations": [
            {"id": "logfmt", "params": [false, false]},
            {"id": "rate", "params": ["5m"]},
            {"id": "__sum_by", "params": ["job"]}
        ]
    }"#;

    fn query_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["logql-builder", "add", "q.json", "sum"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { ref operation, .. } if operation == "sum"));

        let cli = Cli::try_parse_from(["logql-builder", "-v", "operations", "--category", "range functions"])
            .unwrap();
        assert!(cli.common.verbose);
        assert!(matches!(
            cli.command,
            Commands::Operations { category: Some(OperationCategory::RangeFunctions) }
        ));

        let cli = Cli::try_parse_from(["logql-builder", "config", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Common(CommonCommands::Config { json: true })));
    }

    #[test]
    fn test_version_line_names_this_binary() {
        let version = version_line();
        assert!(version.starts_with(&format!("logql-builder {} (", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn test_read_and_render_query_file() {
        let file = query_file(QUERY);
        let query = read_query(file.path()).unwrap();
        let modeller = LokiQueryModeller::loki();

        assert_eq!(
            render_output(&modeller, &query, &Configuration::default()),
            "sum by(job) (rate({app=\"api\"} | logfmt [5m]))"
        );
    }

    #[test]
    fn test_render_with_explanations() {
        let file = query_file(QUERY);
        let query = read_query(file.path()).unwrap();
        let config = Configuration {
            output: OutputConfig {
                explain: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let output = render_output(&LokiQueryModeller::loki(), &query, &config);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("Logfmt: "));
        assert!(lines[4].starts_with("Sum by: "));
    }

    #[test]
    fn test_read_query_reports_bad_input() {
        let file = query_file("not json");
        let err = read_query(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse visual query");

        let err = read_query(Path::new("/nonexistent/query.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read query file"));
    }

    #[test]
    fn test_list_operations_hides_variants() {
        let modeller = LokiQueryModeller::loki();
        let mut config = Configuration::default();

        let listed = list_operations(&modeller, Some(OperationCategory::Aggregations), &config).unwrap();
        assert!(listed.lines().any(|line| line.starts_with("sum ")));
        assert!(!listed.contains("__sum_by"));

        config.registry.include_hidden = true;
        let listed = list_operations(&modeller, Some(OperationCategory::Aggregations), &config).unwrap();
        assert!(listed.contains("__sum_by"));
        assert!(!listed.contains("rate"));
    }

    #[test]
    fn test_list_operations_as_json() {
        let mut config = Configuration::default();
        config.output.format = OutputFormat::Json;

        let listed =
            list_operations(&LokiQueryModeller::loki(), Some(OperationCategory::Functions), &config)
                .unwrap();
        let entries: serde_json::Value = serde_json::from_str(&listed).unwrap();
        let ids: Vec<_> = entries
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["sort", "sort_desc"]);
    }
}
