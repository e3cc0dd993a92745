//! AgentEval CLI
//!
//! ## Commands
//!
//! - `run`: Evaluate a batch with all enabled tiers and emit the consolidated report
//! - `graph`: Export an interaction graph as node-link JSON or GraphML

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;

use agenteval_core::{
    load_config, write_graph_export, write_report_json, AgentInteraction, ConsolidatedReport,
    DeterministicJudge, EvaluationPipeline, GraphComplexityAnalyzer, GraphExportFormat, HttpJudge,
    JudgeModel, LogSettings, ObservabilityConfig, PipelineConfig, PipelineInput, COUNTERS,
};

#[derive(Parser)]
#[command(name = "agenteval")]
#[command(author = "AgentEval Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Three-tier evaluation of multi-agent runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the evaluation pipeline over one input batch
    Run {
        /// Pipeline configuration (JSON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input batch (JSON): traditional, interactions, agent_reviews, baseline_reviews
        #[arg(short, long)]
        input: PathBuf,

        /// Write the report here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Use the local deterministic judge instead of the hosted model
        #[arg(long)]
        offline: bool,
    },

    /// Export the interaction graph built from a list of interactions
    Graph {
        /// Interactions (JSON array)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: GraphExportFormat,

        /// Write the export here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        command,
    } = Cli::parse();

    let outcome = match command {
        Commands::Run {
            config,
            input,
            output,
            seed,
            offline,
        } => {
            let config = resolve_config(config.as_deref(), seed)?;
            log_settings(&config.observability, json, verbose).init();
            cmd_run(config, &input, output.as_deref(), offline).await
        }
        Commands::Graph {
            input,
            format,
            output,
        } => {
            log_settings(&ObservabilityConfig::default(), json, verbose).init();
            cmd_graph(&input, format, output.as_deref())
        }
    };

    COUNTERS.flush();
    outcome
}

/// Configured logging with `--json` / `--verbose` applied on top.
fn log_settings(config: &ObservabilityConfig, json: bool, verbose: bool) -> LogSettings {
    LogSettings::from_config(config).with_overrides(json, verbose)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("parse {:?}", path))
}

fn resolve_config(path: Option<&Path>, seed: Option<u64>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(p) => load_config(p).with_context(|| format!("load config {:?}", p))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

/// Run the pipeline and print or write the consolidated report
async fn cmd_run(
    config: PipelineConfig,
    input_path: &Path,
    output: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let input: PipelineInput = read_json(input_path)?;

    let judge: Arc<dyn JudgeModel> = if offline {
        Arc::new(DeterministicJudge::new())
    } else {
        Arc::new(HttpJudge::from_config(&config.judge).context("configure hosted judge")?)
    };

    let mut pipeline = EvaluationPipeline::new(config, judge)?;
    info!(seed = pipeline.seed(), "Running evaluation pipeline");
    let result = pipeline.run(&input).await?;
    let report = ConsolidatedReport::from_result(&result);

    match output {
        Some(path) => {
            write_report_json(path, &report)?;
            println!("{}", report.summary);
            println!("Report written to {:?}", path);
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Build the interaction graph and export it
fn cmd_graph(input_path: &Path, format: GraphExportFormat, output: Option<&Path>) -> Result<()> {
    let interactions: Vec<AgentInteraction> = read_json(input_path)?;
    let analyzer = GraphComplexityAnalyzer::default();
    let graph = analyzer.build_graph(&interactions);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Interaction graph built"
    );

    match output {
        Some(path) => {
            write_graph_export(path, &graph, format)?;
            println!(
                "Wrote {} graph ({} nodes, {} edges) to {:?}",
                format,
                graph.node_count(),
                graph.edge_count(),
                path
            );
        }
        None => {
            let rendered = match format {
                GraphExportFormat::Json => analyzer.export_to_json(&graph)?,
                GraphExportFormat::Graphml => analyzer.export_to_graphml(&graph)?,
            };
            println!("{rendered}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "agenteval", "--json", "run", "--input", "batch.json", "--seed", "42", "--offline",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Run {
                seed,
                offline,
                config,
                ..
            } => {
                assert_eq!(seed, Some(42));
                assert!(offline);
                assert!(config.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn parses_graph_format() {
        let cli = Cli::try_parse_from([
            "agenteval", "graph", "--input", "i.json", "--format", "graphml",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Graph {
                format: GraphExportFormat::Graphml,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["agenteval", "graph", "-i", "i.json", "-f", "dot"]).is_err());
    }

    #[test]
    fn seed_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"seed": 1}"#).unwrap();
        let config = resolve_config(Some(&path), Some(9)).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(resolve_config(Some(&path), None).unwrap().seed, Some(1));
    }

    #[test]
    fn config_drives_logging_unless_flags_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(
            &path,
            r#"{"observability": {"json": true, "log_level": "warn"}}"#,
        )
        .unwrap();
        let config = resolve_config(Some(&path), None).unwrap();

        let settings = log_settings(&config.observability, false, false);
        assert!(settings.json);
        assert_eq!(settings.level, tracing::Level::WARN);

        let verbose = log_settings(&config.observability, false, true);
        assert!(verbose.json);
        assert_eq!(verbose.level, tracing::Level::DEBUG);

        let defaults = log_settings(&ObservabilityConfig::default(), false, false);
        assert!(!defaults.json);
        assert_eq!(defaults.level, tracing::Level::INFO);
    }

    #[tokio::test]
    async fn offline_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("batch.json");
        std::fs::write(
            &input,
            r#"{
                "traditional": {"events": {
                    "start_time": "2025-01-01T00:00:00Z",
                    "end_time": "2025-01-01T00:00:10Z",
                    "task_outcomes": [true, false]
                }},
                "interactions": [
                    {"from_agent": "a", "to_agent": "b", "interaction_type": "msg",
                     "timestamp": "2025-01-01T00:00:01Z"}
                ]
            }"#,
        )
        .unwrap();
        let output = dir.path().join("out/report.json");
        let config = resolve_config(None, Some(42)).unwrap();
        cmd_run(config, &input, Some(&output), true).await.unwrap();

        let report: serde_json::Value = read_json(&output).unwrap();
        assert_eq!(report["seed"], 42);
        assert_eq!(report["traditional_metrics"]["success_rate"], 0.5);
        assert_eq!(report["graph_metrics"]["num_nodes"], 2);
        assert_eq!(report["judge"]["status"], "skipped_no_input");
    }
}
