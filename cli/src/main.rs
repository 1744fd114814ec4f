//! Topicflow CLI: analyse conversation transcripts and render diagrams
//! without running the HTTP server.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::io::Read;
use std::path::{Path, PathBuf};
use topicflow::pipeline::reanalyze;
use topicflow::{
    AnalysisMode, AppConfig, ArgumentGraph, ComparisonMode, Diagrams, FlowDirection, MetricKind, Node, Pipeline,
    RenderOptions, Session, TimelineColoring,
};

#[derive(Parser)]
#[command(name = "topicflow", version, about = "Topic-drift analysis for argument graphs")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "TOPICFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Mode {
    TopicMap,
    Clusters,
    Timeline,
}

impl From<Mode> for AnalysisMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::TopicMap => AnalysisMode::TopicMap,
            Mode::Clusters => AnalysisMode::Clusters,
            Mode::Timeline => AnalysisMode::Timeline,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Metric {
    Similarity,
    Distance,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Comparison {
    /// Against the first node
    First,
    /// Against the previous node
    Previous,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Direction {
    Td,
    Lr,
}

/// Timeline coloring and flow layout; both coloring flags are required
#[derive(clap::Args)]
struct RenderArgs {
    /// Score that drives timeline colors
    #[arg(long)]
    metric: Metric,

    /// What each node's score compares against
    #[arg(long)]
    comparison: Comparison,

    /// Flow diagram direction
    #[arg(long, default_value = "td")]
    direction: Direction,

    /// Directory for the rendered artifacts
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

impl RenderArgs {
    fn options(&self) -> RenderOptions {
        RenderOptions {
            timeline: TimelineColoring {
                metric: match self.metric {
                    Metric::Similarity => MetricKind::Similarity,
                    Metric::Distance => MetricKind::Distance,
                },
                mode: match self.comparison {
                    Comparison::First => ComparisonMode::ReferencePoint,
                    Comparison::Previous => ComparisonMode::Sequential,
                },
            },
            flow_direction: match self.direction {
                Direction::Td => FlowDirection::TopDown,
                Direction::Lr => FlowDirection::LeftRight,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, embed, analyse and render a transcript
    Analyze {
        /// Transcript file, or "-" for stdin
        input: String,

        /// Analysis pass (defaults to the configured one)
        #[arg(long)]
        mode: Option<Mode>,

        /// Skip embedding and analysis
        #[arg(long)]
        no_analysis: bool,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Render a saved graph or session
    Render {
        /// Graph or session JSON file
        graph: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Print per-node topic metrics of a saved graph or session
    Metrics {
        /// Graph or session JSON file
        graph: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "topicflow=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Analyze {
            input,
            mode,
            no_analysis,
            render,
        } => run_analyze(&cli, input, *mode, *no_analysis, render).await,
        Commands::Render { graph, render } => run_render(graph, render, &cli.format),
        Commands::Metrics { graph } => run_metrics(graph, &cli.format),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_analyze(
    cli: &Cli,
    input: &str,
    mode: Option<Mode>,
    no_analysis: bool,
    render: &RenderArgs,
) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let text = read_input(input)?;

    let mode = match (no_analysis, mode) {
        (true, _) => None,
        (false, Some(mode)) => Some(mode.into()),
        (false, None) => config.analysis.topic_analysis.then_some(config.analysis.mode),
    };

    let pipeline = Pipeline::from_config(&config)?;
    let session = pipeline.run_with_mode(&text, mode).await?;
    if let Some(reason) = &session.analysis_error {
        eprintln!("Warning: topic analysis skipped: {}", reason);
    }

    let diagrams = session.render(&render.options());
    write_artifacts(&render.out_dir, Some(&session), &diagrams)?;
    print_nodes(&session.graph, &cli.format)
}

fn run_render(path: &Path, render: &RenderArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let graph = load_graph(path)?;
    let diagrams = topicflow::render_all(&graph, &render.options());
    write_artifacts(&render.out_dir, None, &diagrams)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&diagrams)?),
        _ => {
            println!("Topic map: {}", availability(diagrams.topic_map.is_some()));
            println!("Timeline:  {}", availability(diagrams.timeline.is_some()));
            println!("Flow:      {} lines", diagrams.flow.as_str().lines().count());
        }
    }
    Ok(())
}

fn run_metrics(path: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let mut graph = load_graph(path)?;
    if graph.nodes().any(|n| n.metrics().is_none()) {
        reanalyze(&mut graph, AnalysisMode::Timeline, 0)
            .context("graph has no topic metrics and could not be scored")?;
    }

    let header = [
        "id",
        "sequence",
        "speaker",
        "similarity_to_first",
        "distance_to_first",
        "similarity_to_previous",
        "distance_to_previous",
    ];
    let rows: Vec<Vec<String>> = graph
        .sequence_order()
        .into_iter()
        .filter_map(|idx| graph.node_at(idx))
        .map(|node| {
            let mut row = vec![
                node.id.to_string(),
                node.sequence.map(|s| s.to_string()).unwrap_or_default(),
                node.speaker.clone().unwrap_or_default(),
            ];
            if let Some(m) = node.metrics() {
                row.extend(
                    [
                        m.similarity_to_first,
                        m.distance_to_first,
                        m.similarity_to_previous,
                        m.distance_to_previous,
                    ]
                    .iter()
                    .map(|v| format!("{:.4}", v)),
                );
            }
            row
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = graph
                .nodes()
                .map(|n| serde_json::json!({ "id": n.id, "sequence": n.sequence, "metrics": n.metrics() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|c| format_csv_value(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);
            for row in rows {
                table.add_row(row);
            }
            println!("{}", table);
        }
    }
    Ok(())
}

fn print_nodes(graph: &ArgumentGraph, format: &OutputFormat) -> anyhow::Result<()> {
    let header = ["id", "type", "speaker", "sequence", "state", "content"];
    let row = |n: &Node| {
        vec![
            n.id.to_string(),
            n.node_type.to_string(),
            n.speaker.clone().unwrap_or_default(),
            n.sequence.map(|s| s.to_string()).unwrap_or_default(),
            n.analysis.name().to_string(),
            n.content.clone(),
        ]
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(graph)?),
        OutputFormat::Csv => {
            println!("{}", header.join(","));
            for node in graph.nodes() {
                let cells: Vec<String> = row(node).iter().map(|c| format_csv_value(c)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if graph.is_empty() {
                println!("(no nodes)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);
            for node in graph.nodes() {
                table.add_row(row(node));
            }
            println!("{}", table);
            println!("{} node(s), {} edge(s)", graph.node_count(), graph.edge_count());
        }
    }
    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };
    if text.trim().is_empty() {
        bail!("input is empty");
    }
    Ok(text)
}

/// Accept either a bare graph or a saved session
fn load_graph(path: &Path) -> anyhow::Result<ArgumentGraph> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    if value.get("graph").is_some() {
        let session: Session = serde_json::from_value(value)?;
        Ok(session.graph)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

fn write_artifacts(dir: &Path, session: Option<&Session>, diagrams: &Diagrams) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;
    if let Some(session) = session {
        std::fs::write(dir.join("session.json"), serde_json::to_string_pretty(session)?)?;
    }
    std::fs::write(dir.join("flow.mmd"), diagrams.flow.as_str())?;
    if let Some(spec) = &diagrams.topic_map {
        std::fs::write(dir.join("topic_map.vl.json"), serde_json::to_string_pretty(spec)?)?;
    }
    if let Some(spec) = &diagrams.timeline {
        std::fs::write(dir.join("timeline.vl.json"), serde_json::to_string_pretty(spec)?)?;
    }
    eprintln!("Wrote artifacts to {}", dir.display());
    Ok(())
}

fn availability(present: bool) -> &'static str {
    if present {
        "written"
    } else {
        "not renderable"
    }
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
