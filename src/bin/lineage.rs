//! Lineage CLI — predicate lineage discovery over clearance documents.
//!
//! Usage:
//!   lineage build <SEED>... [--depth N] [--data-dir path]
//!   lineage export <SEED> [--format dot|edges|json] [--include-terminal]
//!   lineage predicates <NUMBER>
//!   lineage catalog sync

use clap::{Parser, Subcommand, ValueEnum};
use lineage::{
    render, ApprovalId, Catalog, DiscoveryPipeline, GraphBuilder, LineageGraph, PipelineConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "lineage",
    version,
    about = "Predicate lineage graphs for medical-device clearances"
)]
struct Cli {
    /// Root directory for documents, page text, and predicate caches
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover predicate lineages from one or more seed numbers
    Build {
        /// Seed clearance numbers (e.g. K173585)
        #[arg(required = true)]
        seeds: Vec<String>,
        /// Maximum breadth-first depth (unbounded when omitted)
        #[arg(long)]
        depth: Option<usize>,
        /// Worker-pool width within one level
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Build (or reuse caches) and print one seed's subgraph
    Export {
        /// Seed clearance number
        seed: String,
        #[arg(long, value_enum, default_value = "dot")]
        format: ExportFormat,
        /// Keep dead-end edges into the terminal sentinel
        #[arg(long)]
        include_terminal: bool,
        /// Maximum breadth-first depth (unbounded when omitted)
        #[arg(long)]
        depth: Option<usize>,
        /// Worker-pool width within one level
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Print the predicate set of a single clearance number
    Predicates {
        /// Clearance number
        number: String,
    },
    /// Manage the bulk clearance catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// Graphviz DOT
    Dot,
    /// One `left -> right` pair per line
    Edges,
    /// JSON array of [left, right] pairs
    Json,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Download any missing listing archives and report the corpus size
    Sync,
}

fn parse_seed(raw: &str) -> Result<ApprovalId, i32> {
    ApprovalId::parse(raw).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

fn open_pipeline(config: &PipelineConfig) -> Result<Arc<DiscoveryPipeline>, i32> {
    DiscoveryPipeline::from_config(config).map(Arc::new).map_err(|e| {
        eprintln!("Error: {}", e);
        1
    })
}

async fn build_graph(
    config: &PipelineConfig,
    seeds: &[ApprovalId],
    depth: Option<usize>,
) -> Result<LineageGraph, i32> {
    let pipeline = open_pipeline(config)?;
    let builder = GraphBuilder::new(pipeline).with_concurrency(config.concurrency);
    let mut graph = LineageGraph::new();
    for seed in seeds {
        let outcome = builder.populate(&mut graph, seed, depth).await;
        if outcome.truncated {
            eprintln!(
                "Warning: depth bound reached for {}; {} discovered numbers left unexpanded",
                seed,
                outcome.residual_frontier.len()
            );
        }
    }
    Ok(graph)
}

async fn cmd_build(config: PipelineConfig, seeds: Vec<String>, depth: Option<usize>) -> i32 {
    let mut parsed = Vec::with_capacity(seeds.len());
    for raw in &seeds {
        match parse_seed(raw) {
            Ok(seed) => parsed.push(seed),
            Err(code) => return code,
        }
    }
    match build_graph(&config, &parsed, depth).await {
        Ok(graph) => {
            println!(
                "{} nodes, {} edges from {} seed(s)",
                graph.node_count(),
                graph.edge_count(),
                parsed.len()
            );
            0
        }
        Err(code) => code,
    }
}

async fn cmd_export(
    config: PipelineConfig,
    seed: String,
    format: ExportFormat,
    include_terminal: bool,
    depth: Option<usize>,
) -> i32 {
    let seed = match parse_seed(&seed) {
        Ok(seed) => seed,
        Err(code) => return code,
    };
    let graph = match build_graph(&config, std::slice::from_ref(&seed), depth).await {
        Ok(graph) => graph,
        Err(code) => return code,
    };
    let edges = lineage::graph::subgraph(&graph, &seed).edge_list();
    let keep: fn(&str, &str) -> bool = if include_terminal {
        render::include_all
    } else {
        render::excludes_terminal
    };

    let mut stdout = std::io::stdout().lock();
    let written = match format {
        ExportFormat::Dot => render::write_dot(&mut stdout, &edges, keep),
        ExportFormat::Edges => {
            use std::io::Write;
            edges
                .iter()
                .filter(|(l, r)| keep(l, r))
                .try_for_each(|(l, r)| writeln!(stdout, "{} -> {}", l, r))
        }
        ExportFormat::Json => {
            use std::io::Write;
            let kept: Vec<_> = edges.iter().filter(|(l, r)| keep(l, r)).collect();
            serde_json::to_string_pretty(&kept)
                .map_err(std::io::Error::other)
                .and_then(|json| writeln!(stdout, "{}", json))
        }
    };
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_predicates(config: PipelineConfig, number: String) -> i32 {
    let number = match parse_seed(&number) {
        Ok(number) => number,
        Err(code) => return code,
    };
    let pipeline = match open_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(code) => return code,
    };
    match pipeline.predicates_of(&number).await {
        Ok(predicates) => {
            for predicate in predicates {
                println!("{}", predicate);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

async fn cmd_catalog_sync(config: PipelineConfig) -> i32 {
    let catalog = Catalog::new(config.catalog_root());
    match catalog.known_numbers().await {
        Ok(numbers) => {
            println!("{} clearance numbers known", numbers.len());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = PipelineConfig::new();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }

    let code = match cli.command {
        Commands::Build {
            seeds,
            depth,
            concurrency,
        } => cmd_build(config.with_concurrency(concurrency), seeds, depth).await,
        Commands::Export {
            seed,
            format,
            include_terminal,
            depth,
            concurrency,
        } => {
            cmd_export(
                config.with_concurrency(concurrency),
                seed,
                format,
                include_terminal,
                depth,
            )
            .await
        }
        Commands::Predicates { number } => cmd_predicates(config, number).await,
        Commands::Catalog { action } => match action {
            CatalogAction::Sync => cmd_catalog_sync(config).await,
        },
    };
    std::process::exit(code);
}
