use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use stemma_core::{LoadConfig, ResourceType};
use stemma_graph::{DbtGraph, DependencyGraph};

/// Stemma - dbt manifest graph loader
#[derive(Parser)]
#[command(name = "stemma")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: stemma.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a manifest and print a graph summary
    Load {
        /// Path to dbt manifest.json
        #[arg(short = 'f', long, default_value = "target/manifest.json")]
        manifest: PathBuf,

        /// Named selector to filter the graph with
        #[arg(short, long)]
        selector: Option<String>,
    },

    /// Print the filtered nodes in dependency order
    Order {
        /// Path to dbt manifest.json
        #[arg(short = 'f', long, default_value = "target/manifest.json")]
        manifest: PathBuf,

        /// Named selector to filter the graph with
        #[arg(short, long)]
        selector: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        LoadConfig::from_file(config_path)?
    } else if Path::new("stemma.toml").exists() {
        LoadConfig::from_file(Path::new("stemma.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        LoadConfig::default()
    };

    match cli.command {
        Commands::Load { manifest, selector } => {
            if selector.is_some() {
                config.selector = selector;
            }
            load_command(&manifest, &config, cli.verbose)
        }
        Commands::Order { manifest, selector } => {
            if selector.is_some() {
                config.selector = selector;
            }
            order_command(&manifest, &config, cli.verbose)
        }
    }
}

/// Load command - summarize the assembled graph
fn load_command(manifest: &Path, config: &LoadConfig, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading manifest from:".cyan(), manifest.display());
    }

    let graph = DbtGraph::load(manifest, config)?;

    println!("{} {} nodes", "Loaded".green(), graph.nodes.len());
    for resource_type in [
        ResourceType::Model,
        ResourceType::Seed,
        ResourceType::Snapshot,
        ResourceType::Test,
        ResourceType::Source,
        ResourceType::Analysis,
        ResourceType::Operation,
        ResourceType::Other,
    ] {
        let count = graph.count_by_type(resource_type);
        if count > 0 {
            println!("  {:>6}  {}", count, resource_type);
        }
    }

    if let Some(name) = &config.selector {
        println!(
            "{} {} of {} nodes match selector {}",
            "Filtered:".cyan(),
            graph.filtered_nodes.len(),
            graph.nodes.len(),
            name.bold()
        );
    }

    Ok(())
}

/// Order command - print filtered nodes in dependency order
fn order_command(manifest: &Path, config: &LoadConfig, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading manifest from:".cyan(), manifest.display());
    }

    let graph = DbtGraph::load(manifest, config)?;
    let dag = DependencyGraph::from_graph(&graph);

    let order = dag
        .topological_order()
        .ok_or_else(|| anyhow::anyhow!("dependency graph contains a cycle"))?;

    for unique_id in order {
        println!("{unique_id}");
    }

    Ok(())
}
