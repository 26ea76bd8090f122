use clap::{Parser, Subcommand};
use rulegraph::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Rule chain inspection tool: normalizes node configurations, lists relation
/// options and suggests message paths.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional path to an editor settings JSON file
    #[arg(short, long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a rule chain, normalize every node configuration and print the result
    Normalize {
        /// Path to the rule chain metadata JSON file
        chain_path: String,
        /// Write the normalized chain here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the relation options of one node
    Relations {
        /// Path to the rule chain metadata JSON file
        chain_path: String,
        /// Id of the source node
        node_id: String,
    },
    /// Print path suggestions for a sample message
    Suggest {
        /// Path to the sample message JSON file
        sample_path: String,
        /// Only show suggestions containing this text
        query: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => EditorSettings::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load settings from '{}': {}", path, e))
        }),
        None => EditorSettings::default(),
    };

    match cli.command {
        Command::Normalize { chain_path, output } => run_normalize(&settings, &chain_path, output),
        Command::Relations {
            chain_path,
            node_id,
        } => run_relations(&settings, &chain_path, &node_id),
        Command::Suggest { sample_path, query } => run_suggest(&settings, &sample_path, query),
    }
}

fn load_graph(settings: &EditorSettings, chain_path: &str) -> RuleGraph {
    let load_start = Instant::now();
    let text = fs::read_to_string(chain_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read rule chain '{}': {}", chain_path, e))
    });
    let metadata: RuleChainMetadata = serde_json::from_str(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse rule chain JSON: {}", e)));

    let graph = RuleGraph::from_metadata(
        Arc::new(NodeRegistry::default()),
        settings.relation_resolver(),
        metadata,
    )
    .unwrap_or_else(|e| exit_with_error(&format!("Invalid rule chain: {}", e)));

    info!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        forwards = graph.forwards().len(),
        elapsed = ?load_start.elapsed(),
        "Rule chain loaded"
    );
    graph
}

fn run_normalize(settings: &EditorSettings, chain_path: &str, output: Option<String>) {
    let graph = load_graph(settings, chain_path);

    let unknown: Vec<&str> = graph
        .nodes()
        .iter()
        .map(|n| n.node_type.as_str())
        .filter(|t| !graph.registry().contains(t))
        .collect();
    if !unknown.is_empty() {
        info!(?unknown, "Kept configuration of unregistered node types verbatim");
    }

    let json = serde_json::to_string_pretty(&graph.to_metadata())
        .unwrap_or_else(|e| exit_with_error(&format!("Serialization failed: {}", e)));

    match output {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Could not write to file '{}': {}", path, e))
            });
            info!(path = %path, "Normalized rule chain written");
        }
        None => println!("{}", json),
    }
}

fn run_relations(settings: &EditorSettings, chain_path: &str, node_id: &str) {
    let graph = load_graph(settings, chain_path);
    let options = graph
        .relation_options(node_id, None)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    let label = graph.node_label(node_id).unwrap_or(node_id);
    println!("Relations for '{}':", label);
    for option in options {
        let marker = if option.used { "used" } else { "free" };
        match option.description {
            Some(description) => println!("  [{}] {} - {}", marker, option.label, description),
            None => println!("  [{}] {}", marker, option.label),
        }
    }
}

fn run_suggest(settings: &EditorSettings, sample_path: &str, query: Option<String>) {
    let text = fs::read_to_string(sample_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read sample '{}': {}", sample_path, e))
    });

    let suggester = settings.path_suggester();
    let all = suggester.suggest(&text);
    let shown = match query {
        Some(query) => suggester.filter(&all, &query),
        None => all,
    };

    if shown.is_empty() {
        println!("No suggestions.");
    }
    for suggestion in shown {
        println!("{}", suggestion.label);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
