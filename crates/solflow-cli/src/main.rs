use anyhow::Result;
use clap::{Parser, Subcommand};
use solflow_core::{EventBus, ExecutionContext, Graph, GraphNode, RunEvent};
use solflow_runtime::{execution_order, NodeRegistry, RunOptions, RunSession, Runner};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "solflow")]
#[command(about = "Solana node-graph workflow engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a graph file
    Run {
        /// Path to graph JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Solana RPC endpoint URL
        #[arg(short, long)]
        endpoint: String,

        /// Fail on mismatched edge handles instead of falling back to the
        /// source's first declared output
        #[arg(long)]
        strict_inputs: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a graph file (parse + schedule preflight)
    Validate {
        /// Path to graph JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example graph
    Init {
        /// Output file path
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            endpoint,
            strict_inputs,
            verbose,
        } => {
            let level = if verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };
            tracing_subscriber::fmt().with_max_level(level).init();

            run_graph(file, endpoint, strict_inputs).await?;
        }

        Commands::Validate { file } => {
            validate_graph(file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_graph(output)?;
        }
    }

    Ok(())
}

fn registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    solflow_nodes::register_all(&mut registry);
    registry
}

async fn run_graph(file: PathBuf, endpoint: String, strict_inputs: bool) -> Result<()> {
    println!("🚀 Loading graph from: {}", file.display());

    let graph_json = std::fs::read_to_string(&file)?;
    let graph = Graph::from_json(&graph_json)?;

    println!("📋 Nodes: {}, edges: {}", graph.nodes.len(), graph.edges.len());
    println!();

    let events = Arc::new(EventBus::default());
    let runner = Runner::new(Arc::new(registry()), Arc::clone(&events));
    let context = Arc::new(ExecutionContext::new(endpoint));

    // Print run progress as it streams in
    let mut receiver = events.subscribe();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            match event {
                RunEvent::RunStarted { .. } => {
                    println!("▶️  Run started");
                }
                RunEvent::NodeStarted {
                    node_id, node_type, ..
                } => {
                    println!("  ⚡ {} ({})", node_id, node_type);
                }
                RunEvent::NodeFinished {
                    node_id,
                    duration_ms,
                    ..
                } => {
                    println!("  ✅ {} done in {}ms", node_id, duration_ms);
                }
                RunEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ {} failed: {}", node_id, error);
                }
                RunEvent::NodeLog {
                    node_id, message, ..
                } => {
                    println!("     ℹ️  [{}] {}", node_id, message);
                }
                RunEvent::RunFinished {
                    success,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Run completed in {}ms", duration_ms);
                    } else {
                        println!("💥 Run aborted after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    let mut session = RunSession::new(&graph);
    let outcome = runner
        .run_with_options(&graph, &mut session, context, RunOptions { strict_inputs })
        .await;

    // let the event printer drain
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Results:");
    for node in &graph.nodes {
        if let Some(outputs) = session.result(&node.id) {
            if outputs.is_empty() {
                continue;
            }
            println!("   {}:", node.id);
            for (port, value) in outputs {
                println!("     {}: {}", port, value.to_json());
            }
        }
    }

    outcome?;
    Ok(())
}

fn validate_graph(file: PathBuf) -> Result<()> {
    println!("🔍 Validating graph: {}", file.display());

    let graph_json = std::fs::read_to_string(&file)?;
    let graph = Graph::from_json(&graph_json)?;
    let order = execution_order(&graph)?;

    let registry = registry();
    let unknown: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| !registry.contains(&n.node_type))
        .map(|n| n.node_type.as_str())
        .collect();

    println!("✅ Graph is valid:");
    println!("   Nodes: {}", graph.nodes.len());
    println!("   Edges: {}", graph.edges.len());
    println!("   Execution order: {}", order.join(" → "));
    if !unknown.is_empty() {
        println!("⚠️  Unknown node types (will fail at dispatch): {unknown:?}");
    }

    Ok(())
}

fn list_nodes() {
    println!("📦 Available node types:");
    println!();

    let registry = registry();
    for node_type in registry.node_types() {
        let ports = registry.ports(&node_type).unwrap_or_default();
        let inputs: Vec<&str> = ports.inputs.iter().map(|p| p.id.as_str()).collect();
        let outputs: Vec<&str> = ports.outputs.iter().map(|p| p.id.as_str()).collect();
        println!("  • {}", node_type);
        println!("    in: {:?}  out: {:?}", inputs, outputs);
    }
}

fn create_example_graph(output: PathBuf) -> Result<()> {
    let mut graph = Graph::new();
    let a = graph.add_node(
        GraphNode::new("n1", "input-number")
            .with_value("value", serde_json::json!(3))
            .with_position(0.0, 0.0),
    );
    let b = graph.add_node(
        GraphNode::new("n2", "input-number")
            .with_value("value", serde_json::json!(4))
            .with_position(0.0, 150.0),
    );
    let add = graph.add_node(GraphNode::new("n3", "math-add").with_position(250.0, 75.0));
    let show = graph.add_node(GraphNode::new("n4", "output-display").with_position(500.0, 75.0));

    graph.connect(a, "value", add.clone(), "a");
    graph.connect(b, "value", add.clone(), "b");
    graph.connect(add, "result", show, "value");

    std::fs::write(&output, graph.to_json()?)?;

    println!("✨ Created example graph: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  solflow run --file {} --endpoint https://api.devnet.solana.com",
        output.display()
    );

    Ok(())
}
