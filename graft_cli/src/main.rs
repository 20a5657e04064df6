//! graft CLI
//!
//! Builds a chain of additions over constants, folds it with a nested
//! rewrite pattern and prints the rewrite report and the final graph.

mod args;
mod demo;

use clap::Parser;
use graft_rewrite::Driver;
use tracing::info;

use args::Args;

/// Runs the folding demo.
///
/// This function:
/// 1. Initializes logging
/// 2. Parses command-line arguments
/// 3. Builds the host graph and the pattern
/// 4. Rewrites to a fixpoint
/// 5. Prints the report and the graph
/// 6. Logs matcher timings, if profiling is enabled
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = args.to_config();
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut graph = demo::sum_chain(args.length)?;
    let pattern = demo::fold()?;
    let driver = Driver::new(demo::hierarchy()?, config);

    info!(
        "Rewriting a chain of {} additions ({} nodes, {} edges)",
        args.length,
        graph.node_count(),
        graph.edge_count()
    );

    let report = driver.run_to_fixpoint(&pattern, &mut graph)?;

    println!("\n=== Rewrite Report ===");
    println!("rounds: {}", report.rounds);
    println!("replacements: {}", report.replacements.len());
    if report.hit_round_limit {
        println!("stopped at the round limit");
    }
    for (i, r) in report.replacements.iter().enumerate() {
        let subsumed: Vec<String> = r.nodes.iter().map(ToString::to_string).collect();
        println!("{i}: [{}] -> {}", subsumed.join(", "), r.result_node);
    }

    println!("\n=== Final Graph ===");
    print!("{graph}");

    // Logs matcher timings when built with the `profiling` feature.
    graft_subgraph::profiling::report();

    Ok(())
}
