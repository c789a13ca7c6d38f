//! `gstwatch sync` - project the document store into Neo4j.

use anyhow::Result;
use colored::Colorize;

use gstwatch_graph::{run_projection, GraphClient};
use gstwatch_store::init_pool_from_env;

pub async fn execute() -> Result<()> {
    let store = init_pool_from_env().await?;
    let graph = GraphClient::connect_from_env().await?;

    println!("{}", "Projecting collections into the graph...".bold());

    let report = run_projection(&graph, &store).await;

    println!();
    for step in &report.steps {
        if let Some(err) = &step.error {
            println!("  {} {} - {}", "FATAL".red().bold(), step.step, err);
            continue;
        }
        let errors = if step.batch_errors > 0 {
            format!(", {} batch errors", step.batch_errors).red().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {:<40} read {:>4}  written {:>4}  skipped {:>3}{}",
            "✓".green(),
            step.step,
            step.read,
            step.written,
            step.skipped,
            errors
        );
    }

    println!();
    if report.completed() {
        println!(
            "{} in {}s",
            "Projection completed".green().bold(),
            report.duration_seconds
        );
    } else {
        println!(
            "{} after {}s",
            "Projection failed".red().bold(),
            report.duration_seconds
        );
        std::process::exit(1);
    }

    let counts = graph.get_counts().await?;
    println!(
        "Graph now holds {} nodes and {} relationships.",
        counts.nodes.to_string().cyan(),
        counts.relationships.to_string().cyan()
    );

    Ok(())
}
