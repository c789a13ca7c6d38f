//! `gstwatch status` - store and graph connection status.

use anyhow::Result;
use colored::Colorize;

use gstwatch_graph::GraphClient;
use gstwatch_store::{collections, init_pool_from_env, Collection};

pub async fn execute() -> Result<()> {
    println!("{}", "Document store".bold());
    match init_pool_from_env().await {
        Ok(pool) => {
            for collection in Collection::ALL {
                let count = collections::count(&pool, collection).await?;
                println!("  {:<20} {:>6}", collection.name(), count);
            }
        }
        Err(err) => println!("  {} {}", "unreachable:".red(), err),
    }

    println!("\n{}", "Graph".bold());
    match GraphClient::connect_from_env().await {
        Ok(graph) => {
            let counts = graph.get_counts().await?;
            println!("  nodes               {:>6}", counts.nodes);
            println!("  relationships       {:>6}", counts.relationships);
        }
        Err(err) => println!("  {} {}", "unreachable:".red(), err),
    }

    Ok(())
}
