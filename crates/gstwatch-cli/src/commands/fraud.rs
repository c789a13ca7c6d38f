//! `gstwatch fraud` - fraud-pattern graph queries.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use gstwatch_graph::queries::fraud::{detect_circles, find_shadow_networks};
use gstwatch_graph::queries::risk::risk_score;
use gstwatch_graph::GraphClient;
use gstwatch_recon::audit::audit_invoice;
use gstwatch_store::init_pool_from_env;

#[derive(Subcommand)]
pub enum FraudCommands {
    /// Full audit trail for an invoice (graph + raw documents)
    Audit {
        /// Invoice ID
        invoice_id: String,
    },

    /// Detect 3-party circular trading loops
    Circles,

    /// Find taxpayers sharing an IP address or phone number
    ShadowNetworks,

    /// Neighborhood risk score for a taxpayer
    RiskScore {
        /// GSTIN
        gstin: String,
    },
}

pub async fn execute(cmd: FraudCommands) -> Result<()> {
    let graph = GraphClient::connect_from_env().await?;
    match cmd {
        FraudCommands::Audit { invoice_id } => cmd_audit(&graph, &invoice_id).await,
        FraudCommands::Circles => cmd_circles(&graph).await,
        FraudCommands::ShadowNetworks => cmd_shadow(&graph).await,
        FraudCommands::RiskScore { gstin } => cmd_risk(&graph, &gstin).await,
    }
}

async fn cmd_audit(graph: &GraphClient, invoice_id: &str) -> Result<()> {
    let store = init_pool_from_env().await?;
    let audit = audit_invoice(graph, &store, invoice_id).await?;

    println!("{} {}", "Audit trail for".bold(), invoice_id.yellow());
    println!("{}", "─".repeat(60));

    let c = &audit.compliance;
    let yesno = |b: bool| if b { "yes".green() } else { "no".red() };
    println!("  GSTR1 filed:        {} ({})", yesno(c.gstr1_filed), c.gstr1_status);
    println!("  GSTR3B filed:       {}", yesno(c.gstr3b_filed));
    println!("  payment confirmed:  {}", yesno(c.gstr3b_payment_confirmed));
    println!("  ITC eligible:       {}", c.itc_eligible);
    println!("  ITC claimed:        {}", yesno(c.itc_claimed));
    println!("  e-way bill present: {}", yesno(c.ewaybill_present));

    if c.flags.is_empty() {
        println!("\n{}", "No compliance flags raised.".green());
    } else {
        println!("\n{}", "Flags".bold());
        for flag in &c.flags {
            println!("  {} {}", "⚑".red(), flag.red());
        }
    }

    println!("\n{}", serde_json::to_string_pretty(&audit)?);
    Ok(())
}

async fn cmd_circles(graph: &GraphClient) -> Result<()> {
    let cycles = detect_circles(graph).await?;

    if cycles.is_empty() {
        println!("{}", "No circular trading loops detected.".green());
        return Ok(());
    }

    println!(
        "{} {}",
        cycles.len().to_string().red().bold(),
        "circular trading loop(s) detected".bold()
    );
    for (i, cycle) in cycles.iter().enumerate() {
        let [a, b, c] = &cycle.parties;
        println!(
            "\n{} {} → {} → {} → {}",
            format!("#{}", i + 1).dimmed(),
            a.gstin.yellow(),
            b.gstin.yellow(),
            c.gstin.yellow(),
            a.gstin.yellow()
        );
        for p in &cycle.parties {
            println!("    {} {} [{}]", p.gstin, p.name, p.risk_category);
        }
        println!(
            "    invoices: {} | {} | {}",
            cycle.invoices_a_to_b.join(","),
            cycle.invoices_b_to_c.join(","),
            cycle.invoices_c_to_a.join(",")
        );
    }
    Ok(())
}

async fn cmd_shadow(graph: &GraphClient) -> Result<()> {
    let clusters = find_shadow_networks(graph).await?;

    if clusters.is_empty() {
        println!("{}", "No shared IP or phone clusters found.".green());
        return Ok(());
    }

    println!(
        "{} {}",
        clusters.len().to_string().red().bold(),
        "shadow cluster(s) found".bold()
    );
    for cluster in &clusters {
        println!(
            "\n  {} {} ({} members)",
            cluster.match_type.cyan(),
            cluster.shared_value.yellow(),
            cluster.members.len()
        );
        for m in &cluster.members {
            println!("    {} {} [{}]", m.gstin, m.name, m.risk_category);
        }
    }
    Ok(())
}

async fn cmd_risk(graph: &GraphClient, gstin: &str) -> Result<()> {
    let Some(profile) = risk_score(graph, gstin).await? else {
        anyhow::bail!("Taxpayer {gstin} not found in the graph");
    };

    let score = profile.risk_score.to_string();
    let score_colored = match profile.risk_score {
        61.. => score.red().bold(),
        31..=60 => score.yellow().bold(),
        _ => score.green().bold(),
    };

    println!(
        "{} {} ({})",
        "Risk score for".bold(),
        profile.name.cyan(),
        gstin.yellow()
    );
    println!("  score:          {score_colored} / 100");
    println!("  own category:   {}", profile.own_risk);
    println!("  neighbors:      {}", profile.total_neighbors);
    if !profile.high_risk_neighbors.is_empty() {
        println!("  {}:", "high-risk neighbors".red());
        for n in &profile.high_risk_neighbors {
            println!("    {} {}", n.gstin, n.name);
        }
    }
    if !profile.medium_risk_neighbors.is_empty() {
        println!("  {}:", "medium-risk neighbors".yellow());
        for n in &profile.medium_risk_neighbors {
            println!("    {} {}", n.gstin, n.name);
        }
    }
    Ok(())
}
