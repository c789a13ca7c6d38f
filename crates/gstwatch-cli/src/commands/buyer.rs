//! `gstwatch buyer` - buyer-side reconciliation views.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use gstwatch_graph::queries::network::vendor_network;
use gstwatch_graph::GraphClient;
use gstwatch_recon::buyer::{buyer_overview, ReconStatus};
use gstwatch_recon::invoice::invoice_detail;
use gstwatch_store::init_pool_from_env;

#[derive(Subcommand)]
pub enum BuyerCommands {
    /// Full reconciliation overview for a buyer GSTIN
    Overview {
        /// Buyer GSTIN
        gstin: String,
    },

    /// Single invoice detail with reconciliation status
    Invoice {
        /// Buyer GSTIN
        gstin: String,
        /// Invoice ID
        invoice_id: String,
    },

    /// Trading-partner network from the graph
    Network {
        /// GSTIN
        gstin: String,
    },
}

pub async fn execute(cmd: BuyerCommands) -> Result<()> {
    match cmd {
        BuyerCommands::Overview { gstin } => cmd_overview(&gstin).await,
        BuyerCommands::Invoice { gstin, invoice_id } => cmd_invoice(&gstin, &invoice_id).await,
        BuyerCommands::Network { gstin } => cmd_network(&gstin).await,
    }
}

fn status_colored(status: ReconStatus) -> colored::ColoredString {
    match status {
        ReconStatus::Matched => "MATCHED".green(),
        ReconStatus::Mismatch => "MISMATCH".yellow(),
        ReconStatus::Missing => "MISSING".red(),
    }
}

async fn cmd_overview(gstin: &str) -> Result<()> {
    let store = init_pool_from_env().await?;
    let overview = buyer_overview(&store, gstin).await?;

    println!(
        "{} {} ({})",
        "Reconciliation for".bold(),
        overview.taxpayer.name.cyan(),
        gstin.yellow()
    );
    println!("{}", "─".repeat(60));

    let s = &overview.itc_summary;
    println!("{}", "ITC summary".bold());
    println!("  claims in purchase register: {}", s.total_invoices);
    println!("  total ITC:    {:>12.2}", s.total_itc);
    println!("  eligible ITC: {:>12.2}", s.eligible_itc);
    println!("  blocked ITC:  {:>12.2}", s.blocked_itc);

    println!("\n{}", "Invoices".bold());
    for line in &overview.reconciliation {
        println!(
            "  {:<16} {:<16} {:>12} {:>12}  {}",
            line.invoice_id,
            line.seller_gstin,
            line.purchase_value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            line.gstr2b_value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            status_colored(line.status)
        );
    }

    if !overview.missing_itc.is_empty() {
        println!("\n{}", "Missing from GSTR2B".bold());
        for m in &overview.missing_itc {
            println!(
                "  {} (seller {}, tax claimed {:.2})",
                m.invoice_id.red(),
                m.seller_gstin,
                m.tax_claimed
            );
        }
    }

    println!("\n{}", "Seller filing status".bold());
    for f in &overview.filing_status {
        println!(
            "  {:<16} GSTR1 {:<12} GSTR3B payment {}",
            f.seller_gstin, f.gstr1_status, f.gstr3b_payment
        );
    }

    if !overview.vendor_risk.is_empty() {
        println!("\n{}", "Vendor risk".bold());
        for v in &overview.vendor_risk {
            let level = match v.risk_level.to_string().as_str() {
                "HIGH" => v.risk_level.to_string().red(),
                _ => v.risk_level.to_string().yellow(),
            };
            println!("  {} [{}] {}", v.gstin, level, v.reasons.join(" | "));
        }
    }

    if !overview.payment_warnings.is_empty() {
        println!("\n{}", "Payment warnings".bold());
        for w in &overview.payment_warnings {
            let sev = if w.severity == "CRITICAL" {
                w.severity.red().bold()
            } else {
                w.severity.yellow()
            };
            println!("  [{}] {}", sev, w.message);
        }
    }

    Ok(())
}

async fn cmd_invoice(gstin: &str, invoice_id: &str) -> Result<()> {
    let store = init_pool_from_env().await?;
    let detail = invoice_detail(&store, gstin, invoice_id).await?;

    println!(
        "{} {} (seller {})",
        "Invoice".bold(),
        invoice_id.yellow(),
        detail.seller_gstin.cyan()
    );
    println!("  status:          {}", status_colored(detail.status));
    println!("  ITC eligible:    {}", detail.itc_eligible);
    println!("  GSTR1 status:    {}", detail.gstr1_status);
    println!(
        "  GSTR3B payment:  {}",
        if detail.gstr3b_payment_confirmed {
            "confirmed".green()
        } else {
            "not confirmed".red()
        }
    );
    println!("\n{}", "Explanation".bold());
    for line in &detail.explanations {
        println!("  {} {}", "•".dimmed(), line);
    }

    Ok(())
}

async fn cmd_network(gstin: &str) -> Result<()> {
    let graph = GraphClient::connect_from_env().await?;
    let links = vendor_network(&graph, gstin).await?;

    if links.is_empty() {
        println!("{}", "No trading partners found in the graph.".dimmed());
        return Ok(());
    }

    println!("{} {}", "Trading network for".bold(), gstin.yellow());
    for link in &links {
        let risk = match link.partner_risk.as_str() {
            "HIGH" => link.partner_risk.red(),
            "MEDIUM" => link.partner_risk.yellow(),
            _ => link.partner_risk.normal(),
        };
        println!(
            "  {:<6} {:<16} {:<24} [{}] {:>12.2} ({} invoices)",
            link.role,
            link.partner_gstin,
            link.partner_name,
            risk,
            link.total_value,
            link.invoices.len()
        );
    }

    Ok(())
}
