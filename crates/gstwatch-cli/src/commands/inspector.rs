//! `gstwatch inspector` - global queries across every taxpayer.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use gstwatch_graph::GraphClient;
use gstwatch_recon::inspector::{
    compliance_table, ewaybill_fraud_suspects, fake_itc_suspects, global_summary,
    gstin_profile, high_risk_vendors,
};
use gstwatch_store::init_pool_from_env;

#[derive(Subcommand)]
pub enum InspectorCommands {
    /// Global GST metrics
    Summary,

    /// Combined store + graph high-risk vendor list
    HighRisk,

    /// GSTR1 vs GSTR3B compliance table
    Compliance,

    /// Purchase claims with no matching GSTR1 declaration
    FakeItc,

    /// High-value invoices without an e-way bill
    EwaybillFraud,

    /// Full profile for a single GSTIN
    Profile {
        /// GSTIN
        gstin: String,
    },
}

pub async fn execute(cmd: InspectorCommands) -> Result<()> {
    let store = init_pool_from_env().await?;
    match cmd {
        InspectorCommands::Summary => {
            let s = global_summary(&store).await?;
            println!("{}", "Global summary".bold());
            println!("  taxpayers:          {}", s.total_taxpayers);
            println!("  invoices:           {}", s.total_invoices);
            println!("  total ITC claimed:  {:.2}", s.total_itc_claimed);
            println!(
                "  high-risk vendors:  {}",
                s.high_risk_vendors.to_string().red()
            );
        }
        InspectorCommands::HighRisk => {
            let graph = GraphClient::connect_from_env().await?;
            let vendors = high_risk_vendors(&store, &graph).await?;
            if vendors.is_empty() {
                println!("{}", "No high-risk vendors detected.".green());
                return Ok(());
            }
            println!(
                "{} {}",
                vendors.len().to_string().red().bold(),
                "high-risk vendor(s)".bold()
            );
            for v in &vendors {
                println!("\n  {} {}", v.gstin.yellow(), v.name);
                for reason in &v.reasons {
                    println!("    {} {}", "⚑".red(), reason);
                }
            }
        }
        InspectorCommands::Compliance => {
            let rows = compliance_table(&store).await?;
            println!("{}", "Compliance table".bold());
            for r in &rows {
                let status = if r.compliant {
                    "COMPLIANT".green()
                } else {
                    "NON-COMPLIANT".red()
                };
                println!(
                    "  {:<16} {:<24} GSTR1 {:<4} paid {:<4} {}",
                    r.gstin,
                    r.name,
                    if r.gstr1_filed { "YES" } else { "NO" },
                    if r.tax_paid { "YES" } else { "NO" },
                    status
                );
            }
        }
        InspectorCommands::FakeItc => {
            let suspects = fake_itc_suspects(&store).await?;
            if suspects.is_empty() {
                println!("{}", "No fake ITC suspects.".green());
                return Ok(());
            }
            println!(
                "{} {}",
                suspects.len().to_string().red().bold(),
                "claim(s) with no GSTR1 declaration".bold()
            );
            for s in &suspects {
                println!(
                    "  {:<16} buyer {:<16} seller {}",
                    s.invoice_id.yellow(),
                    s.buyer_gstin,
                    s.seller_gstin
                );
            }
        }
        InspectorCommands::EwaybillFraud => {
            let suspects = ewaybill_fraud_suspects(&store).await?;
            if suspects.is_empty() {
                println!("{}", "No uncovered high-value invoices.".green());
                return Ok(());
            }
            println!(
                "{} {}",
                suspects.len().to_string().red().bold(),
                "high-value invoice(s) without an e-way bill".bold()
            );
            for s in &suspects {
                println!(
                    "  {:<16} {:>12.2}  {} → {}",
                    s.invoice_id.yellow(),
                    s.value,
                    s.seller_gstin,
                    s.buyer_gstin
                );
            }
        }
        InspectorCommands::Profile { gstin } => {
            let graph = GraphClient::connect_from_env().await?;
            let p = gstin_profile(&store, &graph, &gstin).await?;

            println!(
                "{} {} ({})",
                "Profile".bold(),
                p.taxpayer.name.cyan(),
                gstin.yellow()
            );
            println!("  own risk category: {}", p.taxpayer.risk_category);
            println!("  invoices issued:   {}", p.invoices_as_seller.len());
            println!("  invoices received: {}", p.invoices_as_buyer.len());
            println!("  GSTR1 filings:     {}", p.gstr1_filings);
            println!("  GSTR3B filings:    {}", p.gstr3b_filings);
            println!("  GSTR2B claims:     {}", p.gstr2b_claims);
            if let (Some(risk), Some(level)) = (&p.risk, &p.risk_level) {
                let level_colored = match level.as_str() {
                    "HIGH" => level.red(),
                    "MEDIUM" => level.yellow(),
                    _ => level.green(),
                };
                println!(
                    "  graph risk score:  {} ({})",
                    risk.risk_score, level_colored
                );
            }
            let status = if p.compliant {
                "COMPLIANT".green()
            } else {
                "NON-COMPLIANT".red()
            };
            println!("  compliance:        {status}");
        }
    }
    Ok(())
}
