//! Single-invoice audit traversal.
//!
//! Walks the full filing chain around one invoice in a single query:
//! seller, buyer, GSTR1 return, the GSTR3B it is summarized in, the
//! e-way bill, and any ITC claim.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

const AUDIT_CYPHER: &str = "
MATCH (i:Invoice {invoice_id: $inv_id})
OPTIONAL MATCH (seller:Taxpayer)-[:ISSUED]->(i)
OPTIONAL MATCH (i)-[:BILLED_TO]->(buyer:Taxpayer)
OPTIONAL MATCH (i)-[:REPORTED_IN]->(gstr1:Return {type: 'GSTR1'})
OPTIONAL MATCH (gstr1)-[:SUMMARIZED_IN]->(gstr3b:Return {type: 'GSTR3B'})
OPTIONAL MATCH (i)-[:HAS_EWAYBILL]->(ewb:EWayBill)
OPTIONAL MATCH (claimant:Taxpayer)-[itc:CLAIMED_ITC]->(i)
RETURN i.value                  AS invoice_value,
       i.invoice_date           AS invoice_date,
       i.gstr2b_itc_eligible    AS gstr2b_itc_eligible,
       seller.gstin             AS seller_gstin,
       seller.name              AS seller_name,
       seller.risk_category     AS seller_risk,
       buyer.gstin              AS buyer_gstin,
       buyer.name               AS buyer_name,
       buyer.risk_category      AS buyer_risk,
       gstr1.status             AS gstr1_status,
       gstr1.filing_date        AS gstr1_filing_date,
       gstr3b.period            AS gstr3b_period,
       gstr3b.tax_paid          AS gstr3b_tax_paid,
       gstr3b.payment_confirmed AS gstr3b_payment_confirmed,
       ewb.ewaybill_no          AS ewaybill_no,
       ewb.value                AS ewaybill_value,
       claimant.gstin           AS itc_claimant,
       itc IS NOT NULL          AS itc_claimed,
       coalesce(itc.sources, []) AS itc_sources
LIMIT 1
";

/// The graph-side view of one invoice's filing chain. Every hop past
/// the invoice itself is optional.
#[derive(Debug, Clone, Serialize, Default)]
pub struct GraphAudit {
    pub invoice_value: Option<f64>,
    pub invoice_date: Option<String>,
    pub gstr2b_itc_eligible: Option<String>,
    pub seller_gstin: Option<String>,
    pub seller_name: Option<String>,
    pub seller_risk: Option<String>,
    pub buyer_gstin: Option<String>,
    pub buyer_name: Option<String>,
    pub buyer_risk: Option<String>,
    pub gstr1_status: Option<String>,
    pub gstr1_filing_date: Option<String>,
    pub gstr3b_period: Option<String>,
    pub gstr3b_tax_paid: Option<f64>,
    pub gstr3b_payment_confirmed: Option<String>,
    pub ewaybill_no: Option<String>,
    pub ewaybill_value: Option<f64>,
    pub itc_claimant: Option<String>,
    pub itc_claimed: bool,
    pub itc_sources: Vec<String>,
}

impl GraphAudit {
    pub fn gstr1_filed(&self) -> bool {
        self.gstr1_status.is_some()
    }

    pub fn gstr3b_filed(&self) -> bool {
        self.gstr3b_period.is_some()
    }

    pub fn gstr3b_payment_confirmed(&self) -> bool {
        self.gstr3b_payment_confirmed.as_deref() == Some("Y")
    }
}

fn opt_str(row: &neo4rs::Row, field: &str) -> Option<String> {
    row.get::<Option<String>>(field).ok().flatten()
}

fn opt_f64(row: &neo4rs::Row, field: &str) -> Option<f64> {
    row.get::<Option<f64>>(field).ok().flatten()
}

/// Returns None when the invoice node does not exist in the graph.
pub async fn invoice_audit(client: &GraphClient, invoice_id: &str) -> Result<Option<GraphAudit>> {
    let query = Query::new(AUDIT_CYPHER.to_string()).param("inv_id", invoice_id);
    let rows = client.query(query).await?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    Ok(Some(GraphAudit {
        invoice_value: opt_f64(&row, "invoice_value"),
        invoice_date: opt_str(&row, "invoice_date"),
        gstr2b_itc_eligible: opt_str(&row, "gstr2b_itc_eligible"),
        seller_gstin: opt_str(&row, "seller_gstin"),
        seller_name: opt_str(&row, "seller_name"),
        seller_risk: opt_str(&row, "seller_risk"),
        buyer_gstin: opt_str(&row, "buyer_gstin"),
        buyer_name: opt_str(&row, "buyer_name"),
        buyer_risk: opt_str(&row, "buyer_risk"),
        gstr1_status: opt_str(&row, "gstr1_status"),
        gstr1_filing_date: opt_str(&row, "gstr1_filing_date"),
        gstr3b_period: opt_str(&row, "gstr3b_period"),
        gstr3b_tax_paid: opt_f64(&row, "gstr3b_tax_paid"),
        gstr3b_payment_confirmed: opt_str(&row, "gstr3b_payment_confirmed"),
        ewaybill_no: opt_str(&row, "ewaybill_no"),
        ewaybill_value: opt_f64(&row, "ewaybill_value"),
        itc_claimant: opt_str(&row, "itc_claimant"),
        itc_claimed: row.get::<bool>("itc_claimed").unwrap_or(false),
        itc_sources: row.get::<Vec<String>>("itc_sources").unwrap_or_default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_confirmed_only_on_exact_y() {
        let mut audit = GraphAudit::default();
        assert!(!audit.gstr3b_payment_confirmed());
        audit.gstr3b_payment_confirmed = Some("N".to_string());
        assert!(!audit.gstr3b_payment_confirmed());
        audit.gstr3b_payment_confirmed = Some("Y".to_string());
        assert!(audit.gstr3b_payment_confirmed());
    }

    #[test]
    fn filed_tracks_presence_of_return_hop() {
        let mut audit = GraphAudit::default();
        assert!(!audit.gstr1_filed());
        assert!(!audit.gstr3b_filed());
        audit.gstr1_status = Some("PENDING".to_string());
        audit.gstr3b_period = Some("Jan".to_string());
        assert!(audit.gstr1_filed());
        assert!(audit.gstr3b_filed());
    }
}
