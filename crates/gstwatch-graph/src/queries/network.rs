//! Trading-partner network for one taxpayer.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

const NETWORK_CYPHER: &str = "
MATCH (a:Taxpayer)-[:ISSUED]->(inv:Invoice)-[:BILLED_TO]->(b:Taxpayer)
WHERE a.gstin = $gstin OR b.gstin = $gstin
WITH CASE WHEN a.gstin = $gstin THEN 'SELLER' ELSE 'BUYER' END AS role,
     CASE WHEN a.gstin = $gstin THEN b ELSE a END AS partner,
     collect(DISTINCT inv.invoice_id) AS invoices,
     sum(coalesce(inv.value, 0.0)) AS total_value
RETURN role,
       partner.gstin AS partner_gstin,
       partner.name AS partner_name,
       partner.risk_category AS partner_risk,
       invoices,
       total_value
ORDER BY total_value DESC
";

/// One trading partner. `role` is this GSTIN's side of the trade:
/// SELLER means the subject issued invoices to the partner.
#[derive(Debug, Clone, Serialize)]
pub struct VendorLink {
    pub role: String,
    pub partner_gstin: String,
    pub partner_name: String,
    pub partner_risk: String,
    pub invoices: Vec<String>,
    pub total_value: f64,
}

pub async fn vendor_network(client: &GraphClient, gstin: &str) -> Result<Vec<VendorLink>> {
    let query = Query::new(NETWORK_CYPHER.to_string()).param("gstin", gstin);
    let rows = client.query(query).await?;

    let mut links = Vec::with_capacity(rows.len());
    for row in &rows {
        links.push(VendorLink {
            role: row
                .get::<String>("role")
                .map_err(|e| anyhow::anyhow!("missing role: {e:?}"))?,
            partner_gstin: row
                .get::<String>("partner_gstin")
                .map_err(|e| anyhow::anyhow!("missing partner_gstin: {e:?}"))?,
            partner_name: row
                .get::<Option<String>>("partner_name")
                .ok()
                .flatten()
                .unwrap_or_default(),
            partner_risk: row
                .get::<Option<String>>("partner_risk")
                .ok()
                .flatten()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            invoices: row.get::<Vec<String>>("invoices").unwrap_or_default(),
            total_value: row.get::<f64>("total_value").unwrap_or(0.0),
        });
    }
    Ok(links)
}
