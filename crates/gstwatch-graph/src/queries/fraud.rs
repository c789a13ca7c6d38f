//! Fraud-pattern traversals: circular trading and shadow networks.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

/// Three-party invoice loops A -> B -> C -> A. The gstin ordering in
/// the WHERE clause keeps each cycle from matching under its three
/// rotations.
const CIRCLES_CYPHER: &str = "
MATCH (a:Taxpayer)-[:ISSUED]->(i1:Invoice)-[:BILLED_TO]->(b:Taxpayer),
      (b)-[:ISSUED]->(i2:Invoice)-[:BILLED_TO]->(c:Taxpayer),
      (c)-[:ISSUED]->(i3:Invoice)-[:BILLED_TO]->(a)
WHERE a.gstin < b.gstin AND b.gstin < c.gstin
WITH a, b, c,
     collect(DISTINCT i1.invoice_id) AS inv_a_to_b,
     collect(DISTINCT i2.invoice_id) AS inv_b_to_c,
     collect(DISTINCT i3.invoice_id) AS inv_c_to_a
RETURN a.gstin AS gstin_a, a.name AS name_a, a.risk_category AS risk_a,
       b.gstin AS gstin_b, b.name AS name_b, b.risk_category AS risk_b,
       c.gstin AS gstin_c, c.name AS name_c, c.risk_category AS risk_c,
       inv_a_to_b, inv_b_to_c, inv_c_to_a
ORDER BY gstin_a, gstin_b, gstin_c
";

/// Taxpayers sharing an IP address or phone number. Parallel lists
/// per cluster are zipped back into members on the Rust side.
const SHADOW_CYPHER: &str = "
MATCH (t:Taxpayer)
WHERE t.ip_address IS NOT NULL AND t.ip_address <> ''
WITH t.ip_address AS shared_value, 'IP_ADDRESS' AS match_type,
     collect(t.gstin) AS gstins,
     collect(coalesce(t.name, '')) AS names,
     collect(coalesce(t.risk_category, 'UNKNOWN')) AS risks
WHERE size(gstins) > 1
RETURN shared_value, match_type, gstins, names, risks
UNION ALL
MATCH (t:Taxpayer)
WHERE t.phone IS NOT NULL AND t.phone <> ''
WITH t.phone AS shared_value, 'PHONE' AS match_type,
     collect(t.gstin) AS gstins,
     collect(coalesce(t.name, '')) AS names,
     collect(coalesce(t.risk_category, 'UNKNOWN')) AS risks
WHERE size(gstins) > 1
RETURN shared_value, match_type, gstins, names, risks
";

#[derive(Debug, Clone, Serialize)]
pub struct CycleParty {
    pub gstin: String,
    pub name: String,
    pub risk_category: String,
}

/// One deduplicated A -> B -> C -> A loop with the invoices along
/// each leg.
#[derive(Debug, Clone, Serialize)]
pub struct TradingCycle {
    pub parties: [CycleParty; 3],
    pub invoices_a_to_b: Vec<String>,
    pub invoices_b_to_c: Vec<String>,
    pub invoices_c_to_a: Vec<String>,
}

impl TradingCycle {
    /// All distinct GSTINs across every detected cycle.
    pub fn participants(cycles: &[TradingCycle]) -> Vec<String> {
        let mut gstins: Vec<String> = cycles
            .iter()
            .flat_map(|c| c.parties.iter().map(|p| p.gstin.clone()))
            .collect();
        gstins.sort();
        gstins.dedup();
        gstins
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShadowMember {
    pub gstin: String,
    pub name: String,
    pub risk_category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShadowCluster {
    /// "IP_ADDRESS" or "PHONE"
    pub match_type: String,
    pub shared_value: String,
    pub members: Vec<ShadowMember>,
}

fn party(row: &neo4rs::Row, suffix: &str) -> Result<CycleParty> {
    Ok(CycleParty {
        gstin: row
            .get::<String>(&format!("gstin_{suffix}"))
            .map_err(|e| anyhow::anyhow!("missing gstin_{suffix}: {e:?}"))?,
        name: row
            .get::<Option<String>>(&format!("name_{suffix}"))
            .ok()
            .flatten()
            .unwrap_or_default(),
        risk_category: row
            .get::<Option<String>>(&format!("risk_{suffix}"))
            .ok()
            .flatten()
            .unwrap_or_else(|| "UNKNOWN".to_string()),
    })
}

pub async fn detect_circles(client: &GraphClient) -> Result<Vec<TradingCycle>> {
    let rows = client.query(Query::new(CIRCLES_CYPHER.to_string())).await?;

    let mut cycles = Vec::with_capacity(rows.len());
    for row in &rows {
        cycles.push(TradingCycle {
            parties: [party(row, "a")?, party(row, "b")?, party(row, "c")?],
            invoices_a_to_b: row.get::<Vec<String>>("inv_a_to_b").unwrap_or_default(),
            invoices_b_to_c: row.get::<Vec<String>>("inv_b_to_c").unwrap_or_default(),
            invoices_c_to_a: row.get::<Vec<String>>("inv_c_to_a").unwrap_or_default(),
        });
    }
    Ok(cycles)
}

pub async fn find_shadow_networks(client: &GraphClient) -> Result<Vec<ShadowCluster>> {
    let rows = client.query(Query::new(SHADOW_CYPHER.to_string())).await?;

    let mut clusters = Vec::with_capacity(rows.len());
    for row in &rows {
        let gstins = row.get::<Vec<String>>("gstins").unwrap_or_default();
        let names = row.get::<Vec<String>>("names").unwrap_or_default();
        let risks = row.get::<Vec<String>>("risks").unwrap_or_default();

        let members = gstins
            .into_iter()
            .enumerate()
            .map(|(idx, gstin)| ShadowMember {
                gstin,
                name: names.get(idx).cloned().unwrap_or_default(),
                risk_category: risks
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
            })
            .collect();

        clusters.push(ShadowCluster {
            match_type: row
                .get::<String>("match_type")
                .map_err(|e| anyhow::anyhow!("missing match_type: {e:?}"))?,
            shared_value: row
                .get::<String>("shared_value")
                .map_err(|e| anyhow::anyhow!("missing shared_value: {e:?}"))?,
            members,
        });
    }
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(a: &str, b: &str, c: &str) -> TradingCycle {
        let mk = |g: &str| CycleParty {
            gstin: g.to_string(),
            name: String::new(),
            risk_category: "UNKNOWN".to_string(),
        };
        TradingCycle {
            parties: [mk(a), mk(b), mk(c)],
            invoices_a_to_b: vec![],
            invoices_b_to_c: vec![],
            invoices_c_to_a: vec![],
        }
    }

    #[test]
    fn participants_deduplicate_across_overlapping_cycles() {
        let cycles = vec![cycle("G1", "G2", "G3"), cycle("G2", "G3", "G4")];
        assert_eq!(TradingCycle::participants(&cycles), vec!["G1", "G2", "G3", "G4"]);
    }
}
