//! Neighborhood risk scoring.
//!
//! Looks at every taxpayer reachable within two invoice hops (up to
//! four ISSUED/BILLED_TO edges) and scores proximity to HIGH and
//! MEDIUM risk entities on a 0-100 scale.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

const RISK_CYPHER: &str = "
MATCH (t:Taxpayer {gstin: $gstin})
OPTIONAL MATCH (t)-[:ISSUED|BILLED_TO*1..4]-(neighbor:Taxpayer)
WHERE neighbor <> t
WITH t, collect(DISTINCT neighbor) AS neighbors
RETURN t.gstin         AS gstin,
       t.name          AS name,
       t.risk_category AS own_risk,
       size(neighbors) AS total_neighbors,
       [n IN neighbors WHERE n.risk_category = 'HIGH'   | n.gstin] AS high_gstins,
       [n IN neighbors WHERE n.risk_category = 'HIGH'   | coalesce(n.name, '')] AS high_names,
       [n IN neighbors WHERE n.risk_category = 'MEDIUM' | n.gstin] AS medium_gstins,
       [n IN neighbors WHERE n.risk_category = 'MEDIUM' | coalesce(n.name, '')] AS medium_names
";

#[derive(Debug, Clone, Serialize)]
pub struct RiskNeighbor {
    pub gstin: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskProfile {
    pub gstin: String,
    pub name: String,
    pub own_risk: String,
    pub risk_score: u32,
    pub total_neighbors: usize,
    pub high_risk_neighbors: Vec<RiskNeighbor>,
    pub medium_risk_neighbors: Vec<RiskNeighbor>,
}

/// Score = base(own category) + neighbor influence, both capped.
/// Base: HIGH 40, MEDIUM 20, LOW 5, anything else 10. Influence:
/// 15 per HIGH neighbor plus 5 per MEDIUM, capped at 60. Total
/// capped at 100.
pub fn compute_risk_score(own_risk: &str, high_count: usize, medium_count: usize) -> u32 {
    let base: u32 = match own_risk {
        "HIGH" => 40,
        "MEDIUM" => 20,
        "LOW" => 5,
        _ => 10,
    };
    let influence = (high_count as u32 * 15 + medium_count as u32 * 5).min(60);
    (base + influence).min(100)
}

fn zip_neighbors(gstins: Vec<String>, names: Vec<String>) -> Vec<RiskNeighbor> {
    gstins
        .into_iter()
        .enumerate()
        .map(|(idx, gstin)| RiskNeighbor {
            gstin,
            name: names.get(idx).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Returns None when the taxpayer is not in the graph.
pub async fn risk_score(client: &GraphClient, gstin: &str) -> Result<Option<RiskProfile>> {
    let query = Query::new(RISK_CYPHER.to_string()).param("gstin", gstin);
    let rows = client.query(query).await?;
    let Some(row) = rows.into_iter().next() else {
        return Ok(None);
    };

    let own_risk = row
        .get::<Option<String>>("own_risk")
        .ok()
        .flatten()
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let high = zip_neighbors(
        row.get::<Vec<String>>("high_gstins").unwrap_or_default(),
        row.get::<Vec<String>>("high_names").unwrap_or_default(),
    );
    let medium = zip_neighbors(
        row.get::<Vec<String>>("medium_gstins").unwrap_or_default(),
        row.get::<Vec<String>>("medium_names").unwrap_or_default(),
    );

    Ok(Some(RiskProfile {
        gstin: row
            .get::<String>("gstin")
            .map_err(|e| anyhow::anyhow!("missing gstin: {e:?}"))?,
        name: row.get::<Option<String>>("name").ok().flatten().unwrap_or_default(),
        risk_score: compute_risk_score(&own_risk, high.len(), medium.len()),
        own_risk,
        total_neighbors: row.get::<i64>("total_neighbors").unwrap_or(0).max(0) as usize,
        high_risk_neighbors: high,
        medium_risk_neighbors: medium,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_scores_per_category() {
        assert_eq!(compute_risk_score("HIGH", 0, 0), 40);
        assert_eq!(compute_risk_score("MEDIUM", 0, 0), 20);
        assert_eq!(compute_risk_score("LOW", 0, 0), 5);
        assert_eq!(compute_risk_score("UNKNOWN", 0, 0), 10);
        assert_eq!(compute_risk_score("", 0, 0), 10);
    }

    #[test]
    fn neighbor_influence_caps_at_sixty() {
        // 10 HIGH neighbors would be 150 uncapped.
        assert_eq!(compute_risk_score("LOW", 10, 0), 65);
        assert_eq!(compute_risk_score("LOW", 4, 0), 65);
        assert_eq!(compute_risk_score("LOW", 3, 3), 65);
    }

    #[test]
    fn total_caps_at_one_hundred() {
        assert_eq!(compute_risk_score("HIGH", 10, 10), 100);
    }

    #[test]
    fn score_is_monotone_in_neighbor_counts() {
        assert!(compute_risk_score("LOW", 1, 0) > compute_risk_score("LOW", 0, 0));
        assert!(compute_risk_score("LOW", 0, 1) > compute_risk_score("LOW", 0, 0));
        assert!(compute_risk_score("LOW", 2, 0) >= compute_risk_score("LOW", 1, 0));
    }
}
