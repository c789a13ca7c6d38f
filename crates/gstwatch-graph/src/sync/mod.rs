//! Document store → Neo4j projection pipeline.
//!
//! Reads the seven GST collections and projects nodes and
//! relationships into the graph in a fixed, dependency-ordered
//! sequence of steps. Every write uses MERGE, so the whole pipeline
//! is idempotent - re-running on unchanged documents produces zero
//! net change to node/edge counts.
//!
//! Node types:   (:Taxpayer {gstin}), (:Invoice {invoice_id}),
//!               (:Return {return_id}), (:EWayBill {ewaybill_no})
//! Relationships: ISSUED, BILLED_TO, FILED, REPORTED_IN,
//!               SUMMARIZED_IN, HAS_EWAYBILL, CLAIMED_ITC

pub mod claim_sync;
pub mod ewaybill_sync;
pub mod invoice_sync;
pub mod return_sync;
pub mod taxpayer_sync;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use neo4rs::{BoltType, Query};
use serde::Serialize;
use tracing::{error, info};

use gstwatch_store::StorePool;

use crate::{schema, GraphClient};

/// Records per UNWIND batch.
pub const BATCH_SIZE: usize = 50;

/// Batches of one step issued concurrently. Must not exceed the
/// client's connection pool bound.
const BATCH_CONCURRENCY: usize = 4;

/// One projection record, UNWIND-able as a Cypher map.
pub(crate) type BatchRow = HashMap<String, BoltType>;

/// Per-step accounting. The identity
/// `read == written + skipped + batch_errors` holds for every report
/// (multi-query steps emit one report per sub-query).
#[derive(Debug, Clone, Serialize, Default)]
pub struct StepReport {
    pub step: String,
    pub read: usize,
    pub written: usize,
    pub skipped: usize,
    pub batch_errors: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub(crate) fn new(step: &str, read: usize, written: usize, skipped: usize, batch_errors: usize) -> Self {
        Self {
            step: step.to_string(),
            read,
            written,
            skipped,
            batch_errors,
            error: None,
        }
    }

    fn fatal(err: &anyhow::Error) -> Self {
        Self {
            step: "FATAL".to_string(),
            error: Some(format!("{err:#}")),
            ..Default::default()
        }
    }
}

/// Full projection run report.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub status: String,
    pub started: String,
    pub finished: String,
    pub duration_seconds: f64,
    pub steps: Vec<StepReport>,
}

impl ProjectionReport {
    pub fn completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Run the full projection.
///
/// Idempotent, deterministic, fault-tolerant: per-record validation
/// failures and per-batch write failures are counted and the run
/// continues; only an unrecoverable error (e.g. the document store
/// going away) aborts the remaining steps, recorded as a terminal
/// FATAL entry. Completed steps are never rolled back - partial
/// progress is safe to re-run.
pub async fn run_projection(client: &GraphClient, store: &StorePool) -> ProjectionReport {
    let started = Utc::now();
    info!("starting graph projection");

    let mut steps: Vec<StepReport> = Vec::new();
    let status = match run_steps(client, store, &mut steps).await {
        Ok(()) => "completed",
        Err(err) => {
            error!(error = %err, "graph projection aborted");
            steps.push(StepReport::fatal(&err));
            "failed"
        }
    };

    let finished = Utc::now();
    let duration_seconds =
        ((finished - started).num_milliseconds() as f64 / 1000.0 * 100.0).round() / 100.0;

    for step in &steps {
        info!(
            step = %step.step,
            read = step.read,
            written = step.written,
            skipped = step.skipped,
            batch_errors = step.batch_errors,
            "projection step"
        );
    }

    ProjectionReport {
        status: status.to_string(),
        started: started.to_rfc3339(),
        finished: finished.to_rfc3339(),
        duration_seconds,
        steps,
    }
}

async fn run_steps(
    client: &GraphClient,
    store: &StorePool,
    steps: &mut Vec<StepReport>,
) -> Result<()> {
    // 0. Constraints (idempotent, failures swallowed inside)
    schema::initialize_schema(client).await;
    steps.push(StepReport::new("Constraints", 0, 0, 0, 0));

    // 1-2. Core nodes
    steps.push(taxpayer_sync::sync_taxpayers(client, store).await?);
    steps.push(invoice_sync::sync_invoices(client, store).await?);

    // 3-5. Returns and enrichment
    steps.extend(return_sync::sync_gstr1(client, store).await?);
    steps.push(claim_sync::sync_gstr2b(client, store).await?);
    steps.push(return_sync::sync_gstr3b(client, store).await?);

    // 6. Cross-link GSTR1 -> GSTR3B
    steps.push(return_sync::link_returns(client).await?);

    // 7-8. E-way bills and purchase claims
    steps.push(ewaybill_sync::sync_ewaybills(client, store).await?);
    steps.push(claim_sync::sync_purchase_register(client, store).await?);

    Ok(())
}

/// Write records in batches via `UNWIND $batch`. Batches run
/// concurrently up to [`BATCH_CONCURRENCY`]; the returned counts are
/// a join barrier over every batch. A failing batch counts its whole
/// chunk as errors and does not cancel sibling batches.
pub(crate) async fn batch_write(
    client: &GraphClient,
    cypher: &str,
    rows: Vec<BatchRow>,
) -> (usize, usize) {
    let chunks: Vec<Vec<BatchRow>> = rows
        .chunks(BATCH_SIZE)
        .map(|chunk| chunk.to_vec())
        .collect();

    let results = stream::iter(chunks.into_iter().enumerate())
        .map(|(idx, chunk)| {
            let client = client.clone();
            let cypher = cypher.to_string();
            async move {
                let size = chunk.len();
                let query = Query::new(cypher).param("batch", chunk);
                match client.execute(query).await {
                    Ok(()) => (size, 0),
                    Err(err) => {
                        error!(batch = idx, error = %err, "batch write failed");
                        (0, size)
                    }
                }
            }
        })
        .buffer_unordered(BATCH_CONCURRENCY)
        .collect::<Vec<(usize, usize)>>()
        .await;

    results
        .into_iter()
        .fold((0, 0), |(w, e), (bw, be)| (w + bw, e + be))
}

/// Derive the filing period from a date string:
/// `"2026-01-19"` → `"Jan"`. Returns `"Unknown"` on bad input.
pub fn derive_month(date_str: &str) -> String {
    match NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%b").to_string(),
        Err(_) => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_month_from_filing_date() {
        assert_eq!(derive_month("2026-01-19"), "Jan");
        assert_eq!(derive_month(" 2026-12-01 "), "Dec");
    }

    #[test]
    fn derive_month_unparseable_is_unknown() {
        assert_eq!(derive_month(""), "Unknown");
        assert_eq!(derive_month("19/01/2026"), "Unknown");
        assert_eq!(derive_month("not a date"), "Unknown");
    }

    #[test]
    fn gstr1_return_ids_share_period_with_gstr3b() {
        // Scenario: GSTR1 filed 2026-01-19 and GSTR3B month "Jan"
        // must land on the same (gstin, period) pair so the
        // SUMMARIZED_IN linking step can match them.
        let period = derive_month("2026-01-19");
        let gstr1_id = format!("GSTR1_{}_{}", "G1", period);
        let gstr3b_id = format!("GSTR3B_{}_{}", "G1", "Jan");
        assert_eq!(gstr1_id, "GSTR1_G1_Jan");
        assert_eq!(gstr3b_id, "GSTR3B_G1_Jan");
    }
}
