//! Return projection - GSTR1 and GSTR3B filings as (:Return) nodes.
//!
//! Return ids are synthesized as `{TYPE}_{gstin}_{period}` where the
//! GSTR1 period is derived from the filing date and the GSTR3B
//! period is the raw month field. The linking step joins the two
//! return types on equal (gstin, period).

use anyhow::Result;
use neo4rs::Query;
use tracing::warn;

use gstwatch_store::collections::{self, gstr1::Gstr1Row, gstr3b::Gstr3bRow, Collection};
use gstwatch_store::StorePool;

use super::{batch_write, derive_month, BatchRow, StepReport};
use crate::GraphClient;

/// Enrich Invoice nodes with the seller's filing declaration.
const GSTR1_ENRICH_CYPHER: &str = "
UNWIND $batch AS row
MERGE (i:Invoice {invoice_id: row.invoice_id})
SET i.gstr1_status      = row.status,
    i.gstr1_filing_date = row.filing_date,
    i.gstr1_tax         = row.tax
";

/// Synthesize Return{GSTR1} nodes with FILED and REPORTED_IN edges.
const GSTR1_RETURN_CYPHER: &str = "
UNWIND $batch AS row
MERGE (r:Return {return_id: row.return_id})
SET r.type = 'GSTR1', r.gstin = row.gstin, r.period = row.period,
    r.status = row.status, r.filing_date = row.filing_date
WITH r, row
MERGE (t:Taxpayer {gstin: row.gstin})
MERGE (t)-[:FILED]->(r)
WITH r, row
MERGE (i:Invoice {invoice_id: row.invoice_id})
MERGE (i)-[:REPORTED_IN]->(r)
";

const GSTR3B_CYPHER: &str = "
UNWIND $batch AS row
MERGE (r:Return {return_id: row.return_id})
SET r.type              = 'GSTR3B',
    r.gstin             = row.gstin,
    r.period            = row.period,
    r.tax_paid          = row.tax_paid,
    r.payment_confirmed = row.payment_confirmed
WITH r, row
MERGE (t:Taxpayer {gstin: row.gstin})
MERGE (t)-[:FILED]->(r)
";

/// MERGE (GSTR1)-[:SUMMARIZED_IN]->(GSTR3B) for equal seller+period.
const LINK_CYPHER: &str = "
MATCH (g1:Return {type: 'GSTR1'}), (g3:Return {type: 'GSTR3B'})
WHERE g1.gstin = g3.gstin AND g1.period = g3.period
MERGE (g1)-[:SUMMARIZED_IN]->(g3)
RETURN count(*) AS pairs
";

/// GSTR1 runs two sub-writes over the same record set and reports
/// each separately so skip/write accounting stays checkable per
/// sub-query.
pub async fn sync_gstr1(client: &GraphClient, store: &StorePool) -> Result<Vec<StepReport>> {
    let docs = collections::list_raw(store, Collection::Gstr1).await?;
    let read = docs.len();

    let mut enrich_rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut return_rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match Gstr1Row::parse(doc) {
            Ok(r) => {
                let period = derive_month(&r.filing_date);

                let mut enrich = BatchRow::new();
                enrich.insert("invoice_id".to_string(), r.invoice_id.clone().into());
                enrich.insert("status".to_string(), r.status.clone().into());
                enrich.insert("filing_date".to_string(), r.filing_date.clone().into());
                enrich.insert("tax".to_string(), r.tax.into());
                enrich_rows.push(enrich);

                let mut ret = BatchRow::new();
                ret.insert(
                    "return_id".to_string(),
                    format!("GSTR1_{}_{}", r.seller_gstin, period).into(),
                );
                ret.insert("gstin".to_string(), r.seller_gstin.into());
                ret.insert("period".to_string(), period.into());
                ret.insert("status".to_string(), r.status.into());
                ret.insert("filing_date".to_string(), r.filing_date.into());
                ret.insert("invoice_id".to_string(), r.invoice_id.into());
                return_rows.push(ret);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "GSTR1 record skipped");
            }
        }
    }

    let (enriched, enrich_errors) = batch_write(client, GSTR1_ENRICH_CYPHER, enrich_rows).await;
    let (returns, return_errors) = batch_write(client, GSTR1_RETURN_CYPHER, return_rows).await;

    Ok(vec![
        StepReport::new("GSTR1 invoice enrichment", read, enriched, skipped, enrich_errors),
        StepReport::new("GSTR1 Return nodes + FILED/REPORTED_IN", read, returns, skipped, return_errors),
    ])
}

pub async fn sync_gstr3b(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::Gstr3b).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match Gstr3bRow::parse(doc) {
            Ok(r) => {
                let mut row = BatchRow::new();
                row.insert(
                    "return_id".to_string(),
                    format!("GSTR3B_{}_{}", r.seller_gstin, r.month).into(),
                );
                row.insert("gstin".to_string(), r.seller_gstin.into());
                row.insert("period".to_string(), r.month.into());
                row.insert("tax_paid".to_string(), r.tax_paid.into());
                row.insert("payment_confirmed".to_string(), r.payment_confirmed.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "GSTR3B record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, GSTR3B_CYPHER, rows).await;
    Ok(StepReport::new(
        "GSTR3B Return nodes + FILED",
        read,
        written,
        skipped,
        batch_errors,
    ))
}

/// Cross-link the two return types. Requires both GSTR1 and GSTR3B
/// steps to have run already.
pub async fn link_returns(client: &GraphClient) -> Result<StepReport> {
    let pairs: i64 = client
        .query_scalar(Query::new(LINK_CYPHER.to_string()), "pairs")
        .await?
        .unwrap_or(0);
    let pairs = pairs.max(0) as usize;
    Ok(StepReport::new("GSTR1 -> GSTR3B SUMMARIZED_IN", pairs, pairs, 0, 0))
}
