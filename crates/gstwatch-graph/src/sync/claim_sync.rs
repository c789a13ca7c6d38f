//! ITC claim projection - CLAIMED_ITC edges from two sources.
//!
//! GSTR2B and the Purchase_Register both assert "this buyer claims
//! input tax credit on this invoice". Each (buyer, invoice) pair gets
//! a single CLAIMED_ITC edge whose `sources` list records which
//! statements back it; re-running never duplicates a source entry.

use anyhow::Result;
use tracing::warn;

use gstwatch_store::collections::{
    self, gstr2b::Gstr2bRow, purchase_register::PurchaseRow, Collection,
};
use gstwatch_store::StorePool;

use super::{batch_write, BatchRow, StepReport};
use crate::GraphClient;

/// Enrich the invoice with what GSTR2B saw, then claim ITC for
/// eligible rows only. Ineligible rows still enrich.
const GSTR2B_CYPHER: &str = "
UNWIND $batch AS row
MERGE (i:Invoice {invoice_id: row.invoice_id})
SET i.gstr2b_itc_eligible = row.itc_eligible,
    i.gstr2b_buyer_gstin  = row.buyer_gstin,
    i.gstr2b_tax          = row.tax
WITH i, row
WHERE row.itc_eligible = 'YES'
MERGE (b:Taxpayer {gstin: row.buyer_gstin})
MERGE (b)-[c:CLAIMED_ITC]->(i)
SET c.sources = CASE
    WHEN 'GSTR2B' IN coalesce(c.sources, []) THEN c.sources
    ELSE coalesce(c.sources, []) + 'GSTR2B'
END
";

const PURCHASE_CYPHER: &str = "
UNWIND $batch AS row
MERGE (b:Taxpayer {gstin: row.buyer_gstin})
MERGE (i:Invoice {invoice_id: row.invoice_id})
MERGE (b)-[c:CLAIMED_ITC]->(i)
SET c.value_claimed = row.value_claimed,
    c.tax_claimed   = row.tax_claimed,
    c.claim_date    = row.claim_date,
    c.sources = CASE
        WHEN 'PURCHASE_REGISTER' IN coalesce(c.sources, []) THEN c.sources
        ELSE coalesce(c.sources, []) + 'PURCHASE_REGISTER'
    END
";

pub async fn sync_gstr2b(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::Gstr2b).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match Gstr2bRow::parse(doc) {
            Ok(r) => {
                let mut row = BatchRow::new();
                row.insert("invoice_id".to_string(), r.invoice_id.into());
                row.insert("buyer_gstin".to_string(), r.buyer_gstin.into());
                row.insert("itc_eligible".to_string(), r.itc_eligible.into());
                row.insert("tax".to_string(), r.tax.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "GSTR2B record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, GSTR2B_CYPHER, rows).await;
    Ok(StepReport::new(
        "GSTR2B enrichment + CLAIMED_ITC",
        read,
        written,
        skipped,
        batch_errors,
    ))
}

pub async fn sync_purchase_register(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::PurchaseRegister).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match PurchaseRow::parse(doc) {
            Ok(r) => {
                let mut row = BatchRow::new();
                row.insert("buyer_gstin".to_string(), r.buyer_gstin.into());
                row.insert("invoice_id".to_string(), r.invoice_id.into());
                row.insert("value_claimed".to_string(), r.value_claimed.into());
                row.insert("tax_claimed".to_string(), r.tax_claimed.into());
                row.insert("claim_date".to_string(), r.claim_date.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "purchase register record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, PURCHASE_CYPHER, rows).await;
    Ok(StepReport::new(
        "Purchase register CLAIMED_ITC",
        read,
        written,
        skipped,
        batch_errors,
    ))
}
