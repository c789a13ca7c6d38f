//! Invoice projection - (:Invoice) nodes plus ISSUED / BILLED_TO.
//!
//! Endpoint taxpayers are merged-if-absent so invoices whose parties
//! only ever appear as counterparties still link cleanly.

use anyhow::Result;
use tracing::warn;

use gstwatch_store::collections::{self, invoices::InvoiceRow, Collection};
use gstwatch_store::StorePool;

use super::{batch_write, BatchRow, StepReport};
use crate::GraphClient;

const INVOICE_CYPHER: &str = "
UNWIND $batch AS row
MERGE (i:Invoice {invoice_id: row.invoice_id})
SET i.value        = row.value,
    i.invoice_date = row.invoice_date,
    i.seller_gstin = row.seller_gstin,
    i.buyer_gstin  = row.buyer_gstin
WITH i, row
MERGE (s:Taxpayer {gstin: row.seller_gstin})
MERGE (b:Taxpayer {gstin: row.buyer_gstin})
MERGE (s)-[:ISSUED]->(i)
MERGE (i)-[:BILLED_TO]->(b)
";

pub async fn sync_invoices(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::Invoices).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match InvoiceRow::parse(doc) {
            Ok(inv) => {
                let mut row = BatchRow::new();
                row.insert("invoice_id".to_string(), inv.invoice_id.into());
                row.insert("value".to_string(), inv.value.into());
                row.insert("invoice_date".to_string(), inv.invoice_date.into());
                row.insert("seller_gstin".to_string(), inv.seller_gstin.into());
                row.insert("buyer_gstin".to_string(), inv.buyer_gstin.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "invoice record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, INVOICE_CYPHER, rows).await;
    Ok(StepReport::new(
        "Invoices + ISSUED/BILLED_TO",
        read,
        written,
        skipped,
        batch_errors,
    ))
}
