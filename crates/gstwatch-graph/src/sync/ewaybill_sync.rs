//! E-way bill projection - (:EWayBill) nodes and HAS_EWAYBILL edges.

use anyhow::Result;
use tracing::warn;

use gstwatch_store::collections::{self, ewaybills::EwayBillRow, Collection};
use gstwatch_store::StorePool;

use super::{batch_write, BatchRow, StepReport};
use crate::GraphClient;

const EWAYBILL_CYPHER: &str = "
UNWIND $batch AS row
MERGE (e:EWayBill {ewaybill_no: row.ewaybill_no})
SET e.invoice_id   = row.invoice_id,
    e.seller_gstin = row.seller_gstin,
    e.buyer_gstin  = row.buyer_gstin,
    e.value        = row.value,
    e.distance     = row.distance,
    e.date         = row.date
WITH e, row
MERGE (i:Invoice {invoice_id: row.invoice_id})
MERGE (i)-[:HAS_EWAYBILL]->(e)
";

pub async fn sync_ewaybills(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::EwayBill).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match EwayBillRow::parse(doc) {
            Ok(e) => {
                let mut row = BatchRow::new();
                row.insert("ewaybill_no".to_string(), e.ewaybill_no.into());
                row.insert("invoice_id".to_string(), e.invoice_id.into());
                row.insert("seller_gstin".to_string(), e.seller_gstin.into());
                row.insert("buyer_gstin".to_string(), e.buyer_gstin.into());
                row.insert("value".to_string(), e.value.into());
                row.insert("distance".to_string(), e.distance.into());
                row.insert("date".to_string(), e.date.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "e-way bill record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, EWAYBILL_CYPHER, rows).await;
    Ok(StepReport::new(
        "EWayBills + HAS_EWAYBILL",
        read,
        written,
        skipped,
        batch_errors,
    ))
}
