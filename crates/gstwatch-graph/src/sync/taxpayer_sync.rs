//! Taxpayer projection - (:Taxpayer {gstin}) nodes.

use anyhow::Result;
use tracing::warn;

use gstwatch_store::collections::{self, taxpayers::TaxpayerRow, Collection};
use gstwatch_store::StorePool;

use super::{batch_write, BatchRow, StepReport};
use crate::GraphClient;

const TAXPAYER_CYPHER: &str = "
UNWIND $batch AS row
MERGE (t:Taxpayer {gstin: row.gstin})
SET t.name          = row.name,
    t.risk_category = row.risk_category,
    t.ip_address    = row.ip_address,
    t.phone         = row.phone
";

pub async fn sync_taxpayers(client: &GraphClient, store: &StorePool) -> Result<StepReport> {
    let docs = collections::list_raw(store, Collection::Taxpayers).await?;
    let read = docs.len();

    let mut rows: Vec<BatchRow> = Vec::with_capacity(read);
    let mut skipped = 0usize;
    for doc in &docs {
        match TaxpayerRow::parse(doc) {
            Ok(t) => {
                let mut row = BatchRow::new();
                row.insert("gstin".to_string(), t.gstin.into());
                row.insert("name".to_string(), t.name.into());
                row.insert("risk_category".to_string(), t.risk_category.into());
                row.insert("ip_address".to_string(), t.ip_address.into());
                row.insert("phone".to_string(), t.phone.into());
                rows.push(row);
            }
            Err(reason) => {
                skipped += 1;
                warn!(%reason, "taxpayer record skipped");
            }
        }
    }

    let (written, batch_errors) = batch_write(client, TAXPAYER_CYPHER, rows).await;
    Ok(StepReport::new("Taxpayers", read, written, skipped, batch_errors))
}
