//! EWayBill collection - transport documents tied to invoices.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EwayBillRow {
    pub ewaybill_no: String,
    pub invoice_id: String,
    pub seller_gstin: String,
    pub buyer_gstin: String,
    pub value: f64,
    pub distance: f64,
    pub date: String,
}

impl EwayBillRow {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let ewaybill_no =
            get_str(doc, "EWayBill_No").ok_or(SkipReason::MissingField("EWayBill_No"))?;
        let invoice_id =
            get_str(doc, "Invoice_ID").ok_or(SkipReason::MissingField("Invoice_ID"))?;
        Ok(Self {
            ewaybill_no,
            invoice_id,
            seller_gstin: str_or(doc, "Seller_GSTIN", ""),
            buyer_gstin: str_or(doc, "Buyer_GSTIN", ""),
            value: money(doc, "Value"),
            distance: money(doc, "Distance"),
            date: str_or(doc, "Date", ""),
        })
    }
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<EwayBillRow>> {
    let docs = super::list_raw(pool, Collection::EwayBill).await?;
    Ok(docs.iter().filter_map(|d| EwayBillRow::parse(d).ok()).collect())
}

pub async fn find_by_invoice(
    pool: &StorePool,
    invoice_id: &str,
) -> StoreResult<Option<EwayBillRow>> {
    Ok(list(pool).await?.into_iter().find(|r| r.invoice_id == invoice_id))
}
