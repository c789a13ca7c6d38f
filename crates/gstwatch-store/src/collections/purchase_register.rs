//! Purchase_Register collection - the buyer's internal claim ledger.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRow {
    pub buyer_gstin: String,
    pub invoice_id: String,
    pub value_claimed: f64,
    pub tax_claimed: f64,
    pub claim_date: String,
}

impl PurchaseRow {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let buyer_gstin =
            get_str(doc, "Buyer_GSTIN").ok_or(SkipReason::MissingField("Buyer_GSTIN"))?;
        let invoice_id =
            get_str(doc, "Invoice_ID").ok_or(SkipReason::MissingField("Invoice_ID"))?;
        Ok(Self {
            buyer_gstin,
            invoice_id,
            value_claimed: money(doc, "Value_Claimed"),
            tax_claimed: money(doc, "Tax_Claimed"),
            claim_date: str_or(doc, "Claim_Date", ""),
        })
    }
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<PurchaseRow>> {
    let docs = super::list_raw(pool, Collection::PurchaseRegister).await?;
    Ok(docs.iter().filter_map(|d| PurchaseRow::parse(d).ok()).collect())
}

pub async fn find_by_buyer(pool: &StorePool, gstin: &str) -> StoreResult<Vec<PurchaseRow>> {
    Ok(list(pool).await?.into_iter().filter(|r| r.buyer_gstin == gstin).collect())
}

pub async fn find_one(
    pool: &StorePool,
    buyer_gstin: &str,
    invoice_id: &str,
) -> StoreResult<Option<PurchaseRow>> {
    let key = format!("{buyer_gstin}_{invoice_id}");
    let doc = super::get_raw(pool, Collection::PurchaseRegister, &key).await?;
    Ok(doc.as_ref().and_then(|d| PurchaseRow::parse(d).ok()))
}
