//! GSTR1 collection - the seller's outward-supply declarations,
//! one row per declared invoice.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gstr1Row {
    pub seller_gstin: String,
    pub buyer_gstin: String,
    pub invoice_id: String,
    pub status: String,
    pub filing_date: String,
    pub tax: f64,
}

impl Gstr1Row {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let seller_gstin =
            get_str(doc, "Seller_GSTIN").ok_or(SkipReason::MissingField("Seller_GSTIN"))?;
        let invoice_id =
            get_str(doc, "Invoice_ID").ok_or(SkipReason::MissingField("Invoice_ID"))?;
        Ok(Self {
            seller_gstin,
            buyer_gstin: str_or(doc, "Buyer_GSTIN", ""),
            invoice_id,
            status: str_or(doc, "Status", "UNKNOWN"),
            filing_date: str_or(doc, "Filing_Date", ""),
            tax: money(doc, "Tax"),
        })
    }
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<Gstr1Row>> {
    let docs = super::list_raw(pool, Collection::Gstr1).await?;
    Ok(docs.iter().filter_map(|d| Gstr1Row::parse(d).ok()).collect())
}

pub async fn find_by_invoice(pool: &StorePool, invoice_id: &str) -> StoreResult<Option<Gstr1Row>> {
    let doc = super::get_raw(pool, Collection::Gstr1, invoice_id).await?;
    Ok(doc.as_ref().and_then(|d| Gstr1Row::parse(d).ok()))
}

pub async fn find_by_seller(pool: &StorePool, gstin: &str) -> StoreResult<Vec<Gstr1Row>> {
    Ok(list(pool).await?.into_iter().filter(|r| r.seller_gstin == gstin).collect())
}

/// First GSTR1 row a seller filed that is addressed to the given
/// buyer, if any. Used for per-seller filing status.
pub async fn find_for_buyer(
    pool: &StorePool,
    seller_gstin: &str,
    buyer_gstin: &str,
) -> StoreResult<Option<Gstr1Row>> {
    Ok(list(pool)
        .await?
        .into_iter()
        .find(|r| r.seller_gstin == seller_gstin && r.buyer_gstin == buyer_gstin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_defaults_status_to_unknown() {
        let row = Gstr1Row::parse(&json!({"Seller_GSTIN": "G1", "Invoice_ID": "INV-1"})).unwrap();
        assert_eq!(row.status, "UNKNOWN");
        assert_eq!(row.filing_date, "");
        assert_eq!(row.tax, 0.0);
    }
}
