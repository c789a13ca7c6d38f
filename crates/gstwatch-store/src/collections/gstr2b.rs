//! GSTR2B collection - the system-generated ITC statement for buyers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gstr2bRow {
    pub invoice_id: String,
    pub buyer_gstin: String,
    /// Not always carried cleanly by source data; callers fall back
    /// to the Invoices collection when this is blank.
    pub seller_gstin: String,
    pub itc_eligible: String,
    pub value: f64,
    pub tax: f64,
}

impl Gstr2bRow {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let invoice_id =
            get_str(doc, "Invoice_ID").ok_or(SkipReason::MissingField("Invoice_ID"))?;
        let buyer_gstin =
            get_str(doc, "Buyer_GSTIN").ok_or(SkipReason::MissingField("Buyer_GSTIN"))?;
        Ok(Self {
            invoice_id,
            buyer_gstin,
            seller_gstin: str_or(doc, "Seller_GSTIN", ""),
            itc_eligible: str_or(doc, "ITC_Eligible", "NO"),
            value: money(doc, "Value"),
            tax: money(doc, "Tax"),
        })
    }
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<Gstr2bRow>> {
    let docs = super::list_raw(pool, Collection::Gstr2b).await?;
    Ok(docs.iter().filter_map(|d| Gstr2bRow::parse(d).ok()).collect())
}

pub async fn find_by_buyer(pool: &StorePool, gstin: &str) -> StoreResult<Vec<Gstr2bRow>> {
    Ok(list(pool).await?.into_iter().filter(|r| r.buyer_gstin == gstin).collect())
}

pub async fn find_by_invoice(pool: &StorePool, invoice_id: &str) -> StoreResult<Option<Gstr2bRow>> {
    let doc = super::get_raw(pool, Collection::Gstr2b, invoice_id).await?;
    Ok(doc.as_ref().and_then(|d| Gstr2bRow::parse(d).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_defaults_eligibility_to_no() {
        let row =
            Gstr2bRow::parse(&json!({"Invoice_ID": "INV-1", "Buyer_GSTIN": "G2"})).unwrap();
        assert_eq!(row.itc_eligible, "NO");
        assert_eq!(row.seller_gstin, "");
    }
}
