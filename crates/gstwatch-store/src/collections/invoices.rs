//! Invoice collection - the seller/buyer transaction records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub invoice_id: String,
    pub value: f64,
    pub invoice_date: String,
    pub seller_gstin: String,
    pub buyer_gstin: String,
}

impl InvoiceRow {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let invoice_id =
            get_str(doc, "Invoice_ID").ok_or(SkipReason::MissingField("Invoice_ID"))?;
        let seller_gstin =
            get_str(doc, "Seller_GSTIN").ok_or(SkipReason::MissingField("Seller_GSTIN"))?;
        let buyer_gstin =
            get_str(doc, "Buyer_GSTIN").ok_or(SkipReason::MissingField("Buyer_GSTIN"))?;
        Ok(Self {
            invoice_id,
            value: money(doc, "Value"),
            invoice_date: str_or(doc, "Invoice_Date", ""),
            seller_gstin,
            buyer_gstin,
        })
    }
}

pub async fn get(pool: &StorePool, invoice_id: &str) -> StoreResult<Option<InvoiceRow>> {
    let doc = super::get_raw(pool, Collection::Invoices, invoice_id).await?;
    Ok(doc.as_ref().and_then(|d| InvoiceRow::parse(d).ok()))
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<InvoiceRow>> {
    let docs = super::list_raw(pool, Collection::Invoices).await?;
    Ok(docs.iter().filter_map(|d| InvoiceRow::parse(d).ok()).collect())
}

pub async fn find_by_seller(pool: &StorePool, gstin: &str) -> StoreResult<Vec<InvoiceRow>> {
    Ok(list(pool).await?.into_iter().filter(|i| i.seller_gstin == gstin).collect())
}

pub async fn find_by_buyer(pool: &StorePool, gstin: &str) -> StoreResult<Vec<InvoiceRow>> {
    Ok(list(pool).await?.into_iter().filter(|i| i.buyer_gstin == gstin).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_coerces_string_value() {
        let row = InvoiceRow::parse(&json!({
            "Invoice_ID": "INV-1",
            "Seller_GSTIN": "G1",
            "Buyer_GSTIN": "G2",
            "Value": "1000.00"
        }))
        .unwrap();
        assert_eq!(row.value, 1000.0);
        assert_eq!(row.invoice_date, "");
    }

    #[test]
    fn parse_requires_both_parties() {
        let err = InvoiceRow::parse(&json!({"Invoice_ID": "INV-1", "Seller_GSTIN": "G1"}))
            .unwrap_err();
        assert_eq!(err, SkipReason::MissingField("Buyer_GSTIN"));
    }
}
