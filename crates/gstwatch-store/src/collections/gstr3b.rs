//! GSTR3B collection - summary tax payment filings, one row per
//! seller and period.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, money, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gstr3bRow {
    pub seller_gstin: String,
    pub month: String,
    pub tax_paid: f64,
    pub payment_confirmed: String,
}

impl Gstr3bRow {
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let seller_gstin =
            get_str(doc, "Seller_GSTIN").ok_or(SkipReason::MissingField("Seller_GSTIN"))?;
        Ok(Self {
            seller_gstin,
            month: str_or(doc, "Month", "Unknown"),
            tax_paid: money(doc, "Tax_Paid"),
            payment_confirmed: str_or(doc, "Payment_Confirmed", "N"),
        })
    }

    pub fn is_paid(&self) -> bool {
        self.payment_confirmed == "Y"
    }
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<Gstr3bRow>> {
    let docs = super::list_raw(pool, Collection::Gstr3b).await?;
    Ok(docs.iter().filter_map(|d| Gstr3bRow::parse(d).ok()).collect())
}

pub async fn find_by_seller(pool: &StorePool, gstin: &str) -> StoreResult<Vec<Gstr3bRow>> {
    Ok(list(pool).await?.into_iter().filter(|r| r.seller_gstin == gstin).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_defaults_payment_to_n() {
        let row = Gstr3bRow::parse(&json!({"Seller_GSTIN": "G1"})).unwrap();
        assert_eq!(row.month, "Unknown");
        assert!(!row.is_paid());
    }
}
