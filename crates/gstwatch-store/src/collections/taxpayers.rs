//! Taxpayer collection - one row per registered business entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Collection, SkipReason};
use crate::client::{StorePool, StoreResult};
use crate::value::{get_str, str_or};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxpayerRow {
    pub gstin: String,
    pub name: String,
    pub risk_category: String,
    pub ip_address: String,
    pub phone: String,
}

impl TaxpayerRow {
    /// Parse a raw document. GSTIN is the natural key; everything
    /// else defaults.
    pub fn parse(doc: &Value) -> Result<Self, SkipReason> {
        let gstin = get_str(doc, "GSTIN").ok_or(SkipReason::MissingField("GSTIN"))?;
        Ok(Self {
            gstin,
            name: str_or(doc, "Name", ""),
            risk_category: str_or(doc, "Risk_Category", "UNKNOWN"),
            ip_address: str_or(doc, "IP_Address", ""),
            phone: str_or(doc, "Phone", ""),
        })
    }
}

pub async fn get(pool: &StorePool, gstin: &str) -> StoreResult<Option<TaxpayerRow>> {
    let doc = super::get_raw(pool, Collection::Taxpayers, gstin).await?;
    Ok(doc.as_ref().and_then(|d| TaxpayerRow::parse(d).ok()))
}

pub async fn list(pool: &StorePool) -> StoreResult<Vec<TaxpayerRow>> {
    let docs = super::list_raw(pool, Collection::Taxpayers).await?;
    Ok(docs.iter().filter_map(|d| TaxpayerRow::parse(d).ok()).collect())
}

/// Count of taxpayers whose own risk category is HIGH.
pub async fn count_high_risk(pool: &StorePool) -> StoreResult<usize> {
    let rows = list(pool).await?;
    Ok(rows.iter().filter(|t| t.risk_category == "HIGH").count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_applies_defaults() {
        let row = TaxpayerRow::parse(&json!({"GSTIN": "G1", "Name": "Acme"})).unwrap();
        assert_eq!(row.gstin, "G1");
        assert_eq!(row.risk_category, "UNKNOWN");
        assert_eq!(row.ip_address, "");
    }

    #[test]
    fn parse_skips_without_gstin() {
        let err = TaxpayerRow::parse(&json!({"Name": "NoKey"})).unwrap_err();
        assert_eq!(err, SkipReason::MissingField("GSTIN"));
    }
}
