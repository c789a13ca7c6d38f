//! Typed accessors over the seven GST source collections.
//!
//! Each collection is a Redis hash (`gst:col:<name>`) mapping the
//! record's natural business key to its raw JSON document. The
//! per-collection modules expose a typed row struct with a pure
//! `parse` function (record-or-skip-reason, no exceptions as control
//! flow) plus list/find accessors.

pub mod ewaybills;
pub mod gstr1;
pub mod gstr2b;
pub mod gstr3b;
pub mod invoices;
pub mod purchase_register;
pub mod taxpayers;

use redis::AsyncCommands;
use serde_json::Value;
use std::fmt;

use crate::client::{StorePool, StoreResult};
use crate::value::get_str;

/// Why a single source record was excluded from processing.
/// Counted by callers, logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing required field {field}"),
        }
    }
}

/// The seven source collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Taxpayers,
    Invoices,
    Gstr1,
    Gstr2b,
    Gstr3b,
    EwayBill,
    PurchaseRegister,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Taxpayers,
        Collection::Invoices,
        Collection::Gstr1,
        Collection::Gstr2b,
        Collection::Gstr3b,
        Collection::EwayBill,
        Collection::PurchaseRegister,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Taxpayers => "Taxpayers",
            Collection::Invoices => "Invoices",
            Collection::Gstr1 => "GSTR1",
            Collection::Gstr2b => "GSTR2B",
            Collection::Gstr3b => "GSTR3B",
            Collection::EwayBill => "EWayBill",
            Collection::PurchaseRegister => "Purchase_Register",
        }
    }

    /// Resolve a collection from a source file stem, e.g. "GSTR1".
    pub fn from_name(name: &str) -> Option<Collection> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub(crate) fn redis_key(&self) -> String {
        format!("gst:col:{}", self.name())
    }

    /// Extract the natural business key for a raw document, or None
    /// when a required key field is absent (the record is skipped).
    pub fn natural_key(&self, doc: &Value) -> Option<String> {
        match self {
            Collection::Taxpayers => get_str(doc, "GSTIN"),
            Collection::Invoices => get_str(doc, "Invoice_ID"),
            Collection::Gstr1 => get_str(doc, "Invoice_ID"),
            Collection::Gstr2b => get_str(doc, "Invoice_ID"),
            Collection::Gstr3b => {
                let seller = get_str(doc, "Seller_GSTIN")?;
                let month = get_str(doc, "Month").unwrap_or_else(|| "Unknown".to_string());
                Some(format!("{seller}_{month}"))
            }
            Collection::EwayBill => get_str(doc, "EWayBill_No"),
            Collection::PurchaseRegister => {
                let buyer = get_str(doc, "Buyer_GSTIN")?;
                let invoice = get_str(doc, "Invoice_ID")?;
                Some(format!("{buyer}_{invoice}"))
            }
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All raw documents in a collection, unparsed.
pub async fn list_raw(pool: &StorePool, collection: Collection) -> StoreResult<Vec<Value>> {
    let mut conn = pool.clone();
    let raw: Vec<String> = conn.hvals(collection.redis_key()).await?;
    let mut docs = Vec::with_capacity(raw.len());
    for json in raw {
        docs.push(serde_json::from_str(&json)?);
    }
    Ok(docs)
}

/// Fetch one raw document by natural key.
pub async fn get_raw(
    pool: &StorePool,
    collection: Collection,
    key: &str,
) -> StoreResult<Option<Value>> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(collection.redis_key(), key).await?;
    match json {
        Some(j) => Ok(Some(serde_json::from_str(&j)?)),
        None => Ok(None),
    }
}

/// Number of records in a collection.
pub async fn count(pool: &StorePool, collection: Collection) -> StoreResult<usize> {
    let mut conn = pool.clone();
    let n: usize = conn.hlen(collection.redis_key()).await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn natural_keys_per_collection() {
        let inv = json!({"Invoice_ID": "INV-1", "Seller_GSTIN": "G1"});
        assert_eq!(
            Collection::Invoices.natural_key(&inv).as_deref(),
            Some("INV-1")
        );

        let g3b = json!({"Seller_GSTIN": "G1", "Month": "Jan"});
        assert_eq!(
            Collection::Gstr3b.natural_key(&g3b).as_deref(),
            Some("G1_Jan")
        );

        // GSTR3B with no month falls back to the Unknown period
        let g3b_no_month = json!({"Seller_GSTIN": "G1"});
        assert_eq!(
            Collection::Gstr3b.natural_key(&g3b_no_month).as_deref(),
            Some("G1_Unknown")
        );

        let pr = json!({"Buyer_GSTIN": "G2", "Invoice_ID": "INV-1"});
        assert_eq!(
            Collection::PurchaseRegister.natural_key(&pr).as_deref(),
            Some("G2_INV-1")
        );

        // Missing key field -> no natural key -> record is skipped
        assert_eq!(Collection::Taxpayers.natural_key(&json!({"Name": "x"})), None);
    }

    #[test]
    fn from_name_matches_file_stems() {
        assert_eq!(Collection::from_name("gstr2b"), Some(Collection::Gstr2b));
        assert_eq!(
            Collection::from_name("Purchase_Register"),
            Some(Collection::PurchaseRegister)
        );
        assert_eq!(Collection::from_name("Unrelated"), None);
    }
}
