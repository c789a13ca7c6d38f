//! Ingestion write path - full replace per source file.
//!
//! Documents are created/replaced wholesale per `_source_file`: all
//! rows previously stored from the same file are removed, then the
//! new rows are written under their natural keys. Rows with no
//! natural key are counted as skipped, never silently dropped.

use redis::AsyncCommands;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{StorePool, StoreResult};
use crate::collections::Collection;

/// Outcome of replacing one source file in one collection.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub collection: String,
    pub source_file: String,
    pub removed: usize,
    pub stored: usize,
    pub skipped: usize,
}

/// Replace every record previously ingested from `source_file` with
/// the given documents. Provenance is stamped on each stored row.
pub async fn replace_source_file(
    pool: &StorePool,
    collection: Collection,
    source_file: &str,
    docs: Vec<Value>,
) -> StoreResult<IngestReport> {
    let key = collection.redis_key();
    let mut conn = pool.clone();

    // Drop the previous generation of this file.
    let existing: Vec<(String, String)> = conn.hgetall(&key).await?;
    let mut stale: Vec<String> = Vec::new();
    for (field, json) in existing {
        if let Ok(doc) = serde_json::from_str::<Value>(&json) {
            if doc.get("_source_file").and_then(Value::as_str) == Some(source_file) {
                stale.push(field);
            }
        }
    }
    if !stale.is_empty() {
        conn.hdel::<_, _, ()>(&key, &stale).await?;
    }

    let mut stored = 0usize;
    let mut skipped = 0usize;
    for (row_no, doc) in docs.into_iter().enumerate() {
        let Some(natural_key) = collection.natural_key(&doc) else {
            skipped += 1;
            warn!(collection = %collection, row = row_no, "record skipped: no natural key");
            continue;
        };
        let mut doc = doc;
        if let Some(map) = doc.as_object_mut() {
            map.insert("_source_file".to_string(), Value::from(source_file));
            map.entry("_source_row").or_insert(Value::from(row_no as u64 + 2));
        }
        conn.hset::<_, _, _, ()>(&key, &natural_key, serde_json::to_string(&doc)?)
            .await?;
        stored += 1;
    }

    info!(
        collection = %collection,
        source_file,
        removed = stale.len(),
        stored,
        skipped,
        "source file replaced"
    );

    Ok(IngestReport {
        collection: collection.name().to_string(),
        source_file: source_file.to_string(),
        removed: stale.len(),
        stored,
        skipped,
    })
}
