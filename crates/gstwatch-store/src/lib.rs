//! GSTWatch Document Store
//!
//! Redis-backed collections of normalized GST source records
//! (Taxpayers, Invoices, GSTR1, GSTR2B, GSTR3B, EWayBill,
//! Purchase_Register). Each collection is a hash keyed by the
//! record's natural business key; values are the raw ingested JSON
//! documents with `_source_file` / `_source_row` provenance.

pub mod client;
pub mod collections;
pub mod ingest;
pub mod value;

pub use client::{init_pool, init_pool_from_env, StoreError, StorePool, StoreResult};
pub use collections::{Collection, SkipReason};
pub use ingest::{replace_source_file, IngestReport};
