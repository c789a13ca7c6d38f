//! Neo4j schema initialization (uniqueness constraints).

use neo4rs::Query;
use tracing::{info, warn};

use crate::GraphClient;

/// One uniqueness constraint per node label, on its natural key.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT taxpayer_gstin IF NOT EXISTS FOR (t:Taxpayer) REQUIRE t.gstin IS UNIQUE",
    "CREATE CONSTRAINT invoice_id IF NOT EXISTS FOR (i:Invoice) REQUIRE i.invoice_id IS UNIQUE",
    "CREATE CONSTRAINT ewaybill_no IF NOT EXISTS FOR (e:EWayBill) REQUIRE e.ewaybill_no IS UNIQUE",
    "CREATE CONSTRAINT return_id IF NOT EXISTS FOR (r:Return) REQUIRE r.return_id IS UNIQUE",
];

/// Initialize constraints. Safe to run any number of times - uses
/// IF NOT EXISTS, and individual statement failures (e.g. an
/// equivalent constraint created under another name) are logged and
/// swallowed rather than aborting the projection.
pub async fn initialize_schema(client: &GraphClient) {
    for statement in SCHEMA_STATEMENTS {
        if let Err(err) = client.execute(Query::new(statement.to_string())).await {
            warn!(statement, error = %err, "constraint statement skipped");
        }
    }
    info!("graph schema ensured ({} constraints)", SCHEMA_STATEMENTS.len());
}
