//! # GSTWatch Graph
//!
//! Neo4j integration for GSTWatch: idempotent projection of the
//! document-store collections into a property graph, plus the
//! multi-hop traversal queries (invoice audit, circular trading,
//! shadow networks, neighborhood risk, vendor network).

pub mod client;
pub mod queries;
pub mod schema;
pub mod sync;

pub use client::{GraphClient, GraphConfig, GraphCounts};
pub use sync::{run_projection, ProjectionReport, StepReport};
