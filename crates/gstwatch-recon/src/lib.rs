//! # GSTWatch Reconciliation
//!
//! Read-only reconciliation and risk analysis over the document
//! store and the projected graph: buyer-side purchase-vs-GSTR2B
//! reconciliation, invoice drill-down, hybrid invoice audit, and the
//! inspector-grade global queries.

pub mod audit;
pub mod buyer;
pub mod error;
pub mod inspector;
pub mod invoice;

pub use audit::{audit_invoice, InvoiceAudit};
pub use buyer::{buyer_overview, BuyerOverview, ReconStatus};
pub use error::{ReconError, ReconResult};
pub use inspector::{
    compliance_table, ewaybill_fraud_suspects, fake_itc_suspects, global_summary,
    gstin_profile, high_risk_vendors,
};
pub use invoice::{invoice_detail, InvoiceDetail};
