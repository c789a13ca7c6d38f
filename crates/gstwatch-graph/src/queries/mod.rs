//! Multi-hop graph queries over the projected GST graph.

pub mod audit;
pub mod fraud;
pub mod network;
pub mod risk;

pub use audit::{invoice_audit, GraphAudit};
pub use fraud::{detect_circles, find_shadow_networks, ShadowCluster, ShadowMember, TradingCycle};
pub use network::{vendor_network, VendorLink};
pub use risk::{risk_score, RiskNeighbor, RiskProfile};
