//! Hybrid invoice audit: graph traversal plus raw source documents.
//!
//! The graph gives the filing chain in one hop-pattern; the store
//! gives the untouched rows an auditor wants to see verbatim. The
//! compliance flags are computed from both and never short-circuit,
//! so one failure does not hide another.

use serde::Serialize;

use gstwatch_graph::queries::audit::{invoice_audit as graph_audit, GraphAudit};
use gstwatch_graph::GraphClient;
use gstwatch_store::collections::ewaybills::EwayBillRow;
use gstwatch_store::collections::gstr1::Gstr1Row;
use gstwatch_store::collections::gstr2b::Gstr2bRow;
use gstwatch_store::collections::gstr3b::Gstr3bRow;
use gstwatch_store::collections::invoices::InvoiceRow;
use gstwatch_store::collections::purchase_register::PurchaseRow;
use gstwatch_store::collections::{
    ewaybills, gstr1, gstr2b, gstr3b, invoices, purchase_register,
};
use gstwatch_store::StorePool;

use crate::error::{ReconError, ReconResult};

#[derive(Debug, Clone, Serialize, Default)]
pub struct RawDocuments {
    pub invoice: Option<InvoiceRow>,
    pub gstr1: Option<Gstr1Row>,
    pub gstr2b: Option<Gstr2bRow>,
    pub gstr3b_seller_filings: Vec<Gstr3bRow>,
    pub purchase_register: Option<PurchaseRow>,
    pub ewaybill: Option<EwayBillRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Compliance {
    pub gstr1_filed: bool,
    pub gstr1_status: String,
    pub gstr3b_filed: bool,
    pub gstr3b_payment_confirmed: bool,
    pub itc_eligible: String,
    pub itc_claimed: bool,
    pub itc_mismatch: bool,
    pub ewaybill_present: bool,
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceAudit {
    pub invoice_id: String,
    pub graph: Option<GraphAudit>,
    pub documents: RawDocuments,
    pub compliance: Compliance,
}

/// Evaluate every compliance rule independently.
pub fn compute_compliance(graph: &GraphAudit, itc_eligible: &str) -> Compliance {
    let gstr1_filed = graph.gstr1_filed();
    let gstr1_status = graph
        .gstr1_status
        .clone()
        .unwrap_or_else(|| "MISSING".to_string());
    let gstr3b_filed = graph.gstr3b_filed();
    let payment_confirmed = graph.gstr3b_payment_confirmed();
    let itc_claimed = graph.itc_claimed;
    let ewaybill_present = graph.ewaybill_no.is_some();
    let itc_mismatch = itc_claimed && itc_eligible == "NO";

    let mut flags = Vec::new();
    if !gstr1_filed {
        flags.push("GSTR1_NOT_FILED".to_string());
    } else if gstr1_status != "FILED" {
        flags.push(format!("GSTR1_STATUS_{gstr1_status}"));
    }
    if !gstr3b_filed {
        flags.push("GSTR3B_NOT_FILED".to_string());
    } else if !payment_confirmed {
        flags.push("GSTR3B_PAYMENT_NOT_CONFIRMED".to_string());
    }
    if itc_mismatch {
        flags.push("ITC_MISMATCH_CLAIMED_BUT_NOT_ELIGIBLE".to_string());
    }
    if !ewaybill_present {
        flags.push("EWAYBILL_MISSING".to_string());
    }

    Compliance {
        gstr1_filed,
        gstr1_status,
        gstr3b_filed,
        gstr3b_payment_confirmed: payment_confirmed,
        itc_eligible: itc_eligible.to_string(),
        itc_claimed,
        itc_mismatch,
        ewaybill_present,
        flags,
    }
}

/// Full audit trail for one invoice. NotFound only when the invoice
/// is absent from both the graph and the document store.
pub async fn audit_invoice(
    graph: &GraphClient,
    store: &StorePool,
    invoice_id: &str,
) -> ReconResult<InvoiceAudit> {
    let graph_view = graph_audit(graph, invoice_id).await?;

    let invoice = invoices::get(store, invoice_id).await?;
    if graph_view.is_none() && invoice.is_none() {
        return Err(ReconError::NotFound(format!("Invoice {invoice_id}")));
    }

    let gstr1_row = gstr1::find_by_invoice(store, invoice_id).await?;
    let gstr2b_row = gstr2b::find_by_invoice(store, invoice_id).await?;
    let purchase = purchase_register::list(store)
        .await?
        .into_iter()
        .find(|r| r.invoice_id == invoice_id);
    let ewaybill = ewaybills::find_by_invoice(store, invoice_id).await?;
    let gstr3b_seller_filings = match invoice.as_ref().map(|i| i.seller_gstin.clone()) {
        Some(seller) => gstr3b::find_by_seller(store, &seller).await?,
        None => Vec::new(),
    };

    let itc_eligible = gstr2b_row
        .as_ref()
        .map(|r| r.itc_eligible.clone())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let compliance =
        compute_compliance(graph_view.as_ref().unwrap_or(&GraphAudit::default()), &itc_eligible);

    Ok(InvoiceAudit {
        invoice_id: invoice_id.to_string(),
        compliance,
        graph: graph_view,
        documents: RawDocuments {
            invoice,
            gstr1: gstr1_row,
            gstr2b: gstr2b_row,
            gstr3b_seller_filings,
            purchase_register: purchase,
            ewaybill,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fully_compliant() -> GraphAudit {
        GraphAudit {
            gstr1_status: Some("FILED".to_string()),
            gstr3b_period: Some("Jan".to_string()),
            gstr3b_payment_confirmed: Some("Y".to_string()),
            ewaybill_no: Some("EWB-1".to_string()),
            itc_claimed: true,
            ..Default::default()
        }
    }

    #[test]
    fn clean_invoice_raises_no_flags() {
        let c = compute_compliance(&fully_compliant(), "YES");
        assert!(c.flags.is_empty());
        assert!(!c.itc_mismatch);
    }

    #[test]
    fn flags_do_not_short_circuit() {
        let c = compute_compliance(&GraphAudit::default(), "NO");
        assert_eq!(
            c.flags,
            vec!["GSTR1_NOT_FILED", "GSTR3B_NOT_FILED", "EWAYBILL_MISSING"]
        );
        // not claimed in the graph, so no mismatch flag
        assert!(!c.itc_mismatch);
    }

    #[test]
    fn pending_gstr1_flags_its_status() {
        let mut g = fully_compliant();
        g.gstr1_status = Some("PENDING".to_string());
        let c = compute_compliance(&g, "YES");
        assert_eq!(c.flags, vec!["GSTR1_STATUS_PENDING"]);
    }

    #[test]
    fn unpaid_gstr3b_and_blocked_itc_flag_together() {
        let mut g = fully_compliant();
        g.gstr3b_payment_confirmed = Some("N".to_string());
        let c = compute_compliance(&g, "NO");
        assert_eq!(
            c.flags,
            vec![
                "GSTR3B_PAYMENT_NOT_CONFIRMED",
                "ITC_MISMATCH_CLAIMED_BUT_NOT_ELIGIBLE"
            ]
        );
        assert!(c.itc_mismatch);
    }
}
